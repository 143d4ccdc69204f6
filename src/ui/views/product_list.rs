use crate::api::{CachedProductsClient, Product};
use crate::cache::CacheResult;
use crate::query::{Query, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{product_line, source_label};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProductDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Cached product list that only loads when asked to
pub struct ProductListView {
  client: CachedProductsClient,
  query: Query<CacheResult<Vec<Product>>>,
  list_state: ListState,
}

impl ProductListView {
  pub fn new(client: CachedProductsClient) -> Self {
    let query_client = client.clone();
    let query = Query::new(move || {
      let client = query_client.clone();
      async move { client.list_products().await.map_err(|e| e.to_string()) }
    });

    Self {
      client,
      query,
      list_state: ListState::default(),
    }
  }

  fn products(&self) -> &[Product] {
    self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[])
  }
}

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      // Every press reloads; the cache layer answers while the listing is fresh
      KeyCode::Char('l') => self.query.refetch(),
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Enter => {
        if let Some(product) = self.list_state.selected().and_then(|i| self.products().get(i)) {
          return ViewAction::Push(Box::new(ProductDetailView::new(
            product.id,
            self.client.clone(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => " Products (loading...) ".to_string(),
      QueryState::Success(result) => format!(" Products ({}){} ", result.data.len(), source_label(result)),
      _ => " Products ".to_string(),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let message = match self.query.state() {
      QueryState::Idle => Some(("Press 'l' to load products.".to_string(), Color::DarkGray)),
      QueryState::Loading => Some(("Loading...".to_string(), Color::DarkGray)),
      QueryState::Error(e) => Some((format!("Error: {}", e), Color::Red)),
      QueryState::Success(_) => None,
    };
    if let Some((text, color)) = message {
      let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }

    let len = self.products().len();
    ensure_valid_selection(&mut self.list_state, len);

    let items: Vec<ListItem> = self
      .products()
      .iter()
      .map(|p| ListItem::new(product_line(p)))
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Query".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("l", "load").with_priority(15),
      Shortcut::new("Enter", "details").with_priority(20),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use crate::config::Config;
  use crossterm::event::KeyModifiers;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  const PRODUCTS: &str = r#"{"products":[{"id":1,"title":"Lamp","description":"Bright","price":12.5}],"total":1,"skip":0,"limit":30}"#;

  async fn counting_server(hits: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      while let Ok((mut socket, _)) = listener.accept().await {
        hits.fetch_add(1, Ordering::SeqCst);
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let response = format!(
          "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          PRODUCTS.len(),
          PRODUCTS
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
      }
    });

    format!("http://{}", addr)
  }

  async fn load(view: &mut ProductListView) -> CacheSource {
    view.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE));
    assert!(view.query.is_loading());
    for _ in 0..200 {
      tokio::time::sleep(Duration::from_millis(5)).await;
      view.tick();
      if let Some(result) = view.query.data() {
        return result.source;
      }
    }
    panic!("listing never loaded");
  }

  #[tokio::test]
  async fn test_every_load_press_refetches_through_cache() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut config = Config::default();
    config.api.base_url = counting_server(hits.clone()).await;
    let mut view = ProductListView::new(CachedProductsClient::new(&config).unwrap());

    assert_eq!(load(&mut view).await, CacheSource::Network);
    assert_eq!(load(&mut view).await, CacheSource::Cache);
    assert_eq!(view.products().len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }
}
