use crate::api::{Product, ProductsClient};
use crate::error::ApiError;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::product_line;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::mpsc;
use tracing::warn;

enum FetchStatus {
  Loading,
  Loaded(Vec<Product>),
  Failed,
}

/// Products fetched once on open, with hand-managed loading/error state and
/// no query cache.
pub struct RegularFetchView {
  client: ProductsClient,
  status: FetchStatus,
  receiver: Option<mpsc::UnboundedReceiver<Result<Vec<Product>, ApiError>>>,
  list_state: ListState,
}

impl RegularFetchView {
  pub fn new(client: ProductsClient) -> Self {
    let mut view = Self {
      client,
      status: FetchStatus::Loading,
      receiver: None,
      list_state: ListState::default(),
    };
    view.load();
    view
  }

  fn load(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = FetchStatus::Loading;

    let client = self.client.clone();
    tokio::spawn(async move {
      let _ = tx.send(client.list_products().await);
    });
  }

  fn products(&self) -> &[Product] {
    match &self.status {
      FetchStatus::Loaded(products) => products,
      _ => &[],
    }
  }
}

impl View for RegularFetchView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.load(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" Products ({}) ", self.products().len()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let message = match &self.status {
      FetchStatus::Loading => Some(("Loading...", Color::DarkGray)),
      FetchStatus::Failed => Some(("Something went wrong!", Color::Red)),
      FetchStatus::Loaded(_) => None,
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
    "Regular".to_string()
  }

  fn tick(&mut self) {
    let Some(receiver) = &mut self.receiver else {
      return;
    };

    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.receiver = None;
        self.status = FetchStatus::Failed;
        return;
      }
    };
    self.receiver = None;

    self.status = match result {
      Ok(products) => FetchStatus::Loaded(products),
      Err(error) => {
        warn!(%error, network = error.is_network(), "regular product fetch failed");
        FetchStatus::Failed
      }
    };
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("j/k", "nav").with_priority(20),
      Shortcut::new("r", "reload").with_priority(25),
    ]
  }
}
