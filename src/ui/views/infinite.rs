use crate::api::cache::ProductQueryKey;
use crate::api::{CachedProductsClient, Product};
use crate::paging::{FetchState, TriggerMode};
use crate::query::InfiniteQuery;
use crate::ui::renderfns::product_line;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProductDetailView;
use crate::ui::{ensure_valid_selection, row_visible};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Incrementally loaded product list.
///
/// Both modes share the `InfiniteProducts` key, so pages loaded in one are
/// already there when the other opens. In [`TriggerMode::Button`] the next
/// page loads on `m`; in [`TriggerMode::Automatic`] it loads when the
/// sentinel row below the last product scrolls into view.
pub struct InfiniteView {
  client: CachedProductsClient,
  mode: TriggerMode,
  query: InfiniteQuery<Product>,
  list_state: ListState,
  /// Sentinel visibility as of the last render
  sentinel_visible: bool,
}

impl InfiniteView {
  pub fn new(client: CachedProductsClient, mode: TriggerMode) -> Self {
    let fetch_client = client.clone();
    let mut query = InfiniteQuery::new(
      &ProductQueryKey::InfiniteProducts,
      client.page_store(),
      client.sequencer(),
      move |skip| {
        let client = fetch_client.clone();
        async move { client.next_page(skip).await.map_err(|e| e.to_string()) }
      },
    );
    query.start();

    Self {
      client,
      mode,
      query,
      list_state: ListState::default(),
      sentinel_visible: false,
    }
  }

  fn products(&self) -> Vec<&Product> {
    self.query.items().collect()
  }

  fn status_line(&self) -> Line<'static> {
    if self.query.is_fetching() {
      return Line::styled("Loading more...", Style::default().fg(Color::Yellow));
    }
    if let Some(error) = self.query.error() {
      return Line::styled(
        format!("Error: {} (r to retry)", error),
        Style::default().fg(Color::Red),
      );
    }
    if !self.query.has_next() {
      return Line::styled("No more data", Style::default().fg(Color::DarkGray));
    }
    match self.mode {
      TriggerMode::Button => Line::styled("[m] Load More", Style::default().fg(Color::Cyan)),
      TriggerMode::Automatic => {
        Line::styled("Scroll to load more", Style::default().fg(Color::DarkGray))
      }
    }
  }
}

impl View for InfiniteView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('m') if self.mode == TriggerMode::Button => {
        if self.query.has_next() {
          self.query.fetch_next();
        }
      }
      KeyCode::Char('r') => {
        if self.query.error().is_some() {
          self.query.retry();
        }
      }
      KeyCode::Char('R') => {
        self.list_state.select(Some(0));
        self.query.refresh();
      }
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('g') | KeyCode::Home => self.list_state.select_first(),
      KeyCode::Char('G') | KeyCode::End => self.list_state.select_last(),
      KeyCode::Enter => {
        let selected = self.list_state.selected();
        if let Some(product) = selected.and_then(|i| self.query.items().nth(i)) {
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
    let count = self.query.pages().item_count();
    let title = match self.mode {
      TriggerMode::Button => format!(" Infinite ({}) ", count),
      TriggerMode::Automatic => format!(" Infinite, auto ({}) ", count),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    match self.query.fetch_state() {
      FetchState::LoadingFirst | FetchState::Idle if count == 0 => {
        self.sentinel_visible = false;
        let paragraph = Paragraph::new("Loading...")
          .block(block)
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
      }
      FetchState::Error if self.query.pages().is_empty() => {
        self.sentinel_visible = false;
        let message = self.query.error().unwrap_or_default();
        let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", message))
          .block(block)
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, area);
        return;
      }
      _ => {}
    }

    let mut items: Vec<ListItem> = self
      .products()
      .into_iter()
      .map(|p| ListItem::new(product_line(p)))
      .collect();
    // Sentinel
    items.push(ListItem::new(self.status_line()));
    let sentinel_row = items.len() - 1;

    let inner_height = block.inner(area).height as usize;
    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.list_state, sentinel_row + 1);
    frame.render_stateful_widget(list, area, &mut self.list_state);

    // Offset is only settled after the list has been laid out
    self.sentinel_visible = row_visible(self.list_state.offset(), inner_height, sentinel_row);
  }

  fn breadcrumb_label(&self) -> String {
    match self.mode {
      TriggerMode::Button => "Infinite".to_string(),
      TriggerMode::Automatic => "Infinite (auto)".to_string(),
    }
  }

  fn tick(&mut self) {
    self.query.poll();
    if self.mode == TriggerMode::Automatic {
      self.query.observe_visibility(self.sentinel_visible);
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    let mut shortcuts = vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("j/k", "scroll").with_priority(20),
      Shortcut::new("R", "refresh").with_priority(40),
    ];
    if self.mode == TriggerMode::Button {
      shortcuts.push(Shortcut::new("m", "load more").with_priority(15));
    }
    if self.query.error().is_some() {
      shortcuts.push(Shortcut::new("r", "retry").with_priority(16));
    }
    shortcuts
  }
}
