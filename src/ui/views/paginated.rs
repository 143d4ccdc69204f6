use crate::api::{CachedProductsClient, Product};
use crate::cache::CacheResult;
use crate::paging::Page;
use crate::query::Query;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{page_count, product_line, source_label};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::debug;

/// Page numbers shown either side of the current one
const PAGE_WINDOW: u64 = 4;

/// Numbered pages, one query per page. The previous page stays on screen
/// while the next one loads.
pub struct PaginatedView {
  client: CachedProductsClient,
  /// Zero-based
  page: u64,
  limit: u64,
  query: Query<CacheResult<Page<Product>>>,
  list_state: ListState,
}

impl PaginatedView {
  pub fn new(client: CachedProductsClient) -> Self {
    let limit = client.sequencer().page_size();
    let mut query = Query::new(page_fetcher(&client, limit, 0)).keep_previous_data();
    query.fetch();

    Self {
      client,
      page: 0,
      limit,
      query,
      list_state: ListState::default(),
    }
  }

  /// Total pages according to the newest page seen, if any
  fn total_pages(&self) -> Option<u64> {
    self
      .query
      .data_or_previous()
      .map(|result| page_count(result.data.total, self.limit))
  }

  fn has_next(&self) -> bool {
    self.total_pages().is_some_and(|total| self.page + 1 < total)
  }

  fn go_to(&mut self, page: u64) {
    if page == self.page {
      return;
    }
    debug!(from = self.page, to = page, "switching page");
    self.page = page;
    self.list_state.select(Some(0));
    self.query.switch(page_fetcher(&self.client, self.limit, page));
  }

  fn render_page_bar(&self, frame: &mut Frame, area: Rect) {
    let Some(total) = self.total_pages() else {
      return;
    };

    let prev_style = if self.page > 0 {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let next_style = if self.has_next() {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![Span::styled(" < Prev ", prev_style)];

    let first = self.page.saturating_sub(PAGE_WINDOW);
    let last = (self.page + PAGE_WINDOW).min(total - 1);
    if first > 0 {
      spans.push(Span::styled(" … ", Style::default().fg(Color::DarkGray)));
    }
    for n in first..=last {
      let style = if n == self.page {
        Style::default().fg(Color::Black).bg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::White)
      };
      spans.push(Span::styled(format!(" {} ", n + 1), style));
    }
    if last + 1 < total {
      spans.push(Span::styled(" … ", Style::default().fg(Color::DarkGray)));
    }

    spans.push(Span::styled(" Next > ", next_style));
    spans.push(Span::styled(
      format!("  page {} of {}", self.page + 1, total),
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

fn page_fetcher(
  client: &CachedProductsClient,
  limit: u64,
  page: u64,
) -> impl Fn() -> futures::future::BoxFuture<'static, Result<CacheResult<Page<Product>>, String>> + Send + Sync + 'static {
  let client = client.clone();
  let skip = page * limit;
  move || {
    let client = client.clone();
    Box::pin(async move {
      client
        .product_page(limit, skip)
        .await
        .map_err(|e| e.to_string())
    })
  }
}

impl View for PaginatedView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
        if self.has_next() {
          self.go_to(self.page + 1);
        }
      }
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
        if self.page > 0 {
          self.go_to(self.page - 1);
        }
      }
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(1), Constraint::Length(1)])
      .split(area);

    let title = match self.query.data() {
      _ if self.query.is_loading() => format!(" Page {} (loading...) ", self.page + 1),
      Some(result) => format!(" Page {}{} ", self.page + 1, source_label(result)),
      None => format!(" Page {} ", self.page + 1),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .block(block)
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, chunks[0]);
      self.render_page_bar(frame, chunks[1]);
      return;
    }

    let Some(page) = self.query.data_or_previous().map(|r| &r.data) else {
      let paragraph = Paragraph::new("Loading...")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[0]);
      return;
    };

    // Dim rows that belong to the previous page while the next one loads
    let row_style = if self.query.is_loading() {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default()
    };
    let items: Vec<ListItem> = page
      .items
      .iter()
      .map(|p| ListItem::new(product_line(p)).style(row_style))
      .collect();
    let len = items.len();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.list_state, len);
    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);
    self.render_page_bar(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Pagination".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("←/→", "page").with_priority(15),
      Shortcut::new("j/k", "nav").with_priority(20),
      Shortcut::new("r", "refetch").with_priority(25),
    ]
  }
}
