use crate::api::{CachedProductsClient, Product};
use crate::cache::CacheResult;
use crate::query::{Query, QueryState};
use crate::ui::renderfns::{format_price, source_label};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Single product, keyed by id
pub struct ProductDetailView {
  id: u64,
  query: Query<CacheResult<Product>>,
}

impl ProductDetailView {
  pub fn new(id: u64, client: CachedProductsClient) -> Self {
    let mut query = Query::new(move || {
      let client = client.clone();
      async move { client.get_product(id).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self { id, query }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => format!(" Product #{} (loading...) ", self.id),
      QueryState::Error(_) => format!(" Product #{} (error) ", self.id),
      QueryState::Success(result) => format!(" Product #{}{} ", self.id, source_label(result)),
      QueryState::Idle => format!(" Product #{} ", self.id),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if self.query.is_loading() {
      let paragraph = Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }

    let Some(product) = self.query.data().map(|r| &r.data) else {
      return;
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Title, price, thumbnail
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    let header = vec![
      Line::from(Span::styled(&product.title, Style::default().bold())),
      Line::from(vec![
        Span::styled("Price: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format_price(product.price), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled("Category: ", Style::default().fg(Color::DarkGray)),
        Span::raw(product.category.as_deref().unwrap_or("-")),
      ]),
      Line::from(vec![
        Span::styled("Thumbnail: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          product.thumbnail.as_deref().unwrap_or("none"),
          Style::default().fg(Color::Cyan).underlined(),
        ),
      ]),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let desc = Paragraph::new(product.description.as_str()).wrap(Wrap { trim: true });
    frame.render_widget(desc, chunks[2]);
  }
}

impl View for ProductDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match self.query.data() {
      Some(result) => result.data.title.clone(),
      None => format!("#{}", self.id),
    }
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("r", "refresh"), Shortcut::new("q", "back")]
  }
}
