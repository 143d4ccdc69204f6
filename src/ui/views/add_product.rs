use crate::api::{CachedProductsClient, NewProduct, Product};
use crate::query::{Mutation, MutationState};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::info;

const LABELS: [&str; 3] = ["Title", "Description", "Price"];

/// Add Product form backed by a mutation
pub struct AddProductView {
  fields: [TextInput; 3],
  focus: usize,
  editing: bool,
  mutation: Mutation<NewProduct, Product>,
}

impl AddProductView {
  pub fn new(client: CachedProductsClient) -> Self {
    let mutation = Mutation::new(move |product: NewProduct| {
      let client = client.clone();
      async move { client.add_product(&product).await.map_err(|e| e.to_string()) }
    });

    Self {
      fields: [TextInput::new(), TextInput::new(), TextInput::numeric()],
      focus: 0,
      editing: false,
      mutation,
    }
  }

  fn submit(&mut self) {
    if self.mutation.is_pending() {
      return;
    }

    let [title, description, price] = &self.fields;
    match NewProduct::parse(title.value(), description.value(), price.value()) {
      Ok(product) => {
        info!(title = %product.title, "submitting product");
        self.mutation.mutate(product);
      }
      Err(error) => self.mutation.fail(error.to_string()),
    }
  }

  fn handle_editing_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % LABELS.len(),
      KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + LABELS.len() - 1) % LABELS.len(),
      _ => match self.fields[self.focus].handle_key(key) {
        InputResult::Submitted(_) => self.submit(),
        InputResult::Cancelled => self.editing = false,
        InputResult::Consumed | InputResult::NotHandled => {}
      },
    }
  }

  fn field_line(&self, index: usize) -> Line<'static> {
    let focused = self.editing && index == self.focus;
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let field = &self.fields[index];
    let mut spans = vec![Span::styled(format!("{:>12}: ", LABELS[index]), label_style)];
    if focused {
      let (before, after): (String, String) = {
        let split = field.cursor_position();
        (
          field.value().chars().take(split).collect(),
          field.value().chars().skip(split).collect(),
        )
      };
      spans.push(Span::raw(before));
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      spans.push(Span::raw(after));
    } else {
      spans.push(Span::raw(field.value().to_string()));
    }
    Line::from(spans)
  }
}

impl View for AddProductView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.editing {
      self.handle_editing_key(key);
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('i') | KeyCode::Char('e') | KeyCode::Tab => self.editing = true,
      KeyCode::Enter => self.submit(),
      KeyCode::Char('c') => {
        self.fields.iter_mut().for_each(TextInput::clear);
        self.mutation.reset();
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Add Product ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines: Vec<Line> = (0..LABELS.len()).map(|i| self.field_line(i)).collect();
    lines.push(Line::default());

    let button = if self.mutation.is_pending() {
      Line::styled("Submitting...", Style::default().fg(Color::DarkGray))
    } else {
      Line::styled("[Enter] Add Product", Style::default().fg(Color::Cyan))
    };
    lines.push(button);
    lines.push(Line::default());

    match self.mutation.state() {
      MutationState::Success(product) => lines.push(Line::styled(
        format!("Added: {}", product.title),
        Style::default().fg(Color::Green),
      )),
      MutationState::Error(error) => lines.push(Line::styled(
        format!("Error: {}", error),
        Style::default().fg(Color::Red),
      )),
      MutationState::Idle | MutationState::Pending => {}
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Home".to_string()
  }

  fn captures_input(&self) -> bool {
    self.editing
  }

  fn tick(&mut self) {
    if self.mutation.poll() {
      if let Some(product) = self.mutation.data() {
        info!(id = product.id, title = %product.title, "product added");
      }
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    if self.editing {
      vec![
        Shortcut::new("Tab", "next field").with_priority(10),
        Shortcut::new("Enter", "submit").with_priority(20),
        Shortcut::new("Esc", "done").with_priority(30),
      ]
    } else {
      vec![
        Shortcut::new(":", "command").with_priority(10),
        Shortcut::new("i", "edit").with_priority(15),
        Shortcut::new("Enter", "submit").with_priority(20),
        Shortcut::new("c", "clear").with_priority(25),
      ]
    }
  }
}
