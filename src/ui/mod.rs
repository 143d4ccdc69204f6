pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  renderfns::draw_header(frame, chunks[0], app.base_url(), app.active_command(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &app.view_breadcrumb(), app.status());

  app.command_input().render_overlay(frame, chunks[1]);
}

/// Keep a list selection inside `0..len`
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    match state.selected() {
      None => state.select(Some(0)),
      Some(i) if i >= len => state.select(Some(len - 1)),
      _ => {}
    }
  }
}

/// Whether list row `row` falls inside a viewport starting at `offset` with
/// `height` rows.
pub fn row_visible(offset: usize, height: usize, row: usize) -> bool {
  row >= offset && row < offset.saturating_add(height)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_row_visible() {
    assert!(row_visible(0, 10, 9));
    assert!(!row_visible(0, 10, 10));
    assert!(row_visible(5, 10, 14));
    assert!(!row_visible(5, 10, 4));
    assert!(!row_visible(0, 0, 0));
  }
}
