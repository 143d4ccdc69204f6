use super::utils::{format_price, truncate};
use crate::api::Product;
use ratatui::prelude::*;

/// One list row: id, title, price
pub fn product_line(product: &Product) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:>4}", product.id), Style::default().fg(Color::DarkGray)),
    Span::raw("  "),
    Span::raw(format!("{:<40}", truncate(&product.title, 40))),
    Span::raw(" "),
    Span::styled(
      format!("{:>10}", format_price(product.price)),
      Style::default().fg(Color::Green),
    ),
  ])
}
