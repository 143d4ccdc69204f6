pub mod footer;
pub mod header;
pub mod product;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use product::product_line;
pub use utils::{format_price, page_count, source_label};
