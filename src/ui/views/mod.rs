mod add_product;
mod infinite;
mod paginated;
mod product_detail;
mod product_list;
mod regular_fetch;

pub use add_product::AddProductView;
pub use infinite::InfiniteView;
pub use paginated::PaginatedView;
pub use product_detail::ProductDetailView;
pub use product_list::ProductListView;
pub use regular_fetch::RegularFetchView;
