//! Serde-deserializable types matching DummyJSON responses.
//!
//! These types are separate from domain types to allow lenient
//! deserialization while keeping domain types focused on application needs.

use serde::Deserialize;

use super::types::Product;
use crate::paging::Page;

#[derive(Debug, Deserialize)]
pub struct ApiProduct {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub price: f64,
  pub category: Option<String>,
  pub thumbnail: Option<String>,
}

impl From<ApiProduct> for Product {
  fn from(p: ApiProduct) -> Self {
    Product {
      id: p.id,
      title: p.title,
      description: p.description,
      price: p.price,
      category: p.category,
      thumbnail: p.thumbnail,
    }
  }
}

/// `GET /products` envelope
#[derive(Debug, Deserialize)]
pub struct ApiProductsResponse {
  #[serde(default)]
  pub products: Vec<ApiProduct>,
  pub total: u64,
  #[serde(default)]
  pub skip: u64,
  #[serde(default)]
  pub limit: u64,
}

impl ApiProductsResponse {
  pub fn into_page(self) -> Page<Product> {
    let items = self.products.into_iter().map(Product::from).collect();
    Page::new(items, self.total, self.skip, self.limit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_products_response_into_page() {
    let json = r#"{
      "products": [
        {"id": 1, "title": "Essence Mascara", "description": "d", "price": 9.99,
         "category": "beauty", "thumbnail": "https://cdn/1.png", "rating": 4.9, "tags": ["x"]},
        {"id": 2, "title": "Eyeshadow Palette", "price": 19}
      ],
      "total": 194, "skip": 0, "limit": 2
    }"#;

    let response: ApiProductsResponse = serde_json::from_str(json).unwrap();
    let page = response.into_page();

    assert_eq!(page.total, 194);
    assert_eq!(page.limit, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].category.as_deref(), Some("beauty"));
    assert_eq!(page.items[1].description, "");
    assert_eq!(page.items[1].price, 19.0);
  }

  #[test]
  fn test_empty_response_is_a_page() {
    let json = r#"{"products": [], "total": 0, "skip": 0, "limit": 0}"#;
    let page = serde_json::from_str::<ApiProductsResponse>(json).unwrap().into_page();
    assert!(page.is_empty());
    assert_eq!(page.total, 0);
  }
}
