use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A product as shown in lists and the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub title: String,
  pub description: String,
  pub price: f64,
  pub category: Option<String>,
  pub thumbnail: Option<String>,
}

/// Payload for creating a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
  pub title: String,
  pub description: String,
  pub price: f64,
}

impl NewProduct {
  /// Build a payload from raw form input. The price must be a finite number.
  pub fn parse(title: &str, description: &str, price: &str) -> Result<Self, ApiError> {
    let price: f64 = price
      .trim()
      .parse()
      .map_err(|_| ApiError::Validation("Price must be a number".to_string()))?;

    if !price.is_finite() {
      return Err(ApiError::Validation("Price must be a number".to_string()));
    }

    Ok(Self {
      title: title.to_string(),
      description: description.to_string(),
      price,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_new_product() {
    let product = NewProduct::parse("Lamp", "Bright", " 12.5 ").unwrap();
    assert_eq!(product.title, "Lamp");
    assert_eq!(product.price, 12.5);
  }

  #[test]
  fn test_parse_rejects_bad_price() {
    for bad in ["", "abc", "NaN", "inf"] {
      let err = NewProduct::parse("Lamp", "", bad).unwrap_err();
      assert!(matches!(err, ApiError::Validation(_)), "{bad}");
    }
  }

  #[test]
  fn test_new_product_serializes_price_as_number() {
    let product = NewProduct::parse("Lamp", "Bright", "3").unwrap();
    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["price"], serde_json::json!(3.0));
  }
}
