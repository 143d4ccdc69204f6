use thiserror::Error;

/// Errors from talking to the products API.
///
/// An empty page is not an error: a page with `total == 0` simply exhausts
/// the list.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Transport failure: DNS, connect, TLS, timeout, reset.
  #[error("network error: {0}")]
  Network(#[source] reqwest::Error),

  /// Server answered with a non-2xx status.
  #[error("server returned {status}: {body}")]
  Server { status: u16, body: String },

  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  /// Input rejected before any request was made.
  #[error("{0}")]
  Validation(String),
}

impl ApiError {
  pub fn is_network(&self) -> bool {
    matches!(self, ApiError::Network(_))
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    match err.status() {
      Some(status) => ApiError::Server {
        status: status.as_u16(),
        body: String::new(),
      },
      None => ApiError::Network(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_server_error_display() {
    let err = ApiError::Server {
      status: 404,
      body: "Product with id '999' not found".into(),
    };
    assert_eq!(
      err.to_string(),
      "server returned 404: Product with id '999' not found"
    );
    assert!(!err.is_network());
  }

  #[test]
  fn test_decode_error_from_serde() {
    let err: ApiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, ApiError::Decode(_)));
  }

  #[test]
  fn test_validation_message_is_verbatim() {
    let err = ApiError::Validation("Price must be a number".into());
    assert_eq!(err.to_string(), "Price must be a number");
  }
}
