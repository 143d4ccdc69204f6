use crate::api::api_types::{ApiProduct, ApiProductsResponse};
use crate::api::types::{NewProduct, Product};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::paging::Page;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// DummyJSON products API client
#[derive(Clone)]
pub struct ProductsClient {
  http: reqwest::Client,
  base_url: Url,
}

impl ProductsClient {
  pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
    let mut base_url = Url::parse(&config.base_url)?;

    // Url::join replaces the last path segment unless the base ends in '/'
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(ApiError::Network)?;

    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    Ok(self.base_url.join(path)?)
  }

  /// `products?limit=..&skip=..`
  pub fn page_url(&self, limit: u64, skip: u64) -> Result<Url, ApiError> {
    let mut url = self.endpoint("products")?;
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string())
      .append_pair("skip", &skip.to_string());
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
    debug!(%url, "GET");
    let response = self.http.get(url).send().await?;
    Self::decode(response).await
  }

  async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
      return Err(ApiError::Server {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
      });
    }

    Ok(serde_json::from_slice(&body)?)
  }

  /// Products with the server's default page size (regular and click-to-load lists)
  pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
    let response: ApiProductsResponse = self.get_json(self.endpoint("products")?).await?;
    Ok(response.into_page().items)
  }

  /// One page of products starting at `skip`
  pub async fn product_page(&self, limit: u64, skip: u64) -> Result<Page<Product>, ApiError> {
    let response: ApiProductsResponse = self.get_json(self.page_url(limit, skip)?).await?;
    let page = response.into_page();
    debug!(skip, limit, received = page.items.len(), total = page.total, "page fetched");
    Ok(page)
  }

  pub async fn get_product(&self, id: u64) -> Result<Product, ApiError> {
    let product: ApiProduct = self.get_json(self.endpoint(&format!("products/{}", id))?).await?;
    Ok(product.into())
  }

  /// Create a product. DummyJSON echoes it back with an id but does not persist it.
  pub async fn add_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
    let url = self.endpoint("products/add")?;
    info!(title = %product.title, "adding product");

    let response = self.http.post(url).json(product).send().await?;
    let created: ApiProduct = Self::decode(response).await?;
    Ok(created.into())
  }
}
