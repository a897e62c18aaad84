use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    Proxy,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::SellyConfig,
    data_objects::{Coupon, NewCoupon, Order, Product, ProductGroup, Query},
    ErrorResponse,
    SellyApiError,
};

#[derive(Clone)]
pub struct SellyApi {
    config: SellyConfig,
    client: Arc<Client>,
}

impl SellyApi {
    pub fn new(config: SellyConfig) -> Result<Self, SellyApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let mut builder = Client::builder().default_headers(headers).user_agent(config.user_agent.as_str());
        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| SellyApiError::Initialization(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| SellyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, SellyApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req =
            self.client.request(method, url).basic_auth(self.config.email.as_str(), Some(self.config.token.reveal()));
        if let Some(body) = body {
            let body = serde_json::to_vec(&body).map_err(|e| SellyApiError::RestRequestError(e.to_string()))?;
            req = req.body(body);
        }
        let response = req.send().await.map_err(|e| SellyApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        trace!("REST query returned {status}");
        let data = response.bytes().await.map_err(|e| SellyApiError::RestResponseError(e.to_string()))?;
        decode_response(status.as_u16(), status.is_success(), data.as_ref())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, SellyApiError> {
        debug!("Fetching product {id}");
        self.rest_query::<Product, ()>(Method::GET, &format!("/products/{id}"), None).await
    }

    pub async fn get_products(&self) -> Result<Vec<Product>, SellyApiError> {
        debug!("Fetching all products");
        let result = self.rest_query::<Vec<Product>, ()>(Method::GET, "/products", None).await?;
        info!("Fetched {} products", result.len());
        Ok(result)
    }

    pub async fn get_product_group(&self, id: &str) -> Result<ProductGroup, SellyApiError> {
        debug!("Fetching product group {id}");
        self.rest_query::<ProductGroup, ()>(Method::GET, &format!("/product_groups/{id}"), None).await
    }

    pub async fn get_product_groups(&self) -> Result<Vec<ProductGroup>, SellyApiError> {
        debug!("Fetching all product groups");
        self.rest_query::<Vec<ProductGroup>, ()>(Method::GET, "/product_groups", None).await
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, SellyApiError> {
        debug!("Fetching order {id}");
        self.rest_query::<Order, ()>(Method::GET, &format!("/orders/{id}"), None).await
    }

    pub async fn get_orders(&self) -> Result<Vec<Order>, SellyApiError> {
        debug!("Fetching all orders");
        let result = self.rest_query::<Vec<Order>, ()>(Method::GET, "/orders", None).await?;
        info!("Fetched {} orders", result.len());
        Ok(result)
    }

    pub async fn get_coupon(&self, id: &str) -> Result<Coupon, SellyApiError> {
        debug!("Fetching coupon {id}");
        self.rest_query::<Coupon, ()>(Method::GET, &format!("/coupons/{id}"), None).await
    }

    pub async fn get_coupons(&self) -> Result<Vec<Coupon>, SellyApiError> {
        debug!("Fetching all coupons");
        self.rest_query::<Vec<Coupon>, ()>(Method::GET, "/coupons", None).await
    }

    /// Creates a new coupon giving `discount` percent off the given products.
    pub async fn new_coupon(
        &self,
        code: &str,
        discount: i64,
        product_ids: &[String],
    ) -> Result<Coupon, SellyApiError> {
        let coupon = NewCoupon { code: code.to_string(), discount, product_ids: product_ids.to_vec() };
        debug!("Creating coupon {code} ({discount}% off {} products)", product_ids.len());
        let result = self.rest_query::<Coupon, NewCoupon>(Method::POST, "/coupons", Some(coupon)).await?;
        info!("Created coupon {} with id {}", result.code, result.id);
        Ok(result)
    }

    pub async fn get_query(&self, id: &str) -> Result<Query, SellyApiError> {
        debug!("Fetching query {id}");
        self.rest_query::<Query, ()>(Method::GET, &format!("/queries/{id}"), None).await
    }

    pub async fn get_queries(&self) -> Result<Vec<Query>, SellyApiError> {
        debug!("Fetching all queries");
        self.rest_query::<Vec<Query>, ()>(Method::GET, "/queries", None).await
    }
}

/// Turns a raw response into the expected entity, or the most specific error available.
///
/// Entities decode leniently (missing fields default), so a successful status carrying Selly's error object is
/// caught before the entity is attempted.
fn decode_response<T: DeserializeOwned>(status: u16, success: bool, data: &[u8]) -> Result<T, SellyApiError> {
    if success {
        if let Some(err) = full_api_error(data) {
            return Err(SellyApiError::Api(err));
        }
        return serde_json::from_slice::<T>(data).map_err(|e| SellyApiError::JsonError(e.to_string()));
    }
    match api_error(data) {
        Some(err) => Err(SellyApiError::Api(err)),
        None => Err(SellyApiError::QueryError { status, message: String::from_utf8_lossy(data).into_owned() }),
    }
}

fn api_error(data: &[u8]) -> Option<ErrorResponse> {
    serde_json::from_slice::<ErrorResponse>(data).ok().filter(|e| !e.message.is_empty())
}

// Both keys present: `message` alone is a legitimate field on some entities (e.g. `Query`).
fn full_api_error(data: &[u8]) -> Option<ErrorResponse> {
    let value = serde_json::from_slice::<serde_json::Value>(data).ok()?;
    let obj = value.as_object()?;
    if obj.contains_key("message") && obj.contains_key("errors") {
        serde_json::from_value::<ErrorResponse>(value).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_entity_on_success() {
        let p = decode_response::<Product>(200, true, include_bytes!("./test_assets/product.json")).unwrap();
        assert_eq!(p.title, "Premium license");
    }

    #[test]
    fn decodes_error_shape_on_failure() {
        let body = br#"{"message": "Unauthenticated", "errors": {"title": []}}"#;
        match decode_response::<Product>(401, false, body) {
            Err(SellyApiError::Api(e)) => assert_eq!(e.message, "Unauthenticated"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn error_shape_with_success_status() {
        let body = br#"{"message": "Coupon code taken", "errors": {"title": ["taken"]}}"#;
        match decode_response::<Vec<Coupon>>(200, true, body) {
            Err(SellyApiError::Api(e)) => assert_eq!(e.to_string(), "Coupon code taken: [taken]"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn query_with_message_field_is_not_an_error() {
        let body = br#"{"id": "q1", "title": "Help", "message": "Where is my key?", "status": 0}"#;
        let q = decode_response::<Query>(200, true, body).unwrap();
        assert_eq!(q.message, "Where is my key?");
    }

    #[test]
    fn unknown_failure_body() {
        match decode_response::<Product>(502, false, b"Bad gateway") {
            Err(SellyApiError::QueryError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad gateway");
            },
            other => panic!("Unexpected result: {other:?}"),
        }
        assert!(matches!(decode_response::<Vec<Product>>(200, true, b"not json"), Err(SellyApiError::JsonError(_))));
    }

    #[test]
    fn url_joins_base_and_path() {
        let config = SellyConfig { base_url: "http://localhost:1234/api/v2/".into(), ..Default::default() };
        let api = SellyApi::new(config).unwrap();
        assert_eq!(api.url("/products/abc"), "http://localhost:1234/api/v2/products/abc");
    }
}
