use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Selly happily sends `null` for strings it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub stock: i64,
    pub price: String,
    pub currency: String,
    pub product_type: i64,
    pub bitcoin: bool,
    pub paypal: bool,
    pub stripe: bool,
    pub litecoin: bool,
    pub dash: bool,
    pub ethereum: bool,
    pub perfect_money: bool,
    pub bitcoin_cash: bool,
    pub ripple: bool,
    pub private: bool,
    pub unlisted: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub seller_note: String,
    pub maximum_quantity: Value,
    pub minimum_quantity: i64,
    pub custom: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductGroup {
    pub id: String,
    pub title: String,
    pub product_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_agent: String,
    pub value: String,
    pub currency: String,
    pub gateway: String,
    pub risk_level: i64,
    pub status: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub delivered: String,
    pub crypto_value: Value,
    pub crypto_address: Value,
    pub referral: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub usd_value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exchange_rate: String,
    #[serde(deserialize_with = "null_as_default")]
    pub custom: std::collections::HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub discount: i64,
    pub max_uses: Value,
    pub product_ids: Vec<String>,
    pub uses: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The body for `POST /coupons`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount: i64,
    pub product_ids: Vec<String>,
}

/// A support query raised by a customer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Query {
    pub id: String,
    pub secret: String,
    pub title: String,
    pub email: String,
    pub message: String,
    pub status: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The payload Selly POSTs to a webhook URL when an order event happens. Only ever decoded and displayed.
///
/// Timestamps are kept as the strings Selly sends, since they are never interpreted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Webhook {
    pub id: String,
    pub product_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_agent: String,
    pub value: String,
    pub currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gateway: String,
    pub risk_level: i64,
    pub status: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub delivered: String,
    pub crypto_value: Value,
    pub crypto_address: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub referral: String,
    pub webhook_type: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Display for Webhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "🛍️ Order {} (webhook type {})", self.id, self.webhook_type)?;
        writeln!(f, "Product: {}", self.product_id)?;
        writeln!(f, "Buyer: {} [{}] {}", self.email, self.ip_address, self.country_code)?;
        writeln!(f, "Amount: {} {} via {}", self.value, self.currency, self.gateway)?;
        if !self.crypto_value.is_null() || !self.crypto_address.is_null() {
            writeln!(f, "Crypto: {} to {}", display_value(&self.crypto_value), display_value(&self.crypto_address))?;
        }
        writeln!(f, "Status: {}  Risk level: {}", self.status, self.risk_level)?;
        if !self.referral.is_empty() {
            writeln!(f, "Referral: {}", self.referral)?;
        }
        write!(f, "Created: {}  Updated: {}", self.created_at, self.updated_at)
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_product() {
        let json = include_str!("./test_assets/product.json");
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "a1b2c3d4");
        assert_eq!(p.title, "Premium license");
        assert_eq!(p.stock, 42);
        assert_eq!(p.price, "9.99");
        assert!(p.bitcoin && p.paypal && !p.stripe);
        assert_eq!(p.maximum_quantity, Value::from(5));
        assert_eq!(p.created_at.to_rfc3339(), "2018-03-04T10:11:12+00:00");
    }

    #[test]
    fn decode_order_with_nulls() {
        let json = include_str!("./test_assets/order.json");
        let o: Order = serde_json::from_str(json).unwrap();
        assert_eq!(o.id, "9f1a77b2-0c1e-4a3e-8e43-2b1d0c1e9a55");
        assert_eq!(o.status, 100);
        assert_eq!(o.user_agent, "");
        assert!(o.referral.is_null());
        assert_eq!(o.custom.get("Discord"), Some(&"user#1234".to_string()));
    }

    #[test]
    fn decode_webhook() {
        let json = include_str!("./test_assets/webhook.json");
        let w: Webhook = serde_json::from_str(json).unwrap();
        assert_eq!(w.email, "buyer@example.com");
        assert_eq!(w.value, "19.99");
        assert_eq!(w.risk_level, 2);
        assert_eq!(w.referral, "");
        let text = w.to_string();
        assert!(text.contains("Amount: 19.99 USD via PayPal"));
        assert!(text.contains("Buyer: buyer@example.com [203.0.113.9] GB"));
        assert!(!text.contains("Crypto:"));
    }

    #[test]
    fn empty_webhook_decodes_to_defaults() {
        let w: Webhook = serde_json::from_str("{}").unwrap();
        assert_eq!(w.id, "");
        assert_eq!(w.status, 0);
        assert!(w.crypto_value.is_null());
    }

    #[test]
    fn webhook_with_wrong_types_is_rejected() {
        let err = serde_json::from_str::<Webhook>(r#"{"id": "x", "status": "paid"}"#);
        assert!(err.is_err());
    }
}
