use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Canonical view of one webhook delivery, extracted from either upstream
/// payload shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// Trimmed and lower-cased; `"unknown"` when the payload names no event.
    pub event_name: String,
    /// Custom-data identifier, falling back to the extracted email. Email is
    /// a last-resort key: purchases can happen under a different address
    /// than the one tied to the extension's install id.
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub order_id: Option<String>,
    pub test_mode: bool,
}

impl WebhookEvent {
    /// Total: any JSON value produces an event. Missing or mistyped fields
    /// degrade to `None`/`"unknown"` so the resolver makes the decision
    /// instead of the parser failing.
    pub fn parse(payload: &Value) -> Self {
        let raw: RawPayload = serde_json::from_value(payload.clone()).unwrap_or_default();
        let meta = raw.meta.unwrap_or_default();
        let data = raw.data.unwrap_or_default();
        let attrs = data.attributes.unwrap_or_default();

        let event_name = meta
            .event_name
            .or(raw.event_name)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let email = attrs
            .user_email
            .clone()
            .or_else(|| attrs.email.clone())
            .or_else(|| attrs.customer_email.clone())
            .or_else(|| {
                attrs
                    .first_order_item
                    .as_ref()
                    .and_then(|item| item.customer_email.clone())
            });

        let variant_id = attrs
            .variant_id
            .clone()
            .or_else(|| {
                attrs
                    .first_order_item
                    .as_ref()
                    .and_then(|item| item.variant_id.clone())
            })
            .or_else(|| {
                attrs
                    .order_item
                    .as_ref()
                    .and_then(|item| item.variant_id.clone())
            });

        let product_id = attrs.product_id.clone().or_else(|| {
            attrs
                .first_order_item
                .as_ref()
                .and_then(|item| item.product_id.clone())
        });

        let order_id = attrs.order_id.clone().or_else(|| {
            attrs
                .first_order_item
                .as_ref()
                .and_then(|item| item.order_id.clone())
        });

        // Whole-object fallback: the flat custom_data wins outright when
        // present. Conflicting values are never merged across shapes.
        let custom = attrs
            .custom_data
            .or_else(|| {
                attrs
                    .first_order_item
                    .as_ref()
                    .and_then(|item| item.custom_data.clone())
            })
            .unwrap_or_default();

        let user_id = custom
            .user_id
            .or(custom.user_id_camel)
            .or(custom.install_id)
            .or(custom.install_id_camel)
            .or_else(|| email.clone());

        Self {
            event_name,
            user_id,
            email,
            status: attrs.status,
            variant_id,
            product_id,
            order_id,
            test_mode: meta.test_mode,
        }
    }
}

// Wire shapes. Subscription events carry their fields flat on
// `data.attributes`; order events nest the purchased item under
// `first_order_item`. Every field is individually lenient so one mistyped
// value cannot blank the rest of the payload.

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default, deserialize_with = "lenient")]
    meta: Option<RawMeta>,
    #[serde(default, deserialize_with = "lenient_string")]
    event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    data: Option<RawData>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    test_mode: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    #[serde(default, deserialize_with = "lenient")]
    attributes: Option<RawAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAttributes {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    user_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    variant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    custom_data: Option<RawCustomData>,
    #[serde(default, deserialize_with = "lenient")]
    first_order_item: Option<RawOrderItem>,
    #[serde(default, deserialize_with = "lenient")]
    order_item: Option<RawOrderItem>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct RawOrderItem {
    #[serde(default, deserialize_with = "lenient_string")]
    customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    variant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    custom_data: Option<RawCustomData>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct RawCustomData {
    #[serde(default, deserialize_with = "lenient_id")]
    user_id: Option<String>,
    #[serde(default, rename = "userId", deserialize_with = "lenient_id")]
    user_id_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    install_id: Option<String>,
    #[serde(default, rename = "installId", deserialize_with = "lenient_id")]
    install_id_camel: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Upstream ids arrive as strings or numbers depending on the event shape.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}
