//! Request body handling shared by the JSON endpoints.
//!
//! The browser UI is loose about bodies: it may omit the content type or send
//! nothing at all. A body that is missing, not JSON, or not a JSON object is
//! treated as `{}`; a JSON object with fields of the wrong shape is a 400.
//! Scalar coercions below mirror what the UI has always been able to send
//! (numbers as strings, flags as `"on"`/`1`/`true`).

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::invalid(err.body_text()))?;
        parse_body(&bytes).map(JsonBody)
    }
}

pub fn parse_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|err| ApiError::invalid(format!("invalid request body: {err}"))),
        _ => Ok(T::default()),
    }
}

/// `Path` whose rejection is reported in the usual `{ok:false,error}` shape.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| ApiError::invalid(err.body_text()))?;
        Ok(ApiPath(value))
    }
}

/// Raw JSON object, for endpoints that need to know which keys were sent.
pub type Payload = Map<String, Value>;

/// Trimmed string value; `null` and absent read as empty.
pub fn text_field(payload: &Payload, key: &str) -> Result<String, ApiError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(ApiError::invalid(format!("{key} must be a string"))),
    }
}

/// Display form of a scalar: strings as-is, everything else as JSON text.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Integer coercion: integers, integral floats truncated, numeric strings and
/// booleans. Anything else is `None`.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false.
pub fn value_as_flag(value: &Value) -> bool {
    let text = match value {
        Value::Bool(b) => b.to_string(),
        other => value_as_text(other),
    };
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        name: Option<String>,
    }

    #[test]
    fn missing_or_garbage_body_reads_as_empty_object() {
        assert_eq!(parse_body::<Body>(b"").unwrap(), Body::default());
        assert_eq!(parse_body::<Body>(b"not json").unwrap(), Body::default());
        assert_eq!(parse_body::<Body>(b"[1,2]").unwrap(), Body::default());
        assert_eq!(
            parse_body::<Body>(br#"{"name":"x"}"#).unwrap(),
            Body {
                name: Some("x".into())
            }
        );
    }

    #[test]
    fn wrong_field_shape_is_rejected() {
        let err = parse_body::<Body>(br#"{"name": 5}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(value_as_i64(&json!(30)), Some(30));
        assert_eq!(value_as_i64(&json!(" 45 ")), Some(45));
        assert_eq!(value_as_i64(&json!(2.9)), Some(2));
        assert_eq!(value_as_i64(&json!(true)), Some(1));
        assert_eq!(value_as_i64(&json!("2.5")), None);
        assert_eq!(value_as_i64(&json!([1])), None);
        assert_eq!(value_as_i64(&Value::Null), None);
    }

    #[test]
    fn flag_coercion() {
        for truthy in [json!(1), json!("on"), json!("YES"), json!(true), json!("True")] {
            assert!(value_as_flag(&truthy), "{truthy}");
        }
        for falsy in [json!(0), json!("off"), json!(false), json!(null), json!(1.0)] {
            assert!(!value_as_flag(&falsy), "{falsy}");
        }
    }

    #[test]
    fn text_field_trims_and_checks_type() {
        let payload = json!({"a": "  hi  ", "b": null, "c": 3});
        let payload = payload.as_object().unwrap();
        assert_eq!(text_field(payload, "a").unwrap(), "hi");
        assert_eq!(text_field(payload, "b").unwrap(), "");
        assert_eq!(text_field(payload, "missing").unwrap(), "");
        assert!(text_field(payload, "c").is_err());
    }
}
