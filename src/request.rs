//! Request parsing: the `service-input` and `request-header` views of a call.

use crate::jsonpath;
use serde_json::Value as JsonValue;

/// Section holding the validated fields.
pub const SERVICE_INPUT: &str = "service-input";

/// Section holding the caller's header fields.
pub const REQUEST_HEADER: &str = "request-header";

/// Immutable view of one inbound service call.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    /// The `service-input` object (`Null` when absent or not an object)
    input: JsonValue,
    /// The `request-header` fields
    header: RequestHeader,
}

/// The `request-header` section of a call.
#[derive(Debug, Clone, Default)]
pub struct RequestHeader {
    fields: serde_json::Map<String, JsonValue>,
}

impl ServiceRequest {
    /// Parse a raw request body.
    pub fn parse(body: &[u8], max_body_size: usize) -> Result<Self, RequestError> {
        if body.len() > max_body_size {
            return Err(RequestError::TooLarge {
                size: body.len(),
                limit: max_body_size,
            });
        }

        let root: JsonValue = serde_json::from_slice(body)?;
        Ok(Self::from_json(root))
    }

    /// Build a request from an already parsed document.
    pub fn from_json(mut root: JsonValue) -> Self {
        let input = match root.get_mut(SERVICE_INPUT).map(JsonValue::take) {
            Some(value @ JsonValue::Object(_)) => value,
            _ => JsonValue::Null,
        };

        let header = match root.get_mut(REQUEST_HEADER).map(JsonValue::take) {
            Some(JsonValue::Object(fields)) => RequestHeader { fields },
            _ => RequestHeader::default(),
        };

        Self { input, header }
    }

    /// Raw text of a `service-input` field.
    ///
    /// Returns `None` when the field is absent or JSON null. Nested list
    /// items are addressed as `invoiceList[0].invoiceNumber`.
    pub fn field(&self, path: &str) -> Option<String> {
        match jsonpath::get(&self.input, path)? {
            JsonValue::Null => None,
            value => Some(jsonpath::as_text(value)),
        }
    }

    /// Whether `service-input` was present as an object.
    pub fn has_input(&self) -> bool {
        self.input.is_object()
    }

    /// The `request-header` view.
    pub fn header(&self) -> &RequestHeader {
        &self.header
    }
}

impl RequestHeader {
    /// Text of a header field; absent fields read as the empty string.
    pub fn get(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(jsonpath::as_text)
            .unwrap_or_default()
    }

    /// The caller's request id, if any, rendered like the header echo does.
    pub fn request_id(&self) -> Option<String> {
        self.fields
            .get("request-id")
            .filter(|v| !v.is_null())
            .map(jsonpath::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Errors that can occur while parsing a request body.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Request body of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}
