//! Response document transformers.

mod error;
mod header;

pub use error::{ErrorEchoTransformer, ErrorSummary};
pub use header::HeaderEchoTransformer;

use crate::context::TransformContext;
use crate::jsonpath;
use serde_json::{Map, Value as JsonValue};

/// Trait for rewriting a response document in place.
pub trait Transformer: Send + Sync {
    /// Apply this transformer to the document.
    fn transform(
        &self,
        ctx: &TransformContext,
        doc: &mut JsonValue,
    ) -> Result<(), TransformError>;

    /// Get the transformer name for debugging.
    fn name(&self) -> &'static str;
}

/// Locate an object section of the document.
fn section_mut<'a>(
    doc: &'a mut JsonValue,
    path: &str,
) -> Result<&'a mut Map<String, JsonValue>, TransformError> {
    match jsonpath::get_mut(doc, path) {
        Some(JsonValue::Object(map)) => Ok(map),
        Some(_) => Err(TransformError::NotAnObject(path.to_string())),
        None => Err(TransformError::MissingSection(path.to_string())),
    }
}

/// Errors that can occur while transforming a response document.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Template has no '{0}' section")]
    MissingSection(String),

    #[error("Template section '{0}' is not an object")]
    NotAnObject(String),
}
