//! Request header echo.

use super::{section_mut, TransformError, Transformer};
use crate::config::{HeaderEcho, HeaderMapping};
use crate::context::TransformContext;
use serde_json::Value as JsonValue;

/// Copies request-header fields into the response header section.
pub struct HeaderEchoTransformer {
    /// Path of the header section in the template
    section: String,
    /// Fields to copy
    fields: Vec<HeaderMapping>,
}

impl HeaderEchoTransformer {
    /// Create a new header echo transformer from configuration.
    pub fn new(config: &HeaderEcho) -> Self {
        Self {
            section: config.section.clone(),
            fields: config.fields.clone(),
        }
    }
}

impl Transformer for HeaderEchoTransformer {
    fn transform(
        &self,
        ctx: &TransformContext,
        doc: &mut JsonValue,
    ) -> Result<(), TransformError> {
        let section = section_mut(doc, &self.section)?;
        let header = ctx.request.header();

        for mapping in &self.fields {
            section.insert(mapping.to.clone(), JsonValue::String(header.get(&mapping.from)));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "header_echo"
    }
}
