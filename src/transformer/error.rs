//! Error aggregation and structured error echo.

use super::{section_mut, TransformError, Transformer};
use crate::config::ErrorEcho;
use crate::context::TransformContext;
use crate::rule::FieldError;
use serde_json::Value as JsonValue;

/// Aggregated error code and description for a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    /// Codes joined by `,`
    pub code: String,
    /// Messages each terminated by `. `, trimmed
    pub desc: String,
}

impl ErrorSummary {
    /// Aggregate field errors in evaluation order. `None` when there are none.
    pub fn from_errors(errors: &[FieldError]) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }

        let mut code = String::new();
        let mut desc = String::new();
        for error in errors {
            code.push_str(&error.code);
            code.push(',');
            desc.push_str(&error.message);
            desc.push_str(". ");
        }

        Some(Self {
            code: code.strip_suffix(',').unwrap_or(&code).to_string(),
            desc: desc.trim().to_string(),
        })
    }
}

/// Writes the aggregated error into the output section on failure.
pub struct ErrorEchoTransformer {
    section: String,
    code_key: String,
    desc_key: String,
}

impl ErrorEchoTransformer {
    /// Create a new error echo transformer from configuration.
    pub fn new(config: &ErrorEcho) -> Self {
        Self {
            section: config.section.clone(),
            code_key: config.code_key.clone(),
            desc_key: config.desc_key.clone(),
        }
    }
}

impl Transformer for ErrorEchoTransformer {
    fn transform(
        &self,
        ctx: &TransformContext,
        doc: &mut JsonValue,
    ) -> Result<(), TransformError> {
        let Some(summary) = ErrorSummary::from_errors(&ctx.validation.errors) else {
            return Ok(());
        };

        let section = section_mut(doc, &self.section)?;
        section.insert(self.code_key.clone(), JsonValue::String(summary.code));
        section.insert(self.desc_key.clone(), JsonValue::String(summary.desc));

        Ok(())
    }

    fn name(&self) -> &'static str {
        "error_echo"
    }
}
