//! Per-request context handed to the document transformers.

use crate::request::ServiceRequest;
use crate::rule::ValidationResult;

/// Context available while composing a response.
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Service handling the request
    pub service: String,
    /// Parsed request
    pub request: ServiceRequest,
    /// Outcome of the field rules
    pub validation: ValidationResult,
}

impl TransformContext {
    /// Create a new transform context.
    pub fn new(service: impl Into<String>, request: ServiceRequest) -> Self {
        Self {
            service: service.into(),
            request,
            validation: ValidationResult::default(),
        }
    }

    /// Attach the validation outcome.
    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.validation = validation;
        self
    }

    /// Whether every rule passed.
    pub fn passed(&self) -> bool {
        self.validation.passed()
    }

    /// Request id for log correlation (empty when the caller sent none).
    pub fn request_id(&self) -> String {
        self.request.header().request_id().unwrap_or_default()
    }
}
