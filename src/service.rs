//! A compiled service: rule table, fixture pair and response transformers.

use crate::config::ServiceConfig;
use crate::context::TransformContext;
use crate::request::ServiceRequest;
use crate::rule::{RuleError, RuleSet, ValidationResult};
use crate::template;
use crate::transformer::{
    ErrorEchoTransformer, HeaderEchoTransformer, TransformError, Transformer,
};
use serde_json::Value as JsonValue;
use tracing::trace;

/// One mock endpoint, ready to serve requests.
pub struct Service {
    /// Service name
    pub name: String,
    /// Optional description
    pub description: String,
    rules: RuleSet,
    success_file: String,
    fail_file: String,
    transformers: Vec<Box<dyn Transformer>>,
    internal_error: String,
}

impl Service {
    /// Compile a service definition.
    pub fn compile(config: &ServiceConfig) -> Result<Self, RuleError> {
        let rules = RuleSet::from_service(config)?;

        let mut transformers: Vec<Box<dyn Transformer>> = Vec::new();
        if let Some(ref echo) = config.echo_header {
            transformers.push(Box::new(HeaderEchoTransformer::new(echo)));
        }
        if let Some(ref echo) = config.echo_errors {
            transformers.push(Box::new(ErrorEchoTransformer::new(echo)));
        }

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            rules,
            success_file: config.success_file.clone(),
            fail_file: config.fail_file.clone(),
            transformers,
            internal_error: config.internal_error.clone(),
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate the rule table.
    pub fn validate(&self, request: &ServiceRequest) -> ValidationResult {
        self.rules.validate(request)
    }

    /// Fixture name for a validation outcome.
    pub fn select_template(&self, passed: bool) -> &str {
        template::select(passed, &self.success_file, &self.fail_file)
    }

    /// Apply the response transformers to a loaded fixture.
    pub fn compose(
        &self,
        ctx: &TransformContext,
        mut doc: JsonValue,
    ) -> Result<JsonValue, TransformError> {
        for transformer in &self.transformers {
            trace!(
                service = %self.name,
                transformer = transformer.name(),
                "Applying transformer"
            );
            transformer.transform(ctx, &mut doc)?;
        }
        Ok(doc)
    }

    /// Fixed body returned on internal faults.
    pub fn internal_error_body(&self) -> JsonValue {
        serde_json::json!({ "error": self.internal_error })
    }
}
