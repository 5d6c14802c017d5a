//! Mock API agent: routes a request body through the service pipeline.

use crate::builtin;
use crate::config::{MockApiConfig, ServiceConfig};
use crate::context::TransformContext;
use crate::request::{RequestError, ServiceRequest};
use crate::rule::RuleError;
use crate::service::Service;
use crate::template::{self, DirectoryStore, TemplateError, TemplateStore};
use crate::transformer::TransformError;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Status of a completed pipeline, whatever the validation outcome.
pub const STATUS_OK: u16 = 200;

/// Status of an internal fault.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Content type of every response.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Body used when the service itself cannot be resolved.
const GENERIC_INTERNAL_ERROR: &str = "Internal Server Error";

/// Mock API agent.
///
/// Holds compiled services and a read-only fixture store; every call is
/// independent.
pub struct MockApiAgent {
    /// Configuration
    config: MockApiConfig,
    /// Compiled services by name
    services: HashMap<String, Service>,
    /// Fixture source
    store: Arc<dyn TemplateStore>,
}

/// The response handed back to the hosting server.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: JsonValue,
}

impl ComposedResponse {
    fn ok(body: JsonValue) -> Self {
        Self {
            status: STATUS_OK,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    fn internal_error(body: JsonValue) -> Self {
        Self {
            status: STATUS_INTERNAL_ERROR,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    /// Serialized body.
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }
}

/// Pipeline stage, for fault reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    LoadTemplate,
    Compose,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::LoadTemplate => "load_template",
            Stage::Compose => "compose",
        };
        f.write_str(name)
    }
}

/// An internal fault, tagged with the stage that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: PipelineFault,
}

/// Underlying cause of a pipeline fault.
#[derive(Debug, thiserror::Error)]
pub enum PipelineFault {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl PipelineError {
    fn at(stage: Stage, source: impl Into<PipelineFault>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

impl MockApiAgent {
    /// Create a new agent from configuration and a fixture store.
    pub fn new(config: MockApiConfig, store: Arc<dyn TemplateStore>) -> Result<Self, AgentError> {
        let mut definitions: Vec<ServiceConfig> = if config.settings.builtin_services {
            builtin::services()
        } else {
            vec![]
        };

        let mut seen = HashSet::new();
        for service in &config.services {
            if !seen.insert(service.name.as_str()) {
                return Err(AgentError::DuplicateService(service.name.clone()));
            }
            definitions.retain(|d| d.name != service.name);
            definitions.push(service.clone());
        }

        let mut services = HashMap::new();
        for definition in definitions.iter().filter(|d| d.enabled) {
            let service = Service::compile(definition).map_err(|source| AgentError::Rule {
                service: definition.name.clone(),
                source,
            })?;
            services.insert(definition.name.clone(), service);
        }

        info!(
            services = services.len(),
            builtin = config.settings.builtin_services,
            "Mock API agent initialized"
        );

        Ok(Self {
            config,
            services,
            store,
        })
    }

    /// Create an agent reading fixtures from `settings.fixtures_dir`.
    pub fn with_fixtures_dir(config: MockApiConfig) -> Result<Self, AgentError> {
        let store = Arc::new(DirectoryStore::new(&config.settings.fixtures_dir));
        Self::new(config, store)
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str, store: Arc<dyn TemplateStore>) -> Result<Self, AgentError> {
        let config: MockApiConfig = serde_yaml::from_str(yaml)?;
        Self::new(config, store)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str, store: Arc<dyn TemplateStore>) -> Result<Self, AgentError> {
        let config: MockApiConfig = serde_json::from_str(json)?;
        Self::new(config, store)
    }

    pub fn config(&self) -> &MockApiConfig {
        &self.config
    }

    /// Look up a compiled service.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Names of all enabled services, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Handle one request for `service`.
    ///
    /// Never fails: internal faults are logged and turned into the
    /// service's fixed internal-error response.
    pub async fn handle(&self, service: &str, body: &[u8]) -> ComposedResponse {
        let Some(svc) = self.services.get(service) else {
            warn!(service, "Unknown service");
            return ComposedResponse::internal_error(
                serde_json::json!({ "error": GENERIC_INTERNAL_ERROR }),
            );
        };

        match self.process(svc, body).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    service,
                    stage = %e.stage,
                    error = %e,
                    "Mock transformer failed"
                );
                ComposedResponse::internal_error(svc.internal_error_body())
            }
        }
    }

    /// Run the pipeline: parse, validate, select, load, compose.
    pub async fn process(
        &self,
        service: &Service,
        body: &[u8],
    ) -> Result<ComposedResponse, PipelineError> {
        let request = ServiceRequest::parse(body, self.config.settings.max_body_size)
            .map_err(|e| PipelineError::at(Stage::Parse, e))?;

        let validation = service.validate(&request);
        let ctx = TransformContext::new(&service.name, request).with_validation(validation);
        let request_id = ctx.request_id();

        let template_name = service.select_template(ctx.passed());
        debug!(
            service = %service.name,
            request_id = %request_id,
            passed = ctx.passed(),
            errors = ctx.validation.errors.len(),
            template = template_name,
            "Validated request"
        );

        let doc = template::load(self.store.as_ref(), template_name)
            .await
            .map_err(|e| PipelineError::at(Stage::LoadTemplate, e))?;

        let body = service
            .compose(&ctx, doc)
            .map_err(|e| PipelineError::at(Stage::Compose, e))?;

        info!(
            service = %service.name,
            request_id = %request_id,
            passed = ctx.passed(),
            "Composed response"
        );

        Ok(ComposedResponse::ok(body))
    }
}

/// Agent construction errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Service '{0}' is defined more than once")]
    DuplicateService(String),

    #[error("Invalid rules for service '{service}': {source}")]
    Rule {
        service: String,
        #[source]
        source: RuleError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MemoryStore;
    use serde_json::json;

    fn store() -> Arc<dyn TemplateStore> {
        Arc::new(
            MemoryStore::new()
                .with("irm-extension-success.json", r#"{"status": "SUCCESS"}"#)
                .with("irm-extension-failure.json", r#"{"status": "FAILURE"}"#),
        )
    }

    #[test]
    fn test_agent_loads_builtins() {
        let agent = MockApiAgent::new(MockApiConfig::default(), store()).unwrap();
        assert_eq!(
            agent.service_names(),
            vec![
                "efirc-adjustment",
                "efirc-issuance",
                "irm-adjustment",
                "irm-extension",
                "shipping-bill-adjustment",
                "shipping-bill-extension",
            ]
        );
    }

    #[test]
    fn test_config_overrides_builtin() {
        let yaml = r#"
services:
  - name: "irm-extension"
    success_file: "custom-ok.json"
    fail_file: "custom-ko.json"
    rules: []
"#;
        let agent = MockApiAgent::from_yaml(yaml, store()).unwrap();
        let service = agent.service("irm-extension").unwrap();
        assert_eq!(service.select_template(true), "custom-ok.json");
        assert!(service.rules().rules().is_empty());
        assert_eq!(agent.service_names().len(), 6);
    }

    #[test]
    fn test_disabled_and_no_builtins() {
        let yaml = r#"
settings:
  builtin_services: false
services:
  - name: "off"
    enabled: false
    success_file: "a.json"
    fail_file: "b.json"
"#;
        let agent = MockApiAgent::from_yaml(yaml, store()).unwrap();
        assert!(agent.service_names().is_empty());
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let json = r#"{
            "services": [
                {"name": "dup", "success_file": "a.json", "fail_file": "b.json"},
                {"name": "dup", "success_file": "a.json", "fail_file": "b.json"}
            ]
        }"#;
        let err = MockApiAgent::from_json(json, store()).err().unwrap();
        assert!(matches!(err, AgentError::DuplicateService(name) if name == "dup"));
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let yaml = r#"
services:
  - name: "bad"
    success_file: "a.json"
    fail_file: "b.json"
    rules:
      - field: "date"
        pattern: "(unclosed"
"#;
        let err = MockApiAgent::from_yaml(yaml, store()).err().unwrap();
        assert!(matches!(err, AgentError::Rule { service, .. } if service == "bad"));
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let agent = MockApiAgent::new(MockApiConfig::default(), store()).unwrap();
        let response = agent.handle("nope", b"{}").await;
        assert_eq!(response.status, STATUS_INTERNAL_ERROR);
        assert_eq!(response.body, json!({"error": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn test_process_reports_stage() {
        let agent = MockApiAgent::new(MockApiConfig::default(), store()).unwrap();
        let service = agent.service("irm-extension").unwrap();

        let err = agent.process(service, b"{oops").await.unwrap_err();
        assert_eq!(err.stage, Stage::Parse);

        let service = agent.service("efirc-issuance").unwrap();
        let err = agent.process(service, b"{}").await.unwrap_err();
        assert_eq!(err.stage, Stage::LoadTemplate);
        assert!(matches!(
            err.source,
            PipelineFault::Template(TemplateError::NotFound(ref name)) if name == "efirc-issuance-failure.json"
        ));
    }

    #[tokio::test]
    async fn test_handle_selects_fixture() {
        let agent = MockApiAgent::new(MockApiConfig::default(), store()).unwrap();
        let body = json!({
            "service-input": {
                "irmNumber": "IRM0001",
                "irmADCode": "AD12345",
                "ieCode": "0123456789",
                "extensionIndicator": "2",
                "recordIndicator": "1",
                "extensionDate": "15/03/2024"
            }
        });

        let response = agent
            .handle("irm-extension", body.to_string().as_bytes())
            .await;
        assert_eq!(response.status, STATUS_OK);
        assert_eq!(response.content_type, CONTENT_TYPE_JSON);
        assert_eq!(response.body, json!({"status": "SUCCESS"}));

        let response = agent.handle("irm-extension", br#"{"service-input": {}}"#).await;
        assert_eq!(response.status, STATUS_OK);
        assert_eq!(response.body, json!({"status": "FAILURE"}));
    }

    #[tokio::test]
    async fn test_internal_error_body_is_per_service() {
        let agent = MockApiAgent::new(MockApiConfig::default(), store()).unwrap();
        let response = agent.handle("irm-extension", b"not json").await;
        assert_eq!(response.status, STATUS_INTERNAL_ERROR);
        assert_eq!(
            response.body,
            json!({"error": "IRM Extension transformer error"})
        );
        assert_eq!(response.body_bytes(), br#"{"error":"IRM Extension transformer error"}"#);
    }
}
