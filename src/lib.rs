//! Request validation and canned response selection for mock APIs.
//!
//! For every service call the agent:
//!
//! - parses the `service-input` and `request-header` sections of the body
//! - evaluates the service's ordered field rules (mandatory, length bounds,
//!   exact length, patterns, allowed values, conditional activation)
//! - picks the success or failure fixture by outcome
//! - echoes request-header fields and aggregated errors into the fixture
//!
//! Validation failures come back as HTTP 200 with the failure fixture.
//! Internal faults come back as a fixed 500 body.
//!
//! ## Configuration Example
//!
//! ```yaml
//! services:
//!   - name: "efirc-adjustment"
//!     success_file: "efirc-adjustment-success.json"
//!     fail_file: "efirc-adjustment-failure.json"
//!     exhaustive: true
//!     messages: detailed
//!     rules:
//!       - field: "adCode"
//!         label: "AD Code"
//!         code: "EF_HDR_002"
//!         max_length: 7
//! ```

pub mod agent;
pub mod builtin;
pub mod config;
pub mod context;
mod jsonpath;
pub mod request;
pub mod rule;
pub mod service;
pub mod template;
pub mod transformer;

pub use agent::{AgentError, ComposedResponse, MockApiAgent, PipelineError, Stage};
pub use config::{FieldRule, MockApiConfig, ServiceConfig};
pub use context::TransformContext;
pub use request::ServiceRequest;
pub use rule::{RuleError, RuleSet, ValidationResult};
pub use template::{DirectoryStore, MemoryStore, TemplateStore};
