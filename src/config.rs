//! Configuration types for the mock API transformer.

use serde::{Deserialize, Serialize};

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockApiConfig {
    /// Configuration version
    pub version: String,
    /// Global settings
    pub settings: Settings,
    /// Service definitions (replace built-ins with the same name)
    pub services: Vec<ServiceConfig>,
}

impl Default for MockApiConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: Settings::default(),
            services: vec![],
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the response fixtures
    pub fixtures_dir: String,
    /// Load the built-in export transaction services
    pub builtin_services: bool,
    /// Maximum accepted request body size (bytes)
    pub max_body_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fixtures_dir: "__files".to_string(),
            builtin_services: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// One mock endpoint: its rule table, fixture pair and response shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name used to route requests to this rule table
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Whether the service is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fixture returned when validation passes
    pub success_file: String,
    /// Fixture returned when validation fails
    pub fail_file: String,
    /// Evaluate every rule (true) or stop at the first failure (false)
    #[serde(default)]
    pub exhaustive: bool,
    /// Granularity of generated error messages
    #[serde(default)]
    pub messages: MessageStyle,
    /// Copy request-header fields into the response document
    #[serde(default)]
    pub echo_header: Option<HeaderEcho>,
    /// Write the aggregated error into the response document on failure
    #[serde(default)]
    pub echo_errors: Option<ErrorEcho>,
    /// Message of the fixed internal-error body
    #[serde(default = "default_internal_error")]
    pub internal_error: String,
    /// Ordered field rules
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

fn default_true() -> bool {
    true
}

fn default_internal_error() -> String {
    "Internal Server Error".to_string()
}

/// Error message granularity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStyle {
    /// Distinct text per violation ("is mandatory", "length should be <= N")
    Detailed,
    /// One message per rule, whatever the violation
    #[default]
    Collapsed,
}

/// Request header echo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderEcho {
    /// Path of the header object in the response document
    #[serde(default = "default_header_section")]
    pub section: String,
    /// Fields to copy
    #[serde(default = "default_header_fields")]
    pub fields: Vec<HeaderMapping>,
}

impl Default for HeaderEcho {
    fn default() -> Self {
        Self {
            section: default_header_section(),
            fields: default_header_fields(),
        }
    }
}

fn default_header_section() -> String {
    "response-header".to_string()
}

fn default_header_fields() -> Vec<HeaderMapping> {
    [
        ("request-id", "req-hdr-request-id"),
        ("service-name", "req-hdr-service-name"),
        ("request-time", "req-hdr-request-time"),
        ("request-source", "request-source"),
    ]
    .into_iter()
    .map(|(from, to)| HeaderMapping {
        from: from.to_string(),
        to: to.to_string(),
    })
    .collect()
}

/// Request header field to response header field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderMapping {
    /// Field name in `request-header`
    pub from: String,
    /// Field name in the response header section
    pub to: String,
}

/// Structured error echo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEcho {
    /// Path of the output object in the response document
    #[serde(default = "default_output_section")]
    pub section: String,
    /// Key receiving the comma-joined error codes
    #[serde(default = "default_code_key")]
    pub code_key: String,
    /// Key receiving the joined error descriptions
    #[serde(default = "default_desc_key")]
    pub desc_key: String,
}

impl Default for ErrorEcho {
    fn default() -> Self {
        Self {
            section: default_output_section(),
            code_key: default_code_key(),
            desc_key: default_desc_key(),
        }
    }
}

fn default_output_section() -> String {
    "service-output".to_string()
}

fn default_code_key() -> String {
    "error-code".to_string()
}

fn default_desc_key() -> String {
    "error-desc".to_string()
}

/// A declarative field rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldRule {
    /// Field path inside `service-input` (e.g. `adCode`, `invoiceList[0].invoiceDate`)
    pub field: String,
    /// Human-readable name used in messages (defaults to the field)
    #[serde(default)]
    pub label: Option<String>,
    /// Error code (defaults to the field)
    #[serde(default)]
    pub code: Option<String>,
    /// Fixed message for the collapsed style
    #[serde(default)]
    pub message: Option<String>,
    /// Field must be present and non-blank
    #[serde(default = "default_true")]
    pub mandatory: bool,
    /// Minimum trimmed length
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum trimmed length
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Required trimmed length
    #[serde(default)]
    pub exact_length: Option<usize>,
    /// Regular expression the whole trimmed value must match
    #[serde(default)]
    pub pattern: Option<String>,
    /// Allowed values
    #[serde(default)]
    pub one_of: Option<Vec<String>>,
    /// Activation condition
    #[serde(default)]
    pub when: Option<Activation>,
}

/// The rule only applies when `field` equals `equals`.
///
/// The discriminator is compared as sent unless `trim` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activation {
    /// Discriminator field
    pub field: String,
    /// Expected discriminator value
    pub equals: String,
    /// Trim the discriminator before comparing
    #[serde(default)]
    pub trim: bool,
}

impl FieldRule {
    /// A mandatory field with no length constraint yet.
    pub fn mandatory(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: None,
            code: None,
            message: None,
            mandatory: true,
            min_length: None,
            max_length: None,
            exact_length: None,
            pattern: None,
            one_of: None,
            when: None,
        }
    }

    /// An optional field: absent or blank values pass.
    pub fn optional(field: impl Into<String>) -> Self {
        Self {
            mandatory: false,
            ..Self::mandatory(field)
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn min(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn exact(mut self, len: usize) -> Self {
        self.exact_length = Some(len);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Only apply this rule when `field` equals `equals`.
    pub fn when(mut self, field: impl Into<String>, equals: impl Into<String>) -> Self {
        self.when = Some(Activation {
            field: field.into(),
            equals: equals.into(),
            trim: false,
        });
        self
    }

    /// Like [`FieldRule::when`], ignoring surrounding whitespace in the
    /// discriminator.
    pub fn when_trimmed(mut self, field: impl Into<String>, equals: impl Into<String>) -> Self {
        self.when = Some(Activation {
            field: field.into(),
            equals: equals.into(),
            trim: true,
        });
        self
    }
}
