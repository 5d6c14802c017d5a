//! Field rule compilation and evaluation.

use crate::config::{Activation, FieldRule, MessageStyle, ServiceConfig};
use crate::jsonpath;
use crate::request::ServiceRequest;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// An ordered, compiled rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    /// Evaluate every rule instead of stopping at the first failure
    exhaustive: bool,
    messages: MessageStyle,
}

/// A compiled field rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    field: String,
    label: String,
    code: String,
    message: Option<String>,
    mandatory: bool,
    length: LengthCheck,
    pattern: Option<Regex>,
    one_of: Option<Vec<String>>,
    when: Option<Activation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LengthCheck {
    Exact(usize),
    Bounded {
        min: Option<usize>,
        max: Option<usize>,
    },
}

/// Why a single rule failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    ExactLength(usize),
    TooShort(usize),
    TooLong(usize),
    Pattern,
    NotAllowed,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Outcome of validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Failed rules in evaluation order; empty iff validation passed
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

impl RuleSet {
    /// Compile a rule table.
    pub fn compile(
        rules: &[FieldRule],
        exhaustive: bool,
        messages: MessageStyle,
    ) -> Result<Self, RuleError> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            exhaustive,
            messages,
        })
    }

    /// Compile the rule table of a service definition.
    pub fn from_service(config: &ServiceConfig) -> Result<Self, RuleError> {
        Self::compile(&config.rules, config.exhaustive, config.messages)
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    /// Evaluate the rules against a request.
    pub fn validate(&self, request: &ServiceRequest) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in &self.rules {
            if !rule.is_active(request) {
                trace!(field = %rule.field, "Rule inactive");
                continue;
            }

            let value = request.field(&rule.field);
            if let Err(violation) = rule.check(value.as_deref()) {
                trace!(field = %rule.field, violation = ?violation, "Rule failed");
                result.errors.push(FieldError {
                    field: rule.field.clone(),
                    code: rule.code.clone(),
                    message: rule.describe(&violation, self.messages),
                });

                if !self.exhaustive {
                    break;
                }
            }
        }

        result
    }
}

impl CompiledRule {
    fn compile(rule: &FieldRule) -> Result<Self, RuleError> {
        let field = rule.field.trim();
        if field.is_empty() {
            return Err(RuleError::EmptyField);
        }

        let condition_field = rule.when.as_ref().map(|cond| cond.field.as_str());
        for path in std::iter::once(field).chain(condition_field) {
            if jsonpath::parse_path(path).is_none() {
                return Err(RuleError::InvalidPath(path.to_string()));
            }
        }

        let length = match (rule.exact_length, rule.min_length, rule.max_length) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(RuleError::ConflictingLength {
                    field: field.to_string(),
                    reason: "exact_length cannot be combined with min_length or max_length"
                        .to_string(),
                });
            }
            (Some(exact), None, None) => LengthCheck::Exact(exact),
            (None, Some(min), Some(max)) if min > max => {
                return Err(RuleError::ConflictingLength {
                    field: field.to_string(),
                    reason: format!("min_length {} exceeds max_length {}", min, max),
                });
            }
            (None, min, max) => LengthCheck::Bounded { min, max },
        };

        let pattern = rule
            .pattern
            .as_deref()
            .map(|p| Regex::new(&format!("^(?:{})$", p)))
            .transpose()
            .map_err(|source| RuleError::InvalidPattern {
                field: field.to_string(),
                source,
            })?;

        Ok(Self {
            field: field.to_string(),
            label: rule.label.clone().unwrap_or_else(|| field.to_string()),
            code: rule.code.clone().unwrap_or_else(|| field.to_string()),
            message: rule.message.clone(),
            mandatory: rule.mandatory,
            length,
            pattern,
            one_of: rule.one_of.clone(),
            when: rule.when.clone(),
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn is_active(&self, request: &ServiceRequest) -> bool {
        match &self.when {
            None => true,
            Some(cond) => request.field(&cond.field).is_some_and(|v| {
                let v = if cond.trim { v.trim() } else { v.as_str() };
                v == cond.equals
            }),
        }
    }

    /// Check a raw value against this rule.
    ///
    /// Presence, length and pattern look at the trimmed value; allowed
    /// values are matched exactly as sent.
    pub fn check(&self, raw: Option<&str>) -> Result<(), Violation> {
        let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
            return if self.mandatory {
                Err(Violation::Missing)
            } else {
                Ok(())
            };
        };
        let value = raw.trim();

        let len = value.chars().count();
        match self.length {
            LengthCheck::Exact(n) if len != n => return Err(Violation::ExactLength(n)),
            LengthCheck::Bounded { min: Some(min), .. } if len < min => {
                return Err(Violation::TooShort(min))
            }
            LengthCheck::Bounded { max: Some(max), .. } if len > max => {
                return Err(Violation::TooLong(max))
            }
            _ => {}
        }

        if let Some(ref pattern) = self.pattern {
            if !pattern.is_match(value) {
                return Err(Violation::Pattern);
            }
        }

        if let Some(ref allowed) = self.one_of {
            if !allowed.iter().any(|a| a == raw) {
                return Err(Violation::NotAllowed);
            }
        }

        Ok(())
    }

    fn describe(&self, violation: &Violation, style: MessageStyle) -> String {
        if style == MessageStyle::Collapsed {
            return self
                .message
                .clone()
                .unwrap_or_else(|| format!("{} is invalid", self.label));
        }

        match violation {
            Violation::Missing => format!("{} is mandatory", self.label),
            Violation::ExactLength(n) => format!("{} length should be {}", self.label, n),
            Violation::TooShort(n) => format!("{} length should be >= {}", self.label, n),
            Violation::TooLong(n) => format!("{} length should be <= {}", self.label, n),
            Violation::Pattern => format!("{} format is invalid", self.label),
            Violation::NotAllowed => format!(
                "{} should be one of {}",
                self.label,
                self.one_of.as_deref().unwrap_or_default().join(", ")
            ),
        }
    }
}

/// Errors that can occur while compiling a rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Rule has an empty field name")]
    EmptyField,

    #[error("Invalid field path '{0}'")]
    InvalidPath(String),

    #[error("Invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Conflicting length constraints for field '{field}': {reason}")]
    ConflictingLength { field: String, reason: String },
}
