//! Resource definitions: the declarative contract of one (path, method) pair.
//!
//! These types deserialize directly from the schema's route document:
//!
//! ```json
//! {
//!   "function": "create_profile",
//!   "authentication": true,
//!   "network": {"default": "deny", "exceptions": ["10.0.0.0/8"]},
//!   "parameters": [
//!     {"name": "age", "kind": "number", "required": true},
//!     {"name": "color", "kind": "enum", "options": ["red", "blue"]},
//!     {"name": "q", "kind": "string", "source": "query", "max_length": 64}
//!   ]
//! }
//! ```

use crate::error::SchemaError;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Declared kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Free-form string, optionally length-bounded.
    String,
    /// Boolean.
    Bool,
    /// Any JSON number.
    Number,
    /// JSON array.
    Array,
    /// JSON object.
    Map,
    /// String restricted to a fixed option list.
    Enum,
}

impl ParamKind {
    /// Returns the schema name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Array => "array",
            Self::Map => "map",
            Self::Enum => "enum",
        }
    }

    /// Returns `true` if a non-null value of `value` kind satisfies this kind.
    ///
    /// `null` never satisfies a kind; whether it is acceptable depends on the
    /// parameter's `required` flag.
    #[must_use]
    pub const fn accepts(self, value: ValueKind) -> bool {
        match value {
            ValueKind::String => matches!(self, Self::String | Self::Enum),
            ValueKind::Bool => matches!(self, Self::Bool),
            ValueKind::Number => matches!(self, Self::Number),
            ValueKind::Array => matches!(self, Self::Array),
            ValueKind::Object => matches!(self, Self::Map),
            ValueKind::Null => false,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    /// URL query string.
    Query,
    /// JSON body.
    #[default]
    Body,
}

/// Contract for one input field of a resource.
///
/// In routes documents the source is given either as `"source": "query"` or
/// as `"query_parameter": true`. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSpec")]
pub struct ParameterSpec {
    /// Parameter name, unique within its resource.
    pub name: String,

    /// Declared kind.
    pub kind: ParamKind,

    /// Whether a `null` value is rejected.
    #[serde(default)]
    pub required: bool,

    /// Maximum length in Unicode scalar values for strings. 0 means unbounded.
    #[serde(default)]
    pub max_length: usize,

    /// Accepted values for enum parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Input source.
    #[serde(default)]
    pub source: ParamSource,

    /// Custom validator identifiers, run in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
}

/// Routes-document form of a [`ParameterSpec`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameterSpec {
    name: String,
    kind: ParamKind,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    max_length: usize,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    source: Option<ParamSource>,
    #[serde(default)]
    query_parameter: Option<bool>,
    #[serde(default)]
    validators: Vec<String>,
}

impl TryFrom<RawParameterSpec> for ParameterSpec {
    type Error = String;

    fn try_from(raw: RawParameterSpec) -> Result<Self, Self::Error> {
        let flagged = raw.query_parameter.map(|query| {
            if query {
                ParamSource::Query
            } else {
                ParamSource::Body
            }
        });

        let source = match (raw.source, flagged) {
            (Some(source), Some(flagged)) if source != flagged => {
                return Err(format!(
                    "parameter '{}' has conflicting 'source' and 'query_parameter'",
                    raw.name
                ));
            }
            (Some(source), _) | (None, Some(source)) => source,
            (None, None) => ParamSource::Body,
        };

        Ok(Self {
            name: raw.name,
            kind: raw.kind,
            required: raw.required,
            max_length: raw.max_length,
            options: raw.options,
            source,
            validators: raw.validators,
        })
    }
}

impl ParameterSpec {
    /// Creates an optional body parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            max_length: 0,
            options: Vec::new(),
            source: ParamSource::Body,
            validators: Vec::new(),
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bounds the string length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    /// Sets the enum options.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Reads the parameter from the query string.
    #[must_use]
    pub fn from_query(mut self) -> Self {
        self.source = ParamSource::Query;
        self
    }

    /// Appends a custom validator.
    #[must_use]
    pub fn validator(mut self, id: impl Into<String>) -> Self {
        self.validators.push(id.into());
        self
    }
}

/// Default action of a network policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkAction {
    /// Allow everyone except the exceptions.
    #[default]
    Allow,
    /// Deny everyone except the exceptions.
    Deny,
}

/// Network access policy: a default action plus CIDR exceptions that invert it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkPolicy {
    /// Action for addresses outside every exception.
    #[serde(default)]
    pub default: NetworkAction,

    /// CIDR ranges for which the default is inverted.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl NetworkPolicy {
    /// Allows every address.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Denies every address until exceptions are added.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            default: NetworkAction::Deny,
            exceptions: Vec::new(),
        }
    }

    /// Adds a CIDR exception.
    #[must_use]
    pub fn except(mut self, cidr: impl Into<String>) -> Self {
        self.exceptions.push(cidr.into());
        self
    }
}

/// Contract of one (path, method) resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDefinition {
    /// Name of the handler function in the handler registry.
    #[serde(rename = "function")]
    pub handler: String,

    /// Whether a bearer token and the authorization hook are required.
    #[serde(default)]
    pub authentication: bool,

    /// Network access policy.
    #[serde(default)]
    pub network: NetworkPolicy,

    /// Ordered parameter contract.
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ResourceDefinition {
    /// Creates an open, unauthenticated resource with no parameters.
    #[must_use]
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            authentication: false,
            network: NetworkPolicy::default(),
            parameters: Vec::new(),
        }
    }

    /// Requires authentication.
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.authentication = true;
        self
    }

    /// Sets the network policy.
    #[must_use]
    pub fn network(mut self, policy: NetworkPolicy) -> Self {
        self.network = policy;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Checks the structural invariants of this definition.
    ///
    /// - the handler name is not empty
    /// - parameter names are unique
    /// - enum parameters declare at least one option, other kinds none
    pub fn validate(&self, path: &str, method: &str) -> Result<(), SchemaError> {
        if self.handler.trim().is_empty() {
            return Err(SchemaError::EmptyHandler {
                path: path.to_string(),
                method: method.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for spec in &self.parameters {
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateParameter {
                    path: path.to_string(),
                    method: method.to_string(),
                    parameter: spec.name.clone(),
                });
            }
            if spec.kind == ParamKind::Enum && spec.options.is_empty() {
                return Err(SchemaError::EmptyEnumOptions {
                    path: path.to_string(),
                    method: method.to_string(),
                    parameter: spec.name.clone(),
                });
            }
            if spec.kind != ParamKind::Enum && !spec.options.is_empty() {
                return Err(SchemaError::UnexpectedOptions {
                    path: path.to_string(),
                    method: method.to_string(),
                    parameter: spec.name.clone(),
                    kind: spec.kind,
                });
            }
        }

        Ok(())
    }
}
