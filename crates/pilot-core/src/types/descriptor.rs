//! The contract a settings type must satisfy.
//!
//! Two shapes are accepted: a plain suggestion function (legacy simple types)
//! or a full [`TypeDescriptor`]. [`SettingType`] presents both through one API.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a conversion was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The input could become valid with more characters.
    Incomplete,
    /// The input can never be valid.
    Invalid,
}

/// Outcome of parsing an input through a settings type.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// The input was accepted and converted to `Value`.
    Valid(Value),
    /// The input was refused.
    Rejected {
        /// Rejection status.
        status: Status,
        /// Human-readable reason.
        message: String,
        /// Candidate values the caller may offer instead.
        suggestions: Vec<Value>,
    },
}

impl Conversion {
    /// Creates an `Invalid` rejection without suggestions.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: Status::Invalid,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Creates an `Incomplete` rejection carrying suggestions.
    pub fn incomplete(message: impl Into<String>, suggestions: Vec<Value>) -> Self {
        Self::Rejected {
            status: Status::Incomplete,
            message: message.into(),
            suggestions,
        }
    }

    /// Returns the converted value when valid.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// Returns whether the conversion succeeded.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Options of an enumerated type: either fixed or produced on demand.
#[derive(Clone)]
pub enum SelectionData {
    /// A fixed list.
    Static(Vec<Value>),
    /// Produced each time it is asked for.
    Lazy(Arc<dyn Fn() -> Vec<Value> + Send + Sync>),
}

impl SelectionData {
    /// Materialises the options.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Static(values) => values.clone(),
            Self::Lazy(produce) => produce(),
        }
    }
}

impl fmt::Debug for SelectionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Self::Lazy(_) => f.debug_tuple("Lazy").field(&"<fn>").finish(),
        }
    }
}

/// A full settings type.
pub trait TypeDescriptor: Send + Sync + fmt::Debug {
    /// Converts raw input into a typed value or explains the rejection.
    fn parse(&self, input: &Value) -> Conversion;

    /// Renders a typed value for display.
    fn stringify(&self, value: &Value) -> String;

    /// Next value for steppable types.
    fn increment(&self, _value: &Value) -> Option<Value> {
        None
    }

    /// Previous value for steppable types.
    fn decrement(&self, _value: &Value) -> Option<Value> {
        None
    }

    /// Options of an enumerated type.
    fn data(&self) -> Option<SelectionData> {
        None
    }

    /// Looks up an enumerated value by its display text.
    fn from_string(&self, _text: &str) -> Option<Value> {
        None
    }
}

/// Legacy suggestion function: input → candidate values.
pub type SuggestFn = Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// Direction of a step on a steppable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Towards the next value.
    Up,
    /// Towards the previous value.
    Down,
}

/// A settings type in either of its accepted shapes.
#[derive(Clone)]
pub enum SettingType {
    /// Plain suggestion function.
    Suggest(SuggestFn),
    /// Full descriptor.
    Descriptor(Arc<dyn TypeDescriptor>),
}

impl SettingType {
    /// Wraps a suggestion function.
    pub fn suggest<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Vec<Value> + Send + Sync + 'static,
    {
        Self::Suggest(Arc::new(f))
    }

    /// Wraps a descriptor.
    pub fn descriptor<D: TypeDescriptor + 'static>(descriptor: D) -> Self {
        Self::Descriptor(Arc::new(descriptor))
    }

    /// Parses `input`. A suggestion function accepts its first candidate.
    pub fn parse(&self, input: &Value) -> Conversion {
        match self {
            Self::Suggest(suggest) => match suggest(input).into_iter().next() {
                Some(value) => Conversion::Valid(value),
                None => Conversion::invalid(format!("No match for {input}")),
            },
            Self::Descriptor(descriptor) => descriptor.parse(input),
        }
    }

    /// Renders `value` for display.
    pub fn stringify(&self, value: &Value) -> String {
        match self {
            Self::Suggest(_) => match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            Self::Descriptor(descriptor) => descriptor.stringify(value),
        }
    }

    /// Returns whether `value` can be stepped in either direction.
    pub fn is_steppable(&self, value: &Value) -> bool {
        self.step(value, Step::Up).is_some() || self.step(value, Step::Down).is_some()
    }

    /// Steps `value` up or down; `None` for non-steppable types.
    pub fn step(&self, value: &Value, step: Step) -> Option<Value> {
        let Self::Descriptor(descriptor) = self else {
            return None;
        };
        match step {
            Step::Up => descriptor.increment(value),
            Step::Down => descriptor.decrement(value),
        }
    }

    /// Options of an enumerated type.
    pub fn selection(&self) -> Option<SelectionData> {
        match self {
            Self::Suggest(_) => None,
            Self::Descriptor(descriptor) => descriptor.data(),
        }
    }

    /// Looks up an enumerated value by display text.
    pub fn from_string(&self, text: &str) -> Option<Value> {
        match self {
            Self::Suggest(_) => None,
            Self::Descriptor(descriptor) => descriptor.from_string(text),
        }
    }
}

impl fmt::Debug for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suggest(_) => f.debug_tuple("Suggest").field(&"<fn>").finish(),
            Self::Descriptor(descriptor) => f.debug_tuple("Descriptor").field(descriptor).finish(),
        }
    }
}
