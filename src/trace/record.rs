//! Step records: one entry of an execution trace

use super::value::{TypedValue, Variables};
use serde::Serialize;

/// What kind of position change jdb reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    Step,
    MethodEntry,
    MethodExit,
}

/// Location information parsed out of one step event
///
/// Every field is optional because jdb sometimes prints only part of an event
/// (for example the source listing without the header).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepEvent {
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    /// `Class.method()` as printed by jdb
    #[serde(rename = "class_method", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bci: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Only set on method exits
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<TypedValue>,
}

impl StepEvent {
    /// True when nothing at all could be recovered from the output
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.line.is_none() && self.instruction.is_none()
    }

    /// Class part of the label (`pkg.Outer$Inner` for `pkg.Outer$Inner.run()`)
    pub fn class_name(&self) -> Option<&str> {
        let label = self.label.as_deref()?;
        let without_parens = label.strip_suffix("()").unwrap_or(label);
        without_parens.rsplit_once('.').map(|(class, _)| class)
    }
}

/// A single recorded step
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub event: StepEvent,
    /// Arguments of the method just entered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<Variables>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locals: Option<Variables>,
}

impl StepRecord {
    pub fn new(event: StepEvent) -> Self {
        StepRecord {
            event,
            call: None,
            locals: None,
        }
    }

    pub fn kind(&self) -> StepKind {
        self.event.kind
    }

    pub fn line(&self) -> Option<u32> {
        self.event.line
    }
}

/// Variables visible in the current stack frame, as reported by `locals`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Frame {
    pub arguments: Variables,
    pub locals: Variables,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.locals.is_empty()
    }

    /// Arguments followed by locals; a local shadows an argument of the same name
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypedValue)> {
        self.arguments
            .iter()
            .filter(|(name, _)| !self.locals.contains_key(*name))
            .chain(self.locals.iter())
    }
}
