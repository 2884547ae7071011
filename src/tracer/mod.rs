//! Trace runs: compile, spawn, step until the program ends, collect
//!
//! Two kinds of run are offered:
//!
//! - [`Tracer::program_trace`] keeps every step with its locals
//! - [`Tracer::variable_history`] keeps, for every variable, the sequence of
//!   distinct consecutive values it took
//!
//! A run ends normally when jdb reports the program has exited. Output that
//! is not a step event (in practice an uncaught exception) also ends the
//! run, with `exception_occurred` set. Other session errors are returned.

pub mod scope;

use crate::config::TraceConfig;
use crate::session::constants::VARIABLE_HISTORY_CAPACITY;
use crate::session::{ClassPath, Launcher, PtyLauncher, SessionError, SessionResult, StepModifier};
use crate::trace::{StepRecord, TypedValue};
use scope::TraceScope;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// What to trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRequest {
    pub class_name: String,
    /// Directory to run in (and compile in); the current one when `None`
    pub path: Option<PathBuf>,
    pub class_path: Option<ClassPath>,
    /// Program arguments
    pub args: Vec<String>,
    /// One line written to the program's standard input before stepping
    pub stdin_text: Option<String>,
}

impl TraceRequest {
    pub fn new(class_name: impl Into<String>) -> Self {
        TraceRequest {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn class_path(mut self, class_path: impl Into<ClassPath>) -> Self {
        self.class_path = Some(class_path.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin_text = Some(text.into());
        self
    }

    /// The requested class path with `.` appended when missing; `.` alone by default
    pub fn effective_class_path(&self) -> ClassPath {
        match &self.class_path {
            None => ClassPath::Entries(vec![".".to_string()]),
            Some(ClassPath::Entries(entries)) => {
                let mut entries = entries.clone();
                if !entries.iter().any(|e| e == ".") {
                    entries.push(".".to_string());
                }
                ClassPath::Entries(entries)
            }
            Some(joined) => joined.clone(),
        }
    }

    /// Standard input text is only deliverable when the program runs in its own JVM
    pub fn feeds_stdin(&self) -> bool {
        self.stdin_text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

/// Result of [`Tracer::program_trace`]
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProgramTrace {
    pub exception_occurred: bool,
    pub steps: Vec<StepRecord>,
}

/// Result of [`Tracer::variable_history`]
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VariableHistory {
    pub exception_occurred: bool,
    pub variables: BTreeMap<String, Vec<TypedValue>>,
}

impl VariableHistory {
    /// Record `value` unless it equals the variable's last recorded value
    pub fn observe(&mut self, name: &str, value: &TypedValue) {
        let history = self.variables.entry(name.to_string()).or_default();
        if history.last() != Some(value) {
            history.push(value.clone());
        }
    }

    /// Reduce every history to its distinct values, in order of first appearance
    pub fn into_unique(mut self) -> Self {
        for values in self.variables.values_mut() {
            let mut distinct: Vec<TypedValue> = Vec::with_capacity(values.len());
            for value in values.drain(..) {
                if !distinct.contains(&value) {
                    distinct.push(value);
                }
            }
            *values = distinct;
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[TypedValue]> {
        self.variables.get(name).map(Vec::as_slice)
    }
}

/// Decide whether a session error ends the run normally.
///
/// `Ok(true)` for an exception in the program, `Ok(false)` for a clean exit.
fn run_ended(err: SessionError) -> SessionResult<bool> {
    match err {
        SessionError::HostExited => Ok(false),
        SessionError::HostError { output } => {
            info!(output = %output.trim_end(), "program raised an exception");
            Ok(true)
        }
        other => Err(other),
    }
}

/// Runs traces through jdb
pub struct Tracer {
    config: TraceConfig,
    launcher: Arc<dyn Launcher>,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Tracer {
            config,
            launcher: Arc::new(PtyLauncher),
        }
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    fn open(&self, request: &TraceRequest) -> SessionResult<TraceScope> {
        let mut scope = TraceScope::open(&self.config, Arc::clone(&self.launcher), request)?;
        if let Some(text) = request.stdin_text.as_deref().filter(|t| !t.is_empty()) {
            scope.session_mut().send_target_line(text);
        }
        Ok(scope)
    }

    /// Every step of the program with its locals
    pub fn program_trace(&self, request: &TraceRequest) -> SessionResult<ProgramTrace> {
        let mut scope = self.open(request)?;
        let session = scope.session_mut();
        session.set_trace_capacity(None);

        let exception_occurred = loop {
            match session.step(StepModifier::In, true) {
                Ok(Some(_)) => {}
                Ok(None) => break false,
                Err(e) => break run_ended(e)?,
            }
        };

        let steps = session.trace().to_vec();
        info!(
            class = %request.class_name,
            steps = steps.len(),
            exception_occurred,
            "program trace finished"
        );
        Ok(ProgramTrace {
            exception_occurred,
            steps,
        })
    }

    /// The values every argument and local variable took, in order
    pub fn variable_history(
        &self,
        request: &TraceRequest,
        unique: bool,
    ) -> SessionResult<VariableHistory> {
        let mut scope = self.open(request)?;
        let session = scope.session_mut();
        session.set_trace_capacity(Some(VARIABLE_HISTORY_CAPACITY));

        let mut history = VariableHistory::default();
        let exception_occurred = loop {
            let frame = match session.step(StepModifier::In, false) {
                Ok(Some(_)) => session.locals(),
                Ok(None) => break false,
                Err(e) => Err(e),
            };
            match frame {
                Ok(Some(frame)) => {
                    for (name, value) in frame.iter() {
                        history.observe(name, value);
                    }
                }
                Ok(None) => break false,
                Err(e) => break run_ended(e)?,
            }
        };
        history.exception_occurred = exception_occurred;

        info!(
            class = %request.class_name,
            variables = history.variables.len(),
            exception_occurred,
            "variable history finished"
        );
        Ok(if unique { history.into_unique() } else { history })
    }
}
