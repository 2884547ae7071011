// Session controller: drives one jdb REPL over a channel

use super::channel::{Channel, Expectation, Launcher, PtyLauncher};
use super::constants::DEFAULT_EXCLUDED;
use super::errors::{SessionError, SessionResult};
use super::launch::{java_debug_command, jdb_attach_command, jdb_command, ClassPath, LaunchCommand};
use crate::config::TraceConfig;
use crate::parser::patterns::{
    dump_pattern, BREAKPOINT_HIT, BREAKPOINT_SET, LISTENING, LOCALS_RESPONSE,
    LOCAL_VARIABLES_HEADER, METHOD_ARGUMENTS_HEADER, METHOD_ENTERED_MARKER, PROMPT, STEP_EXPECT,
};
use crate::parser::{parse_step_event, parse_step_output, parse_value, parse_values};
use crate::trace::{Frame, StepKind, StepRecord, TraceHistory, TypedValue};
use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which flavour of `step` to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepModifier {
    /// `step`
    Plain,
    /// `step in`
    #[default]
    In,
    /// `step up`: run until the current method returns
    Up,
}

impl StepModifier {
    pub fn suffix(self) -> &'static str {
        match self {
            StepModifier::Plain => "",
            StepModifier::In => " in",
            StepModifier::Up => " up",
        }
    }
}

/// A jdb session on one class
///
/// Created unspawned; [`spawn`](Self::spawn) starts jdb (and, in attach
/// mode, the debuggee), stops at the entry method and turns on method
/// tracing. Every protocol operation returns `Ok(None)` while the session is
/// not active. Dropping the session closes it.
pub struct JdbSession {
    class_name: String,
    class_path: Option<ClassPath>,
    entry_method: String,
    excluded: Vec<String>,
    config: TraceConfig,
    launcher: Arc<dyn Launcher>,

    /// The jdb REPL
    pty: Option<Box<dyn Channel>>,

    /// The debuggee, only in attach mode
    target: Option<Box<dyn Channel>>,

    trace: TraceHistory,
}

impl JdbSession {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self::with_config(class_name, TraceConfig::default())
    }

    pub fn with_config(class_name: impl Into<String>, config: TraceConfig) -> Self {
        JdbSession {
            class_name: class_name.into(),
            class_path: None,
            entry_method: config.entry_method.clone(),
            excluded: config.excluded.clone(),
            trace: TraceHistory::new(config.trace_capacity),
            launcher: Arc::new(PtyLauncher),
            pty: None,
            target: None,
            config,
        }
    }

    /// Start processes through `launcher` instead of on a pseudo-terminal
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn class_path(mut self, class_path: impl Into<ClassPath>) -> Self {
        self.class_path = Some(class_path.into());
        self
    }

    pub fn entry_method(mut self, method: impl Into<String>) -> Self {
        self.entry_method = method.into();
        self
    }

    /// Suppress step events in classes matching `pattern` (e.g. `org.junit.*`)
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excluded.push(pattern.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// jdb is running and its output has not ended
    pub fn is_active(&self) -> bool {
        self.pty
            .as_ref()
            .is_some_and(|pty| !pty.is_closed() && !pty.is_eof())
    }

    /// A separately launched debuggee is attached
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn trace(&self) -> &TraceHistory {
        &self.trace
    }

    pub fn set_trace_capacity(&mut self, capacity: Option<usize>) {
        self.trace.set_capacity(capacity);
    }

    /// The command that launches jdb on the class directly
    pub fn launch_command(&self, extra_args: &[String]) -> LaunchCommand {
        jdb_command(
            &self.config,
            &self.class_name,
            self.class_path.as_ref(),
            extra_args,
        )
    }

    /// Comma-separated exclusion list sent to jdb
    pub fn exclusions(&self) -> String {
        DEFAULT_EXCLUDED
            .iter()
            .map(|p| p.to_string())
            .chain(self.excluded.iter().filter(|p| !p.is_empty()).cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Start jdb and stop at the first line of the entry method.
    ///
    /// With `capture_target` the class runs in its own JVM and jdb attaches
    /// to it, which leaves the program's standard input free for
    /// [`send_target_line`](Self::send_target_line). Any previous session
    /// is closed first; the trace is empty afterwards.
    pub fn spawn(&mut self, extra_args: &[String], capture_target: bool) -> SessionResult<()> {
        self.close();
        info!(
            class = %self.class_name,
            entry = %self.entry_method,
            attach = capture_target,
            "spawning jdb session"
        );

        let result = self.start(extra_args, capture_target);
        if let Err(e) = &result {
            warn!(error = %e, "jdb session failed to start");
            self.close();
        }
        result
    }

    fn start(&mut self, extra_args: &[String], capture_target: bool) -> SessionResult<()> {
        if capture_target {
            let port = self.config.debug_port;
            let java = java_debug_command(
                &self.config,
                &self.class_name,
                self.class_path.as_ref(),
                extra_args,
                port,
            );
            let mut target = self.launcher.launch(&java)?;
            target.expect(&LISTENING, self.config.timeout)?;
            // Nothing reads the program's own output from here on
            target.discard_output();
            self.target = Some(target);
            self.pty = Some(self.launcher.launch(&jdb_attach_command(&self.config, port))?);
        } else {
            let jdb = self.launch_command(extra_args);
            self.pty = Some(self.launcher.launch(&jdb)?);
        }

        let breakpoint = format!("stop in {}.{}", self.class_name, self.entry_method);
        self.send(&breakpoint)?;
        self.expect(&BREAKPOINT_SET)?;
        self.send("run")?;
        self.expect(&BREAKPOINT_HIT)?;

        let exclude = format!("exclude {}", self.exclusions());
        self.send(&exclude)?;
        self.send("trace methods 1")?;

        // Consumes the breakpoint banner and the prompts of the commands above
        self.locals()?;
        self.trace.clear();
        info!(class = %self.class_name, "jdb session ready");
        Ok(())
    }

    /// Release jdb and the debuggee. Never fails; safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut pty) = self.pty.take() {
            match pty.close() {
                Ok(()) => info!(class = %self.class_name, "closed jdb session"),
                Err(e) => debug!(error = %e, "error while closing jdb"),
            }
        }
        if let Some(mut target) = self.target.take() {
            if let Err(e) = target.close() {
                debug!(error = %e, "error while closing debuggee");
            }
        }
    }

    /// Write one line to the debuggee's standard input.
    ///
    /// Returns false when there is no separate debuggee or the write fails.
    pub fn send_target_line(&mut self, line: &str) -> bool {
        let Some(target) = self.target.as_mut() else {
            return false;
        };
        match target.send_line(line) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to write to debuggee");
                false
            }
        }
    }

    /// Feed a whole file to the debuggee's standard input, line by line
    pub fn send_target_file(&mut self, path: &Path) -> bool {
        if self.target.is_none() {
            return false;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read input file");
                return false;
            }
        };
        contents.lines().all(|line| self.send_target_line(line))
    }

    /// Execute one step and record it.
    ///
    /// Fails with [`SessionError::HostExited`] when the program ends and with
    /// [`SessionError::HostError`] on an uncaught exception or any output that
    /// is not a step event.
    pub fn step(
        &mut self,
        modifier: StepModifier,
        include_locals: bool,
    ) -> SessionResult<Option<StepRecord>> {
        if !self.is_active() {
            return Ok(None);
        }

        let command = format!("step{}", modifier.suffix());
        self.send(&command)?;
        let header = self.expect(&STEP_EXPECT)?;
        if !parse_step_event(&header.after).is_some_and(|event| !event.is_empty()) {
            return Err(SessionError::HostError {
                output: header.after,
            });
        }
        let entered = header.before.trim_end().ends_with(METHOD_ENTERED_MARKER);

        // The source listing arrives after the header, up to the next prompt
        let listing = self.expect(&PROMPT)?;
        let event = parse_step_output(&header.after, &listing.before, entered).unwrap_or_default();
        let mut record = StepRecord::new(event);

        let frame = self.locals()?.unwrap_or_default();
        if record.kind() == StepKind::MethodEntry {
            record.call = Some(frame.arguments);
        }
        if include_locals {
            record.locals = Some(frame.locals);
        }

        self.trace.push(record.clone());
        Ok(Some(record))
    }

    /// Arguments and locals of the current frame
    pub fn locals(&mut self) -> SessionResult<Option<Frame>> {
        if !self.is_active() {
            return Ok(None);
        }

        self.send("locals")?;
        let response = self.expect(&LOCALS_RESPONSE)?;

        let mut frame = Frame::default();
        if response.after == METHOD_ARGUMENTS_HEADER {
            let arguments = self.expect(&LOCAL_VARIABLES_HEADER)?;
            frame.arguments = parse_values(&arguments.before);
        }
        let locals = self.expect(&PROMPT)?;
        frame.locals = parse_values(&locals.before);

        Ok(Some(frame))
    }

    /// Evaluate `dump <name>` and parse the printed value
    pub fn dump(&mut self, name: &str) -> SessionResult<Option<TypedValue>> {
        if !self.is_active() {
            return Ok(None);
        }

        // The prompt names the current thread; probe for it
        self.send("")?;
        let prompt = self.expect(&PROMPT)?.after.trim().to_string();
        let pattern = dump_pattern(name, &prompt)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        self.send(&format!("dump {}", name))?;
        let found = self.expect(&pattern)?;

        let body = found.after.strip_suffix(prompt.as_str()).unwrap_or(&found.after);
        let body = body.trim();
        let value = body
            .strip_prefix(name)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('='))
            .unwrap_or(body)
            .trim();
        Ok(Some(parse_value(value)))
    }

    fn pty(&mut self) -> SessionResult<&mut Box<dyn Channel>> {
        self.pty.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "jdb is not running").into()
        })
    }

    fn send(&mut self, line: &str) -> SessionResult<()> {
        debug!(command = line, "jdb <");
        self.pty()?.send_line(line)
    }

    fn expect(&mut self, pattern: &Regex) -> SessionResult<Expectation> {
        let timeout = self.config.timeout;
        let found = self.pty()?.expect(pattern, timeout)?;
        debug!(matched = %found.after.trim_end(), "jdb >");
        Ok(found)
    }
}

impl Drop for JdbSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::script::{ScriptedChannel, ScriptedLauncher};
    use std::time::Duration;

    #[test]
    fn test_step_modifier_commands() {
        assert_eq!(StepModifier::default(), StepModifier::In);
        assert_eq!(format!("step{}", StepModifier::Plain.suffix()), "step");
        assert_eq!(format!("step{}", StepModifier::Up.suffix()), "step up");
    }

    #[test]
    fn test_exclusions_append_extra_patterns() {
        let session = JdbSession::new("Main").exclude("org.junit.*").exclude("");
        assert_eq!(
            session.exclusions(),
            "java.*,javax.*,sun.*,com.sun.*,jdk.*,org.junit.*"
        );
    }

    #[test]
    fn test_unspawned_session_is_inactive() {
        let mut session = JdbSession::new("Main");
        assert!(!session.is_active());
        assert!(session.step(StepModifier::In, true).unwrap().is_none());
        assert!(session.locals().unwrap().is_none());
        assert!(session.dump("x").unwrap().is_none());
        assert!(!session.send_target_line("input"));
        session.close();
        session.close();
    }

    #[test]
    fn test_locals_without_debug_info() {
        let channel = ScriptedChannel::new().on(
            "locals",
            "Local variable information not available.  Compile with -g to generate variable information\r\nmain[1] ",
        );
        let mut session = JdbSession::new("Main");
        session.pty = Some(Box::new(channel));

        let frame = session.locals().unwrap().unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_failed_start_closes_session() {
        // jdb exits before confirming the breakpoint
        let jdb = ScriptedChannel::new()
            .output("Initializing jdb ...\r\n> ")
            .on_exit("stop in Main.main", "Error: could not find class\r\n");
        let launcher = Arc::new(ScriptedLauncher::new().channel(jdb));
        let mut session = JdbSession::new("Main").with_launcher(launcher.clone());

        let err = session.spawn(&[], false).unwrap_err();
        assert!(err.is_host_exit());
        assert!(!session.is_active());
        assert_eq!(launcher.launched().len(), 1);
    }

    #[test]
    fn test_close_swallows_channel_failures() {
        let mut session = JdbSession::new("Main");
        session.pty = Some(Box::new(ScriptedChannel::new().failing_close("jdb would not die")));
        session.target = Some(Box::new(ScriptedChannel::new().failing_close("java would not die")));
        assert!(session.is_active());
        assert!(session.has_target());

        session.close();
        assert!(!session.is_active());
        assert!(!session.has_target());
    }

    #[test]
    fn test_attach_mode_discards_program_output() {
        let target = ScriptedChannel::new()
            .output("Listening for transport dt_socket at address: 8899\r\nHello from main\r\n")
            .on("Ada", "Hello, Ada\r\n");
        let jdb = ScriptedChannel::new()
            .output("> ")
            .on("stop in Greet.main", "Deferring breakpoint Greet.main.\r\n> ")
            .on("run", "Breakpoint hit: \"thread=main\", Greet.main(), line=5 bci=0\r\nmain[1] ")
            .on("exclude java.*,javax.*,sun.*,com.sun.*,jdk.*", "main[1] ")
            .on("trace methods 1", "main[1] ")
            .on("locals", "No local variables\r\nmain[1] ");
        let launcher = Arc::new(ScriptedLauncher::new().channel(target).channel(jdb));
        let mut session = JdbSession::new("Greet").with_launcher(launcher);
        session.spawn(&[], true).unwrap();
        assert!(session.send_target_line("Ada"));

        let hello = Regex::new("Hello").unwrap();
        let target = session.target.as_mut().unwrap();
        assert!(target.expect(&hello, Duration::ZERO).is_err());
    }
}
