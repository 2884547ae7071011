// Scoped setup and teardown around one trace run

use super::TraceRequest;
use crate::config::TraceConfig;
use crate::session::launch::javac_command;
use crate::session::{ClassPath, JdbSession, Launcher, SessionResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Changes the process working directory and restores it on drop
#[derive(Debug)]
pub struct WorkdirGuard {
    original: Option<PathBuf>,
}

impl WorkdirGuard {
    /// Enter `path`; `None` stays in the current directory
    pub fn enter(path: Option<&Path>) -> SessionResult<Self> {
        let Some(path) = path else {
            return Ok(WorkdirGuard { original: None });
        };
        let original = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        debug!(dir = %path.display(), "entered working directory");
        Ok(WorkdirGuard {
            original: Some(original),
        })
    }

    pub fn is_moved(&self) -> bool {
        self.original.is_some()
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            if let Err(e) = std::env::set_current_dir(&original) {
                warn!(dir = %original.display(), error = %e, "failed to restore working directory");
            }
        }
    }
}

/// Java sources in the current directory, sorted by name
fn java_sources() -> Vec<String> {
    let mut sources: Vec<String> = match std::fs::read_dir(".") {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "java"))
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect(),
        Err(e) => {
            warn!(error = %e, "cannot list working directory");
            Vec::new()
        }
    };
    sources.sort();
    sources
}

fn run_javac(config: &TraceConfig, class_path: &ClassPath, sources: &[String]) -> bool {
    let command = javac_command(config, class_path, sources);
    debug!(command = %command, "compiling");
    match Command::new(&command.program).args(&command.args).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!(command = %command, %status, "javac failed");
            false
        }
        Err(e) => {
            warn!(command = %command, error = %e, "cannot run javac");
            false
        }
    }
}

/// Compile with debug information so that `locals` can see variables.
///
/// Tries every `*.java` in the working directory first, then only the
/// class's own source file. Returns whether either attempt succeeded; a
/// failure is not fatal since classes may already be compiled.
pub fn compile(config: &TraceConfig, class_name: &str, class_path: &ClassPath) -> bool {
    let sources = java_sources();
    if !sources.is_empty() && run_javac(config, class_path, &sources) {
        return true;
    }

    let own_source = format!("{}.java", class_name.replace('.', "/"));
    let compiled = run_javac(config, class_path, &[own_source]);
    if !compiled {
        warn!(class = class_name, "compilation failed, using existing classes");
    }
    compiled
}

/// A spawned session inside its working directory
///
/// Dropping the scope closes the session and then restores the working
/// directory, whichever way the trace run ends.
pub struct TraceScope {
    // Field order is drop order: the session must close before leaving the directory
    session: JdbSession,
    _workdir: WorkdirGuard,
}

impl TraceScope {
    pub fn open(
        config: &TraceConfig,
        launcher: Arc<dyn Launcher>,
        request: &TraceRequest,
    ) -> SessionResult<Self> {
        let workdir = WorkdirGuard::enter(request.path.as_deref())?;
        let class_path = request.effective_class_path();

        if config.compile {
            compile(config, &request.class_name, &class_path);
        }

        let mut session = JdbSession::with_config(&request.class_name, config.clone())
            .with_launcher(launcher)
            .class_path(class_path);
        session.spawn(&request.args, request.feeds_stdin())?;
        info!(class = %request.class_name, "trace scope opened");

        Ok(TraceScope {
            session,
            _workdir: workdir,
        })
    }

    pub fn session_mut(&mut self) -> &mut JdbSession {
        &mut self.session
    }
}
