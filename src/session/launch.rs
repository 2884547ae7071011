//! Command lines for jdb, the debuggee JVM and javac
//!
//! The class path always keeps the current directory as an entry, since that
//! is where freshly compiled classes land.

use super::constants::{JAVA_DEBUG_FLAGS, JDB_VERSION_FLAG};
use crate::config::TraceConfig;
use crate::parser::patterns::VERSION_TOKEN;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Platform path-list separator
pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// A Java class path, given either as entries or as an already joined string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassPath {
    Entries(Vec<String>),
    Joined(String),
}

impl ClassPath {
    /// The `-classpath` argument, with `.` added when missing.
    ///
    /// Entries get `.` inserted at the front; a joined string gets `.`
    /// prepended unless one of its entries already is `.`.
    pub fn to_argument(&self) -> String {
        match self {
            ClassPath::Entries(entries) => {
                let mut entries = entries.clone();
                if !entries.iter().any(|e| e == ".") {
                    entries.insert(0, ".".to_string());
                }
                entries.join(&PATH_SEPARATOR.to_string())
            }
            ClassPath::Joined(joined) => {
                if joined.split(PATH_SEPARATOR).any(|e| e == ".") {
                    joined.clone()
                } else if joined.is_empty() {
                    ".".to_string()
                } else {
                    format!(".{}{}", PATH_SEPARATOR, joined)
                }
            }
        }
    }
}

impl From<Vec<String>> for ClassPath {
    fn from(entries: Vec<String>) -> Self {
        ClassPath::Entries(entries)
    }
}

impl From<&str> for ClassPath {
    fn from(joined: &str) -> Self {
        ClassPath::Joined(joined.to_string())
    }
}

/// A program with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; the current one when `None`
    pub cwd: Option<PathBuf>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        LaunchCommand {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `-classpath`, if present
    pub fn class_path_argument(&self) -> Option<&str> {
        let index = self.args.iter().position(|a| a == "-classpath")?;
        self.args.get(index + 1).map(String::as_str)
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Append the class path and class name to a launcher command
fn with_class(
    command: LaunchCommand,
    class_name: &str,
    class_path: Option<&ClassPath>,
) -> LaunchCommand {
    let command = match class_path {
        Some(cp) => command.arg("-classpath").arg(cp.to_argument()),
        None => command,
    };
    command.arg(class_name)
}

/// `jdb [-classpath CP] Class [args...]`: jdb launches the class itself
pub fn jdb_command(
    config: &TraceConfig,
    class_name: &str,
    class_path: Option<&ClassPath>,
    args: &[String],
) -> LaunchCommand {
    with_class(LaunchCommand::new(&config.jdb), class_name, class_path).args(args.iter().cloned())
}

/// `jdb -attach PORT`: connect to an already running JVM
pub fn jdb_attach_command(config: &TraceConfig, port: u16) -> LaunchCommand {
    LaunchCommand::new(&config.jdb)
        .arg("-attach")
        .arg(port.to_string())
}

/// `java <debug flags> [-classpath CP] Class [args...]`, suspended until a debugger attaches
pub fn java_debug_command(
    config: &TraceConfig,
    class_name: &str,
    class_path: Option<&ClassPath>,
    args: &[String],
    port: u16,
) -> LaunchCommand {
    let base = LaunchCommand::new(&config.java).args(
        JAVA_DEBUG_FLAGS
            .iter()
            .map(|flag| flag.replace("{port}", &port.to_string())),
    );
    with_class(base, class_name, class_path).args(args.iter().cloned())
}

/// `javac -classpath CP -g SOURCES...`
pub fn javac_command(
    config: &TraceConfig,
    class_path: &ClassPath,
    sources: &[String],
) -> LaunchCommand {
    LaunchCommand::new(&config.javac)
        .arg("-classpath")
        .arg(class_path.to_argument())
        .arg("-g")
        .args(sources.iter().cloned())
}

/// Version reported by `jdb -version`, or `None` when jdb cannot be run
pub fn jdb_version(config: &TraceConfig) -> Option<String> {
    let output = match Command::new(&config.jdb).arg(JDB_VERSION_FLAG).output() {
        Ok(output) => output,
        Err(e) => {
            debug!(jdb = %config.jdb, error = %e, "jdb not available");
            return None;
        }
    };
    parse_version(&String::from_utf8_lossy(&output.stdout))
}

/// First whitespace-separated token shaped like `N`, `N.N` or `N.N.N`
pub fn parse_version(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| VERSION_TOKEN.is_match(token))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep() -> String {
        PATH_SEPARATOR.to_string()
    }

    #[test]
    fn test_entries_get_current_dir_in_front() {
        let cp = ClassPath::Entries(vec!["lib/a.jar".into(), "build".into()]);
        assert_eq!(
            cp.to_argument(),
            [".", "lib/a.jar", "build"].join(&sep())
        );
    }

    #[test]
    fn test_entries_with_current_dir_unchanged() {
        let cp = ClassPath::Entries(vec!["build".into(), ".".into()]);
        assert_eq!(cp.to_argument(), ["build", "."].join(&sep()));
    }

    #[test]
    fn test_joined_form() {
        assert_eq!(
            ClassPath::Joined("lib".into()).to_argument(),
            format!(".{}lib", sep())
        );
        let already = format!("lib{}.", sep());
        assert_eq!(ClassPath::Joined(already.clone()).to_argument(), already);
        assert_eq!(ClassPath::Joined(String::new()).to_argument(), ".");
    }

    #[test]
    fn test_jdb_command_layout() {
        let config = TraceConfig::default();
        let cp = ClassPath::Entries(vec!["lib".into()]);
        let cmd = jdb_command(&config, "IterPower", Some(&cp), &["3".into(), "4".into()]);
        assert_eq!(cmd.program, "jdb");
        assert_eq!(cmd.args[0], "-classpath");
        assert_eq!(cmd.args[2..], ["IterPower", "3", "4"]);
    }

    #[test]
    fn test_attach_mode_commands() {
        let config = TraceConfig::default();
        let java = java_debug_command(&config, "Echo", None, &[], 8899);
        assert_eq!(
            java.to_string(),
            "java -Xdebug -Xrunjdwp:transport=dt_socket,address=8899,server=y,suspend=y Echo"
        );
        let jdb = jdb_attach_command(&config, 8899);
        assert_eq!(jdb.to_string(), "jdb -attach 8899");
        assert_eq!(jdb.class_path_argument(), None);
    }

    #[test]
    fn test_javac_command() {
        let config = TraceConfig::default();
        let cmd = javac_command(&config, &ClassPath::Entries(vec![]), &["A.java".into()]);
        assert_eq!(cmd.to_string(), "javac -classpath . -g A.java");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("jdb version 17.0\n"), Some("17.0".to_string()));
        assert_eq!(parse_version("jdb version 1.8.0"), Some("1.8.0".to_string()));
        assert_eq!(parse_version("no version here"), None);
    }
}
