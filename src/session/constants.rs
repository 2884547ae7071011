// Constants for driving jdb

use std::time::Duration;

/// Debugger executable
pub const JDB_NAME: &str = "jdb";

/// Flag printing the jdb version
pub const JDB_VERSION_FLAG: &str = "-version";

/// Java launcher, used in attach mode
pub const JAVA_NAME: &str = "java";

/// Java compiler
pub const JAVAC_NAME: &str = "javac";

/// JVM flags for a JDWP socket server that waits for the debugger;
/// `{port}` is substituted at launch
pub const JAVA_DEBUG_FLAGS: [&str; 2] = [
    "-Xdebug",
    "-Xrunjdwp:transport=dt_socket,address={port},server=y,suspend=y",
];

/// Port used in attach mode
pub const DEFAULT_DEBUG_PORT: u16 = 8899;

/// How long a single expect may block
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Method the initial breakpoint is placed in
pub const DEFAULT_ENTRY_METHOD: &str = "main";

/// Standard library packages whose step events are suppressed
pub const DEFAULT_EXCLUDED: [&str; 5] = ["java.*", "javax.*", "sun.*", "com.sun.*", "jdk.*"];

/// The only history a variable-history run needs at any moment
pub const VARIABLE_HISTORY_CAPACITY: usize = 5;
