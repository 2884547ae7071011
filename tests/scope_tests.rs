// Working directory handling around trace runs
//
// Every case lives in one test: the working directory is process-wide.

mod common;

use common::spawned;
use jdbtrace::config::TraceConfig;
use jdbtrace::session::{ScriptedChannel, ScriptedLauncher, SessionError};
use jdbtrace::tracer::{TraceRequest, Tracer};
use std::sync::Arc;

fn tracer(launcher: ScriptedLauncher) -> Tracer {
    let config = TraceConfig {
        compile: false,
        ..TraceConfig::default()
    };
    Tracer::new(config).with_launcher(Arc::new(launcher))
}

#[test]
fn test_working_directory_is_restored() {
    let start = std::env::current_dir().unwrap();
    let dir = tempfile::tempdir().unwrap();

    // jdb cannot be launched at all
    let err = tracer(ScriptedLauncher::new())
        .program_trace(&TraceRequest::new("Main").path(dir.path()))
        .unwrap_err();
    assert!(matches!(err, SessionError::Launch { .. }));
    assert_eq!(std::env::current_dir().unwrap(), start);

    // jdb quits before the breakpoint is set
    let jdb = ScriptedChannel::new()
        .output("Initializing jdb ...\r\n> ")
        .on_exit("stop in Main.main", "Error: could not find class Main\r\n");
    let err = tracer(ScriptedLauncher::new().channel(jdb))
        .variable_history(&TraceRequest::new("Main").path(dir.path()), false)
        .unwrap_err();
    assert!(err.is_host_exit());
    assert_eq!(std::env::current_dir().unwrap(), start);

    // The program throws on its first statement
    let jdb = spawned("Div").on(
        "step in",
        "> \r\nException occurred: java.lang.ArithmeticException (uncaught)\"thread=main\", Div.main(), line=3 bci=2\r\n",
    );
    let trace = tracer(ScriptedLauncher::new().channel(jdb))
        .program_trace(&TraceRequest::new("Div").path(dir.path()))
        .unwrap();
    assert!(trace.exception_occurred);
    assert_eq!(std::env::current_dir().unwrap(), start);
}
