// Trace orchestration tests: full traces and variable histories

mod common;

use common::{exits, frame_reply, method_entered, spawned, step_completed, step_reply, MAIN_ARGS};
use jdbtrace::config::TraceConfig;
use jdbtrace::session::{ScriptedChannel, ScriptedLauncher, SessionError};
use jdbtrace::trace::{StepKind, TypedValue};
use jdbtrace::tracer::{TraceRequest, Tracer};
use std::sync::Arc;

fn tracer(channels: Vec<ScriptedChannel>) -> (Tracer, Arc<ScriptedLauncher>) {
    let launcher = Arc::new(
        channels
            .into_iter()
            .fold(ScriptedLauncher::new(), |launcher, channel| launcher.channel(channel)),
    );
    let config = TraceConfig {
        compile: false,
        ..TraceConfig::default()
    };
    (Tracer::new(config).with_launcher(launcher.clone()), launcher)
}

/// `for (int i = 0; i < 3; i++) {}` inside main, as seen by a variable-history run
/// (each step is followed by two `locals`: one from the step, one from the history)
fn counting_loop() -> ScriptedChannel {
    let mut jdb = spawned("Loop");
    let steps: [(u32, &[&str]); 4] = [
        (3, &["i = 0"]),
        (3, &["i = 1"]),
        (3, &["i = 2"]),
        (5, &[]),
    ];
    for (line, locals) in steps {
        let reply = frame_reply(&[MAIN_ARGS], locals);
        jdb = jdb
            .on(
                "step in",
                &step_completed("Loop", "main", line, line * 2, "for (int i = 0; i < 3; i++) {}"),
            )
            .on("locals", &reply)
            .on("locals", &reply);
    }
    exits(jdb)
}

#[test]
fn test_variable_history_of_counter() {
    let (tracer, _) = tracer(vec![counting_loop()]);
    let history = tracer
        .variable_history(&TraceRequest::new("Loop"), false)
        .expect("variable history failed");

    assert!(!history.exception_occurred);
    assert_eq!(
        history.get("i"),
        Some(&[TypedValue::Int(0), TypedValue::Int(1), TypedValue::Int(2)][..])
    );
    // The argument never changes, so it is recorded once
    assert_eq!(history.get("args").map(|v| v.len()), Some(1));
}

#[test]
fn test_unique_variable_history() {
    let mut jdb = spawned("Flip");
    for value in ["true", "false", "true", "false"] {
        let local = format!("b = {}", value);
        let reply = frame_reply(&[MAIN_ARGS], &[local.as_str()]);
        jdb = jdb
            .on("step in", &step_completed("Flip", "main", 4, 1, "b = !b;"))
            .on("locals", &reply)
            .on("locals", &reply);
    }
    let (tracer, _) = tracer(vec![exits(jdb)]);

    let history = tracer
        .variable_history(&TraceRequest::new("Flip"), true)
        .unwrap();
    assert_eq!(
        history.get("b"),
        Some(&[TypedValue::Bool(true), TypedValue::Bool(false)][..])
    );
}

#[test]
fn test_program_trace_collects_every_step() {
    let jdb = exits(
        spawned("IterPower")
            .on(
                "step in",
                &method_entered("IterPower", "iterPower", 7, "\tint result = 1;"),
            )
            .on("locals", &frame_reply(&["base = 10", "exp = 4"], &[]))
            .on(
                "step in",
                &step_reply(
                    "Method exited: return value = 10000, \"thread=main\", IterPower.iterPower(), line=12 bci=27",
                    12,
                    "return result;",
                ),
            )
            .on("locals", &frame_reply(&["base = 10", "exp = 0"], &["result = 10000"])),
    );
    let (tracer, launcher) = tracer(vec![jdb]);

    let trace = tracer
        .program_trace(&TraceRequest::new("IterPower").args(["10", "4"]))
        .unwrap();

    assert!(!trace.exception_occurred);
    assert_eq!(trace.steps.len(), 2);
    assert_eq!(trace.steps[0].kind(), StepKind::MethodEntry);
    assert_eq!(
        trace.steps[0].call.as_ref().unwrap()["exp"],
        TypedValue::Int(4)
    );
    assert_eq!(trace.steps[0].event.instruction.as_deref(), Some("int result = 1;"));
    assert_eq!(trace.steps[1].event.return_value, Some(TypedValue::Int(10000)));
    assert_eq!(
        trace.steps[1].locals.as_ref().unwrap()["result"],
        TypedValue::Int(10000)
    );

    // The default class path is the current directory
    let launched = launcher.launched();
    assert_eq!(launched[0].class_path_argument(), Some("."));
    assert_eq!(launched[0].args[launched[0].args.len() - 2..], ["10", "4"]);

    let json = serde_json::to_value(&trace).unwrap();
    assert_eq!(json["steps"][1]["return"], 10000);
    assert_eq!(json["steps"][0]["kind"], "method_entry");
}

#[test]
fn test_exception_on_first_statement() {
    let jdb = spawned("Div").on(
        "step in",
        "> \r\nException occurred: java.lang.ArithmeticException (uncaught)\"thread=main\", Div.main(), line=3 bci=2\r\n3    \t\tint x = 1 / 0;\r\n\r\nmain[1] ",
    );
    let (tracer, _) = tracer(vec![jdb]);

    let trace = tracer.program_trace(&TraceRequest::new("Div")).unwrap();
    assert!(trace.exception_occurred);
    assert!(trace.steps.len() <= 1);
}

#[test]
fn test_exception_in_variable_history() {
    let jdb = spawned("Div").on(
        "step in",
        "> \r\nException occurred: java.lang.ArithmeticException (uncaught)\"thread=main\", Div.main(), line=3 bci=2\r\n",
    );
    let (tracer, _) = tracer(vec![jdb]);

    let history = tracer.variable_history(&TraceRequest::new("Div"), false).unwrap();
    assert!(history.exception_occurred);
    assert!(history.variables.is_empty());
}

#[test]
fn test_timeout_is_returned_to_caller() {
    let jdb = spawned("Spin").on("step in", "");
    let (tracer, _) = tracer(vec![jdb]);

    let err = tracer.program_trace(&TraceRequest::new("Spin")).unwrap_err();
    assert!(matches!(err, SessionError::ProtocolTimeout { .. }));
}

#[test]
fn test_launch_failure_is_returned_to_caller() {
    let (tracer, _) = tracer(vec![]);
    let err = tracer.program_trace(&TraceRequest::new("Missing")).unwrap_err();
    assert!(matches!(err, SessionError::Launch { .. }));
}

#[test]
fn test_stdin_text_runs_target_separately() {
    let target = ScriptedChannel::new()
        .output("Listening for transport dt_socket at address: 8899\r\n")
        .on("Ada", "");
    let target_input = target.sent_log();
    let jdb = ScriptedChannel::new()
        .output("Initializing jdb ...\r\n> ")
        .on("stop in Greet.main", "Deferring breakpoint Greet.main.\r\n> ")
        .on(
            "run",
            "> \r\nBreakpoint hit: \"thread=main\", Greet.main(), line=5 bci=0\r\n5    \t\tString name = in.nextLine();\r\n\r\nmain[1] ",
        )
        .on(common::EXCLUDE, "main[1] ")
        .on("trace methods 1", "main[1] ")
        .on("locals", &frame_reply(&[MAIN_ARGS], &[]));
    let (tracer, launcher) = tracer(vec![target, exits(jdb)]);

    let request = TraceRequest::new("Greet")
        .class_path(vec!["lib".to_string()])
        .stdin("Ada");
    let trace = tracer.program_trace(&request).unwrap();

    assert!(trace.steps.is_empty());
    assert_eq!(*target_input.lock().unwrap(), vec!["Ada"]);

    let launched = launcher.launched();
    assert_eq!(launched.len(), 2);
    assert_eq!(launched[0].program, "java");
    let sep = jdbtrace::session::launch::PATH_SEPARATOR;
    assert_eq!(
        launched[0].class_path_argument(),
        Some(format!("lib{}.", sep).as_str())
    );
    assert_eq!(launched[1].args, vec!["-attach", "8899"]);
}
