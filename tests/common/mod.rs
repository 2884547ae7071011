// Canned jdb transcripts shared by the integration tests

#![allow(dead_code)]

use jdbtrace::session::ScriptedChannel;

pub const EXCLUDE: &str = "exclude java.*,javax.*,sun.*,com.sun.*,jdk.*";

pub const MAIN_ARGS: &str = "args = instance of java.lang.String[0] (id=422)";

/// Output of `locals` for a frame compiled with `-g`
pub fn frame_reply(args: &[&str], locals: &[&str]) -> String {
    let mut out = String::from("Method arguments:\r\n");
    for line in args {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("Local variables:\r\n");
    for line in locals {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("main[1] ");
    out
}

/// Output of `step` landing on `line`
pub fn step_reply(header: &str, line: u32, source: &str) -> String {
    format!("> \r\n{}\r\n{}    \t{}\r\n\r\nmain[1] ", header, line, source)
}

pub fn step_completed(class: &str, method: &str, line: u32, bci: u32, source: &str) -> String {
    step_reply(
        &format!(
            "Step completed: \"thread=main\", {}.{}(), line={} bci={}",
            class, method, line, bci
        ),
        line,
        source,
    )
}

/// Output of `step in` entering `class.method` under `trace methods 1` (JDK 17)
pub fn method_entered(class: &str, method: &str, line: u32, source: &str) -> String {
    step_reply(
        &format!(
            "Method entered: \r\nStep completed: \"thread=main\", {}.{}(), line={} bci=0",
            class, method, line
        ),
        line,
        source,
    )
}

/// A jdb that launches `class` itself and stops in `main` at line 3
pub fn spawned(class: &str) -> ScriptedChannel {
    ScriptedChannel::new()
        .output("Initializing jdb ...\r\n> ")
        .on(
            &format!("stop in {}.main", class),
            &format!(
                "Deferring breakpoint {}.main.\r\nIt will be set after the class is loaded.\r\n> ",
                class
            ),
        )
        .on(
            "run",
            &format!(
                "run {c}\r\nSet uncaught java.lang.Throwable\r\nSet deferred uncaught java.lang.Throwable\r\n> \r\nVM Started: Set deferred breakpoint {c}.main\r\n\r\nBreakpoint hit: \"thread=main\", {c}.main(), line=3 bci=0\r\n3    \t\tint i = 0;\r\n\r\nmain[1] ",
                c = class
            ),
        )
        .on(EXCLUDE, "main[1] ")
        .on("trace methods 1", "main[1] ")
        .on("locals", &frame_reply(&[MAIN_ARGS], &[]))
}

/// End of the program: the next `step` only sees the VM exit
pub fn exits(channel: ScriptedChannel) -> ScriptedChannel {
    channel.on_exit(
        "step in",
        "\r\nThe application exited\r\n",
    )
}
