//! The textual contract with jdb
//!
//! Every pattern the session matches against REPL output is defined here, so a
//! jdb release that rewords its messages only needs changes in this file.
//! Message texts come from jdb's `TTYResources`.
//!
//! jdb runs behind a pseudo-terminal, so lines end in `\r\n`.

use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in jdb pattern {:?}: {}", pattern, e),
    }
}

/// Marker of an uncaught exception event
pub const EXCEPTION_MARKER: &str = "Exception occurred:";

/// Marker of a method-entry event
pub const METHOD_ENTERED_MARKER: &str = "Method entered:";

/// Header printed by `locals` when the frame has debug information
pub const METHOD_ARGUMENTS_HEADER: &str = "Method arguments:";

/// The header line of whatever ends a `step`: a step completion, a method
/// entry or exit, or an exception.
///
/// Only a complete line matches. JDK 17 prints a method entry as
/// `Method entered: \r\nStep completed: ...`; older releases put the location
/// on the entry line itself. The source listing and the prompt that follow
/// are read separately.
pub static STEP_EXPECT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(Exception occurred:|Method entered: ?\r\nStep completed:|Step completed:|Method entered: |Method exited: [^,\r\n]+, )[^\r\n]+\r\n",
    )
});

/// Event header.
///
/// Groups: 1 title, 2 return value (exits only), 3 thread, 4 `Class.method()`,
/// 5 last `.method` segment, 6 line, 7 bci.
pub static STEP_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(Step completed:|Method entered:|Method exited: return value = ([^,]+),) "thread=([^"]*)", ([^.]+(\.[^.]+)+\(\)), line=([0-9]+) bci=([0-9]+)"#,
    )
});

/// Source listing echoed after an event: `<line> <source text>` at the start of a line
pub static LINE_LISTING: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^([0-9]+)[ \t]+([^\r\n]+)"));

/// First response to `locals`
pub static LOCALS_RESPONSE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(No local variables[^\r\n]*|[^\r\n]*ocal variable information not available[^\r\n]*|Method arguments:)",
    )
});

/// Separates method arguments from the other locals
pub static LOCAL_VARIABLES_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Local variables:"));

/// Interactive prompt once a thread is suspended, e.g. `main[1] `.
///
/// The thread name is a single word, which keeps array-typed locals such as
/// `arr = instance of int[3] (id=5)` from being taken for a prompt.
pub static PROMPT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^[^\s\[\]=]+\[\d+\] "));

/// Confirmation of `stop in` before the class is loaded (or after, when attaching late)
pub static BREAKPOINT_SET: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(Deferring breakpoint|Set breakpoint)[^\r\n]*"));

pub static BREAKPOINT_HIT: LazyLock<Regex> = LazyLock::new(|| compile(r"Breakpoint hit:"));

/// Announcement of a JVM started with a JDWP server socket
pub static LISTENING: LazyLock<Regex> = LazyLock::new(|| compile(r"Listening[^:]*: \d+"));

/// A bare version token in `jdb -version` output
pub static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[0-9]+(\.[0-9]+(\.[0-9]+)?)?$"));

/// Escape a captured prompt so it can be matched literally
pub fn escape_prompt(prompt: &str) -> String {
    regex::escape(prompt)
}

/// Pattern matching the output of `dump <name>` up to the next prompt
pub fn dump_pattern(name: &str, prompt: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?s){} = .*{}",
        regex::escape(name),
        escape_prompt(prompt)
    ))
}
