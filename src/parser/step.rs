//! Step event extraction
//!
//! jdb reports a position change as a header line, optionally followed by
//! the source line it stopped on:
//!
//! ```text
//! Step completed: "thread=main", IterPower.main(), line=16 bci=0
//! 16    	    int base = 10;
//! ```
//!
//! With `trace methods 1` active the header may instead announce a method
//! entry (`Method entered: ` on a line of its own before the step completion)
//! or exit (`Method exited: return value = 10000,`). The header and the
//! listing are merged into one [`StepEvent`].

use super::patterns::{EXCEPTION_MARKER, LINE_LISTING, METHOD_ENTERED_MARKER, STEP_LOCATION};
use super::value::parse_value;
use crate::trace::record::{StepEvent, StepKind};

/// Parse the text that ended a `step` command.
///
/// Returns `None` for exception events; those are handled by the session.
/// An event where nothing matched is returned as an empty [`StepEvent`].
pub fn parse_step_event(raw: &str) -> Option<StepEvent> {
    parse_step_output(raw, "", false)
}

/// Parse a step reply read in two parts: the event `header` and the
/// `listing` that follows it up to the next prompt.
///
/// `entered` marks a method entry announced before the header itself, as
/// jdb does when the entry and the step completion arrive as separate lines.
pub fn parse_step_output(header: &str, listing: &str, entered: bool) -> Option<StepEvent> {
    if header.contains(EXCEPTION_MARKER) {
        return None;
    }

    let mut event = StepEvent::default();

    if let Some(caps) = STEP_LOCATION.captures(header) {
        let return_token = caps.get(2).map(|m| m.as_str());

        event.kind = if return_token.is_some() {
            StepKind::MethodExit
        } else if entered || header.contains(METHOD_ENTERED_MARKER) {
            StepKind::MethodEntry
        } else {
            StepKind::Step
        };
        event.return_value = return_token.map(parse_value);
        event.thread = caps.get(3).map(|m| m.as_str().to_string());
        event.label = caps.get(4).map(|m| m.as_str().to_string());
        event.method = caps
            .get(5)
            .map(|m| m.as_str().trim_start_matches('.').to_string());
        event.line = caps.get(6).and_then(|m| m.as_str().parse().ok());
        event.bci = caps.get(7).and_then(|m| m.as_str().parse().ok());
    }

    apply_listing(&mut event, header);
    apply_listing(&mut event, listing);
    Some(event)
}

/// The listing is more precise than the header when both are present
fn apply_listing(event: &mut StepEvent, text: &str) {
    let Some(caps) = LINE_LISTING.captures(text) else {
        return;
    };
    if let Some(line) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
        event.line = Some(line);
    }
    event.instruction = caps.get(2).map(|m| m.as_str().to_string());
}
