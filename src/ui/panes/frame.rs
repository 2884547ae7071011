//! Frame pane: where the step is and what the variables hold

use crate::trace::{StepKind, StepRecord, TypedValue, Variables};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn value_style(value: &TypedValue) -> Style {
    let color = match value {
        TypedValue::String(_) => DEFAULT_THEME.string,
        TypedValue::Int(_) | TypedValue::Float(_) | TypedValue::Bool(_) | TypedValue::Null => {
            DEFAULT_THEME.number
        }
        TypedValue::ObjectReference(_) => DEFAULT_THEME.comment,
        TypedValue::Array(_) => DEFAULT_THEME.fg,
    };
    Style::default().fg(color)
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Variables sorted by name, indented under a header
fn variable_lines(title: &str, vars: &Variables, lines: &mut Vec<Line<'static>>) {
    lines.push(section_header(title));
    if vars.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none)",
            Style::default().fg(DEFAULT_THEME.comment),
        )));
        return;
    }
    let mut names: Vec<&String> = vars.keys().collect();
    names.sort();
    for name in names {
        let value = &vars[name];
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", name), Style::default().fg(DEFAULT_THEME.fg)),
            Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(value.to_string(), value_style(value)),
        ]));
    }
}

/// Every line the pane shows for `record`
pub fn frame_lines(record: &StepRecord) -> Vec<Line<'static>> {
    let event = &record.event;
    let mut lines = Vec::new();

    let (kind, kind_color) = match event.kind {
        StepKind::Step => ("step", DEFAULT_THEME.fg),
        StepKind::MethodEntry => ("enter", DEFAULT_THEME.success),
        StepKind::MethodExit => ("exit", DEFAULT_THEME.secondary),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} ", kind),
            Style::default().fg(kind_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            event.label.clone().unwrap_or_else(|| "?".to_string()),
            Style::default().fg(DEFAULT_THEME.function),
        ),
    ]));

    let mut location = Vec::new();
    if let Some(thread) = &event.thread {
        location.push(format!("thread={}", thread));
    }
    if let Some(line) = event.line {
        location.push(format!("line={}", line));
    }
    if let Some(bci) = event.bci {
        location.push(format!("bci={}", bci));
    }
    if !location.is_empty() {
        lines.push(Line::from(Span::styled(
            location.join(" "),
            Style::default().fg(DEFAULT_THEME.comment),
        )));
    }

    if let Some(value) = &event.return_value {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                "return ",
                Style::default()
                    .fg(DEFAULT_THEME.return_value)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(value.to_string(), value_style(value)),
        ]));
    }

    if let Some(call) = &record.call {
        lines.push(Line::default());
        variable_lines("Arguments", call, &mut lines);
    }
    if let Some(locals) = &record.locals {
        lines.push(Line::default());
        variable_lines("Locals", locals, &mut lines);
    }

    lines
}

pub fn render_frame_pane(
    frame: &mut Frame,
    area: Rect,
    record: Option<&StepRecord>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    let block = Block::default()
        .title(" Frame ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = match record {
        Some(record) => frame_lines(record),
        None => vec![Line::from(Span::styled(
            "no steps recorded",
            Style::default().fg(DEFAULT_THEME.comment),
        ))],
    };

    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll = (*scroll).min(max_scroll);

    let visible: Vec<Line> = lines.into_iter().skip(*scroll).collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);
}
