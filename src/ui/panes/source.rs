//! Java source pane with the current line highlighted
//!
//! Highlighting uses a small per-line scanner (comments, string and char
//! literals, numbers, keywords, calls) rather than a real lexer. When the
//! source file cannot be found the pane falls back to the instruction text
//! jdb echoed for the step.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "continue", "default", "do", "else",
    "enum", "extends", "final", "finally", "for", "if", "implements", "import", "instanceof",
    "interface", "new", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "synchronized", "this", "throw", "throws", "try", "var", "while", "yield",
];

const TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void", "String",
    "Object", "Integer",
];

fn word_style(word: &str, is_call: bool) -> Style {
    if TYPES.contains(&word) {
        Style::default().fg(DEFAULT_THEME.type_name)
    } else if KEYWORDS.contains(&word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if matches!(word, "null" | "true" | "false") || word.starts_with(|c: char| c.is_ascii_digit()) {
        Style::default().fg(DEFAULT_THEME.number)
    } else if is_call {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Split one line of Java into styled spans
pub fn highlight_java(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut chars = line.char_indices().peekable();

    let flush = |spans: &mut Vec<Span<'static>>, start: &mut Option<usize>, end: usize, next: Option<char>| {
        if let Some(s) = start.take() {
            let word = &line[s..end];
            spans.push(Span::styled(word.to_string(), word_style(word, next == Some('('))));
        }
    };

    while let Some((i, c)) = chars.next() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            word_start.get_or_insert(i);
            continue;
        }
        flush(&mut spans, &mut word_start, i, Some(c));

        if c == '/' && chars.peek().is_some_and(|&(_, n)| n == '/') {
            spans.push(Span::styled(
                line[i..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            return Line::from(spans);
        }

        if c == '"' || c == '\'' {
            let mut end = line.len();
            let mut escaped = false;
            for (j, d) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if d == '\\' {
                    escaped = true;
                } else if d == c {
                    end = j + d.len_utf8();
                    break;
                }
            }
            spans.push(Span::styled(
                line[i..end].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            continue;
        }

        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(c.to_string(), style));
    }
    flush(&mut spans, &mut word_start, line.len(), None);

    Line::from(spans)
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; centered on first render
    pub target_line_row: Option<usize>,
}

pub struct SourceRenderData<'a> {
    pub title: &'a str,
    /// Full file contents, if found
    pub source: Option<&'a str>,
    /// 1-based line of the current step
    pub current_line: Option<usize>,
    /// Text jdb printed for the current line
    pub instruction: Option<&'a str>,
    /// The run ended in an exception and this is the last step
    pub is_error: bool,
}

pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: &SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    let block = Block::default()
        .title(format!(" {} ", data.title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let Some(source) = data.source else {
        let line = match (data.current_line, data.instruction) {
            (Some(n), Some(text)) => {
                let mut spans = vec![Span::styled(
                    format!("{:4} ", n),
                    Style::default().fg(DEFAULT_THEME.secondary),
                )];
                spans.extend(highlight_java(text).spans);
                Line::from(spans)
            }
            (_, Some(text)) => highlight_java(text),
            _ => Line::from(Span::styled(
                "source not available",
                Style::default().fg(DEFAULT_THEME.comment),
            )),
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    };

    let lines: Vec<&str> = source.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    let current_line = data.current_line.unwrap_or(0);
    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let is_current = idx + 1 == current_line;
            let mut content = highlight_java(line);

            let num_style = if is_current && data.is_error {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            if is_current {
                let bg = if data.is_error {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.current_line_bg
                };
                for span in &mut content.spans {
                    span.style = span.style.bg(bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}
