//! Trace viewer state and event loop
//!
//! The viewer replays a finished [`ProgramTrace`]: nothing talks to jdb
//! while it runs, so stepping backward is as cheap as stepping forward.

use crate::trace::StepRecord;
use crate::tracer::ProgramTrace;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::panes::{
    render_frame_pane, render_source_pane, render_status_bar, SourceRenderData,
    SourceScrollState, StatusRenderData,
};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Frame,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Frame,
            FocusedPane::Frame => FocusedPane::Source,
        }
    }
}

/// Source files looked up by class name, read at most once
#[derive(Debug, Default)]
pub struct SourceCache {
    root: PathBuf,
    files: FxHashMap<String, Option<String>>,
}

impl SourceCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SourceCache {
            root: root.into(),
            files: FxHashMap::default(),
        }
    }

    /// `pkg/Outer.java` for `pkg.Outer$Inner`
    pub fn source_path(&self, class_name: &str) -> PathBuf {
        let top_level = class_name.split('$').next().unwrap_or(class_name);
        self.root
            .join(Path::new(&top_level.replace('.', "/")).with_extension("java"))
    }

    pub fn get(&mut self, class_name: &str) -> Option<&str> {
        if !self.files.contains_key(class_name) {
            let contents = std::fs::read_to_string(self.source_path(class_name)).ok();
            self.files.insert(class_name.to_string(), contents);
        }
        self.files.get(class_name).and_then(|c| c.as_deref())
    }

    /// Use `contents` for `class_name` instead of reading from disk
    pub fn insert(&mut self, class_name: &str, contents: String) {
        self.files.insert(class_name.to_string(), Some(contents));
    }
}

/// The main application state
pub struct App {
    pub steps: Vec<StepRecord>,
    pub exception_occurred: bool,
    pub sources: SourceCache,

    /// Index of the step on screen
    pub position: usize,

    pub focused_pane: FocusedPane,
    pub source_scroll: SourceScrollState,
    pub frame_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,
    pub last_play_time: Instant,
    /// Last time space was pressed (for debouncing)
    pub last_space_press: Option<Instant>,
}

impl App {
    pub fn new(trace: ProgramTrace, sources: SourceCache) -> Self {
        let status_message = if trace.steps.is_empty() {
            "No steps recorded".to_string()
        } else {
            "Ready!".to_string()
        };
        App {
            steps: trace.steps,
            exception_occurred: trace.exception_occurred,
            sources,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            frame_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: None,
        }
    }

    pub fn current(&self) -> Option<&StepRecord> {
        self.steps.get(self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.position + 1 >= self.steps.len()
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so that auto-play keeps advancing
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let record = self.steps.get(self.position);
        let class_name = record.and_then(|r| r.event.class_name());
        let title = class_name.unwrap_or("Source").to_string();
        let source = match class_name {
            Some(class) => self.sources.get(class),
            None => None,
        };
        let is_last = self.position + 1 >= self.steps.len();

        let source_data = SourceRenderData {
            title: &title,
            source,
            current_line: record.and_then(|r| r.line()).map(|n| n as usize),
            instruction: record.and_then(|r| r.event.instruction.as_deref()),
            is_error: self.exception_occurred && is_last,
        };
        render_source_pane(
            frame,
            columns[0],
            &source_data,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        render_frame_pane(
            frame,
            columns[1],
            record,
            self.focused_pane == FocusedPane::Frame,
            &mut self.frame_scroll,
        );

        render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                message: &self.status_message,
                position: self.position,
                total: self.steps.len(),
                is_playing: self.is_playing,
                exception_occurred: self.exception_occurred,
            },
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let stepped = (0..n).take_while(|_| self.step_forward()).count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last step".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up moves the current line down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Frame => self.frame_scroll = self.frame_scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Frame => self.frame_scroll = self.frame_scroll.saturating_add(1),
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                let debounced = self
                    .last_space_press
                    .is_some_and(|t| t.elapsed() < Duration::from_millis(200));
                if !debounced {
                    self.last_space_press = Some(Instant::now());
                    self.is_playing = !self.is_playing;
                    self.status_message = if self.is_playing {
                        "Playing...".to_string()
                    } else {
                        "Paused".to_string()
                    };
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.steps.len().saturating_sub(1);
                self.frame_scroll = 0;
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.frame_scroll = 0;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Move to the next step; false at the end of the trace
    pub fn step_forward(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.position += 1;
        self.frame_scroll = 0;
        true
    }

    /// Move to the previous step; false at the start
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.frame_scroll = 0;
        true
    }
}
