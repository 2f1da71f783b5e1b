// ABOUTME: Progress and result reporting for the CLI.
// ABOUTME: Human-readable lines, quiet mode for CI, or JSON lines for scripts.

use crate::deploy::Container;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    /// Only final results and errors.
    Quiet,
    /// One JSON object per line.
    Json,
}

pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

#[derive(Serialize)]
struct Event<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<&'a Container>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    fn emit(&self, event: &str, message: &str, container: Option<&Container>, stderr: bool) {
        let event = Event {
            event,
            message,
            duration_secs: self.elapsed_secs(),
            container,
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }

    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit("progress", message, None, false),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit("warning", message, None, true),
        }
    }

    /// One line per deployed container.
    pub fn container(&self, container: &Container) {
        let id = container
            .docker_id
            .as_ref()
            .map(|id| id.short())
            .unwrap_or("-");
        let line = format!(
            "  {:<12} {:<32} {:<8} {}",
            container.name, container.image, container.status, id
        );
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{line}"),
            OutputMode::Json => self.emit("container", &container.name, Some(container), false),
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => match self.elapsed_secs() {
                Some(elapsed) => println!("{message} ({elapsed:.1}s)"),
                None => println!("{message}"),
            },
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit("success", message, None, false),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit("error", message, None, true),
        }
    }
}
