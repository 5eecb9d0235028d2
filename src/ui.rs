use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::{Display, Write as _};
use std::io::{self, Write};
use std::time::{Duration, Instant};

const LABEL_WIDTH: usize = 12;

/// How a status line is coloured and where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Working,
    Done,
    Note,
    Problem,
}

impl Tone {
    fn color(self) -> AnsiColor {
        match self {
            Tone::Working => AnsiColor::Cyan,
            Tone::Done => AnsiColor::Green,
            Tone::Note => AnsiColor::Blue,
            Tone::Problem => AnsiColor::Red,
        }
    }

    /// Problems go to stderr next to the final error and log lines.
    fn to_stderr(self) -> bool {
        self == Tone::Problem
    }
}

/// Label right-aligned in a fixed column; continuation lines are indented
/// under the message.
fn render(tone: Tone, label: &str, message: &str, color: bool) -> String {
    let style = Style::new().bold().fg_color(Some(tone.color().into()));
    let (on, off) = if color {
        (style.render().to_string(), style.render_reset().to_string())
    } else {
        (String::new(), String::new())
    };

    let mut out = String::new();
    let mut lines = message.split('\n');
    let first = lines.next().unwrap_or_default();
    let _ = writeln!(out, "{on}{label:>LABEL_WIDTH$}{off} {first}");
    for line in lines {
        let _ = writeln!(out, "{:LABEL_WIDTH$} {line}", "");
    }
    out
}

fn emit(tone: Tone, label: &str, message: &str) {
    let color_allowed = std::env::var_os("NO_COLOR").is_none();
    let result = if tone.to_stderr() {
        let mut err = io::stderr().lock();
        let text = render(tone, label, message, color_allowed && err.is_terminal());
        err.write_all(text.as_bytes()).and_then(|()| err.flush())
    } else {
        let mut out = io::stdout().lock();
        let text = render(tone, label, message, color_allowed && out.is_terminal());
        out.write_all(text.as_bytes()).and_then(|()| out.flush())
    };
    // A closed pipe is not worth failing a finished relocation over.
    let _ = result;
}

fn elapsed(duration: Duration) -> String {
    match duration.as_millis() {
        0 => format!("{}µs", duration.as_micros()),
        ms @ 1..=999 => format!("{ms}ms"),
        _ => format!("{:.1}s", duration.as_secs_f64()),
    }
}

/// Print plain text to stdout, no label.
pub fn plain(message: impl Display) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{message}").and_then(|()| out.flush());
}

pub fn status(label: &str, message: impl Display) {
    emit(Tone::Working, label, &message.to_string());
}

pub fn info(message: impl Display) {
    emit(Tone::Note, "Info", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    emit(Tone::Done, label, &message.to_string());
}

/// Timed status line, opened on creation and closed by `success` or `fail`.
///
/// Dropping it unclosed reports the step as interrupted.
pub struct Progress {
    message: String,
    started: Instant,
    open: bool,
}

impl Progress {
    pub fn new(label: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        emit(Tone::Working, label, &message);
        Self {
            message,
            started: Instant::now(),
            open: true,
        }
    }

    pub fn success(mut self, label: &str, detail: Option<String>) {
        self.open = false;
        let detail = detail.filter(|d| !d.is_empty()).map(|d| format!(" {d}"));
        emit(
            Tone::Done,
            label,
            &format!(
                "{}{} in {}",
                self.message,
                detail.unwrap_or_default(),
                elapsed(self.started.elapsed())
            ),
        );
    }

    /// Close the line as failed. The error itself is left to the caller.
    pub fn fail(mut self, label: &str) {
        self.open = false;
        emit(
            Tone::Problem,
            label,
            &format!("{} after {}", self.message, elapsed(self.started.elapsed())),
        );
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.open {
            emit(Tone::Problem, "Interrupted", &self.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_picks_a_readable_unit() {
        assert_eq!(elapsed(Duration::from_micros(250)), "250µs");
        assert_eq!(elapsed(Duration::from_millis(12)), "12ms");
        assert_eq!(elapsed(Duration::from_millis(1500)), "1.5s");
        assert_eq!(elapsed(Duration::from_secs(125)), "125.0s");
    }

    #[test]
    fn render_aligns_label_and_indents_continuation_lines() {
        let text = render(Tone::Done, "Relocated", "eslint\ntsc", false);
        assert_eq!(text, "   Relocated eslint\n             tsc\n");
    }

    #[test]
    fn render_colours_only_the_label() {
        let text = render(Tone::Problem, "Failed", "moving", true);
        assert!(text.starts_with("\u{1b}["));
        assert!(text.ends_with("Failed\u{1b}[0m moving\n"));
    }
}
