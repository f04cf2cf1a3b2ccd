//! Terminal capability detection and utilities

use std::time::Duration;

use bloodbank::{Notice, RequestStatus};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// A request status, colored by where it sits in the lifecycle.
pub fn status_label(status: RequestStatus) -> String {
    match status {
        RequestStatus::Pending => status.as_str().info(),
        RequestStatus::Approved | RequestStatus::Fulfilled => status.as_str().success(),
        RequestStatus::Denied => status.as_str().warning(),
    }
}

/// Prints a notice: successes to stdout in green, errors to stderr in amber.
pub fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{}", format!("✗ {}", notice.text).warning());
    } else {
        println!("{}", format!("✓ {}", notice.text).success());
    }
}

/// Prints rows under aligned headers, or stacked on narrow terminals.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if is_narrow() {
        for row in rows {
            for (header, value) in headers.iter().zip(row) {
                println!("{}: {value}", header.dim());
            }
            println!();
        }
        return;
    }

    // Determine column widths for alignment.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| visible_width(&row[idx]))
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            let padding = width.saturating_sub(visible_width(value));
            print!("{value}{:padding$}  ", "");
        }
        println!();
    }
}

/// Display width of `text`, ignoring ANSI color sequences.
fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match c {
            '\x1b' => in_escape = true,
            'm' if in_escape => in_escape = false,
            _ if in_escape => {}
            _ => width += 1,
        }
    }
    width
}

/// A spinner shown while a backend call is in flight.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Lets the user pick one of `items`. Returns `None` if they cancel.
pub fn choose(prompt: &str, items: &[String]) -> anyhow::Result<Option<usize>> {
    Ok(dialoguer::Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()?)
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_take_no_width() {
        assert_eq!(visible_width("Pending"), 7);
        assert_eq!(visible_width("\x1b[38;2;0;128;0mApproved\x1b[39m"), 8);
        assert_eq!(visible_width("–"), 1);
    }
}
