//! Output formatting utilities for the CLI.

use colored::Colorize;
use serde::Serialize;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Create an output format from a JSON flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a key-value pair.
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.bold(), value);
}

/// Print a section header.
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Print a status indicator.
pub fn status(label: &str, ok: bool) {
    let indicator = if ok { "●".green() } else { "●".red() };
    println!("  {indicator} {label}");
}

/// Print an indented block of log output.
pub fn log_excerpt(text: &str) {
    if text.trim().is_empty() {
        println!("  {}", "(log is empty)".dimmed());
        return;
    }
    for line in text.lines() {
        println!("  {} {}", "│".dimmed(), line);
    }
}

/// Print JSON output.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

/// Result output that can be formatted as text or JSON.
#[derive(Debug, Serialize)]
pub struct CommandResult<T: Serialize> {
    /// Whether the command succeeded.
    pub success: bool,
    /// Result data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    /// Create a successful result with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result that still carries data.
    pub fn failure_with(error: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error.into()),
        }
    }

    /// Print the result in the specified format.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => json(self),
            OutputFormat::Text => {
                if let Some(ref err) = self.error {
                    error(err);
                }
                Ok(())
            }
        }
    }
}
