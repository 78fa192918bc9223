//! Output formatting utilities with TTY auto-detection and semantic styling.

use std::io::IsTerminal;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use termimad::MadSkin;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::env_string;

/// Output format for commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-optimized: colors, tables, rendered markdown
    #[default]
    Pretty,
    /// Script-friendly: no colors, pipe-delimited
    Plain,
    /// Machine-readable JSON
    Json,
    /// Machine-readable YAML
    Yaml,
}

impl OutputFormat {
    /// Resolve the output format, applying TTY auto-detection.
    ///
    /// If format is Pretty but stdout is not a TTY, returns Plain.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Pretty if !std::io::stdout().is_terminal() => OutputFormat::Plain,
            other => other,
        }
    }

    /// Format named by `BLOGDESK_FORMAT`, if set and valid.
    pub fn from_env() -> Option<Self> {
        env_string("BLOGDESK_FORMAT").and_then(|v| Self::from_str(&v, true).ok())
    }
}

/// Print a serializable value as JSON or YAML.
///
/// Returns `Ok(false)` for the human formats so callers fall through to
/// their own rendering.
pub fn print_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
) -> Result<bool, String> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| format!("JSON serialization failed: {}", e))?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value)
                .map_err(|e| format!("YAML serialization failed: {}", e))?;
            print!("{}", yaml);
            Ok(true)
        }
        OutputFormat::Pretty | OutputFormat::Plain => Ok(false),
    }
}

// ============================================================================
// Semantic Styling - Centralized color/style decisions
// ============================================================================

/// Article audit status colors.
/// - Green: published
/// - Yellow: waiting for review
/// - Red: rejected
/// - Dimmed: drafts
pub fn style_status(status: &str) -> ColoredString {
    match status.to_ascii_uppercase().as_str() {
        "PUBLISHED" | "APPROVED" => status.green(),
        "PENDING" => status.yellow(),
        "REJECTED" => status.red(),
        "DRAFT" => status.dimmed(),
        _ => status.normal(),
    }
}

/// Shift colors for the schedule board.
pub fn style_shift(shift: &str) -> ColoredString {
    match shift {
        "A班" => shift.green(),
        "B班" => shift.yellow(),
        "C班" => shift.blue(),
        "休息" => shift.dimmed(),
        _ => shift.normal(),
    }
}

/// Style for IDs - always dimmed.
pub fn style_id(id: impl std::fmt::Display) -> ColoredString {
    id.to_string().dimmed()
}

/// Style for view names and TOC anchors (cyan is reserved for UI markers).
pub fn style_marker(text: &str) -> ColoredString {
    text.cyan()
}

// ============================================================================
// Terminal utilities
// ============================================================================

/// Get terminal width, defaulting to 80 if unavailable.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

// ============================================================================
// Markdown
// ============================================================================

/// Render markdown for the terminal, honouring the dark-mode preference.
pub fn render_markdown(text: &str, dark: bool) -> String {
    let skin = if dark {
        MadSkin::default_dark()
    } else {
        MadSkin::default_light()
    };
    let mut buf = Vec::new();
    skin.write_text_on(&mut buf, text).ok();
    String::from_utf8_lossy(&buf).trim_end().to_string()
}

// ============================================================================
// Date formatting
// ============================================================================

/// Parse a backend timestamp (`2024-03-01T08:30:00`, optionally with an offset).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Format a backend timestamp as a short date, falling back to the raw text.
pub fn format_date(s: &str) -> String {
    parse_timestamp(s)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| s.to_string())
}

/// Format a datetime as short relative time (e.g., "5m", "3h", "2d", "1w", "2mo", "1y").
pub fn format_relative_short(dt: DateTime<Local>) -> String {
    let duration = Local::now().signed_duration_since(dt);

    let seconds = duration.num_seconds().abs();
    let minutes = duration.num_minutes().abs();
    let hours = duration.num_hours().abs();
    let days = duration.num_days().abs();

    if seconds < 60 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if hours < 24 {
        format!("{}h", hours)
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

// ============================================================================
// Text utilities
// ============================================================================

/// Truncate a string to `max_width` terminal columns, showing "prefix…".
///
/// Widths are measured in columns, so CJK text takes two per character.
pub fn truncate_back(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// First `max_chars` characters of `s` on one line, for list summaries.
pub fn summary(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_back_ascii() {
        assert_eq!(truncate_back("hello", 10), "hello");
        assert_eq!(truncate_back("hello world", 6), "hello…");
        assert_eq!(truncate_back("hello", 1), "…");
    }

    #[test]
    fn test_truncate_back_counts_wide_chars() {
        // Each CJK character is two columns wide
        assert_eq!(truncate_back("排班表模板", 10), "排班表模板");
        assert_eq!(truncate_back("排班表模板", 7), "排班表…");
        assert!(truncate_back("排班表模板", 7).width() <= 7);
    }

    #[test]
    fn test_summary_flattens_whitespace() {
        assert_eq!(summary("a\n\nb   c", 10), "a b c");
        assert_eq!(summary("abcdef", 3), "abc...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-01T08:30:00"), "2024-03-01");
        assert_eq!(format_date("2024-03-01 08:30:00"), "2024-03-01");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_structured_skips_human_formats() {
        assert_eq!(print_structured(OutputFormat::Plain, &[1, 2]), Ok(false));
    }
}
