//! Shared CLI argument structs for consistent flag definitions across commands.
//!
//! Use `#[command(flatten)]` to include them in command-specific Args structs.

use clap::Args;

use crate::output::OutputFormat;

// ============================================================================
// FormatArgs - Output format flags
// ============================================================================

/// Common output format flags.
///
/// Provides consistent --format/-f and --json flags across commands.
/// Use `resolve()` to get the effective format with TTY auto-detection.
#[derive(Args, Clone, Debug, Default)]
pub struct FormatArgs {
    /// Output format (auto-detects TTY for pretty vs plain)
    #[arg(short = 'f', long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Output as JSON (shorthand for --format=json)
    #[arg(long, conflicts_with = "format", global = true)]
    pub json: bool,
}

impl FormatArgs {
    /// Resolve the effective output format.
    ///
    /// --json wins, then --format, then BLOGDESK_FORMAT, then pretty.
    /// Pretty downgrades to plain when stdout is not a TTY.
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format
            .or_else(OutputFormat::from_env)
            .unwrap_or_default()
            .resolve()
    }
}

// ============================================================================
// PageArgs - Pagination flags
// ============================================================================

/// Pagination flags for list endpoints.
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = 10)]
    pub size: u32,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shorthand_wins() {
        let args = FormatArgs {
            format: None,
            json: true,
        };
        assert_eq!(args.resolve(), OutputFormat::Json);
    }

    #[test]
    fn test_explicit_machine_format_is_kept() {
        let args = FormatArgs {
            format: Some(OutputFormat::Yaml),
            json: false,
        };
        assert_eq!(args.resolve(), OutputFormat::Yaml);
    }

    #[test]
    fn test_page_defaults() {
        let page = PageArgs::default();
        assert_eq!((page.page, page.size), (1, 10));
    }
}
