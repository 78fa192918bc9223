use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::input;
use crate::output::{self, OutputFormat};
use crate::events::Listeners;
use crate::toc::{self, HeadingPosition, ScrollEvent, ScrollSpy, TocEntry};

#[derive(Args)]
pub struct TocArgs {
    /// Markdown file (reads stdin when omitted or "-")
    file: Option<PathBuf>,

    /// Print the body with anchored headings instead of the entry list
    #[arg(long)]
    rewrite: bool,

    /// Scroll margin in pixels (default: toc.scroll_offset)
    #[arg(long)]
    offset: Option<u32>,

    /// Heading tops relative to the viewport, comma separated in TOC order.
    /// The first list is the position on mount, each further one a scroll.
    #[arg(long, value_name = "TOPS", allow_hyphen_values = true)]
    spy: Vec<String>,

    /// Click this TOC entry right after mount
    #[arg(long, value_name = "ID", requires = "spy")]
    select: Option<String>,

    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: TocArgs, desk: &Desk) -> Result<(), String> {
    let body = input::read_source(args.file.as_deref())?;
    let offset = args.offset.unwrap_or(desk.config.toc.scroll_offset);
    let doc = toc::extract_with_offset(&body, offset);

    if !args.spy.is_empty() {
        let steps = spy(&doc.entries, &args.spy, args.select.as_deref(), f64::from(offset))?;
        return print_spy(&doc.entries, &steps, args.format.resolve());
    }

    if args.rewrite {
        print!("{}", doc.body);
        return Ok(());
    }

    let format = args.format.resolve();
    if output::print_structured(format, &doc.entries)? {
        return Ok(());
    }

    if doc.entries.is_empty() {
        if format == OutputFormat::Pretty {
            println!("{}", "No headings (## to ####) found.".dimmed());
        }
        return Ok(());
    }

    for entry in &doc.entries {
        match format {
            OutputFormat::Pretty => println!("{}", pretty_line(entry)),
            _ => println!("{} | {} | {}", entry.id, entry.level, entry.text),
        }
    }

    Ok(())
}

/// Active heading after one step of a scroll spy session.
#[derive(Debug, PartialEq, Serialize)]
struct SpyStep {
    event: String,
    active: Option<String>,
}

fn positions(entries: &[TocEntry], tops: &str) -> Result<ScrollEvent, String> {
    let values = tops
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid heading position: {:?}", v.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() > entries.len() {
        return Err(format!(
            "{} positions given but only {} headings found",
            values.len(),
            entries.len()
        ));
    }
    Ok(entries
        .iter()
        .zip(values)
        .map(|(entry, top)| HeadingPosition {
            id: entry.id.clone(),
            top,
        })
        .collect())
}

/// Mount a spy on the first position list, optionally click an entry, then
/// replay the remaining lists as scroll events.
fn spy(
    entries: &[TocEntry],
    lists: &[String],
    select: Option<&str>,
    offset: f64,
) -> Result<Vec<SpyStep>, String> {
    let Some((initial, scrolls)) = lists.split_first() else {
        return Ok(Vec::new());
    };
    let scroll: Listeners<ScrollEvent> = Listeners::new();
    let spy = ScrollSpy::mount(&scroll, &positions(entries, initial)?, offset);
    log::debug!("scroll spy mounted at offset {}px", spy.offset());

    let mut steps = vec![SpyStep {
        event: "mount".to_string(),
        active: spy.active(),
    }];
    if let Some(id) = select {
        if !entries.iter().any(|e| e.id == id) {
            return Err(format!("no heading with id {}", id));
        }
        spy.select(id);
        steps.push(SpyStep {
            event: format!("select {}", id),
            active: spy.active(),
        });
    }
    for (n, tops) in scrolls.iter().enumerate() {
        scroll.emit(&positions(entries, tops)?);
        steps.push(SpyStep {
            event: format!("scroll {}", n + 1),
            active: spy.active(),
        });
    }
    Ok(steps)
}

fn print_spy(entries: &[TocEntry], steps: &[SpyStep], format: OutputFormat) -> Result<(), String> {
    if output::print_structured(format, &steps)? {
        return Ok(());
    }
    for step in steps {
        let active = step.active.as_deref();
        match format {
            OutputFormat::Pretty => {
                let label = match active.and_then(|id| entries.iter().find(|e| e.id == id)) {
                    Some(entry) => pretty_line(entry).trim_start().to_string(),
                    None => "none".dimmed().to_string(),
                };
                println!("{:<10} {}", step.event, label);
            }
            _ => println!("{} | {}", step.event, active.unwrap_or("-")),
        }
    }
    Ok(())
}

/// Indented outline line: level 2 flush, deeper levels indented.
pub fn pretty_line(entry: &TocEntry) -> String {
    let indent = "  ".repeat(usize::from(entry.level.saturating_sub(2)));
    let text = if entry.level == 2 {
        entry.text.bold().to_string()
    } else {
        entry.text.clone()
    };
    format!("{}{} {}", indent, text, output::style_id(&entry.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_line_indents_by_level() {
        colored::control::set_override(false);
        let entry = TocEntry {
            id: "heading-1".to_string(),
            text: "Deep".to_string(),
            level: 4,
        };
        assert_eq!(pretty_line(&entry), "    Deep heading-1");
    }

    fn active_ids(steps: &[SpyStep]) -> Vec<Option<&str>> {
        steps.iter().map(|s| s.active.as_deref()).collect()
    }

    #[test]
    fn test_spy_replays_scrolls_and_select() {
        let doc = toc::extract_with_offset("## A\n## B\n## C\n", 100);
        let lists = ["150,400,900", "-50,90,600", "-400,-100,40"].map(String::from);

        let steps = spy(&doc.entries, &lists, None, 100.0).unwrap();
        assert_eq!(
            active_ids(&steps),
            [None, Some("heading-1"), Some("heading-2")]
        );

        let steps = spy(&doc.entries, &lists, Some("heading-0"), 100.0).unwrap();
        assert_eq!(steps[1].event, "select heading-0");
        assert_eq!(
            active_ids(&steps),
            [None, Some("heading-0"), Some("heading-1"), Some("heading-2")]
        );
    }

    #[test]
    fn test_spy_rejects_bad_positions() {
        let doc = toc::extract_with_offset("## A\n", 100);
        assert!(spy(&doc.entries, &["1,2".to_string()], None, 100.0).is_err());
        assert!(spy(&doc.entries, &["top".to_string()], None, 100.0).is_err());
        assert!(spy(&doc.entries, &["0".to_string()], Some("heading-7"), 100.0).is_err());
    }
}
