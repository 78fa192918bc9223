//! Duty schedule commands.
//!
//! - import: parse a CSV/TXT file and make it the displayed schedule
//! - show: print the displayed schedule
//! - template: write the sample file the importer accepts
//! - notes: list the default note for each shift

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::args::FormatArgs;
use crate::cmd::{Desk, hint};
use crate::output::{self, OutputFormat};
use crate::schedule::{
    DefaultNotes, NoticeKind, PendingUpload, ScheduleBoard, ScheduleEntry, TEMPLATE_FILE_NAME,
    template,
};
use crate::store::StoredSchedule;

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    command: ScheduleCommand,
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Import a schedule file (.csv or .txt)
    Import(ImportArgs),

    /// Show the displayed schedule
    #[command(alias = "ls")]
    Show(ShowArgs),

    /// Write the schedule template
    Template(TemplateArgs),

    /// List default notes per shift
    Notes(ShowArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Schedule file; its name (without extension) becomes the month label
    file: PathBuf,

    /// Parse and print without replacing the displayed schedule
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct ShowArgs {
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct TemplateArgs {
    /// Output path ("-" for stdout)
    #[arg(short = 'o', long, default_value = TEMPLATE_FILE_NAME)]
    output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "日期")]
    date: String,
    #[tabled(rename = "星期")]
    day: String,
    #[tabled(rename = "班次")]
    shift: String,
    #[tabled(rename = "备注")]
    note: String,
}

#[derive(Serialize)]
struct ScheduleView<'a> {
    month: &'a str,
    entries: &'a [ScheduleEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    imported_at: Option<String>,
}

pub fn run(args: ScheduleArgs, desk: &Desk) -> Result<(), String> {
    match args.command {
        ScheduleCommand::Import(a) => run_import(a, desk),
        ScheduleCommand::Show(a) => run_show(a, desk),
        ScheduleCommand::Template(a) => run_template(a),
        ScheduleCommand::Notes(a) => run_notes(a, desk),
    }
}

fn default_notes(desk: &Desk) -> DefaultNotes {
    DefaultNotes::with_overrides(&desk.config.schedule.default_notes)
}

fn run_import(args: ImportArgs, desk: &Desk) -> Result<(), String> {
    let format = args.format.resolve();
    let dir = desk.data_dir()?;

    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // Unsupported files are rejected before anything is read
    let content = if crate::schedule::check_format(&file_name).is_ok() {
        fs::read(&args.file).map_err(|e| format!("failed to read {}: {}", args.file.display(), e))?
    } else {
        Vec::new()
    };

    let (entries, month) = match StoredSchedule::load(dir) {
        Some(stored) => (stored.entries, stored.month),
        None => (Vec::new(), String::new()),
    };
    let mut board = ScheduleBoard::new(entries, &month, default_notes(desk))
        .with_notice_ttl(desk.config.schedule.notice_secs);

    let now = Utc::now();
    let mut pending = PendingUpload::new(&file_name, content);
    let result = board.upload(&mut pending, now);

    if let Some(notice) = board.notice(now) {
        let message = match notice.kind {
            NoticeKind::Success => notice.message.green(),
            NoticeKind::Error => notice.message.red(),
        };
        eprintln!("{}", message);
    }
    result.map_err(|e| e.to_string())?;

    if args.dry_run {
        hint(desk, "dry run, displayed schedule unchanged");
    } else {
        StoredSchedule {
            month: board.month().to_string(),
            entries: board.entries().to_vec(),
            imported_at: now,
        }
        .save(dir)?;
    }

    print_board(&board, None, format)
}

fn run_show(args: ShowArgs, desk: &Desk) -> Result<(), String> {
    let format = args.format.resolve();
    let Some(stored) = StoredSchedule::load(desk.data_dir()?) else {
        if format == OutputFormat::Pretty {
            println!("{}", "暂无排班数据".dimmed());
        }
        hint(desk, "import one with `blogdesk schedule import <file.csv>`");
        return Ok(());
    };

    let imported_at = stored.imported_at.to_rfc3339();
    let board = ScheduleBoard::new(stored.entries, &stored.month, default_notes(desk));
    print_board(&board, Some(imported_at), format)
}

fn print_board(
    board: &ScheduleBoard,
    imported_at: Option<String>,
    format: OutputFormat,
) -> Result<(), String> {
    let view = ScheduleView {
        month: board.month(),
        entries: board.entries(),
        imported_at,
    };
    if output::print_structured(format, &view)? {
        return Ok(());
    }

    match format {
        OutputFormat::Pretty => {
            println!("{}", board.month().bold());
            let counts: Vec<String> = board
                .shift_counts()
                .into_iter()
                .map(|(shift, n)| format!("{} {}", output::style_shift(&shift), n))
                .collect();
            println!("{}", counts.join("  "));

            let note_width = output::terminal_width().saturating_sub(40).max(20);
            let rows: Vec<EntryRow> = board
                .entries()
                .iter()
                .map(|e| EntryRow {
                    date: e.date.clone(),
                    day: e.day.clone(),
                    shift: output::style_shift(&e.shift).to_string(),
                    note: output::truncate_back(&e.note, note_width),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        _ => {
            println!("Month: {}", board.month());
            println!("DATE | DAY | SHIFT | NOTE");
            for e in board.entries() {
                println!("{} | {} | {} | {}", e.date, e.day, e.shift, e.note);
            }
        }
    }
    Ok(())
}

fn run_template(args: TemplateArgs) -> Result<(), String> {
    let content = template();
    if args.output == Path::new("-") {
        println!("{}", content);
        return Ok(());
    }
    if args.output.exists() && !args.force {
        return Err(format!(
            "{} already exists\nUse --force to overwrite",
            args.output.display()
        ));
    }
    fs::write(&args.output, content)
        .map_err(|e| format!("failed to write {}: {}", args.output.display(), e))?;
    println!("Created: {}", args.output.display());
    Ok(())
}

#[derive(Serialize, Tabled)]
struct NoteRow {
    #[tabled(rename = "班次")]
    shift: String,
    #[tabled(rename = "默认备注")]
    note: String,
}

fn run_notes(args: ShowArgs, desk: &Desk) -> Result<(), String> {
    let format = args.format.resolve();
    let rows: Vec<NoteRow> = default_notes(desk)
        .iter()
        .map(|(shift, note)| NoteRow {
            shift: shift.to_string(),
            note: note.to_string(),
        })
        .collect();

    if output::print_structured(format, &rows)? {
        return Ok(());
    }
    match format {
        OutputFormat::Pretty => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        _ => {
            for row in rows {
                println!("{} | {}", row.shift, row.note);
            }
        }
    }
    Ok(())
}
