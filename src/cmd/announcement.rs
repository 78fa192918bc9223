use clap::{Args, Subcommand};
use colored::Colorize;

use crate::api::model::{Announcement, AnnouncementRequest};
use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct AnnouncementArgs {
    #[command(subcommand)]
    command: AnnouncementCommand,
}

#[derive(Subcommand)]
enum AnnouncementCommand {
    /// List announcements
    #[command(alias = "ls")]
    List {
        /// Only currently active announcements
        #[arg(long)]
        active: bool,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Publish an announcement (admin)
    Create { title: String, content: String },

    /// Edit an announcement (admin)
    Update {
        id: i64,
        title: String,
        content: String,
    },

    /// Delete an announcement (admin)
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Mark an announcement as read
    Read { id: i64 },
}

pub fn run(args: AnnouncementArgs, desk: &mut Desk) -> Result<(), String> {
    let client = desk.client()?;

    match args.command {
        AnnouncementCommand::List { active, format } => {
            let page = if active {
                client.active_announcements()
            } else {
                client.announcements()
            }
            .map_err(|e| desk.fail(e))?;
            print_announcements(&page.records, format.resolve(), desk.app.dark_mode())
        }
        AnnouncementCommand::Create { title, content } => {
            let created = client
                .create_announcement(&AnnouncementRequest { title, content })
                .map_err(|e| desk.fail(e))?;
            println!("Published announcement {}", created.id);
            Ok(())
        }
        AnnouncementCommand::Update { id, title, content } => {
            client
                .update_announcement(id, &AnnouncementRequest { title, content })
                .map_err(|e| desk.fail(e))?;
            println!("Updated announcement {}", id);
            Ok(())
        }
        AnnouncementCommand::Delete { id } => {
            client.delete_announcement(id).map_err(|e| desk.fail(e))?;
            println!("Deleted announcement {}", id);
            Ok(())
        }
        AnnouncementCommand::Read { id } => {
            client
                .mark_announcement_read(id)
                .map_err(|e| desk.fail(e))?;
            println!("Marked announcement {} as read", id);
            Ok(())
        }
    }
}

fn print_announcements(items: &[Announcement], format: OutputFormat, dark: bool) -> Result<(), String> {
    if output::print_structured(format, items)? {
        return Ok(());
    }
    if items.is_empty() {
        if format == OutputFormat::Pretty {
            println!("{}", "No announcements.".dimmed());
        }
        return Ok(());
    }

    for a in items {
        let when = a.created().and_then(output::parse_timestamp);
        match format {
            OutputFormat::Pretty => {
                let age = when.map(output::format_relative_short).unwrap_or_default();
                println!("{} {} {}", output::style_id(a.id), a.title.bold(), age.dimmed());
                println!("{}", output::render_markdown(&a.content, dark));
                println!();
            }
            _ => {
                let date = when
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{} | {} | {} | {}", a.id, date, a.title, a.content.replace('\n', " "));
            }
        }
    }
    Ok(())
}
