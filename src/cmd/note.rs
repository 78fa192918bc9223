use clap::{Args, Subcommand};
use colored::Colorize;

use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::input;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct NoteArgs {
    #[command(subcommand)]
    command: NoteCommand,
}

#[derive(Subcommand)]
enum NoteCommand {
    /// List your learning notes on an article
    #[command(alias = "ls")]
    List {
        article: i64,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Add a learning note to an article (text from stdin when omitted)
    Add { article: i64, text: Option<String> },

    /// Delete a note
    #[command(alias = "rm")]
    Remove { id: i64 },
}

pub fn run(args: NoteArgs, desk: &mut Desk) -> Result<(), String> {
    let client = desk.client()?;

    match args.command {
        NoteCommand::List { article, format } => {
            let format = format.resolve();
            let page = client
                .notes_for_article(article)
                .map_err(|e| desk.fail(e))?;
            if output::print_structured(format, &page)? {
                return Ok(());
            }
            if page.is_empty() && format == OutputFormat::Pretty {
                println!("{}", "No notes on this article.".dimmed());
            }
            for note in &page.records {
                let date = note
                    .created_at
                    .as_deref()
                    .map(output::format_date)
                    .unwrap_or_default();
                match format {
                    OutputFormat::Pretty => {
                        println!("{} {}", output::style_id(note.id), date.dimmed());
                        println!("{}", output::render_markdown(&note.content, desk.app.dark_mode()));
                    }
                    _ => println!("{} | {} | {}", note.id, date, note.content.replace('\n', " ")),
                }
            }
            Ok(())
        }
        NoteCommand::Add { article, text } => {
            let content = input::content_arg(text.as_deref(), None)?;
            if content.trim().is_empty() {
                return Err("usage: blogdesk note add <article> \"text\"".to_string());
            }
            let note = client
                .create_note(article, content.trim())
                .map_err(|e| desk.fail(e))?;
            println!("Added note {} to article {}", note.id, article);
            Ok(())
        }
        NoteCommand::Remove { id } => {
            client.delete_note(id).map_err(|e| desk.fail(e))?;
            println!("Removed note {}", id);
            Ok(())
        }
    }
}
