//! Category and tag commands. Both resources are a flat id/name list, so
//! they share one argument set.

use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::{ApiError, Client};
use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::output::{self, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Category,
    Tag,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Category => "category",
            Kind::Tag => "tag",
        }
    }
}

#[derive(Args)]
pub struct TaxonomyArgs {
    #[command(subcommand)]
    command: TaxonomyCommand,
}

#[derive(Subcommand)]
enum TaxonomyCommand {
    /// List all entries
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create an entry (admin)
    Create { name: String },

    /// Rename an entry (admin)
    Rename { id: i64, name: String },

    /// Delete an entry (admin)
    #[command(alias = "rm")]
    Delete { id: i64 },
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize, Tabled)]
struct NamedRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ARTICLES", display_with = "display_count")]
    #[serde(skip_serializing_if = "Option::is_none")]
    articles: Option<u64>,
}

fn display_count(count: &Option<u64>) -> String {
    count.map(|n| n.to_string()).unwrap_or_default()
}

pub fn run(args: TaxonomyArgs, kind: Kind, desk: &mut Desk) -> Result<(), String> {
    let client = desk.client()?;
    let result = match args.command {
        TaxonomyCommand::List(a) => {
            return match list(&client, kind) {
                Ok(rows) => print_rows(rows, kind, a.format.resolve()),
                Err(e) => Err(desk.fail(e)),
            };
        }
        TaxonomyCommand::Create { name } => create(&client, kind, &name)
            .map(|id| format!("Created {} {}: {}", kind.label(), id, name)),
        TaxonomyCommand::Rename { id, name } => rename(&client, kind, id, &name)
            .map(|_| format!("Renamed {} {} to {}", kind.label(), id, name)),
        TaxonomyCommand::Delete { id } => {
            delete(&client, kind, id).map(|_| format!("Deleted {} {}", kind.label(), id))
        }
    };

    let message = result.map_err(|e| desk.fail(e))?;
    println!("{}", message);
    Ok(())
}

fn list(client: &Client, kind: Kind) -> Result<Vec<NamedRow>, ApiError> {
    Ok(match kind {
        Kind::Category => client
            .categories()?
            .records
            .into_iter()
            .map(|c| NamedRow {
                id: c.id,
                name: c.name,
                articles: c.article_count,
            })
            .collect(),
        Kind::Tag => client
            .tags()?
            .records
            .into_iter()
            .map(|t| NamedRow {
                id: t.id,
                name: t.name,
                articles: None,
            })
            .collect(),
    })
}

fn create(client: &Client, kind: Kind, name: &str) -> Result<i64, ApiError> {
    match kind {
        Kind::Category => client.create_category(name).map(|c| c.id),
        Kind::Tag => client.create_tag(name).map(|t| t.id),
    }
}

fn rename(client: &Client, kind: Kind, id: i64, name: &str) -> Result<(), ApiError> {
    match kind {
        Kind::Category => client.update_category(id, name).map(|_| ()),
        Kind::Tag => client.update_tag(id, name).map(|_| ()),
    }
}

fn delete(client: &Client, kind: Kind, id: i64) -> Result<(), ApiError> {
    match kind {
        Kind::Category => client.delete_category(id),
        Kind::Tag => client.delete_tag(id),
    }
}

fn print_rows(rows: Vec<NamedRow>, kind: Kind, format: OutputFormat) -> Result<(), String> {
    if output::print_structured(format, &rows)? {
        return Ok(());
    }
    if rows.is_empty() {
        if format == OutputFormat::Pretty {
            println!("{}", format!("No {} entries.", kind.label()).dimmed());
        }
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
                println!("{} | {}", row.id, row.name);
            }
        }
    }
    Ok(())
}
