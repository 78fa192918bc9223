use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::model::{Column, ColumnRequest};
use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ColumnArgs {
    #[command(subcommand)]
    command: ColumnCommand,
}

#[derive(Subcommand)]
enum ColumnCommand {
    /// List columns
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one column
    Show {
        id: i64,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Create a column (admin)
    Create(EditArgs),

    /// Update a column (admin)
    Update {
        id: i64,
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Delete a column (admin)
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// List article ids in a column
    Articles {
        id: i64,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Add an article to a column
    Add {
        column: i64,
        article: i64,
        /// Position within the column
        #[arg(long)]
        order: Option<i32>,
    },

    /// Remove an article from a column
    Remove { column: i64, article: i64 },
}

#[derive(Args)]
struct ListArgs {
    /// Show the nested column tree
    #[arg(long)]
    tree: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    cover: Option<String>,
    #[arg(long)]
    parent: Option<i64>,
    #[arg(long)]
    order: Option<i32>,
    #[arg(long)]
    status: Option<i32>,
}

impl EditArgs {
    fn to_request(&self) -> ColumnRequest {
        ColumnRequest {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            cover_image: self.cover.clone(),
            parent_id: self.parent,
            sort_order: self.order,
            status: self.status,
        }
    }
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SLUG")]
    slug: String,
    #[tabled(rename = "ARTICLES")]
    articles: u64,
}

pub fn run(args: ColumnArgs, desk: &mut Desk) -> Result<(), String> {
    let client = desk.client()?;

    match args.command {
        ColumnCommand::List(a) => {
            let page = if a.tree {
                client.column_tree()
            } else {
                client.columns()
            }
            .map_err(|e| desk.fail(e))?;
            print_columns(&page.records, a.format.resolve())
        }
        ColumnCommand::Show { id, format } => {
            let column = client.column(id).map_err(|e| desk.fail(e))?;
            print_columns(std::slice::from_ref(&column), format.resolve())
        }
        ColumnCommand::Create(edit) => {
            if edit.name.is_none() {
                return Err("--name is required".to_string());
            }
            let column = client
                .create_column(&edit.to_request())
                .map_err(|e| desk.fail(e))?;
            println!("Created column {}: {}", column.id, column.name);
            Ok(())
        }
        ColumnCommand::Update { id, edit } => {
            client
                .update_column(id, &edit.to_request())
                .map_err(|e| desk.fail(e))?;
            println!("Updated column {}", id);
            Ok(())
        }
        ColumnCommand::Delete { id } => {
            client.delete_column(id).map_err(|e| desk.fail(e))?;
            println!("Deleted column {}", id);
            Ok(())
        }
        ColumnCommand::Articles { id, format } => {
            let page = client.column_article_ids(id).map_err(|e| desk.fail(e))?;
            let format = format.resolve();
            if output::print_structured(format, &page.records)? {
                return Ok(());
            }
            for article_id in &page.records {
                println!("{}", article_id);
            }
            Ok(())
        }
        ColumnCommand::Add {
            column,
            article,
            order,
        } => {
            client
                .add_article_to_column(column, article, order)
                .map_err(|e| desk.fail(e))?;
            println!("Added article {} to column {}", article, column);
            Ok(())
        }
        ColumnCommand::Remove { column, article } => {
            client
                .remove_article_from_column(column, article)
                .map_err(|e| desk.fail(e))?;
            println!("Removed article {} from column {}", article, column);
            Ok(())
        }
    }
}

/// Flatten the tree depth-first, indenting children under their parent.
fn flatten(columns: &[Column], depth: usize, out: &mut Vec<(usize, Column)>) {
    for column in columns {
        out.push((depth, column.clone()));
        flatten(&column.children, depth + 1, out);
    }
}

fn print_columns(columns: &[Column], format: OutputFormat) -> Result<(), String> {
    if output::print_structured(format, columns)? {
        return Ok(());
    }
    if columns.is_empty() {
        if format == OutputFormat::Pretty {
            println!("{}", "No columns.".dimmed());
        }
        return Ok(());
    }

    let mut flat = Vec::new();
    flatten(columns, 0, &mut flat);

    match format {
        OutputFormat::Pretty => {
            let rows: Vec<ColumnRow> = flat
                .iter()
                .map(|(depth, c)| ColumnRow {
                    id: output::style_id(c.id).to_string(),
                    name: format!("{}{}", "  ".repeat(*depth), c.name),
                    slug: c.slug.clone().unwrap_or_default(),
                    articles: c.article_count.unwrap_or(0),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        _ => {
            for (depth, c) in &flat {
                println!(
                    "{} | {} | {} | {}",
                    c.id,
                    depth,
                    c.name,
                    c.article_count.unwrap_or(0)
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_tree_depth_first() {
        let tree: Vec<Column> = serde_json::from_str(
            r#"[{"id": 1, "name": "Rust", "children": [{"id": 2, "name": "Async"}]},
                {"id": 3, "name": "Go"}]"#,
        )
        .unwrap();
        let mut flat = Vec::new();
        flatten(&tree, 0, &mut flat);
        let ids: Vec<_> = flat.iter().map(|(d, c)| (*d, c.id)).collect();
        assert_eq!(ids, [(0, 1), (1, 2), (0, 3)]);
    }
}
