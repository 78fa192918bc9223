use std::path::PathBuf;

use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::Page;
use crate::api::model::{Article, ArticleQuery, ArticleRequest};
use crate::app::Access;
use crate::args::{FormatArgs, PageArgs};
use crate::cmd::{Desk, hint};
use crate::config::root_name;
use crate::input;
use crate::output::{self, OutputFormat};
use crate::route::{Route, Screen, View};
use crate::toc::{self, TocEntry};

/// Characters of the summary shown under an article's title.
const SUMMARY_WIDTH: usize = 200;

#[derive(Args)]
pub struct ArticleArgs {
    #[command(subcommand)]
    command: ArticleCommand,
}

#[derive(Subcommand)]
enum ArticleCommand {
    /// List published articles
    #[command(alias = "ls")]
    List(ListArgs),

    /// List all articles with their review status (admin)
    Admin(ListArgs),

    /// List your own articles
    Mine(FormatOnly),

    /// Read an article with its table of contents
    #[command(alias = "show")]
    Read(ReadArgs),

    /// Publish a new article
    #[command(alias = "new")]
    Create(WriteArgs),

    /// Replace an existing article
    #[command(alias = "edit")]
    Update(UpdateArgs),

    /// Delete an article
    #[command(alias = "rm")]
    Delete(IdArgs),

    /// Set the review status of an article (admin)
    Audit(AuditArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Only articles in this category
    #[arg(long, conflicts_with = "tag")]
    category: Option<i64>,

    /// Only articles with this tag
    #[arg(long)]
    tag: Option<i64>,

    /// Sort key passed to the backend (e.g. "views")
    #[arg(long)]
    sort: Option<String>,

    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct FormatOnly {
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct ReadArgs {
    id: i64,

    /// Print only the table of contents
    #[arg(long)]
    toc: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct WriteArgs {
    #[arg(short, long)]
    title: String,

    /// Markdown content (reads --file or stdin when omitted)
    #[arg(short, long)]
    content: Option<String>,

    /// Read content from a file
    #[arg(long, conflicts_with = "content")]
    file: Option<PathBuf>,

    #[arg(long)]
    category: Option<i64>,

    /// Tag ids (repeatable)
    #[arg(long = "tag")]
    tags: Vec<i64>,

    #[arg(long)]
    cover: Option<String>,

    /// Save as draft instead of publishing
    #[arg(long)]
    draft: bool,
}

#[derive(Args)]
struct UpdateArgs {
    id: i64,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args)]
struct IdArgs {
    id: i64,
}

#[derive(Args)]
struct AuditArgs {
    id: i64,

    /// New status (e.g. PUBLISHED, REJECTED)
    status: String,
}

#[derive(Tabled)]
struct ArticleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "VIEWS")]
    views: u64,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TITLE")]
    title: String,
}

#[derive(Serialize)]
struct ArticleView<'a> {
    #[serde(flatten)]
    article: &'a Article,
    reading_minutes: usize,
    toc: &'a [TocEntry],
    /// Body with anchored headings
    html: &'a str,
}

pub fn run(args: ArticleArgs, desk: &mut Desk) -> Result<(), String> {
    match args.command {
        ArticleCommand::List(a) => run_list(a, false, desk),
        ArticleCommand::Admin(a) => run_list(a, true, desk),
        ArticleCommand::Mine(a) => run_mine(a, desk),
        ArticleCommand::Read(a) => run_read(a, desk),
        ArticleCommand::Create(a) => run_create(a, desk),
        ArticleCommand::Update(a) => run_update(a, desk),
        ArticleCommand::Delete(a) => run_delete(a, desk),
        ArticleCommand::Audit(a) => run_audit(a, desk),
    }
}

fn run_list(args: ListArgs, admin: bool, desk: &mut Desk) -> Result<(), String> {
    let format = args.format.resolve();

    // Filters go through the route so category and tag stay exclusive
    let route = match (args.category, args.tag) {
        (Some(id), _) => Route::category(id),
        (None, Some(id)) => Route::tag(id),
        (None, None) => Route::home(),
    };
    desk.app.nav_mut().navigate(&route);
    let (category_id, tag_id) = match desk.app.access().map_err(|e| e.to_string())? {
        (Screen::Search {
            category_id,
            tag_id,
        }, _) => (category_id, tag_id),
        _ => (None, None),
    };

    let query = ArticleQuery {
        page: Some(args.page.page),
        size: Some(args.page.size),
        category_id,
        tag_id,
        sort: args.sort,
    };

    let client = desk.client()?;
    let result = if admin {
        client.admin_articles(&query)
    } else {
        client.articles(&query)
    };
    let page = result.map_err(|e| desk.fail(e))?;

    let scope = match (category_id, tag_id) {
        (Some(id), _) => format!("category {}", id),
        (None, Some(id)) => format!("tag {}", id),
        (None, None) => root_name(&desk.config).to_string(),
    };
    print_articles(&page, format, admin, &scope)
}

fn run_mine(args: FormatOnly, desk: &mut Desk) -> Result<(), String> {
    let format = args.format.resolve();
    let page = desk
        .client()?
        .my_articles()
        .map_err(|e| desk.fail(e))?;
    let scope = format!("{} (yours)", root_name(&desk.config));
    print_articles(&page, format, true, &scope)
}

fn print_articles(
    page: &Page<Article>,
    format: OutputFormat,
    show_status: bool,
    scope: &str,
) -> Result<(), String> {
    if output::print_structured(format, page)? {
        return Ok(());
    }

    if page.is_empty() {
        if format == OutputFormat::Pretty {
            println!("{}", "No articles.".dimmed());
        }
        return Ok(());
    }

    match format {
        OutputFormat::Pretty => {
            let title_width = output::terminal_width().saturating_sub(60).max(20);
            let rows: Vec<ArticleRow> = page
                .records
                .iter()
                .map(|a| ArticleRow {
                    id: output::style_id(a.id).to_string(),
                    category: a.category_label().to_string(),
                    date: a.created().map(output::format_date).unwrap_or_default(),
                    views: a.view_total(),
                    status: if show_status {
                        output::style_status(a.status.as_deref().unwrap_or("-")).to_string()
                    } else {
                        String::new()
                    },
                    title: output::truncate_back(&a.title, title_width),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
            println!(
                "Showing {} of {} articles in {}",
                page.records.len(),
                page.total,
                scope
            );
        }
        _ => {
            println!("ID | CATEGORY | DATE | VIEWS | STATUS | TITLE");
            for a in &page.records {
                println!(
                    "{} | {} | {} | {} | {} | {}",
                    a.id,
                    a.category_label(),
                    a.created().unwrap_or(""),
                    a.view_total(),
                    a.status.as_deref().unwrap_or(""),
                    a.title
                );
            }
            println!("Total: {} in {}", page.total, scope);
        }
    }
    Ok(())
}

fn run_read(args: ReadArgs, desk: &mut Desk) -> Result<(), String> {
    let format = args.format.resolve();

    desk.app.nav_mut().navigate(&Route::post(args.id));
    let article_id = match desk.app.access().map_err(|e| e.to_string())? {
        (Screen::Detail { article_id }, _) => article_id,
        _ => args.id,
    };

    let article = desk
        .client()?
        .article(article_id)
        .map_err(|e| desk.fail(e))?;
    let body = article.content.clone().unwrap_or_default();
    let doc = toc::extract_with_offset(&body, desk.config.toc.scroll_offset);

    if args.toc {
        if output::print_structured(format, &doc.entries)? {
            return Ok(());
        }
        for entry in &doc.entries {
            match format {
                OutputFormat::Pretty => println!("{}", crate::cmd::toc::pretty_line(entry)),
                _ => println!("{} | {} | {}", entry.id, entry.level, entry.text),
            }
        }
        return Ok(());
    }

    let view = ArticleView {
        article: &article,
        reading_minutes: article.reading_minutes(),
        toc: &doc.entries,
        html: &doc.body,
    };
    if output::print_structured(format, &view)? {
        return Ok(());
    }

    let meta = format!(
        "{} · {} · {} views · {} min",
        article.category_label(),
        article.created().map(output::format_date).unwrap_or_default(),
        article.view_total(),
        article.reading_minutes()
    );

    match format {
        OutputFormat::Pretty => {
            println!("{}", article.title.bold());
            if let Some(author) = &article.author_name {
                println!("{}", author.dimmed());
            }
            println!("{}", meta.dimmed());
            if let Some(summary) = article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
                println!("{}", output::summary(summary, SUMMARY_WIDTH).italic());
            }
            if !doc.entries.is_empty() {
                println!();
                println!("{}", "Contents".bold());
                for entry in &doc.entries {
                    println!("  {}", crate::cmd::toc::pretty_line(entry));
                }
            }
            println!();
            println!("{}", output::render_markdown(&body, desk.app.dark_mode()));
        }
        _ => {
            println!("Title: {}", article.title);
            println!("Meta: {}", meta);
            for entry in &doc.entries {
                println!("TOC: {} | {} | {}", entry.id, entry.level, entry.text);
            }
            println!();
            println!("{}", body);
        }
    }
    Ok(())
}

fn build_request(args: &WriteArgs) -> Result<ArticleRequest, String> {
    let content = input::content_arg(args.content.as_deref(), args.file.as_deref())?;
    let mut req = ArticleRequest::publish(&args.title, &content)?;
    req.category_id = args.category;
    req.tag_ids = args.tags.clone();
    req.cover_image = args.cover.clone();
    if args.draft {
        req.status = "draft".to_string();
    }
    Ok(req)
}

/// Gate on the editor screen for the current route.
fn require_editor(desk: &Desk) -> Result<(), String> {
    match desk.app.access().map_err(|e| e.to_string())? {
        (_, Access::Granted { .. }) => Ok(()),
        _ => Err("login required (run `blogdesk login`)".to_string()),
    }
}

fn run_create(args: WriteArgs, desk: &mut Desk) -> Result<(), String> {
    desk.app.nav_mut().set_view(&View::Create);
    require_editor(desk)?;
    let req = build_request(&args)?;

    let article = desk
        .client()?
        .create_article(&req)
        .map_err(|e| desk.fail(e))?;
    println!("Published: {} {}", output::style_id(article.id), article.title);
    desk.app.nav_mut().navigate(&Route::post(article.id));
    Ok(())
}

fn run_update(args: UpdateArgs, desk: &mut Desk) -> Result<(), String> {
    desk.app.nav_mut().navigate(&Route::edit(args.id));
    require_editor(desk)?;
    let id = desk.app.editing_article().unwrap_or(args.id);
    let req = build_request(&args.write)?;

    let article = desk
        .client()?
        .update_article(id, &req)
        .map_err(|e| desk.fail(e))?;
    println!("Updated: {} {}", output::style_id(id), article.title);
    Ok(())
}

fn run_delete(args: IdArgs, desk: &mut Desk) -> Result<(), String> {
    desk.client()?
        .delete_article(args.id)
        .map_err(|e| desk.fail(e))?;
    println!("Deleted article {}", args.id);
    Ok(())
}

fn run_audit(args: AuditArgs, desk: &mut Desk) -> Result<(), String> {
    desk.app.nav_mut().set_view(&View::Admin);
    if let (_, Access::Forbidden) = desk.app.access().map_err(|e| e.to_string())? {
        return Err("admin role required".to_string());
    }
    desk.client()?
        .audit_article(args.id, &args.status)
        .map_err(|e| desk.fail(e))?;
    println!(
        "Article {} is now {}",
        args.id,
        output::style_status(&args.status)
    );
    hint(desk, "list all statuses with `blogdesk article admin`");
    Ok(())
}
