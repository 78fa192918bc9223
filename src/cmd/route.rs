use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app::{Access, AppContext};
use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::output::{self, OutputFormat};
use crate::route::{Route, RouteId};

#[derive(Args)]
pub struct RouteArgs {
    /// Fragments to visit in order (the part after `#`, e.g. post/42)
    #[arg(required = true)]
    fragments: Vec<String>,

    /// Go back this many steps after visiting all fragments
    #[arg(long, default_value_t = 0)]
    back: usize,

    /// Then go forward this many steps
    #[arg(long, default_value_t = 0)]
    forward: usize,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize)]
struct RouteReport {
    fragment: String,
    canonical: String,
    #[serde(flatten)]
    route: Route,
    nav_tab: String,
    #[serde(flatten)]
    access: Outcome,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Resolved(Access),
    Rejected { error: String },
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "FRAGMENT")]
    fragment: String,
    #[tabled(rename = "VIEW")]
    view: String,
    #[tabled(rename = "PARAMS")]
    params: String,
    #[tabled(rename = "SHOWS")]
    shows: String,
}

pub fn run(args: RouteArgs, desk: &mut Desk) -> Result<(), String> {
    let format = args.format.resolve();

    let reports = visit(&mut desk.app, &args.fragments, args.back, args.forward);

    if output::print_structured(format, &reports)? {
        return Ok(());
    }

    match format {
        OutputFormat::Pretty => {
            let rows: Vec<RouteRow> = reports
                .iter()
                .map(|r| RouteRow {
                    fragment: format!("#{}", r.fragment),
                    view: output::style_marker(r.route.view.as_str()).to_string(),
                    params: describe_params(&r.route),
                    shows: describe_outcome(&r.access),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
            if let Some(editing) = desk.app.editing_article() {
                println!("{} article {}", "Editing".bold(), output::style_id(editing));
            }
        }
        _ => {
            println!("FRAGMENT | VIEW | PARAMS | SHOWS");
            for r in &reports {
                println!(
                    "#{} | {} | {} | {}",
                    r.fragment,
                    r.route.view,
                    describe_params(&r.route),
                    describe_outcome(&r.access)
                );
            }
        }
    }

    Ok(())
}

/// Visit each fragment, then walk the history back and forward, reporting
/// every stop. History walks end early at either end.
fn visit(
    app: &mut AppContext,
    fragments: &[String],
    back: usize,
    forward: usize,
) -> Vec<RouteReport> {
    let mut reports = Vec::new();
    for fragment in fragments {
        app.nav_mut().navigate_to(fragment);
        reports.push(report(fragment, app));
    }
    for _ in 0..back {
        if !app.nav_mut().back() {
            break;
        }
        let fragment = app.nav().fragment().to_string();
        reports.push(report(&fragment, app));
    }
    for _ in 0..forward {
        if !app.nav_mut().forward() {
            break;
        }
        let fragment = app.nav().fragment().to_string();
        reports.push(report(&fragment, app));
    }
    reports
}

fn report(fragment: &str, app: &AppContext) -> RouteReport {
    let route = app.nav().route().clone();
    let access = match app.access() {
        Ok((_, access)) => Outcome::Resolved(access),
        Err(e) => Outcome::Rejected {
            error: e.to_string(),
        },
    };
    RouteReport {
        fragment: fragment.trim_start_matches('#').to_string(),
        canonical: route.fragment(),
        nav_tab: route.view.nav_tab().to_string(),
        route,
        access,
    }
}

fn describe_params(route: &Route) -> String {
    let p = &route.params;
    let parts: Vec<String> = [
        ("article", &p.article_id),
        ("category", &p.category_id),
        ("tag", &p.tag_id),
    ]
    .into_iter()
    .filter_map(|(name, id)| id.as_ref().map(|id| describe_id(name, id)))
    .collect();

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn describe_id(name: &str, id: &RouteId) -> String {
    match id {
        RouteId::Valid(n) => format!("{}={}", name, n),
        RouteId::Invalid(raw) => format!("{}=NaN({:?})", name, raw),
    }
}

fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Resolved(Access::Granted { screen }) => screen.clone(),
        Outcome::Resolved(Access::Login) => "login (sign-in required)".to_string(),
        Outcome::Resolved(Access::Forbidden) => "forbidden".to_string(),
        Outcome::Rejected { error } => format!("error: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::interpret;

    #[test]
    fn test_describe_params() {
        assert_eq!(describe_params(&interpret("home")), "-");
        assert_eq!(describe_params(&interpret("post/7")), "article=7");
        assert_eq!(
            describe_params(&interpret("tag/x")),
            "tag=NaN(\"x\")"
        );
    }

    #[test]
    fn test_report_serializes_flat() {
        let outcome = Outcome::Rejected {
            error: "bad".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "bad");

        let granted = Outcome::Resolved(Access::Granted {
            screen: "home".to_string(),
        });
        let json = serde_json::to_value(&granted).unwrap();
        assert_eq!(json["access"], "granted");
    }

    #[test]
    fn test_visit_walks_back_then_forward() {
        let mut app = AppContext::new("home", None, false);
        let fragments: Vec<String> = ["post/1", "edit/2", "tag/3"].map(String::from).to_vec();
        let reports = visit(&mut app, &fragments, 2, 5);
        let stops: Vec<&str> = reports.iter().map(|r| r.fragment.as_str()).collect();
        assert_eq!(
            stops,
            ["post/1", "edit/2", "tag/3", "edit/2", "post/1", "edit/2", "tag/3"]
        );
        assert_eq!(app.nav().fragment(), "tag/3");
        assert_eq!(app.editing_article(), None);
    }

    #[test]
    fn test_visit_stops_forward_at_history_end() {
        let mut app = AppContext::new("home", None, false);
        let reports = visit(&mut app, &["edit/9".to_string()], 0, 3);
        assert_eq!(reports.len(), 1);
        assert_eq!(app.editing_article(), Some(9));
    }
}
