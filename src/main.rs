use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::env::CompleteEnv;
use clap_complete::{Shell, generate};

mod api;
mod app;
mod args;
mod cmd;
mod config;
mod events;
mod input;
mod nav;
mod output;
mod route;
mod schedule;
mod store;
mod toc;

use cmd::Desk;
use cmd::taxonomy::Kind;

#[derive(Parser)]
#[command(name = "blogdesk")]
#[command(version = env!("BLOGDESK_VERSION"))]
#[command(about = "Command-line desk for the blog platform")]
#[command(
    long_about = "blogdesk - Read and write articles, manage taxonomy and users, and import\nduty schedules from the terminal.\n\nOffline helpers (route, toc, schedule) work without a backend; everything\nelse talks to the REST API configured under `api.base_url`."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides config and BLOGDESK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Use the dark terminal theme for rendered markdown
    #[arg(long, global = true)]
    dark: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret hash fragments into views
    Route(cmd::route::RouteArgs),

    /// Extract the table of contents from markdown
    Toc(cmd::toc::TocArgs),

    /// Import and show duty schedules
    Schedule(cmd::schedule::ScheduleArgs),

    /// Articles
    #[command(alias = "a")]
    Article(cmd::article::ArticleArgs),

    /// Categories
    Category(cmd::taxonomy::TaxonomyArgs),

    /// Tags
    Tag(cmd::taxonomy::TaxonomyArgs),

    /// Columns (article collections)
    Column(cmd::column::ColumnArgs),

    /// Announcements
    Announcement(cmd::announcement::AnnouncementArgs),

    /// Learning notes on articles
    Note(cmd::note::NoteArgs),

    /// Users and your profile
    User(cmd::user::UserArgs),

    /// Log in and store the session
    Login(cmd::auth::LoginArgs),

    /// Create an account and log in
    Register(cmd::auth::RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami(cmd::auth::WhoamiArgs),

    /// Generate shell completion script
    Completion(CompletionArgs),

    /// Configuration introspection
    Config(cmd::config_cmd::ConfigArgs),
}

#[derive(clap::Args)]
struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Clone, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    // Handle dynamic shell completions
    CompleteEnv::with_factory(Cli::command).complete();

    // Use try_parse to catch errors and normalize exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Exit with 0 for help/version, 1 for actual errors
            let exit_code = if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                0
            } else {
                1
            };
            process::exit(exit_code);
        }
    };

    init_logging(cli.verbose);

    if let Commands::Completion(args) = &cli.command {
        let shell = match args.shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
        };
        generate(shell, &mut Cli::command(), "blogdesk", &mut io::stdout());
        return;
    }

    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        colored::control::set_override(false);
    }

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("cannot get cwd: {}", e);
            process::exit(1);
        }
    };
    let mut loaded = config::load_config(&cwd);
    config::apply_flags(&mut loaded, cli.api_url, cli.dark);
    let mut desk = Desk::load(loaded.config.clone());

    let result = match cli.command {
        Commands::Route(args) => cmd::route::run(args, &mut desk),
        Commands::Toc(args) => cmd::toc::run(args, &desk),
        Commands::Schedule(args) => cmd::schedule::run(args, &desk),
        Commands::Article(args) => cmd::article::run(args, &mut desk),
        Commands::Category(args) => cmd::taxonomy::run(args, Kind::Category, &mut desk),
        Commands::Tag(args) => cmd::taxonomy::run(args, Kind::Tag, &mut desk),
        Commands::Column(args) => cmd::column::run(args, &mut desk),
        Commands::Announcement(args) => cmd::announcement::run(args, &mut desk),
        Commands::Note(args) => cmd::note::run(args, &mut desk),
        Commands::User(args) => cmd::user::run(args, &mut desk),
        Commands::Login(args) => cmd::auth::run_login(args, &mut desk),
        Commands::Register(args) => cmd::auth::run_register(args, &mut desk),
        Commands::Logout => cmd::auth::run_logout(&mut desk),
        Commands::Whoami(args) => cmd::auth::run_whoami(args, &mut desk),
        Commands::Config(args) => cmd::config_cmd::run(args, &loaded),
        Commands::Completion(_) => unreachable!(), // Handled above
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
