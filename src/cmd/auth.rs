//! Session commands: login, register, logout, whoami.

use clap::Args;
use colored::Colorize;

use crate::api::model::{AuthResponse, RegisterRequest};
use crate::args::FormatArgs;
use crate::cmd::{Desk, user};
use crate::input;
use crate::route::View;
use crate::store::Session;

#[derive(Args)]
pub struct LoginArgs {
    username: String,

    /// Password (reads stdin when omitted)
    #[arg(short, long)]
    password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    username: String,

    #[arg(short, long)]
    password: Option<String>,

    #[arg(long, default_value = "")]
    email: String,

    /// Display name (defaults to the username)
    #[arg(long)]
    nickname: Option<String>,
}

#[derive(Args)]
pub struct WhoamiArgs {
    /// Ask the backend instead of reading the stored session
    #[arg(long)]
    remote: bool,

    #[command(flatten)]
    format: FormatArgs,
}

fn password(arg: Option<String>) -> Result<String, String> {
    let password = arg.unwrap_or_else(|| input::read_stdin(true));
    if password.is_empty() {
        return Err("password required (--password or stdin)".to_string());
    }
    Ok(password)
}

fn start_session(desk: &mut Desk, auth: AuthResponse) -> Result<(), String> {
    let name = auth.user.display_name().to_string();
    let admin = auth.user.is_admin();
    desk.remember(Session {
        token: auth.token,
        user: auth.user,
    })?;
    desk.app.nav_mut().set_view(&View::Home);
    if admin {
        println!("Logged in as {} {}", name.bold(), "(admin)".yellow());
    } else {
        println!("Logged in as {}", name.bold());
    }
    Ok(())
}

pub fn run_login(args: LoginArgs, desk: &mut Desk) -> Result<(), String> {
    desk.app.nav_mut().set_view(&View::Login);
    let password = password(args.password)?;
    let auth = desk
        .client()?
        .login(&args.username, &password)
        .map_err(|e| desk.fail(e))?;
    start_session(desk, auth)
}

pub fn run_register(args: RegisterArgs, desk: &mut Desk) -> Result<(), String> {
    desk.app.nav_mut().set_view(&View::Register);
    let req = RegisterRequest {
        nickname: args.nickname.unwrap_or_else(|| args.username.clone()),
        password: password(args.password)?,
        username: args.username,
        email: args.email,
    };
    let auth = desk
        .client()?
        .register(&req)
        .map_err(|e| desk.fail(e))?;
    start_session(desk, auth)
}

pub fn run_logout(desk: &mut Desk) -> Result<(), String> {
    let was = desk.app.session().map(|s| s.user.username.clone());
    desk.forget()?;
    match was {
        Some(name) => println!("Logged out {}", name),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn run_whoami(args: WhoamiArgs, desk: &mut Desk) -> Result<(), String> {
    let format = args.format.resolve();
    let user = if args.remote {
        desk.client()?.me().map_err(|e| desk.fail(e))?
    } else {
        match desk.app.session() {
            Some(s) => s.user.clone(),
            None => return Err("not logged in (run `blogdesk login`)".to_string()),
        }
    };
    user::print_users(std::slice::from_ref(&user), format)
}
