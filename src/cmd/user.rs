use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::model::{PasswordChange, ProfileUpdate, User};
use crate::args::FormatArgs;
use crate::cmd::Desk;
use crate::output::{self, OutputFormat};
use crate::route::View;

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand)]
enum UserCommand {
    /// List all users (admin)
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show your profile
    Profile {
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Change your nickname
    Nickname { value: String },

    /// Change your email
    Email { value: String },

    /// Change your avatar URL
    Avatar { value: String },

    /// Update several profile fields at once
    Edit {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Change your password
    Password { old: String, new: String },

    /// Grant VIP membership (admin)
    Vip { id: i64, days: u32 },

    /// Delete a user (admin)
    #[command(alias = "rm")]
    Delete { id: i64 },
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "USERNAME")]
    username: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

pub fn run(args: UserArgs, desk: &mut Desk) -> Result<(), String> {
    let client = desk.client()?;

    match args.command {
        UserCommand::List { format } => {
            let page = client.users().map_err(|e| desk.fail(e))?;
            print_users(&page.records, format.resolve())
        }
        UserCommand::Profile { format } => {
            desk.app.nav_mut().set_view(&View::Profile);
            let user = client.profile().map_err(|e| desk.fail(e))?;
            print_users(std::slice::from_ref(&user), format.resolve())
        }
        UserCommand::Nickname { value } => {
            let id = desk.user_id()?;
            client.update_nickname(id, &value).map_err(|e| desk.fail(e))?;
            println!("Nickname set to {}", value);
            Ok(())
        }
        UserCommand::Email { value } => {
            let id = desk.user_id()?;
            client.update_email(id, &value).map_err(|e| desk.fail(e))?;
            println!("Email set to {}", value);
            Ok(())
        }
        UserCommand::Avatar { value } => {
            let id = desk.user_id()?;
            client.update_avatar(id, &value).map_err(|e| desk.fail(e))?;
            println!("Avatar updated");
            Ok(())
        }
        UserCommand::Edit {
            nickname,
            bio,
            avatar,
            email,
        } => {
            let id = desk.user_id()?;
            let update = ProfileUpdate {
                nickname,
                bio,
                avatar,
                email,
            };
            client.update_profile(id, &update).map_err(|e| desk.fail(e))?;
            println!("Profile updated");
            Ok(())
        }
        UserCommand::Password { old, new } => {
            let id = desk.user_id()?;
            let change = PasswordChange {
                old_password: old,
                new_password: new,
            };
            client.update_password(id, &change).map_err(|e| desk.fail(e))?;
            println!("Password updated");
            Ok(())
        }
        UserCommand::Vip { id, days } => {
            client.grant_vip(id, days).map_err(|e| desk.fail(e))?;
            println!("Granted {} days of VIP to user {}", days, id);
            Ok(())
        }
        UserCommand::Delete { id } => {
            client.delete_user(id).map_err(|e| desk.fail(e))?;
            println!("Deleted user {}", id);
            Ok(())
        }
    }
}

pub fn print_users(users: &[User], format: OutputFormat) -> Result<(), String> {
    if output::print_structured(format, users)? {
        return Ok(());
    }
    match format {
        OutputFormat::Pretty => {
            let rows: Vec<UserRow> = users
                .iter()
                .map(|u| UserRow {
                    id: output::style_id(u.id).to_string(),
                    username: u.username.clone(),
                    name: u.display_name().to_string(),
                    role: match u.role.as_deref() {
                        Some(role) if u.is_admin() => role.yellow().to_string(),
                        Some(role) => role.to_string(),
                        None => String::new(),
                    },
                    email: u.email.clone().unwrap_or_default(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        _ => {
            for u in users {
                println!(
                    "{} | {} | {} | {} | {}",
                    u.id,
                    u.username,
                    u.display_name(),
                    u.role.as_deref().unwrap_or(""),
                    u.email.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}
