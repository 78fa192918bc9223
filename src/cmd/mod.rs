//! Command implementations, one module per subcommand.
//!
//! Every command receives a `Desk`: the loaded configuration, the application
//! context and the data directory. Commands return `Result<(), String>`.

pub mod announcement;
pub mod article;
pub mod auth;
pub mod column;
pub mod config_cmd;
pub mod note;
pub mod route;
pub mod schedule;
pub mod taxonomy;
pub mod toc;
pub mod user;

use std::path::{Path, PathBuf};

use crate::api::{ApiError, Client};
use crate::app::AppContext;
use crate::config::{self, Config, env_string};
use crate::store::{self, Session};

/// Everything a command needs besides its own arguments.
pub struct Desk {
    pub config: Config,
    pub app: AppContext,
    data_dir: Option<PathBuf>,
}

impl Desk {
    /// Start from the home view with the stored session, if any.
    pub fn load(config: Config) -> Self {
        let data_dir = store::data_dir();
        let session = data_dir.as_deref().and_then(Session::load);
        if let Some(s) = &session {
            log::debug!("session for {}", s.user.username);
        }
        let app = AppContext::new("home", session, config.display.dark_mode);
        Self {
            config,
            app,
            data_dir,
        }
    }

    pub fn data_dir(&self) -> Result<&Path, String> {
        self.data_dir
            .as_deref()
            .ok_or_else(|| "cannot determine data directory (set BLOGDESK_DATA_DIR)".to_string())
    }

    /// Build an API client. BLOGDESK_TOKEN overrides the stored session.
    pub fn client(&self) -> Result<Client, String> {
        let token = env_string("BLOGDESK_TOKEN")
            .or_else(|| self.app.session().map(|s| s.token.clone()));
        let client = Client::new(&self.config.api.base_url, config::timeout(&self.config), token)
            .map_err(|e| e.to_string())?;
        log::debug!(
            "api {} ({})",
            client.base_url(),
            if client.has_token() { "authenticated" } else { "anonymous" }
        );
        Ok(client)
    }

    /// The logged-in user's id, or an error asking to log in.
    pub fn user_id(&self) -> Result<i64, String> {
        self.app
            .session()
            .map(|s| s.user.id)
            .ok_or_else(|| ApiError::Unauthorized.to_string())
    }

    /// Remember a new session on disk and in the context.
    pub fn remember(&mut self, session: Session) -> Result<(), String> {
        session.save(self.data_dir()?)?;
        self.app.login(session);
        Ok(())
    }

    /// Drop the session from disk and context.
    pub fn forget(&mut self) -> Result<(), String> {
        Session::clear(self.data_dir()?)?;
        self.app.logout();
        Ok(())
    }

    /// Turn an API error into a command error.
    ///
    /// A rejected token clears the stored session and sends the app to the
    /// login view.
    pub fn fail(&mut self, err: ApiError) -> String {
        if matches!(err, ApiError::Unauthorized) {
            if let Some(dir) = self.data_dir.as_deref()
                && let Err(e) = Session::clear(dir)
            {
                log::warn!("{}", e);
            }
            self.app.handle_unauthorized();
            log::debug!("now at #{}", self.app.nav().fragment());
        }
        err.to_string()
    }

    pub fn quiet(&self) -> bool {
        config::is_quiet(&self.config)
    }
}

/// Print a hint on stderr unless quiet.
pub fn hint(desk: &Desk, message: &str) {
    if !desk.quiet() {
        eprintln!("Hint: {}", message);
    }
}
