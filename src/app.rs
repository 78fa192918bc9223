//! Application context.
//!
//! Holds what would otherwise be global: the navigator (current route), the
//! dark-mode preference, the login session and the article being edited.
//! Commands receive it explicitly.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::events::Subscription;
use crate::nav::Navigator;
use crate::route::{Route, RouteError, Screen, View};
use crate::store::Session;

/// Outcome of resolving the current route against the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "lowercase")]
pub enum Access {
    /// The screen can be shown
    Granted { screen: String },
    /// The screen needs a logged-in user; the login page is shown instead
    Login,
    /// Logged in, but not allowed (admin pages)
    Forbidden,
}

pub struct AppContext {
    nav: Navigator,
    dark_mode: bool,
    session: Option<Session>,
    editing: Rc<Cell<Option<i64>>>,
    _editing_sync: Subscription,
}

impl AppContext {
    pub fn new(fragment: &str, session: Option<Session>, dark_mode: bool) -> Self {
        let nav = Navigator::new(fragment);
        let editing = Rc::new(Cell::new(editing_id(nav.route())));

        // Leaving the editor forgets the article being edited
        let sync = {
            let editing = Rc::clone(&editing);
            nav.subscribe(move |route| editing.set(editing_id(route)))
        };

        Self {
            nav,
            dark_mode,
            session,
            editing,
            _editing_sync: sync,
        }
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut Navigator {
        &mut self.nav
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the article open in the editor, if any.
    pub fn editing_article(&self) -> Option<i64> {
        self.editing.get()
    }

    pub fn login(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Forget the session and go home.
    pub fn logout(&mut self) {
        self.session = None;
        self.nav.set_view(&View::Home);
    }

    /// The backend rejected our token: forget it and show the login page.
    pub fn handle_unauthorized(&mut self) {
        self.session = None;
        self.nav.set_view(&View::Login);
    }

    /// Resolve the current route into what gets shown for this session.
    pub fn access(&self) -> Result<(Screen, Access), RouteError> {
        let screen = self.nav.route().screen()?;
        let user = self.session.as_ref().map(|s| &s.user);

        let access = match (&screen, user) {
            (Screen::Profile | Screen::Editor { .. }, None) => Access::Login,
            (Screen::Admin, None) => Access::Forbidden,
            (Screen::Admin, Some(u)) if !u.is_admin() => Access::Forbidden,
            _ => Access::Granted {
                screen: screen_name(&screen).to_string(),
            },
        };
        Ok((screen, access))
    }
}

fn editing_id(route: &Route) -> Option<i64> {
    match route.view {
        View::Create => route.params.article_id.as_ref().and_then(|id| id.valid()),
        _ => None,
    }
}

pub fn screen_name(screen: &Screen) -> &'static str {
    match screen {
        Screen::Home => "home",
        Screen::Detail { .. } => "detail",
        Screen::Search { .. } => "search",
        Screen::Profile => "profile",
        Screen::Editor { .. } => "create",
        Screen::Admin => "admin",
        Screen::Login => "login",
        Screen::Register => "register",
        Screen::Moments => "moments",
        Screen::Archive => "archive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::User;

    fn session(role: &str) -> Session {
        Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                username: "u".to_string(),
                role: Some(role.to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_editing_article_follows_route() {
        let mut app = AppContext::new("edit/12", None, false);
        assert_eq!(app.editing_article(), Some(12));

        app.nav_mut().navigate_to("home");
        assert_eq!(app.editing_article(), None);

        app.nav_mut().navigate_to("edit/3");
        assert_eq!(app.editing_article(), Some(3));
        app.nav_mut().navigate_to("create");
        assert_eq!(app.editing_article(), None);
    }

    #[test]
    fn test_protected_screens_need_login() {
        let app = AppContext::new("profile", None, false);
        assert_eq!(app.access().unwrap().1, Access::Login);

        let app = AppContext::new("create", Some(session("USER")), false);
        assert!(matches!(app.access().unwrap().1, Access::Granted { .. }));
    }

    #[test]
    fn test_admin_requires_admin_role() {
        let app = AppContext::new("admin", Some(session("USER")), false);
        assert_eq!(app.access().unwrap().1, Access::Forbidden);

        let app = AppContext::new("admin", Some(session("ADMIN")), false);
        assert_eq!(
            app.access().unwrap().1,
            Access::Granted {
                screen: "admin".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_id_surfaces_as_error() {
        let app = AppContext::new("post/oops", None, false);
        assert!(app.access().is_err());
    }

    #[test]
    fn test_unauthorized_clears_session_and_routes_to_login() {
        let mut app = AppContext::new("profile", Some(session("USER")), true);
        app.handle_unauthorized();
        assert!(app.session().is_none());
        assert_eq!(app.nav().fragment(), "login");
        assert!(app.dark_mode());
    }

    #[test]
    fn test_logout_goes_home() {
        let mut app = AppContext::new("profile", Some(session("USER")), false);
        app.logout();
        assert!(app.session().is_none());
        assert_eq!(app.nav().fragment(), "home");
        assert!(!app.dark_mode());
    }
}
