//! Fragment-driven navigation.
//!
//! The fragment is the single source of truth. Changing the view always goes
//! through the fragment, and every fragment change (including back/forward)
//! re-derives the route and notifies subscribers.

use crate::events::{Listeners, Subscription};
use crate::route::{self, Route, View};

pub struct Navigator {
    history: Vec<String>,
    cursor: usize,
    route: Route,
    listeners: Listeners<Route>,
}

impl Navigator {
    /// Start at `fragment` (the initial check on load).
    pub fn new(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment).to_string();
        let route = route::interpret(&fragment);
        Self {
            history: vec![fragment],
            cursor: 0,
            route,
            listeners: Listeners::new(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.history[self.cursor]
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Register a handler called with the new route after each change.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&Route) + 'static,
    {
        self.listeners.subscribe(handler)
    }

    /// Set the fragment. Setting the current fragment again is a no-op.
    pub fn navigate_to(&mut self, fragment: &str) {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if fragment == self.fragment() {
            return;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push(fragment.to_string());
        self.cursor += 1;
        log::debug!("navigate: #{}", fragment);
        self.on_fragment_change();
    }

    /// Navigate to the canonical fragment of `route`.
    pub fn navigate(&mut self, route: &Route) {
        self.navigate_to(&route::to_fragment(route));
    }

    /// Switch view programmatically; the fragment follows.
    pub fn set_view(&mut self, view: &View) {
        self.navigate_to(view.as_str());
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        self.on_fragment_change();
        true
    }

    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        self.on_fragment_change();
        true
    }

    fn on_fragment_change(&mut self) {
        self.route = route::interpret(self.fragment());
        self.listeners.emit(&self.route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(nav: &Navigator) -> (Rc<RefCell<Vec<String>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let seen = Rc::clone(&seen);
            nav.subscribe(move |route| seen.borrow_mut().push(route.fragment()))
        };
        (seen, sub)
    }

    #[test]
    fn test_initial_route() {
        let nav = Navigator::new("#post/5");
        assert_eq!(nav.fragment(), "post/5");
        assert_eq!(nav.route().view, View::Detail);
    }

    #[test]
    fn test_set_view_updates_fragment() {
        let mut nav = Navigator::new("");
        nav.set_view(&View::Moments);
        assert_eq!(nav.fragment(), "moments");
        assert_eq!(nav.route().view, View::Moments);
    }

    #[test]
    fn test_listeners_follow_navigation_and_history() {
        let mut nav = Navigator::new("home");
        let (seen, _sub) = recorder(&nav);

        nav.navigate(&Route::category(7));
        nav.navigate(&Route::tag(2));
        assert!(nav.back());
        assert_eq!(nav.route().params.category_id.as_ref().and_then(|id| id.valid()), Some(7));
        assert_eq!(nav.route().params.tag_id, None);
        assert!(nav.forward());
        assert!(!nav.forward());

        assert_eq!(
            *seen.borrow(),
            vec!["category/7", "tag/2", "category/7", "tag/2"]
        );
    }

    #[test]
    fn test_same_fragment_does_not_notify() {
        let mut nav = Navigator::new("search");
        let (seen, _sub) = recorder(&nav);
        nav.navigate_to("#search");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_navigation_after_back_drops_forward_history() {
        let mut nav = Navigator::new("home");
        nav.navigate_to("post/1");
        nav.navigate_to("post/2");
        nav.back();
        nav.navigate_to("archive");
        assert!(!nav.can_go_forward());
        nav.back();
        assert_eq!(nav.fragment(), "post/1");
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let mut nav = Navigator::new("home");
        let (seen, sub) = recorder(&nav);
        nav.navigate_to("login");
        drop(sub);
        nav.navigate_to("register");
        assert_eq!(*seen.borrow(), vec!["login"]);
    }
}
