//! Hash route interpretation.
//!
//! The URL fragment is the only routing signal. `interpret` maps a fragment
//! to a `Route` (view + parameters) and `to_fragment` builds the canonical
//! fragment back. Neither fails: a non-numeric id segment is kept as
//! `RouteId::Invalid` and rejected later by `Route::screen`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Types
// ============================================================================

/// Application views addressable by fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Detail,
    Search,
    Profile,
    Create,
    Admin,
    Login,
    Register,
    Moments,
    Archive,
    /// Unrecognized token, kept verbatim until render time
    Other(String),
}

impl View {
    /// Map a literal token to a view. Unknown tokens become `Other`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "" | "home" => View::Home,
            "detail" => View::Detail,
            "search" => View::Search,
            "profile" => View::Profile,
            "create" => View::Create,
            "admin" => View::Admin,
            "login" => View::Login,
            "register" => View::Register,
            "moments" => View::Moments,
            "archive" => View::Archive,
            other => View::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            View::Home => "home",
            View::Detail => "detail",
            View::Search => "search",
            View::Profile => "profile",
            View::Create => "create",
            View::Admin => "admin",
            View::Login => "login",
            View::Register => "register",
            View::Moments => "moments",
            View::Archive => "archive",
            View::Other(token) => token,
        }
    }

    /// Navigation tab highlighted for this view (detail pages live under home).
    pub fn nav_tab(&self) -> &str {
        match self {
            View::Detail => "home",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for View {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Numeric route segment. `Invalid` holds the raw text that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RouteId {
    Valid(i64),
    Invalid(String),
}

impl RouteId {
    /// Parse a segment with `parseInt` semantics: leading whitespace, an
    /// optional sign, then at least one digit (hex after `0x`). Trailing text
    /// is ignored. Values outside `i64` are `Invalid`, unlike `parseInt`
    /// which would return an imprecise float.
    pub fn parse(segment: &str) -> Self {
        match parse_int_prefix(segment) {
            Some(n) => RouteId::Valid(n),
            None => RouteId::Invalid(segment.to_string()),
        }
    }

    pub fn valid(&self) -> Option<i64> {
        match self {
            RouteId::Valid(n) => Some(*n),
            RouteId::Invalid(_) => None,
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteId::Valid(n) => write!(f, "{}", n),
            RouteId::Invalid(raw) => f.write_str(raw),
        }
    }
}

/// Parameters extracted from the fragment.
///
/// `category_id` and `tag_id` are mutually exclusive: a route sets at most one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<RouteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RouteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<RouteId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub view: View,
    pub params: RouteParams,
}

/// What actually gets rendered for a route, with ids validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Detail { article_id: i64 },
    Search { category_id: Option<i64>, tag_id: Option<i64> },
    Profile,
    Editor { article_id: Option<i64> },
    Admin,
    Login,
    Register,
    Moments,
    Archive,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid {param} in route: {raw:?} is not a number")]
    InvalidId { param: &'static str, raw: String },
    #[error("route #{0} needs an article id")]
    MissingArticle(String),
}

// ============================================================================
// Interpretation
// ============================================================================

/// Interpret a fragment (the text after `#`; a leading `#` is tolerated).
pub fn interpret(fragment: &str) -> Route {
    let hash = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut params = RouteParams::default();

    let view = if hash.starts_with("post/") {
        params.article_id = Some(RouteId::parse(second_segment(hash)));
        View::Detail
    } else if hash.starts_with("edit/") {
        params.article_id = Some(RouteId::parse(second_segment(hash)));
        View::Create
    } else if hash.starts_with("category/") {
        params.category_id = Some(RouteId::parse(second_segment(hash)));
        params.tag_id = None;
        View::Search
    } else if hash.starts_with("tag/") {
        params.tag_id = Some(RouteId::parse(second_segment(hash)));
        params.category_id = None;
        View::Search
    } else {
        View::from_token(hash)
    };

    Route { view, params }
}

/// Build the canonical fragment (without `#`) for a route.
pub fn to_fragment(route: &Route) -> String {
    let p = &route.params;
    match (&route.view, &p.article_id, &p.category_id, &p.tag_id) {
        (View::Detail, Some(id), _, _) => format!("post/{}", id),
        (View::Create, Some(id), _, _) => format!("edit/{}", id),
        (View::Search, _, Some(id), _) => format!("category/{}", id),
        (View::Search, _, None, Some(id)) => format!("tag/{}", id),
        (view, _, _, _) => view.as_str().to_string(),
    }
}

impl Route {
    pub fn home() -> Self {
        Route {
            view: View::Home,
            params: RouteParams::default(),
        }
    }

    pub fn post(id: i64) -> Self {
        interpret(&format!("post/{}", id))
    }

    pub fn edit(id: i64) -> Self {
        interpret(&format!("edit/{}", id))
    }

    pub fn category(id: i64) -> Self {
        interpret(&format!("category/{}", id))
    }

    pub fn tag(id: i64) -> Self {
        interpret(&format!("tag/{}", id))
    }

    pub fn fragment(&self) -> String {
        to_fragment(self)
    }

    /// Resolve the route to a renderable screen.
    ///
    /// Unknown views fall back to `Home` here. Invalid numeric ids are errors.
    pub fn screen(&self) -> Result<Screen, RouteError> {
        let article = checked(&self.params.article_id, "article id")?;
        let category = checked(&self.params.category_id, "category id")?;
        let tag = checked(&self.params.tag_id, "tag id")?;

        Ok(match &self.view {
            View::Home | View::Other(_) => Screen::Home,
            View::Detail => match article {
                Some(article_id) => Screen::Detail { article_id },
                None => return Err(RouteError::MissingArticle(self.fragment())),
            },
            View::Search => Screen::Search {
                category_id: category,
                tag_id: tag,
            },
            View::Profile => Screen::Profile,
            View::Create => Screen::Editor {
                article_id: article,
            },
            View::Admin => Screen::Admin,
            View::Login => Screen::Login,
            View::Register => Screen::Register,
            View::Moments => Screen::Moments,
            View::Archive => Screen::Archive,
        })
    }
}

fn checked(id: &Option<RouteId>, param: &'static str) -> Result<Option<i64>, RouteError> {
    match id {
        None => Ok(None),
        Some(RouteId::Valid(n)) => Ok(Some(*n)),
        Some(RouteId::Invalid(raw)) => Err(RouteError::InvalidId {
            param,
            raw: raw.clone(),
        }),
    }
}

fn second_segment(hash: &str) -> &str {
    hash.split('/').nth(1).unwrap_or("")
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        _ => (10, digits),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(n: i64) -> Option<RouteId> {
        Some(RouteId::Valid(n))
    }

    #[test]
    fn test_empty_fragment_is_home() {
        assert_eq!(interpret(""), Route::home());
        assert_eq!(interpret("#"), Route::home());
    }

    #[test]
    fn test_post_route() {
        let route = interpret("post/42");
        assert_eq!(route.view, View::Detail);
        assert_eq!(route.params.article_id, valid(42));
        assert_eq!(route.params.category_id, None);
    }

    #[test]
    fn test_edit_route_carries_id() {
        let route = interpret("edit/9");
        assert_eq!(route.view, View::Create);
        assert_eq!(route.params.article_id, valid(9));
        assert_eq!(
            route.screen().unwrap(),
            Screen::Editor { article_id: Some(9) }
        );
    }

    #[test]
    fn test_category_route_clears_tag() {
        let route = interpret("category/7");
        assert_eq!(route.view, View::Search);
        assert_eq!(route.params.category_id, valid(7));
        assert_eq!(route.params.tag_id, None);
    }

    #[test]
    fn test_tag_route_clears_category() {
        let route = interpret("tag/3");
        assert_eq!(route.view, View::Search);
        assert_eq!(route.params.tag_id, valid(3));
        assert_eq!(route.params.category_id, None);
    }

    #[test]
    fn test_literal_tokens() {
        assert_eq!(interpret("moments").view, View::Moments);
        assert_eq!(interpret("#archive").view, View::Archive);
        assert_eq!(interpret("admin").view, View::Admin);
        assert_eq!(
            interpret("nowhere").view,
            View::Other("nowhere".to_string())
        );
    }

    #[test]
    fn test_unknown_view_falls_back_at_render_time() {
        let route = interpret("nowhere");
        assert_eq!(route.screen().unwrap(), Screen::Home);
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        assert_eq!(interpret("Home").view, View::Other("Home".to_string()));
        assert_eq!(interpret("POST/1").view, View::Other("POST/1".to_string()));
    }

    #[test]
    fn test_parse_int_semantics() {
        assert_eq!(RouteId::parse("12abc"), RouteId::Valid(12));
        assert_eq!(RouteId::parse("  -5"), RouteId::Valid(-5));
        assert_eq!(RouteId::parse("+8"), RouteId::Valid(8));
        assert_eq!(RouteId::parse("abc"), RouteId::Invalid("abc".to_string()));
        assert_eq!(RouteId::parse(""), RouteId::Invalid(String::new()));
        assert_eq!(RouteId::parse("-"), RouteId::Invalid("-".to_string()));
        assert_eq!(RouteId::parse("0x1A"), RouteId::Valid(26));
        assert_eq!(RouteId::parse("-0Xffz"), RouteId::Valid(-255));
        assert_eq!(RouteId::parse("0x"), RouteId::Invalid("0x".to_string()));
        assert_eq!(RouteId::parse("0xg"), RouteId::Invalid("0xg".to_string()));
        assert_eq!(RouteId::parse("007"), RouteId::Valid(7));
        assert_eq!(
            RouteId::parse("99999999999999999999"),
            RouteId::Invalid("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_only_second_segment_is_used() {
        assert_eq!(interpret("post/5/comments").params.article_id, valid(5));
    }

    #[test]
    fn test_invalid_id_propagates_and_is_rejected() {
        let route = interpret("post/abc");
        assert_eq!(
            route.params.article_id,
            Some(RouteId::Invalid("abc".to_string()))
        );
        let err = route.screen().unwrap_err();
        assert!(matches!(err, RouteError::InvalidId { .. }));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_detail_without_id_is_rejected() {
        let route = interpret("detail");
        assert_eq!(route.view, View::Detail);
        assert!(matches!(
            route.screen(),
            Err(RouteError::MissingArticle(_))
        ));
    }

    #[test]
    fn test_canonical_fragments() {
        assert_eq!(to_fragment(&interpret("post/12abc")), "post/12");
        assert_eq!(to_fragment(&interpret("")), "home");
        assert_eq!(to_fragment(&interpret("search")), "search");
        assert_eq!(to_fragment(&interpret("tag/4")), "tag/4");
        assert_eq!(to_fragment(&interpret("edit/2")), "edit/2");
        assert_eq!(to_fragment(&interpret("create")), "create");
        assert_eq!(to_fragment(&interpret("xyz")), "xyz");
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let fragments = [
            "",
            "home",
            "post/1",
            "post/ 7x",
            "post/abc",
            "edit/3",
            "category/7",
            "tag/9",
            "search",
            "profile",
            "create",
            "admin",
            "login",
            "register",
            "moments",
            "archive",
            "detail",
            "unknown-token",
        ];
        for f in fragments {
            let first = interpret(f);
            let again = interpret(&to_fragment(&first));
            assert_eq!(first, again, "fragment {:?}", f);
        }
    }

    #[test]
    fn test_nav_tab() {
        assert_eq!(interpret("post/1").view.nav_tab(), "home");
        assert_eq!(interpret("search").view.nav_tab(), "search");
    }

    #[test]
    fn test_route_serializes_camel_case() {
        let json = serde_json::to_string(&interpret("category/7")).unwrap();
        assert_eq!(json, r#"{"view":"search","params":{"categoryId":7}}"#);
    }
}
