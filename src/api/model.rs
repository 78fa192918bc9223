//! Resource shapes exchanged with the blog backend.
//!
//! Field names follow the backend's camelCase JSON. Almost everything is
//! optional: different endpoints fill different subsets of the same resource.

use serde::{Deserialize, Serialize};

/// Characters of content kept as the summary of a new article.
pub const SUMMARY_CHARS: usize = 150;

/// Reading speed used for the reading-time estimate.
const CHARS_PER_MINUTE: usize = 200;

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub author_id: Option<i64>,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub views: Option<u64>,
    pub view_count: Option<u64>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
    pub published_at: Option<String>,
    pub created_at: Option<String>,
    pub is_published: Option<bool>,
    pub status: Option<String>,
}

impl Article {
    /// Category label, falling back to the nested category, then "精选".
    pub fn category_label(&self) -> &str {
        self.category_name
            .as_deref()
            .or_else(|| self.category.as_ref().map(|c| c.name.as_str()))
            .unwrap_or("精选")
    }

    pub fn view_total(&self) -> u64 {
        self.view_count.or(self.views).unwrap_or(0)
    }

    /// Best available creation timestamp.
    pub fn created(&self) -> Option<&str> {
        self.create_time
            .as_deref()
            .or(self.published_at.as_deref())
            .or(self.created_at.as_deref())
    }

    /// Estimated reading time in minutes (never below one).
    pub fn reading_minutes(&self) -> usize {
        let chars = self
            .content
            .as_deref()
            .map(|c| c.chars().count())
            .unwrap_or(0);
        chars.div_ceil(CHARS_PER_MINUTE).max(1)
    }
}

/// Body of create/update article requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
    pub cover_image: Option<String>,
    pub status: String,
}

impl ArticleRequest {
    /// Build a publish request. Title and content are required.
    pub fn publish(title: &str, content: &str) -> Result<Self, String> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err("请填写标题和内容".to_string());
        }
        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            summary: content.chars().take(SUMMARY_CHARS).collect(),
            category_id: None,
            tag_ids: Vec::new(),
            cover_image: None,
            status: "published".to_string(),
        })
    }
}

/// Query parameters for the public article list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

// ============================================================================
// Taxonomy
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Body for creating or renaming a category or tag.
#[derive(Debug, Clone, Serialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
    pub status: Option<i32>,
    pub article_count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Column>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body for creating or updating a column. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

// ============================================================================
// Announcements, notes
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub create_time: Option<String>,
    pub created_at: Option<String>,
}

impl Announcement {
    pub fn created(&self) -> Option<&str> {
        self.create_time.as_deref().or(self.created_at.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningNote {
    pub id: i64,
    pub article_id: i64,
    pub user_id: Option<i64>,
    pub content: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteRequest {
    pub content: String,
}

// ============================================================================
// Users, auth
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub created_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }

    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Editable profile fields. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_tolerates_sparse_json() {
        let article: Article = serde_json::from_str(r#"{"id": 3, "title": "Hi"}"#).unwrap();
        assert_eq!(article.id, 3);
        assert_eq!(article.category_label(), "精选");
        assert_eq!(article.view_total(), 0);
        assert_eq!(article.reading_minutes(), 1);
    }

    #[test]
    fn test_article_fallbacks() {
        let article: Article = serde_json::from_str(
            r#"{"id": 1, "title": "t", "category": {"id": 2, "name": "Rust"},
                "views": 5, "viewCount": 9, "publishedAt": "2026-03-01"}"#,
        )
        .unwrap();
        assert_eq!(article.category_label(), "Rust");
        assert_eq!(article.view_total(), 9);
        assert_eq!(article.created(), Some("2026-03-01"));
    }

    #[test]
    fn test_reading_minutes_rounds_up() {
        let article = Article {
            content: Some("字".repeat(401)),
            ..Default::default()
        };
        assert_eq!(article.reading_minutes(), 3);
    }

    #[test]
    fn test_publish_request_requires_title_and_content() {
        assert!(ArticleRequest::publish("", "body").is_err());
        assert!(ArticleRequest::publish("title", "  ").is_err());

        let long = "a".repeat(400);
        let req = ArticleRequest::publish("title", &long).unwrap();
        assert_eq!(req.summary.len(), SUMMARY_CHARS);
        assert_eq!(req.status, "published");

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("tagIds").is_some());
        assert!(json.get("categoryId").is_none());
    }

    #[test]
    fn test_user_role_is_case_insensitive() {
        let user: User =
            serde_json::from_str(r#"{"id": 1, "username": "root", "role": "admin"}"#).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.display_name(), "root");
    }

    #[test]
    fn test_column_request_omits_unset_fields() {
        let req = ColumnRequest {
            name: Some("Series".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"name":"Series"}"#
        );
    }
}
