//! Article endpoints.

use reqwest::Method;

use super::model::{Article, ArticleQuery, ArticleRequest};
use super::{ApiError, Client, Page};

impl Client {
    /// Public, published articles.
    pub fn articles(&self, query: &ArticleQuery) -> Result<Page<Article>, ApiError> {
        self.get_list_query("articles", query)
    }

    /// All articles regardless of status (admin).
    pub fn admin_articles(&self, query: &ArticleQuery) -> Result<Page<Article>, ApiError> {
        self.get_list_query("articles/admin", query)
    }

    /// Articles written by the logged-in user.
    pub fn my_articles(&self) -> Result<Page<Article>, ApiError> {
        self.get_list("articles/me")
    }

    pub fn article(&self, id: i64) -> Result<Article, ApiError> {
        self.get_one(&format!("articles/{}", id))
    }

    pub fn create_article(&self, req: &ArticleRequest) -> Result<Article, ApiError> {
        self.post("articles", req)
    }

    pub fn update_article(&self, id: i64, req: &ArticleRequest) -> Result<Article, ApiError> {
        self.put(&format!("articles/{}", id), req)
    }

    pub fn delete_article(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("articles/{}", id))
    }

    /// Set the review status of an article (admin).
    pub fn audit_article(&self, id: i64, status: &str) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("articles/{}/audit", id))
                .query(&[("status", status)]),
        )
    }
}
