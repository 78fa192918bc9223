//! Category and tag endpoints.

use super::model::{Category, NameRequest, Tag};
use super::{ApiError, Client, Page};

impl Client {
    pub fn categories(&self) -> Result<Page<Category>, ApiError> {
        self.get_list("categories")
    }

    pub fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        self.post("categories", &name_body(name))
    }

    pub fn update_category(&self, id: i64, name: &str) -> Result<Category, ApiError> {
        self.put(&format!("categories/{}", id), &name_body(name))
    }

    pub fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("categories/{}", id))
    }

    pub fn tags(&self) -> Result<Page<Tag>, ApiError> {
        self.get_list("tags")
    }

    pub fn create_tag(&self, name: &str) -> Result<Tag, ApiError> {
        self.post("tags", &name_body(name))
    }

    pub fn update_tag(&self, id: i64, name: &str) -> Result<Tag, ApiError> {
        self.put(&format!("tags/{}", id), &name_body(name))
    }

    pub fn delete_tag(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("tags/{}", id))
    }
}

fn name_body(name: &str) -> NameRequest {
    NameRequest {
        name: name.to_string(),
    }
}
