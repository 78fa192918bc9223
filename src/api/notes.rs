//! Learning note endpoints.

use super::model::{LearningNote, NoteRequest};
use super::{ApiError, Client, Page};

impl Client {
    pub fn notes_for_article(&self, article_id: i64) -> Result<Page<LearningNote>, ApiError> {
        self.get_list(&format!("notes/article/{}", article_id))
    }

    pub fn create_note(&self, article_id: i64, content: &str) -> Result<LearningNote, ApiError> {
        self.post(
            &format!("notes/article/{}", article_id),
            &NoteRequest {
                content: content.to_string(),
            },
        )
    }

    pub fn delete_note(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("notes/{}", id))
    }
}
