//! Announcement endpoints.

use reqwest::Method;

use super::model::{Announcement, AnnouncementRequest};
use super::{ApiError, Client, Page};

impl Client {
    pub fn announcements(&self) -> Result<Page<Announcement>, ApiError> {
        self.get_list("announcements")
    }

    /// Announcements currently shown to readers.
    pub fn active_announcements(&self) -> Result<Page<Announcement>, ApiError> {
        self.get_list("announcements/active")
    }

    pub fn create_announcement(&self, req: &AnnouncementRequest) -> Result<Announcement, ApiError> {
        self.post("announcements", req)
    }

    pub fn update_announcement(
        &self,
        id: i64,
        req: &AnnouncementRequest,
    ) -> Result<Announcement, ApiError> {
        self.put(&format!("announcements/{}", id), req)
    }

    pub fn delete_announcement(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("announcements/{}", id))
    }

    pub fn mark_announcement_read(&self, id: i64) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, &format!("announcements/{}/read", id)))
    }
}
