//! Column (article series) endpoints.

use reqwest::Method;

use super::model::{Column, ColumnRequest};
use super::{ApiError, Client, Page};

impl Client {
    pub fn columns(&self) -> Result<Page<Column>, ApiError> {
        self.get_list("columns")
    }

    /// Columns nested under their parents.
    pub fn column_tree(&self) -> Result<Page<Column>, ApiError> {
        self.get_list("columns/tree")
    }

    pub fn column(&self, id: i64) -> Result<Column, ApiError> {
        self.get_one(&format!("columns/{}", id))
    }

    pub fn create_column(&self, req: &ColumnRequest) -> Result<Column, ApiError> {
        self.post("columns", req)
    }

    pub fn update_column(&self, id: i64, req: &ColumnRequest) -> Result<Column, ApiError> {
        self.put(&format!("columns/{}", id), req)
    }

    pub fn delete_column(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("columns/{}", id))
    }

    /// Ids of the articles in a column, in column order.
    pub fn column_article_ids(&self, column_id: i64) -> Result<Page<i64>, ApiError> {
        self.get_list(&format!("columns/{}/articles", column_id))
    }

    pub fn add_article_to_column(
        &self,
        column_id: i64,
        article_id: i64,
        sort_order: Option<i32>,
    ) -> Result<(), ApiError> {
        let mut req = self.request(
            Method::POST,
            &format!("columns/{}/articles/{}", column_id, article_id),
        );
        if let Some(order) = sort_order {
            req = req.query(&[("sortOrder", order)]);
        }
        self.execute(req)
    }

    pub fn remove_article_from_column(&self, column_id: i64, article_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("columns/{}/articles/{}", column_id, article_id))
    }
}
