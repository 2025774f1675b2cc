//! Administrator endpoints. Authorization is enforced by the server.

use crate::models::{Dog, MessageResponse};

use super::request::ApiRequest;
use super::{ApiError, HttpClient};

#[derive(Clone)]
pub struct AdminApi {
    http: HttpClient,
}

impl AdminApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Dogs marked picked up and awaiting confirmation.
    pub async fn pending_dogs(&self) -> Result<Vec<Dog>, ApiError> {
        self.http.json(ApiRequest::get("/admin/dogs/pending")).await
    }

    pub async fn confirm_rescue(&self, id: i64) -> Result<Dog, ApiError> {
        self.http
            .json(ApiRequest::post(format!("/admin/dogs/{}/confirm", id)))
            .await
    }

    /// Send a pending dog back to `reported`.
    pub async fn reject_rescue(&self, id: i64) -> Result<Dog, ApiError> {
        self.http
            .json(ApiRequest::post(format!("/admin/dogs/{}/reject", id)))
            .await
    }

    pub async fn set_user_role(&self, user_id: i64, is_admin: bool) -> Result<MessageResponse, ApiError> {
        self.http
            .json(ApiRequest::patch(format!("/admin/users/{}/role", user_id)).query("is_admin", is_admin))
            .await
    }

    pub async fn delete_image(&self, image_id: i64) -> Result<MessageResponse, ApiError> {
        self.http
            .json(ApiRequest::delete(format!("/admin/dog-images/{}", image_id)))
            .await
    }
}
