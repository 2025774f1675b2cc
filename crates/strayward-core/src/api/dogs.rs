//! Stray dog reports, photos and pick-ups.

use crate::models::{
    Dog, DogFilter, DogImageInfo, DogSummary, DogUpdate, MessageResponse, NewDog, UploadReceipt,
};

use super::request::{ApiRequest, FileUpload};
use super::{ApiError, HttpClient};

#[derive(Clone)]
pub struct DogsApi {
    http: HttpClient,
}

impl DogsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Reported dogs, newest first. Removed dogs are never listed.
    pub async fn list(&self, filter: &DogFilter) -> Result<Vec<DogSummary>, ApiError> {
        self.http
            .json(ApiRequest::get("/dogs").queries(filter.query_pairs()))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Dog, ApiError> {
        self.http.json(ApiRequest::get(format!("/dogs/{}", id))).await
    }

    pub async fn create(&self, dog: &NewDog) -> Result<Dog, ApiError> {
        self.http.json(ApiRequest::post("/dogs").json(dog)?).await
    }

    pub async fn update(&self, id: i64, update: &DogUpdate) -> Result<Dog, ApiError> {
        self.http
            .json(ApiRequest::put(format!("/dogs/{}", id)).json(update)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.http.json(ApiRequest::delete(format!("/dogs/{}", id))).await
    }

    /// Attach a photo, sent as multipart field `file`.
    pub async fn upload_image(&self, id: i64, upload: FileUpload) -> Result<UploadReceipt, ApiError> {
        self.http
            .json(ApiRequest::post(format!("/dogs/{}/images", id)).file(upload))
            .await
    }

    pub async fn images(&self, id: i64) -> Result<Vec<DogImageInfo>, ApiError> {
        self.http.json(ApiRequest::get(format!("/dogs/{}/images", id))).await
    }

    /// Claim a reported dog as rescued; it then awaits admin confirmation.
    pub async fn mark_picked_up(&self, id: i64) -> Result<Dog, ApiError> {
        self.http
            .json(ApiRequest::post(format!("/dogs/{}/picked-up", id)))
            .await
    }
}
