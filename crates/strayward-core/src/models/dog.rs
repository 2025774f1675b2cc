use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle of a dog report.
///
/// `Reported` -> `PendingAdmin` when someone marks the dog picked up, then
/// an administrator moves it to `Confirmed` or back to `Reported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogStatus {
    Reported,
    PendingAdmin,
    Confirmed,
    Removed,
}

impl DogStatus {
    pub const ALL: [DogStatus; 4] = [
        DogStatus::Reported,
        DogStatus::PendingAdmin,
        DogStatus::Confirmed,
        DogStatus::Removed,
    ];

    /// Wire value used in query strings and JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            DogStatus::Reported => "reported",
            DogStatus::PendingAdmin => "pending_admin",
            DogStatus::Confirmed => "confirmed",
            DogStatus::Removed => "removed",
        }
    }

    /// Human readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            DogStatus::Reported => "Reported",
            DogStatus::PendingAdmin => "Awaiting confirmation",
            DogStatus::Confirmed => "Rescued",
            DogStatus::Removed => "Removed",
        }
    }
}

impl fmt::Display for DogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DogStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown dog status '{}' (expected one of: reported, pending_admin, confirmed, removed)",
                    s
                )
            })
    }
}

/// Minimal view of a user embedded in a dog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserRef {
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Image metadata as embedded in dog records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogImage {
    pub id: i64,
    pub dog_id: i64,
    pub filename: String,
    #[serde(default)]
    pub uploaded_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Entry returned by `GET /dogs/{id}/images`; carries a servable `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogImageInfo {
    pub id: i64,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub uploaded_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Entry in the `GET /dogs` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DogStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub images: Vec<DogImage>,
}

/// Full dog record, as returned by detail, create, update and admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DogStatus,
    #[serde(default)]
    pub reporter_id: Option<i64>,
    #[serde(default)]
    pub picked_up_by_user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub images: Vec<DogImage>,
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub picked_up_by: Option<UserRef>,
}

/// Body of `POST /dogs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDog {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `PUT /dogs/{id}`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl DogUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// Query filter for `GET /dogs`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DogFilter {
    pub status: Option<DogStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DogFilter {
    pub fn by_status(status: DogStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Query pairs in the order the server documents them.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        // The server only honours a location filter when both halves are set
        if let (Some(lat), Some(lng)) = (self.latitude, self.longitude) {
            pairs.push(("lat".to_string(), lat.to_string()));
            pairs.push(("lng".to_string(), lng.to_string()));
        }
        pairs
    }
}

/// Response of `POST /dogs/{id}/images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    pub filename: String,
    pub url: String,
}
