//! Wire types for the Cloudflare v4 API.

use serde::{Deserialize, Serialize};

/// Every v4 response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Pagination block attached to list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// A Gateway list as returned by `GET /gateway/lists`.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsList {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTeamsList<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsListItem {
    pub value: String,
}

/// Body of `PATCH /gateway/lists/{id}`: both directions in one request.
#[derive(Debug, Serialize)]
pub struct PatchTeamsList {
    pub append: Vec<TeamsListItem>,
    pub remove: Vec<String>,
}

/// An Access user; seat flags may be absent on users never seen by Access.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub access_seat: Option<bool>,
    #[serde(default)]
    pub gateway_seat: Option<bool>,
    #[serde(default)]
    pub seat_uid: Option<String>,
}

impl AccessUser {
    pub fn holds_seat(&self) -> bool {
        self.access_seat.unwrap_or(false) || self.gateway_seat.unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct SeatUpdate<'a> {
    pub seat_uid: &'a str,
    pub access_seat: bool,
    pub gateway_seat: bool,
}
