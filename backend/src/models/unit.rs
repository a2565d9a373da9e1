use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::post::PostResponse;

/// Physical site guards are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(
        name: String,
        city: String,
        address: Option<String>,
        active: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            city,
            address,
            active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUnit {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 2, message = "City is required"))]
    pub city: String,
    pub address: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUnit {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 2, message = "City is required"))]
    pub city: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Unit with its active posts embedded, as consumed by the login screen.
pub struct UnitResponse {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub active: bool,
    pub posts: Vec<PostResponse>,
}

impl UnitResponse {
    pub fn from_unit(unit: Unit, posts: Vec<PostResponse>) -> Self {
        Self {
            id: unit.id,
            name: unit.name,
            city: unit.city,
            address: unit.address,
            active: unit.active,
            posts,
        }
    }
}
