use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::attendance::UnitSummary;

/// A position within a unit; every post belongs to exactly one unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Post {
    pub id: String,
    pub unit_id: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(unit_id: String, name: String, active: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            unit_id,
            name,
            active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePost {
    pub unit_id: String,
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePost {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            name: post.name,
            active: post.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Post joined with its unit, as returned by the public post listing.
pub struct PostWithUnit {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub unit: UnitSummary,
}
