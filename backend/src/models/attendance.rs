use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::Role;

/// One user's presence at one post for one shift instance. Identified by the
/// composite key (user, unit, post, shift_date, shift), unique at the
/// persistence layer. Records are never deleted, only updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub unit_id: String,
    pub post_id: String,
    pub shift: Shift,
    /// Calendar date the shift is attributed to; for a night shift observed
    /// after midnight this is the previous day.
    pub shift_date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    /// Derived at check-out: (out - in) in hours, 2-decimal precision.
    pub hours_worked: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub detected_city: Option<String>,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// 07:00 to 19:00 local time.
    Day,
    /// 19:00 to 07:00 local time, crossing midnight.
    Night,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "day",
            Shift::Night => "night",
        }
    }
}

/// Worked hours between two instants, rounded to 2 decimals.
pub fn hours_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> f64 {
    let millis = (check_out - check_in).num_milliseconds() as f64;
    (millis / 3_600_000.0 * 100.0).round() / 100.0
}

impl Attendance {
    /// Constructs a record for the resolved shift key. The caller supplies a
    /// single `now` captured at the start of the request.
    pub fn new(
        user_id: String,
        unit_id: String,
        post_id: String,
        shift: Shift,
        shift_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            unit_id,
            post_id,
            shift,
            shift_date,
            check_in_time: None,
            check_out_time: None,
            hours_worked: None,
            latitude: None,
            longitude: None,
            detected_city: None,
            ip_address: None,
            device_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }

    pub fn is_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Check-in payload. Geolocation and device data are accepted as opaque
/// client input.
pub struct CheckInRequest {
    pub unit_id: String,
    pub post_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(length(max = 120))]
    pub detected_city: Option<String>,
    #[validate(length(max = 500))]
    pub device_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Check-out payload; coordinates are optional and fall back to the
/// check-in position.
pub struct CheckOutRequest {
    pub attendance_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Completion state filter for attendance listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFilter {
    /// Checked in, not yet out.
    SoloIngreso,
    /// Checked out.
    Completo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Attendance record joined with user/unit/post summaries.
pub struct AttendanceResponse {
    pub id: String,
    pub shift: Shift,
    pub shift_date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub detected_city: Option<String>,
    pub user: UserSummary,
    pub unit: UnitSummary,
    pub post: PostSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn shift_serde_snake_case() {
        let s: Shift = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(s, Shift::Night);
        let v = serde_json::to_value(Shift::Day).unwrap();
        assert_eq!(v, serde_json::json!("day"));
    }

    #[test]
    fn completion_filter_uses_wire_values() {
        let solo: CompletionFilter = serde_json::from_str("\"solo_ingreso\"").unwrap();
        assert_eq!(solo, CompletionFilter::SoloIngreso);
        let completo: CompletionFilter = serde_json::from_str("\"completo\"").unwrap();
        assert_eq!(completo, CompletionFilter::Completo);
    }

    #[test]
    fn hours_between_rounds_to_two_decimals() {
        let check_in = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2024, 1, 10, 14, 0, 0).unwrap();
        assert_eq!(hours_between(check_in, check_out), 6.00);

        let check_out = Utc.with_ymd_and_hms(2024, 1, 10, 8, 50, 0).unwrap();
        assert_eq!(hours_between(check_in, check_out), 0.83);

        // 1 hour 40 seconds rounds to 1.01, not 1.011...
        let check_out = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 40).unwrap();
        assert_eq!(hours_between(check_in, check_out), 1.01);

        assert_eq!(hours_between(check_in, check_in), 0.0);
    }

    #[test]
    fn new_record_starts_without_check_in() {
        let now = Utc::now();
        let record = Attendance::new(
            "u".into(),
            "unit".into(),
            "post".into(),
            Shift::Day,
            now.date_naive(),
            now,
        );
        assert!(record.check_in_time.is_none());
        assert!(!record.is_checked_in());
        assert!(!record.is_checked_out());
        assert!(record.hours_worked.is_none());
    }
}
