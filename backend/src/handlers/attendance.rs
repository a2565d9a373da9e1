use axum::{
    extract::{Extension, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attendance::{
            hours_between, Attendance, AttendanceResponse, CheckInRequest, CheckOutRequest,
            CompletionFilter, Shift,
        },
        session::UserSession,
        user::Role,
        PaginatedResponse, PaginationQuery,
    },
    repositories::attendance::{self as attendance_repo, AttendanceListFilter},
    state::AppState,
    utils::time,
};

use super::auth::clear_session_headers;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceListQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub unit_id: Option<String>,
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<Role>,
    pub shift: Option<Shift>,
    pub status: Option<CompletionFilter>,
    pub city: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AttendanceListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        let defaults = PaginationQuery::default();
        PaginationQuery {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentAttendanceResponse {
    pub attendance: Option<AttendanceResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckOutResponse {
    pub attendance: AttendanceResponse,
    pub message: String,
}

/// Translates query filters into repository filters. Roles without history
/// access are pinned to their own records no matter what they asked for.
pub fn effective_filter(query: &AttendanceListQuery, session: &UserSession) -> AttendanceListFilter {
    let mut filter = AttendanceListFilter {
        date_from: query.date_from,
        date_to: query.date_to,
        unit_id: query.unit_id.clone(),
        post_id: query.post_id.clone(),
        user_id: query.user_id.clone(),
        role: query.role,
        shift: query.shift,
        status: query.status,
        city: query.city.clone(),
        search: query.search.clone(),
    };
    if !session.role.can_view_history() {
        filter.user_id = Some(session.user_id.clone());
    }
    filter
}

/// First hop of `x-forwarded-for`, then `x-real-ip`; stored as opaque data.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn check_in(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Json(payload): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<AttendanceResponse>), AppError> {
    payload.validate()?;

    // A guard can only check in at the post they logged in for.
    let assigned = session.unit_id.as_deref().zip(session.post_id.as_deref());
    let Some((unit_id, post_id)) = assigned else {
        return Err(AppError::Forbidden(
            "Session has no assigned unit and post".into(),
        ));
    };
    if payload.unit_id != unit_id || payload.post_id != post_id {
        return Err(AppError::Forbidden(
            "Unit or post does not match your session".into(),
        ));
    }

    let now_local = time::now_in_timezone(&state.config.time_zone);
    let now_utc = now_local.with_timezone(&Utc);
    let shift = time::shift_for(&now_local);
    let shift_date = time::shift_date_for(&now_local);

    let existing = attendance_repo::find_by_shift_key(
        &state.pool,
        &session.user_id,
        unit_id,
        post_id,
        shift_date,
        shift,
    )
    .await?;

    let record = match existing {
        Some(record) if record.check_in_time.is_some() => {
            return Err(AppError::AlreadyCheckedIn(
                "Check-in already recorded for this shift".into(),
            ));
        }
        // Record exists without a check-in: take it over instead of failing
        // on the unique key.
        Some(mut record) => {
            record.check_in_time = Some(now_utc);
            record.latitude = payload.latitude;
            record.longitude = payload.longitude;
            record.detected_city = payload.detected_city.clone();
            record.ip_address = Some(client_ip(&headers));
            record.device_info = payload.device_info.clone();
            record.updated_at = now_utc;
            attendance_repo::update_check_in(&state.pool, &record).await?
        }
        None => {
            let mut record = Attendance::new(
                session.user_id.clone(),
                unit_id.to_string(),
                post_id.to_string(),
                shift,
                shift_date,
                now_utc,
            );
            record.check_in_time = Some(now_utc);
            record.latitude = payload.latitude;
            record.longitude = payload.longitude;
            record.detected_city = payload.detected_city.clone();
            record.ip_address = Some(client_ip(&headers));
            record.device_info = payload.device_info.clone();

            match attendance_repo::insert(&state.pool, &record).await {
                Ok(row) => row,
                // Lost the race on the composite key: someone already
                // created this shift's record.
                Err(AppError::Conflict(_)) => {
                    return Err(AppError::AlreadyCheckedIn(
                        "Check-in already recorded for this shift".into(),
                    ));
                }
                Err(err) => return Err(err),
            }
        }
    };

    tracing::info!(
        user_id = %session.user_id,
        shift = record.shift.as_str(),
        shift_date = %record.shift_date,
        "check-in recorded"
    );

    let row = attendance_repo::find_row_by_id(&state.pool, &record.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn check_out(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(payload): Json<CheckOutRequest>,
) -> Result<(HeaderMap, Json<CheckOutResponse>), AppError> {
    let mut record =
        attendance_repo::find_by_id_for_user(&state.pool, &payload.attendance_id, &session.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    let Some(check_in_time) = record.check_in_time else {
        return Err(AppError::Precondition(
            "Check-in must be recorded first".into(),
        ));
    };
    if record.check_out_time.is_some() {
        return Err(AppError::AlreadyCheckedOut(
            "Check-out already recorded for this shift".into(),
        ));
    }

    let now_utc = time::now_in_timezone(&state.config.time_zone).with_timezone(&Utc);
    record.check_out_time = Some(now_utc);
    record.hours_worked = Some(hours_between(check_in_time, now_utc));
    // Keep the check-in position unless the client sent a new one.
    if payload.latitude.is_some() {
        record.latitude = payload.latitude;
    }
    if payload.longitude.is_some() {
        record.longitude = payload.longitude;
    }
    record.updated_at = now_utc;

    let updated = attendance_repo::update_check_out(&state.pool, &record).await?;

    tracing::info!(
        user_id = %session.user_id,
        hours_worked = ?updated.hours_worked,
        "check-out recorded, closing session"
    );

    let row = attendance_repo::find_row_by_id(&state.pool, &updated.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    // One login per shift cycle: completing the shift invalidates the
    // session cookies, forcing a fresh login before the next one.
    let headers = clear_session_headers(&state)?;

    Ok((
        headers,
        Json(CheckOutResponse {
            attendance: row.into(),
            message: "Check-out recorded. Session closed.".into(),
        }),
    ))
}

/// The session's record for the shift in progress, if any. During a night
/// shift this keeps resolving to the previous day's shift date until 07:00.
pub async fn current_attendance(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<CurrentAttendanceResponse>, AppError> {
    let assigned = session.unit_id.as_deref().zip(session.post_id.as_deref());
    let Some((unit_id, post_id)) = assigned else {
        return Ok(Json(CurrentAttendanceResponse { attendance: None }));
    };

    let now_local = time::now_in_timezone(&state.config.time_zone);
    let shift = time::shift_for(&now_local);
    let shift_date = time::shift_date_for(&now_local);

    let record = attendance_repo::find_by_shift_key(
        &state.pool,
        &session.user_id,
        unit_id,
        post_id,
        shift_date,
        shift,
    )
    .await?;

    let attendance = match record {
        Some(record) => attendance_repo::find_row_by_id(&state.pool, &record.id)
            .await?
            .map(AttendanceResponse::from),
        None => None,
    };

    Ok(Json(CurrentAttendanceResponse { attendance }))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<AttendanceListQuery>,
) -> Result<Json<PaginatedResponse<AttendanceResponse>>, AppError> {
    let pagination = query.pagination();
    let filter = effective_filter(&query, &session);

    let (rows, total) = attendance_repo::list(
        &state.pool,
        &filter,
        pagination.per_page(),
        pagination.offset(),
    )
    .await?;

    let data = rows.into_iter().map(AttendanceResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        total,
        pagination.page(),
        pagination.per_page(),
    )))
}

/// Open check-ins with coordinates for the shift in progress.
pub async fn map_feed(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceResponse>>, AppError> {
    let now_local = time::now_in_timezone(&state.config.time_zone);
    let shift = time::shift_for(&now_local);
    let shift_date = time::shift_date_for(&now_local);

    let rows = attendance_repo::open_for_shift(&state.pool, shift_date, shift).await?;
    Ok(Json(rows.into_iter().map(AttendanceResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_with_user(user_id: Option<&str>) -> AttendanceListQuery {
        AttendanceListQuery {
            date_from: None,
            date_to: None,
            unit_id: None,
            post_id: None,
            user_id: user_id.map(str::to_string),
            role: None,
            shift: None,
            status: None,
            city: None,
            search: None,
            page: None,
            per_page: None,
        }
    }

    fn session_with_role(role: Role) -> UserSession {
        UserSession {
            user_id: "self-id".into(),
            username: "guardia1".into(),
            full_name: "Guardia Uno".into(),
            role,
            unit_id: Some("unit-1".into()),
            post_id: Some("post-1".into()),
        }
    }

    #[test]
    fn roles_without_history_are_forced_to_their_own_records() {
        let query = query_with_user(Some("someone-else"));
        let filter = effective_filter(&query, &session_with_role(Role::Agente));
        assert_eq!(filter.user_id.as_deref(), Some("self-id"));

        let filter = effective_filter(&query_with_user(None), &session_with_role(Role::Oficina));
        assert_eq!(filter.user_id.as_deref(), Some("self-id"));
    }

    #[test]
    fn history_roles_keep_their_requested_filters() {
        let query = query_with_user(Some("someone-else"));
        let filter = effective_filter(&query, &session_with_role(Role::Jefe));
        assert_eq!(filter.user_id.as_deref(), Some("someone-else"));

        let filter = effective_filter(&query_with_user(None), &session_with_role(Role::Admin));
        assert!(filter.user_id.is_none());
    }

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());
        headers.insert("x-real-ip", "10.9.9.9".parse().unwrap());
        assert_eq!(client_ip(&headers), "10.0.0.1");

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers), "10.9.9.9");

        headers.remove("x-real-ip");
        assert_eq!(client_ip(&headers), "unknown");
    }

    #[test]
    fn pagination_defaults_apply_when_params_missing() {
        let query = query_with_user(None);
        let pagination = query.pagination();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.per_page(), 20);
    }
}
