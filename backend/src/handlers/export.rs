//! CSV export of the attendance listing. Mounted behind the ViewHistory
//! gate; consumers are spreadsheet tools, so text cells are guarded against
//! formula injection.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::SecondsFormat;

use crate::{
    error::AppError,
    handlers::attendance::AttendanceListQuery,
    repositories::attendance::{self as attendance_repo, AttendanceListFilter},
    state::AppState,
};

fn needs_formula_guard(value: &str) -> bool {
    matches!(value.chars().next(), Some('=' | '+' | '-' | '@'))
}

/// Prefixes cells a spreadsheet would interpret as formulas.
fn guard_cell(value: &str) -> String {
    if needs_formula_guard(value) {
        format!("'{}", value)
    } else {
        value.to_string()
    }
}

pub async fn export_attendance(
    State(state): State<AppState>,
    Query(query): Query<AttendanceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    // The route is capability-gated, so the requested filters apply as-is.
    let filter = AttendanceListFilter {
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

    let rows = attendance_repo::list_for_export(&state.pool, &filter).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "username",
            "full_name",
            "role",
            "unit",
            "post",
            "shift",
            "shift_date",
            "check_in_time",
            "check_out_time",
            "hours_worked",
            "detected_city",
        ])
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    for row in rows {
        let check_in = row
            .check_in_time
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        let check_out = row
            .check_out_time
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        let hours = row
            .hours_worked
            .map(|h| format!("{:.2}", h))
            .unwrap_or_default();

        writer
            .write_record([
                guard_cell(&row.user_username),
                guard_cell(&row.user_full_name),
                row.user_role.as_str().to_string(),
                guard_cell(&row.unit_name),
                guard_cell(&row.post_name),
                row.shift.as_str().to_string(),
                row.shift_date.to_string(),
                check_in,
                check_out,
                hours,
                guard_cell(row.detected_city.as_deref().unwrap_or_default()),
            ])
            .map_err(|e| AppError::InternalServerError(e.into()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.csv\"",
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_cell_prefixes_formula_starters() {
        assert_eq!(guard_cell("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(guard_cell("+1"), "'+1");
        assert_eq!(guard_cell("-1"), "'-1");
        assert_eq!(guard_cell("@cmd"), "'@cmd");
        assert_eq!(guard_cell("Puesto Norte"), "Puesto Norte");
        assert_eq!(guard_cell(""), "");
    }
}
