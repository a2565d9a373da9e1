//! Attendance repository.
//!
//! Lookups are keyed by the composite (user, unit, post, shift_date, shift)
//! tuple; the table enforces its uniqueness, so concurrent check-ins for the
//! same shift collapse to exactly one created row.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::attendance::{
    Attendance, AttendanceResponse, CompletionFilter, PostSummary, Shift, UnitSummary, UserSummary,
};
use crate::models::user::Role;
use crate::repositories::common::push_clause;

const SELECT_COLUMNS: &str = "id, user_id, unit_id, post_id, shift, shift_date, check_in_time, \
     check_out_time, hours_worked, latitude, longitude, detected_city, ip_address, device_info, \
     created_at, updated_at";

const JOINED_COLUMNS: &str = "a.id, a.user_id, a.unit_id, a.post_id, a.shift, a.shift_date, \
     a.check_in_time, a.check_out_time, a.hours_worked, a.latitude, a.longitude, \
     a.detected_city, a.ip_address, a.device_info, a.created_at, a.updated_at, \
     u.username AS user_username, u.full_name AS user_full_name, u.role AS user_role, \
     un.name AS unit_name, un.city AS unit_city, p.name AS post_name";

const JOINED_FROM: &str = " FROM attendance a \
     JOIN users u ON a.user_id = u.id \
     JOIN units un ON a.unit_id = un.id \
     JOIN posts p ON a.post_id = p.id";

/// Attendance row joined with user/unit/post summaries.
#[derive(Debug, FromRow)]
pub struct AttendanceListRow {
    pub id: String,
    pub user_id: String,
    pub unit_id: String,
    pub post_id: String,
    pub shift: Shift,
    pub shift_date: NaiveDate,
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
    pub check_out_time: Option<chrono::DateTime<chrono::Utc>>,
    pub hours_worked: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub detected_city: Option<String>,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub user_username: String,
    pub user_full_name: String,
    pub user_role: Role,
    pub unit_name: String,
    pub unit_city: String,
    pub post_name: String,
}

impl From<AttendanceListRow> for AttendanceResponse {
    fn from(row: AttendanceListRow) -> Self {
        AttendanceResponse {
            id: row.id,
            shift: row.shift,
            shift_date: row.shift_date,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            hours_worked: row.hours_worked,
            latitude: row.latitude,
            longitude: row.longitude,
            detected_city: row.detected_city,
            user: UserSummary {
                id: row.user_id,
                username: row.user_username,
                full_name: row.user_full_name,
                role: row.user_role,
            },
            unit: UnitSummary {
                id: row.unit_id,
                name: row.unit_name,
                city: row.unit_city,
            },
            post: PostSummary {
                id: row.post_id,
                name: row.post_name,
            },
        }
    }
}

/// Filters accepted by the attendance listing and the CSV export.
#[derive(Debug, Default, Clone)]
pub struct AttendanceListFilter {
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
}

pub async fn find_by_shift_key(
    pool: &PgPool,
    user_id: &str,
    unit_id: &str,
    post_id: &str,
    shift_date: NaiveDate,
    shift: Shift,
) -> Result<Option<Attendance>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance WHERE user_id = $1 AND unit_id = $2 AND post_id = $3 \
         AND shift_date = $4 AND shift = $5",
        SELECT_COLUMNS
    );
    let record = sqlx::query_as::<_, Attendance>(&query)
        .bind(user_id)
        .bind(unit_id)
        .bind(post_id)
        .bind(shift_date)
        .bind(shift.as_str())
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Record by id, scoped to its owner. A foreign record is indistinguishable
/// from a missing one.
pub async fn find_by_id_for_user(
    pool: &PgPool,
    id: &str,
    user_id: &str,
) -> Result<Option<Attendance>, AppError> {
    let query = format!(
        "SELECT {} FROM attendance WHERE id = $1 AND user_id = $2",
        SELECT_COLUMNS
    );
    let record = sqlx::query_as::<_, Attendance>(&query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

pub async fn insert(pool: &PgPool, record: &Attendance) -> Result<Attendance, AppError> {
    let query = format!(
        "INSERT INTO attendance (id, user_id, unit_id, post_id, shift, shift_date, \
         check_in_time, check_out_time, hours_worked, latitude, longitude, detected_city, \
         ip_address, device_info, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Attendance>(&query)
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.unit_id)
        .bind(&record.post_id)
        .bind(record.shift.as_str())
        .bind(record.shift_date)
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.hours_worked)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.detected_city)
        .bind(&record.ip_address)
        .bind(&record.device_info)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Writes the check-in columns of an existing record.
pub async fn update_check_in(pool: &PgPool, record: &Attendance) -> Result<Attendance, AppError> {
    let query = format!(
        "UPDATE attendance SET check_in_time = $2, latitude = $3, longitude = $4, \
         detected_city = $5, ip_address = $6, device_info = $7, updated_at = $8 \
         WHERE id = $1 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Attendance>(&query)
        .bind(&record.id)
        .bind(record.check_in_time)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.detected_city)
        .bind(&record.ip_address)
        .bind(&record.device_info)
        .bind(record.updated_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;
    Ok(row)
}

/// Writes the check-out columns of an existing record.
pub async fn update_check_out(pool: &PgPool, record: &Attendance) -> Result<Attendance, AppError> {
    let query = format!(
        "UPDATE attendance SET check_out_time = $2, hours_worked = $3, latitude = $4, \
         longitude = $5, updated_at = $6 \
         WHERE id = $1 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Attendance>(&query)
        .bind(&record.id)
        .bind(record.check_out_time)
        .bind(record.hours_worked)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.updated_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;
    Ok(row)
}

/// Record with joined summaries, for check-in/check-out/current responses.
pub async fn find_row_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<AttendanceListRow>, AppError> {
    let query = format!(
        "SELECT {}{} WHERE a.id = $1",
        JOINED_COLUMNS, JOINED_FROM
    );
    let row = sqlx::query_as::<_, AttendanceListRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AttendanceListFilter) {
    let mut has_clause = false;
    if let Some(from) = filter.date_from {
        push_clause(builder, &mut has_clause);
        builder.push("a.shift_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        push_clause(builder, &mut has_clause);
        builder.push("a.shift_date <= ").push_bind(to);
    }
    if let Some(ref unit_id) = filter.unit_id {
        push_clause(builder, &mut has_clause);
        builder.push("a.unit_id = ").push_bind(unit_id.clone());
    }
    if let Some(ref post_id) = filter.post_id {
        push_clause(builder, &mut has_clause);
        builder.push("a.post_id = ").push_bind(post_id.clone());
    }
    if let Some(ref user_id) = filter.user_id {
        push_clause(builder, &mut has_clause);
        builder.push("a.user_id = ").push_bind(user_id.clone());
    }
    if let Some(role) = filter.role {
        push_clause(builder, &mut has_clause);
        builder.push("u.role = ").push_bind(role.as_str());
    }
    if let Some(shift) = filter.shift {
        push_clause(builder, &mut has_clause);
        builder.push("a.shift = ").push_bind(shift.as_str());
    }
    match filter.status {
        Some(CompletionFilter::SoloIngreso) => {
            push_clause(builder, &mut has_clause);
            builder.push("a.check_in_time IS NOT NULL AND a.check_out_time IS NULL");
        }
        Some(CompletionFilter::Completo) => {
            push_clause(builder, &mut has_clause);
            builder.push("a.check_out_time IS NOT NULL");
        }
        None => {}
    }
    if let Some(ref city) = filter.city {
        push_clause(builder, &mut has_clause);
        builder
            .push("a.detected_city ILIKE ")
            .push_bind(format!("%{}%", city));
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        push_clause(builder, &mut has_clause);
        builder
            .push("(u.full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR un.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Filtered listing, most recently created first, with the total count of
/// matching records.
pub async fn list(
    pool: &PgPool,
    filter: &AttendanceListFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<AttendanceListRow>, i64), AppError> {
    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT COUNT(*){}", JOINED_FROM));
    apply_filters(&mut count_builder, filter);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {}{}", JOINED_COLUMNS, JOINED_FROM));
    apply_filters(&mut builder, filter);
    builder.push(" ORDER BY a.created_at DESC");
    builder.push(" LIMIT ").push_bind(limit);
    builder.push(" OFFSET ").push_bind(offset);

    let rows = builder
        .build_query_as::<AttendanceListRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

/// Full filtered result set for the CSV export, newest first.
pub async fn list_for_export(
    pool: &PgPool,
    filter: &AttendanceListFilter,
) -> Result<Vec<AttendanceListRow>, AppError> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {}{}", JOINED_COLUMNS, JOINED_FROM));
    apply_filters(&mut builder, filter);
    builder.push(" ORDER BY a.created_at DESC");

    let rows = builder
        .build_query_as::<AttendanceListRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Open check-ins (in, not out) with coordinates for one shift instance;
/// feeds the live map.
pub async fn open_for_shift(
    pool: &PgPool,
    shift_date: NaiveDate,
    shift: Shift,
) -> Result<Vec<AttendanceListRow>, AppError> {
    let query = format!(
        "SELECT {}{} WHERE a.shift_date = $1 AND a.shift = $2 \
         AND a.check_in_time IS NOT NULL AND a.check_out_time IS NULL \
         AND a.latitude IS NOT NULL AND a.longitude IS NOT NULL \
         ORDER BY a.check_in_time",
        JOINED_COLUMNS, JOINED_FROM
    );
    let rows = sqlx::query_as::<_, AttendanceListRow>(&query)
        .bind(shift_date)
        .bind(shift.as_str())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
