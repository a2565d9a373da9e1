#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    handlers::attendance::{AttendanceListQuery, CheckOutResponse, CurrentAttendanceResponse},
    handlers::auth::{RefreshRequest, RefreshResponse},
    models::{
        attendance::{
            AttendanceResponse, CheckInRequest, CheckOutRequest, CompletionFilter, PostSummary,
            Shift, UnitSummary, UserSummary,
        },
        post::{CreatePost, PostResponse, PostWithUnit, UpdatePost},
        session::UserSession,
        unit::{CreateUnit, UnitResponse, UpdateUnit},
        user::{CreateUser, LoginRequest, LoginResponse, Role, UpdateUser, UserResponse},
    },
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        refresh_doc,
        logout_doc,
        me_doc,
        check_in_doc,
        check_out_doc,
        current_attendance_doc,
        list_attendance_doc,
        map_feed_doc,
        export_attendance_doc,
        list_units_doc,
        list_posts_doc,
        admin_list_users_doc,
        admin_create_user_doc,
        admin_update_user_doc,
        admin_delete_user_doc,
        admin_create_unit_doc,
        admin_update_unit_doc,
        admin_delete_unit_doc,
        admin_create_post_doc,
        admin_update_post_doc,
        admin_delete_post_doc
    ),
    components(
        schemas(
            // auth
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            UserSession,
            // users
            Role,
            CreateUser,
            UpdateUser,
            UserResponse,
            // attendance
            Shift,
            CompletionFilter,
            CheckInRequest,
            CheckOutRequest,
            CheckOutResponse,
            CurrentAttendanceResponse,
            AttendanceResponse,
            AttendanceListQuery,
            UserSummary,
            UnitSummary,
            PostSummary,
            // units & posts
            CreateUnit,
            UpdateUnit,
            UnitResponse,
            CreatePost,
            UpdatePost,
            PostResponse,
            PostWithUnit
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Login, token refresh, and session info"),
        (name = "Attendance", description = "Check-in/check-out, history, map, export"),
        (name = "Catalog", description = "Units and posts for the login screen"),
        (name = "Admin", description = "Master data administration")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());

        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses((status = 200, description = "New access token", body = RefreshResponse)),
    tag = "Auth",
    security(())
)]
fn refresh_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookies cleared")),
    tag = "Auth",
    security(())
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Current session", body = UserSession)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Check-in recorded", body = AttendanceResponse),
        (status = 400, description = "Already checked in for this shift"),
        (status = 403, description = "Unit or post does not match the session")
    ),
    tag = "Attendance"
)]
fn check_in_doc() {}

#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Check-out recorded; session closed", body = CheckOutResponse),
        (status = 400, description = "No check-in yet, or already checked out"),
        (status = 404, description = "Record not found for this user")
    ),
    tag = "Attendance"
)]
fn check_out_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/current",
    responses((status = 200, body = CurrentAttendanceResponse)),
    tag = "Attendance"
)]
fn current_attendance_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceListQuery),
    responses((status = 200, description = "Filtered attendance page")),
    tag = "Attendance"
)]
fn list_attendance_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/map",
    responses((status = 200, description = "Open check-ins with coordinates", body = [AttendanceResponse])),
    tag = "Attendance"
)]
fn map_feed_doc() {}

#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(AttendanceListQuery),
    responses((status = 200, description = "CSV export", body = String, content_type = "text/csv")),
    tag = "Attendance"
)]
fn export_attendance_doc() {}

#[utoipa::path(
    get,
    path = "/api/units",
    responses((status = 200, body = [UnitResponse])),
    tag = "Catalog",
    security(())
)]
fn list_units_doc() {}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, body = [PostWithUnit])),
    tag = "Catalog",
    security(())
)]
fn list_posts_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, body = [UserResponse])),
    tag = "Admin"
)]
fn admin_list_users_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUser,
    responses(
        (status = 201, body = UserResponse),
        (status = 409, description = "Username already exists")
    ),
    tag = "Admin"
)]
fn admin_create_user_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    request_body = UpdateUser,
    responses((status = 200, body = UserResponse)),
    tag = "Admin"
)]
fn admin_update_user_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    responses((status = 200, description = "User deactivated", body = UserResponse)),
    tag = "Admin"
)]
fn admin_delete_user_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/units",
    request_body = CreateUnit,
    responses((status = 201, body = UnitResponse)),
    tag = "Admin"
)]
fn admin_create_unit_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/units/{id}",
    request_body = UpdateUnit,
    responses((status = 200, body = UnitResponse)),
    tag = "Admin"
)]
fn admin_update_unit_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/units/{id}",
    responses((status = 200, description = "Unit deactivated", body = UnitResponse)),
    tag = "Admin"
)]
fn admin_delete_unit_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/posts",
    request_body = CreatePost,
    responses((status = 201, body = PostResponse)),
    tag = "Admin"
)]
fn admin_create_post_doc() {}

#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}",
    request_body = UpdatePost,
    responses((status = 200, body = PostResponse)),
    tag = "Admin"
)]
fn admin_update_post_doc() {}

#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    responses((status = 200, description = "Post deactivated", body = PostResponse)),
    tag = "Admin"
)]
fn admin_delete_post_doc() {}
