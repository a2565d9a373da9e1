//! Models that represent users, authentication payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a guard or staff account.
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Immutable username used for login.
    pub username: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Human-readable full name.
    pub full_name: String,
    /// Role describing the user's privileges.
    pub role: Role,
    /// Inactive users cannot log in; accounts are deactivated, never deleted.
    pub active: bool,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

/// Permission granted to a subset of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Query and export cross-user attendance history.
    ViewHistory,
    /// See the live map of open check-ins.
    ViewMap,
    /// Mutate master data: users, units, posts.
    Administer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[schema(rename_all = "snake_case")]
/// Closed set of roles stored in the database. Capability membership is an
/// exhaustive match, so a new role must be classified at every check.
pub enum Role {
    Admin,
    Supervisor,
    Agente,
    Jefe,
    Gerente,
    Coordinador,
    Asistente,
    CentroDeControl,
    Oficina,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Admin,
        Role::Supervisor,
        Role::Agente,
        Role::Jefe,
        Role::Gerente,
        Role::Coordinador,
        Role::Asistente,
        Role::CentroDeControl,
        Role::Oficina,
    ];

    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Agente => "agente",
            Role::Jefe => "jefe",
            Role::Gerente => "gerente",
            Role::Coordinador => "coordinador",
            Role::Asistente => "asistente",
            Role::CentroDeControl => "centro_de_control",
            Role::Oficina => "oficina",
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewHistory => self.can_view_history(),
            Capability::ViewMap => self.can_view_map(),
            Capability::Administer => self.can_administer(),
        }
    }

    /// Roles allowed to query other users' attendance history.
    pub fn can_view_history(&self) -> bool {
        match self {
            Role::Admin | Role::Asistente | Role::Jefe | Role::Gerente | Role::CentroDeControl => {
                true
            }
            Role::Supervisor | Role::Agente | Role::Coordinador | Role::Oficina => false,
        }
    }

    /// Roles allowed to see the live check-in map.
    pub fn can_view_map(&self) -> bool {
        match self {
            Role::Admin | Role::Asistente | Role::Jefe | Role::Gerente | Role::CentroDeControl => {
                true
            }
            Role::Supervisor | Role::Agente | Role::Coordinador | Role::Oficina => false,
        }
    }

    /// Roles allowed to mutate users, units, and posts.
    pub fn can_administer(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::Supervisor
            | Role::Agente
            | Role::Jefe
            | Role::Gerente
            | Role::Coordinador
            | Role::Asistente
            | Role::CentroDeControl
            | Role::Oficina => false,
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "admin" => Ok(Role::Admin),
            "supervisor" => Ok(Role::Supervisor),
            "agente" => Ok(Role::Agente),
            "jefe" => Ok(Role::Jefe),
            "gerente" => Ok(Role::Gerente),
            "coordinador" => Ok(Role::Coordinador),
            "asistente" => Ok(Role::Asistente),
            "centro_de_control" => Ok(Role::CentroDeControl),
            "oficina" => Ok(Role::Oficina),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[
                    "admin",
                    "supervisor",
                    "agente",
                    "jefe",
                    "gerente",
                    "coordinador",
                    "asistente",
                    "centro_de_control",
                    "oficina",
                ],
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a new user account.
pub struct CreateUser {
    #[validate(custom(function = "rules::validate_username"))]
    pub username: String,
    #[validate(custom(function = "rules::validate_password_strength"))]
    pub password: String,
    #[validate(length(min = 2, message = "Full name is required"))]
    pub full_name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for updating portions of an existing user.
pub struct UpdateUser {
    #[validate(length(min = 2, message = "Full name is required"))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    #[validate(custom(function = "rules::validate_password_strength"))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
/// Credentials submitted at login, together with the unit and post the
/// guard is reporting to for this session.
pub struct LoginRequest {
    #[validate(length(min = 3, message = "Username must have at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
    pub unit_id: String,
    pub post_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Tokens and session summary returned after a successful login.
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: crate::models::session::UserSession,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

impl User {
    /// Constructs a new user with freshly generated identifiers.
    pub fn new(
        username: String,
        password_hash: String,
        full_name: String,
        role: Role,
        active: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            full_name,
            role,
            active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn role_serde_roundtrips_snake_case() {
        for role in Role::ALL {
            let value = serde_json::to_value(role).unwrap();
            assert_eq!(value, Value::String(role.as_str().to_string()));
            let back: Role = serde_json::from_value(value).unwrap();
            assert_eq!(back, role);
        }

        let control: Role = serde_json::from_str("\"centro_de_control\"").unwrap();
        assert_eq!(control, Role::CentroDeControl);
        assert!(serde_json::from_str::<Role>("\"guardia\"").is_err());
    }

    #[test]
    fn history_and_map_capabilities_cover_the_same_roles() {
        let expected = [
            Role::Admin,
            Role::Asistente,
            Role::Jefe,
            Role::Gerente,
            Role::CentroDeControl,
        ];
        for role in Role::ALL {
            let allowed = expected.contains(&role);
            assert_eq!(role.can_view_history(), allowed, "history: {:?}", role);
            assert_eq!(role.can_view_map(), allowed, "map: {:?}", role);
        }
    }

    #[test]
    fn only_admin_can_administer() {
        for role in Role::ALL {
            assert_eq!(role.can_administer(), role == Role::Admin, "{:?}", role);
        }
        assert!(Role::Admin.has_capability(Capability::Administer));
        assert!(!Role::Oficina.has_capability(Capability::Administer));
    }

    #[test]
    fn user_response_hides_password_hash() {
        let user = User::new(
            "alice".to_string(),
            "hash".to_string(),
            "Alice Example".to_string(),
            Role::Agente,
            true,
            Utc::now(),
        );
        let resp: UserResponse = user.into();
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "agente");
    }

    #[test]
    fn create_user_rejects_weak_password() {
        let payload = CreateUser {
            username: "guardia1".into(),
            password: "short".into(),
            full_name: "Guardia Uno".into(),
            role: Role::Agente,
            active: true,
        };
        assert!(validator::Validate::validate(&payload).is_err());
    }
}
