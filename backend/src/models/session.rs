//! Request-scoped session identity derived from a verified token.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::user::{Capability, Role, User};

/// Identity carried by a signed session token: who the user is and which
/// unit/post they picked at login. Never persisted server-side; trusted only
/// while the token signature is valid.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSession {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// Unit selected at login; absent for office staff that never check in.
    pub unit_id: Option<String>,
    /// Post selected at login; absent for office staff that never check in.
    pub post_id: Option<String>,
}

impl UserSession {
    pub fn new(user: &User, unit_id: Option<String>, post_id: Option<String>) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            unit_id,
            post_id,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role.has_capability(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn session_copies_identity_from_user() {
        let user = User::new(
            "guardia1".into(),
            "hash".into(),
            "Guardia Uno".into(),
            Role::Agente,
            true,
            Utc::now(),
        );
        let session = UserSession::new(&user, Some("u-1".into()), Some("p-1".into()));
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Agente);
        assert!(!session.has_capability(Capability::ViewHistory));
    }
}
