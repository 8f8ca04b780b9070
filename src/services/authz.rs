use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{auth::Identity, user::User, user::UserRole},
};

// Role checks re-derive "is this caller an admin" from scratch on every
// call: identity -> email -> users row -> flag. There is no caching, so a
// revoked admin flag takes effect on the next request.
#[derive(Clone)]
pub struct AuthzService {
    user_repo: UserRepository,
}

impl AuthzService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    // Gate for every admin mutation. Fails closed at each step of the
    // derivation and returns the user row when authorized.
    pub async fn require_admin(&self, identity: Option<&Identity>) -> Result<User, AppError> {
        let identity = identity.ok_or(AppError::AuthenticationRequired)?;
        let email = identity
            .email
            .as_deref()
            .ok_or(AppError::EmailRequired)?;

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_admin {
            return Err(AppError::AdminAccessRequired);
        }

        Ok(user)
    }

    pub fn require_auth<'a>(
        &self,
        identity: Option<&'a Identity>,
    ) -> Result<&'a Identity, AppError> {
        identity.ok_or(AppError::AuthenticationRequired)
    }

    // The caller's role, or None when unauthenticated or when the lookup
    // fails. Lookup errors are swallowed on purpose: role display must
    // never take a page down.
    pub async fn current_role(&self, identity: Option<&Identity>) -> Option<UserRole> {
        let email = identity?.email.as_deref()?;
        match self.user_repo.find_by_email(email).await {
            Ok(Some(user)) if user.is_admin => Some(UserRole::Admin),
            Ok(_) => Some(UserRole::User),
            Err(_) => None,
        }
    }

    pub async fn require_role(
        &self,
        identity: Option<&Identity>,
        role: UserRole,
    ) -> Result<(), AppError> {
        if self.current_role(identity).await != Some(role) {
            return Err(AppError::RoleRequired(role.as_str().to_string()));
        }
        Ok(())
    }

    // Never errors: false for anonymous callers and for callers with no
    // matching users row.
    pub async fn is_admin(&self, identity: Option<&Identity>) -> bool {
        let Some(identity) = identity else {
            return false;
        };
        let Some(email) = identity.email.as_deref() else {
            return false;
        };
        matches!(
            self.user_repo.find_by_email(email).await,
            Ok(Some(user)) if user.is_admin
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    // Lazy pool: the anonymous/no-email paths below never reach the
    // database.
    fn test_service() -> AuthzService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/gloria_connect_test")
            .unwrap();
        AuthzService::new(UserRepository::new(pool))
    }

    fn identity_without_email() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: None,
        }
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_be_admins() {
        let authz = test_service();
        assert!(matches!(
            authz.require_admin(None).await,
            Err(AppError::AuthenticationRequired)
        ));
    }

    #[tokio::test]
    async fn identities_without_email_cannot_be_authorized() {
        let authz = test_service();
        let identity = identity_without_email();
        assert!(matches!(
            authz.require_admin(Some(&identity)).await,
            Err(AppError::EmailRequired)
        ));
    }

    #[tokio::test]
    async fn require_auth_rejects_anonymous_and_passes_identities_through() {
        let authz = test_service();
        assert!(matches!(
            authz.require_auth(None),
            Err(AppError::AuthenticationRequired)
        ));

        let identity = identity_without_email();
        let passed = authz.require_auth(Some(&identity)).unwrap();
        assert_eq!(passed.id, identity.id);
    }

    #[tokio::test]
    async fn role_is_absent_without_an_identity_or_email() {
        let authz = test_service();
        assert_eq!(authz.current_role(None).await, None);
        assert_eq!(
            authz.current_role(Some(&identity_without_email())).await,
            None
        );
    }

    #[tokio::test]
    async fn require_role_names_the_missing_role() {
        let authz = test_service();
        match authz.require_role(None, UserRole::Admin).await {
            Err(AppError::RoleRequired(role)) => assert_eq!(role, "admin"),
            other => panic!("expected RoleRequired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn is_admin_never_errors_for_anonymous_callers() {
        let authz = test_service();
        assert!(!authz.is_admin(None).await);
        assert!(!authz.is_admin(Some(&identity_without_email())).await);
    }
}
