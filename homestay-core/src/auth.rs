use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::{
    CredentialError, CredentialService, Database, DatabaseError, IdentityClaim, NewUser, Role,
    UserData, UserStatus,
};

/// Verifies session credentials and manages the identity records behind them.
pub struct Auth<Db> {
    db: Arc<Db>,
    credentials: CredentialService,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The session credential is missing, malformed, or expired
    #[error("unauthorized access")]
    Unauthenticated,
    /// The credential is valid, but the account lacks the required role
    #[error("unauthorized access")]
    Forbidden,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

impl From<CredentialError> for AuthError {
    fn from(_: CredentialError) -> Self {
        Self::Unauthenticated
    }
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>, credentials: CredentialService) -> Self {
        Self {
            db: db.clone(),
            credentials,
        }
    }

    /// Issues a session token for the given claim
    pub fn issue(&self, claim: IdentityClaim) -> String {
        self.credentials.issue(claim)
    }

    /// Resolves the identity claim of a request.
    ///
    /// Never consults the identity store, so this guard can run before any
    /// role check without touching the database.
    pub fn authenticate(&self, token: Option<&str>) -> Result<IdentityClaim, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        Ok(self.credentials.verify(token)?)
    }

    /// Requires the claim's account to hold `role`, returning the account
    pub async fn require_role(
        &self,
        claim: &IdentityClaim,
        role: Role,
    ) -> Result<UserData, AuthError> {
        let user = self
            .db
            .user_by_email(&claim.email)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => AuthError::Forbidden,
                err => AuthError::Db(err),
            })?;

        if user.role != role {
            return Err(AuthError::Forbidden);
        }

        Ok(user)
    }

    /// The full guard chain: authentication strictly precedes the role lookup
    pub async fn authorize(&self, token: Option<&str>, role: Role) -> Result<UserData, AuthError> {
        let claim = self.authenticate(token)?;

        self.require_role(&claim, role).await
    }

    /// Saves a user, creating the record on first sight.
    ///
    /// An existing record is only touched when the save carries the host
    /// upgrade request (`status = Requested`); any other save of a known
    /// email returns the stored record unchanged.
    pub async fn save_user(&self, new_user: NewUser) -> Result<UserData, AuthError> {
        match self.db.user_by_email(&new_user.email).await {
            Ok(existing) => {
                if new_user.status == Some(UserStatus::Requested) {
                    self.db
                        .update_user_status(&new_user.email, new_user.status)
                        .await
                        .map_err(AuthError::Db)
                } else {
                    Ok(existing)
                }
            }
            Err(DatabaseError::NotFound {
                resource: _,
                identifier: _,
            }) => {
                let user = self.db.create_user(new_user).await.map_err(AuthError::Db)?;

                info!("Created account for {}", user.email);

                Ok(user)
            }
            Err(e) => Err(AuthError::Db(e)),
        }
    }

    /// Promotes or demotes an account. The host upgrade request marker is
    /// cleared once a role has been assigned.
    pub async fn update_role(&self, email: &str, role: Role) -> Result<UserData, DatabaseError> {
        let user = self.db.update_user_role(email, role, None).await?;

        info!("Account {} now has role {}", user.email, role.as_str());

        Ok(user)
    }

    /// Returns a user if it exists
    pub async fn user_by_email(&self, email: &str) -> Result<UserData, DatabaseError> {
        self.db.user_by_email(email).await
    }

    /// Returns all users
    pub async fn list_users(&self) -> Result<Vec<UserData>, DatabaseError> {
        self.db.list_users().await
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{BookingData, MemoryDatabase, NewBooking, NewRoom, Result, RoomData};

    fn service<Db: Database>(db: &Arc<Db>) -> Auth<Db> {
        Auth::new(db, CredentialService::new("test secret"))
    }

    fn new_user(email: &str, role: Role, status: Option<UserStatus>) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            photo_url: None,
            role,
            status,
        }
    }

    fn claim(email: &str) -> IdentityClaim {
        IdentityClaim {
            email: email.to_string(),
        }
    }

    /// A database that fails the test as soon as anything consults it
    struct UntouchableDatabase;

    fn untouchable<T>() -> Result<T> {
        panic!("the identity store must not be consulted")
    }

    #[async_trait]
    impl Database for UntouchableDatabase {
        async fn user_by_email(&self, _: &str) -> Result<UserData> {
            untouchable()
        }

        async fn create_user(&self, _: NewUser) -> Result<UserData> {
            untouchable()
        }

        async fn update_user_status(&self, _: &str, _: Option<UserStatus>) -> Result<UserData> {
            untouchable()
        }

        async fn update_user_role(
            &self,
            _: &str,
            _: Role,
            _: Option<UserStatus>,
        ) -> Result<UserData> {
            untouchable()
        }

        async fn list_users(&self) -> Result<Vec<UserData>> {
            untouchable()
        }

        async fn count_users(&self) -> Result<u64> {
            untouchable()
        }

        async fn room_by_id(&self, _: Uuid) -> Result<RoomData> {
            untouchable()
        }

        async fn list_rooms(&self, _: Option<&str>) -> Result<Vec<RoomData>> {
            untouchable()
        }

        async fn rooms_by_host_email(&self, _: &str) -> Result<Vec<RoomData>> {
            untouchable()
        }

        async fn create_room(&self, _: NewRoom) -> Result<RoomData> {
            untouchable()
        }

        async fn delete_room(&self, _: Uuid) -> Result<()> {
            untouchable()
        }

        async fn set_room_booked(&self, _: Uuid, _: bool) -> Result<RoomData> {
            untouchable()
        }

        async fn reserve_room(&self, _: Uuid) -> Result<bool> {
            untouchable()
        }

        async fn count_rooms(&self) -> Result<u64> {
            untouchable()
        }

        async fn count_rooms_by_host(&self, _: &str) -> Result<u64> {
            untouchable()
        }

        async fn booking_by_id(&self, _: Uuid) -> Result<BookingData> {
            untouchable()
        }

        async fn create_booking(&self, _: NewBooking) -> Result<BookingData> {
            untouchable()
        }

        async fn delete_booking(&self, _: Uuid) -> Result<()> {
            untouchable()
        }

        async fn list_bookings(&self) -> Result<Vec<BookingData>> {
            untouchable()
        }

        async fn bookings_by_guest_email(&self, _: &str) -> Result<Vec<BookingData>> {
            untouchable()
        }

        async fn bookings_by_host_email(&self, _: &str) -> Result<Vec<BookingData>> {
            untouchable()
        }

        async fn count_bookings_for_room(&self, _: Uuid) -> Result<u64> {
            untouchable()
        }
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_the_store() {
        let db = Arc::new(UntouchableDatabase);
        let auth = service(&db);

        let result = auth.authorize(None, Role::Admin).await;

        assert!(
            matches!(result, Err(AuthError::Unauthenticated)),
            "missing token should fail authentication"
        );
    }

    #[tokio::test]
    async fn test_invalid_token_never_reaches_the_store() {
        let db = Arc::new(UntouchableDatabase);
        let auth = service(&db);

        let result = auth.authorize(Some("bogus.token"), Role::Host).await;

        assert!(
            matches!(result, Err(AuthError::Unauthenticated)),
            "invalid token should fail authentication"
        );
    }

    #[tokio::test]
    async fn test_role_gates() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = service(&db);

        auth.save_user(new_user("guest@x.com", Role::Guest, None))
            .await
            .expect("guest is saved");
        auth.save_user(new_user("admin@x.com", Role::Admin, None))
            .await
            .expect("admin is saved");
        auth.save_user(new_user("host@x.com", Role::Host, None))
            .await
            .expect("host is saved");

        for role in [Role::Admin, Role::Host] {
            let result = auth.require_role(&claim("guest@x.com"), role).await;

            assert!(
                matches!(result, Err(AuthError::Forbidden)),
                "guest should be forbidden from {} operations",
                role.as_str()
            );
        }

        let admin = auth
            .require_role(&claim("admin@x.com"), Role::Admin)
            .await
            .expect("admin passes the admin gate");
        assert_eq!(admin.role, Role::Admin);

        let host = auth
            .require_role(&claim("host@x.com"), Role::Host)
            .await
            .expect("host passes the host gate");
        assert_eq!(host.role, Role::Host);
    }

    #[tokio::test]
    async fn test_unknown_account_is_forbidden() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = service(&db);

        let token = auth.issue(claim("nobody@x.com"));
        let result = auth.authorize(Some(&token), Role::Admin).await;

        assert!(
            matches!(result, Err(AuthError::Forbidden)),
            "a valid token without an account record should be forbidden"
        );
    }

    #[tokio::test]
    async fn test_save_user_is_idempotent() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = service(&db);

        let first = auth
            .save_user(new_user("a@x.com", Role::Guest, None))
            .await
            .expect("first save succeeds");
        let second = auth
            .save_user(new_user("a@x.com", Role::Guest, None))
            .await
            .expect("second save succeeds");

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(db.count_users().await.unwrap(), 1, "no duplicate record");
    }

    #[tokio::test]
    async fn test_requested_status_updates_only_status() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = service(&db);

        let original = auth
            .save_user(new_user("a@x.com", Role::Guest, None))
            .await
            .expect("user is saved");

        let mut upgrade = new_user("a@x.com", Role::Guest, Some(UserStatus::Requested));
        upgrade.name = "Another Name".to_string();

        let updated = auth.save_user(upgrade).await.expect("upgrade request saves");

        assert_eq!(updated.status, Some(UserStatus::Requested));
        assert_eq!(updated.name, original.name, "name must not change");
        assert_eq!(updated.role, original.role, "role must not change");
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_promotion_clears_the_request_marker() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = service(&db);

        auth.save_user(new_user(
            "a@x.com",
            Role::Guest,
            Some(UserStatus::Requested),
        ))
        .await
        .expect("user is saved");

        let promoted = auth
            .update_role("a@x.com", Role::Host)
            .await
            .expect("promotion succeeds");

        assert_eq!(promoted.role, Role::Host);
        assert_eq!(promoted.status, None);
    }
}
