//! Authentication service.
//!
//! Orchestrates registration, login, token refresh, and seller
//! promotion. Each operation opens at most one unit-of-work
//! transaction and commits the state change together with its outbox
//! event; any failure inside the transaction aborts the whole
//! operation.

mod error;

pub use error::AuthError;

use chrono::Utc;

use bazaar_core::{PhoneNumber, Role, UserId};

use crate::db::{EventSink, RepositoryError, StoreTx, UnitOfWork, UserDirectory};
use crate::models::{EventKind, IssuedTokens, User, UserSnapshot};
use crate::services::password::PasswordHasher;
use crate::services::tokens::TokenService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Generic over the unit of work so tests can run the real
/// orchestration against the in-memory store.
pub struct AuthService<W: UnitOfWork> {
    work: W,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl<W: UnitOfWork> AuthService<W> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(work: W, tokens: TokenService) -> Self {
        Self {
            work,
            tokens,
            hasher: PasswordHasher::new(),
        }
    }

    /// Register a new user with the customer role.
    ///
    /// `name` and `surname` are optional; pass an empty string for a
    /// field the caller did not provide.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone`, `AuthError::WeakPassword` or
    /// `AuthError::InvalidName` if a field fails validation.
    /// Returns `AuthError::UserAlreadyExists` if the phone is taken.
    pub async fn register(
        &self,
        phone: &str,
        password: &str,
        name: &str,
        surname: &str,
    ) -> Result<User, AuthError> {
        let phone = PhoneNumber::parse(phone)?;
        validate_password(password)?;
        validate_person_name("name", name)?;
        validate_person_name("surname", surname)?;

        // Cheap pre-check; the unique constraint still backstops races.
        let mut reader = self.work.reader();
        if reader.find_by_phone(&phone).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            phone,
            password_hash,
            name: name.to_owned(),
            surname: surname.to_owned(),
            roles: vec![Role::Customer],
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.work.begin().await?;
        tx.insert(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;
        tx.append(EventKind::UserRegistered, &UserSnapshot::from(&user))
            .await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Login with phone and password, issuing a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown phone and
    /// for a wrong password alike.
    pub async fn login(&self, phone: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        let phone = PhoneNumber::parse(phone)?;

        let mut reader = self.work.reader();
        let user = reader.find_by_phone(&phone).await?;

        // Unknown phone and wrong password are indistinguishable.
        let Some(user) = user else {
            return Err(AuthError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let mut tx = self.work.begin().await?;
        let issued = self.tokens.issue_for_user(&mut tx, &user).await?;
        tx.append(EventKind::UserLoggedIn, &UserSnapshot::from(&user))
            .await?;
        tx.commit().await?;

        Ok(issued)
    }

    /// Rotate the acting user's refresh token, returning a new pair.
    ///
    /// Verification and rotation share one transaction, so two
    /// concurrent refreshes with the same token serialize and only
    /// the first succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user is unknown
    /// or the presented token does not match a live row.
    pub async fn refresh(
        &self,
        user_id: UserId,
        refresh_token: &str,
    ) -> Result<IssuedTokens, AuthError> {
        let mut reader = self.work.reader();
        let user = reader
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let mut tx = self.work.begin().await?;
        let verified = self
            .tokens
            .verify_refresh(&mut tx, user.id, refresh_token)
            .await?;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue_for_user(&mut tx, &user).await?;
        tx.commit().await?;

        Ok(issued)
    }

    /// Grant the seller role to the acting user.
    ///
    /// Idempotent: promoting an existing seller changes nothing and
    /// writes no event. Existing tokens keep their old role claims
    /// until the next login or refresh.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user is unknown.
    pub async fn promote_to_seller(&self, user_id: UserId) -> Result<User, AuthError> {
        let mut reader = self.work.reader();
        let mut user = reader
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.is_seller() {
            return Ok(user);
        }

        user.roles.push(Role::Seller);

        let mut tx = self.work.begin().await?;
        tx.add_role(user.id, Role::Seller).await?;
        tx.append(EventKind::UserBecameSeller, &UserSnapshot::from(&user))
            .await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Get the acting user's account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user is unknown.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        let mut reader = self.work.reader();
        reader
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Validate an optional name field. Empty means not provided;
/// anything else must be letters only.
fn validate_person_name(field: &str, value: &str) -> Result<(), AuthError> {
    if !value.is_empty() && !value.chars().all(char::is_alphabetic) {
        return Err(AuthError::InvalidName(format!(
            "{field} must contain letters only"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

    use super::*;
    use crate::db::mem::{FailPoint, MemUnitOfWork};
    use crate::services::jwt::AccessClaims;
    use crate::services::testutil::{TEST_ISSUER, TEST_PUBLIC_KEY_PEM, test_signer};

    const PHONE: &str = "+998901234567";
    const PASSWORD: &str = "password123";

    fn auth_with_ttl(refresh_ttl: Duration) -> (AuthService<MemUnitOfWork>, MemUnitOfWork) {
        let uow = MemUnitOfWork::new();
        let service = AuthService::new(uow.clone(), TokenService::new(test_signer(), refresh_ttl));
        (service, uow)
    }

    fn auth() -> (AuthService<MemUnitOfWork>, MemUnitOfWork) {
        auth_with_ttl(Duration::days(7))
    }

    fn decode_roles(token: &str) -> Vec<Role> {
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY_PEM.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[TEST_ISSUER]);
        decode::<AccessClaims>(token, &key, &validation)
            .unwrap()
            .claims
            .roles
    }

    async fn register(service: &AuthService<MemUnitOfWork>) -> User {
        service
            .register(PHONE, PASSWORD, "Aziz", "Karimov")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn register_assigns_customer_role_and_writes_event() {
        let (service, uow) = auth();

        let user = register(&service).await;
        assert_eq!(user.roles, vec![Role::Customer]);
        assert_ne!(user.password_hash, PASSWORD);
        assert!(user.password_hash.starts_with("$argon2"));

        let state = uow.snapshot();
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].kind, EventKind::UserRegistered);
        assert_eq!(state.events[0].payload.phone, PHONE);
    }

    #[tokio::test]
    async fn register_duplicate_phone_fails_without_second_event() {
        let (service, uow) = auth();
        register(&service).await;

        let err = service
            .register(PHONE, "otherpassword", "Bobur", "Aliyev")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let state = uow.snapshot();
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.events.len(), 1);
    }

    #[tokio::test]
    async fn register_validates_fields_before_touching_storage() {
        let (service, uow) = auth();

        let err = service
            .register("901234567", PASSWORD, "Aziz", "Karimov")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidPhone(_)));

        let err = service
            .register(PHONE, "short", "Aziz", "Karimov")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));

        let err = service
            .register(PHONE, PASSWORD, "Aziz99", "Karimov")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidName(_)));

        let err = service
            .register(PHONE, PASSWORD, "Aziz", "Karimov 2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidName(_)));

        let state = uow.snapshot();
        assert!(state.users.is_empty());
        assert!(state.events.is_empty());
    }

    #[tokio::test]
    async fn register_accepts_missing_names() {
        let (service, _uow) = auth();

        let user = service.register(PHONE, PASSWORD, "", "").await.unwrap();

        assert!(user.name.is_empty());
        assert!(user.surname.is_empty());
        assert_eq!(user.roles, vec![Role::Customer]);
    }

    #[tokio::test]
    async fn register_rolls_back_user_row_when_event_write_fails() {
        let (service, uow) = auth();

        uow.fail_on(FailPoint::OnAppendEvent);
        let err = service
            .register(PHONE, PASSWORD, "Aziz", "Karimov")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));

        // Nothing from the aborted transaction is visible.
        let state = uow.snapshot();
        assert!(state.users.is_empty());
        assert!(state.events.is_empty());

        // The phone is still free afterwards.
        uow.fail_on(FailPoint::None);
        let user = register(&service).await;
        assert_eq!(user.phone.as_str(), PHONE);
    }

    #[tokio::test]
    async fn login_issues_tokens_and_writes_event() {
        let (service, uow) = auth();
        let user = register(&service).await;

        let issued = service.login(PHONE, PASSWORD).await.unwrap();
        assert!(!issued.access_token.is_empty());
        assert_eq!(issued.refresh_token.len(), 43);
        assert_eq!(decode_roles(&issued.access_token), vec![Role::Customer]);

        let state = uow.snapshot();
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.events[1].kind, EventKind::UserLoggedIn);
        assert!(state.tokens.contains_key(&user.id));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable_and_persist_nothing() {
        let (service, uow) = auth();
        register(&service).await;

        let wrong_password = service.login(PHONE, "wrongpass1").await.unwrap_err();
        let unknown_phone = service
            .login("+998909999999", PASSWORD)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_phone, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_phone.to_string());

        let state = uow.snapshot();
        assert!(state.tokens.is_empty());
        assert_eq!(state.events.len(), 1);
    }

    #[tokio::test]
    async fn login_commit_failure_leaves_no_token_and_no_event() {
        let (service, uow) = auth();
        let user = register(&service).await;

        uow.fail_on(FailPoint::OnCommit);
        let err = service.login(PHONE, PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));

        let state = uow.snapshot();
        assert!(!state.tokens.contains_key(&user.id));
        assert_eq!(state.events.len(), 1);
    }

    #[tokio::test]
    async fn refresh_rotates_and_invalidates_the_previous_token() {
        let (service, uow) = auth();
        let user = register(&service).await;

        let first = service.login(PHONE, PASSWORD).await.unwrap();
        let second = service.refresh(user.id, &first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        // The rotated-away token is dead, the new one works.
        let replay = service.refresh(user.id, &first.refresh_token).await;
        assert!(matches!(replay, Err(AuthError::InvalidCredentials)));
        service.refresh(user.id, &second.refresh_token).await.unwrap();

        let state = uow.snapshot();
        assert_eq!(state.tokens.len(), 1);
    }

    #[tokio::test]
    async fn refresh_rejects_expired_tokens() {
        let (service, _uow) = auth_with_ttl(Duration::seconds(-1));
        let user = register(&service).await;

        let issued = service.login(PHONE, PASSWORD).await.unwrap();
        let err = service
            .refresh(user.id, &issued.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn refresh_for_unknown_user_fails_closed() {
        let (service, _uow) = auth();

        let err = service
            .refresh(UserId::generate(), "some-refresh-token")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn promote_adds_role_once_and_writes_one_event() {
        let (service, uow) = auth();
        let user = register(&service).await;

        let promoted = service.promote_to_seller(user.id).await.unwrap();
        assert_eq!(promoted.roles, vec![Role::Customer, Role::Seller]);

        let state = uow.snapshot();
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.events[1].kind, EventKind::UserBecameSeller);
        assert!(state.events[1].payload.roles.contains(&Role::Seller));

        // Promoting again is a no-op.
        let again = service.promote_to_seller(user.id).await.unwrap();
        assert_eq!(again.roles, vec![Role::Customer, Role::Seller]);
        assert_eq!(uow.snapshot().events.len(), 2);
    }

    #[tokio::test]
    async fn promotion_shows_up_in_the_next_token() {
        let (service, _uow) = auth();
        let user = register(&service).await;

        let before = service.login(PHONE, PASSWORD).await.unwrap();
        assert_eq!(decode_roles(&before.access_token), vec![Role::Customer]);

        service.promote_to_seller(user.id).await.unwrap();

        let after = service.refresh(user.id, &before.refresh_token).await.unwrap();
        assert_eq!(
            decode_roles(&after.access_token),
            vec![Role::Customer, Role::Seller]
        );
    }

    #[tokio::test]
    async fn get_user_resolves_only_known_ids() {
        let (service, _uow) = auth();
        let user = register(&service).await;

        let found = service.get_user(user.id).await.unwrap();
        assert_eq!(found.id, user.id);

        let err = service.get_user(UserId::generate()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
