//! Credential checks.
//!
//! The server asks an [`Authenticator`] whether a login body is valid.
//! [`CredentialStore`] is the implementation used in practice: a fixed
//! list of username/password pairs read from configuration at startup.
//! Tests and embedders can supply their own authenticator instead.

use monocle_protocol::LoginRequest;

use crate::{Credential, Identity, SessionError};

/// Validates a login attempt and returns the identity it proves.
///
/// `Send + Sync + 'static` because a single authenticator is shared by
/// every connection task for as long as the server runs.
pub trait Authenticator: Send + Sync + 'static {
    /// Checks the credentials in `login`.
    ///
    /// # Returns
    /// - `Ok(Identity)`: the credentials are valid
    /// - `Err(SessionError::AuthFailed)`: they are not
    fn authenticate(
        &self,
        login: &LoginRequest,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}

/// The configured set of users allowed to log in.
///
/// Read-only once built: there is no API to add or remove a user while
/// the server is running.
///
/// Passwords are compared as plaintext with exact equality. No hashing,
/// no constant-time comparison.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: Vec<Credential>,
}

impl CredentialStore {
    /// Builds a store from an ordered list of credentials.
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }

    /// Returns the identity of the first credential matching both fields.
    pub fn verify(&self, username: &str, password: &str) -> Option<Identity> {
        self.credentials
            .iter()
            .find(|c| c.username == username && c.password == password)
            .map(|c| Identity::new(c.username.clone()))
    }

    /// Number of configured users.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl Authenticator for CredentialStore {
    async fn authenticate(&self, login: &LoginRequest) -> Result<Identity, SessionError> {
        self.verify(&login.username, &login.password).ok_or_else(|| {
            SessionError::AuthFailed(format!(
                "no matching credentials for user {:?}",
                login.username
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new([
            Credential::new("alice", "correct horse"),
            Credential::new("bob", "battery staple"),
        ])
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_verify_matching_pair_returns_identity() {
        let identity = store().verify("alice", "correct horse");
        assert_eq!(identity, Some(Identity::new("alice")));
    }

    #[test]
    fn test_verify_wrong_password_returns_none() {
        assert_eq!(store().verify("alice", "wrong"), None);
    }

    #[test]
    fn test_verify_password_of_other_user_returns_none() {
        assert_eq!(store().verify("alice", "battery staple"), None);
    }

    #[test]
    fn test_verify_unknown_user_returns_none() {
        assert_eq!(store().verify("mallory", "correct horse"), None);
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        assert_eq!(store().verify("Alice", "correct horse"), None);
        assert_eq!(store().verify("alice", "Correct horse"), None);
    }

    #[test]
    fn test_verify_compares_stored_plaintext_verbatim() {
        // Passwords are stored and compared as plaintext: whatever string
        // sits in the config is the password, byte for byte. A hash of
        // the password is just a different (wrong) password.
        let store = CredentialStore::new([Credential::new("ops", "  padded  ")]);
        assert!(store.verify("ops", "  padded  ").is_some());
        assert!(store.verify("ops", "padded").is_none());
    }

    #[test]
    fn test_verify_first_match_wins_for_duplicate_usernames() {
        let store = CredentialStore::new([
            Credential::new("dup", "one"),
            Credential::new("dup", "two"),
        ]);
        assert!(store.verify("dup", "one").is_some());
        assert!(store.verify("dup", "two").is_some());
    }

    #[test]
    fn test_empty_store_rejects_everyone() {
        let store = CredentialStore::default();
        assert!(store.is_empty());
        assert_eq!(store.verify("", ""), None);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let identity = store()
            .authenticate(&login("bob", "battery staple"))
            .await
            .expect("should authenticate");
        assert_eq!(identity.username(), "bob");
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_auth_failed() {
        let result = store().authenticate(&login("bob", "nope")).await;
        assert!(matches!(result, Err(SessionError::AuthFailed(_))));
    }
}
