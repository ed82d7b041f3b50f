//! Shared-secret admin authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator that accepts exactly one header value:
/// `Authorization: Bearer <admin_token>`.
///
/// The scheme is matched verbatim (no case folding) and no other header is
/// consulted.
pub struct AdminTokenAuthenticator {
    expected_header: String,
}

impl AdminTokenAuthenticator {
    pub fn new(admin_token: &str) -> Self {
        Self {
            expected_header: format!("Bearer {}", admin_token),
        }
    }
}

#[async_trait]
impl Authenticator for AdminTokenAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let presented = request
            .authorization()
            .ok_or(AuthError::NotAuthenticated)?;

        if credentials_match(presented, &self.expected_header) {
            Ok(Identity::admin())
        } else {
            Err(AuthError::InvalidCredentials(
                "authorization header does not match".to_string(),
            ))
        }
    }

    fn method_name(&self) -> &'static str {
        "admin_token"
    }
}

/// Compare a presented `Authorization` value with the expected one.
///
/// Plain equality. Every caller goes through here so the comparison can be
/// replaced (e.g. by a constant-time one) in a single place.
pub fn credentials_match(presented: &str, expected: &str) -> bool {
    presented == expected
}
