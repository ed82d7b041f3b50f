mod admin_token;
mod traits;
mod types;

pub use admin_token::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    if config.admin_token.is_empty() {
        return Err(AuthError::ConfigurationError(
            "auth.admin_token must be set".to_string(),
        ));
    }
    Ok(Box::new(AdminTokenAuthenticator::new(&config.admin_token)))
}
