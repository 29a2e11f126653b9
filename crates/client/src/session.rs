//! Session store.
//!
//! Owns the bearer token and the authenticated user's profile. A session is
//! either anonymous or authenticated; there is no half-logged-in state. Any
//! failure while validating a persisted token drops back to anonymous and
//! forgets the token.

use std::sync::Arc;

use beachstall_core::{Email, UserProfile};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{Credentials, StallApi};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::token::{AuthToken, TokenStore, TokenStoreError};

/// Shown when a login fails without a usable server message.
pub const LOGIN_FAILED_FALLBACK: &str = "Invalid email or password";

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login was rejected; carries the message to show the user.
    #[error("{0}")]
    LoginFailed(String),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

/// Who the client is acting as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        token: AuthToken,
        user: UserProfile,
    },
}

impl Session {
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(user),
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token, .. } => Some(token),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Holds the current [`Session`] and keeps the token store in step with it.
pub struct SessionStore<A, T> {
    api: Arc<A>,
    tokens: T,
    session: Session,
}

impl<A: StallApi, T: TokenStore> SessionStore<A, T> {
    /// Create an anonymous store. Call [`check_session`](Self::check_session)
    /// to pick up a persisted token.
    pub fn new(api: Arc<A>, tokens: T) -> Self {
        Self {
            api,
            tokens,
            session: Session::Anonymous,
        }
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn token_store(&self) -> &T {
        &self.tokens
    }

    /// Validate the persisted token against the server.
    ///
    /// With no token the session is anonymous and the server is not called.
    /// A token the server does not accept (or any other failure) is cleared.
    #[instrument(skip_all)]
    pub async fn check_session(&mut self) -> &Session {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.session = Session::Anonymous;
                return &self.session;
            }
            Err(e) => {
                warn!(error = %e, "Could not read persisted token");
                self.session = Session::Anonymous;
                return &self.session;
            }
        };

        match self.api.me(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                set_sentry_user(&user.id, user.email.as_ref().map(Email::as_str));
                self.session = Session::Authenticated { token, user };
            }
            Err(e) => {
                warn!(error = %e, "Persisted token rejected, clearing session");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "Failed to clear persisted token");
                }
                clear_sentry_user();
                self.session = Session::Anonymous;
            }
        }

        &self.session
    }

    /// Log in, persist the token, then load the profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LoginFailed`] with the server's message (or
    /// [`LOGIN_FAILED_FALLBACK`]) if the credentials are rejected or the new
    /// token does not yield a profile, and [`AuthError::TokenStore`] if the
    /// token cannot be persisted.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(
        &mut self,
        email: &Email,
        password: SecretString,
    ) -> Result<&Session, AuthError> {
        let credentials = Credentials {
            email: email.clone(),
            password,
        };

        let response = self.api.login(&credentials).await.map_err(|e| {
            warn!(error = %e, "Login rejected");
            AuthError::LoginFailed(
                e.server_message()
                    .unwrap_or(LOGIN_FAILED_FALLBACK)
                    .to_string(),
            )
        })?;

        let Some(token) = response.token.filter(|t| !t.trim().is_empty()) else {
            warn!("Login response carried no token");
            return Err(AuthError::LoginFailed(LOGIN_FAILED_FALLBACK.to_string()));
        };

        self.tokens.save(&AuthToken::new(token))?;

        if !self.check_session().await.is_authenticated() {
            return Err(AuthError::LoginFailed(LOGIN_FAILED_FALLBACK.to_string()));
        }

        add_breadcrumb("auth", "Logged in", None);
        Ok(&self.session)
    }

    /// Forget the token and return to anonymous. Never calls the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token could not be removed. The
    /// in-memory session is anonymous either way.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.session = Session::Anonymous;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        self.tokens.clear()?;
        Ok(())
    }
}
