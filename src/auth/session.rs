//! Client-side session state machine.
//!
//! Replaces the framework-held page/step globals of the original UI with an
//! explicit object a front end threads through its handlers. The server
//! stays stateless; this type only tracks which screen-level state the
//! client is in and holds the bearer token while authenticated.
//!
//! ```text
//! Anonymous -> (authenticate)   -> Authenticated
//! Anonymous -> (begin_recovery) -> AwaitingSecurityAnswer
//! AwaitingSecurityAnswer -> (abandon | authenticate) -> Anonymous | Authenticated
//! Authenticated -> (logout, or token expiry observed) -> Anonymous
//! ```

/// Logical session for one client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No token held; sign-in, sign-up, and recovery screens.
    #[default]
    Anonymous,
    /// Password recovery in progress: email verified, answer pending.
    AwaitingSecurityAnswer { email: String, question: String },
    /// Token held; authenticated chat shell.
    Authenticated {
        token: String,
        email: String,
        username: String,
    },
}

impl Session {
    #[must_use]
    pub const fn new() -> Self {
        Self::Anonymous
    }

    /// Enter the recovery detour with the question fetched for an email.
    pub fn begin_recovery(&mut self, email: String, question: String) {
        *self = Self::AwaitingSecurityAnswer { email, question };
    }

    /// Hold a freshly issued token; valid from any state (login, signup, or
    /// a completed recovery followed by re-login).
    pub fn authenticate(&mut self, token: String, email: String, username: String) {
        *self = Self::Authenticated {
            token,
            email,
            username,
        };
    }

    /// Drop back to anonymous, clearing any held token.
    ///
    /// Also the transition a client takes when it observes token expiry;
    /// re-authentication is the only path back.
    pub fn logout(&mut self) {
        *self = Self::Anonymous;
    }

    /// Abandon an in-progress recovery without authenticating.
    pub fn abandon_recovery(&mut self) {
        if matches!(self, Self::AwaitingSecurityAnswer { .. }) {
            *self = Self::Anonymous;
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The bearer token, when authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }
}
