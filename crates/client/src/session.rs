//! Authentication boundary.
//!
//! Sign-in and sign-out happen in the external auth provider. The client only
//! asks whether a session is present; it never touches tokens.

use std::sync::{Arc, RwLock};

/// Signed-in user, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

/// Black-box credential source.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;
}

/// Session holder updated by the auth provider's sign-in/sign-out callbacks.
#[derive(Debug, Default)]
pub struct SessionSlot {
    session: RwLock<Option<Session>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    pub fn sign_in(&self, session: Session) {
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut slot) = self.session.write() {
            *slot = None;
        }
    }
}

impl SessionProvider for SessionSlot {
    fn current_session(&self) -> Option<Session> {
        self.session.read().ok()?.clone()
    }
}

/// Gate in front of everything that needs a signed-in user.
#[derive(Clone)]
pub struct SessionGate {
    provider: Arc<dyn SessionProvider>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    pub fn current(&self) -> Option<Session> {
        self.provider.current_session()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

impl core::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionGate")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_follows_sign_in_and_out() {
        let slot = Arc::new(SessionSlot::new());
        let gate = SessionGate::new(slot.clone());
        assert!(!gate.is_signed_in());

        slot.sign_in(Session::new("u-1", "admin@toko.id"));
        assert_eq!(gate.current().map(|s| s.email), Some("admin@toko.id".to_string()));

        slot.sign_out();
        assert!(gate.current().is_none());
    }
}
