//! OBEX authentication for the MAS session.
//!
//! When the client challenges us, the OBEX thread asks the user (through
//! whatever actor owns the receiving end of the confirmation channel) for a
//! session key and blocks until the user either answers or cancels.

use std::sync::{Condvar, Mutex, MutexGuard};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

/// Sent to the confirmation actor for every challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub description: Option<String>,
    pub user_id_required: bool,
    pub full_access: bool,
}

/// The answer to an OBEX authentication challenge.
#[derive(Debug)]
pub struct Credential {
    user_id: Option<String>,
    password: SecretString,
}

impl Credential {
    /// Always `None` for MAP; only the session key is exchanged.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn password_bytes(&self) -> &[u8] {
        self.password.expose_secret().as_bytes()
    }
}

#[derive(Default)]
struct AuthState {
    challenged: bool,
    cancelled: bool,
    session_key: Option<SecretString>,
}

pub struct Authenticator {
    state: Mutex<AuthState>,
    changed: Condvar,
    requests: Sender<ConfirmationRequest>,
}

impl Authenticator {
    pub fn new(requests: Sender<ConfirmationRequest>) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            changed: Condvar::new(),
            requests,
        }
    }

    /// An authenticator together with the receiving end of its confirmation
    /// channel.
    pub fn with_channel() -> (Self, Receiver<ConfirmationRequest>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }

    // The state is plain flags, so a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clears both flags so the next challenge waits for a fresh answer.
    /// Call before every session; the session key is left alone.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.challenged = false;
        state.cancelled = false;
    }

    pub fn set_challenged(&self, challenged: bool) {
        self.lock().challenged = challenged;
        self.changed.notify_all();
    }

    pub fn set_cancelled(&self, cancelled: bool) {
        self.lock().cancelled = cancelled;
        self.changed.notify_all();
    }

    pub fn set_session_key(&self, key: Option<SecretString>) {
        self.lock().session_key = key;
        self.changed.notify_all();
    }

    /// Handles a challenge from the client. Blocks until the user confirmed
    /// or cancelled; there is no timeout.
    ///
    /// Returns `None` when the user cancelled (even if a confirmation arrived
    /// as well), when the session key is empty, or when nobody is listening
    /// for confirmation requests.
    pub fn on_authentication_challenge(
        &self,
        description: Option<&str>,
        user_id_required: bool,
        full_access: bool,
    ) -> Option<Credential> {
        let request = ConfirmationRequest {
            description: description.map(str::to_string),
            user_id_required,
            full_access,
        };
        if self.requests.send(request).is_err() {
            warn!("No confirmation handler for OBEX auth challenge, rejecting");
            return None;
        }
        debug!("Waiting for user confirmation");

        let state = self
            .changed
            .wait_while(self.lock(), |s| !s.challenged && !s.cancelled)
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.cancelled {
            info!("OBEX authentication cancelled by user");
            return None;
        }

        match &state.session_key {
            Some(key) if !key.expose_secret().trim().is_empty() => Some(Credential {
                user_id: None,
                password: SecretString::from(key.expose_secret().to_string()),
            }),
            _ => {
                info!("Empty session key, no credential");
                None
            }
        }
    }

    /// We never challenge the client, so there is nothing to answer.
    pub fn on_authentication_response(&self, _user_name: &[u8]) -> Option<Vec<u8>> {
        None
    }
}
