use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Where the navigation layer should send the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Redirect {
    Landing,
    Login,
    Home,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Landing => "/landing",
            Redirect::Login => "/login",
            Redirect::Home => "/",
        }
    }
}

/// Session flags owned by the host environment (browser storage, keychain,
/// a test double). Injected so nothing here touches globals.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear_token(&self);
    fn logged_out(&self) -> bool;
    fn set_logged_out(&self, value: bool);
    /// Wipe every stored value, the logged-out flag included.
    fn clear(&self);
}

#[derive(Debug, Default)]
struct SessionData {
    token: Option<String>,
    logged_out: bool,
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: Mutex<SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.data().token.clone()
    }

    fn set_token(&self, token: &str) {
        self.data().token = Some(token.to_string());
    }

    fn clear_token(&self) {
        self.data().token = None;
    }

    fn logged_out(&self) -> bool {
        self.data().logged_out
    }

    fn set_logged_out(&self, value: bool) {
        self.data().logged_out = value;
    }

    fn clear(&self) {
        *self.data() = SessionData::default();
    }
}

pub fn is_logged_in(store: &dyn SessionStore) -> bool {
    store.token().map(|t| !t.is_empty()).unwrap_or(false)
}

pub fn login(store: &dyn SessionStore, token: &str) -> Redirect {
    store.set_token(token);
    store.set_logged_out(false);
    tracing::info!("session started");
    Redirect::Home
}

/// Drop all session data and leave the logged-out marker behind for
/// [`enforce_logout`] to pick up.
pub fn logout(store: &dyn SessionStore) -> Redirect {
    store.clear();
    store.set_logged_out(true);
    tracing::info!("session ended");
    Redirect::Landing
}

/// Run on every navigation. A pending logout wipes the store and forces the
/// landing page.
pub fn enforce_logout(store: &dyn SessionStore) -> Option<Redirect> {
    if !store.logged_out() {
        return None;
    }
    store.clear();
    tracing::debug!("logged-out marker found, redirecting to landing");
    Some(Redirect::Landing)
}

/// Protected pages send anonymous users to the login form.
pub fn require_login(store: &dyn SessionStore) -> Option<Redirect> {
    if is_logged_in(store) {
        None
    } else {
        Some(Redirect::Login)
    }
}
