// campus-eats/src/stores/session.rs

//! The signed-in user and everything that moves it: restore on startup,
//! sign-in / sign-up through the auth pipelines, sign-out and profile edits.

use crate::config::{EmailPolicy, SimulatedLatency};
use crate::core::ContextData;
use crate::error::{AppError, Result};
use crate::flows::session::{sign_in_pipeline, sign_up_pipeline, AuthCtxData, AuthMode};
use crate::models::{ProfilePatch, User};
use crate::persistence::{KeyValueStore, PersistedSlot, USER_KEY};
use crate::pipeline::Pipeline;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Where the UI should send the user once the session is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
  Auth,
  App,
}

#[derive(Debug)]
struct SessionState {
  user: Option<User>,
  restoring: bool,
  in_flight: usize,
}

struct SessionInner {
  state: RwLock<SessionState>,
  slot: PersistedSlot<User>,
  email_policy: EmailPolicy,
  latency: SimulatedLatency,
  user_tx: watch::Sender<Option<User>>,
  sign_in_flow: Pipeline<AuthCtxData, AppError>,
  sign_up_flow: Pipeline<AuthCtxData, AppError>,
}

/// Shared handle to the session. Starts out loading until [`restore`](Self::restore) runs.
#[derive(Clone)]
pub struct SessionStore {
  inner: Arc<SessionInner>,
}

/// Marks the session as loading for as long as it is alive.
struct LoadingGuard<'a>(&'a SessionStore);

impl<'a> LoadingGuard<'a> {
  fn start(store: &'a SessionStore) -> Self {
    store.inner.state.write().in_flight += 1;
    LoadingGuard(store)
  }
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    let mut state = self.0.inner.state.write();
    state.in_flight = state.in_flight.saturating_sub(1);
  }
}

impl SessionStore {
  pub fn new(storage: Arc<dyn KeyValueStore>, email_policy: EmailPolicy, latency: SimulatedLatency) -> Self {
    let (user_tx, _rx) = watch::channel(None);
    Self {
      inner: Arc::new(SessionInner {
        state: RwLock::new(SessionState {
          user: None,
          restoring: true,
          in_flight: 0,
        }),
        slot: PersistedSlot::new(storage, USER_KEY),
        email_policy,
        latency,
        user_tx,
        sign_in_flow: sign_in_pipeline(),
        sign_up_flow: sign_up_pipeline(),
      }),
    }
  }

  /// Loads the persisted user. Never fails: storage or parse errors are
  /// logged and treated as "no session".
  #[instrument(name = "SessionStore::restore", skip(self))]
  pub async fn restore(&self) -> Option<User> {
    let restored = match self.inner.slot.load().await {
      Ok(user) => user,
      Err(e) => {
        error!(error = %e, "Error restoring user session.");
        None
      }
    };

    {
      let mut state = self.inner.state.write();
      state.user = restored.clone();
      state.restoring = false;
    }
    self.inner.user_tx.send_replace(restored.clone());
    debug!(signed_in = restored.is_some(), "Session restore finished.");
    restored
  }

  /// Only the email suffix is checked; any password, even an empty one, is accepted.
  #[instrument(name = "SessionStore::sign_in", skip(self, _password), err(Display))]
  pub async fn sign_in(&self, email: &str, _password: &str) -> Result<User> {
    self.run_auth_flow(AuthMode::SignIn, email).await
  }

  #[instrument(name = "SessionStore::sign_up", skip(self, _password), err(Display))]
  pub async fn sign_up(&self, email: &str, _password: &str) -> Result<User> {
    self.run_auth_flow(AuthMode::SignUp, email).await
  }

  /// Clears the user and its persisted record. Never fails.
  #[instrument(name = "SessionStore::sign_out", skip(self))]
  pub async fn sign_out(&self) {
    let _loading = LoadingGuard::start(self);
    simulate_latency(self.inner.latency.sign_out).await;

    self.inner.state.write().user = None;
    self.inner.user_tx.send_replace(None);
    if let Err(e) = self.inner.slot.clear().await {
      error!(error = %e, "Error removing stored user data.");
    }
    info!("Signed out.");
  }

  /// Pretends to send a reset email. There is no account lookup.
  #[instrument(name = "SessionStore::forgot_password", skip(self))]
  pub async fn forgot_password(&self, email: &str) {
    simulate_latency(self.inner.latency.auth).await;
    debug!("Password reset requested.");
  }

  /// Merges `patch` into the current user and re-persists it. Returns the
  /// updated user, or `None` when nobody is signed in.
  #[instrument(name = "SessionStore::update_profile", skip(self))]
  pub async fn update_profile(&self, patch: ProfilePatch) -> Option<User> {
    let _loading = LoadingGuard::start(self);
    simulate_latency(self.inner.latency.profile_update).await;

    let updated = {
      let mut state = self.inner.state.write();
      let user = state.user.as_mut()?;
      user.apply(patch);
      user.clone()
    };
    self.inner.user_tx.send_replace(Some(updated.clone()));
    self.persist(&updated).await;
    Some(updated)
  }

  pub fn current_user(&self) -> Option<User> {
    self.inner.state.read().user.clone()
  }

  pub fn is_signed_in(&self) -> bool {
    self.inner.state.read().user.is_some()
  }

  pub fn is_loading(&self) -> bool {
    let state = self.inner.state.read();
    state.restoring || state.in_flight > 0
  }

  /// `None` while loading; otherwise where navigation should land.
  pub fn landing(&self) -> Option<Landing> {
    let state = self.inner.state.read();
    if state.restoring || state.in_flight > 0 {
      return None;
    }
    Some(if state.user.is_some() { Landing::App } else { Landing::Auth })
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
    self.inner.user_tx.subscribe()
  }

  pub fn email_policy(&self) -> &EmailPolicy {
    &self.inner.email_policy
  }

  pub fn latency(&self) -> SimulatedLatency {
    self.inner.latency
  }

  /// Makes `user` the current session and persists it. Used by the auth pipelines.
  pub(crate) async fn establish(&self, user: User) {
    self.inner.state.write().user = Some(user.clone());
    self.inner.user_tx.send_replace(Some(user.clone()));
    self.persist(&user).await;
  }

  async fn persist(&self, user: &User) {
    if let Err(e) = self.inner.slot.save(user).await {
      error!(error = %e, "Error storing user data.");
    }
  }

  async fn run_auth_flow(&self, mode: AuthMode, email: &str) -> Result<User> {
    let _loading = LoadingGuard::start(self);
    let ctx_data = ContextData::new(AuthCtxData::new(self.clone(), mode, email));

    let flow = match mode {
      AuthMode::SignIn => &self.inner.sign_in_flow,
      AuthMode::SignUp => &self.inner.sign_up_flow,
    };
    flow.run(ctx_data.clone()).await?;

    let user = ctx_data.read().user.clone();
    user.ok_or_else(|| AppError::Internal(format!("{} pipeline finished without a user", flow.name())))
  }
}

pub(crate) async fn simulate_latency(delay: std::time::Duration) {
  if !delay.is_zero() {
    tokio::time::sleep(delay).await;
  }
}
