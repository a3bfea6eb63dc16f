// campus-eats/src/flows/session.rs

use crate::core::{ContextData, PipelineControl, SkipCondition};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::pipeline::Pipeline;
use crate::stores::session::{simulate_latency, SessionStore};
use std::sync::Arc;
use tracing::{event, warn, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
  SignIn,
  SignUp,
}

/// Underlying data for the sign-in and sign-up pipelines.
pub struct AuthCtxData {
  pub session: SessionStore,
  pub mode: AuthMode,
  pub email: String,
  pub user: Option<User>,
}

impl AuthCtxData {
  /// The mock backend never checks passwords, so none is carried.
  pub fn new(session: SessionStore, mode: AuthMode, email: &str) -> Self {
    Self {
      session,
      mode,
      email: email.to_string(),
      user: None,
    }
  }
}

pub fn sign_in_pipeline() -> Pipeline<AuthCtxData, AppError> {
  let mut p = Pipeline::<AuthCtxData, AppError>::new(
    "sign_in",
    &[
      ("validate_signin_input", false, None),
      ("simulate_auth_roundtrip_signin", false, Some(skip_without_latency())),
      ("build_signin_user", false, None),
      ("commit_session_signin", false, None),
    ],
  );

  p.on_root("validate_signin_input", validate_credentials);
  p.on_root("simulate_auth_roundtrip_signin", simulate_auth_roundtrip);
  p.on_root("build_signin_user", |ctx_data: ContextData<AuthCtxData>| async move {
    let mut guard = ctx_data.write();
    let user = User::signed_in(&guard.email);
    guard.user = Some(user);
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on_root("commit_session_signin", commit_session);

  tracing::debug!(steps = ?p.step_names(), "Sign-in pipeline built.");
  p
}

pub fn sign_up_pipeline() -> Pipeline<AuthCtxData, AppError> {
  let mut p = Pipeline::<AuthCtxData, AppError>::new(
    "sign_up",
    &[
      ("validate_signup_input", false, None),
      ("simulate_auth_roundtrip_signup", false, Some(skip_without_latency())),
      ("build_signup_user", false, None),
      ("commit_session_signup", false, None),
    ],
  );

  p.on_root("validate_signup_input", validate_credentials);
  p.on_root("simulate_auth_roundtrip_signup", simulate_auth_roundtrip);
  p.on_root("build_signup_user", |ctx_data: ContextData<AuthCtxData>| async move {
    let mut guard = ctx_data.write();
    let user = User::registered(&guard.email);
    guard.user = Some(user);
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on_root("commit_session_signup", commit_session);

  p
}

fn skip_without_latency() -> SkipCondition<AuthCtxData> {
  Arc::new(|ctx_data: &ContextData<AuthCtxData>| ctx_data.read().session.latency().auth.is_zero())
}

/// Rejects non-institutional emails before anything is delayed or persisted.
async fn validate_credentials(ctx_data: ContextData<AuthCtxData>) -> Result<PipelineControl> {
  let (email, mode, policy) = {
    let guard = ctx_data.read();
    (guard.email.clone(), guard.mode, guard.session.email_policy().clone())
  };

  event!(Level::DEBUG, email = %email, ?mode, "Validating credentials.");
  if email.is_empty() {
    warn!("Empty email provided.");
    return Err(AppError::Validation("Email is required".to_string()));
  }
  if !policy.accepts(&email) {
    warn!(email = %email, "Non-institutional email rejected.");
    return Err(AppError::Validation(policy.rejection_message()));
  }
  Ok(PipelineControl::Continue)
}

async fn simulate_auth_roundtrip(ctx_data: ContextData<AuthCtxData>) -> Result<PipelineControl> {
  let delay = ctx_data.read().session.latency().auth;
  simulate_latency(delay).await;
  Ok(PipelineControl::Continue)
}

async fn commit_session(ctx_data: ContextData<AuthCtxData>) -> Result<PipelineControl> {
  let (session, user) = {
    let guard = ctx_data.read();
    (guard.session.clone(), guard.user.clone())
  };
  let Some(user) = user else {
    event!(Level::ERROR, "No user built before commit. Pipeline logic error.");
    return Err(AppError::Internal("User unexpectedly missing at session commit".to_string()));
  };

  session.establish(user.clone()).await;
  event!(Level::INFO, user_id = %user.id, verified = user.is_email_verified, "Session established.");
  Ok(PipelineControl::Continue)
}
