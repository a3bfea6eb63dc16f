// campus-eats/src/models/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in student. Persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub email: String,
  pub display_name: Option<String>,
  pub is_email_verified: bool,
}

impl User {
  /// A verified user whose display name is the email's local part.
  pub fn signed_in(email: &str) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      email: email.to_string(),
      display_name: Some(local_part(email).to_string()),
      is_email_verified: true,
    }
  }

  /// A freshly registered user: unverified, no display name yet.
  pub fn registered(email: &str) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      email: email.to_string(),
      display_name: None,
      is_email_verified: false,
    }
  }

  pub fn apply(&mut self, patch: ProfilePatch) {
    if let Some(display_name) = patch.display_name {
      self.display_name = Some(display_name);
    }
  }
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  pub display_name: Option<String>,
}

fn local_part(email: &str) -> &str {
  email.split('@').next().unwrap_or(email)
}
