// campus-eats/src/config.rs

use crate::error::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which persistence backend the stores are built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Memory,
  File,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" => Ok(StorageBackend::Memory),
      "file" => Ok(StorageBackend::File),
      other => Err(AppError::Config(format!(
        "Invalid CAMPUS_EATS_STORAGE '{}': expected 'memory' or 'file'",
        other
      ))),
    }
  }
}

/// Whether order status writes must follow the pickup lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
  /// preparing → ready → completed, cancellable while not terminal.
  Enforced,
  /// Any status may be written over any other.
  #[default]
  Permissive,
}

impl FromStr for TransitionPolicy {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "enforced" => Ok(TransitionPolicy::Enforced),
      "permissive" => Ok(TransitionPolicy::Permissive),
      other => Err(AppError::Config(format!(
        "Invalid CAMPUS_EATS_ORDER_TRANSITIONS '{}': expected 'enforced' or 'permissive'",
        other
      ))),
    }
  }
}

/// Stand-ins for network round trips. All zero when latency is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
  pub auth: Duration,
  pub sign_out: Duration,
  pub profile_update: Duration,
  pub checkout: Duration,
}

impl SimulatedLatency {
  pub fn realistic() -> Self {
    Self {
      auth: Duration::from_millis(1000),
      sign_out: Duration::from_millis(500),
      profile_update: Duration::from_millis(1000),
      checkout: Duration::from_millis(1500),
    }
  }

  pub fn none() -> Self {
    Self {
      auth: Duration::ZERO,
      sign_out: Duration::ZERO,
      profile_update: Duration::ZERO,
      checkout: Duration::ZERO,
    }
  }
}

impl Default for SimulatedLatency {
  fn default() -> Self {
    Self::realistic()
  }
}

/// Institutional sign-in rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
  pub domain_suffix: String,
  pub institution: String,
}

impl EmailPolicy {
  pub fn accepts(&self, email: &str) -> bool {
    email.ends_with(&self.domain_suffix)
  }

  pub fn rejection_message(&self) -> String {
    format!("Only {} student emails are allowed", self.institution)
  }
}

impl Default for EmailPolicy {
  fn default() -> Self {
    Self {
      domain_suffix: "@students.wits.ac.za".to_string(),
      institution: "Wits University".to_string(),
    }
  }
}

/// Checkout constants the original client hard-coded on its checkout screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
  pub service_fee: Decimal,
  pub pickup_location: String,
  pub estimated_pickup: Option<String>,
}

impl Default for CheckoutSettings {
  fn default() -> Self {
    Self {
      service_fee: Decimal::new(1000, 2),
      pickup_location: "East Campus".to_string(),
      estimated_pickup: Some("15-20 min".to_string()),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub storage_backend: StorageBackend,
  pub data_dir: PathBuf,
  pub email_policy: EmailPolicy,
  pub checkout: CheckoutSettings,
  pub latency: SimulatedLatency,
  pub transition_policy: TransitionPolicy,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      storage_backend: StorageBackend::File,
      data_dir: PathBuf::from(".campus-eats"),
      email_policy: EmailPolicy::default(),
      checkout: CheckoutSettings::default(),
      latency: SimulatedLatency::default(),
      transition_policy: TransitionPolicy::default(),
    }
  }
}

impl AppConfig {
  /// In-memory storage, no simulated latency. What tests and demos want.
  pub fn in_memory() -> Self {
    Self {
      storage_backend: StorageBackend::Memory,
      latency: SimulatedLatency::none(),
      ..Self::default()
    }
  }

  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let storage_backend = match get_env("CAMPUS_EATS_STORAGE") {
      Some(raw) => raw.parse::<StorageBackend>()?,
      None => defaults.storage_backend,
    };
    let data_dir = get_env("CAMPUS_EATS_DATA_DIR")
      .map(PathBuf::from)
      .unwrap_or(defaults.data_dir);

    let email_policy = EmailPolicy {
      domain_suffix: get_env("CAMPUS_EATS_EMAIL_DOMAIN").unwrap_or(defaults.email_policy.domain_suffix),
      institution: get_env("CAMPUS_EATS_INSTITUTION").unwrap_or(defaults.email_policy.institution),
    };
    if !email_policy.domain_suffix.starts_with('@') {
      return Err(AppError::Config(format!(
        "Invalid CAMPUS_EATS_EMAIL_DOMAIN '{}': must start with '@'",
        email_policy.domain_suffix
      )));
    }

    let service_fee = match get_env("CAMPUS_EATS_SERVICE_FEE") {
      Some(raw) => Decimal::from_str(raw.trim())
        .map_err(|e| AppError::Config(format!("Invalid CAMPUS_EATS_SERVICE_FEE: {}", e)))?,
      None => defaults.checkout.service_fee,
    };
    if service_fee.is_sign_negative() {
      return Err(AppError::Config("CAMPUS_EATS_SERVICE_FEE must not be negative".to_string()));
    }
    let checkout = CheckoutSettings {
      service_fee,
      pickup_location: get_env("CAMPUS_EATS_PICKUP_LOCATION").unwrap_or(defaults.checkout.pickup_location),
      estimated_pickup: get_env("CAMPUS_EATS_ESTIMATED_PICKUP").or(defaults.checkout.estimated_pickup),
    };

    let simulate_latency = get_env("CAMPUS_EATS_SIMULATE_LATENCY")
      .unwrap_or_else(|| "true".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid CAMPUS_EATS_SIMULATE_LATENCY value: {}", e)))?;
    let latency = if simulate_latency {
      SimulatedLatency::realistic()
    } else {
      SimulatedLatency::none()
    };

    let transition_policy = match get_env("CAMPUS_EATS_ORDER_TRANSITIONS") {
      Some(raw) => raw.parse::<TransitionPolicy>()?,
      None => defaults.transition_policy,
    };

    tracing::info!(
      storage = ?storage_backend,
      data_dir = %data_dir.display(),
      simulate_latency,
      transitions = ?transition_policy,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      storage_backend,
      data_dir,
      email_policy,
      checkout,
      latency,
      transition_policy,
    })
  }
}
