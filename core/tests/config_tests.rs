// tests/config_tests.rs

mod common;

use campus_eats::{AppConfig, AppError, SimulatedLatency, StorageBackend, TransitionPolicy};
use common::setup_tracing;
use rust_decimal::Decimal;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const VARS: &[&str] = &[
  "CAMPUS_EATS_STORAGE",
  "CAMPUS_EATS_DATA_DIR",
  "CAMPUS_EATS_EMAIL_DOMAIN",
  "CAMPUS_EATS_INSTITUTION",
  "CAMPUS_EATS_SERVICE_FEE",
  "CAMPUS_EATS_PICKUP_LOCATION",
  "CAMPUS_EATS_ESTIMATED_PICKUP",
  "CAMPUS_EATS_SIMULATE_LATENCY",
  "CAMPUS_EATS_ORDER_TRANSITIONS",
];

fn clear_env() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
  setup_tracing();
  clear_env();

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.storage_backend, StorageBackend::File);
  assert_eq!(config.data_dir, PathBuf::from(".campus-eats"));
  assert_eq!(config.email_policy.domain_suffix, "@students.wits.ac.za");
  assert_eq!(config.email_policy.institution, "Wits University");
  assert_eq!(config.checkout.service_fee, Decimal::from(10));
  assert_eq!(config.checkout.pickup_location, "East Campus");
  assert_eq!(config.checkout.estimated_pickup.as_deref(), Some("15-20 min"));
  assert_eq!(config.latency, SimulatedLatency::realistic());
  assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
}

#[test]
#[serial]
fn test_overrides_from_environment() {
  setup_tracing();
  clear_env();
  env::set_var("CAMPUS_EATS_STORAGE", "Memory");
  env::set_var("CAMPUS_EATS_DATA_DIR", "/tmp/eats");
  env::set_var("CAMPUS_EATS_EMAIL_DOMAIN", "@myuct.ac.za");
  env::set_var("CAMPUS_EATS_INSTITUTION", "UCT");
  env::set_var("CAMPUS_EATS_SERVICE_FEE", "7.50");
  env::set_var("CAMPUS_EATS_PICKUP_LOCATION", "Upper Campus");
  env::set_var("CAMPUS_EATS_SIMULATE_LATENCY", "false");
  env::set_var("CAMPUS_EATS_ORDER_TRANSITIONS", "enforced");

  let config = AppConfig::from_env().unwrap();
  clear_env();

  assert_eq!(config.storage_backend, StorageBackend::Memory);
  assert_eq!(config.data_dir, PathBuf::from("/tmp/eats"));
  assert_eq!(config.email_policy.domain_suffix, "@myuct.ac.za");
  assert_eq!(config.email_policy.rejection_message(), "Only UCT student emails are allowed");
  assert_eq!(config.checkout.service_fee, Decimal::new(750, 2));
  assert_eq!(config.checkout.pickup_location, "Upper Campus");
  assert_eq!(config.latency, SimulatedLatency::none());
  assert_eq!(config.transition_policy, TransitionPolicy::Enforced);
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
  setup_tracing();
  clear_env();
  env::set_var("CAMPUS_EATS_STORAGE", "  ");
  env::set_var("CAMPUS_EATS_SERVICE_FEE", "");

  let config = AppConfig::from_env().unwrap();
  clear_env();

  assert_eq!(config.storage_backend, StorageBackend::File);
  assert_eq!(config.checkout.service_fee, Decimal::from(10));
}

#[test]
#[serial]
fn test_invalid_values_are_config_errors() {
  setup_tracing();
  let cases = [
    ("CAMPUS_EATS_STORAGE", "sqlite"),
    ("CAMPUS_EATS_EMAIL_DOMAIN", "students.wits.ac.za"),
    ("CAMPUS_EATS_SERVICE_FEE", "ten"),
    ("CAMPUS_EATS_SERVICE_FEE", "-1"),
    ("CAMPUS_EATS_SIMULATE_LATENCY", "sometimes"),
    ("CAMPUS_EATS_ORDER_TRANSITIONS", "strict"),
  ];

  for (var, value) in cases {
    clear_env();
    env::set_var(var, value);
    let result = AppConfig::from_env();
    clear_env();

    match result {
      Err(AppError::Config(msg)) => assert!(msg.contains(var), "{}={} gave unrelated message: {}", var, value, msg),
      other => panic!("{}={} should be a config error, got {:?}", var, value, other),
    }
  }
}

#[test]
fn test_in_memory_config_disables_latency() {
  let config = AppConfig::in_memory();
  assert_eq!(config.storage_backend, StorageBackend::Memory);
  assert_eq!(config.latency, SimulatedLatency::none());
  assert_eq!(config.checkout, Default::default());
}
