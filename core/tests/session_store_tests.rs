// tests/session_store_tests.rs

mod common;

use campus_eats::persistence::USER_KEY;
use campus_eats::{
  AppError, EmailPolicy, KeyValueStore, Landing, MemoryStore, ProfilePatch, SessionStore, SimulatedLatency, User,
};
use common::{setup_tracing, student, CountingStore, FailingStore};
use std::sync::Arc;
use std::time::Duration;

fn session_over(storage: Arc<dyn KeyValueStore>) -> SessionStore {
  SessionStore::new(storage, EmailPolicy::default(), SimulatedLatency::none())
}

fn persisted_user(storage: &MemoryStore) -> Option<User> {
  storage
    .raw(USER_KEY)
    .map(|raw| serde_json::from_str(&raw).expect("persisted user should be valid JSON"))
}

#[tokio::test]
async fn test_session_is_loading_until_restored() {
  setup_tracing();
  let session = session_over(Arc::new(MemoryStore::new()));

  assert!(session.is_loading());
  assert_eq!(session.landing(), None);

  assert_eq!(session.restore().await, None);
  assert!(!session.is_loading());
  assert_eq!(session.landing(), Some(Landing::Auth));
}

#[tokio::test]
async fn test_sign_in_builds_and_persists_a_verified_user() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let session = session_over(storage.clone());
  session.restore().await;

  let user = session.sign_in(&student("thandi"), "hunter2").await.unwrap();

  assert_eq!(user.email, "thandi@students.wits.ac.za");
  assert_eq!(user.display_name.as_deref(), Some("thandi"));
  assert!(user.is_email_verified);
  assert!(!user.id.is_empty());
  assert_eq!(session.current_user(), Some(user.clone()));
  assert_eq!(session.landing(), Some(Landing::App));
  assert_eq!(persisted_user(&storage), Some(user));
}

#[tokio::test]
async fn test_email_is_matched_exactly_as_typed() {
  setup_tracing();
  let storage = Arc::new(CountingStore::default());
  let session = session_over(storage.clone());

  for padded in [format!("{} ", student("sipho")), format!(" {}", student("sipho"))] {
    let err = session.sign_in(&padded, "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Validation Error: Only Wits University student emails are allowed");
  }
  assert_eq!(storage.writes(), 0);
  assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_sign_up_creates_an_unverified_user_without_name() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let session = session_over(storage.clone());

  let user = session.sign_up(&student("lerato"), "s3cret").await.unwrap();

  assert!(!user.is_email_verified);
  assert_eq!(user.display_name, None);
  assert_eq!(persisted_user(&storage), Some(user));
}

#[tokio::test]
async fn test_each_sign_in_issues_a_fresh_id() {
  setup_tracing();
  let session = session_over(Arc::new(MemoryStore::new()));
  let first = session.sign_in(&student("ana"), "pw").await.unwrap();
  let second = session.sign_in(&student("ana"), "pw").await.unwrap();
  assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_rejected_emails_never_touch_storage() {
  setup_tracing();
  let storage = Arc::new(CountingStore::default());
  let session = session_over(storage.clone());
  session.restore().await;

  for (email, password) in [
    ("someone@gmail.com", "pw"),
    ("thandi@wits.ac.za", "pw"),
    ("", "pw"),
    ("   ", "pw"),
  ] {
    let err = session.sign_in(email, password).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{} should fail validation", email);

    let err = session.sign_up(email, password).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{} should fail validation", email);
  }

  assert_eq!(storage.writes(), 0);
  assert_eq!(session.current_user(), None);
  assert!(!session.is_loading());
}

#[tokio::test]
async fn test_validation_messages() {
  setup_tracing();
  let session = session_over(Arc::new(MemoryStore::new()));

  let err = session.sign_in("visitor@uct.ac.za", "pw").await.unwrap_err();
  assert_eq!(err.to_string(), "Validation Error: Only Wits University student emails are allowed");

  let err = session.sign_in("", "pw").await.unwrap_err();
  assert_eq!(err.to_string(), "Validation Error: Email is required");
}

#[tokio::test]
async fn test_any_password_is_accepted() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let session = session_over(storage.clone());

  let user = session.sign_in(&student("thandi"), "").await.unwrap();
  assert!(user.is_email_verified);
  assert_eq!(persisted_user(&storage), Some(user));

  let registered = session.sign_up(&student("lerato"), "").await.unwrap();
  assert!(!registered.is_email_verified);
  assert_eq!(session.current_user(), Some(registered));
}

#[tokio::test]
async fn test_custom_institution_policy() {
  setup_tracing();
  let policy = EmailPolicy {
    domain_suffix: "@myuct.ac.za".to_string(),
    institution: "UCT".to_string(),
  };
  let session = SessionStore::new(Arc::new(MemoryStore::new()), policy, SimulatedLatency::none());

  assert!(session.sign_in("naledi@myuct.ac.za", "pw").await.is_ok());
  let err = session.sign_in(&student("thandi"), "pw").await.unwrap_err();
  assert_eq!(err.to_string(), "Validation Error: Only UCT student emails are allowed");
}

#[tokio::test]
async fn test_sign_out_clears_user_and_storage() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let session = session_over(storage.clone());
  session.restore().await;
  session.sign_in(&student("thandi"), "pw").await.unwrap();

  session.sign_out().await;

  assert_eq!(session.current_user(), None);
  assert!(storage.raw(USER_KEY).is_none());
  assert_eq!(session.landing(), Some(Landing::Auth));

  // Signing out twice is harmless.
  session.sign_out().await;
  assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_sign_out_survives_storage_failure() {
  setup_tracing();
  let session = session_over(Arc::new(FailingStore::default()));
  session.restore().await;
  // The write fails, but the in-memory session still changes.
  session.sign_in(&student("thandi"), "pw").await.unwrap();
  assert!(session.is_signed_in());

  session.sign_out().await;
  assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_restore_round_trips_a_persisted_session() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let signed_in = {
    let first = session_over(storage.clone());
    first.sign_in(&student("thandi"), "pw").await.unwrap()
  };

  let second = session_over(storage.clone());
  assert_eq!(second.restore().await, Some(signed_in.clone()));
  assert_eq!(second.current_user(), Some(signed_in));
  assert_eq!(second.landing(), Some(Landing::App));
}

#[tokio::test]
async fn test_restore_treats_corrupt_record_as_signed_out() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  storage.set(USER_KEY, "{\"id\":".to_string()).await.unwrap();

  let session = session_over(storage.clone());
  assert_eq!(session.restore().await, None);
  assert!(!session.is_loading());
  assert_eq!(session.landing(), Some(Landing::Auth));
}

#[tokio::test]
async fn test_update_profile_merges_and_persists() {
  setup_tracing();
  let storage = Arc::new(MemoryStore::new());
  let session = session_over(storage.clone());
  let user = session.sign_up(&student("lerato"), "pw").await.unwrap();

  let updated = session
    .update_profile(ProfilePatch {
      display_name: Some("Lerato M".to_string()),
    })
    .await
    .expect("a signed-in user can update their profile");

  assert_eq!(updated.id, user.id);
  assert_eq!(updated.email, user.email);
  assert_eq!(updated.display_name.as_deref(), Some("Lerato M"));
  assert_eq!(persisted_user(&storage), Some(updated.clone()));

  // An empty patch changes nothing.
  let unchanged = session.update_profile(ProfilePatch::default()).await;
  assert_eq!(unchanged, Some(updated));
}

#[tokio::test]
async fn test_update_profile_without_user_is_a_no_op() {
  setup_tracing();
  let storage = Arc::new(CountingStore::default());
  let session = session_over(storage.clone());
  session.restore().await;

  let result = session
    .update_profile(ProfilePatch {
      display_name: Some("Ghost".to_string()),
    })
    .await;

  assert_eq!(result, None);
  assert_eq!(storage.writes(), 0);
}

#[tokio::test]
async fn test_subscribers_follow_the_signed_in_user() {
  setup_tracing();
  let session = session_over(Arc::new(MemoryStore::new()));
  let mut rx = session.subscribe();

  let user = session.sign_in(&student("thandi"), "pw").await.unwrap();
  rx.changed().await.unwrap();
  assert_eq!(rx.borrow_and_update().as_ref(), Some(&user));

  session.sign_out().await;
  rx.changed().await.unwrap();
  assert_eq!(*rx.borrow(), None);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_latency_keeps_session_loading() {
  setup_tracing();
  let session = SessionStore::new(
    Arc::new(MemoryStore::new()),
    EmailPolicy::default(),
    SimulatedLatency::realistic(),
  );
  session.restore().await;

  let started = tokio::time::Instant::now();
  let task = {
    let session = session.clone();
    tokio::spawn(async move { session.sign_in(&student("thandi"), "pw").await })
  };

  tokio::time::sleep(Duration::from_millis(100)).await;
  assert!(session.is_loading());
  assert_eq!(session.landing(), None);
  assert!(!session.is_signed_in());

  task.await.unwrap().unwrap();
  assert!(started.elapsed() >= Duration::from_millis(1000));
  assert!(!session.is_loading());
  assert!(session.is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_email_fails_without_waiting() {
  setup_tracing();
  let session = SessionStore::new(
    Arc::new(MemoryStore::new()),
    EmailPolicy::default(),
    SimulatedLatency::realistic(),
  );

  let started = tokio::time::Instant::now();
  assert!(session.sign_in("someone@gmail.com", "pw").await.is_err());
  assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_forgot_password_only_waits() {
  setup_tracing();
  let storage = Arc::new(CountingStore::default());
  let session = SessionStore::new(storage.clone(), EmailPolicy::default(), SimulatedLatency::realistic());

  let started = tokio::time::Instant::now();
  session.forgot_password(&student("thandi")).await;

  assert!(started.elapsed() >= Duration::from_millis(1000));
  assert_eq!(storage.writes(), 0);
  assert!(!session.is_signed_in());
}
