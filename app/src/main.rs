// campus-eats-app/src/main.rs

mod walkthrough;

use anyhow::Context;
use campus_eats::{AppConfig, AppStores};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let json_logs = std::env::var("CAMPUS_EATS_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  if json_logs {
    subscriber.json().init();
  } else {
    subscriber.init();
  }

  tracing::info!("Starting campus-eats...");

  let config = AppConfig::from_env().context("Failed to load application configuration")?;
  let (stores, report) = AppStores::initialize(config)
    .await
    .context("Failed to open local storage")?;

  match stores.session.current_user() {
    Some(user) => tracing::info!(email = %user.email, "Welcome back."),
    None => tracing::info!("No saved session; sign-in required."),
  }
  tracing::info!(
    landing = ?stores.session.landing(),
    cart_lines = report.cart_lines,
    cart_total = %stores.cart.total(),
    orders = report.orders,
    active_orders = stores.orders.active_orders().len(),
    "Ready."
  );

  let command = std::env::args().nth(1);
  match command.as_deref() {
    None | Some("status") => Ok(()),
    Some("walkthrough") => walkthrough::run(&stores).await,
    Some("history") => {
      let orders = stores.orders.orders();
      println!("{}", serde_json::to_string_pretty(&orders)?);
      Ok(())
    }
    Some("sign-out") => {
      stores.session.sign_out().await;
      Ok(())
    }
    Some(other) => anyhow::bail!("Unknown command '{}'. Expected status, walkthrough, history or sign-out.", other),
  }
}
