//! `collab-cli` -- loads every dashboard container once and prints the
//! summary as JSON.
//!
//! # Environment variables
//!
//! | Variable                      | Default | Description                              |
//! |-------------------------------|---------|------------------------------------------|
//! | `COLLAB_API_URL`              | --      | REST base URL; unset selects the mock    |
//! | `COLLAB_USE_MOCK`             | `false` | Force the in-memory dataset              |
//! | `COLLAB_API_TOKEN`            | --      | Bearer token                             |
//! | `COLLAB_REQUEST_TIMEOUT_SECS` | `30`    | HTTP timeout                             |
//! | `COLLAB_MOCK_LATENCY_MS`      | `300`   | Artificial mock latency                  |
//! | `COLLAB_USER_ID`              | `1`     | Voter identity                           |
//! | `COLLAB_USER_NAME`            | --      | Voter display name                       |
//! | `COLLAB_LOG_FORMAT`           | `text`  | `json` switches to structured log lines  |

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collab_client::{build_backend, ClientConfig};
use collab_store::Store;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "collab_cli=info,collab_store=info,collab_client=info".into());
    let json = std::env::var("COLLAB_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Logs go to stderr so stdout carries only the summary.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ClientConfig::from_env();
    tracing::info!(
        mock = config.uses_mock(),
        api_url = config.api_url.as_deref().unwrap_or("-"),
        user_id = config.user_id,
        "Loaded client configuration",
    );

    let backend = build_backend(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build backend");
        std::process::exit(1);
    });

    let store = Store::new(backend, config.voter());
    let report = store.load_dashboard().await;
    if let Some(banner) = report.banner() {
        tracing::warn!(banner = %banner, "Some data could not be loaded");
    }

    let summary = store.summary(Utc::now()).await;
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize dashboard summary");
            std::process::exit(1);
        }
    }

    if !report.is_ok() {
        std::process::exit(2);
    }
}
