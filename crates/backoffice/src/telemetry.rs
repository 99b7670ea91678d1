//! Sentry and tracing subscriber setup.
//!
//! The UI shell calls [`init`] once at startup, before building the table
//! client, and keeps the returned [`TelemetryGuard`] alive until exit.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{BackofficeConfig, LogFormat};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "sneakershop_backoffice=info";

/// Keeps Sentry flushing until dropped.
#[must_use = "dropping the guard stops error reporting"]
pub struct TelemetryGuard {
    sentry: Option<sentry::ClientInitGuard>,
}

impl TelemetryGuard {
    /// Whether Sentry reporting is active.
    #[must_use]
    pub const fn sentry_enabled(&self) -> bool {
        self.sentry.is_some()
    }
}

/// Initialize Sentry error tracking. Returns `None` when no DSN is configured.
fn init_sentry(config: &BackofficeConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize Sentry (when configured) and the global tracing subscriber.
///
/// # Errors
///
/// Returns `TryInitError` if a global subscriber is already installed.
pub fn init(config: &BackofficeConfig) -> Result<TelemetryGuard, TryInitError> {
    // Sentry must be up before the subscriber so the layer has a hub
    let sentry = init_sentry(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_json = config.log_format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()?;

    let guard = TelemetryGuard { sentry };
    tracing::info!(
        sentry = guard.sentry_enabled(),
        format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(guard)
}
