// [libs/shared/telemetry/src/lib.rs]
//! Structured tracing bootstrap for every coordinator binary.
//!
//! Mirrors the teacher's shared observability crate: an env-filter driven
//! subscriber (compact in development, flattened JSON in release) plus a
//! panic hook that routes abrupt thread termination through `tracing`
//! instead of letting it vanish into stderr unobserved.

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global `tracing` subscriber for `service_name`.
///
/// Safe to call once per process; a second call panics because
/// `tracing` forbids re-installing the global subscriber, same as the
/// teacher's `init_tracing`.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},tower_http=warn,hyper=warn",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        error!(target: "panic_monitor", service = %service, location = %location, "thread panicked: {payload}");
    }));

    info!("telemetry online for {service_name}");
}
