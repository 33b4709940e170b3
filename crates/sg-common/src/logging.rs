//! Structured logging setup.
//!
//! Output format is selected at startup:
//! - `LOG_FORMAT=json` -> JSON lines with flattened event fields, for log
//!   aggregation in production
//! - anything else -> human-readable text for development
//!
//! Log levels come from `RUST_LOG` (default: info), e.g.
//! `RUST_LOG=sg_auth=debug,tower_http=info`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sg_common::logging::init_logging;
//!
//! fn main() {
//!     init_logging("sg-auth-server");
//!
//!     tracing::info!(email = %email, "account created");
//! }
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for the named service.
///
/// The service name is reserved for future static fields; the format comes
/// from `LOG_FORMAT` and the filter from `RUST_LOG`.
pub fn init_logging(_service_name: &str) {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if log_format.eq_ignore_ascii_case("json") {
        init_json_logging(env_filter);
    } else {
        init_text_logging(env_filter);
    }
}

fn init_json_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .init();
}

fn init_text_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .init();
}
