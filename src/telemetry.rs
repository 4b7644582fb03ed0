//! Tracing setup for the command-line tool and embedding applications.
//!
//! Library code only emits `tracing` events. Hosts either call
//! `init_default_tracing` or install their own subscriber.

/// Installs a compact fmt subscriber filtered by `RUST_LOG` (default
/// `warn`), writing to stderr so stdout stays free for chart output.
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact();

        builder.try_init().is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
