use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::LogFormat;

const DEFAULT_FILTER: &str = "info";

/// Process wide tracing subscriber.
pub struct TracingSetup;

impl TracingSetup {
    /// `RUST_LOG` wins over the default `info` filter.
    pub fn filter() -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }

    pub fn init(format: LogFormat) -> anyhow::Result<()> {
        let registry = tracing_subscriber::registry().with(Self::filter());

        match format {
            LogFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .compact(),
                )
                .try_init()?,
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(false)
                        .with_span_list(true),
                )
                .try_init()?,
        }

        info!("Logging initialised ({:?})", format);
        Ok(())
    }
}
