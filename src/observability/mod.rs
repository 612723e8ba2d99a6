//! Tracing setup.
//!
//! The crate only emits `tracing` events; hosts usually install their own
//! subscriber. Enable the `tracing-init` feature for a ready-made one:
//!
//! ```toml
//! lsp-attach = { version = "0.1", features = ["tracing-init"] }
//! ```
//!
//! ```rust,ignore
//! lsp_attach::observability::init_tracing("lsp_attach=debug")?;
//! ```

/// Log target used by every event this crate emits.
pub const TARGET: &str = "lsp_attach";

/// Directive used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "lsp_attach=info";

#[cfg(feature = "tracing-init")]
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    #[error("Invalid filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to init subscriber: {0}")]
    Init(String),
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `filter`; an empty `filter` falls back to
/// [`DEFAULT_FILTER`].
#[cfg(feature = "tracing-init")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing-init")))]
pub fn init_tracing(filter: &str) -> Result<(), TracingInitError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(resolve_filter(filter))?,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TracingInitError::Init(e.to_string()))
}

/// The filter directive to use for `filter`.
pub fn resolve_filter(filter: &str) -> &str {
    match filter.trim() {
        "" => DEFAULT_FILTER,
        f => f,
    }
}
