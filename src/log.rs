//! Log verbosity control.
//!
//! The launcher surface exposes a numeric verbosity level (0 = off up to
//! 5 = trace). The first call installs a reloadable filter in front of a
//! fmt subscriber; later calls just swap the filter, so the last call
//! wins with no cumulative state.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

/// Highest accepted verbosity level (trace).
pub const MAX_LOG_LEVEL: u32 = 5;

type ReloadHandle = reload::Handle<LevelFilter, Registry>;

/// Map a 0–5 verbosity level onto a tracing level filter.
///
/// 0 = off, 1 = error, 2 = warn, 3 = info, 4 = debug, 5 = trace.
pub fn level_filter(level: u32) -> Result<LevelFilter> {
    Ok(match level {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        4 => LevelFilter::DEBUG,
        5 => LevelFilter::TRACE,
        _ => {
            return Err(Error::invalid_argument(format!(
                "log level must be 0..={}, got {}",
                MAX_LOG_LEVEL, level
            )))
        }
    })
}

/// Reloadable verbosity state for one [`Vmm`](crate::Vmm).
pub(crate) struct LogControl {
    handle: Mutex<Option<ReloadHandle>>,
}

impl LogControl {
    pub(crate) fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Validate and apply a verbosity level.
    ///
    /// Level validation is the contract here; applying the filter is best
    /// effort when the embedding process already owns the global
    /// subscriber.
    pub(crate) fn set_level(&self, level: u32) -> Result<()> {
        let filter = level_filter(level)?;
        let mut handle = self.handle.lock();

        if let Some(h) = handle.as_ref() {
            if let Err(e) = h.modify(|f| *f = filter) {
                tracing::warn!(error = %e, level, "log level not applied");
            }
            return Ok(());
        }

        let (layer, reload_handle) = reload::Layer::new(filter);
        let init = tracing_subscriber::registry()
            .with(layer)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init();
        if init.is_err() {
            tracing::debug!("global subscriber already installed; keeping it");
        }
        *handle = Some(reload_handle);
        Ok(())
    }
}
