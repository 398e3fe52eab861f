//! Equipment transmog for Escape from Duckov. Any helmet, armour, face mask, headset or backpack
//! can be given the look of another item of the same kind without changing its stats.
//!
//! The game side calls [`init`] once when the mod is loaded, creates a [`Transmog`] with its
//! [`host::Host`] implementation, and then forwards scene loads, frame updates and trigger
//! presses to it.

use std::path::Path;

pub mod host;
pub mod logging;
pub mod meta;
pub mod transmog;

pub use meta::settings::Options;
pub use transmog::{Transmog, TransmogError};

/// Name of the log file written to the mod's data directory.
pub const LOG_FILE: &str = "copyskin.log";

/// Starts logging and loads the settings from `data_dir`. The returned options are what
/// [`Transmog::new`] should be given.
pub fn init(data_dir: &Path) -> eyre::Result<Options> {
    // Log everything until the settings say otherwise, so loading them can be logged too.
    logging::init(&data_dir.join(LOG_FILE), log::LevelFilter::Trace)?;

    log::info!("copyskin {} loading", env!("CARGO_PKG_VERSION"));

    let options = meta::init(data_dir);
    log::set_max_level(options.log_level.filter());

    Ok(options)
}
