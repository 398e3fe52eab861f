//! The mod's own systems: user settings and player-facing text. These don't touch the game.

pub mod language;
pub mod settings;

use std::path::Path;

use settings::Options;

/// Loads the mod's settings from `dir`.
pub fn init(dir: &Path) -> Options {
    settings::init(dir)
}
