use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use eyre::Result;
use serde::{Deserialize, Serialize};

/// Whether the player is told about transmog actions with a text bubble.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum PopupMode {
    /// Bubbles are shown. This is the default.
    Shown,

    /// Nothing is shown; results are only logged.
    Hidden,
}

impl Default for PopupMode {
    fn default() -> Self {
        PopupMode::Shown
    }
}

/// Whether the inspection menu's description gets a line naming the transmog appearance.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum DescriptionNote {
    Shown,
    Hidden,
}

impl Default for DescriptionNote {
    fn default() -> Self {
        DescriptionNote::Shown
    }
}

/// How much goes into the log file.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        if cfg!(feature = "debug") {
            LogLevel::Trace
        } else {
            LogLevel::Info
        }
    }
}

impl LogLevel {
    pub fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// The user's settings for the mod.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Options {
    /// Whether transmog results pop up above the character.
    pub popups: PopupMode,

    /// Whether the item description names the transmog appearance.
    pub description_note: DescriptionNote,

    /// Determines how verbose the log file is.
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Options {
    /// Attempts to parse the contents of `reader` to get an `Options` value.
    fn parse_json(reader: impl Read) -> Result<Options> {
        // Coerce with `?`.
        Ok(serde_json::from_reader(reader)?)
    }

    /// Returns the path of the file that options are saved to.
    pub fn path(dir: &Path) -> PathBuf {
        dir.join("settings.copyskin.json")
    }

    /// Looks for a settings file and loads it.
    fn load_from_file(dir: &Path) -> Result<Option<Options>> {
        let path = Options::path(dir);

        if !path.exists() {
            // This isn't an error, but we didn't find any settings.
            return Ok(None);
        }

        Ok(Some(Options::parse_json(File::open(path)?)?))
    }

    /// Either loads the settings from `dir` or generates default values for them.
    pub fn load(dir: &Path) -> Options {
        match Options::load_from_file(dir) {
            Ok(Some(options)) => return options,

            Ok(None) => log::info!("No settings file found. Defaults will be used."),

            Err(err) => {
                log::error!("Error loading settings file: {err:?}. Defaults will be used.")
            }
        };

        Options::default()
    }

    /// Saves the settings to a file in `dir`, returning any errors encountered.
    pub fn try_save(&self, dir: &Path) -> Result<()> {
        std::fs::write(Options::path(dir), serde_json::to_string_pretty(self)?)?;

        Ok(())
    }

    /// Saves the settings to a file in `dir`. Errors will be logged.
    pub fn save(&self, dir: &Path) {
        if let Err(err) = self.try_save(dir) {
            log::error!("Error saving options to file: {err:?}.");
        } else {
            log::info!("Settings saved.");
        }
    }
}

/// Loads the options from `dir`. A settings file is written if there wasn't one, so the player
/// has something to edit.
pub fn init(dir: &Path) -> Options {
    let options = Options::load(dir);

    if !Options::path(dir).exists() {
        options.save(dir);
    }

    log::info!("Options: {:#?}", options);
    options
}
