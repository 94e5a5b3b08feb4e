//! Engine configuration.
//!
//! Settings come from a preference file (`KEY:TYPE=VALUE` lines) or from a
//! TOML document whose keys are the lower-case field names. Missing keys keep
//! their defaults; unknown keys are logged and ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::{Error, PrefContainer, Result};
use tessera_rendering::WindowConfig;

const WINDOW_TITLE: &str = "WINDOW_TITLE";
const WINDOW_ICON: &str = "WINDOW_ICON";
const WINDOW_WIDTH: &str = "WINDOW_WIDTH";
const WINDOW_HEIGHT: &str = "WINDOW_HEIGHT";
const WINDOW_FPS_LIMIT: &str = "WINDOW_FPS_LIMIT";
const WINDOW_FULLSCREEN: &str = "WINDOW_FULLSCREEN";
const WINDOW_V_SYNC: &str = "WINDOW_V_SYNC";
const FONTS_DIR: &str = "FONTS_DIR";
const TEXTURES_DIR: &str = "TEXTURES_DIR";
const SOUND_EFFECTS_DIR: &str = "SOUND_EFFECTS_DIR";
const MUSIC_DIR: &str = "MUSIC_DIR";

/// Window and resource settings applied by [`crate::Engine::initialize`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Title of the window.
    pub window_title: String,
    /// Window icon file, or `"OS"` for the platform default.
    pub window_icon: String,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Frame rate cap; zero disables it.
    pub window_fps_limit: u32,
    /// Whether the window covers the screen.
    pub window_fullscreen: bool,
    /// Whether presentation waits for the display refresh.
    pub window_v_sync: bool,
    /// Directory fonts are loaded from.
    pub fonts_dir: String,
    /// Directory textures are loaded from.
    pub textures_dir: String,
    /// Directory sound effects are loaded from.
    pub sound_effects_dir: String,
    /// Directory music tracks are streamed from.
    pub music_dir: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_title: "Untitled".to_owned(),
            window_icon: "OS".to_owned(),
            window_width: 600,
            window_height: 600,
            window_fps_limit: 60,
            window_fullscreen: false,
            window_v_sync: false,
            fonts_dir: String::new(),
            textures_dir: String::new(),
            sound_effects_dir: String::new(),
            music_dir: String::new(),
        }
    }
}

impl EngineSettings {
    /// Reads settings from a preference file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] or [`Error::InvalidParse`] when the
    /// file cannot be read, and [`Error::InvalidArgument`] when a known key
    /// holds a value of the wrong type or range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut prefs = PrefContainer::new();
        prefs.load(path.as_ref())?;
        log::info!("loaded engine settings from {}", path.as_ref().display());
        Self::from_prefs(&prefs)
    }

    /// Builds settings from preference entries.
    pub fn from_prefs(prefs: &PrefContainer) -> Result<Self> {
        let mut settings = Self::default();
        for pref in prefs.iter() {
            let key = pref.key();
            match key {
                WINDOW_TITLE => settings.window_title = prefs.value(key)?,
                WINDOW_ICON => settings.window_icon = prefs.value(key)?,
                WINDOW_WIDTH => settings.window_width = dimension(prefs, key)?,
                WINDOW_HEIGHT => settings.window_height = dimension(prefs, key)?,
                WINDOW_FPS_LIMIT => settings.window_fps_limit = dimension(prefs, key)?,
                WINDOW_FULLSCREEN => settings.window_fullscreen = prefs.value(key)?,
                WINDOW_V_SYNC => settings.window_v_sync = prefs.value(key)?,
                FONTS_DIR => settings.fonts_dir = prefs.value(key)?,
                TEXTURES_DIR => settings.textures_dir = prefs.value(key)?,
                SOUND_EFFECTS_DIR => settings.sound_effects_dir = prefs.value(key)?,
                MUSIC_DIR => settings.music_dir = prefs.value(key)?,
                unknown => log::warn!("ignoring unknown engine setting '{unknown}'"),
            }
        }
        Ok(settings)
    }

    /// Preference entries describing these settings.
    pub fn to_prefs(&self) -> Result<PrefContainer> {
        let mut prefs = PrefContainer::new();
        prefs.set_value(WINDOW_TITLE, self.window_title.as_str())?;
        prefs.set_value(WINDOW_ICON, self.window_icon.as_str())?;
        prefs.set_value(WINDOW_WIDTH, i64::from(self.window_width))?;
        prefs.set_value(WINDOW_HEIGHT, i64::from(self.window_height))?;
        prefs.set_value(WINDOW_FPS_LIMIT, i64::from(self.window_fps_limit))?;
        prefs.set_value(WINDOW_FULLSCREEN, self.window_fullscreen)?;
        prefs.set_value(WINDOW_V_SYNC, self.window_v_sync)?;
        prefs.set_value(FONTS_DIR, self.fonts_dir.as_str())?;
        prefs.set_value(TEXTURES_DIR, self.textures_dir.as_str())?;
        prefs.set_value(SOUND_EFFECTS_DIR, self.sound_effects_dir.as_str())?;
        prefs.set_value(MUSIC_DIR, self.music_dir.as_str())?;
        Ok(prefs)
    }

    /// Writes these settings as a preference file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_prefs()?.save(path)
    }

    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParse`] for malformed TOML or values of the
    /// wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut table: toml::Table =
            toml::from_str(text).map_err(|error| parse_error(text, &error))?;
        let known = [
            "window_title",
            "window_icon",
            "window_width",
            "window_height",
            "window_fps_limit",
            "window_fullscreen",
            "window_v_sync",
            "fonts_dir",
            "textures_dir",
            "sound_effects_dir",
            "music_dir",
        ];
        let unknown: Vec<String> = table
            .keys()
            .filter(|key| !known.contains(&key.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            log::warn!("ignoring unknown engine setting '{key}'");
            let _ = table.remove(&key);
        }
        toml::Value::Table(table)
            .try_into()
            .map_err(|error| parse_error(text, &error))
    }

    /// Window parameters for a rendering backend.
    #[must_use]
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.window_title.clone(),
            width: self.window_width,
            height: self.window_height,
            fullscreen: self.window_fullscreen,
            vsync: self.window_v_sync,
            fps_limit: self.window_fps_limit,
        }
    }
}

fn dimension(prefs: &PrefContainer, key: &str) -> Result<u32> {
    let value: i64 = prefs.value(key)?;
    u32::try_from(value)
        .map_err(|_| Error::invalid_argument(format!("setting '{key}' out of range: {value}")))
}

fn parse_error(text: &str, error: &toml::de::Error) -> Error {
    let line = error
        .span()
        .and_then(|span| text.get(..span.start))
        .map_or(1, |before| before.matches('\n').count() + 1);
    Error::InvalidParse {
        line,
        reason: error.message().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefs_override_defaults_and_skip_unknown_keys() {
        let prefs = PrefContainer::parse(
            "WINDOW_TITLE:STRING=Maze\nWINDOW_WIDTH:INT=800\nWINDOW_V_SYNC:BOOL=1\nVOLUME:INT=3\n",
        )
        .expect("valid preferences");

        let settings = EngineSettings::from_prefs(&prefs).expect("valid settings");

        assert_eq!(settings.window_title, "Maze");
        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, 600);
        assert!(settings.window_v_sync);
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        let prefs = PrefContainer::parse("WINDOW_HEIGHT:INT=-1\n").expect("valid preferences");

        assert!(matches!(
            EngineSettings::from_prefs(&prefs),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn toml_documents_use_field_names() {
        let settings = EngineSettings::from_toml_str(
            "window_title = \"Demo\"\nwindow_fullscreen = true\nunknown = 1\n",
        )
        .expect("valid toml");

        assert_eq!(settings.window_title, "Demo");
        assert!(settings.window_fullscreen);
        assert_eq!(settings.window_fps_limit, 60);
    }

    #[test]
    fn toml_type_errors_report_a_line() {
        let error = EngineSettings::from_toml_str("window_title = \"ok\"\nwindow_width = \"wide\"\n")
            .expect_err("width must be an integer");

        assert!(matches!(error, Error::InvalidParse { .. }));
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("engine.txt");
        let settings = EngineSettings {
            window_title: "Round trip".to_owned(),
            window_fps_limit: 0,
            music_dir: "assets/music".to_owned(),
            ..EngineSettings::default()
        };

        settings.save(&path).expect("save");

        assert_eq!(EngineSettings::load(&path).expect("load"), settings);
    }
}
