use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::conversion::{Backend, ConversionOptions, ConversionTarget};
use super::layout::{LayoutState, ViewMode};
use crate::app::infrastructure::error::AppError;

/// Overrides `server_url` when set, e.g. for a conversion service on another host.
pub const SERVER_URL_ENV: &str = "MARKPRESS_SERVER_URL";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
    SystemDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,

    #[serde(default)]
    pub view_mode: ViewMode,

    #[serde(default = "default_sidebar_visible")]
    pub sidebar_visible: bool,

    #[serde(default = "default_line_numbers")]
    pub line_numbers_enabled: bool,

    #[serde(default = "default_word_wrap")]
    pub word_wrap_enabled: bool,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Base URL of the conversion service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Quiet period before an edit is written to the draft slot
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// How long "Saved" / "Save failed" stays in the status line
    #[serde(default = "default_status_reset_ms")]
    pub status_reset_ms: u64,

    #[serde(default)]
    pub last_target: ConversionTarget,

    #[serde(default)]
    pub marp_theme: Option<String>,

    #[serde(default)]
    pub pandoc_toc: bool,

    #[serde(default)]
    pub pandoc_number_sections: bool,

    #[serde(default)]
    pub workspace_root: Option<String>,
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::SystemDefault
}

fn default_sidebar_visible() -> bool {
    true
}

fn default_line_numbers() -> bool {
    true
}

fn default_word_wrap() -> bool {
    true
}

fn default_font_size() -> u32 {
    16
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_autosave_delay_ms() -> u64 {
    750
}

fn default_status_reset_ms() -> u64 {
    2500
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: default_theme_mode(),
            view_mode: ViewMode::default(),
            sidebar_visible: default_sidebar_visible(),
            line_numbers_enabled: default_line_numbers(),
            word_wrap_enabled: default_word_wrap(),
            font_size: default_font_size(),
            server_url: default_server_url(),
            autosave_delay_ms: default_autosave_delay_ms(),
            status_reset_ms: default_status_reset_ms(),
            last_target: ConversionTarget::default(),
            marp_theme: None,
            pandoc_toc: false,
            pandoc_number_sections: false,
            workspace_root: None,
        }
    }
}

impl AppSettings {
    pub fn layout(&self) -> LayoutState {
        LayoutState {
            view_mode: self.view_mode,
            sidebar_visible: self.sidebar_visible,
        }
    }

    pub fn set_layout(&mut self, layout: LayoutState) {
        self.view_mode = layout.view_mode;
        self.sidebar_visible = layout.sidebar_visible;
    }

    /// Options to send for a target, taken from the remembered preferences.
    pub fn conversion_options(&self, target: ConversionTarget) -> ConversionOptions {
        match target.backend() {
            Backend::Marp => ConversionOptions {
                theme: self.marp_theme.clone().filter(|t| !t.trim().is_empty()),
                ..Default::default()
            },
            Backend::Pandoc => ConversionOptions {
                toc: self.pandoc_toc,
                number_sections: self.pandoc_number_sections,
                ..Default::default()
            },
        }
    }

    /// Remember the choices made in the convert dialog.
    pub fn remember_conversion(&mut self, target: ConversionTarget, options: &ConversionOptions) {
        self.last_target = target;
        match target.backend() {
            Backend::Marp => self.marp_theme = options.theme.clone(),
            Backend::Pandoc => {
                self.pandoc_toc = options.toc;
                self.pandoc_number_sections = options.number_sections;
            }
        }
    }

    /// Server URL after applying the environment override.
    pub fn effective_server_url(&self) -> String {
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.server_url.clone(),
        }
    }

    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                let default = Self::default();
                if let Err(e) = default.save_to(path) {
                    tracing::debug!("Could not write default settings: {}", e);
                }
                default
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "Settings saved");

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("markpress");
        path.push("settings.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme_mode, ThemeMode::SystemDefault);
        assert_eq!(settings.view_mode, ViewMode::Split);
        assert!(settings.sidebar_visible);
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.server_url, "http://localhost:3000");
        assert_eq!(settings.autosave_delay_ms, 750);
        assert_eq!(settings.status_reset_ms, 2500);
        assert_eq!(settings.last_target, ConversionTarget::MarpPptx);
        assert!(settings.workspace_root.is_none());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"theme_mode": "Dark", "view_mode": "EditorOnly"}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.view_mode, ViewMode::EditorOnly);
        assert_eq!(settings.autosave_delay_ms, 750);
        assert!(settings.line_numbers_enabled);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings {
            theme_mode: ThemeMode::Light,
            sidebar_visible: false,
            last_target: ConversionTarget::PandocPdf,
            workspace_root: Some("/home/me/notes".to_string()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings, AppSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn test_layout_accessors() {
        let mut settings = AppSettings::default();
        let mut layout = settings.layout();
        layout.toggle_preview();
        layout.toggle_sidebar();
        settings.set_layout(layout);

        assert_eq!(settings.view_mode, ViewMode::EditorOnly);
        assert!(!settings.sidebar_visible);
    }

    #[test]
    fn test_conversion_options_per_backend() {
        let mut settings = AppSettings::default();
        settings.remember_conversion(
            ConversionTarget::MarpHtml,
            &ConversionOptions {
                theme: Some("uncover".to_string()),
                ..Default::default()
            },
        );
        settings.remember_conversion(
            ConversionTarget::PandocDocx,
            &ConversionOptions {
                toc: true,
                ..Default::default()
            },
        );

        assert_eq!(settings.last_target, ConversionTarget::PandocDocx);

        let marp = settings.conversion_options(ConversionTarget::MarpPptx);
        assert_eq!(marp.theme.as_deref(), Some("uncover"));
        assert!(!marp.toc);

        let pandoc = settings.conversion_options(ConversionTarget::PandocPdf);
        assert!(pandoc.toc);
        assert!(pandoc.theme.is_none());
    }
}
