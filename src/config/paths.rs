//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (persisted device / voice / threshold choices):
//!   Windows: %APPDATA%\parrot\
//!   macOS:   ~/Library/Application Support/parrot/
//!   Linux:   ~/.config/parrot/
//!
//! The settings file location can be overridden with the `PARROT_SETTINGS`
//! environment variable.

use std::path::PathBuf;

/// Environment variable that overrides the settings file path.
pub const SETTINGS_PATH_ENV: &str = "PARROT_SETTINGS";

/// Holds all resolved application file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Full path to `settings.toml`.  Its directory is created on first save.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "parrot";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.  `PARROT_SETTINGS`, when set and non-empty, replaces the
    /// settings file path.
    pub fn new() -> Self {
        let override_path = std::env::var_os(SETTINGS_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        match override_path {
            Some(settings_file) => Self::with_settings_file(settings_file),
            None => {
                let settings_file = dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(Self::APP_NAME)
                    .join("settings.toml");
                Self { settings_file }
            }
        }
    }

    /// Build paths around an explicit settings file.
    pub fn with_settings_file(settings_file: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: settings_file.into(),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_settings_file_is_used_verbatim() {
        let paths = AppPaths::with_settings_file("/tmp/parrot-test/custom.toml");
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/tmp/parrot-test/custom.toml")
        );
    }

    #[test]
    fn default_location_ends_in_app_dir() {
        if std::env::var_os(SETTINGS_PATH_ENV).is_some() {
            return;
        }
        let paths = AppPaths::new();
        assert!(paths.settings_file.ends_with("parrot/settings.toml"));
    }

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.to_str().is_some_and(|s| !s.is_empty()));
    }
}
