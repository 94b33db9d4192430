//! Persisted theme preference.
//!
//! Stored under the fixed key `theme` in a small TOML key-value file. Other
//! keys in the same file are preserved on write.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::debug;

/// Key of the theme entry in the state file.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme `{other}` (expected light or dark)")),
        }
    }
}

/// Reads and writes the theme entry of the state file.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, `Light` when the file or key is missing or unreadable.
    pub fn load(&self) -> Theme {
        let theme = self
            .read_table()
            .ok()
            .and_then(|table| table.get(THEME_KEY)?.as_str()?.parse().ok());

        theme.unwrap_or_else(|| {
            debug!("theme"; "no stored theme in {}, using light", self.path.display());
            Theme::Light
        })
    }

    /// Persist `theme`, keeping any other keys in the file.
    pub fn save(&self, theme: Theme) -> Result<()> {
        let mut table = self.read_table().unwrap_or_default();
        table.insert(
            THEME_KEY.to_string(),
            toml::Value::String(theme.as_str().to_string()),
        );

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(&table).context("Failed to serialize state")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Flip the stored theme and return the new value.
    pub fn toggle(&self) -> Result<Theme> {
        let theme = self.load().toggled();
        self.save(theme)?;
        Ok(theme)
    }

    fn read_table(&self) -> Result<toml::Table> {
        let content = fs::read_to_string(&self.path)?;
        Ok(content.parse::<toml::Table>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_light() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(dir.path().join("state.toml"));
        assert_eq!(store.load(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(dir.path().join("nested/state.toml"));

        assert_eq!(store.toggle().unwrap(), Theme::Dark);
        assert_eq!(store.load(), Theme::Dark);
        assert_eq!(ThemeStore::new(store.path()).load(), Theme::Dark);

        assert_eq!(store.toggle().unwrap(), Theme::Light);
        assert_eq!(store.load(), Theme::Light);
    }

    #[test]
    fn test_unknown_value_reads_as_light() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "theme = \"sepia\"\n").unwrap();
        assert_eq!(ThemeStore::new(&path).load(), Theme::Light);

        fs::write(&path, "not toml at all [").unwrap();
        assert_eq!(ThemeStore::new(&path).load(), Theme::Light);
    }

    #[test]
    fn test_save_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "last_scale = 3\n").unwrap();

        ThemeStore::new(&path).save(Theme::Dark).unwrap();
        let table: toml::Table = fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(table["last_scale"].as_integer(), Some(3));
        assert_eq!(table[THEME_KEY].as_str(), Some("dark"));
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
