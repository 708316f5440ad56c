use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PainelError, Result};

pub const DEFAULT_DATA_FILE: &str = "dados.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_gallery_columns")]
    pub gallery_columns: usize,
    /// Where exports go when no output path is given.
    #[serde(default)]
    pub export_dir: Option<String>,
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_gallery_columns() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            currency: default_currency(),
            gallery_columns: default_gallery_columns(),
            export_dir: None,
        }
    }
}

impl Settings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.data_file))
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.export_dir {
            Some(dir) => PathBuf::from(shellexpand_path(dir)),
            None => PathBuf::from("exports"),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("painel")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        parse_settings(&content)
    } else {
        Settings::default()
    }
}

/// Invalid JSON falls back to defaults; missing keys take their defaults.
pub fn parse_settings(content: &str) -> Settings {
    serde_json::from_str(content).unwrap_or_else(|e| {
        log::warn!("ignoring invalid settings file: {e}");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PainelError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_file: "/tmp/orcamento.xlsx".to_string(),
            currency: "US$".to_string(),
            gallery_columns: 3,
            export_dir: Some("/tmp/out".to_string()),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_settings(&content), settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.data_file, "dados.xlsx");
        assert_eq!(s.currency, "R$");
        assert_eq!(s.gallery_columns, 4);
        assert_eq!(s.export_dir(), PathBuf::from("exports"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let s = parse_settings(r#"{"data_file": "painel.csv"}"#);
        assert_eq!(s.data_file, "painel.csv");
        assert_eq!(s.currency, "R$");
        assert_eq!(s.gallery_columns, 4);
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        assert_eq!(parse_settings("{not json"), Settings::default());
    }

    #[test]
    fn test_shellexpand_leaves_relative_paths() {
        assert_eq!(shellexpand_path("dados.xlsx"), "dados.xlsx");
    }
}
