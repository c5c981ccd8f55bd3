//! CLI configuration utilities

use anyhow::{Context, Result};
use shopfront_core::ClientSettings;
use std::path::{Path, PathBuf};

/// Load client settings and apply command-line overrides
///
/// Flags win over the environment, which wins over the settings file.
pub fn load_settings(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load settings from {}", path.display()),
        None => "Failed to load settings".to_string(),
    })?;

    if let Some(data_dir) = data_dir {
        settings.data_dir = data_dir;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_data_dir_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(settings.data_dir, dir.path());
    }

    #[test]
    fn test_settings_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\npath_prefix = \"v2\"").unwrap();

        let settings = load_settings(Some(file.path()), None).unwrap();
        assert_eq!(settings.api.path_prefix, "/v2");
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/shopfront.toml")), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/shopfront.toml"));
    }
}
