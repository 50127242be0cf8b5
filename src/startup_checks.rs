use crate::Config;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Templates directory does not exist: {0}")]
    TemplatesDirectoryMissing(String),

    #[error("Failed to create local storage directory: {0}")]
    StorageDirectoryCreationFailed(#[from] std::io::Error),
}

impl StartupCheckError {
    /// Whether the server cannot usefully start after this failure.
    pub fn is_critical(&self) -> bool {
        matches!(self, StartupCheckError::TemplatesDirectoryMissing(_))
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let templates_dir = Path::new(&config.templates.directory);
    if !templates_dir.is_dir() {
        error!("Templates directory does not exist: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesDirectoryMissing(
            templates_dir.display().to_string(),
        ));
    } else {
        info!("Templates directory exists: {:?}", templates_dir);
    }

    let static_dir = Path::new(&config.static_files.directory);
    if !static_dir.is_dir() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        warn!("Pages will render without styles or scripts");
    }

    if let Some(parent) = config.storage.local_storage_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!(
            "Local storage directory does not exist, creating: {:?}",
            parent
        );
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!("Failed to create local storage directory: {}", e);
            errors.push(StartupCheckError::StorageDirectoryCreationFailed(e));
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.templates.directory = dir.path().join("templates");
        config.static_files.directory = dir.path().join("static");
        config.storage.local_storage_path = dir.path().join("state/local.toml");
        config
    }

    #[tokio::test]
    async fn test_missing_templates_is_critical() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_critical());
    }

    #[tokio::test]
    async fn test_storage_directory_is_created() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        let config = config_in(&dir);

        perform_startup_checks(&config).await.unwrap();
        assert!(dir.path().join("state").is_dir());
    }

    #[tokio::test]
    async fn test_bare_storage_file_name_needs_no_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        let mut config = config_in(&dir);
        config.storage.local_storage_path = "local_storage.toml".into();

        assert!(perform_startup_checks(&config).await.is_ok());
    }
}
