use crate::{
    app::{backend::AppBackend, local::AppLocal, remote::AppRemote, service::AppService},
    config::Config,
};
use anyhow::{Context, Result};
use homedir::my_home;

/// Application factory for creating and configuring application components
pub struct AppFactory;

impl AppFactory {
    /// Create an application service with the appropriate backend.
    ///
    /// With `NOTES_ADDR` set the service talks to that daemon, otherwise it
    /// opens the local store.
    pub fn create_app_service(paths: &AppPaths) -> Result<AppService> {
        let backend: Box<dyn AppBackend> = match std::env::var("NOTES_ADDR") {
            Ok(addr) => {
                log::debug!("using remote backend at {addr}");
                Box::new(AppRemote::new(&addr))
            }
            Err(_) => Box::new(Self::create_local_app(paths)?),
        };

        Ok(AppService::new(backend))
    }

    /// Create a local application instance
    pub fn create_local_app(paths: &AppPaths) -> Result<AppLocal> {
        AppLocal::new(&paths.notes_path, &paths.subjects_path)
            .context("Failed to open the notes database")
    }

    /// Configuration from the base directory with environment overrides.
    pub fn create_config(paths: &AppPaths) -> Result<Config> {
        let mut config = Config::load_with(&paths.base_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Get application paths with validation
    pub fn get_paths() -> Result<AppPaths> {
        let base_path = Self::get_base_path()?;

        // Ensure base directory exists
        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths::under(&base_path))
    }

    fn get_base_path() -> Result<String> {
        if let Ok(path) = std::env::var("NOTES_BASE_PATH") {
            return Ok(path);
        }

        let home = my_home()
            .context("couldnt find home dir")?
            .context("couldnt find home dir")?;

        Ok(format!("{}/.local/share/classnotes", home.to_string_lossy()))
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_path: String,
    pub notes_path: String,
    pub subjects_path: String,
}

impl AppPaths {
    pub fn under(base_path: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            notes_path: format!("{base_path}/notes.csv"),
            subjects_path: format!("{base_path}/subjects.csv"),
        }
    }
}
