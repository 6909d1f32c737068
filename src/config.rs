//! Runtime configuration: `.env.<environment>` file, environment variables
//! and command-line overrides, resolved once at startup.

use crate::error::{ArtworkError, Result};
use clap::ValueEnum;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const IMAGES_DIR_VAR: &str = "ARTWORK_IMAGES_DIR";
pub const DB_PATH_VAR: &str = "ARTWORK_DB_PATH";
pub const FEATURED_TITLES_VAR: &str = "ARTWORK_FEATURED_TITLES";

/// Images directory used when nothing else is configured
pub const DEFAULT_IMAGES_DIR: &str = "backend/src/main/resources/Images";

/// Artworks shown on the home page unless overridden
pub const DEFAULT_FEATURED_TITLES: [&str; 2] = ["The Maypole Unicorn", "The Christmas Animals"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    /// Name of the env file for this environment, e.g. `.env.dev`
    pub fn env_file_name(self) -> String {
        format!(".env.{}", self)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub images_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub environment: Environment,
    pub images_dir: PathBuf,
    pub db_path: PathBuf,
    pub featured_titles: HashSet<String>,
}

impl Config {
    /// Load `.env.<environment>` from `base_dir` and resolve from the process environment
    pub fn load(environment: Environment, base_dir: &Path, overrides: Overrides) -> Result<Self> {
        load_env_file(environment, base_dir)?;
        Self::resolve(environment, overrides, |key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable lookup
    pub fn resolve<F>(environment: Environment, overrides: Overrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let images_dir = overrides
            .images_dir
            .or_else(|| var(IMAGES_DIR_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        let db_path = match overrides.db_path.or_else(|| var(DB_PATH_VAR).map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path()?,
        };

        let featured_titles = match var(FEATURED_TITLES_VAR) {
            Some(list) => parse_title_list(&list),
            None => DEFAULT_FEATURED_TITLES.iter().map(|t| t.to_string()).collect(),
        };

        let config = Config {
            environment,
            images_dir,
            db_path,
            featured_titles,
        };
        debug!("Resolved config: {:?}", config);
        Ok(config)
    }
}

/// Load the env file into the process environment.
/// Variables already set are left alone.
pub fn load_env_file(environment: Environment, base_dir: &Path) -> Result<()> {
    let path = base_dir.join(environment.env_file_name());

    if !path.is_file() {
        return match environment {
            Environment::Prod => Err(ArtworkError::Config(format!(
                "{} not found; it is required in prod",
                path.display()
            ))),
            Environment::Dev => {
                warn!("{} not found, using environment and defaults", path.display());
                Ok(())
            }
        };
    }

    dotenvy::from_path(&path)
        .map_err(|e| ArtworkError::Config(format!("could not load {}: {}", path.display(), e)))?;
    info!("Loaded environment from {}", path.display());
    Ok(())
}

/// The catalog database in the user data directory
pub fn default_db_path() -> Result<PathBuf> {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| ArtworkError::Config("could not determine user data directory".to_string()))?;

    path.push("artwork-tools");
    path.push("artworks.db");
    Ok(path)
}

fn parse_title_list(list: &str) -> HashSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(Environment::Dev, Overrides::default(), lookup(&[])).unwrap();
        assert_eq!(config.images_dir, PathBuf::from(DEFAULT_IMAGES_DIR));
        assert!(config.db_path.ends_with("artwork-tools/artworks.db"));
        assert!(config.featured_titles.contains("The Maypole Unicorn"));
        assert!(config.featured_titles.contains("The Christmas Animals"));
    }

    #[test]
    fn test_env_vars_then_overrides() {
        let vars = lookup(&[
            (IMAGES_DIR_VAR, "/srv/images"),
            (DB_PATH_VAR, "/srv/artworks.db"),
            (FEATURED_TITLES_VAR, " Fire , Buck,,"),
        ]);
        let config = Config::resolve(Environment::Prod, Overrides::default(), &vars).unwrap();
        assert_eq!(config.images_dir, PathBuf::from("/srv/images"));
        assert_eq!(config.db_path, PathBuf::from("/srv/artworks.db"));
        assert_eq!(
            config.featured_titles,
            ["Fire", "Buck"].iter().map(|t| t.to_string()).collect::<HashSet<_>>()
        );

        let overrides = Overrides {
            images_dir: Some(PathBuf::from("local/Images")),
            db_path: None,
        };
        let config = Config::resolve(Environment::Prod, overrides, &vars).unwrap();
        assert_eq!(config.images_dir, PathBuf::from("local/Images"));
        assert_eq!(config.db_path, PathBuf::from("/srv/artworks.db"));
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(Environment::Dev, dir.path()).is_ok());
        assert!(matches!(
            load_env_file(Environment::Prod, dir.path()),
            Err(ArtworkError::Config(_))
        ));
    }

    #[test]
    fn test_env_file_name() {
        assert_eq!(Environment::Dev.env_file_name(), ".env.dev");
        assert_eq!(Environment::Prod.env_file_name(), ".env.prod");
    }
}
