//! # Archivist Configuration Crate
//!
//! Builds the immutable `Config` for one export run from three places:
//!
//! - a `.env` file, loaded into the process environment without overriding
//!   variables that are already set;
//! - the `DB_*`, `OUTPUT_DIR` and `GIT_*` environment variables, read through
//!   the `config` crate with the documented defaults;
//! - an optional `exports.toml` listing the export targets. When it is absent
//!   the built-in view list is used.
//!
//! Every failure here is fatal for the run and happens before any I/O against
//! the database or the output directory.

use crate::settings::{EnvSettings, TargetsFile};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, DEFAULT_VIEWS, DatabaseSettings, ExportTarget, GitSettings};

/// The environment variables this crate reads.
pub const ENV_KEYS: [&str; 9] = [
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_SSLMODE",
    "OUTPUT_DIR",
    "GIT_REMOTE",
    "GIT_BRANCH",
];

/// Loads `KEY=value` pairs from `path` into the process environment.
///
/// Variables already present in the environment keep their value. A missing
/// or malformed file is an error.
pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFileError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded environment file.");
    Ok(())
}

/// Loads the run configuration from the process environment and the optional
/// targets file at `targets_path`.
pub fn load_config(targets_path: &Path) -> Result<Config, ConfigError> {
    let env = ENV_KEYS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();
    load_config_from(env, targets_path)
}

/// Same as [`load_config`], but reads the variables from `env` instead of the
/// process environment.
pub fn load_config_from(
    env: HashMap<String, String>,
    targets_path: &Path,
) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .set_default("db_host", "localhost")?
        .set_default("db_user", "postgres")?
        .set_default("db_password", "")?
        .set_default("db_name", "hospital_db")?
        .set_default("db_sslmode", "disable")?
        .set_default("output_dir", "data_exports")?
        .add_source(config::Environment::default().source(Some(env.into_iter().collect())))
        .build()?;

    let env = builder.try_deserialize::<EnvSettings>()?;

    let port = match env.db_port.as_deref() {
        None => {
            return Err(ConfigError::ValidationError(
                "DB_PORT must be set".to_string(),
            ));
        }
        Some(raw) => raw.parse::<u16>().map_err(|e| {
            ConfigError::ValidationError(format!("invalid DB_PORT {:?}: {}", raw, e))
        })?,
    };

    if env.output_dir.is_empty() {
        return Err(ConfigError::ValidationError(
            "OUTPUT_DIR must not be empty".to_string(),
        ));
    }

    let exports = load_targets(targets_path)?;

    Ok(Config {
        database: settings::DatabaseSettings {
            host: env.db_host,
            port,
            user: env.db_user,
            password: env.db_password,
            name: env.db_name,
            ssl_mode: env.db_sslmode,
        },
        output_dir: PathBuf::from(env.output_dir),
        exports,
        git: GitSettings {
            remote: env.git_remote.filter(|s| !s.is_empty()),
            branch: env.git_branch.filter(|s| !s.is_empty()),
        },
    })
}

/// Reads the export targets from `path`, or returns the built-in list when
/// the file does not exist.
fn load_targets(path: &Path) -> Result<Vec<ExportTarget>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No targets file, using the built-in view list.");
        return Ok(ExportTarget::defaults());
    }

    let file = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?
        .try_deserialize::<TargetsFile>()?;

    let targets: Vec<ExportTarget> = file.exports.into_iter().map(ExportTarget::from).collect();
    if targets.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "no export targets configured in {}",
            path.display()
        )));
    }
    validate_targets(&targets)?;

    tracing::debug!(path = %path.display(), count = targets.len(), "Loaded export targets.");
    Ok(targets)
}

fn validate_targets(targets: &[ExportTarget]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for target in targets {
        if !is_valid_target_name(&target.name) {
            return Err(ConfigError::ValidationError(format!(
                "export name {:?} is not a valid SQL identifier",
                target.name
            )));
        }
        if !seen.insert(target.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "export name {:?} is configured more than once",
                target.name
            )));
        }
        if target.query.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "export {:?} has an empty query",
                target.name
            )));
        }
    }
    Ok(())
}

/// A bare identifier or a single `schema.name` pair. The name ends up inside
/// SQL text and in a file name, so nothing else is accepted.
fn is_valid_target_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((schema, view)) => is_identifier(schema) && is_identifier(view),
        None => is_identifier(name),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
