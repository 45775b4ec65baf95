use serde::Deserialize;
use std::path::PathBuf;

/// The views exported when no targets file is present.
pub const DEFAULT_VIEWS: [&str; 3] = [
    "hospital_seven_avg_change",
    "daily_wait_time_stats",
    "monthly_avg_wait_times",
];

/// The root configuration structure for a single export run.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseSettings,
    /// Directory the snapshot files are written to. Also the git working tree
    /// the publisher operates in.
    pub output_dir: PathBuf,
    /// Ordered list of exports. Output order follows this list.
    pub exports: Vec<ExportTarget>,
    pub git: GitSettings,
}

/// Connection parameters for the PostgreSQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// The database name (`DB_NAME`).
    pub name: String,
    /// One of the libpq `sslmode` values (e.g. "disable", "require").
    pub ssl_mode: String,
}

/// Where the publisher pushes to. Both fields unset means a plain `git push`
/// to the branch's configured upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSettings {
    pub remote: Option<String>,
    pub branch: Option<String>,
}

/// A single named export: the snapshot file stem plus the query whose rows
/// are aggregated into the snapshot's `data` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub name: String,
    pub query: String,
}

impl ExportTarget {
    /// An export of every row of the view (or table) called `name`.
    pub fn view(name: impl Into<String>) -> Self {
        let name = name.into();
        let query = format!("SELECT * FROM {}", name);
        Self { name, query }
    }

    /// The built-in target list, in export order.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_VIEWS.iter().map(|name| Self::view(*name)).collect()
    }
}

/// The raw environment as deserialized by the `config` crate. Keys are the
/// lowercased environment variable names.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvSettings {
    pub db_host: String,
    #[serde(default)]
    pub db_port: Option<String>,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_sslmode: String,
    pub output_dir: String,
    #[serde(default)]
    pub git_remote: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}

/// Shape of the optional `exports.toml` file.
#[derive(Debug, Deserialize)]
pub(crate) struct TargetsFile {
    #[serde(default)]
    pub exports: Vec<TargetEntry>,
}

/// One `[[exports]]` table. `query` falls back to `SELECT * FROM <name>`.
#[derive(Debug, Deserialize)]
pub(crate) struct TargetEntry {
    pub name: String,
    #[serde(default)]
    pub query: Option<String>,
}

impl From<TargetEntry> for ExportTarget {
    fn from(entry: TargetEntry) -> Self {
        match entry.query {
            Some(query) => ExportTarget {
                name: entry.name,
                query,
            },
            None => ExportTarget::view(entry.name),
        }
    }
}
