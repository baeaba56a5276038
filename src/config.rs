use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Contents of `careerlog.toml`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CareerlogConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub cors_origin: Option<String>,
}

impl CareerlogConfig {
    /// The `database` entry; relative paths are taken from the config file's directory.
    pub fn database_path(&self, config_path: &Path) -> Option<PathBuf> {
        let database = PathBuf::from(self.database.as_ref()?);
        if database.is_absolute() {
            return Some(database);
        }
        Some(config_dir(config_path).join(database))
    }
}

/// Directory holding the config file; empty for a bare file name.
pub fn config_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or(Path::new(""))
}

/// Settings the server actually runs with, after all sources are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub database: PathBuf,
    pub port: u16,
    /// `None` means permissive CORS.
    pub cors_origin: Option<String>,
}

impl ServerSettings {
    /// Merge sources: CLI flag, then the `PORT` variable, then the file, then defaults.
    pub fn resolve(
        config: Option<&CareerlogConfig>,
        config_path: &Path,
        database_flag: Option<PathBuf>,
        port_flag: Option<u16>,
        port_env: Option<&str>,
    ) -> anyhow::Result<Self> {
        let database = database_flag
            .or_else(|| config.and_then(|c| c.database_path(config_path)))
            .unwrap_or_else(|| default_database_path_in(Path::new(".")));

        let port_env = port_env
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw}"))
            })
            .transpose()?;
        let port = port_flag
            .or(port_env)
            .or_else(|| config.and_then(|c| c.port))
            .unwrap_or(DEFAULT_PORT);

        let origin = config
            .and_then(|c| c.cors_origin.clone())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = (origin.trim() != "*").then_some(origin);

        Ok(Self {
            database,
            port,
            cors_origin,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("careerlog.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".careerlog").join("careerlog.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CareerlogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CareerlogConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CareerlogConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".careerlog/";

    let mut content = if gitignore_path.exists() {
        std::fs::read_to_string(&gitignore_path)?
    } else {
        String::new()
    };
    if content.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}
