use super::Config;
use super::template::CONFIG_TEMPLATE;
use anyhow::{Context, Result, bail};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// `~/.planwatch/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Ok(home.join(".planwatch").join("config.toml"))
    }

    /// Load the config file and apply environment overrides.
    ///
    /// With no explicit path, a missing default file is seeded from the
    /// template so the operator has something to edit; the run still stops
    /// because the template only carries placeholders.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            if explicit_path.is_some() {
                bail!("Config file not found: {}", config_path.display());
            }
            Self::write_template(&config_path, false)?;
            bail!(
                "Created config template at {}. Fill in the connection settings and re-run.",
                config_path.display()
            );
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        config.config_path = config_path;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Write the commented template, refusing to clobber an existing file
    /// unless `force` is set.
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        fs::write(path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}
