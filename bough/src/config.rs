use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};

use bough_resource::{Resource, ResourceSet};
use bough_tree::DEFAULT_AUTO_ID_PREFIX;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::Cli;

pub const CONFIG_FILE_NAME: &str = "bough.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("bough config not found at: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    pub log: Option<String>,
    pub auto_id_prefix: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub stylesheets: Vec<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// The file the values came from, if there was one.
    pub path: Option<PathBuf>,
    pub log: String,
    pub auto_id_prefix: String,
    pub title: String,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
}

impl Config {
    /// Load from `path`, a file or a directory holding `bough.toml`.
    ///
    /// A directory without `bough.toml` yields the defaults; a missing file
    /// that was named explicitly is an error.
    pub fn load(path: &Path, cli: &Cli) -> Result<Self, ConfigError> {
        let (path, config) = Self::load_config(path)?;
        debug!(?path, "loaded config");
        Ok(Self::resolve(path, config, cli))
    }

    /// Parse config text as if it were read from `path`.
    pub fn from_toml(source: &str, path: &Path, cli: &Cli) -> Result<Self, ConfigError> {
        let config = toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self::resolve(Some(path.to_owned()), config, cli))
    }

    fn resolve(path: Option<PathBuf>, config: ConfigToml, cli: &Cli) -> Self {
        let ConfigToml {
            log,
            auto_id_prefix,
            title,
            stylesheets,
            scripts,
        } = config;

        let log = cli.log.clone().or(log).unwrap_or("error".into());
        let auto_id_prefix = cli
            .auto_id_prefix
            .clone()
            .or(auto_id_prefix)
            .unwrap_or(DEFAULT_AUTO_ID_PREFIX.into());
        let title = title.unwrap_or("bough".into());

        Config {
            path,
            log,
            auto_id_prefix,
            title,
            stylesheets,
            scripts,
        }
    }

    /// Page-wide resources, declared on every page root.
    pub fn resources(&self) -> ResourceSet {
        let style_sheets = self.stylesheets.iter().map(Resource::style_sheet);
        let scripts = self.scripts.iter().map(Resource::script);
        style_sheets.chain(scripts).collect()
    }

    fn load_config(path: &Path) -> Result<(Option<PathBuf>, ConfigToml), ConfigError> {
        let path = if path.is_dir() {
            let path = path.join(CONFIG_FILE_NAME);
            if !path.exists() {
                return Ok((None, ConfigToml::default()));
            }
            path
        } else if path.exists() {
            path.to_owned()
        } else {
            return Err(ConfigError::ConfigNotFound {
                path: path.to_owned(),
            });
        };
        let string = read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&string).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        Ok((Some(path), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["bough"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["inspect", "--page", "page.toml"]);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("", Path::new("bough.toml"), &cli(&[])).unwrap();
        assert_eq!(config.auto_id_prefix, "auto");
        assert_eq!(config.title, "bough");
        assert!(config.resources().is_empty());
    }

    #[test]
    fn test_cli_overrides_file() {
        let source = r#"
            log = "info"
            auto_id_prefix = "w"
            title = "Site"
            stylesheets = ["/site.css"]
            scripts = ["/site.js"]
        "#;
        let config = Config::from_toml(
            source,
            Path::new("bough.toml"),
            &cli(&["--log", "trace", "--auto-id-prefix", "node"]),
        )
        .unwrap();

        assert_eq!(config.log, "trace");
        assert_eq!(config.auto_id_prefix, "node");
        assert_eq!(config.title, "Site");
        assert_eq!(
            config.resources().iter().cloned().collect::<Vec<_>>(),
            vec![Resource::style_sheet("/site.css"), Resource::script("/site.js")]
        );
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = Config::from_toml("colour = 1", Path::new("bough.toml"), &cli(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Path::new("/nonexistent/bough.toml"), &cli(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }
}
