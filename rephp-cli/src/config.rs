//! User configuration (`~/.rephp/config.toml`).

use std::path::{Path, PathBuf};

use rephp_cleaner::{CleanerOptions, ImplicitUseOptions};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Everything the config file can set. Command-line flags are applied on
/// top by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RephpConfig {
    /// Start every session with `declare(strict_types=1)`.
    pub strict_types: bool,
    /// Skip validation entirely.
    pub yolo: bool,
    /// Keep buffering until the input ends with `;` or `}`.
    pub require_semicolons: bool,
    /// Treat unknown namespaced classes as autoloadable.
    pub assume_autoload: bool,
    /// File whose namespace and `use` statements seed the session.
    pub warm_up_file: Option<String>,
    /// Where line-editor history is kept. Supports `~`.
    pub history_file: Option<String>,
    pub implicit_use: ImplicitUseOptions,
}

impl Default for RephpConfig {
    fn default() -> Self {
        Self {
            strict_types: false,
            yolo: false,
            require_semicolons: false,
            assume_autoload: true,
            warm_up_file: None,
            history_file: None,
            implicit_use: ImplicitUseOptions::default(),
        }
    }
}

impl RephpConfig {
    #[must_use]
    pub fn cleaner_options(&self) -> CleanerOptions {
        CleanerOptions {
            strict_types: self.strict_types,
            yolo: self.yolo,
            require_semicolons: self.require_semicolons,
            assume_autoload: self.assume_autoload,
            implicit_use: self.implicit_use.clone(),
        }
    }

    /// History location, `~/.rephp/history` unless configured.
    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => Some(expand_tilde(path)),
            None => rephp_dir().map(|dir| dir.join("history")),
        }
    }

    #[must_use]
    pub fn warm_up_path(&self) -> Option<PathBuf> {
        self.warm_up_file.as_deref().map(expand_tilde)
    }
}

/// Load the configuration from `path`, or from `~/.rephp/config.toml`.
///
/// A missing file gives the defaults. So does a malformed one, with a
/// warning.
#[must_use]
pub fn load_config(path: Option<&Path>) -> RephpConfig {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return RephpConfig::default();
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return RephpConfig::default();
    };
    toml::from_str(&text).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "ignoring malformed config file");
        RephpConfig::default()
    })
}

/// `~/.rephp/config.toml`, or `None` if `$HOME` is unset.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    rephp_dir().map(|dir| dir.join("config.toml"))
}

fn rephp_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".rephp"))
}

/// Expand a leading `~` or `~/` to `$HOME`.
fn expand_tilde(path: &str) -> PathBuf {
    let home = || std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    if let Some(rest) = path.strip_prefix("~/") {
        PathBuf::from(home()).join(rest)
    } else if path == "~" {
        PathBuf::from(home())
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config: RephpConfig = toml::from_str(
            r#"
strict_types = true
yolo = true
require_semicolons = true
assume_autoload = false
warm_up_file = "/srv/app/bootstrap.php"
history_file = "/tmp/rephp_history"

[implicit_use]
include_namespaces = ["App\\"]
exclude_namespaces = ["App\\Legacy\\"]
"#,
        )
        .unwrap();
        assert!(config.strict_types && config.yolo && config.require_semicolons);
        assert!(!config.assume_autoload);
        assert_eq!(config.warm_up_path(), Some(PathBuf::from("/srv/app/bootstrap.php")));
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/rephp_history")));
        assert_eq!(config.implicit_use.include_namespaces, ["App\\"]);
        assert_eq!(config.implicit_use.exclude_namespaces, ["App\\Legacy\\"]);

        let options = config.cleaner_options();
        assert!(options.strict_types && options.yolo && !options.assume_autoload);
        assert!(options.implicit_use.is_enabled());
    }

    #[test]
    fn parse_partial_config() {
        let config: RephpConfig = toml::from_str("yolo = true\n").unwrap();
        assert!(config.yolo);
        assert!(config.assume_autoload);
        assert!(config.warm_up_file.is_none());
        assert!(!config.implicit_use.is_enabled());
    }

    #[test]
    fn parse_empty_config() {
        let config: RephpConfig = toml::from_str("").unwrap();
        assert_eq!(config, RephpConfig::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = RephpConfig {
            strict_types: true,
            history_file: Some("~/hist".to_string()),
            ..RephpConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<RephpConfig>(&text).unwrap(), config);
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_tilde("~/x"), PathBuf::from(&home).join("x"));
            assert_eq!(expand_tilde("~"), PathBuf::from(home));
        }
    }
}
