//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ZincConfig;
use std::collections::BTreeSet;
use std::path::Path;

/// Name of the configuration file looked up in a directory.
pub const CONFIG_FILE_NAME: &str = "zinc.toml";

/// Loads and validates `<dir>/zinc.toml`.
pub fn load_config(dir: &Path) -> Result<ZincConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates the configuration file at `path`.
pub fn load_config_file(path: &Path) -> Result<ZincConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `zinc.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ZincConfig, ConfigError> {
    let config: ZincConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ZincConfig) -> Result<(), ConfigError> {
    for (i, rule) in config.rebase.iter().enumerate() {
        if rule.from.is_empty() {
            return Err(ConfigError::MissingField(format!("rebase[{i}].from")));
        }
    }

    if let Some(split) = &config.split {
        let mut names = BTreeSet::new();
        for (i, partition) in split.partition.iter().enumerate() {
            if partition.name.is_empty() {
                return Err(ConfigError::MissingField(format!("split.partition[{i}].name")));
            }
            if partition.output.as_os_str().is_empty() {
                return Err(ConfigError::MissingField(format!(
                    "split.partition[{i}].output"
                )));
            }
            if !names.insert(partition.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate partition '{}'",
                    partition.name
                )));
            }
        }
        if split.catchall && split.catchall_output.is_none() {
            return Err(ConfigError::MissingField("split.catchall_output".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_config_is_valid() {
        let config = load_config_from_str("").unwrap();
        assert!(config.rebase.is_empty());
        assert!(config.split.is_none());
        assert_eq!(config.anonymize.seed, 0);
        assert!(config.anonymize.keep.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[[rebase]]
from = "/home/ci/workspace/"
to = "/buildroot/"

[[rebase]]
from = "/tmp/"

[split]
root = "/buildroot"
catchall = true
catchall_output = "out/rest.analysis"

[[split.partition]]
name = "core"
output = "out/core.analysis"
sources = ["src/core/A.scala", "src/core/B.scala"]

[[split.partition]]
name = "web"
output = "out/web.analysis"
sources = ["src/web/Server.scala"]

[anonymize]
words = "words.txt"
seed = 7
keep = ["scala"]

[anonymize.rename]
acme = "widget"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.rebase.len(), 2);
        assert_eq!(config.rebase[0].to.as_deref(), Some("/buildroot/"));
        assert_eq!(config.rebase[1].to, None);

        let split = config.split.unwrap();
        assert_eq!(split.root, Some(PathBuf::from("/buildroot")));
        assert!(split.catchall);
        assert_eq!(split.partition.len(), 2);
        assert_eq!(split.partition[0].name, "core");
        assert_eq!(split.partition[0].sources.len(), 2);

        assert_eq!(config.anonymize.words, Some(PathBuf::from("words.txt")));
        assert_eq!(config.anonymize.seed, 7);
        assert_eq!(config.anonymize.keep, Some(vec!["scala".to_string()]));
        let rename = config.anonymize.rename.unwrap();
        assert_eq!(rename.get("acme").map(String::as_str), Some("widget"));
    }

    #[test]
    fn empty_rebase_source_errors() {
        let toml = r#"
[[rebase]]
from = ""
to = "/x/"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "rebase[0].from"));
    }

    #[test]
    fn partition_without_output_errors() {
        let toml = r#"
[[split.partition]]
name = "core"
sources = ["A.scala"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_partition_name_errors() {
        let toml = r#"
[[split.partition]]
name = ""
output = "out/a.analysis"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "split.partition[0].name"));
    }

    #[test]
    fn duplicate_partition_names_error() {
        let toml = r#"
[[split.partition]]
name = "core"
output = "out/a.analysis"

[[split.partition]]
name = "core"
output = "out/b.analysis"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn catchall_requires_output() {
        let toml = r#"
[split]
catchall = true
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "split.catchall_output"));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("[split\ncatchall = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[anonymize]\nseed = 3\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.anonymize.seed, 3);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/path/that/does/not/exist")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
