use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::PulsemapConfig;
use crate::errors::{Error, Result, ResultExt};

pub const CONFIG_FILE_NAME: &str = ".pulsemap.toml";

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML document and validate its values.
pub fn parse_and_validate_config(contents: &str) -> Result<PulsemapConfig> {
    let config = toml::from_str::<PulsemapConfig>(contents)?;

    config
        .validate()
        .map_err(|errors| Error::configuration(errors.join("; ")))?;

    Ok(config)
}

/// Load configuration from an explicit path; missing or invalid files are errors.
pub fn load_config_from_path(path: &Path) -> Result<PulsemapConfig> {
    let contents = read_config_file(path)
        .map_err(|e| Error::file_system("Failed to read config file", path, e))?;
    let config = parse_and_validate_config(&contents).context(path.display().to_string())?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Try one candidate location during discovery; failures degrade to `None`.
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<PulsemapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Ignoring invalid config {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Some(PulsemapConfig::default())
        }
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Directory ancestors of `start`, nearest first, up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn discover_config(start: PathBuf) -> PulsemapConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            PulsemapConfig::default()
        })
}

/// Load configuration by searching from the current directory upwards.
pub fn load_config() -> PulsemapConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            PulsemapConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            [statistics]
            min_samples = 5

            [cache.retrieval]
            max_size = 200
            ttl_secs = 900
        "#})
        .unwrap();

        assert_eq!(config.statistics.min_samples, 5);
        assert_eq!(config.statistics.trend_threshold_pct, 10.0);
        assert_eq!(config.cache.retrieval.max_size, 200);
        assert_eq!(config.cache.user_context.max_size, 10);
        assert_eq!(config.risk.window_days, 7);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let err = parse_and_validate_config("[risk]\nhigh_score = 1\nmoderate_score = 4\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        let err = parse_and_validate_config("[statistics\nmin_samples = ").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_directory_ancestors_respects_depth() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn test_discover_config_finds_parent_file() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("one").join("two");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[patterns]\nmax_outliers = 2\n",
        )
        .unwrap();

        let config = discover_config(nested);
        assert_eq!(config.patterns.max_outliers, 2);
    }

    #[test]
    fn test_load_config_from_invalid_file_names_path() {
        let root = TempDir::new().unwrap();
        let path = root.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[cache.analysis]\nmax_size = 0\nttl_secs = 60\n").unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_load_config_from_missing_path_is_error() {
        let root = TempDir::new().unwrap();
        let err = load_config_from_path(&root.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
