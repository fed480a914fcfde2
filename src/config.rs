use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{BranchSpec, TagSpec};
use crate::error::Result;

/// Schema version written by this release.
///
/// 0 = written before versioning existed, 1 = first versioned layout.
pub const CURRENT_CONFIG_VERSION: u32 = 2;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "gitpublisher.toml";

/// File name looked up in the user config directory
pub const USER_CONFIG_FILE: &str = ".gitpublisher.toml";

/// Persisted configuration of one job's publish step.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub config_version: u32,

    /// Push the merge-result tag to the merge target branch
    #[serde(default)]
    pub push_merge: bool,

    /// Skip all publishing unless the build succeeded
    #[serde(default)]
    pub push_only_if_success: bool,

    #[serde(default)]
    pub tags_to_push: Vec<TagSpec>,

    /// HEAD is pushed to each of these
    #[serde(default)]
    pub branches_to_push: Vec<BranchSpec>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            config_version: CURRENT_CONFIG_VERSION,
            push_merge: false,
            push_only_if_success: false,
            tags_to_push: Vec::new(),
            branches_to_push: Vec::new(),
        }
    }
}

impl PublishConfig {
    /// Parse a stored configuration, upgrading older schema versions.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let stored: StoredPublishConfig = toml::from_str(content)?;
        Ok(stored.migrate())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn push_tags(&self) -> bool {
        !self.tags_to_push.is_empty()
    }

    pub fn push_branches(&self) -> bool {
        !self.branches_to_push.is_empty()
    }
}

/// Configuration exactly as found on disk.
///
/// Lists keep the difference between "never configured" (`None`) and
/// "configured empty" (`Some(vec![])`), which only matters to [`migrate`].
///
/// [`migrate`]: StoredPublishConfig::migrate
#[derive(Debug, Deserialize)]
struct StoredPublishConfig {
    config_version: Option<u32>,
    #[serde(default)]
    push_merge: bool,
    #[serde(default)]
    push_only_if_success: bool,
    tags_to_push: Option<Vec<TagSpec>>,
    branches_to_push: Option<Vec<BranchSpec>>,
}

impl StoredPublishConfig {
    /// Before versioning, pushing the merge result was the only behaviour, so
    /// an unversioned config without a tag list had it switched on implicitly.
    fn migrate(self) -> PublishConfig {
        let version = self.config_version.unwrap_or(0);
        let mut push_merge = self.push_merge;

        if version < 1 && self.tags_to_push.is_none() {
            tracing::debug!(version, "enabling push_merge for pre-versioning configuration");
            push_merge = true;
        }

        PublishConfig {
            config_version: CURRENT_CONFIG_VERSION.max(version),
            push_merge,
            push_only_if_success: self.push_only_if_success,
            tags_to_push: self.tags_to_push.unwrap_or_default(),
            branches_to_push: self.branches_to_push.unwrap_or_default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `gitpublisher.toml` in current directory
/// 3. `.gitpublisher.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(PublishConfig)` - Loaded (and migrated) or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<PublishConfig> {
    let Some(path) = locate_config(config_path) else {
        return Ok(PublishConfig::default());
    };

    tracing::debug!(path = %path.display(), "loading publish configuration");
    let content = fs::read_to_string(&path)?;
    PublishConfig::from_toml_str(&content)
}

/// Write a configuration in the current schema
pub fn save_config(config: &PublishConfig, path: &Path) -> Result<()> {
    fs::write(path, config.to_toml_string()?)?;
    Ok(())
}

fn locate_config(config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = Path::new(".").join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PublishConfig::default();
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert!(!config.push_merge);
        assert!(!config.push_tags());
        assert!(!config.push_branches());
    }

    #[test]
    fn test_unversioned_without_tags_enables_push_merge() {
        let config = PublishConfig::from_toml_str("push_only_if_success = true\n").unwrap();
        assert!(config.push_merge);
        assert!(config.push_only_if_success);
        assert!(config.tags_to_push.is_empty());
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
    }

    #[test]
    fn test_unversioned_with_empty_tags_keeps_push_merge_off() {
        let config = PublishConfig::from_toml_str("tags_to_push = []\n").unwrap();
        assert!(!config.push_merge);
    }

    #[test]
    fn test_version_one_without_tags_keeps_push_merge_off() {
        let config = PublishConfig::from_toml_str("config_version = 1\n").unwrap();
        assert!(!config.push_merge);
        assert!(config.branches_to_push.is_empty());
    }

    #[test]
    fn test_current_version_parses_specs() {
        let content = r#"
config_version = 2
push_merge = false

[[tags_to_push]]
target_repo_name = "origin"
tag_name = "build-$BUILD_NUMBER"
create_tag = true

[[branches_to_push]]
target_repo_name = "origin"
branch_name = "stable"
"#;
        let config = PublishConfig::from_toml_str(content).unwrap();
        assert_eq!(
            config.tags_to_push,
            vec![TagSpec::new("origin", "build-$BUILD_NUMBER", true)]
        );
        assert_eq!(config.branches_to_push, vec![BranchSpec::new("origin", "stable")]);
    }

    #[test]
    fn test_missing_spec_fields_stay_missing() {
        let content = r#"
config_version = 2

[[tags_to_push]]
target_repo_name = "origin"
"#;
        let config = PublishConfig::from_toml_str(content).unwrap();
        assert_eq!(config.tags_to_push[0].tag_name, None);
        assert!(!config.tags_to_push[0].create_tag);
    }

    #[test]
    fn test_serialized_config_reloads_unchanged() {
        let config = PublishConfig {
            push_merge: true,
            tags_to_push: vec![TagSpec::new("origin", "v1", false)],
            branches_to_push: vec![BranchSpec::new("upstream", "main")],
            ..PublishConfig::default()
        };
        let reloaded = PublishConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }
}
