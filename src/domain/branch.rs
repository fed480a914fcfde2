use serde::{Deserialize, Serialize};

use super::{present, PushTarget};

/// A branch on a named repository that receives the build's HEAD
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_repo_name: Option<String>,

    /// Branch name, may contain `$VAR` / `${VAR}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

impl BranchSpec {
    pub fn new(target_repo_name: impl Into<String>, branch_name: impl Into<String>) -> Self {
        BranchSpec {
            target_repo_name: Some(target_repo_name.into()),
            branch_name: Some(branch_name.into()),
        }
    }

    /// Configured branch name, `None` when missing or blank
    pub fn branch_name(&self) -> Option<&str> {
        present(self.branch_name.as_deref())
    }
}

impl PushTarget for BranchSpec {
    fn target_repo_name(&self) -> Option<&str> {
        present(self.target_repo_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_spec_new() {
        let spec = BranchSpec::new("upstream", "release/${BUILD_NUMBER}");
        assert_eq!(spec.branch_name(), Some("release/${BUILD_NUMBER}"));
        assert_eq!(spec.target_repo_name(), Some("upstream"));
    }

    #[test]
    fn test_default_is_missing_everything() {
        let spec = BranchSpec::default();
        assert_eq!(spec.branch_name(), None);
        assert_eq!(spec.target_repo_name(), None);
    }
}
