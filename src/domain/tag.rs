use serde::{Deserialize, Serialize};

use super::{present, PushTarget};

/// A tag to create or verify and then push to a named repository
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_repo_name: Option<String>,

    /// Tag name, may contain `$VAR` / `${VAR}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    /// When set the tag must not exist yet and is created before pushing;
    /// otherwise it must already exist.
    #[serde(default)]
    pub create_tag: bool,
}

impl TagSpec {
    pub fn new(
        target_repo_name: impl Into<String>,
        tag_name: impl Into<String>,
        create_tag: bool,
    ) -> Self {
        TagSpec {
            target_repo_name: Some(target_repo_name.into()),
            tag_name: Some(tag_name.into()),
            create_tag,
        }
    }

    /// Configured tag name, `None` when missing or blank
    pub fn tag_name(&self) -> Option<&str> {
        present(self.tag_name.as_deref())
    }
}

impl PushTarget for TagSpec {
    fn target_repo_name(&self) -> Option<&str> {
        present(self.target_repo_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_spec_new() {
        let spec = TagSpec::new("origin", "v$BUILD_NUMBER", true);
        assert_eq!(spec.tag_name(), Some("v$BUILD_NUMBER"));
        assert_eq!(spec.target_repo_name(), Some("origin"));
        assert!(spec.create_tag);
    }

    #[test]
    fn test_blank_names_are_missing() {
        let spec = TagSpec {
            target_repo_name: Some("   ".to_string()),
            tag_name: Some(String::new()),
            create_tag: false,
        };
        assert_eq!(spec.tag_name(), None);
        assert_eq!(spec.target_repo_name(), None);
    }
}
