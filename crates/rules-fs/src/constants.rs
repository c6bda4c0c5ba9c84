//! Naming conventions shared by discovery, sync, and configuration.

/// File-name suffix that marks a rules document.
pub const RULES_SUFFIX: &str = ".rules.md";

/// Glob matching rules documents by file name.
pub const RULES_GLOB: &str = "*.rules.md";

/// Conventional configuration file name at a repository root.
pub const CONFIG_FILE_NAME: &str = ".rules-service.yaml";

/// Whether a bare file name follows the rules-document naming convention.
pub fn is_rules_file_name(name: &str) -> bool {
    name.len() > RULES_SUFFIX.len() && name.ends_with(RULES_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_file_names() {
        assert!(is_rules_file_name("quality.rules.md"));
        assert!(!is_rules_file_name(".rules.md"));
        assert!(!is_rules_file_name("quality.md"));
        assert!(!is_rules_file_name("quality.rules.md.tmp"));
    }
}
