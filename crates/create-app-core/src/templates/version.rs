//! CLI and template version compatibility

use semver::Version;

/// Parse a version, tolerating a leading `v`
fn parse(version: &str) -> Option<Version> {
    Version::parse(version.strip_prefix('v').unwrap_or(version)).ok()
}

/// Upgrade hint when a template expects a newer CLI
///
/// Unparseable versions never warn.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli = parse(cli_version)?;
    let template = parse(template_version)?;

    (cli < template).then(|| {
        format!(
            "This template was written for version {} or newer, you are running {}. \
             Consider updating: {}",
            template, cli, upgrade_command
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install create-next-app --force";

    #[test]
    fn test_older_cli_warns() {
        let warning = check_compatibility("0.1.0", "0.2.0", UPGRADE).unwrap();
        assert!(warning.contains("0.2.0"));
        assert!(warning.contains(UPGRADE));
    }

    #[test]
    fn test_same_or_newer_cli_is_silent() {
        assert!(check_compatibility("0.1.0", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.3.0", "v0.2.1", UPGRADE).is_none());
    }

    #[test]
    fn test_invalid_versions_are_silent() {
        assert!(check_compatibility("invalid", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.1.0", "latest", UPGRADE).is_none());
    }
}
