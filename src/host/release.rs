//! Parsers for distribution release files.

use regex::Regex;
use std::collections::HashMap;

/// Parse a shell-style `KEY=value` file (os-release, lsb-release).
///
/// Blank lines and `#` comments are skipped; surrounding single or double
/// quotes are stripped from values.
pub(crate) fn parse_key_values(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Parse `/etc/redhat-release` style text.
///
/// - `CentOS Linux release 7.9.2009 (Core)` -> ("centos", "7.9.2009")
/// - `Red Hat Enterprise Linux release 8.8 (Ootpa)` -> ("rhel", "8.8")
/// - `Rocky Linux release 9.3 (Blue Onyx)` -> ("rocky", "9.3")
pub(crate) fn parse_redhat_release(content: &str) -> Option<(String, String)> {
    let re = Regex::new(r"release\s+(\d+(?:\.\d+)*)").expect("Invalid release regex");
    let version = re.captures(content)?.get(1)?.as_str().to_string();

    let lower = content.to_lowercase();
    let id = if lower.starts_with("red hat") {
        "rhel"
    } else if lower.starts_with("rocky") {
        "rocky"
    } else if lower.starts_with("almalinux") {
        "almalinux"
    } else if lower.starts_with("fedora") {
        "fedora"
    } else {
        "centos"
    };
    Some((id.to_string(), version))
}

/// Map an Ubuntu version to its codename.
pub(crate) fn ubuntu_codename(version: &str) -> Option<&'static str> {
    match version {
        v if v.starts_with("18.04") => Some("bionic"),
        v if v.starts_with("20.04") => Some("focal"),
        v if v.starts_with("22.04") => Some("jammy"),
        v if v.starts_with("24.04") => Some("noble"),
        _ => None,
    }
}

/// Map a Debian version (`12`, `12.5`, `bookworm/sid`) to its codename.
pub(crate) fn debian_codename(version: &str) -> Option<&'static str> {
    let major = version.split(['.', '/']).next().unwrap_or("");
    match major {
        "10" | "buster" => Some("buster"),
        "11" | "bullseye" => Some("bullseye"),
        "12" | "bookworm" => Some("bookworm"),
        _ => None,
    }
}

/// Codename assumed when a Ubuntu/Debian host's release cannot be resolved.
pub(crate) fn default_codename(os_id: &str) -> Option<&'static str> {
    match os_id {
        "ubuntu" => Some("jammy"),
        "debian" => Some("bookworm"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_os_release() {
        let content = r#"
PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
# comment
ID=ubuntu
ID_LIKE=debian
VERSION_CODENAME=jammy
"#;
        let map = parse_key_values(content);
        assert_eq!(map.get("ID").map(String::as_str), Some("ubuntu"));
        assert_eq!(map.get("VERSION_ID").map(String::as_str), Some("22.04"));
        assert_eq!(map.get("VERSION_CODENAME").map(String::as_str), Some("jammy"));
        assert_eq!(
            map.get("PRETTY_NAME").map(String::as_str),
            Some("Ubuntu 22.04.3 LTS")
        );
    }

    #[test]
    fn test_parse_single_quoted_value() {
        let map = parse_key_values("ID='alpine'\n");
        assert_eq!(map.get("ID").map(String::as_str), Some("alpine"));
    }

    #[test]
    fn test_parse_redhat_release() {
        assert_eq!(
            parse_redhat_release("CentOS Linux release 7.9.2009 (Core)"),
            Some(("centos".to_string(), "7.9.2009".to_string()))
        );
        assert_eq!(
            parse_redhat_release("Red Hat Enterprise Linux release 8.8 (Ootpa)"),
            Some(("rhel".to_string(), "8.8".to_string()))
        );
        assert_eq!(
            parse_redhat_release("Rocky Linux release 9.3 (Blue Onyx)"),
            Some(("rocky".to_string(), "9.3".to_string()))
        );
        assert_eq!(parse_redhat_release("garbage"), None);
    }

    #[test]
    fn test_ubuntu_codenames() {
        assert_eq!(ubuntu_codename("22.04"), Some("jammy"));
        assert_eq!(ubuntu_codename("20.04.6"), Some("focal"));
        assert_eq!(ubuntu_codename("23.10"), None);
    }

    #[test]
    fn test_debian_codenames() {
        assert_eq!(debian_codename("12"), Some("bookworm"));
        assert_eq!(debian_codename("11.8"), Some("bullseye"));
        assert_eq!(debian_codename("bookworm/sid"), Some("bookworm"));
        assert_eq!(debian_codename("9"), None);
    }
}
