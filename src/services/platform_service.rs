//! Platform detection and sanitation.
//!
//! Maps client-supplied platform labels and User-Agent strings onto the
//! platform labels artifacts are published under. A 64-bit request also
//! accepts the 32-bit build of the same OS, so sanitation expands `*_64`
//! labels with their `*_32` sibling.

/// Platform labels artifacts can be published under.
pub const AVAILABLE_PLATFORMS: &[&str] = &[
    "linux_32",
    "linux_64",
    "osx_64",
    "windows_32",
    "windows_64",
];

/// Normalize a single raw platform label to `{os}_{arch}` form.
///
/// Returns `None` for labels that map to no known platform.
fn normalize(raw: &str) -> Option<String> {
    let label = raw.trim().to_lowercase().replace('-', "_");
    let (os_part, arch_part) = match label.rfind('_') {
        Some(idx) => (&label[..idx], Some(&label[idx + 1..])),
        None => (label.as_str(), None),
    };

    let os = match os_part {
        "windows" | "win" | "win32" | "win64" => "windows",
        "osx" | "mac" | "macos" | "darwin" | "dmg" => "osx",
        "linux" | "ubuntu" | "debian" | "fedora" | "appimage" => "linux",
        // A bare arch-suffixed alias like "win32" never reaches here, but a
        // label with no recognizable OS does.
        _ => return None,
    };

    let arch = match (os_part, arch_part) {
        (_, Some("32") | Some("x32") | Some("ia32") | Some("i386")) => "32",
        (_, Some("64") | Some("x64") | Some("x86_64") | Some("amd64")) => "64",
        ("win32", _) => "32",
        // Default to 64-bit when the request does not say.
        _ => "64",
    };

    // macOS ships 64-bit only.
    let arch = if os == "osx" { "64" } else { arch };

    let platform = format!("{}_{}", os, arch);
    if AVAILABLE_PLATFORMS.contains(&platform.as_str()) {
        Some(platform)
    } else {
        None
    }
}

/// Sanitize an explicit platform list: normalize aliases, drop unknown
/// labels, and expand 64-bit labels with their 32-bit sibling. Order is
/// preserved and duplicates removed, so more specific requests rank first.
pub fn sanitize(platforms: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for raw in platforms {
        if let Some(platform) = normalize(raw) {
            if !result.contains(&platform) {
                result.push(platform.clone());
            }
            if let Some(os) = platform.strip_suffix("_64") {
                let sibling = format!("{}_32", os);
                if AVAILABLE_PLATFORMS.contains(&sibling.as_str()) && !result.contains(&sibling) {
                    result.push(sibling);
                }
            }
        }
    }
    result
}

/// Detect the client's platform set from its User-Agent string.
///
/// Returns `None` when nothing recognizable is present; callers must treat
/// that as a reportable failure, not an empty match.
pub fn detect_from_user_agent(user_agent: &str) -> Option<Vec<String>> {
    let ua = user_agent.to_lowercase();

    let platform = if ua.contains("windows") || ua.contains("win32") || ua.contains("win64") {
        let sixty_four =
            ua.contains("win64") || ua.contains("wow64") || ua.contains("x64") || ua.contains("x86_64");
        if sixty_four {
            "windows_64"
        } else {
            "windows_32"
        }
    } else if ua.contains("mac os") || ua.contains("macintosh") || ua.contains("darwin") {
        "osx_64"
    } else if ua.contains("linux") || ua.contains("x11") {
        let thirty_two = ua.contains("i686") || ua.contains("i386");
        if thirty_two {
            "linux_32"
        } else {
            "linux_64"
        }
    } else {
        return None;
    };

    Some(sanitize(&[platform.to_string()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_expands_64_with_32_sibling() {
        assert_eq!(
            sanitize(&labels(&["windows_64"])),
            vec!["windows_64", "windows_32"]
        );
        assert_eq!(sanitize(&labels(&["linux_64"])), vec!["linux_64", "linux_32"]);
    }

    #[test]
    fn test_sanitize_32_bit_stays_narrow() {
        assert_eq!(sanitize(&labels(&["windows_32"])), vec!["windows_32"]);
    }

    #[test]
    fn test_sanitize_maps_aliases() {
        assert_eq!(sanitize(&labels(&["darwin"])), vec!["osx_64"]);
        assert_eq!(sanitize(&labels(&["win32"])), vec!["windows_32"]);
        assert_eq!(sanitize(&labels(&["mac-os"])), vec!["osx_64"]);
    }

    #[test]
    fn test_sanitize_defaults_missing_arch_to_64() {
        assert_eq!(
            sanitize(&labels(&["windows"])),
            vec!["windows_64", "windows_32"]
        );
    }

    #[test]
    fn test_sanitize_drops_unknown_labels() {
        assert!(sanitize(&labels(&["freebsd_64", "solaris"])).is_empty());
    }

    #[test]
    fn test_sanitize_deduplicates_preserving_order() {
        assert_eq!(
            sanitize(&labels(&["windows_64", "windows_32", "win64"])),
            vec!["windows_64", "windows_32"]
        );
    }

    #[test]
    fn test_detect_windows_64() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
        assert_eq!(
            detect_from_user_agent(ua),
            Some(vec!["windows_64".to_string(), "windows_32".to_string()])
        );
    }

    #[test]
    fn test_detect_windows_32() {
        let ua = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36";
        assert_eq!(
            detect_from_user_agent(ua),
            Some(vec!["windows_32".to_string()])
        );
    }

    #[test]
    fn test_detect_macos() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";
        assert_eq!(detect_from_user_agent(ua), Some(vec!["osx_64".to_string()]));
    }

    #[test]
    fn test_detect_linux() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64)";
        assert_eq!(
            detect_from_user_agent(ua),
            Some(vec!["linux_64".to_string(), "linux_32".to_string()])
        );
    }

    #[test]
    fn test_detect_unknown_is_none() {
        assert_eq!(detect_from_user_agent("curl/8.0.1"), None);
    }
}
