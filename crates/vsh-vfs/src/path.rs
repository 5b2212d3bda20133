//! Path resolution.
//!
//! Turns a raw user-typed path plus the current working path into a
//! canonical `~`-anchored path string. `.` and `..` segments are kept
//! literally and never normalized; they simply fail to resolve in the
//! store. The tests below pin that behavior.

/// Resolve a raw path against the current working path.
///
/// - empty or `~` resolves to `~`
/// - a `~`-prefixed path is already anchored and returned unchanged
/// - a `/`-prefixed path is rooted under home (`~` + path), since the
///   tree has no separate filesystem root
/// - anything else is joined onto the current working path
pub fn resolve(raw: &str, cwd: &str) -> String {
    if raw.is_empty() || raw == "~" {
        return "~".to_string();
    }
    if raw.starts_with('~') {
        return raw.to_string();
    }
    if raw.starts_with('/') {
        return format!("~{raw}");
    }
    if cwd == "~" {
        format!("~/{raw}")
    } else {
        format!("{cwd}/{raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_home() {
        assert_eq!(resolve("", "~"), "~");
        assert_eq!(resolve("~", "~/documents"), "~");
    }

    #[test]
    fn anchored_paths_pass_through() {
        assert_eq!(resolve("~/documents/a.txt", "~/other"), "~/documents/a.txt");
    }

    #[test]
    fn absolute_paths_root_under_home() {
        assert_eq!(resolve("/etc/hosts", "~/documents"), "~/etc/hosts");
    }

    #[test]
    fn relative_joins_cwd() {
        assert_eq!(resolve("a.txt", "~"), "~/a.txt");
        assert_eq!(resolve("a.txt", "~/documents"), "~/documents/a.txt");
        assert_eq!(resolve("sub/dir", "~/documents"), "~/documents/sub/dir");
    }

    #[test]
    fn dot_segments_are_not_normalized() {
        // Documented gap: `.` and `..` are kept literally.
        assert_eq!(resolve("..", "~/documents"), "~/documents/..");
        assert_eq!(resolve("./a", "~"), "~/./a");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resolved_is_always_home_anchored(
                raw in "[a-z0-9./~_-]{0,24}",
                cwd_tail in "[a-z0-9/_-]{0,16}",
            ) {
                let cwd = if cwd_tail.is_empty() {
                    "~".to_string()
                } else {
                    format!("~/{cwd_tail}")
                };
                let resolved = resolve(&raw, &cwd);
                prop_assert!(resolved.starts_with('~'), "not anchored: {resolved}");
            }

            #[test]
            fn home_anchored_inputs_are_fixed_points(tail in "[a-z0-9/_.-]{1,24}") {
                let raw = format!("~/{tail}");
                let resolved = resolve(&raw, "~/anywhere");
                prop_assert_eq!(resolved.clone(), raw);
                // Resolving an already-canonical path changes nothing.
                prop_assert_eq!(resolve(&resolved, "~"), resolved);
            }
        }
    }
}
