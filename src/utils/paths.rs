use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `relative` (`.` dropped, `..` popped). `None` when the
/// path is absolute or climbs above its starting point.
pub fn normalize_relative(relative: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

/// Resolves `relative` under `base`, refusing anything that lands outside it.
///
/// The check is done on path components, first lexically and then again on
/// the canonical form of the deepest existing ancestor so that symlinks
/// pointing out of `base` are refused too.
pub fn resolve_within(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = relative.trim().trim_start_matches(|c: char| c == '/' || c == '\\');
    let target = base.join(normalize_relative(Path::new(relative))?);

    let Ok(canonical_base) = base.canonicalize() else {
        // Nothing exists yet, so nothing can be a symlink either.
        return Some(target);
    };

    let mut existing = target.as_path();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return canonical.starts_with(&canonical_base).then_some(target);
        }
        existing = existing.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_normalization() {
        assert_eq!(
            normalize_relative(Path::new("a/./b/../c")),
            Some(PathBuf::from("a/c"))
        );
        assert_eq!(normalize_relative(Path::new(".")), Some(PathBuf::new()));
        assert_eq!(normalize_relative(Path::new("a/../..")), None);
        assert_eq!(normalize_relative(Path::new("/etc")), None);
    }

    #[test]
    fn stays_inside_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        std::fs::create_dir(base.join("notes")).unwrap();

        assert_eq!(resolve_within(base, "notes"), Some(base.join("notes")));
        assert_eq!(resolve_within(base, "/notes/new"), Some(base.join("notes/new")));
        assert_eq!(resolve_within(base, "."), Some(base.to_path_buf()));
        assert_eq!(resolve_within(base, "../outside"), None);
        assert_eq!(resolve_within(base, "notes/../../x"), None);
    }

    #[test]
    fn sibling_with_common_prefix_is_outside() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("data");
        std::fs::create_dir(&base).unwrap();
        std::fs::create_dir(dir.path().join("data-other")).unwrap();
        assert_eq!(resolve_within(&base, "../data-other"), None);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("data");
        let outside = dir.path().join("outside");
        std::fs::create_dir(&base).unwrap();
        std::fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, base.join("link")).unwrap();

        assert_eq!(resolve_within(&base, "link"), None);
        assert_eq!(resolve_within(&base, "link/new-dir"), None);
    }
}
