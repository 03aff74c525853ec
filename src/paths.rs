//! Path helpers shared by the discussion and workflow tools.
//!
//! Paths typed by users often arrive wrapped in quotes (copied from a file
//! manager) or start with `~`. `normalize_path` is the single place that
//! cleans them up.

use std::path::{Component, Path, PathBuf};

/// Trim whitespace and surrounding quotes, expand a leading `~` and drop `.`
/// components. Returns `None` for blank input.
pub fn normalize_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if trimmed.is_empty() {
        return None;
    }

    let expanded = match trimmed.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
                None => PathBuf::from(trimmed),
            }
        }
        _ => PathBuf::from(trimmed),
    };

    Some(clean(&expanded))
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Wrap a path in 「」 the way paths are quoted inside prompts.
pub fn quote(path: &Path) -> String {
    format!("「{}」", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_none() {
        assert_eq!(normalize_path(""), None);
        assert_eq!(normalize_path("  \"\" "), None);
    }

    #[test]
    fn strips_quotes_and_dots() {
        assert_eq!(
            normalize_path(" \"/tmp/./a/b\" "),
            Some(PathBuf::from("/tmp/a/b"))
        );
        assert_eq!(normalize_path("'/tmp/a/../c'"), Some(PathBuf::from("/tmp/c")));
    }

    #[test]
    fn expands_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(normalize_path("~/notes"), Some(home.join("notes")));
        }
    }

    #[test]
    fn quote_uses_corner_brackets() {
        assert_eq!(quote(Path::new("/x/第1輪")), "「/x/第1輪」");
    }
}
