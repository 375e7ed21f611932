//! Path normalization for reported file names.

use std::path::Path;

use crate::AnatomistError;

/// Normalizes a file path to a canonical UTF-8 string with forward slashes.
///
/// Canonicalizes with `dunce` (no `\\?\` prefix on Windows), so the file must exist.
///
/// # Errors
/// - `AnatomistError::IoError` if canonicalization fails
/// - `AnatomistError::ParseFailure` if the path is not UTF-8
pub fn normalize_path(path: &Path) -> Result<String, AnatomistError> {
    let canonical = dunce::canonicalize(path)?;
    let s = canonical.to_str().ok_or_else(|| {
        AnatomistError::ParseFailure(format!("Non-UTF-8 path: {}", canonical.display()))
    })?;
    Ok(s.replace('\\', "/"))
}

/// Renders `path` relative to `base` when it lies underneath it, for compact reports.
///
/// Falls back to the path as given (forward slashes) when either side cannot be
/// canonicalized or `path` is outside `base`.
pub fn display_path(path: &Path, base: &Path) -> String {
    let relative = match (dunce::canonicalize(path), dunce::canonicalize(base)) {
        (Ok(p), Ok(b)) => p.strip_prefix(&b).map(Path::to_path_buf).ok(),
        _ => None,
    };
    relative
        .as_deref()
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_normalize_path_cargo_manifest() {
        let cargo_manifest = std::env::var("CARGO_MANIFEST_DIR")
            .map(|dir| Path::new(&dir).join("Cargo.toml"))
            .unwrap();

        let normalized = normalize_path(&cargo_manifest).unwrap();
        assert!(normalized.contains('/'));
        assert!(normalized.ends_with("Cargo.toml"));
        assert!(!normalized.contains('\\'));
    }

    #[test]
    fn test_normalize_nonexistent_path() {
        let result = normalize_path(Path::new("/this/does/not/exist/Nowhere.kt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_display_path_relative() {
        let tmp = std::env::temp_dir().join("kolint_display_path");
        fs::create_dir_all(tmp.join("src")).ok();
        let file = tmp.join("src/Main.kt");
        fs::write(&file, "").ok();

        assert_eq!(display_path(&file, &tmp), "src/Main.kt");

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn test_display_path_outside_base() {
        let missing = Path::new("no/such/File.kt");
        assert_eq!(display_path(missing, Path::new(".")), "no/such/File.kt");
    }
}
