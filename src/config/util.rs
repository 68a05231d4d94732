//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found
///
/// # Example
/// ```text
/// /home/user/game/src/render/   ← start
/// /home/user/game/hotloop.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/render");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("hotloop.toml"), "").unwrap();

        let found = find_config_file(Path::new("hotloop.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("hotloop.toml"));
    }

    #[test]
    fn test_find_config_file_prefers_nearest() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("hotloop.toml"), "").unwrap();
        fs::write(nested.join("hotloop.toml"), "").unwrap();

        let found = find_config_file(Path::new("hotloop.toml"), &nested).unwrap();
        assert_eq!(found, nested.join("hotloop.toml"));
    }

    #[test]
    fn test_find_config_file_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("hotloop-missing.toml")).unwrap();
        assert!(find_config_file(Path::new("hotloop-missing.toml"), dir.path()).is_none());
    }

    #[test]
    fn test_find_config_file_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
