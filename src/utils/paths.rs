use crate::utils::error::{ArloaderError, Result};
use glob::glob;
use std::path::{Path, PathBuf};

/// Expands a glob pattern into the regular files it matches, sorted.
pub fn paths_from_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(ArloaderError::NoFilesFound {
            pattern: pattern.to_string(),
        });
    }

    paths.sort();
    Ok(paths)
}

pub fn total_size(paths: &[PathBuf]) -> Result<u64> {
    paths.iter().try_fold(0u64, |acc, p| Ok(acc + p.metadata()?.len()))
}

/// Glob matching every `.json` file directly inside `dir`.
pub fn json_glob(dir: &Path) -> String {
    format!("{}/*.json", dir.display().to_string().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_from_glob_only_returns_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.png"), b"bb").unwrap();
        std::fs::write(temp_dir.path().join("a.png"), b"a").unwrap();
        std::fs::create_dir(temp_dir.path().join("dir.png")).unwrap();

        let pattern = format!("{}/*.png", temp_dir.path().display());
        let paths = paths_from_glob(&pattern).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.png"));
        assert_eq!(total_size(&paths).unwrap(), 3);
    }

    #[test]
    fn test_paths_from_glob_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.gif", temp_dir.path().display());
        let err = paths_from_glob(&pattern).unwrap_err();
        assert!(matches!(err, ArloaderError::NoFilesFound { .. }));
    }

    #[test]
    fn test_json_glob_trims_trailing_slash() {
        assert_eq!(json_glob(Path::new("logs/")), "logs/*.json");
        assert_eq!(json_glob(Path::new("logs")), "logs/*.json");
    }
}
