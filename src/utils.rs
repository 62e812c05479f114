use crate::report::error::ReportError;
use log::info;
use std::io;
use std::path::Path;

/// Creates `path` (and its parents) if missing; fails if it exists as a file.
pub fn ensure_output_dir_exists(path: &Path) -> Result<(), ReportError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ReportError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            std::fs::create_dir_all(path)
                .map_err(|e| ReportError::OutputDir(path.to_path_buf(), e))
        }
        Err(e) => Err(ReportError::OutputDir(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_nested_directories() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let target = root.path().join("a").join("b");
        ensure_output_dir_exists(&target)?;
        assert!(target.is_dir());
        // Existing directory is fine.
        ensure_output_dir_exists(&target)?;
        Ok(())
    }

    #[test]
    fn rejects_a_file_path() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let file = root.path().join("artifact.csv");
        std::fs::write(&file, "x")?;
        assert!(matches!(
            ensure_output_dir_exists(&file),
            Err(ReportError::NotADirectory(_))
        ));
        Ok(())
    }
}
