//! Local filesystem adapter using std::fs, rooted at the project directory.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stratum_core::application::ApplicationError;
use stratum_core::application::ports::{Filesystem, WriteMode};
use stratum_core::error::{StratumError, StratumResult};

/// Production filesystem. Every path handed to it is relative to `root`.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn read_file(&self, path: &Path) -> StratumResult<String> {
        std::fs::read_to_string(self.resolve(path)).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str, mode: WriteMode) -> StratumResult<()> {
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::CreateNew => options.write(true).create_new(true),
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };

        let mut file = options.open(self.resolve(path)).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                ApplicationError::FileExists {
                    path: path.to_path_buf(),
                }
                .into()
            } else {
                map_io_error(path, e, "open file")
            }
        })?;

        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "write file"))
    }

    fn create_dir_all(&self, path: &Path) -> StratumResult<()> {
        std::fs::create_dir_all(self.resolve(path))
            .map_err(|e| map_io_error(path, e, "create directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StratumError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_are_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(dir.path());

        fs.create_dir_all(Path::new("config/samples")).unwrap();
        fs.write_file(Path::new("config/samples/a.yaml"), "a", WriteMode::CreateNew)
            .unwrap();

        assert!(dir.path().join("config/samples/a.yaml").is_file());
        assert!(fs.exists(Path::new("config/samples/a.yaml")));
        assert_eq!(fs.read_file(Path::new("config/samples/a.yaml")).unwrap(), "a");
    }

    #[test]
    fn write_modes() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(dir.path());
        let file = Path::new("f.txt");

        fs.write_file(file, "one\n", WriteMode::CreateNew).unwrap();
        let err = fs.write_file(file, "x", WriteMode::CreateNew).unwrap_err();
        assert!(matches!(
            err,
            StratumError::Application(ApplicationError::FileExists { .. })
        ));

        fs.write_file(file, "two\n", WriteMode::Append).unwrap();
        assert_eq!(fs.read_file(file).unwrap(), "one\ntwo\n");

        fs.write_file(file, "three\n", WriteMode::Truncate).unwrap();
        assert_eq!(fs.read_file(file).unwrap(), "three\n");
    }

    #[test]
    fn read_missing_file_is_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new(dir.path());

        let err = fs.read_file(Path::new("nope")).unwrap_err();
        assert!(matches!(
            err,
            StratumError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
