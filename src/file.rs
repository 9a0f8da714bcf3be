use crate::assets::{SNIFF_LENGTH, sniff};
use anyhow::{Context, Result, bail};
use mime_guess::from_path;
use std::{
    fs::File as FsFile,
    io::{self, Read},
    path::{Path, PathBuf},
};

/// A file shared at startup. Existence is checked once, here.
#[derive(Debug, Clone)]
pub struct File {
    pub path: PathBuf,
    pub content_type: String,
    pub size: u64,
}

impl File {
    pub fn new(path: PathBuf) -> Result<Self> {
        let metadata = path
            .metadata()
            .with_context(|| format!("Could not share {}", path.display()))?;

        if !metadata.is_file() {
            bail!("Could not share {}: not a regular file", path.display());
        }

        let content_type = match from_path(&path).first() {
            Some(mime) => mime.essence_str().to_string(),
            None => Self::sniff_head(&path)
                .with_context(|| format!("Could not read {}", path.display()))?
                .to_string(),
        };

        Ok(Self {
            path,
            content_type,
            size: metadata.len(),
        })
    }

    /// Opens the file for a single response; nothing is cached.
    pub fn open(&self) -> io::Result<FsFile> {
        FsFile::open(&self.path)
    }

    fn sniff_head(path: &Path) -> io::Result<&'static str> {
        let mut head = Vec::with_capacity(SNIFF_LENGTH);
        FsFile::open(path)?
            .take(SNIFF_LENGTH as u64)
            .read_to_end(&mut head)?;

        Ok(sniff(&head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir, write};
    use tempfile::tempdir;

    #[test]
    fn type_from_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        write(&path, b"not really a pdf").unwrap();

        let file = File::new(path).unwrap();

        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.size, 16);
    }

    #[test]
    fn type_sniffed_without_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        write(&path, b"plain words").unwrap();

        assert_eq!(
            File::new(path).unwrap().content_type,
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn missing_and_directory_paths_are_rejected() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        create_dir(&nested).unwrap();

        assert!(File::new(dir.path().join("ghost.txt")).is_err());
        assert!(File::new(nested).is_err());
    }
}
