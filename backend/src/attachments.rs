use chrono::Utc;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::info;

use crate::error::{Error, Result};

const FALLBACK_NAME: &str = "attachment";
const MAX_ATTEMPTS: usize = 1000;

/// Writes uploaded files to a directory that is served under `/uploads`
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    directory: PathBuf,
}

/// keep only the last path component of a client supplied file name
pub(crate) fn sanitize_name(original: &str) -> &str {
    let name = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME
    } else {
        name
    }
}

/// `<unix millis>-<name>`, with `_<n>` before the extension when `attempt > 1`
pub(crate) fn stored_name(millis: i64, original: &str, attempt: usize) -> String {
    let name = sanitize_name(original);

    if attempt <= 1 {
        return format!("{millis}-{name}");
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{millis}-{}_{attempt}{}", &name[..dot], &name[dot..]),
        _ => format!("{millis}-{name}_{attempt}"),
    }
}

impl AttachmentStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        AttachmentStore {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub async fn ensure_directory(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;

        Ok(())
    }

    /// write the content to a new file, returns the stored file name
    pub async fn store(&self, original: &str, content: &[u8]) -> Result<String> {
        let millis = Utc::now().timestamp_millis();

        for attempt in 1..=MAX_ATTEMPTS {
            let name = stored_name(millis, original, attempt);
            let path = self.directory.join(&name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(content).await?;
                    file.flush().await?;

                    info!("stored attachment {name} ({} bytes)", content.len());

                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for attachment {original}"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn names_are_prefixed_with_the_timestamp() {
        assert_eq!(
            stored_name(1737364200000, "report.pdf", 1),
            "1737364200000-report.pdf"
        );
        assert_eq!(
            stored_name(1737364200000, "report.pdf", 3),
            "1737364200000-report_3.pdf"
        );
        assert_eq!(stored_name(1, "README", 2), "1-README_2");
        assert_eq!(stored_name(1, ".env", 2), "1-.env_2");
    }

    #[test]
    fn directories_are_stripped_from_names() {
        assert_eq!(sanitize_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(sanitize_name("photo.png"), "photo.png");
        assert_eq!(sanitize_name(""), "attachment");
        assert_eq!(sanitize_name("uploads/"), "attachment");
        assert_eq!(sanitize_name(".."), "attachment");
    }

    #[tokio::test]
    async fn store_writes_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(temp_dir.path().join("uploads"));
        store.ensure_directory().await.unwrap();

        let name = store.store("notes.txt", b"hello").await.unwrap();
        assert!(name.ends_with("-notes.txt"));
        assert_eq!(
            std::fs::read(store.directory().join(&name)).unwrap(),
            b"hello"
        );
    }

    #[tokio::test]
    async fn url_reserved_characters_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(temp_dir.path());

        assert_eq!(sanitize_name("q4#1?.pdf"), "q4#1?.pdf");

        let name = store.store("50% off #2.txt", b"sale").await.unwrap();
        assert!(name.ends_with("-50% off #2.txt"));
        assert_eq!(std::fs::read(temp_dir.path().join(&name)).unwrap(), b"sale");
    }

    #[tokio::test]
    async fn store_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(temp_dir.path());

        let first = store.store("same.txt", b"first").await.unwrap();
        let second = store.store("same.txt", b"second").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(temp_dir.path().join(&first)).unwrap(), b"first");
        assert_eq!(
            std::fs::read(temp_dir.path().join(&second)).unwrap(),
            b"second"
        );
    }
}
