use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::FrameSource;

/// Replays the JPEG files of a directory in name order.
pub struct DirFrames {
    files: Vec<PathBuf>,
    next: usize,
    looping: bool,
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

impl DirFrames {
    pub fn open(dir: impl AsRef<Path>, looping: bool) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("reading frames dir {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_jpeg(&path) {
                files.push(path);
            }
        }
        files.sort();
        debug!(dir = %dir.display(), frames = files.len(), "frame directory opened");
        Ok(Self {
            files,
            next: 0,
            looping,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl FrameSource for DirFrames {
    async fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.files.is_empty() {
            return Ok(None);
        }
        if self.next >= self.files.len() {
            if !self.looping {
                return Ok(None);
            }
            self.next = 0;
        }
        let path = &self.files[self.next];
        self.next += 1;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading frame {}", path.display()))?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_jpegs_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"second").unwrap();
        std::fs::write(dir.path().join("a.JPEG"), b"first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();

        let mut frames = DirFrames::open(dir.path(), false).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.next_frame().await.unwrap().unwrap(), b"first");
        assert_eq!(frames.next_frame().await.unwrap().unwrap(), b"second");
        assert!(frames.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn looping_source_wraps_around() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.jpg"), b"frame").unwrap();

        let mut frames = DirFrames::open(dir.path(), true).unwrap();
        for _ in 0..3 {
            assert_eq!(frames.next_frame().await.unwrap().unwrap(), b"frame");
        }
    }

    #[tokio::test]
    async fn empty_dir_ends_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut frames = DirFrames::open(dir.path(), true).unwrap();
        assert!(frames.is_empty());
        assert!(frames.next_frame().await.unwrap().is_none());
    }

    #[test]
    fn missing_dir_is_an_error() {
        assert!(DirFrames::open("/definitely/not/here", false).is_err());
    }
}
