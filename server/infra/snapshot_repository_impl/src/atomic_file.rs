use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

fn staging_path_for(target: &Path) -> PathBuf {
    let mut file_name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    file_name.push(".tmp");
    target.with_file_name(file_name)
}

/// Contents written and synced next to their destination, not yet visible
/// under the destination name.
#[derive(Debug)]
pub(crate) struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Replaces `target` in one rename, so readers see either the old or the
    /// new contents.
    pub(crate) async fn install(self, target: &Path) -> io::Result<()> {
        let result = tokio::fs::rename(&self.path, target).await;
        if result.is_err() {
            self.discard().await;
        }
        result
    }

    pub(crate) async fn discard(self) {
        if let Err(error) = tokio::fs::remove_file(&self.path).await {
            tracing::debug!(path = %self.path.display(), %error, "could not remove staged file");
        }
    }
}

pub(crate) async fn stage(target: &Path, contents: &[u8]) -> io::Result<StagedFile> {
    let path = staging_path_for(target);

    let written = async {
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;

    let staged = StagedFile { path };
    match written {
        Ok(()) => Ok(staged),
        Err(error) => {
            staged.discard().await;
            Err(error)
        }
    }
}

pub(crate) async fn write_atomically(target: &Path, contents: &[u8]) -> io::Result<()> {
    stage(target, contents).await?.install(target).await
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn staging_file_sits_next_to_target() {
        assert_eq!(
            staging_path_for(Path::new("/data/players-new.json")),
            PathBuf::from("/data/players-new.json.tmp")
        );
    }

    #[tokio::test]
    async fn staged_contents_appear_only_after_install() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.json");
        tokio::fs::write(&target, b"old").await.unwrap();

        let staged = stage(&target, b"new").await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"old");

        staged.install(&target).await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"new");
        assert!(!staging_path_for(&target).exists());
    }
}
