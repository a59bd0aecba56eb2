//! Profile images on disk.
//!
//! Each uploaded image belongs to exactly one student and is named after them. Students without an upload
//! point at the shared default image, which this module never deletes.

use crate::{
    config::AssetConfig,
    error::{CreateDirectorySnafu, RemoveImageSnafu, RosterResult, WriteImageSnafu},
};
use axum::body::Bytes;
use snafu::ResultExt;
use std::{io::ErrorKind, path::PathBuf, sync::Arc};

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    ///browsers send an empty, nameless part when no file was picked
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() || self.bytes.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ImageAssets {
    upload_dir: PathBuf,
    default_image: Arc<str>,
}

impl ImageAssets {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            default_image: config.default_image.as_str().into(),
        }
    }

    pub fn default_image(&self) -> &str {
        &self.default_image
    }

    ///writes the upload (if there is one) and returns the path to store for the student
    pub async fn store(&self, idno: i64, upload: Option<UploadedFile>) -> RosterResult<String> {
        let Some(upload) = upload.filter(|upload| !upload.is_empty()) else {
            return Ok(self.default_image.to_string());
        };

        let file_name = sanitise_file_name(&format!("{idno}_{}", upload.file_name));
        if file_name.is_empty() {
            warn!(
                original = ?upload.file_name,
                "Upload name sanitised to nothing, using default image"
            );
            return Ok(self.default_image.to_string());
        }

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .context(CreateDirectorySnafu {
                path: &self.upload_dir,
            })?;

        let path = self.upload_dir.join(file_name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .context(WriteImageSnafu { path: &path })?;

        info!(?path, idno, bytes = upload.bytes.len(), "Stored profile image");
        Ok(path.to_string_lossy().replace('\\', "/"))
    }

    ///swaps `old_path` for the upload, or keeps `old_path` when nothing was uploaded
    pub async fn replace(
        &self,
        idno: i64,
        old_path: &str,
        upload: Option<UploadedFile>,
    ) -> RosterResult<String> {
        match upload.filter(|upload| !upload.is_empty()) {
            Some(upload) => {
                self.remove(old_path).await?;
                self.store(idno, Some(upload)).await
            }
            None => Ok(old_path.to_string()),
        }
    }

    ///missing files count as already removed
    pub async fn remove(&self, path: &str) -> RosterResult<()> {
        if path.is_empty() || path == &*self.default_image {
            return Ok(());
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(?path, "Removed profile image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "Profile image already gone");
                Ok(())
            }
            Err(e) => Err(e).context(RemoveImageSnafu { path }),
        }
    }
}

///only keeps ASCII alphanumerics and `._-`, with separators and whitespace collapsed into `_`
pub fn sanitise_file_name(name: &str) -> String {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept = joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
        .collect::<String>();

    kept.trim_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn assets_in(dir: &Path) -> ImageAssets {
        ImageAssets::new(&AssetConfig {
            static_dir: dir.to_path_buf(),
            upload_dir: dir.join("uploads"),
            default_image: dir.join("account.jpg").to_string_lossy().into_owned(),
        })
    }

    fn upload(file_name: &str, bytes: &'static [u8]) -> Option<UploadedFile> {
        Some(UploadedFile {
            file_name: file_name.to_string(),
            bytes: Bytes::from_static(bytes),
        })
    }

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(sanitise_file_name("101_me.png"), "101_me.png");
        assert_eq!(sanitise_file_name("101_my photo.jpg"), "101_my_photo.jpg");
        assert_eq!(
            sanitise_file_name("101_../../etc/passwd"),
            "101_.._.._etc_passwd"
        );
        assert_eq!(sanitise_file_name("..\\secret.txt"), "secret.txt");
        assert_eq!(sanitise_file_name("führer <script>.png"), "fhrer_script.png");
        assert_eq!(sanitise_file_name("/../"), "");
    }

    #[tokio::test]
    async fn store_writes_into_the_upload_dir() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());

        let path = assets.store(101, upload("me.png", b"png!")).await.unwrap();

        assert_eq!(
            path,
            dir.path()
                .join("uploads")
                .join("101_me.png")
                .to_string_lossy()
                .replace('\\', "/")
        );
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png!");
    }

    #[tokio::test]
    async fn store_without_a_file_gives_the_default() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());

        assert_eq!(assets.store(1, None).await.unwrap(), assets.default_image());
        assert_eq!(
            assets.store(1, upload("", b"")).await.unwrap(),
            assets.default_image()
        );
        assert_eq!(
            assets.store(1, upload("empty.png", b"")).await.unwrap(),
            assets.default_image()
        );
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn traversal_stays_inside_the_upload_dir() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());

        let path = assets
            .store(7, upload("../../escape.png", b"x"))
            .await
            .unwrap();

        assert_eq!(
            Path::new(&path).parent().unwrap(),
            dir.path().join("uploads")
        );
    }

    #[tokio::test]
    async fn replace_without_a_file_keeps_the_old_path() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());
        let old = assets.store(3, upload("old.png", b"old")).await.unwrap();

        let kept = assets.replace(3, &old, None).await.unwrap();

        assert_eq!(kept, old);
        assert!(Path::new(&old).exists());
    }

    #[tokio::test]
    async fn replace_removes_the_old_upload() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());
        let old = assets.store(3, upload("old.png", b"old")).await.unwrap();

        let new = assets
            .replace(3, &old, upload("new.png", b"new"))
            .await
            .unwrap();

        assert!(!Path::new(&old).exists());
        assert_eq!(tokio::fs::read(&new).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn replace_never_removes_the_default() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());
        tokio::fs::write(assets.default_image(), b"default")
            .await
            .unwrap();

        let default = assets.default_image().to_string();
        assets
            .replace(3, &default, upload("new.png", b"new"))
            .await
            .unwrap();

        assert!(Path::new(&default).exists());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());
        let path = assets.store(9, upload("me.png", b"me")).await.unwrap();

        assets.remove(&path).await.unwrap();
        assets.remove(&path).await.unwrap();

        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn remove_skips_the_default() {
        let dir = TempDir::new().unwrap();
        let assets = assets_in(dir.path());
        tokio::fs::write(assets.default_image(), b"default")
            .await
            .unwrap();

        assets.remove(assets.default_image()).await.unwrap();

        assert!(Path::new(assets.default_image()).exists());
    }
}
