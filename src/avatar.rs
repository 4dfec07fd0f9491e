//! Avatar file storage.
//!
//! Uploaded doctor avatars live under `<root>/Upload/img/` and are named
//! `doctor<ID><ext>`, so a new upload for the same doctor and extension
//! overwrites the previous one. The database stores the path relative to
//! the storage root (`Upload/img/doctor1234567890.png`), which is also the
//! URL path the API serves it from.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Directory (relative to the storage root) that holds avatar images.
pub const AVATAR_SUBDIR: &str = "Upload/img";

/// File name prefix for stored avatars.
const AVATAR_PREFIX: &str = "doctor";

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Avatar file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Avatar upload is empty")]
    EmptyUpload,

    #[error("Avatar path escapes the storage root: {0}")]
    InvalidPath(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AvatarError + '_ {
    move |source| AvatarError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Filesystem-backed avatar store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    root: PathBuf,
}

impl AvatarStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an uploaded avatar for `doctor_id` and return its relative path.
    ///
    /// The bytes go to a temp file in the target directory first and are then
    /// renamed over `doctor<ID><ext>`, so readers never see a half-written image.
    pub fn store(
        &self,
        doctor_id: &str,
        content: &[u8],
        original_file_name: &str,
    ) -> Result<String, AvatarError> {
        if content.is_empty() {
            return Err(AvatarError::EmptyUpload);
        }

        let file_name = avatar_file_name(doctor_id, original_file_name)?;
        let relative = format!("{AVATAR_SUBDIR}/{file_name}");

        let dir = self.root.join(AVATAR_SUBDIR);
        std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;

        let target = dir.join(&file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_error(&dir))?;
        tmp.write_all(content).map_err(io_error(&target))?;
        tmp.as_file().sync_all().map_err(io_error(&target))?;
        tmp.persist(&target)
            .map_err(|e| io_error(&target)(e.error))?;

        tracing::info!(
            doctor_id = %doctor_id,
            path = %relative,
            bytes = content.len(),
            "Avatar stored"
        );
        Ok(relative)
    }

    /// Delete the avatar at `relative_path`.
    ///
    /// An empty path or an already-missing file is not an error.
    pub fn remove(&self, relative_path: &str) -> Result<(), AvatarError> {
        if relative_path.trim().is_empty() {
            return Ok(());
        }

        let path = self.absolute_path(relative_path)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %relative_path, "Avatar removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %relative_path, "Avatar already absent");
                Ok(())
            }
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    /// Resolve a stored relative path against the root.
    ///
    /// Only plain relative components are accepted; `..`, absolute paths
    /// and drive prefixes are rejected.
    pub fn absolute_path(&self, relative_path: &str) -> Result<PathBuf, AvatarError> {
        let rel = Path::new(relative_path);
        let is_plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_plain || rel.as_os_str().is_empty() {
            return Err(AvatarError::InvalidPath(relative_path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

/// `doctor<ID><ext>` where `<ext>` keeps the leading dot of the original
/// file's extension, or is empty when it has none.
fn avatar_file_name(doctor_id: &str, original_file_name: &str) -> Result<String, AvatarError> {
    if doctor_id.is_empty() || doctor_id.contains(['/', '\\']) || doctor_id.contains("..") {
        return Err(AvatarError::InvalidPath(doctor_id.to_string()));
    }

    // Browsers may send a full client path; only the final segment matters.
    let base = original_file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let ext = Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    Ok(format!("{AVATAR_PREFIX}{doctor_id}{ext}"))
}
