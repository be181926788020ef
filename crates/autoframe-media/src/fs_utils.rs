//! Filesystem helpers for atomic output placement.
//!
//! Rendered output is written to a temporary sibling path and moved into
//! place only on full success, so a consumer never observes a truncated
//! file. Moves across filesystems fall back to copy-and-delete.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Temporary sibling path for an in-progress output file.
///
/// `clip.mp4` becomes `clip.mp4.part` in the same directory, keeping the
/// final rename on one filesystem.
pub fn temp_output_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".part");
    output.with_file_name(name)
}

/// Move a file from `src` to `dst`, creating parent directories.
///
/// Attempts a fast rename first; on EXDEV (cross-device link) falls back
/// to copying via a temp file and deleting the source.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "cross-device rename, falling back to copy"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

// EXDEV is error code 18 on Linux and macOS
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = temp_output_path(dst);

    fs::copy(src, &tmp_dst).await.map_err(|e| {
        tracing::error!(
            src = %src.display(),
            dst = %tmp_dst.display(),
            error = %e,
            "copy failed during cross-device move"
        );
        MediaError::from(e)
    })?;

    // Rename lands on the destination filesystem, so it is atomic there
    fs::rename(&tmp_dst, dst).await.map_err(|e| {
        let _ = std::fs::remove_file(&tmp_dst);
        MediaError::from(e)
    })?;

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(src = %src.display(), error = %e, "source not removed after move");
    }

    Ok(())
}
