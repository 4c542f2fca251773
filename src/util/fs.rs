use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `content` to `path` atomically using write-to-temp-then-rename.
///
/// The temporary file lives next to the destination so the final rename
/// stays on one filesystem. Readers of `path` see either the previous file
/// or the complete new one, never a partial feed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    // Unpredictable temp name so a pre-planted symlink cannot be followed
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write feed to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(file);

    // Windows refuses to rename over an existing file
    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                path.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = std::env::temp_dir().join("podcast_rss_atomic_create");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.xml");
        let _ = std::fs::remove_file(&path);

        atomic_write(&path, b"<rss/>").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<rss/>");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = std::env::temp_dir().join("podcast_rss_atomic_replace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.xml");
        std::fs::write(&path, "old content").unwrap();

        atomic_write(&path, b"new content").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");

        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_atomic_write_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("podcast_rss_atomic_missing_dir")
            .join("nested")
            .join("feed.xml");
        assert!(atomic_write(&path, b"x").is_err());
    }
}
