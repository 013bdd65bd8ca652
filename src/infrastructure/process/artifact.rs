use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Suffix of build outputs that are not runnable on their own
const PLAIN_SUFFIX: &str = "-plain";

/// Locate the newest build output in `working_dir/artifact_dir`
///
/// Returns the artifact path relative to `working_dir`, or `None` when the
/// directory is missing or holds no file with the given extension. Files
/// whose stem ends in `-plain` are skipped.
pub async fn find_artifact(
    working_dir: &Path,
    artifact_dir: &Path,
    extension: &str,
) -> Option<PathBuf> {
    let search_dir = working_dir.join(artifact_dir);
    let mut entries = match tokio::fs::read_dir(&search_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %search_dir.display(), error = %e, "no artifact directory");
            return None;
        }
    };

    let mut newest: Option<(SystemTime, String)> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.ends_with(PLAIN_SUFFIX) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let name = entry.file_name().to_string_lossy().into_owned();

        let is_newer = newest
            .as_ref()
            .is_none_or(|(time, current)| modified > *time || (modified == *time && name > *current));
        if is_newer {
            newest = Some((modified, name));
        }
    }

    newest.map(|(_, name)| artifact_dir.join(name))
}
