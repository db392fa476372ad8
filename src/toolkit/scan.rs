use crate::shared::fs_atomic::scratch_sibling;
use crate::toolkit::{io_error, ToolkitError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories nested deeper than this below the scan root are not entered.
pub const MAX_SCAN_DEPTH: usize = 64;

/// Fails unless `path` is an existing directory this process can create
/// files in. A probe file is created and removed again.
pub fn check_writable_dir(path: &Path) -> Result<(), ToolkitError> {
    let not_writable = |reason: String| ToolkitError::DirectoryNotWritable {
        path: path.display().to_string(),
        reason,
    };

    let metadata = fs::metadata(path).map_err(|err| not_writable(err.to_string()))?;
    if !metadata.is_dir() {
        return Err(not_writable("not a directory".to_string()));
    }
    if metadata.permissions().readonly() {
        return Err(not_writable("permission bits deny writes".to_string()));
    }

    let probe = scratch_sibling(path, "geoprep", "write-probe");
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe)
        .map_err(|err| not_writable(err.to_string()))?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

/// File names directly inside `dir`, in the order the filesystem yields them.
pub fn list_output_artifacts(dir: &Path) -> Result<Vec<String>, ToolkitError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Every file below `dir` whose name ends in `.<extension>` (case-sensitive),
/// depth first. Each directory is entered at most once, so symlink loops
/// terminate. Subdirectories that cannot be read are skipped; only an
/// unreadable `dir` itself is an error.
pub fn list_files_by_extension(extension: &str, dir: &Path) -> Result<Vec<PathBuf>, ToolkitError> {
    let mut visited = HashSet::new();
    let mut files = Vec::new();
    collect_files(extension, dir, 0, &mut visited, &mut files)?;
    Ok(files)
}

fn collect_files(
    extension: &str,
    dir: &Path,
    depth: usize,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> Result<(), ToolkitError> {
    let entries = match read_directory(dir, visited) {
        Ok(Some(entries)) => entries,
        Ok(None) => {
            tracing::debug!(dir = %dir.display(), "skipping already visited directory");
            return Ok(());
        }
        Err(err) if depth > 0 => {
            tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    for path in entries {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if metadata.is_dir() {
            if depth + 1 > MAX_SCAN_DEPTH {
                tracing::warn!(path = %path.display(), "scan depth limit reached");
                continue;
            }
            collect_files(extension, &path, depth + 1, visited, files)?;
        } else if has_extension(&path, extension) {
            files.push(path);
        }
    }
    Ok(())
}

/// Sorted entry paths of `dir`, or `None` when it was already visited.
fn read_directory(
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<Option<Vec<PathBuf>>, ToolkitError> {
    let canonical = fs::canonicalize(dir).map_err(|e| io_error(dir, e))?;
    if !visited.insert(canonical) {
        return Ok(None);
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        entries.push(entry.map_err(|e| io_error(dir, e))?.path());
    }
    entries.sort();
    Ok(Some(entries))
}

/// Compares the text after the last `.` only. A name without a dot never
/// matches, so a file called just `pdf` is not a PDF here.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, suffix)| suffix == extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_uses_last_suffix_only() {
        assert!(has_extension(Path::new("/a/report.final.pdf"), "pdf"));
        assert!(!has_extension(Path::new("/a/report.pdf.bak"), "pdf"));
        assert!(!has_extension(Path::new("/a/report.PDF"), "pdf"));
        assert!(!has_extension(Path::new("/a/pdf"), "pdf"));
    }

    #[test]
    fn unreadable_subdirectory_is_skipped_but_root_is_not() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().join("removed");
        let mut files = Vec::new();

        collect_files("pdf", &gone, 1, &mut HashSet::new(), &mut files)
            .expect("nested failure is skipped");
        assert!(files.is_empty());

        let err = collect_files("pdf", &gone, 0, &mut HashSet::new(), &mut files)
            .expect_err("root failure");
        assert!(matches!(err, ToolkitError::Io { .. }));
    }
}
