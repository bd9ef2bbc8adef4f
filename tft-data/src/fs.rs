//! Filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Ensure the parent directory for `path` exists.
///
/// Absolute parents are created relative to the filesystem root, relative
/// ones relative to the working directory.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        let relative = parent
            .strip_prefix("/")
            .map_err(|_| io::Error::other("failed to strip root from absolute path"))?;
        (Utf8PathBuf::from("/"), relative.to_path_buf())
    } else {
        (Utf8PathBuf::from("."), parent.to_path_buf())
    };
    if relative.as_str().is_empty() {
        return Ok(());
    }

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    dir.create_dir_all(&relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn creates_missing_parents() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let target = root.join("nested/deeper/tft.db");

        ensure_parent_dir(&target).expect("create parents");
        assert!(root.join("nested/deeper").is_dir());
        ensure_parent_dir(&target).expect("existing parents are fine");
    }

    #[rstest]
    #[case("tft.db")]
    #[case("/tft.db")]
    fn bare_file_names_need_nothing(#[case] path: &str) {
        ensure_parent_dir(Utf8Path::new(path)).expect("no parent to create");
    }
}
