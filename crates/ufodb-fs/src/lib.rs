//! Whole-file write helpers.
//!
//! A database file is always rewritten in full. Two strategies are offered:
//! - [`replace_with`]: write a sibling temp file, flush + `sync_all`, then rename it over the
//!   destination. A failing writer leaves the previous file untouched.
//! - [`overwrite_with`]: truncate the destination and write into it directly. A failing writer
//!   leaves a partial file behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for bare file names like `db.txt`.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Atomically replace `dest` with whatever `write_fn` produces.
///
/// The temp file lives in the destination directory so the final rename never crosses a
/// filesystem boundary. Parent directories are created when missing.
pub fn replace_with<F>(dest: impl AsRef<Path>, write_fn: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dest = dest.as_ref();
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write_fn(&mut out)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;

    // `std::fs::rename` replaces an existing destination on every supported platform.
    tmp.persist(dest).map_err(|err| err.error)?;

    // The file is already in place; a failed directory sync is not a write failure.
    let _ = sync_dir(dir);
    Ok(())
}

/// Truncate `dest` and write into it directly.
pub fn overwrite_with<F>(dest: impl AsRef<Path>, write_fn: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest.as_ref())?;
    let mut out = BufWriter::new(file);
    write_fn(&mut out)?;
    out.flush()?;
    out.get_ref().sync_all()
}

fn sync_dir(dir: &Path) -> io::Result<()> {
    // Opening a directory as a file works on most Unix platforms and fails elsewhere.
    File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    struct CwdGuard {
        old: std::path::PathBuf,
    }

    impl CwdGuard {
        fn chdir(path: &Path) -> Self {
            let old = std::env::current_dir().expect("current_dir");
            std::env::set_current_dir(path).expect("set_current_dir");
            Self { old }
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.old);
        }
    }

    fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .expect("read_dir")
            .map(|e| e.expect("dir entry").path())
            .filter(|p| p.is_file())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn replace_with_supports_bare_relative_file_names() {
        let _guard = CWD_LOCK.lock().expect("lock");

        let tmp = tempfile::tempdir().expect("temp dir");
        let _cwd = CwdGuard::chdir(tmp.path());

        replace_with("db.txt", |out| out.write_all(b"0\n")).expect("atomic write");
        assert_eq!(
            fs::read_to_string(tmp.path().join("db.txt")).expect("read file"),
            "0\n"
        );
    }

    #[test]
    fn replace_with_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dest = tmp.path().join("nested").join("db.txt");

        replace_with(&dest, |out| out.write_all(b"1\n")).expect("atomic write");
        assert_eq!(fs::read_to_string(&dest).expect("read file"), "1\n");
    }

    #[test]
    fn replace_with_keeps_previous_contents_when_writer_fails() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dest = tmp.path().join("db.txt");
        fs::write(&dest, "previous").expect("seed file");

        let err = replace_with(&dest, |out| {
            out.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "simulated failure"))
        })
        .expect_err("writer error should propagate");

        assert_eq!(err.to_string(), "simulated failure");
        assert_eq!(fs::read_to_string(&dest).expect("read dest"), "previous");
        assert_eq!(files_in(tmp.path()), vec![dest.clone()], "temp file left behind");
    }

    #[test]
    fn overwrite_with_truncates_longer_contents() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dest = tmp.path().join("db.txt");
        fs::write(&dest, "a much longer previous payload").expect("seed file");

        overwrite_with(&dest, |out| out.write_all(b"short")).expect("write");
        assert_eq!(fs::read_to_string(&dest).expect("read dest"), "short");
    }
}
