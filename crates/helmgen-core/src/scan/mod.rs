//! Repository scanner: turns a checkout into an ordered list of text files.
//!
//! ## Walk rules
//!
//! For every configured subdirectory the scanner walks `<repo_root>/<subdir>`
//! depth-first:
//!
//! - `.git` and `.github` directories are never entered.
//! - Any other directory whose walked path (`<repo_root>/<subdir>/.../<name>`)
//!   matches the [`PathFilter`] is pruned before descent, so nothing below it
//!   is read or even listed.
//! - A file is kept when its path relative to `repo_root` is not excluded by
//!   the filter and its extension is not in [`SPECIAL_EXTENSIONS`].
//!
//! Within a directory, files come before subdirectories and each group is
//! sorted by name, so two scans of the same tree yield identical output.

pub mod filter;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

pub use filter::PathFilter;

/// Extensions (compared case-insensitively, leading dot included) that are
/// never sent to the model: images, audio, video, bytecode, archives, docs.
///
/// The compound entries can never equal a final extension; `x.tar.gz` is
/// caught by neither `.tar.gz` nor anything else.
pub const SPECIAL_EXTENSIONS: &[&str] = &[
    ".pdf", ".img", ".svg", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".ico",
    ".webp", ".mp3", ".wav", ".ogg", ".flac", ".aac", ".wma", ".m4a", ".opus", ".mp4", ".mkv",
    ".webm", ".avi", ".mov", ".wmv", ".flv", ".3gp", ".mpg", ".mpeg", ".m4v", ".m2v", ".m2ts",
    ".pyc", ".pyo", ".class", ".jar", ".zip", ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz",
    ".txz", ".md",
];

/// Version-control metadata directories, matched by exact name.
pub const VCS_DIRS: &[&str] = &[".git", ".github"];

/// One scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the repository root, as produced by the host filesystem.
    pub rel_path: String,
    /// File content with line endings translated to `\n`.
    pub content: String,
}

/// Errors from scanning.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Whether a file should be skipped because of its extension.
pub fn is_special_file(path: &str) -> bool {
    match extension_of(path) {
        Some(ext) => {
            let ext = ext.to_lowercase();
            SPECIAL_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// The final extension of the file name in `path`, dot included.
///
/// Leading dots of the name do not start an extension: `.md` has none,
/// `..md` has none, `.env.md` has `.md`.
fn extension_of(path: &str) -> Option<&str> {
    let name = Path::new(path).file_name()?.to_str()?;
    let stem_start = name.len() - name.trim_start_matches('.').len();
    let dot = name[stem_start..].rfind('.')?;
    Some(&name[stem_start + dot..])
}

/// Walks repository subdirectories and collects eligible text files.
#[derive(Debug, Clone, Default)]
pub struct RepoScanner {
    filter: PathFilter,
}

impl RepoScanner {
    pub fn new(filter: PathFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Scan `subdirs` of `repo_root` and return the kept files in walk order.
    pub fn scan(&self, repo_root: &Path, subdirs: &[String]) -> Result<Vec<FileRecord>, ScanError> {
        let mut records = Vec::new();
        self.scan_with(repo_root, subdirs, &mut |record| records.push(record))?;
        Ok(records)
    }

    /// Scan `subdirs` of `repo_root`, handing each kept file to `visitor`.
    ///
    /// Returns the number of files processed. A file that is not valid UTF-8
    /// aborts the scan.
    pub fn scan_with(
        &self,
        repo_root: &Path,
        subdirs: &[String],
        visitor: &mut dyn FnMut(FileRecord),
    ) -> Result<usize, ScanError> {
        let mut count = 0;
        for subdir in subdirs {
            let walk_root = repo_root.join(subdir);
            if !walk_root.is_dir() {
                warn!(path = %walk_root.display(), "scan directory does not exist, skipping");
                continue;
            }

            let walker = WalkDir::new(&walk_root)
                .follow_links(false)
                .sort_by(files_first)
                .into_iter()
                .filter_entry(|entry| self.should_descend(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable entry");
                        continue;
                    }
                };
                if entry.file_type().is_dir() {
                    continue;
                }
                // Links to directories are listed but never entered or read.
                if entry.path_is_symlink() && entry.path().is_dir() {
                    continue;
                }

                let rel_path = relative_path(entry.path(), repo_root);
                if self.filter.is_excluded(&rel_path) || is_special_file(&rel_path) {
                    continue;
                }

                let content = read_text(entry.path())?;
                info!(path = %rel_path, "processed file");
                visitor(FileRecord { rel_path, content });
                count += 1;
            }
        }
        Ok(count)
    }

    /// Decide whether the walker may enter a directory entry.
    fn should_descend(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name();
        if VCS_DIRS.iter().any(|vcs| name == *vcs) {
            return false;
        }
        !self.filter.is_excluded(&entry.path().to_string_lossy())
    }
}

/// Files before directories, then byte-wise by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// `path` relative to `root`, or `path` itself when it lies outside `root`
/// (an absolute subdirectory replaces the root when joined).
fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn read_text(path: &Path) -> Result<String, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ScanError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(translate_newlines(text))
}

/// Translate `\r\n` and lone `\r` to `\n`.
fn translate_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn paths(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.rel_path.as_str()).collect()
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a/b/logo.png"), Some(".png"));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of(".md"), None);
        assert_eq!(extension_of("..md"), None);
        assert_eq!(extension_of("dir/.env.md"), Some(".md"));
        assert_eq!(extension_of("trailing."), Some("."));
    }

    #[test]
    fn test_is_special_file() {
        assert!(is_special_file("docs/guide.pdf"));
        assert!(is_special_file("assets/LOGO.PNG"));
        assert!(is_special_file("README.md"));
        assert!(is_special_file("build/Main.class"));
        assert!(!is_special_file("src/main.py"));
        assert!(!is_special_file("Dockerfile"));
        assert!(!is_special_file(".md"));
        // Only the final extension is compared.
        assert!(!is_special_file("dist/bundle.tar.gz"));
        assert!(is_special_file("dist/bundle.tgz"));
    }

    #[test]
    fn test_translate_newlines() {
        assert_eq!(translate_newlines("a\r\nb\rc\n".to_string()), "a\nb\nc\n");
        assert_eq!(translate_newlines("plain\n".to_string()), "plain\n");
    }

    #[test]
    fn test_files_before_directories_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/z.py", b"z");
        write(tmp.path(), "src/a.py", b"a");
        write(tmp.path(), "src/b/inner.py", b"inner");
        write(tmp.path(), "src/a_dir/deep.py", b"deep");

        let scanner = RepoScanner::default();
        let records = scanner.scan(tmp.path(), &["src".to_string()]).unwrap();
        assert_eq!(
            paths(&records),
            vec!["src/a.py", "src/z.py", "src/a_dir/deep.py", "src/b/inner.py"]
        );
    }

    #[test]
    fn test_vcs_directories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/.git/config", b"[core]");
        write(tmp.path(), "src/.github/workflows/ci.yaml", b"on: push");
        write(tmp.path(), "src/.gitignore", b"target/");
        write(tmp.path(), "src/app.py", b"print()");

        let records = RepoScanner::default()
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["src/.gitignore", "src/app.py"]);
    }

    #[test]
    fn test_directory_filter_uses_walked_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/keep/a.py", b"a");
        write(tmp.path(), "src/skip/b.py", b"b");

        // Relative-path pattern: only matches files, the directory check sees
        // the full walked path and never matches.
        let filter = PathFilter::new(["src/skip/b.py"]).unwrap();
        let records = RepoScanner::new(filter)
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["src/keep/a.py"]);

        // Walked-path pattern: prunes the directory itself.
        let pattern = format!("{}/src/skip", tmp.path().display());
        let filter = PathFilter::new([pattern]).unwrap();
        let records = RepoScanner::new(filter)
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["src/keep/a.py"]);
    }

    #[test]
    fn test_walk_root_is_never_filtered() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "deployment/values.yaml", b"replicas: 1");

        let filter = PathFilter::new(["*/deployment"]).unwrap();
        let records = RepoScanner::new(filter)
            .scan(tmp.path(), &["deployment".to_string()])
            .unwrap();
        // The root itself is walked; the file's relative path does not match.
        assert_eq!(paths(&records), vec!["deployment/values.yaml"]);
    }

    #[test]
    fn test_missing_subdirectory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let count = RepoScanner::default()
            .scan_with(tmp.path(), &["absent".to_string()], &mut |_| {})
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_multiple_subdirectories_in_given_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b/one.go", b"package b");
        write(tmp.path(), "a/two.go", b"package a");

        let records = RepoScanner::default()
            .scan(tmp.path(), &["b".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["b/one.go", "a/two.go"]);
    }

    #[test]
    fn test_invalid_utf8_aborts_scan() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/blob.bin", &[0xff, 0xfe, 0x00, 0x80]);

        let err = RepoScanner::default()
            .scan(tmp.path(), &["src".to_string()])
            .unwrap_err();
        assert!(matches!(err, ScanError::Decode { .. }));
    }

    #[test]
    fn test_crlf_content_is_translated() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/win.txt", b"line1\r\nline2\r\n");

        let records = RepoScanner::default()
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(records[0].content, "line1\nline2\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_entered() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "outside/secret.py", b"x = 1");
        write(tmp.path(), "src/real.py", b"y = 2");
        std::os::unix::fs::symlink(tmp.path().join("outside"), tmp.path().join("src/link"))
            .unwrap();

        let records = RepoScanner::default()
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["src/real.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_read() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "shared/common.py", b"SHARED = True");
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::os::unix::fs::symlink(
            tmp.path().join("shared/common.py"),
            tmp.path().join("src/common.py"),
        )
        .unwrap();

        let records = RepoScanner::default()
            .scan(tmp.path(), &["src".to_string()])
            .unwrap();
        assert_eq!(paths(&records), vec!["src/common.py"]);
        assert_eq!(records[0].content, "SHARED = True");
    }
}
