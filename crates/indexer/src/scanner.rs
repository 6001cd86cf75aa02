use repograph_syntax::Language;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories that never hold first-party sources: VCS metadata,
/// environments and vendored packages, build output, caches.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    "venv",
    ".venv",
    "env",
    "site-packages",
    "node_modules",
    "build",
    "dist",
];

/// Walks a repository and lists the source files of one language
pub struct FileScanner {
    root: PathBuf,
    language: Language,
    excluded_dirs: HashSet<String>,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            language: Language::Python,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| (*d).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Exclude additional directory names on top of the defaults.
    #[must_use]
    pub fn with_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Source files under the root, sorted by path.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| Language::from_path(entry.path()) == self.language)
            .map(DirEntry::into_path)
            .collect();

        files.sort();
        log::debug!(
            "Scanned {}: {} {} files",
            self.root.display(),
            files.len(),
            self.language
        );
        files
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    #[test]
    fn scan_skips_noisy_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/main.py");
        touch(dir.path(), "app/util.py");
        touch(dir.path(), "README.md");
        touch(dir.path(), ".git/hooks/pre-commit.py");
        touch(dir.path(), ".venv/lib/site.py");
        touch(dir.path(), "node_modules/pkg/x.py");
        touch(dir.path(), "app/__pycache__/main.py");
        touch(dir.path(), "build/lib/app.py");

        let files: Vec<String> = FileScanner::new(dir.path())
            .scan()
            .iter()
            .map(|p| repograph_syntax::relative_path(dir.path(), p))
            .collect();

        assert_eq!(files, vec!["app/main.py", "app/util.py"]);
    }

    #[test]
    fn extra_exclusions_apply() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.py");
        touch(dir.path(), "third_party/b.py");

        let files = FileScanner::new(dir.path())
            .with_excluded_dirs(["third_party"])
            .scan();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/a.py"));
    }

    #[test]
    fn empty_tree_scans_to_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(FileScanner::new(dir.path()).scan().is_empty());
    }
}
