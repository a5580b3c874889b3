//! File system walker for discovering Java source files.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks a project tree and yields `.java` files, honoring gitignore rules.
#[derive(Debug, Default)]
pub struct SourceWalker;

impl SourceWalker {
    pub fn new() -> Self {
        Self
    }

    pub fn walk(&self, root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
        WalkBuilder::new(root)
            .hidden(true) // skip dotfiles and dot-directories
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false) // gitignore rules apply outside git repos too
            .build()
            .filter_map(Result::ok) // unreadable entries are skipped
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "java"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_only_java_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src/main/java");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Main.java"), "class Main {}").unwrap();
        std::fs::write(nested.join("Util.java"), "class Util {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();
        std::fs::write(dir.path().join("build.gradle"), "plugins {}").unwrap();

        let mut files: Vec<PathBuf> = SourceWalker::new().walk(dir.path()).collect();
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "java"));
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(SourceWalker::new().walk(dir.path()).count(), 0);
    }
}
