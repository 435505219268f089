#![allow(dead_code)]

use git2::{Commit, IndexAddOption, Repository};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Writes `files` (relative path, content) below `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Relative paths of every file below `root`, `.git` excluded, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    files.sort();
    files
}

/// Initializes a repository with a local identity so stash and commit work
/// without a global git configuration.
pub fn init_repo(dir: &Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    repo
}

/// Stages every file and commits it on top of `HEAD`.
pub fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = repo.signature().unwrap();
    let parents: Vec<Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parents: Vec<&Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents).unwrap();
}

/// Prints a diff of files and their contents between two directories.
/// Shows files only present in one directory and content differences for files present in both.
///
/// # Arguments
/// * `actual` - The first directory to compare (actual output).
/// * `expected` - The second directory to compare (expected output).
pub fn print_dir_diff(actual: &Path, expected: &Path) {
    let actual_files = list_files(actual);
    let expected_files = list_files(expected);

    println!("\n=== Directory Comparison ===");
    println!("Actual output:   {:?}", actual);
    println!("Expected output: {:?}", expected);

    for file in actual_files.iter().filter(|f| !expected_files.contains(f)) {
        println!("  + {file}");
    }
    for file in expected_files.iter().filter(|f| !actual_files.contains(f)) {
        println!("  - {file}");
    }
    for file in actual_files.iter().filter(|f| expected_files.contains(f)) {
        let content1 = fs::read(actual.join(file)).unwrap();
        let content2 = fs::read(expected.join(file)).unwrap();
        if content1 != content2 {
            println!("\n  File: {file}");
            println!("  --- Actual content:\n{}", String::from_utf8_lossy(&content1));
            println!("  --- Expected content:\n{}", String::from_utf8_lossy(&content2));
        }
    }
    println!("=== End of Comparison ===\n");
}

/// Asserts that two directory trees hold the same files with the same bytes.
pub fn assert_same_tree(actual: &Path, expected: &Path) {
    if dir_diff::is_different(actual, expected).unwrap() {
        print_dir_diff(actual, expected);
        panic!("Directories differ. See above for details.");
    }
}
