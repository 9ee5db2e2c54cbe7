/*!
 * Tests for file utility functions
 */

use edudiff::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_generate_output_path_shouldUseJobIdAndExtension() {
    let path = FileManager::generate_output_path("/out", "job-1", ".mp4");
    assert_eq!(path, std::path::PathBuf::from("/out/job-1.mp4"));
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("a/b/scene.py");

    FileManager::write_to_file(&path, "print(1)\n").unwrap();

    assert_eq!(FileManager::read_to_string(&path).unwrap(), "print(1)\n");
    assert!(FileManager::dir_exists(dir.path().join("a/b")));
}

#[test]
fn test_move_file_shouldRelocateContent() {
    let dir = create_temp_dir().unwrap();
    let source = create_test_file(dir.path(), "MainScene.mp4", "video").unwrap();
    let target = dir.path().join("videos/out.mp4");

    FileManager::move_file(&source, &target).unwrap();

    assert!(!FileManager::file_exists(&source));
    assert_eq!(FileManager::read_to_string(&target).unwrap(), "video");
}

#[test]
fn test_move_file_withMissingSource_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(FileManager::move_file(dir.path().join("none.mp4"), dir.path().join("out.mp4")).is_err());
}

#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(FileManager::read_to_string(dir.path().join("missing.py")).is_err());
}
