use std::fs;

use phantom_engine::{ensure_output_dir, write_atomic, write_atomic_blocking};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_creates_parents_and_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("page.html");

    let first = write_atomic(&target, b"<html>one</html>").unwrap();
    assert_eq!(first, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "<html>one</html>");

    write_atomic(&target, b"<html>two</html>").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "<html>two</html>");

    // Only the target remains; the temp file was renamed into place.
    let entries: Vec<_> = fs::read_dir(target.parent().unwrap()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("not_a_dir");
    fs::write(&not_a_dir, "x").unwrap();

    let result = write_atomic(&not_a_dir.join("page.pdf"), b"%PDF");
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&not_a_dir).unwrap(), "x");
}

#[tokio::test(flavor = "current_thread")]
async fn blocking_write_keeps_the_runtime_responsive() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out").join("page.pdf");

    let write = tokio::spawn(write_atomic_blocking(target.clone(), b"%PDF-1.4".to_vec()));
    let other = tokio::spawn(async { 7 });

    assert_eq!(other.await.unwrap(), 7);
    assert_eq!(write.await.unwrap().unwrap(), target);
    assert_eq!(fs::read(&target).unwrap(), b"%PDF-1.4");
}

#[tokio::test]
async fn blocking_write_reports_io_errors() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("not_a_dir");
    fs::write(&not_a_dir, "x").unwrap();

    let result = write_atomic_blocking(not_a_dir.join("page.html"), b"<html/>".to_vec()).await;

    assert!(result.is_err());
}
