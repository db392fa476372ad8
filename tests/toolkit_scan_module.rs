use geoprep::toolkit::{
    check_writable_dir, is_default_layer, list_files_by_extension, list_output_artifacts,
    ToolkitError,
};
use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;
use tempfile::tempdir;

fn set_mode(path: &Path, mode: u32) {
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms).expect("chmod");
}

#[test]
fn writable_directory_passes_and_leaves_no_probe() {
    let dir = tempdir().expect("tempdir");
    check_writable_dir(dir.path()).expect("writable");
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn read_only_directory_fails_without_writing() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("output");
    fs::create_dir(&output).expect("mkdir");
    set_mode(&output, 0o555);

    let result = check_writable_dir(&output);
    let entries = fs::read_dir(&output).expect("read dir").count();
    set_mode(&output, 0o755);

    match result {
        Err(ToolkitError::DirectoryNotWritable { path, .. }) => {
            assert_eq!(path, output.display().to_string());
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(entries, 0);
}

#[test]
fn missing_or_non_directory_paths_are_not_writable() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").expect("file");

    for path in [dir.path().join("absent"), file] {
        let err = check_writable_dir(&path).expect_err("not writable");
        assert!(err.to_string().contains("is not writable"), "{err}");
    }
}

#[test]
fn output_listing_is_flat() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.pdf"), "a").expect("a");
    fs::write(dir.path().join("b.txt"), "b").expect("b");
    fs::create_dir(dir.path().join("nested")).expect("nested");
    fs::write(dir.path().join("nested/c.pdf"), "c").expect("c");

    let mut names = list_output_artifacts(dir.path()).expect("list");
    names.sort();
    assert_eq!(names, vec!["a.pdf", "b.txt", "nested"]);
}

#[test]
fn extension_scan_recurses_depth_first() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("maps/roads")).expect("dirs");
    fs::write(root.join("z.geojson"), "{}").expect("z");
    fs::write(root.join("maps/a.geojson"), "{}").expect("a");
    fs::write(root.join("maps/roads/b.geojson"), "{}").expect("b");
    fs::write(root.join("maps/roads/b.GEOJSON"), "{}").expect("upper");
    fs::write(root.join("maps/notes.txt"), "").expect("txt");

    let found = list_files_by_extension("geojson", root).expect("scan");
    assert_eq!(
        found,
        vec![
            root.join("maps/a.geojson"),
            root.join("maps/roads/b.geojson"),
            root.join("z.geojson"),
        ]
    );
}

#[test]
fn symlink_cycles_terminate() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir(root.join("a")).expect("a");
    fs::write(root.join("a/y.pdf"), "y").expect("y");
    fs::write(root.join("x.pdf"), "x").expect("x");
    symlink(root, root.join("a/loop")).expect("symlink");

    let found = list_files_by_extension("pdf", root).expect("scan");
    assert_eq!(found, vec![root.join("a/y.pdf"), root.join("x.pdf")]);
}

#[test]
fn default_layer_examples() {
    for name in ["lines", "points_osm", "selection", "location_bbox@myworkspace"] {
        assert!(is_default_layer(name), "{name} should be a default layer");
    }
    for name in ["buildings", "custom_layer"] {
        assert!(!is_default_layer(name), "{name} should be selectable");
    }
}

#[test]
fn locked_subdirectory_does_not_abort_the_scan() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    let locked = root.join("locked");
    fs::create_dir(&locked).expect("locked");
    fs::write(root.join("a.geojson"), "{}").expect("a");
    fs::write(root.join("z.geojson"), "{}").expect("z");
    set_mode(&locked, 0o000);

    let found = list_files_by_extension("geojson", root);
    set_mode(&locked, 0o755);

    assert_eq!(
        found.expect("scan"),
        vec![root.join("a.geojson"), root.join("z.geojson")]
    );
}
