use super::*;
use crate::manifest::AssetEntry;
use std::collections::BTreeMap;

fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("parent dir");
    }
    image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .expect("png should be written");
}

#[test]
fn load_image_rejects_unsupported_extension_before_io() {
    let store = AssetStore::open(".");
    let err = match store.load_image("assets/theme.ogg") {
        Ok(_) => panic!("non-image extension must be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, AssetError::UnsupportedExtension(_)));
}

#[test]
fn traversal_is_blocked() {
    let store = AssetStore::open(".");
    assert!(matches!(
        store.load_bytes("../secret.png"),
        Err(AssetError::Traversal)
    ));
    assert!(sanitize_rel_path(Path::new("./bg/./a.png")).is_ok());
}

#[test]
fn load_image_decodes_rgba() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir.path().join("background1.png"), 3, 2);

    let store = AssetStore::open(dir.path());
    let image = store.load_image("background1.png").expect("decode");
    assert_eq!((image.width, image.height), (3, 2));
    assert_eq!(image.pixels.len(), 3 * 2 * 4);
    assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
}

#[test]
fn oversized_images_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir.path().join("wide.png"), 8, 1);

    let store = AssetStore::open(dir.path()).with_limits(AssetLimits {
        max_width: 4,
        ..AssetLimits::default()
    });
    assert!(matches!(
        store.load_image("wide.png"),
        Err(AssetError::InvalidDimensions { width: 8, .. })
    ));
}

#[test]
fn load_bytes_uses_cache_for_repeated_reads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let asset_path = dir.path().join("sprites").join("princess.png");
    std::fs::create_dir_all(asset_path.parent().expect("parent")).expect("dir");
    std::fs::write(&asset_path, [1u8, 2, 3, 4]).expect("write");

    let store = AssetStore::open(dir.path()).with_cache_budget(1024);
    assert_eq!(store.load_bytes("sprites/princess.png").expect("first"), vec![1, 2, 3, 4]);

    std::fs::remove_file(&asset_path).expect("remove");
    assert_eq!(
        store
            .load_bytes("sprites/princess.png")
            .expect("second read should be served from cache"),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn install_prewarms_and_reports_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("background1.png"), [7u8; 16]).expect("write");
    std::fs::write(dir.path().join("princess.png"), [8u8; 4]).expect("write");

    let store = AssetStore::open(dir.path());
    let report = store.install(&["background1.png", "background2.png", "princess.png"]);
    assert!(!report.is_complete());
    assert_eq!(report.cached, vec!["background1.png", "princess.png"]);
    assert_eq!(report.bytes, 20);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "background2.png");
    assert!(matches!(report.failures[0].error, AssetError::Io(_)));

    // Offline from here on: the cache answers.
    std::fs::remove_file(dir.path().join("princess.png")).expect("remove");
    assert!(store.is_cached("princess.png"));
    assert_eq!(store.load_bytes("princess.png").expect("cached"), vec![8u8; 4]);
    assert!(!store.is_cached("background2.png"));
}

#[test]
fn manifest_lookup_normalizes_separators() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("bg")).expect("bg dir");
    let payload = [4u8, 5, 6, 7];
    std::fs::write(dir.path().join("bg").join("a.png"), payload).expect("write asset");

    let manifest = AssetManifest {
        manifest_version: 1,
        assets: BTreeMap::from([("bg\\a.png".to_string(), AssetEntry::for_bytes(&payload))]),
    };
    let manifest_path = dir.path().join("assets_manifest.json");
    std::fs::write(&manifest_path, manifest.to_json().expect("json")).expect("write manifest");

    let store = AssetStore::new(
        dir.path().to_path_buf(),
        SecurityMode::Untrusted,
        Some(manifest_path),
        true,
    )
    .expect("asset store");
    assert_eq!(store.load_bytes("bg/a.png").expect("verified"), payload);
}

#[test]
fn manifest_mismatches_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.png"), [1u8, 2, 3]).expect("write");
    std::fs::write(dir.path().join("b.png"), [1u8, 2, 3]).expect("write");
    std::fs::write(dir.path().join("c.png"), [1u8, 2, 3]).expect("write");

    let mut manifest = AssetManifest::new();
    manifest.insert("a.png", &[1, 2, 4]);
    manifest.insert("b.png", &[1, 2]);
    let manifest_path = dir.path().join("manifest.json");
    std::fs::write(&manifest_path, manifest.to_json().expect("json")).expect("write manifest");

    let store = AssetStore::new(
        dir.path().to_path_buf(),
        SecurityMode::Untrusted,
        Some(manifest_path),
        true,
    )
    .expect("asset store");
    assert!(matches!(
        store.load_bytes("a.png"),
        Err(AssetError::ManifestHashMismatch(_))
    ));
    assert!(matches!(
        store.load_bytes("b.png"),
        Err(AssetError::ManifestSizeMismatch(_))
    ));
    assert!(matches!(
        store.load_bytes("c.png"),
        Err(AssetError::ManifestEntryMissing(_))
    ));
}

#[test]
fn untrusted_without_manifest_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("a.png"), [1u8]).expect("write");
    let store = AssetStore::new(dir.path().to_path_buf(), SecurityMode::Untrusted, None, true)
        .expect("asset store");
    assert!(matches!(
        store.load_bytes("a.png"),
        Err(AssetError::ManifestMissing)
    ));
}

#[cfg(unix)]
#[test]
fn load_bytes_blocks_symlink_escape() {
    use std::os::unix::fs::symlink;

    let root = tempfile::tempdir().expect("root");
    let outside = tempfile::tempdir().expect("outside");
    let target = outside.path().join("escape.png");
    std::fs::write(&target, [9u8, 9, 9]).expect("outside file");
    symlink(&target, root.path().join("escape.png")).expect("create symlink");

    let store = AssetStore::open(root.path());
    let err = store
        .load_bytes("escape.png")
        .expect_err("symlink escape must be blocked");
    assert!(matches!(err, AssetError::Traversal));
}
