use std::io::Cursor;

use super::*;

fn tmp_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_assets").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("images")).unwrap();
    dir
}

fn write_png(path: &Path, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

fn one_pixel() -> PreparedImage {
    PreparedImage::from_premul_bytes(1, 1, vec![255, 255, 255, 255]).unwrap()
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn handle_resolves_once() {
    let h = AssetHandle::pending(AssetId(0), "a.png");
    assert!(!h.is_ready());
    assert!(h.get().is_none());

    let clone = h.clone();
    assert!(h.fulfil(one_pixel()));
    assert!(clone.is_ready());
    assert!(!clone.fail("late"));
    assert!(!clone.is_failed());
}

#[test]
fn failed_handle_is_never_ready() {
    let h = AssetHandle::pending(AssetId(3), "missing.png");
    assert!(h.fail("gone"));
    assert!(h.is_failed());
    assert!(!h.is_ready());
    assert!(!h.fulfil(one_pixel()));
}

#[test]
fn pending_scene_assets_follow_config_order() {
    let cfg = SplashConfig::default();
    let assets = SceneAssets::pending(&cfg);
    assert_eq!(assets.photos.len(), cfg.photos.len());
    assert_eq!(assets.icon.id(), AssetId(cfg.photos.len() as u32));
    assert_eq!(assets.photos[1].source(), cfg.photos[1]);
    assert_eq!(assets.ready_count(), 0);
}

#[test]
fn store_loads_in_background_and_reports_failures() {
    let dir = tmp_dir("store_loads");
    write_png(&dir.join("images/a.png"), [255, 0, 0, 255]);
    write_png(&dir.join("images/icon.png"), [0, 0, 255, 255]);

    let cfg = SplashConfig {
        photos: vec!["images/a.png".to_owned(), "images/missing.png".to_owned()],
        icon: "images/icon.png".to_owned(),
        ..SplashConfig::default()
    };
    let mut store = AssetStore::load(&dir, &cfg).unwrap();
    assert!(store.wait_settled(Duration::from_secs(30)));

    let assets = store.scene_assets();
    assert!(assets.photos[0].is_ready());
    assert!(assets.photos[1].is_failed());
    assert!(assets.icon.is_ready());
    assert_eq!(assets.ready_count(), 2);
    assert!(store.font_bytes().is_none());
}

#[test]
fn store_rejects_escaping_paths_up_front() {
    let dir = tmp_dir("store_rejects");
    let cfg = SplashConfig {
        photos: vec!["../outside.png".to_owned()],
        ..SplashConfig::default()
    };
    assert!(AssetStore::load(&dir, &cfg).is_err());
}

#[test]
fn missing_font_is_an_error() {
    let dir = tmp_dir("missing_font");
    let cfg = SplashConfig {
        font: Some("fonts/none.ttf".to_owned()),
        ..SplashConfig::default()
    };
    assert!(AssetStore::load(&dir, &cfg).is_err());
}
