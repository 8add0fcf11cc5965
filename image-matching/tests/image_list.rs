use image::{Rgb, RgbImage};
use image_matching::{ImageMatching, MatchingConfig, MatchingError, MatchingOptions};
use std::path::Path;

fn write_image(dir: &Path, name: &str) {
    let image = RgbImage::from_pixel(8, 8, Rgb([64, 128, 192]));
    image
        .save(dir.join(name))
        .expect("failed to write test image");
}

#[test]
fn empty_folder_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let result = ImageMatching::new(
        dir.path(),
        MatchingOptions::default(),
        MatchingConfig::default(),
    );
    assert!(matches!(result, Err(MatchingError::EmptyImageFolder)));
}

#[test]
fn single_image_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_image(dir.path(), "only.png");
    let result = ImageMatching::new(
        dir.path(),
        MatchingOptions::default(),
        MatchingConfig::default(),
    );
    assert!(matches!(result, Err(MatchingError::InsufficientImages)));
}

#[test]
fn enumerates_supported_images_in_name_order() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_image(dir.path(), "b.png");
    write_image(dir.path(), "a.jpg");
    write_image(dir.path(), "c.JPG");
    std::fs::write(dir.path().join("notes.txt"), "not an image").expect("failed to write file");

    let matching = ImageMatching::new(
        dir.path(),
        MatchingOptions::default(),
        MatchingConfig::default(),
    )
    .expect("two images should be enough");
    assert_eq!(matching.img_names(), vec!["a", "b", "c"]);
}
