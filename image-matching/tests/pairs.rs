use image::{Rgb, RgbImage};
use image_matching::{
    pairs, ExhaustivePairs, ImageMatching, MatchingConfig, MatchingError, MatchingOptions,
    MatchingStrategy, Pair, PairsGenerator, SequentialPairs,
};
use std::path::{Path, PathBuf};

fn write_image(dir: &Path, name: &str) {
    let image = RgbImage::from_pixel(8, 8, Rgb([64, 128, 192]));
    image
        .save(dir.join(name))
        .expect("failed to write test image");
}

fn matching_with(dir: &Path, options: MatchingOptions) -> ImageMatching {
    write_image(dir, "left.png");
    write_image(dir, "right.png");
    ImageMatching::new(dir, options, MatchingConfig::default())
        .expect("two images should be enough")
}

#[test]
fn pair_file_splits_once_on_first_space() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let pair_file = dir.path().join("pairs.txt");
    std::fs::write(&pair_file, "a.jpg b c.jpg\n").expect("failed to write pair file");

    let pairs = pairs::read_pair_file(&pair_file).expect("pair file should parse");
    assert_eq!(
        pairs,
        vec![Pair(PathBuf::from("a.jpg"), PathBuf::from("b c.jpg"))]
    );
}

#[test]
fn pair_line_without_space_is_reported() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let pair_file = dir.path().join("pairs.txt");
    std::fs::write(&pair_file, "lonely.jpg\n").expect("failed to write pair file");

    let result = pairs::read_pair_file(&pair_file);
    assert!(matches!(result, Err(MatchingError::MalformedPairLine(_))));
}

#[test]
fn custom_pairs_are_taken_literally() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let pair_file = dir.path().join("pairs.txt");
    std::fs::write(&pair_file, "x.jpg y.jpg\n").expect("failed to write pair file");

    let mut matching = matching_with(
        dir.path(),
        MatchingOptions {
            strategy: MatchingStrategy::CustomPairs,
            pair_file: Some(pair_file),
            ..MatchingOptions::default()
        },
    );
    // The pair file is not validated against the enumerated images.
    let pairs = matching.generate_pairs().expect("pair file should parse");
    let expected = vec![Pair(PathBuf::from("x.jpg"), PathBuf::from("y.jpg"))];
    assert_eq!(pairs, expected.as_slice());
}

#[test]
fn delegation_returns_generator_output_unmodified() {
    struct Scripted(Vec<Pair>);

    impl PairsGenerator for Scripted {
        fn run(&mut self) -> image_matching::Result<Vec<Pair>> {
            Ok(self.0.clone())
        }
    }

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut matching = matching_with(dir.path(), MatchingOptions::default());

    let scripted = vec![
        Pair(PathBuf::from("3.png"), PathBuf::from("1.png")),
        Pair(PathBuf::from("2.png"), PathBuf::from("3.png")),
    ];
    let mut generator = Scripted(scripted.clone());
    let pairs = matching
        .generate_pairs_with(&mut generator)
        .expect("delegation should succeed");
    assert_eq!(pairs, scripted.as_slice());
}

#[test]
fn exhaustive_pairs_every_combination_in_order() {
    let paths: Vec<PathBuf> = ["a", "b", "c", "d"].iter().map(PathBuf::from).collect();
    let pairs = ExhaustivePairs::new(&paths)
        .run()
        .expect("generation should succeed");
    let expected: Vec<Pair> = [
        ("a", "b"),
        ("a", "c"),
        ("a", "d"),
        ("b", "c"),
        ("b", "d"),
        ("c", "d"),
    ]
    .iter()
    .map(|&(first, second)| Pair(PathBuf::from(first), PathBuf::from(second)))
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn sequential_pairs_respect_the_overlap_window() {
    let paths: Vec<PathBuf> = ["a", "b", "c", "d"].iter().map(PathBuf::from).collect();
    let pairs = SequentialPairs::new(&paths, 2)
        .run()
        .expect("generation should succeed");
    let expected: Vec<Pair> = [("a", "b"), ("a", "c"), ("b", "c"), ("b", "d"), ("c", "d")]
        .iter()
        .map(|&(first, second)| Pair(PathBuf::from(first), PathBuf::from(second)))
        .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn retrieval_requires_an_external_generator() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut matching = matching_with(
        dir.path(),
        MatchingOptions {
            strategy: MatchingStrategy::Retrieval,
            ..MatchingOptions::default()
        },
    );
    let result = matching.generate_pairs();
    assert!(matches!(result, Err(MatchingError::RetrievalUnavailable)));
}

#[test]
fn custom_pairs_without_pair_file_is_reported() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut matching = matching_with(
        dir.path(),
        MatchingOptions {
            strategy: MatchingStrategy::CustomPairs,
            pair_file: None,
            ..MatchingOptions::default()
        },
    );
    let result = matching.generate_pairs();
    assert!(matches!(result, Err(MatchingError::MissingPairFile)));
}
