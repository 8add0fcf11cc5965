use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use image_matching::{
    normalize_color, FeatureMatcher, GeneralConfig, ImageMatching, MatchedPoint, MatcherKind,
    MatchingConfig, MatchingOptions, MatchingSession, PairMatches,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

fn write_image(dir: &Path, name: &str) {
    let image = RgbImage::from_pixel(8, 8, Rgb([64, 128, 192]));
    image
        .save(dir.join(name))
        .expect("failed to write test image");
}

fn points(count: usize, tag: usize) -> Vec<MatchedPoint> {
    (0..count)
        .map(|ix| MatchedPoint {
            x: ix as f32,
            y: tag as f32,
        })
        .collect()
}

/// Returns scripted point counts, one script entry per call.
struct StubMatcher {
    calls: usize,
    counts: Vec<(usize, usize)>,
}

impl StubMatcher {
    fn new(counts: Vec<(usize, usize)>) -> Self {
        Self { calls: 0, counts }
    }
}

impl FeatureMatcher for StubMatcher {
    fn match_pair(
        &mut self,
        _image0: &RgbImage,
        _image1: &RgbImage,
    ) -> image_matching::Result<PairMatches> {
        let (count0, count1) = self.counts[self.calls];
        self.calls += 1;
        Ok(PairMatches {
            points0: points(count0, self.calls),
            points1: points(count1, self.calls),
            descriptors0: None,
            descriptors1: None,
        })
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::Loftr
    }
}

fn three_image_matching(dir: &Path) -> ImageMatching {
    write_image(dir, "a.png");
    write_image(dir, "b.png");
    write_image(dir, "c.png");
    ImageMatching::new(dir, MatchingOptions::default(), MatchingConfig::default())
        .expect("three images should be enough")
}

#[test]
fn exhaustive_run_fills_both_maps() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut matching = three_image_matching(dir.path());
    assert_eq!(matching.generate_pairs().expect("generation").len(), 3);

    let mut matcher = StubMatcher::new(vec![(3, 3), (3, 3), (3, 3)]);
    matching
        .match_pairs_with(&mut matcher)
        .expect("stub matching cannot fail");

    let mut names: Vec<&str> = matching.keypoints().keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b", "c"]);

    assert_eq!(matching.correspondences().len(), 3);
    for correspondences in matching.correspondences().values() {
        assert_eq!(correspondences, &vec![(0, 0), (1, 1), (2, 2)]);
    }
}

#[test]
fn keypoints_keep_only_the_last_pair() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut matching = three_image_matching(dir.path());
    // Exhaustive order over (a, b, c): (a,b), (a,c), (b,c).
    matching.generate_pairs().expect("generation");

    let mut matcher = StubMatcher::new(vec![(1, 1), (2, 2), (3, 3)]);
    matching
        .match_pairs_with(&mut matcher)
        .expect("stub matching cannot fail");

    let keypoints = matching.keypoints();
    assert_eq!(keypoints["a"].len(), 2);
    assert_eq!(keypoints["b"].len(), 3);
    assert_eq!(keypoints["c"].len(), 3);
    // `a` was last touched by the second pair, `b` and `c` by the third.
    assert_eq!(keypoints["a"][0].y, 2.0);
    assert_eq!(keypoints["b"][0].y, 3.0);
    assert_eq!(keypoints["c"][0].y, 3.0);
}

#[test]
fn correspondences_use_the_smaller_count() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_image(dir.path(), "a.png");
    write_image(dir.path(), "b.png");
    let mut matching = ImageMatching::new(
        dir.path(),
        MatchingOptions::default(),
        MatchingConfig::default(),
    )
    .expect("two images should be enough");
    matching.generate_pairs().expect("generation");

    let mut matcher = StubMatcher::new(vec![(2, 5)]);
    matching
        .match_pairs_with(&mut matcher)
        .expect("stub matching cannot fail");

    let correspondences = matching.correspondences().values().next().expect("one pair");
    assert_eq!(correspondences, &vec![(0, 0), (1, 1)]);
}

#[test]
fn grayscale_is_converted_to_three_channels() {
    let rgb = normalize_color(DynamicImage::ImageLuma8(GrayImage::new(4, 6)));
    assert_eq!(rgb.dimensions(), (4, 6));

    let color = RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]));
    let unchanged = normalize_color(DynamicImage::ImageRgb8(color.clone()));
    assert_eq!(unchanged, color);
}

#[test]
fn detect_and_describe_runs_end_to_end() {
    // A checkerboard gives the detector something to respond to.
    let image = RgbImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([230, 230, 230])
        } else {
            Rgb([25, 25, 25])
        }
    });
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    image
        .save(dir.path().join("a.png"))
        .expect("failed to write test image");
    image
        .save(dir.path().join("b.png"))
        .expect("failed to write test image");

    let mut matching = ImageMatching::new(
        dir.path(),
        MatchingOptions::default(),
        MatchingConfig::default(),
    )
    .expect("two images should be enough");
    matching.generate_pairs().expect("generation");
    matching.match_pairs().expect("akaze needs no external engine");

    assert_eq!(matching.keypoints().len(), 2);
    assert_eq!(matching.correspondences().len(), 1);
    let correspondences = matching.correspondences().values().next().expect("one pair");
    for (ix, &(first, second)) in correspondences.iter().enumerate() {
        assert_eq!((first, second), (ix, ix));
    }
}

#[test]
fn learned_run_passes_the_general_section() {
    struct RecordingSession {
        seen: Arc<Mutex<Option<GeneralConfig>>>,
    }

    impl MatchingSession for RecordingSession {
        fn match_images(
            &mut self,
            _image0: &RgbImage,
            _image1: &RgbImage,
            general: &GeneralConfig,
        ) -> image_matching::Result<(Vec<MatchedPoint>, Vec<MatchedPoint>)> {
            *self.seen.lock().unwrap() = Some(general.clone());
            Ok((points(2, 0), points(2, 0)))
        }
    }

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    write_image(dir.path(), "a.png");
    write_image(dir.path(), "b.png");
    let config = MatchingConfig::default();
    let mut matching = ImageMatching::new(
        dir.path(),
        MatchingOptions {
            local_features: MatcherKind::Loftr,
            ..MatchingOptions::default()
        },
        config.clone(),
    )
    .expect("two images should be enough");

    let seen = Arc::new(Mutex::new(None));
    matching.register_session(
        MatcherKind::Loftr,
        Box::new(RecordingSession { seen: seen.clone() }),
    );
    matching.generate_pairs().expect("generation");
    matching.match_pairs().expect("stub session cannot fail");

    assert_eq!(seen.lock().unwrap().as_ref(), Some(&config.general));
    assert_eq!(matching.keypoints().len(), 2);
    assert_eq!(matching.correspondences().len(), 1);
}
