use super::{DetectorKind, FeatureMatcher, MatchedPoint, MatcherKind, PairMatches};
use crate::config::{AkazeConfig, MatchingConfig};
use crate::error::{MatchingError, Result};
use akaze::Akaze;
use bitarray::{BitArray, Hamming};
use float_ord::FloatOrd;
use image::{DynamicImage, RgbImage};
use log::*;
use space::{Knn, LinearKnn};
use std::cmp::Reverse;

/// Features extracted from a single image: keypoints with their binary
/// descriptors, parallel by index.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFeatures {
    pub keypoints: Vec<MatchedPoint>,
    pub descriptors: Vec<BitArray<64>>,
}

/// Boundary to a detect-and-describe engine.
///
/// The descriptor contract is 512-bit binary compared under Hamming
/// distance; engines with floating-point descriptors binarize before
/// returning.
pub trait DetectorDescriptor {
    fn detect_and_describe(
        &mut self,
        image: &RgbImage,
        max_features: usize,
    ) -> Result<ExtractedFeatures>;
}

/// AKAZE detection and description, the built-in backend.
///
/// Keypoints are ranked by detector response and truncated to the
/// requested feature budget.
pub struct AkazeBackend {
    akaze: Akaze,
}

impl AkazeBackend {
    pub fn new(config: &AkazeConfig) -> Self {
        Self {
            akaze: Akaze::new(config.detector_threshold),
        }
    }
}

impl DetectorDescriptor for AkazeBackend {
    fn detect_and_describe(
        &mut self,
        image: &RgbImage,
        max_features: usize,
    ) -> Result<ExtractedFeatures> {
        let image = DynamicImage::ImageRgb8(image.clone());
        let (keypoints, descriptors) = self.akaze.extract(&image);
        let mut order: Vec<usize> = (0..keypoints.len()).collect();
        order.sort_by_key(|&ix| Reverse(FloatOrd(keypoints[ix].response)));
        order.truncate(max_features);
        Ok(ExtractedFeatures {
            keypoints: order
                .iter()
                .map(|&ix| MatchedPoint {
                    x: keypoints[ix].point.0,
                    y: keypoints[ix].point.1,
                })
                .collect(),
            descriptors: order.iter().map(|&ix| descriptors[ix]).collect(),
        })
    }
}

/// A detector/descriptor selection together with its feature budget.
pub struct LocalFeatureExtractor {
    kind: DetectorKind,
    max_features: usize,
    backend: Box<dyn DetectorDescriptor>,
}

impl LocalFeatureExtractor {
    /// Builds the extractor named by `kind` from its section of `config`.
    ///
    /// Only the AKAZE backend is self-contained; ALIKE and ORB bind to
    /// external engines supplied through [`Self::with_backend`].
    pub fn new(
        kind: DetectorKind,
        config: &MatchingConfig,
        max_features: usize,
    ) -> Result<Self> {
        let backend: Box<dyn DetectorDescriptor> = match kind {
            DetectorKind::Akaze => Box::new(AkazeBackend::new(&config.akaze)),
            DetectorKind::Alike | DetectorKind::Orb => {
                return Err(MatchingError::DetectorUnavailable(kind))
            }
        };
        Ok(Self {
            kind,
            max_features,
            backend,
        })
    }

    /// Wraps an externally provided extraction engine.
    pub fn with_backend(
        kind: DetectorKind,
        backend: Box<dyn DetectorDescriptor>,
        max_features: usize,
    ) -> Self {
        Self {
            kind,
            max_features,
            backend,
        }
    }

    pub fn kind(&self) -> DetectorKind {
        self.kind
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn extract(&mut self, image: &RgbImage) -> Result<ExtractedFeatures> {
        self.backend.detect_and_describe(image, self.max_features)
    }
}

/// Classical two-stage matching: detect and describe both images, then
/// keep the symmetric nearest-neighbor descriptor matches.
pub struct DetectAndDescribeMatcher {
    extractor: LocalFeatureExtractor,
    config: MatchingConfig,
}

impl DetectAndDescribeMatcher {
    pub fn new(extractor: LocalFeatureExtractor, config: MatchingConfig) -> Self {
        Self { extractor, config }
    }

    /// Builds the matcher the dispatch selects: constructs the configured
    /// extractor and embeds it alongside the full configuration, with the
    /// feature budget written into the ALIKE section's `n_limit`.
    pub fn from_config(config: &MatchingConfig, max_features: usize) -> Result<Self> {
        let extractor = LocalFeatureExtractor::new(
            config.general.detector_and_descriptor,
            config,
            max_features,
        )?;
        let mut config = config.clone();
        config.alike.n_limit = max_features;
        Ok(Self::new(extractor, config))
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn extractor(&self) -> &LocalFeatureExtractor {
        &self.extractor
    }
}

impl FeatureMatcher for DetectAndDescribeMatcher {
    fn match_pair(&mut self, image0: &RgbImage, image1: &RgbImage) -> Result<PairMatches> {
        let features0 = self.extractor.extract(image0)?;
        let features1 = self.extractor.extract(image1)?;
        debug!(
            "extracted {} and {} features",
            features0.keypoints.len(),
            features1.keypoints.len()
        );

        let matches = symmetric_matching(
            &features0.descriptors,
            &features1.descriptors,
            self.config.general.match_better_by,
        );

        let mut result = PairMatches::default();
        let mut descriptors0 = Vec::with_capacity(matches.len());
        let mut descriptors1 = Vec::with_capacity(matches.len());
        for &[ix0, ix1] in &matches {
            result.points0.push(features0.keypoints[ix0]);
            result.points1.push(features1.keypoints[ix1]);
            descriptors0.push(features0.descriptors[ix0]);
            descriptors1.push(features1.descriptors[ix1]);
        }
        result.descriptors0 = Some(descriptors0);
        result.descriptors1 = Some(descriptors1);
        Ok(result)
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::DetectAndDescribe
    }
}

/// Non-symmetric matching from `a` to `b`: the best match in `b` for each
/// descriptor of `a`, kept only when it beats the second best by
/// `better_by` Hamming distance.
fn matching(a: &[BitArray<64>], b: &[BitArray<64>], better_by: u32) -> Vec<Option<usize>> {
    if b.len() < 2 {
        return vec![None; a.len()];
    }
    let knn_b = LinearKnn {
        metric: Hamming,
        iter: b.iter(),
    };
    (0..a.len())
        .map(|a_feature| {
            let knn = knn_b.knn(&a[a_feature], 2);
            if knn[0].distance + better_by < knn[1].distance {
                Some(knn[0].index)
            } else {
                None
            }
        })
        .collect()
}

/// Symmetric matching between `a` and `b`.
///
/// A match is kept only when the best match of the `a` feature is the `b`
/// feature and the best match of that `b` feature is the same `a` feature.
fn symmetric_matching(a: &[BitArray<64>], b: &[BitArray<64>], better_by: u32) -> Vec<[usize; 2]> {
    let forward_matches = matching(a, b, better_by);
    let reverse_matches = matching(b, a, better_by);
    forward_matches
        .into_iter()
        .enumerate()
        .filter_map(move |(aix, bix)| {
            bix.map(|bix| [aix, bix])
                .filter(|&[aix, bix]| reverse_matches[bix] == Some(aix))
        })
        .collect()
}
