//! Pairwise image matching orchestration for photogrammetry pipelines.
//!
//! Given a directory of images, [`ImageMatching`] decides which image pairs
//! to compare, runs the selected keypoint-matching algorithm on each pair,
//! and accumulates matched keypoint coordinates and correspondence indices
//! for downstream bundle adjustment.
//!
//! The run is strictly sequential and atomic: pairs are matched in
//! generator order, everything accumulates in memory, and the first error
//! aborts the whole run with no partial results.

pub mod config;
pub mod error;
pub mod image_list;
pub mod matchers;
pub mod pairs;

pub use config::{
    AkazeConfig, AlikeConfig, GeneralConfig, MatchingConfig, MatchingOptions, MatchingStrategy,
    OrbConfig, Quality, RetrievalOption, TileSelection,
};
pub use error::{MatchingError, Result};
pub use image_list::ImageList;
pub use matchers::{
    DetectAndDescribeMatcher, DetectorDescriptor, DetectorKind, FeatureMatcher,
    LightGlueMatcher, LoftrMatcher, LocalFeatureExtractor, MatchedPoint, MatcherKind,
    MatchingSession, PairMatches, SuperGlueMatcher,
};
pub use pairs::{ExhaustivePairs, Pair, PairsGenerator, SequentialPairs};

use image::{DynamicImage, RgbImage};
use log::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Matched keypoints keyed by image display name.
pub type Keypoints = HashMap<String, Vec<MatchedPoint>>;

/// Correspondence index pairs keyed by the full paths of each image pair.
pub type Correspondences = HashMap<(PathBuf, PathBuf), Vec<(usize, usize)>>;

/// Orchestrates pair selection and feature matching over an image folder.
///
/// Construction enumerates the folder and fails fast when it holds fewer
/// than two supported images. [`generate_pairs`](Self::generate_pairs)
/// then selects the pairs to match and
/// [`match_pairs`](Self::match_pairs) runs the configured matcher over
/// them, filling the keypoints and correspondences maps.
///
/// The keypoints map is keyed by image display name while the
/// correspondences map is keyed by full path pairs; downstream consumers
/// rely on both keyings. An image appearing in several pairs keeps only
/// the keypoints of its last matched pair.
pub struct ImageMatching {
    options: MatchingOptions,
    config: MatchingConfig,
    image_list: ImageList,
    sessions: HashMap<MatcherKind, Box<dyn MatchingSession>>,
    pairs: Vec<Pair>,
    keypoints: Keypoints,
    correspondences: Correspondences,
}

impl ImageMatching {
    /// Enumerates `imgs_dir` and validates that there is anything to match.
    pub fn new(
        imgs_dir: &Path,
        options: MatchingOptions,
        config: MatchingConfig,
    ) -> Result<Self> {
        let image_list = ImageList::new(imgs_dir)?;
        match image_list.len() {
            0 => return Err(MatchingError::EmptyImageFolder),
            1 => return Err(MatchingError::InsufficientImages),
            n => info!("found {} images in {}", n, imgs_dir.display()),
        }
        Ok(Self {
            options,
            config,
            image_list,
            sessions: HashMap::new(),
            pairs: Vec::new(),
            keypoints: HashMap::new(),
            correspondences: HashMap::new(),
        })
    }

    /// The display names of the enumerated images, in enumeration order.
    pub fn img_names(&self) -> Vec<String> {
        self.image_list.img_names()
    }

    pub fn image_list(&self) -> &ImageList {
        &self.image_list
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Matched keypoints keyed by image display name.
    ///
    /// An image revisited by a later pair keeps only that pair's keypoints.
    pub fn keypoints(&self) -> &Keypoints {
        &self.keypoints
    }

    /// Correspondence index pairs keyed by each pair's full paths.
    pub fn correspondences(&self) -> &Correspondences {
        &self.correspondences
    }

    /// Registers the inference engine backing a learned matcher.
    ///
    /// Sessions are consumed when the matcher is built; a run is one-shot.
    pub fn register_session(&mut self, kind: MatcherKind, session: Box<dyn MatchingSession>) {
        self.sessions.insert(kind, session);
    }

    /// Selects the pairs to match.
    ///
    /// When a pair file is configured together with the `custom_pairs`
    /// strategy, the file's literal pairs are used. Otherwise the built-in
    /// generator for the configured strategy runs; retrieval shortlisting
    /// has no built-in generator and must go through
    /// [`generate_pairs_with`](Self::generate_pairs_with).
    pub fn generate_pairs(&mut self) -> Result<&[Pair]> {
        match self.custom_pairs()? {
            Some(pairs) => self.pairs = pairs,
            None => {
                let mut generator = self.strategy_generator()?;
                self.pairs = generator.run()?;
                info!("generated {} pairs to match", self.pairs.len());
            }
        }
        Ok(&self.pairs)
    }

    /// Selects the pairs to match, delegating to `generator` unless custom
    /// pairs are configured.
    ///
    /// The generator's output is stored unmodified and in order.
    pub fn generate_pairs_with(
        &mut self,
        generator: &mut dyn PairsGenerator,
    ) -> Result<&[Pair]> {
        match self.custom_pairs()? {
            Some(pairs) => self.pairs = pairs,
            None => {
                self.pairs = generator.run()?;
                info!("generated {} pairs to match", self.pairs.len());
            }
        }
        Ok(&self.pairs)
    }

    /// Runs the configured matcher over every generated pair.
    pub fn match_pairs(&mut self) -> Result<()> {
        let mut matcher = self.build_matcher()?;
        self.match_pairs_with(matcher.as_mut())
    }

    /// Runs `matcher` over every generated pair in order, accumulating the
    /// keypoints and correspondences maps.
    pub fn match_pairs_with(&mut self, matcher: &mut dyn FeatureMatcher) -> Result<()> {
        for Pair(im0, im1) in &self.pairs {
            debug!("matching pair ({}, {})", im0.display(), im1.display());
            let image0 = normalize_color(image::open(im0)?);
            let image1 = normalize_color(image::open(im1)?);
            let matches = matcher.match_pair(&image0, &image1)?;

            let tie_points = matches.points0.len().min(matches.points1.len());
            debug!(
                "matched {} tie points for pair ({}, {})",
                tie_points,
                im0.display(),
                im1.display()
            );

            let name0 = image_list::display_name(im0);
            let name1 = image_list::display_name(im1);
            if self.keypoints.insert(name0, matches.points0).is_some() {
                debug!(
                    "keypoints for `{}` replaced by pair ({}, {})",
                    image_list::display_name(im0),
                    im0.display(),
                    im1.display()
                );
            }
            if self.keypoints.insert(name1, matches.points1).is_some() {
                debug!(
                    "keypoints for `{}` replaced by pair ({}, {})",
                    image_list::display_name(im1),
                    im0.display(),
                    im1.display()
                );
            }

            self.correspondences.insert(
                (im0.clone(), im1.clone()),
                (0..tie_points).map(|ix| (ix, ix)).collect(),
            );
        }
        info!("matched {} pairs", self.pairs.len());
        Ok(())
    }

    /// Builds the matcher named by the configured local feature algorithm.
    ///
    /// The three learned matchers receive the `general` configuration
    /// section and their registered session. Detect-and-describe receives
    /// the full configuration with an embedded extractor and the feature
    /// budget injected into the ALIKE section.
    pub fn build_matcher(&mut self) -> Result<Box<dyn FeatureMatcher>> {
        match self.options.local_features {
            MatcherKind::LightGlue => {
                let session = self.take_session(MatcherKind::LightGlue)?;
                Ok(Box::new(LightGlueMatcher::new(
                    session,
                    self.config.general.clone(),
                )))
            }
            MatcherKind::SuperGlue => {
                let session = self.take_session(MatcherKind::SuperGlue)?;
                Ok(Box::new(SuperGlueMatcher::new(
                    session,
                    self.config.general.clone(),
                )))
            }
            MatcherKind::Loftr => {
                let session = self.take_session(MatcherKind::Loftr)?;
                Ok(Box::new(LoftrMatcher::new(
                    session,
                    self.config.general.clone(),
                )))
            }
            MatcherKind::DetectAndDescribe => Ok(Box::new(
                DetectAndDescribeMatcher::from_config(&self.config, self.options.max_features)?,
            )),
        }
    }

    /// Reads the configured pair file when the strategy calls for custom pairs.
    fn custom_pairs(&self) -> Result<Option<Vec<Pair>>> {
        match (&self.options.pair_file, self.options.strategy) {
            (Some(pair_file), MatchingStrategy::CustomPairs) => {
                let pairs = pairs::read_pair_file(pair_file)?;
                info!(
                    "read {} custom pairs from {}",
                    pairs.len(),
                    pair_file.display()
                );
                Ok(Some(pairs))
            }
            _ => Ok(None),
        }
    }

    fn strategy_generator(&self) -> Result<Box<dyn PairsGenerator>> {
        match self.options.strategy {
            MatchingStrategy::Exhaustive => {
                Ok(Box::new(ExhaustivePairs::new(self.image_list.img_paths())))
            }
            MatchingStrategy::Sequential => Ok(Box::new(SequentialPairs::new(
                self.image_list.img_paths(),
                self.options.overlap,
            ))),
            MatchingStrategy::Retrieval => Err(MatchingError::RetrievalUnavailable),
            MatchingStrategy::CustomPairs => Err(MatchingError::MissingPairFile),
        }
    }

    fn take_session(&mut self, kind: MatcherKind) -> Result<Box<dyn MatchingSession>> {
        self.sessions
            .remove(&kind)
            .ok_or(MatchingError::SessionUnavailable(kind))
    }
}

/// Converts single-channel decodes to three-channel RGB.
///
/// Matchers assume three-channel input; an image that is already RGB
/// passes through unchanged.
pub fn normalize_color(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}
