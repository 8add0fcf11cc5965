use crate::error::MatchingError;
use crate::matchers::{DetectorKind, MatcherKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How the pairs to match are selected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Match every image against every other image.
    Exhaustive,
    /// Match each image against its neighbors in enumeration order.
    Sequential,
    /// Shortlist pairs with an external image-retrieval method.
    Retrieval,
    /// Read literal pairs from a pair file.
    CustomPairs,
}

impl fmt::Display for MatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchingStrategy::Exhaustive => "exhaustive",
            MatchingStrategy::Sequential => "sequential",
            MatchingStrategy::Retrieval => "retrieval",
            MatchingStrategy::CustomPairs => "custom_pairs",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MatchingStrategy {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhaustive" => Ok(MatchingStrategy::Exhaustive),
            "sequential" => Ok(MatchingStrategy::Sequential),
            "retrieval" => Ok(MatchingStrategy::Retrieval),
            "custom_pairs" => Ok(MatchingStrategy::CustomPairs),
            other => Err(MatchingError::UnknownStrategy(other.to_owned())),
        }
    }
}

/// The image-retrieval method used by retrieval pair selection.
///
/// Consumed by external pairs generators; the built-in generators ignore it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalOption {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "netvlad")]
    NetVlad,
    #[serde(rename = "cosplace")]
    CosPlace,
    #[serde(rename = "openibl")]
    OpenIbl,
}

impl fmt::Display for RetrievalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetrievalOption::None => "none",
            RetrievalOption::NetVlad => "netvlad",
            RetrievalOption::CosPlace => "cosplace",
            RetrievalOption::OpenIbl => "openibl",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RetrievalOption {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RetrievalOption::None),
            "netvlad" => Ok(RetrievalOption::NetVlad),
            "cosplace" => Ok(RetrievalOption::CosPlace),
            "openibl" => Ok(RetrievalOption::OpenIbl),
            other => Err(MatchingError::UnknownRetrieval(other.to_owned())),
        }
    }
}

/// The run-wide options, fixed at construction and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingOptions {
    /// How the pairs to match are selected.
    #[serde(default = "default_strategy")]
    pub strategy: MatchingStrategy,
    /// A text file of custom pairs, consumed only by the `custom_pairs` strategy.
    #[serde(default)]
    pub pair_file: Option<PathBuf>,
    /// The retrieval method used to shortlist pairs.
    #[serde(default = "default_retrieval")]
    pub retrieval: RetrievalOption,
    /// How many successors each image is paired with by the sequential strategy.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// The local feature algorithm used to match each pair.
    #[serde(default = "default_local_features")]
    pub local_features: MatcherKind,
    /// The maximum number of features extracted per image.
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            pair_file: None,
            retrieval: default_retrieval(),
            overlap: default_overlap(),
            local_features: default_local_features(),
            max_features: default_max_features(),
        }
    }
}

/// The matcher configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Parameters shared by every matcher.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Parameters for the ALIKE extraction engine.
    #[serde(default)]
    pub alike: AlikeConfig,
    /// Parameters for the ORB extraction engine.
    #[serde(default)]
    pub orb: OrbConfig,
    /// Parameters for the AKAZE extractor.
    #[serde(default)]
    pub akaze: AkazeConfig,
}

/// Parameters shared by every matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// The detector and descriptor used by the detect-and-describe strategy.
    #[serde(default = "default_detector_and_descriptor")]
    pub detector_and_descriptor: DetectorKind,
    /// The inference resolution requested from learned matchers.
    #[serde(default = "default_quality")]
    pub quality: Quality,
    /// How learned matchers tile large images before inference.
    #[serde(default = "default_tile_selection")]
    pub tile_selection: TileSelection,
    /// The difference between the first and second best descriptor distance
    /// above which a match is kept.
    #[serde(default = "default_match_better_by")]
    pub match_better_by: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            detector_and_descriptor: default_detector_and_descriptor(),
            quality: default_quality(),
            tile_selection: default_tile_selection(),
            match_better_by: default_match_better_by(),
        }
    }
}

/// The inference resolution requested from learned matchers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Highest,
    High,
    Medium,
    Low,
}

/// How learned matchers tile large images before inference.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSelection {
    None,
    Preselection,
    Grid,
    Exhaustive,
}

/// Parameters for the ALIKE extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlikeConfig {
    /// Maximum number of keypoints returned by the engine.
    ///
    /// Overwritten with the run's `max_features` when the
    /// detect-and-describe strategy is selected.
    #[serde(default = "default_alike_n_limit")]
    pub n_limit: usize,
    /// Detection score threshold to accept a keypoint.
    #[serde(default = "default_alike_detection_threshold")]
    pub detection_threshold: f64,
}

impl Default for AlikeConfig {
    fn default() -> Self {
        Self {
            n_limit: default_alike_n_limit(),
            detection_threshold: default_alike_detection_threshold(),
        }
    }
}

/// Parameters for the ORB extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbConfig {
    #[serde(default = "default_orb_n_features")]
    pub n_features: usize,
    #[serde(default = "default_orb_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_orb_n_levels")]
    pub n_levels: usize,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            n_features: default_orb_n_features(),
            scale_factor: default_orb_scale_factor(),
            n_levels: default_orb_n_levels(),
        }
    }
}

/// Parameters for the AKAZE extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AkazeConfig {
    /// Detector response threshold to accept a keypoint.
    #[serde(default = "default_akaze_detector_threshold")]
    pub detector_threshold: f64,
}

impl Default for AkazeConfig {
    fn default() -> Self {
        Self {
            detector_threshold: default_akaze_detector_threshold(),
        }
    }
}

fn default_strategy() -> MatchingStrategy {
    MatchingStrategy::Exhaustive
}

fn default_retrieval() -> RetrievalOption {
    RetrievalOption::None
}

fn default_overlap() -> usize {
    1
}

fn default_local_features() -> MatcherKind {
    MatcherKind::DetectAndDescribe
}

fn default_max_features() -> usize {
    8000
}

fn default_detector_and_descriptor() -> DetectorKind {
    DetectorKind::Akaze
}

fn default_quality() -> Quality {
    Quality::High
}

fn default_tile_selection() -> TileSelection {
    TileSelection::None
}

fn default_match_better_by() -> u32 {
    24
}

fn default_alike_n_limit() -> usize {
    8000
}

fn default_alike_detection_threshold() -> f64 {
    0.2
}

fn default_orb_n_features() -> usize {
    4096
}

fn default_orb_scale_factor() -> f64 {
    1.2
}

fn default_orb_n_levels() -> usize {
    8
}

fn default_akaze_detector_threshold() -> f64 {
    0.001
}
