mod deep;
mod detect_and_describe;

pub use deep::{LightGlueMatcher, LoftrMatcher, MatchingSession, SuperGlueMatcher};
pub use detect_and_describe::{
    AkazeBackend, DetectAndDescribeMatcher, DetectorDescriptor, ExtractedFeatures,
    LocalFeatureExtractor,
};

use crate::error::{MatchingError, Result};
use bitarray::BitArray;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A matched 2d feature location in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPoint {
    pub x: f32,
    pub y: f32,
}

/// The output of matching one image pair.
///
/// `points0` and `points1` have the same length under every shipped
/// matcher: entry `i` of one corresponds to entry `i` of the other.
/// Descriptors are only populated by detect-and-describe matchers.
#[derive(Debug, Clone, Default)]
pub struct PairMatches {
    pub points0: Vec<MatchedPoint>,
    pub points1: Vec<MatchedPoint>,
    pub descriptors0: Option<Vec<BitArray<64>>>,
    pub descriptors1: Option<Vec<BitArray<64>>>,
}

/// The one capability every matching algorithm provides.
pub trait FeatureMatcher {
    /// Computes corresponding keypoint sets between two color-normalized images.
    fn match_pair(&mut self, image0: &RgbImage, image1: &RgbImage) -> Result<PairMatches>;

    /// The algorithm this matcher implements.
    fn kind(&self) -> MatcherKind;
}

/// The closed set of supported matching algorithms.
///
/// Parsing an unrecognized name is a configuration error; there is no
/// fallback algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatcherKind {
    #[serde(rename = "lightglue")]
    LightGlue,
    #[serde(rename = "superglue")]
    SuperGlue,
    #[serde(rename = "loftr")]
    Loftr,
    #[serde(rename = "detect_and_describe")]
    DetectAndDescribe,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatcherKind::LightGlue => "lightglue",
            MatcherKind::SuperGlue => "superglue",
            MatcherKind::Loftr => "loftr",
            MatcherKind::DetectAndDescribe => "detect_and_describe",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MatcherKind {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lightglue" => Ok(MatcherKind::LightGlue),
            "superglue" => Ok(MatcherKind::SuperGlue),
            "loftr" => Ok(MatcherKind::Loftr),
            "detect_and_describe" => Ok(MatcherKind::DetectAndDescribe),
            other => Err(MatchingError::UnknownLocalFeatures(other.to_owned())),
        }
    }
}

/// The detectors and descriptors the detect-and-describe strategy selects from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Alike,
    Orb,
    Akaze,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorKind::Alike => "alike",
            DetectorKind::Orb => "orb",
            DetectorKind::Akaze => "akaze",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DetectorKind {
    type Err = MatchingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alike" => Ok(DetectorKind::Alike),
            "orb" => Ok(DetectorKind::Orb),
            "akaze" => Ok(DetectorKind::Akaze),
            other => Err(MatchingError::UnknownDetector(other.to_owned())),
        }
    }
}
