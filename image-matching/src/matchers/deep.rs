use super::{FeatureMatcher, MatchedPoint, MatcherKind, PairMatches};
use crate::config::GeneralConfig;
use crate::error::Result;
use image::RgbImage;

/// Boundary to an external learned matching engine.
///
/// Implementations wrap whatever inference runtime hosts the network and
/// return two equal-length matched point sets: entry `i` of one set
/// corresponds to entry `i` of the other.
pub trait MatchingSession {
    fn match_images(
        &mut self,
        image0: &RgbImage,
        image1: &RgbImage,
        general: &GeneralConfig,
    ) -> Result<(Vec<MatchedPoint>, Vec<MatchedPoint>)>;
}

/// Sparse learned matching with LightGlue over its bundled extractor.
pub struct LightGlueMatcher {
    session: Box<dyn MatchingSession>,
    general: GeneralConfig,
}

impl LightGlueMatcher {
    pub fn new(session: Box<dyn MatchingSession>, general: GeneralConfig) -> Self {
        Self { session, general }
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }
}

impl FeatureMatcher for LightGlueMatcher {
    fn match_pair(&mut self, image0: &RgbImage, image1: &RgbImage) -> Result<PairMatches> {
        let (points0, points1) = self.session.match_images(image0, image1, &self.general)?;
        Ok(PairMatches {
            points0,
            points1,
            descriptors0: None,
            descriptors1: None,
        })
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::LightGlue
    }
}

/// Sparse learned matching with SuperGlue over SuperPoint features.
pub struct SuperGlueMatcher {
    session: Box<dyn MatchingSession>,
    general: GeneralConfig,
}

impl SuperGlueMatcher {
    pub fn new(session: Box<dyn MatchingSession>, general: GeneralConfig) -> Self {
        Self { session, general }
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }
}

impl FeatureMatcher for SuperGlueMatcher {
    fn match_pair(&mut self, image0: &RgbImage, image1: &RgbImage) -> Result<PairMatches> {
        let (points0, points1) = self.session.match_images(image0, image1, &self.general)?;
        Ok(PairMatches {
            points0,
            points1,
            descriptors0: None,
            descriptors1: None,
        })
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::SuperGlue
    }
}

/// Dense detector-free matching with LoFTR.
pub struct LoftrMatcher {
    session: Box<dyn MatchingSession>,
    general: GeneralConfig,
}

impl LoftrMatcher {
    pub fn new(session: Box<dyn MatchingSession>, general: GeneralConfig) -> Self {
        Self { session, general }
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }
}

impl FeatureMatcher for LoftrMatcher {
    fn match_pair(&mut self, image0: &RgbImage, image1: &RgbImage) -> Result<PairMatches> {
        let (points0, points1) = self.session.match_images(image0, image1, &self.general)?;
        Ok(PairMatches {
            points0,
            points1,
            descriptors0: None,
            descriptors1: None,
        })
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::Loftr
    }
}
