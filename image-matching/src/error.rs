use crate::matchers::{DetectorKind, MatcherKind};
use thiserror::Error;

/// Failures reported by the matching orchestration.
///
/// The run is a one-shot batch: the first error aborts it and no partial
/// results are valid.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("image folder is empty; supported formats: .jpg, .JPG, .png")]
    EmptyImageFolder,
    #[error("image folder must contain at least two images")]
    InsufficientImages,
    #[error("unrecognized local feature algorithm `{0}`")]
    UnknownLocalFeatures(String),
    #[error("unrecognized detector and descriptor `{0}`")]
    UnknownDetector(String),
    #[error("unrecognized matching strategy `{0}`")]
    UnknownStrategy(String),
    #[error("unrecognized retrieval option `{0}`")]
    UnknownRetrieval(String),
    #[error("pair line `{0}` does not name two images")]
    MalformedPairLine(String),
    #[error("matching strategy `custom_pairs` requires a pair file")]
    MissingPairFile,
    #[error("retrieval pair selection requires an external pairs generator")]
    RetrievalUnavailable,
    #[error("no matching session registered for `{0}`")]
    SessionUnavailable(MatcherKind),
    #[error("no extraction backend available for `{0}`")]
    DetectorUnavailable(DetectorKind),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, MatchingError>;
