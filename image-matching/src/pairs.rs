use crate::error::{MatchingError, Result};
use itertools::Itertools;
use std::path::{Path, PathBuf};

/// An ordered pair of images selected for feature matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair(pub PathBuf, pub PathBuf);

/// Produces the ordered list of image pairs to run through the matcher.
///
/// The output order is significant: it determines the order in which pairs
/// are matched and therefore which pair's keypoints an image ends up with
/// when it participates in more than one pair.
pub trait PairsGenerator {
    fn run(&mut self) -> Result<Vec<Pair>>;
}

/// Pairs every image with every other image.
pub struct ExhaustivePairs {
    paths: Vec<PathBuf>,
}

impl ExhaustivePairs {
    pub fn new(paths: &[PathBuf]) -> Self {
        Self {
            paths: paths.to_vec(),
        }
    }
}

impl PairsGenerator for ExhaustivePairs {
    fn run(&mut self) -> Result<Vec<Pair>> {
        Ok(self
            .paths
            .iter()
            .cloned()
            .tuple_combinations()
            .map(|(first, second)| Pair(first, second))
            .collect())
    }
}

/// Pairs each image with its `overlap` successors in enumeration order.
pub struct SequentialPairs {
    paths: Vec<PathBuf>,
    overlap: usize,
}

impl SequentialPairs {
    pub fn new(paths: &[PathBuf], overlap: usize) -> Self {
        Self {
            paths: paths.to_vec(),
            overlap,
        }
    }
}

impl PairsGenerator for SequentialPairs {
    fn run(&mut self) -> Result<Vec<Pair>> {
        let mut pairs = Vec::new();
        for (ix, first) in self.paths.iter().enumerate() {
            for second in self.paths.iter().skip(ix + 1).take(self.overlap) {
                pairs.push(Pair(first.clone(), second.clone()));
            }
        }
        Ok(pairs)
    }
}

/// Reads literal pairs from a text file, one pair per line.
///
/// Each line is split once on its first space: the first token names
/// image0 and the remainder of the line names image1, so image1 may
/// contain embedded spaces. Tokens are used as paths verbatim; a token
/// that does not resolve to a readable image only fails at load time.
pub fn read_pair_file(path: &Path) -> Result<Vec<Pair>> {
    let contents = std::fs::read_to_string(path)?;
    let mut pairs = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        let (first, second) = line
            .split_once(' ')
            .ok_or_else(|| MatchingError::MalformedPairLine(line.to_owned()))?;
        pairs.push(Pair(PathBuf::from(first), PathBuf::from(second)));
    }
    Ok(pairs)
}
