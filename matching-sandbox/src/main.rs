use image_matching::{
    ImageMatching, MatcherKind, MatchingConfig, MatchingOptions, MatchingStrategy,
    RetrievalOption,
};
use log::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(name = "matching-sandbox", about = "A tool for testing image pair matching")]
struct Opt {
    /// The pair selection strategy.
    ///
    /// One of `exhaustive`, `sequential`, `retrieval`, or `custom_pairs`.
    #[structopt(short, long, default_value = "exhaustive")]
    strategy: MatchingStrategy,
    /// A text file of custom pairs, one `<image0> <image1>` per line.
    ///
    /// Consumed only together with the `custom_pairs` strategy.
    #[structopt(short, long)]
    pair_file: Option<PathBuf>,
    /// The retrieval method used to shortlist pairs.
    #[structopt(long, default_value = "none")]
    retrieval: RetrievalOption,
    /// How many neighboring images each image is paired with by the
    /// sequential strategy.
    #[structopt(long, default_value = "1")]
    overlap: usize,
    /// The local feature algorithm.
    ///
    /// One of `lightglue`, `superglue`, `loftr`, or `detect_and_describe`.
    #[structopt(short, long, default_value = "detect_and_describe")]
    local_features: MatcherKind,
    /// The file where the matcher configuration is specified.
    ///
    /// This is in the format of `image_matching::MatchingConfig`.
    #[structopt(short, long, default_value = "matching-config.json")]
    config: PathBuf,
    /// The maximum number of features extracted per image.
    #[structopt(long, default_value = "8000")]
    max_features: usize,
    /// The file where the keypoints map is written.
    #[structopt(long, default_value = "keypoints.json")]
    keypoints: PathBuf,
    /// The file where the correspondences are written.
    #[structopt(long, default_value = "correspondences.json")]
    correspondences: PathBuf,
    /// The directory containing the images to match.
    #[structopt(parse(from_os_str))]
    imgs_dir: PathBuf,
}

#[derive(Serialize)]
struct PairRecord<'a> {
    image0: &'a Path,
    image1: &'a Path,
    matches: &'a [(usize, usize)],
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let config = std::fs::File::open(&opt.config)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if config.is_some() {
        info!("loaded matcher configuration");
    } else {
        info!("used default matcher configuration");
    }
    let config: MatchingConfig = config.unwrap_or_default();

    let options = MatchingOptions {
        strategy: opt.strategy,
        pair_file: opt.pair_file.clone(),
        retrieval: opt.retrieval,
        overlap: opt.overlap,
        local_features: opt.local_features,
        max_features: opt.max_features,
    };

    let mut matching = ImageMatching::new(&opt.imgs_dir, options, config)
        .expect("failed to initialize image matching");
    matching.generate_pairs().expect("failed to generate pairs");
    matching.match_pairs().expect("failed to match pairs");

    info!("saving the keypoints map");
    match std::fs::File::create(&opt.keypoints) {
        Ok(file) => {
            if let Err(e) = serde_json::to_writer_pretty(file, matching.keypoints()) {
                error!("unable to save keypoints: {}", e);
            }
        }
        Err(e) => error!("unable to create {}: {}", opt.keypoints.display(), e),
    }

    info!("saving the correspondences");
    let mut records: Vec<PairRecord> = matching
        .correspondences()
        .iter()
        .map(|((image0, image1), matches)| PairRecord {
            image0,
            image1,
            matches,
        })
        .collect();
    records.sort_by(|a, b| (a.image0, a.image1).cmp(&(b.image0, b.image1)));
    match std::fs::File::create(&opt.correspondences) {
        Ok(file) => {
            if let Err(e) = serde_json::to_writer_pretty(file, &records) {
                error!("unable to save correspondences: {}", e);
            }
        }
        Err(e) => error!("unable to create {}: {}", opt.correspondences.display(), e),
    }
}
