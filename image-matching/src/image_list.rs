use crate::error::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// The image formats the lister accepts, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// The supported images of a working directory, in name order.
///
/// Enumeration order is significant downstream: it fixes the order in which
/// the built-in pair generators emit pairs.
#[derive(Debug, Clone)]
pub struct ImageList {
    paths: Vec<PathBuf>,
}

impl ImageList {
    /// Enumerates the supported images directly inside `imgs_dir`.
    pub fn new(imgs_dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(imgs_dir)? {
            let path = entry?.path();
            if path.is_file() && is_supported(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self { paths })
    }

    pub fn img_paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The display names of the images, in enumeration order.
    pub fn img_names(&self) -> Vec<String> {
        self.paths.iter().map(|path| display_name(path)).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The display name an image is keyed by: its file stem.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
