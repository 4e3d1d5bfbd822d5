//! Preview thumbnails sourced from the external capture daemon's cache.
//!
//! Screenshots are refreshed out of band, so every resolve re-reads and
//! re-measures the file instead of trusting a previous measurement.

use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::debug;

use crate::constants::{
    PREVIEW_DIR_NAME, PREVIEW_MAX_WIDTH, PREVIEW_MIN_WIDTH, PREVIEW_TARGET_HEIGHT,
};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Display constraints for preview tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBounds {
    pub target_height: u32,
    pub min_width: u32,
    pub max_width: u32,
}

impl Default for PreviewBounds {
    fn default() -> Self {
        Self {
            target_height: PREVIEW_TARGET_HEIGHT,
            min_width: PREVIEW_MIN_WIDTH,
            max_width: PREVIEW_MAX_WIDTH,
        }
    }
}

impl PreviewBounds {
    pub fn fallback(&self) -> Dimensions {
        Dimensions {
            width: self.min_width,
            height: self.target_height,
        }
    }

    /// Scales an image of `width`x`height` to the target height, then clamps
    /// the width into `[min_width, max_width]`. When the clamp kicks in the
    /// height is re-derived from the clamped width so the aspect ratio holds.
    pub fn fit(&self, width: u32, height: u32) -> Dimensions {
        if width == 0 || height == 0 {
            return self.fallback();
        }
        let aspect = f64::from(width) / f64::from(height);
        let scaled = (f64::from(self.target_height) * aspect).round() as u32;
        let clamped = scaled.clamp(self.min_width, self.max_width.max(self.min_width));
        if clamped == scaled {
            return Dimensions {
                width: scaled,
                height: self.target_height,
            };
        }
        Dimensions {
            width: clamped,
            height: ((f64::from(clamped) / aspect).round() as u32).max(1),
        }
    }
}

/// Result of resolving one window's preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    /// Screenshot path, if one exists and decodes.
    pub path: Option<PathBuf>,
    pub dimensions: Dimensions,
}

impl PreviewEntry {
    pub fn is_fallback(&self) -> bool {
        self.path.is_none()
    }
}

/// Default location of the capture cache: tmpfs when available, otherwise
/// the system temp dir.
pub fn default_preview_dir() -> PathBuf {
    let shm = Path::new("/dev/shm");
    if shm.is_dir() {
        shm.join(PREVIEW_DIR_NAME)
    } else {
        std::env::temp_dir().join(PREVIEW_DIR_NAME)
    }
}

pub struct PreviewResolver {
    dir: PathBuf,
    bounds: PreviewBounds,
}

impl PreviewResolver {
    pub fn new(dir: PathBuf, bounds: PreviewBounds) -> Self {
        Self { dir, bounds }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn bounds(&self) -> PreviewBounds {
        self.bounds
    }

    /// Screenshot file for `address`; the capture daemon drops the `0x`.
    pub fn path_for(&self, address: &str) -> PathBuf {
        let clean = address.strip_prefix("0x").unwrap_or(address);
        self.dir.join(format!("{clean}.jpg"))
    }

    pub fn resolve(&self, address: &str) -> PreviewEntry {
        let path = self.path_for(address);
        match measure(&path) {
            Ok(Some((width, height))) => PreviewEntry {
                dimensions: self.bounds.fit(width, height),
                path: Some(path),
            },
            Ok(None) => PreviewEntry {
                path: None,
                dimensions: self.bounds.fallback(),
            },
            Err(err) => {
                debug!("preview {} unreadable: {err}", path.display());
                PreviewEntry {
                    path: None,
                    dimensions: self.bounds.fallback(),
                }
            }
        }
    }
}

/// Pixel size of the image at `path`, `None` if there is no file.
fn measure(path: &Path) -> Result<Option<(u32, u32)>> {
    let reader = match ImageReader::open(path) {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    // Only the header is decoded.
    let dims = reader.with_guessed_format()?.into_dimensions()?;
    Ok(Some(dims))
}
