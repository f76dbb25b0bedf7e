// Still-image source. Decoding runs on its own thread and swaps the finished
// frame in whole, so a frame in progress only ever sees the previous image or
// none. The decode that finishes last wins; a failed decode clears the slot.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::SystemTime;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::FrameSource;

/// Decode any format `image` understands into an RGBA frame.
pub fn decode_file(path: &Path) -> Result<FrameSource> {
    let img = image::open(path)
        .map_err(|source| Error::ImageDecode { path: path.to_path_buf(), source })?
        .to_rgba8();
    let (w, h) = img.dimensions();
    FrameSource::new(w as usize, h as usize, img.into_raw()).ok_or_else(|| Error::ImageDecode {
        path: path.to_path_buf(),
        source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        )),
    })
}

/// Shared holder for the current still image (`None` until one decodes).
#[derive(Clone, Default)]
pub struct ImageSlot {
    current: Arc<Mutex<Option<Arc<FrameSource>>>>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last fully decoded image.
    pub fn current(&self) -> Option<Arc<FrameSource>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the image (or clear it with `None`).
    pub fn set(&self, source: Option<FrameSource>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = source.map(Arc::new);
    }

    /// Decode on the calling thread and swap the result in.
    pub fn load_blocking(&self, path: &Path) -> Result<()> {
        match decode_file(path) {
            Ok(frame) => {
                info!(path = %path.display(), width = frame.width(), height = frame.height(), "image loaded");
                self.set(Some(frame));
                Ok(())
            }
            Err(e) => {
                self.set(None);
                Err(e)
            }
        }
    }

    /// Decode on a background thread. Failures are logged and leave the slot empty.
    pub fn request(&self, path: PathBuf) -> JoinHandle<()> {
        let slot = self.clone();
        thread::spawn(move || {
            if let Err(e) = slot.load_blocking(&path) {
                warn!(error = %e, "image decode failed; no image");
            }
        })
    }
}

/// Follows the image path chosen in the settings and requests a decode
/// whenever the path changes or the file on disk is newer.
#[derive(Default)]
pub struct ImageFeed {
    slot: ImageSlot,
    requested: Option<(PathBuf, Option<SystemTime>)>,
}

impl ImageFeed {
    pub fn new(slot: ImageSlot) -> Self {
        Self { slot, requested: None }
    }

    pub fn slot(&self) -> &ImageSlot {
        &self.slot
    }

    /// Request `path` unless it was already requested at its current mtime.
    /// `None` keeps whatever image is loaded.
    pub fn follow(&mut self, path: Option<&Path>) -> Option<JoinHandle<()>> {
        let path = path?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        if let Some((last, last_modified)) = &self.requested {
            if last == path && *last_modified == modified {
                return None;
            }
        }
        self.requested = Some((path.to_path_buf(), modified));
        Some(self.slot.request(path.to_path_buf()))
    }
}
