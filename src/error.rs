// Error type for the host edges (window, camera, files, export).
// The compositor itself never fails; it degrades to blank output instead.
// Every variant states *where* things went wrong.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Creating the window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Opening/starting the camera failed.
    #[error("camera init error: {0}")]
    CameraInit(String),

    /// Grabbing/decoding a camera frame failed.
    #[error("camera frame error: {0}")]
    CameraFrame(String),

    /// A still image could not be opened or decoded.
    #[error("image decode error ({path}): {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The settings file could not be read.
    #[error("settings read error ({path}): {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not a JSON object.
    #[error("settings parse error: {0}")]
    SettingsParse(#[from] serde_json::Error),

    /// Rasterizing or encoding an export failed.
    #[error("export error: {0}")]
    Export(String),

    /// Writing the export PNG failed.
    #[error("export write error: {0}")]
    ExportWrite(#[from] image::ImageError),
}

impl Error {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}
