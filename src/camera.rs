// Opens a camera and converts its frames into RGBA frame sources for the
// compositor.

use ascii_mirror::{Error, FrameSource, Result};
use tracing::info;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

// A small wrapper around nokhwa::Camera so the main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (falls back if not exact).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self> {
        let fmt = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, 30);
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The stream might choose a slightly different resolution.
        let actual = cam.resolution();
        info!(index, width = actual.width(), height = actual.height(), "camera opened");

        Ok(Self { cam })
    }

    /// Block for the next frame and expand it to RGBA.
    pub fn next_frame(&mut self) -> Result<FrameSource> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let mut rgba = Vec::with_capacity(w as usize * h as usize * 4);
        for px in rgb_img.pixels() {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        FrameSource::new(w as usize, h as usize, rgba)
            .ok_or_else(|| Error::CameraFrame(format!("Empty frame {w}x{h}")))
    }
}
