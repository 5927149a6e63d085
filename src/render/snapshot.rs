use std::borrow::Cow;
use std::path::Path;

use crate::error::Result;

/// RGBA pixels of a captured figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rgba: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Crop a viewport screenshot to `rect` (in points), or take it whole.
pub fn crop_screenshot(image: &egui::ColorImage, rect: Option<egui::Rect>, pixels_per_point: f32) -> Snapshot {
    let [full_w, full_h] = image.size;
    let (x0, y0, x1, y1) = match rect {
        Some(rect) => (
            ((rect.left() * pixels_per_point).max(0.0) as usize).min(full_w),
            ((rect.top() * pixels_per_point).max(0.0) as usize).min(full_h),
            ((rect.right() * pixels_per_point).ceil().max(0.0) as usize).min(full_w),
            ((rect.bottom() * pixels_per_point).ceil().max(0.0) as usize).min(full_h),
        ),
        None => (0, 0, full_w, full_h),
    };
    let width = x1.saturating_sub(x0);
    let height = y1.saturating_sub(y0);

    let mut rgba = Vec::with_capacity(width * height * 4);
    for row in y0..y1 {
        for c in &image.pixels[row * full_w + x0..row * full_w + x1] {
            rgba.extend_from_slice(&c.to_srgba_unmultiplied());
        }
    }
    Snapshot { rgba, width, height }
}

impl Snapshot {
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let img = image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.rgba.clone())
            .ok_or_else(|| std::io::Error::other("snapshot buffer does not match its size"))?;
        img.save(path)?;
        tracing::info!("saved figure image to {}", path.display());
        Ok(())
    }

    pub fn copy_to_clipboard(self) -> std::result::Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| format!("Failed to access clipboard: {e}"))?;
        clipboard
            .set_image(arboard::ImageData {
                width: self.width,
                height: self.height,
                bytes: Cow::Owned(self.rgba),
            })
            .map_err(|e| format!("Failed to copy to clipboard: {e}"))?;
        tracing::info!("copied figure image to clipboard");
        Ok(())
    }
}
