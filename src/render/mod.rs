use crate::error::{FormatError, FormatErrorKind, Result};
use crate::layout::{Axis, Bar, Layout, MilestoneLabel, MilestoneMarker, WorkPackageBand};
use std::path::Path;
use tracing::debug;

pub mod svg;

pub use svg::SvgSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> std::result::Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(FormatError::new(
                path,
                FormatErrorKind::UnsupportedOutput(ext),
            )),
        }
    }
}

/// Something a [`Layout`] can be drawn onto. Coordinates are chart units:
/// months along x, row indices and label lanes along y.
pub trait DrawingSurface {
    fn draw_frame(&mut self, axis: Axis, rows: usize, lanes: usize);
    fn draw_bar(&mut self, bar: &Bar);
    fn draw_vertical_line(&mut self, marker: &MilestoneMarker);
    fn place_label(&mut self, label: &MilestoneLabel);
    fn draw_bracket(&mut self, band: &WorkPackageBand);
    fn save(&self, path: &Path, dpi: u32, format: ImageFormat) -> Result<()>;
    fn show(&self) -> Result<()>;
}

/// Replays `layout` onto `surface`, back to front.
pub fn draw_chart<S: DrawingSurface + ?Sized>(layout: &Layout, surface: &mut S) {
    surface.draw_frame(layout.axis, layout.row_count, layout.lane_count);
    for band in &layout.bands {
        surface.draw_bracket(band);
    }
    for bar in &layout.bars {
        surface.draw_bar(bar);
    }
    for marker in &layout.markers {
        surface.draw_vertical_line(marker);
    }
    for label in &layout.labels {
        surface.place_label(label);
    }
    debug!(
        bars = layout.bars.len(),
        markers = layout.markers.len(),
        "chart drawn"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(
            ImageFormat::from_path(Path::new("chart.SVG")).unwrap(),
            ImageFormat::Svg
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("out/chart.png")).unwrap(),
            ImageFormat::Png
        );
        let err = ImageFormat::from_path(Path::new("chart.pdf")).unwrap_err();
        assert!(matches!(err.kind, FormatErrorKind::UnsupportedOutput(ref ext) if ext == "pdf"));
        assert!(ImageFormat::from_path(Path::new("chart")).is_err());
    }
}
