use crate::error::{FormatError, FormatErrorKind};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Matplotlib's Set3 qualitative palette.
const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// Canvas geometry, palette and typography for chart rendering. Every field
/// has a default, so a JSON config only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width_px: f64,
    pub row_height_px: f64,
    pub margin_left_px: f64,
    pub margin_right_px: f64,
    pub margin_top_px: f64,
    pub margin_bottom_px: f64,
    pub title_height_px: f64,
    pub font_family: String,
    pub title_font_size_px: f64,
    pub bar_font_size_px: f64,
    pub label_font_size_px: f64,
    /// Approximate glyph advance as a fraction of the font size.
    pub glyph_width_ratio: f64,
    /// Labels wrap at this many characters without splitting words.
    pub wrap_chars: usize,
    pub max_label_lanes: usize,
    /// The month axis always reaches at least this month.
    pub timeline_months: u32,
    pub stripe_px: f64,
    pub palette: Vec<String>,
    pub milestone_color: String,
    pub grid_color: String,
    pub text_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width_px: 1600.0,
            row_height_px: 28.0,
            margin_left_px: 240.0,
            margin_right_px: 40.0,
            margin_top_px: 16.0,
            margin_bottom_px: 56.0,
            title_height_px: 44.0,
            font_family: "DejaVu Sans, Arial, sans-serif".to_string(),
            title_font_size_px: 20.0,
            bar_font_size_px: 11.0,
            label_font_size_px: 12.0,
            glyph_width_ratio: 0.6,
            wrap_chars: 20,
            max_label_lanes: 3,
            timeline_months: 36,
            stripe_px: 6.0,
            palette: SET3.iter().map(|c| c.to_string()).collect(),
            milestone_color: "#808080".to_string(),
            grid_color: "#d0d0d0".to_string(),
            text_color: "#333333".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| FormatError::new(path, err))?;
        let config: ChartConfig =
            serde_json::from_reader(file).map_err(|err| FormatError::new(path, err))?;
        config
            .check()
            .map_err(|msg| FormatError::new(path, FormatErrorKind::InvalidStructure(msg)))?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), String> {
        if self.palette.is_empty() {
            return Err("palette must contain at least one color".into());
        }
        if self.width_px <= self.margin_left_px + self.margin_right_px {
            return Err(format!(
                "width_px {} leaves no room for the plot area",
                self.width_px
            ));
        }
        if self.row_height_px <= 0.0 || self.stripe_px <= 0.0 {
            return Err("row_height_px and stripe_px must be positive".into());
        }
        if self.wrap_chars == 0 || self.max_label_lanes == 0 {
            return Err("wrap_chars and max_label_lanes must be at least 1".into());
        }
        Ok(())
    }

    pub fn plot_width_px(&self) -> f64 {
        self.width_px - self.margin_left_px - self.margin_right_px
    }

    pub fn label_line_height_px(&self) -> f64 {
        self.label_font_size_px * 1.25
    }

    /// Rough rendered width of a wrapped milestone label.
    pub fn label_width_px(&self) -> f64 {
        self.wrap_chars as f64 * self.label_font_size_px * self.glyph_width_ratio
    }
}
