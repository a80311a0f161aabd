use super::{DrawingSurface, ImageFormat};
use crate::config::ChartConfig;
use crate::error::{FormatError, Result};
use crate::layout::{
    Axis, Bar, LabelPlacement, MarkerStyle, MilestoneLabel, MilestoneMarker, RowSpan,
    WorkPackageBand,
};
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Narrowest bar drawn, so zero-length tasks stay visible.
const MIN_BAR_WIDTH_PX: f64 = 3.0;
const BAR_FILL_RATIO: f64 = 0.7;
const MARKER_WIDTH_PX: f64 = 3.0;
const BRACKET_GAP_PX: f64 = 12.0;
const BRACKET_TICK_PX: f64 = 6.0;

/// Collects drawing calls and turns them into an SVG document. Pixel
/// geometry is resolved in [`SvgSurface::to_svg`], once the frame and every
/// label are known.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    config: ChartConfig,
    title: String,
    axis: Axis,
    rows: usize,
    lanes: usize,
    bars: Vec<Bar>,
    markers: Vec<MilestoneMarker>,
    labels: Vec<MilestoneLabel>,
    brackets: Vec<WorkPackageBand>,
}

struct Geometry {
    width: f64,
    height: f64,
    plot_left: f64,
    plot_top: f64,
    plot_bottom: f64,
    px_per_month: f64,
    first_month: f64,
    row_height: f64,
    lane_height: f64,
}

impl Geometry {
    fn x(&self, month: f64) -> f64 {
        self.plot_left + (month - self.first_month) * self.px_per_month
    }

    fn row_top(&self, row: usize) -> f64 {
        self.plot_top + row as f64 * self.row_height
    }

    fn row_center(&self, row: usize) -> f64 {
        self.row_top(row) + self.row_height / 2.0
    }
}

impl SvgSurface {
    pub fn new(config: ChartConfig, title: impl Into<String>) -> Self {
        Self {
            config,
            title: title.into(),
            axis: Axis {
                first_month: 0,
                last_month: 0,
            },
            rows: 0,
            lanes: 0,
            bars: Vec::new(),
            markers: Vec::new(),
            labels: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn geometry(&self) -> Geometry {
        let cfg = &self.config;
        let line_height = cfg.label_line_height_px();
        let max_lines = self
            .labels
            .iter()
            .map(|label| label.lines.len())
            .max()
            .unwrap_or(1)
            .max(1);
        let lane_height = max_lines as f64 * line_height + 6.0;
        let plot_top = cfg.margin_top_px + cfg.title_height_px + self.lanes as f64 * lane_height;
        let plot_bottom = plot_top + self.rows.max(1) as f64 * cfg.row_height_px;
        Geometry {
            width: cfg.width_px,
            height: plot_bottom + cfg.margin_bottom_px,
            plot_left: cfg.margin_left_px,
            plot_top,
            plot_bottom,
            px_per_month: cfg.plot_width_px() / self.axis.months().max(1) as f64,
            first_month: self.axis.first_month as f64,
            row_height: cfg.row_height_px,
            lane_height,
        }
    }

    pub fn to_svg(&self) -> String {
        let geo = self.geometry();
        let cfg = &self.config;
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="{font}">"#,
            w = geo.width,
            h = geo.height,
            font = escape_xml(&cfg.font_family),
        );
        let _ = writeln!(
            out,
            r#"<rect x="0" y="0" width="{:.0}" height="{:.0}" fill="white"/>"#,
            geo.width, geo.height
        );
        if !self.title.is_empty() {
            let _ = writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="{}" font-weight="bold" fill="{}">{}</text>"#,
                geo.width / 2.0,
                cfg.margin_top_px + cfg.title_font_size_px,
                cfg.title_font_size_px,
                cfg.text_color,
                escape_xml(&self.title)
            );
        }

        self.write_grid(&mut out, &geo);
        for band in &self.brackets {
            self.write_bracket(&mut out, &geo, band);
        }
        for bar in &self.bars {
            self.write_bar(&mut out, &geo, bar);
        }
        for marker in &self.markers {
            self.write_marker(&mut out, &geo, marker);
        }
        for label in &self.labels {
            self.write_label(&mut out, &geo, label);
        }
        out.push_str("</svg>\n");
        out
    }

    fn write_grid(&self, out: &mut String, geo: &Geometry) {
        let cfg = &self.config;
        let _ = writeln!(out, r#"<g class="grid" stroke="{}" stroke-width="1">"#, cfg.grid_color);
        for month in self.axis.ticks() {
            let x = geo.x(month as f64);
            let _ = writeln!(
                out,
                r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}"/>"#,
                geo.plot_top, geo.plot_bottom
            );
        }
        out.push_str("</g>\n");

        let _ = writeln!(
            out,
            r#"<g class="ticks" font-size="{}" fill="{}" text-anchor="middle">"#,
            cfg.bar_font_size_px, cfg.text_color
        );
        for month in self.axis.ticks() {
            let _ = writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}">{month}</text>"#,
                geo.x(month as f64),
                geo.plot_bottom + cfg.bar_font_size_px + 6.0
            );
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}">Month</text>"#,
            geo.plot_left + cfg.plot_width_px() / 2.0,
            geo.plot_bottom + 2.0 * cfg.bar_font_size_px + 16.0
        );
        out.push_str("</g>\n");
    }

    fn write_bar(&self, out: &mut String, geo: &Geometry, bar: &Bar) {
        let cfg = &self.config;
        let x = geo.x(bar.start_month);
        let width = (bar.width_months() * geo.px_per_month).max(MIN_BAR_WIDTH_PX);
        let height = geo.row_height * BAR_FILL_RATIO;
        let y = geo.row_center(bar.row) - height / 2.0;
        let _ = writeln!(
            out,
            r##"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{height:.1}" fill="{}" stroke="#555555" stroke-width="0.5"/>"##,
            bar.color
        );
        let (tx, anchor, fill) = match bar.label.placement {
            LabelPlacement::Inside => (x + width / 2.0, "middle", cfg.text_color.as_str()),
            LabelPlacement::Right => (x + width + 4.0, "start", bar.color.as_str()),
        };
        let _ = writeln!(
            out,
            r#"<text x="{tx:.1}" y="{:.1}" text-anchor="{anchor}" dominant-baseline="central" font-size="{}" fill="{fill}">{}</text>"#,
            geo.row_center(bar.row),
            cfg.bar_font_size_px,
            escape_xml(&bar.label.text)
        );
    }

    fn write_marker(&self, out: &mut String, geo: &Geometry, marker: &MilestoneMarker) {
        let x = geo.x(marker.month);
        let (top, bottom) = match marker.span {
            RowSpan::All => (geo.plot_top, geo.plot_bottom),
            RowSpan::Rows { first, last } => (geo.row_top(first), geo.row_top(last + 1)),
        };
        match &marker.style {
            MarkerStyle::Solid(color) => {
                let _ = writeln!(
                    out,
                    r#"<line class="milestone" x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="{color}" stroke-width="{MARKER_WIDTH_PX}"/>"#,
                );
            }
            MarkerStyle::Striped(colors) if !colors.is_empty() => {
                let step = self.config.stripe_px;
                let mut y = top;
                let mut idx = 0;
                while y < bottom {
                    let end = (y + step).min(bottom);
                    let _ = writeln!(
                        out,
                        r#"<line class="milestone stripe" x1="{x:.1}" y1="{y:.1}" x2="{x:.1}" y2="{end:.1}" stroke="{}" stroke-width="{MARKER_WIDTH_PX}"/>"#,
                        colors[idx % colors.len()]
                    );
                    y = end;
                    idx += 1;
                }
            }
            MarkerStyle::Striped(_) => {}
        }
    }

    fn write_label(&self, out: &mut String, geo: &Geometry, label: &MilestoneLabel) {
        let cfg = &self.config;
        let line_height = cfg.label_line_height_px();
        let x = geo.x(label.month);
        // Lane 0 sits directly above the plot; higher lanes stack upwards.
        let block_bottom = geo.plot_top - 4.0 - label.lane as f64 * geo.lane_height;
        let first_baseline = block_bottom - (label.lines.len().saturating_sub(1)) as f64 * line_height;
        let _ = writeln!(
            out,
            r#"<line class="leader" x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{}" stroke-width="0.5" stroke-dasharray="2,2"/>"#,
            block_bottom + 2.0,
            geo.plot_top,
            cfg.grid_color
        );
        let _ = write!(
            out,
            r#"<text class="milestone-label" x="{x:.1}" y="{first_baseline:.1}" text-anchor="middle" font-size="{}" fill="{}">"#,
            cfg.label_font_size_px, cfg.text_color
        );
        for (idx, line) in label.lines.iter().enumerate() {
            let dy = if idx == 0 { 0.0 } else { line_height };
            let _ = write!(out, r#"<tspan x="{x:.1}" dy="{dy:.1}">{}</tspan>"#, escape_xml(line));
        }
        out.push_str("</text>\n");
    }

    fn write_bracket(&self, out: &mut String, geo: &Geometry, band: &WorkPackageBand) {
        let cfg = &self.config;
        let x = geo.plot_left - BRACKET_GAP_PX;
        let top = geo.row_top(band.first_row) + 3.0;
        let bottom = geo.row_top(band.last_row + 1) - 3.0;
        // A single-row package gets its label only.
        if band.last_row > band.first_row {
            let _ = writeln!(
                out,
                r#"<path class="bracket" d="M{:.1},{top:.1} H{x:.1} V{bottom:.1} H{:.1}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
                x + BRACKET_TICK_PX,
                x + BRACKET_TICK_PX,
                cfg.text_color
            );
        }

        let font_size = cfg.bar_font_size_px + 1.0;
        let line_height = font_size * 1.2;
        let middle = (top + bottom) / 2.0;
        let first = middle - (band.label_lines.len().saturating_sub(1)) as f64 * line_height / 2.0;
        let tx = x - 6.0;
        let _ = write!(
            out,
            r#"<text class="work-package" x="{tx:.1}" y="{first:.1}" text-anchor="end" dominant-baseline="central" font-size="{font_size}" font-weight="bold" fill="{}">"#,
            band.color
        );
        for (idx, line) in band.label_lines.iter().enumerate() {
            let dy = if idx == 0 { 0.0 } else { line_height };
            let _ = write!(out, r#"<tspan x="{tx:.1}" dy="{dy:.1}">{}</tspan>"#, escape_xml(line));
        }
        out.push_str("</text>\n");
    }
}

impl DrawingSurface for SvgSurface {
    fn draw_frame(&mut self, axis: Axis, rows: usize, lanes: usize) {
        self.axis = axis;
        self.rows = rows;
        self.lanes = lanes;
    }

    fn draw_bar(&mut self, bar: &Bar) {
        self.bars.push(bar.clone());
    }

    fn draw_vertical_line(&mut self, marker: &MilestoneMarker) {
        self.markers.push(marker.clone());
    }

    fn place_label(&mut self, label: &MilestoneLabel) {
        self.labels.push(label.clone());
    }

    fn draw_bracket(&mut self, band: &WorkPackageBand) {
        self.brackets.push(band.clone());
    }

    fn save(&self, path: &Path, dpi: u32, format: ImageFormat) -> Result<()> {
        let svg = self.to_svg();
        match format {
            ImageFormat::Svg => {
                fs::write(path, svg).map_err(|err| FormatError::new(path, err))?;
            }
            ImageFormat::Png => write_png(&svg, path, dpi)?,
        }
        info!(path = %path.display(), ?format, dpi, "chart saved");
        Ok(())
    }

    fn show(&self) -> Result<()> {
        let mut temp = tempfile::Builder::new()
            .prefix("gantt-")
            .suffix(".svg")
            .tempfile()
            .map_err(|err| FormatError::new(std::env::temp_dir(), err))?;
        temp.write_all(self.to_svg().as_bytes())
            .map_err(|err| FormatError::new(temp.path(), err))?;
        // The viewer outlives this process, so the file has to stay.
        let (_file, path) = temp
            .keep()
            .map_err(|err| FormatError::new(std::env::temp_dir(), err.error))?;
        viewer_command(&path)
            .spawn()
            .map_err(|err| FormatError::new(&path, err))?;
        info!(path = %path.display(), "opened chart in system viewer");
        Ok(())
    }
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, path: &Path, dpi: u32) -> Result<()> {
    use crate::error::FormatErrorKind;
    use resvg::{tiny_skia, usvg};

    let fail = |msg: String| FormatError::new(path, FormatErrorKind::Render(msg));
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| fail(err.to_string()))?;

    let scale = dpi.max(1) as f32 / 96.0;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| fail(format!("cannot allocate a {width}x{height} image")))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap.save_png(path).map_err(|err| fail(err.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _path: &Path, _dpi: u32) -> Result<()> {
    use crate::error::{Capability, MissingDependencyError};
    Err(MissingDependencyError::new(Capability::Png).into())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
