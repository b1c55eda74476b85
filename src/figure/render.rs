use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result, anyhow};
use plotters::{
    coord::Shift,
    prelude::*,
    style::{FontStyle, register_font},
};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::info;

use super::{
    draw,
    layout::{CELL_HEIGHT, CELL_WIDTH, ChartKind, Layout},
};
use crate::{error::ReportError, models::EnrichedPosition};

const INDIVIDUAL_SIZE: (u32, u32) = (800, 600);

#[derive(AsRefStr, Clone, Copy, Debug, Default, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &str {
        self.as_ref()
    }
}

/// CJK-capable font per platform.
pub fn default_font_path() -> &'static str {
    if cfg!(target_os = "macos") {
        "/Library/Fonts/Arial Unicode.ttf"
    } else if cfg!(target_os = "windows") {
        r"C:\Windows\Fonts\msyh.ttc"
    } else {
        "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc"
    }
}

static REGISTERED_FONT: OnceLock<PathBuf> = OnceLock::new();

/// Makes the font at `path` the chart font. The file must be readable on
/// every call, but only the first call in a process registers anything.
pub fn load_font(path: &Path) -> Result<()> {
    let bytes = fs::read(path).map_err(|_| ReportError::MissingFont(path.display().to_string()))?;
    if REGISTERED_FONT.get().is_some() {
        return Ok(());
    }

    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(draw::FONT, FontStyle::Normal, bytes)
        .map_err(|_| ReportError::MissingFont(path.display().to_string()))?;

    let _ = REGISTERED_FONT.set(path.to_path_buf());
    Ok(())
}

/// Chart drawing over an enriched position table.
pub struct PositionFigure<'a> {
    positions: &'a [EnrichedPosition],
}

impl<'a> PositionFigure<'a> {
    pub fn new(positions: &'a [EnrichedPosition]) -> Self {
        Self { positions }
    }

    fn draw_chart<DB: DrawingBackend>(
        &self,
        kind: ChartKind,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<()> {
        let draw_fn: fn(&DrawingArea<DB, Shift>, &[EnrichedPosition]) -> Result<()> = match kind {
            ChartKind::PositionPie => draw::position_pie::<DB>,
            ChartKind::LossBar => draw::loss_bar::<DB>,
            ChartKind::ValueBar => draw::value_bar::<DB>,
            ChartKind::MaxHoldings => draw::max_holdings_panel::<DB>,
            ChartKind::DailyChanges => draw::daily_changes_panel::<DB>,
            ChartKind::CombinedHoldingsAndChanges => draw::combined_holdings_and_changes::<DB>,
        };
        draw_fn(area, self.positions).with_context(|| format!("Failed to draw {}", kind))
    }

    fn draw_layout<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        layout: &Layout,
    ) -> Result<()> {
        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to clear canvas: {:?}", e))?;

        for slot in layout.slots() {
            let area = root.clone().shrink(
                (*slot.col() as u32 * CELL_WIDTH, *slot.row() as u32 * CELL_HEIGHT),
                (
                    *slot.colspan() as u32 * CELL_WIDTH,
                    *slot.rowspan() as u32 * CELL_HEIGHT,
                ),
            );
            self.draw_chart(*slot.kind(), &area)?;
        }
        Ok(())
    }

    /// Draws every chart of `layout` into one image.
    pub fn render_combined(&self, layout: &Layout, path: &Path, format: ImageFormat) -> Result<()> {
        ensure_parent(path)?;
        let size = layout.pixel_size();

        match format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                self.draw_layout(&root, layout)?;
                root.present()
                    .map_err(|e| anyhow!("Failed to save {}: {:?}", path.display(), e))?;
            }
            ImageFormat::Jpg | ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                self.draw_layout(&root, layout)?;
                root.present()
                    .map_err(|e| anyhow!("Failed to save {}: {:?}", path.display(), e))?;
            }
        }

        info!("Saved charts to {}", path.display());
        Ok(())
    }

    /// Draws each chart of `layout` into its own file under `dir`, named
    /// after the chart kind.
    pub fn render_individual(
        &self,
        layout: &Layout,
        dir: &Path,
        format: ImageFormat,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for slot in layout.slots() {
            let path = dir.join(format!("{}.{}", slot.kind(), format.extension()));

            match format {
                ImageFormat::Svg => {
                    let root = SVGBackend::new(&path, INDIVIDUAL_SIZE).into_drawing_area();
                    self.draw_chart(*slot.kind(), &root)?;
                    root.present()
                        .map_err(|e| anyhow!("Failed to save {}: {:?}", path.display(), e))?;
                }
                ImageFormat::Jpg | ImageFormat::Png => {
                    let root = BitMapBackend::new(&path, INDIVIDUAL_SIZE).into_drawing_area();
                    self.draw_chart(*slot.kind(), &root)?;
                    root.present()
                        .map_err(|e| anyhow!("Failed to save {}: {:?}", path.display(), e))?;
                }
            }

            info!("Saved {} to {}", slot.kind(), path.display());
            paths.push(path);
        }
        Ok(paths)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
