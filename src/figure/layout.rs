use std::{collections::HashSet, str::FromStr};

use anyhow::{Context, Result};
use derive_getters::Getters;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ReportError;

pub const CELL_WIDTH: u32 = 600;
pub const CELL_HEIGHT: u32 = 500;
/// Largest grid, in cells, along either axis.
pub const MAX_GRID_CELLS: usize = 8;

pub const DEFAULT_LAYOUT: &str =
    "position_pie@0,0; loss_bar@0,1; value_bar@1,0; combined_holdings_and_changes@1,1";

#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    PositionPie,
    LossBar,
    ValueBar,
    MaxHoldings,
    DailyChanges,
    CombinedHoldingsAndChanges,
}

#[derive(Clone, Copy, Debug, Eq, Getters, PartialEq)]
pub struct ChartSlot {
    kind: ChartKind,
    row: usize,
    col: usize,
    rowspan: usize,
    colspan: usize,
}

impl ChartSlot {
    pub fn new(kind: ChartKind, row: usize, col: usize) -> Self {
        Self::spanning(kind, row, col, 1, 1)
    }

    pub fn spanning(kind: ChartKind, row: usize, col: usize, rowspan: usize, colspan: usize) -> Self {
        Self {
            kind,
            row,
            col,
            rowspan,
            colspan,
        }
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row + self.rowspan)
            .flat_map(move |r| (self.col..self.col + self.colspan).map(move |c| (r, c)))
    }
}

/// Grid placement of charts in the composite image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    slots: Vec<ChartSlot>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            slots: vec![
                ChartSlot::new(ChartKind::PositionPie, 0, 0),
                ChartSlot::new(ChartKind::LossBar, 0, 1),
                ChartSlot::new(ChartKind::ValueBar, 1, 0),
                ChartSlot::new(ChartKind::CombinedHoldingsAndChanges, 1, 1),
            ],
        }
    }
}

impl Layout {
    /// Rejects empty layouts, zero spans, slots sharing a cell and slots
    /// reaching past `MAX_GRID_CELLS`.
    pub fn new(slots: Vec<ChartSlot>) -> Result<Self> {
        if slots.is_empty() {
            return Err(ReportError::InvalidLayout("no charts".to_string()).into());
        }

        let mut occupied = HashSet::new();
        for slot in &slots {
            if slot.rowspan == 0 || slot.colspan == 0 {
                return Err(ReportError::InvalidLayout(format!(
                    "{} has an empty span",
                    slot.kind
                ))
                .into());
            }
            let fits = |start: usize, span: usize| {
                start
                    .checked_add(span)
                    .is_some_and(|end| end <= MAX_GRID_CELLS)
            };
            if !fits(slot.row, slot.rowspan) || !fits(slot.col, slot.colspan) {
                return Err(ReportError::InvalidLayout(format!(
                    "{} extends past the {}x{} grid",
                    slot.kind, MAX_GRID_CELLS, MAX_GRID_CELLS
                ))
                .into());
            }
            for cell in slot.cells() {
                if !occupied.insert(cell) {
                    return Err(ReportError::InvalidLayout(format!(
                        "{} overlaps another chart at row {}, column {}",
                        slot.kind, cell.0, cell.1
                    ))
                    .into());
                }
            }
        }

        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    /// (rows, columns)
    pub fn grid_size(&self) -> (usize, usize) {
        let rows = self.slots.iter().map(|s| s.row + s.rowspan).max().unwrap_or(0);
        let cols = self.slots.iter().map(|s| s.col + s.colspan).max().unwrap_or(0);
        (rows, cols)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        let (rows, cols) = self.grid_size();
        (cols as u32 * CELL_WIDTH, rows as u32 * CELL_HEIGHT)
    }
}

/// `kind@row,col` or `kind@row,col+rowspan,colspan`, separated by `;`.
impl FromStr for Layout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let slots = s
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_slot)
            .collect::<Result<Vec<_>>>()?;
        Layout::new(slots)
    }
}

fn parse_slot(part: &str) -> Result<ChartSlot> {
    let invalid = || ReportError::InvalidLayout(format!("cannot parse '{}'", part));

    let (kind, placement) = part.split_once('@').ok_or_else(invalid)?;
    let kind = ChartKind::from_str(kind.trim())
        .with_context(|| format!("Unknown chart kind '{}'", kind.trim()))?;

    let (position, span) = match placement.split_once('+') {
        Some((position, span)) => (position, Some(span)),
        None => (placement, None),
    };

    let (row, col) = parse_pair(position).ok_or_else(invalid)?;
    let (rowspan, colspan) = match span {
        Some(span) => parse_pair(span).ok_or_else(invalid)?,
        None => (1, 1),
    };

    Ok(ChartSlot::spanning(kind, row, col, rowspan, colspan))
}

fn parse_pair(s: &str) -> Option<(usize, usize)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
