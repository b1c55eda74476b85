pub mod data;
pub mod draw;
pub mod layout;
pub mod render;

pub use layout::{ChartKind, ChartSlot, Layout};
pub use render::{ImageFormat, PositionFigure};
