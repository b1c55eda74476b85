use anyhow::{Result, anyhow};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::data::{daily_changes, group_by_category, max_holdings};
use crate::models::EnrichedPosition;

pub const FONT: &str = "sans-serif";

/// Rows shown by the stand-alone daily change panel.
pub const DAILY_CHANGE_ROWS: usize = 10;
/// Rows shown by the daily change half of the combined panel.
pub const COMBINED_CHANGE_ROWS: usize = 5;

const ZERO_LINE_DASHES: usize = 40;

const PALETTE: [RGBColor; 8] = [
    RGBColor(246, 112, 136),
    RGBColor(206, 143, 49),
    RGBColor(150, 163, 49),
    RGBColor(50, 176, 101),
    RGBColor(53, 172, 164),
    RGBColor(56, 168, 197),
    RGBColor(161, 143, 246),
    RGBColor(245, 101, 204),
];

const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const BLUES: [RGBColor; 5] = [
    RGBColor(8, 48, 107),
    RGBColor(33, 102, 172),
    RGBColor(66, 146, 198),
    RGBColor(107, 174, 214),
    RGBColor(158, 202, 225),
];

const DARK_GRAY: RGBColor = RGBColor(85, 85, 85);
const GRAY: RGBColor = RGBColor(128, 128, 128);
const LIGHT_GRAY: RGBColor = RGBColor(211, 211, 211);
const UP: RGBColor = RGBColor(0, 128, 0);
const DOWN: RGBColor = RGBColor(200, 0, 0);

fn draw_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("Failed to draw chart: {:?}", e)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn text_style(size: f64, color: &RGBColor, h: HPos, v: VPos) -> TextStyle<'static> {
    (FONT, size).into_font().color(color).pos(Pos::new(h, v))
}

/// `1234567.8` → `1,234,568`
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Index-based category axes only label whole ticks.
fn tick_label(labels: &[String], tick: f64) -> String {
    let index = tick.round();
    if (tick - index).abs() > 0.01 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Panel coordinates run from (0, 0) bottom-left to (1, 1) top-right.
fn to_pixel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, x: f64, y: f64) -> (i32, i32) {
    let (w, h) = area.dim_in_pixel();
    ((x * w as f64).round() as i32, ((1.0 - y) * h as f64).round() as i32)
}

fn panel_text<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    (x, y): (f64, f64),
    style: TextStyle<'static>,
) -> Result<()> {
    area.draw(&Text::new(text.to_string(), to_pixel(area, x, y), style))
        .map_err(draw_err)
}

fn panel_rule<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    y: f64,
    (x0, x1): (f64, f64),
    color: &RGBColor,
) -> Result<()> {
    area.draw(&PathElement::new(
        vec![to_pixel(area, x0, y), to_pixel(area, x1, y)],
        color.stroke_width(1),
    ))
    .map_err(draw_err)
}

fn placeholder<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, text: &str) -> Result<()> {
    panel_text(
        area,
        text,
        (0.5, 0.5),
        text_style(14.0, &DARK_GRAY, HPos::Center, VPos::Center),
    )
}

fn wedge(
    (cx, cy): (f64, f64),
    inner: f64,
    outer: f64,
    start_deg: f64,
    end_deg: f64,
) -> Vec<(i32, i32)> {
    let steps = ((end_deg - start_deg) / 2.0).ceil().max(1.0) as usize;
    let point = |radius: f64, deg: f64| {
        let rad = deg.to_radians();
        (
            (cx + radius * rad.cos()).round() as i32,
            (cy - radius * rad.sin()).round() as i32,
        )
    };
    let angle = |i: usize| start_deg + (end_deg - start_deg) * i as f64 / steps as f64;

    let mut points: Vec<_> = (0..=steps).map(|i| point(outer, angle(i))).collect();
    points.extend((0..=steps).rev().map(|i| point(inner, angle(i))));
    points
}

/// Donut of value share by category, labelled with the share count.
pub fn position_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;
    panel_text(
        area,
        "各類型股票持倉分佈",
        (0.5, 0.97),
        text_style(18.0, &BLACK, HPos::Center, VPos::Top),
    )?;

    let groups = group_by_category(positions);
    let total: f64 = groups.iter().map(|g| to_f64(*g.value_share())).sum();
    if total <= 0.0 {
        return placeholder(area, "無持倉資料");
    }

    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0 + 15.0);
    let radius = w.min(h) as f64 * 0.3;
    let hole = radius * 0.4;

    let mut start = 90.0;
    for (i, group) in groups.iter().enumerate() {
        let share = to_f64(*group.value_share()) / total;
        let end = start + share * 360.0;
        let mid = ((start + end) / 2.0_f64).to_radians();
        let (dx, dy) = (mid.cos(), -mid.sin());

        // exploded by 2% of the radius
        let origin = (center.0 + radius * 0.02 * dx, center.1 + radius * 0.02 * dy);
        let color = PALETTE[i % PALETTE.len()];
        area.draw(&Polygon::new(
            wedge(origin, hole, radius, start, end),
            color.filled(),
        ))
        .map_err(draw_err)?;

        let at = |r: f64| {
            (
                (origin.0 + r * dx).round() as i32,
                (origin.1 + r * dy).round() as i32,
            )
        };
        area.draw(&Text::new(
            format!("{:.2}%", share * 100.0),
            at((hole + radius) / 2.0),
            text_style(12.0, &BLACK, HPos::Center, VPos::Center),
        ))
        .map_err(draw_err)?;

        let side = if dx >= 0.0 { HPos::Left } else { HPos::Right };
        let (lx, ly) = at(radius * 1.15);
        area.draw(&Text::new(
            group.category().to_string(),
            (lx, ly - 8),
            text_style(13.0, &BLACK, side, VPos::Center),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            format!("({})", thousands(*group.quantity() as f64)),
            (lx, ly + 8),
            text_style(12.0, &DARK_GRAY, side, VPos::Center),
        ))
        .map_err(draw_err)?;

        start = end;
    }

    Ok(())
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    if lo == hi {
        return (-1.0, 1.0);
    }
    let pad = (hi - lo) * 0.15;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

/// Horizontal bars of position P&L per category, red up and green down.
pub fn loss_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;

    let mut groups = group_by_category(positions);
    if groups.is_empty() {
        return placeholder(area, "無持倉資料");
    }
    groups.sort_by(|a, b| a.pnl().cmp(b.pnl()));

    let values: Vec<f64> = groups.iter().map(|g| to_f64(*g.pnl())).collect();
    let (lo, hi) = padded_range(&values);
    let n = groups.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("各類型股票損益", (FONT, 18.0))
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(5)
        .build_cartesian_2d(lo..hi, -0.5..(n - 0.5))
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .disable_y_axis()
        .x_label_formatter(&|v| thousands(*v))
        .label_style((FONT, 11.0))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let y = i as f64;
            let color = if *v >= 0.0 { PALETTE[0] } else { PALETTE[2] };
            Rectangle::new([(0.0, y - 0.35), (*v, y + 0.35)], color.mix(0.8).filled())
        }))
        .map_err(draw_err)?;

    let dash = n / (2.0 * ZERO_LINE_DASHES as f64);
    chart
        .draw_series((0..ZERO_LINE_DASHES).map(|i| {
            let y = -0.5 + 2.0 * dash * i as f64;
            PathElement::new(vec![(0.0, y), (0.0, y + dash)], GRAY.stroke_width(1))
        }))
        .map_err(draw_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let side = if *v >= 0.0 { HPos::Left } else { HPos::Right };
            Text::new(
                thousands(*v),
                (*v, i as f64),
                text_style(11.0, &BLACK, side, VPos::Center),
            )
        }))
        .map_err(draw_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            Text::new(
                format!(" {} ", g.category()),
                (0.0, i as f64 + 0.42),
                text_style(12.0, &BLACK, HPos::Center, VPos::Bottom),
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}

/// Vertical bars of market value per category, largest first.
pub fn value_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;

    let mut groups = group_by_category(positions);
    if groups.is_empty() {
        return placeholder(area, "無持倉資料");
    }
    groups.sort_by(|a, b| b.market_value().cmp(a.market_value()));

    let values: Vec<f64> = groups.iter().map(|g| to_f64(*g.market_value())).collect();
    let labels: Vec<String> = groups.iter().map(|g| g.category().to_string()).collect();
    let top = values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.15;
    let n = groups.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("各股票類型部位價值", (FONT, 18.0))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(n - 0.5), 0.0..top)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len().max(1) * 2 + 1)
        .x_label_formatter(&|x| tick_label(&labels, *x))
        .y_label_formatter(&|y| thousands(*y))
        .y_desc("部位價值")
        .label_style((FONT, 11.0))
        .light_line_style(LIGHT_GRAY.mix(0.7))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let x = i as f64;
            let color = BLUES[i * BLUES.len() / groups.len().max(1) % BLUES.len()];
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], color.filled())
        }))
        .map_err(draw_err)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            Text::new(
                thousands(*v),
                (i as f64, *v),
                text_style(11.0, &BLACK, HPos::Center, VPos::Bottom),
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}

fn draw_max_holdings<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
    top: f64,
    bottom: f64,
) -> Result<()> {
    panel_text(
        area,
        "各類型股票最大持倉",
        (0.5, top - 0.05),
        text_style(16.0, &BLACK, HPos::Center, VPos::Top),
    )?;

    let holdings = max_holdings(positions);
    if holdings.is_empty() {
        return Ok(());
    }
    let row_height = (top - bottom - 0.1) / holdings.len() as f64;

    for (i, holding) in holdings.iter().enumerate() {
        let y = top - 0.1 - (i as f64 + 0.5) * row_height;
        panel_text(
            area,
            &format!("{}:", holding.category()),
            (0.05, y),
            text_style(13.0, &TAB10[i % TAB10.len()], HPos::Left, VPos::Center),
        )?;
        panel_text(
            area,
            holding.ticker(),
            (0.5, y),
            text_style(13.0, &BLACK, HPos::Center, VPos::Center),
        )?;
        panel_text(
            area,
            &format!("({:.2}%)", holding.value_share()),
            (0.95, y),
            text_style(13.0, &DARK_GRAY, HPos::Right, VPos::Center),
        )?;

        if i + 1 < holdings.len() {
            let rule = top - 0.1 - (i + 1) as f64 * row_height;
            panel_rule(area, rule, (0.05, 0.95), &LIGHT_GRAY)?;
        }
    }

    Ok(())
}

fn draw_daily_changes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
    top: f64,
    bottom: f64,
    limit: usize,
) -> Result<()> {
    panel_text(
        area,
        "今日部位變化",
        (0.5, top - 0.05),
        text_style(16.0, &BLACK, HPos::Center, VPos::Top),
    )?;

    let changes = daily_changes(positions, limit);
    if changes.is_empty() {
        return panel_text(
            area,
            "今日無部位變化",
            (0.5, (top + bottom) / 2.0),
            text_style(13.0, &DARK_GRAY, HPos::Center, VPos::Center),
        );
    }
    let row_height = (top - bottom - 0.1) / changes.len() as f64;

    for (i, (position, change)) in changes.iter().enumerate() {
        let y = top - 0.1 - (i as f64 + 0.5) * row_height;
        let (label, color) = if *change > 0 {
            ("增加", UP)
        } else {
            ("減少", DOWN)
        };

        panel_text(
            area,
            &format!("{}:", position.ticker()),
            (0.05, y),
            text_style(12.0, &BLACK, HPos::Left, VPos::Center),
        )?;
        panel_text(
            area,
            label,
            (0.6, y),
            text_style(12.0, &color, HPos::Center, VPos::Center),
        )?;
        panel_text(
            area,
            &format!("{} 股", thousands(change.unsigned_abs() as f64)),
            (0.95, y),
            text_style(12.0, &DARK_GRAY, HPos::Right, VPos::Center),
        )?;

        if i + 1 < changes.len() {
            let rule = top - 0.1 - (i + 1) as f64 * row_height;
            panel_rule(area, rule, (0.05, 0.95), &LIGHT_GRAY)?;
        }
    }

    Ok(())
}

pub fn max_holdings_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;
    draw_max_holdings(area, positions, 1.0, 0.1)
}

pub fn daily_changes_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;
    draw_daily_changes(area, positions, 1.0, 0.1, DAILY_CHANGE_ROWS)
}

/// Largest holdings on top, today's changes below.
pub fn combined_holdings_and_changes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    positions: &[EnrichedPosition],
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;
    draw_max_holdings(area, positions, 1.0, 0.55)?;
    draw_daily_changes(area, positions, 0.45, 0.0, COMBINED_CHANGE_ROWS)?;
    panel_rule(area, 0.5, (0.02, 0.98), &GRAY)
}
