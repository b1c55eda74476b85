#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    use crate::{
        app::{classifier::EtfClassifier, enrich::enrich},
        figure::{
            ImageFormat, Layout, PositionFigure,
            draw::thousands,
            render::{default_font_path, load_font},
        },
        models::{Category, CategoryMap},
        test::support::position,
    };

    #[test]
    fn it_groups_thousands() {
        assert_eq!(thousands(1234567.8), "1,234,568");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(-1000.0), "-1,000");
        assert_eq!(thousands(0.0), "0");
    }

    #[test]
    fn it_parses_image_formats() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert_eq!(ImageFormat::Svg.extension(), "svg");
        assert_eq!(ImageFormat::default(), ImageFormat::Jpg);
        assert!("bmp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn it_reports_a_missing_font() {
        assert!(load_font(Path::new("/nonexistent/font.ttf")).is_err());
    }

    /// Fonts tried in order. Latin-only fonts still render, with missing
    /// glyphs drawn as boxes.
    fn chart_font() -> Option<PathBuf> {
        std::env::var_os("REPORT_FONT_PATH")
            .map(PathBuf::from)
            .into_iter()
            .chain(
                [
                    default_font_path(),
                    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
                    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/TTF/DejaVuSans.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                    "/System/Library/Fonts/Helvetica.ttc",
                    r"C:\Windows\Fonts\arial.ttf",
                ]
                .into_iter()
                .map(PathBuf::from),
            )
            .find(|path| path.exists())
    }

    #[test]
    fn it_renders_every_chart() {
        let Some(font) = chart_font() else {
            eprintln!("no font found, set REPORT_FONT_PATH to render charts");
            return;
        };
        load_font(&font).unwrap();

        let mut map = CategoryMap::new();
        map.insert(Category::HighDividend, "0056");
        map.insert(Category::Bond, "00679B");
        let positions = vec![
            position(1, "2330", 1000, dec!(800)),
            position(2, "0056", 2000, dec!(40)),
            position(3, "00679B", 3000, dec!(40)),
        ];
        let enriched = enrich(&positions, &EtfClassifier::from_map(map));
        let figure = PositionFigure::new(&enriched);
        let dir = tempdir().unwrap();

        let layout: Layout = "position_pie@0,0; loss_bar@0,1; value_bar@0,2; \
                              max_holdings@1,0; daily_changes@1,1; \
                              combined_holdings_and_changes@1,2"
            .parse()
            .unwrap();

        let combined = dir.path().join("charts.svg");
        figure
            .render_combined(&layout, &combined, ImageFormat::Svg)
            .unwrap();
        assert!(combined.exists());

        let paths = figure
            .render_individual(&layout, &dir.path().join("each"), ImageFormat::Png)
            .unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(paths[0].ends_with("position_pie.png"));
    }
}
