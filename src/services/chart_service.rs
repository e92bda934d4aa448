use plotters::prelude::*;
use chrono::{DateTime, Duration, Utc};
use image::{DynamicImage, RgbImage, RgbaImage};
use crate::models::{NormalizedWindow, PricePoint, PriceSeries};
use crate::utils::RefreshError;

/// 6.4 x 4.8 inch figure at 300 dpi
pub const CHART_WIDTH: u32 = 1920;
pub const CHART_HEIGHT: u32 = 1440;

/// Fixed y range; the line always ends at 1.0 in the middle
const Y_RANGE: std::ops::Range<f64> = 0.0..2.0;
/// 6pt at 300 dpi
const FONT_SIZE: f64 = 25.0;
/// 0.5pt at 300 dpi
const LINE_WIDTH: u32 = 2;
/// ~1/32 inch at 300 dpi
const MARGIN: u32 = 10;
/// Summary anchor, as fractions of the plot area (from the left / from the top)
const SUMMARY_ANCHOR: (f64, f64) = (0.675, 0.15);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Last `num_days` points divided by the last of them
pub fn normalize_window(
    series: &PriceSeries,
    num_days: usize,
    quote_asset: &str,
) -> Result<NormalizedWindow, RefreshError> {
    let start = series.len().saturating_sub(num_days);
    let tail = &series.points[start..];

    let last = tail
        .last()
        .ok_or_else(|| RefreshError::EmptySeries(series.symbol.clone()))?
        .price;

    let points = tail
        .iter()
        .map(|p| PricePoint {
            timestamp: p.timestamp,
            price: p.price / last,
        })
        .collect();

    Ok(NormalizedWindow {
        symbol: series.symbol.clone(),
        quote_asset: quote_asset.to_string(),
        points,
    })
}

/// Draw the window as a line chart with its summary, returned as RGBA pixels
pub fn render_chart(window: &NormalizedWindow) -> Result<RgbaImage, RefreshError> {
    let (first, last) = match (window.points.first(), window.points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(RefreshError::EmptySeries(window.symbol.clone())),
    };

    let x_min = first.timestamp;
    let x_max = if last.timestamp > x_min {
        last.timestamp
    } else {
        x_min + Duration::days(1)
    };

    let mut pixels = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];

    {
        let backend = BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH, CHART_HEIGHT));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| RefreshError::Render(format!("Failed to fill canvas: {}", e)))?;

        let label_font = ("sans-serif", FONT_SIZE).into_font();

        let mut chart = ChartBuilder::on(&root)
            .margin(MARGIN)
            .x_label_area_size(2 * FONT_SIZE as u32)
            .y_label_area_size(3 * FONT_SIZE as u32)
            .build_cartesian_2d(x_min..x_max, Y_RANGE)
            .map_err(|e| RefreshError::Render(format!("Failed to build chart: {}", e)))?;

        // No x description, dates speak for themselves
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(6)
            .y_labels(5)
            .x_label_formatter(&|t: &DateTime<Utc>| t.format("%Y-%m").to_string())
            .label_style(label_font.clone())
            .draw()
            .map_err(|e| RefreshError::Render(format!("Failed to draw mesh: {}", e)))?;

        chart
            .draw_series(LineSeries::new(
                window.points.iter().map(|p| (p.timestamp, p.price)),
                LINE_COLOR.stroke_width(LINE_WIDTH),
            ))
            .map_err(|e| RefreshError::Render(format!("Failed to draw line: {}", e)))?;

        let overlay = chart.plotting_area().strip_coord_spec();
        let (width, height) = overlay.dim_in_pixel();
        let x = (width as f64 * SUMMARY_ANCHOR.0) as i32;
        let mut y = (height as f64 * SUMMARY_ANCHOR.1) as i32;
        let line_height = (FONT_SIZE * 1.2) as i32;

        for line in window.summary().lines() {
            overlay
                .draw(&Text::new(line.to_string(), (x, y), label_font.clone()))
                .map_err(|e| RefreshError::Render(format!("Failed to draw summary: {}", e)))?;
            y += line_height;
        }

        root.present()
            .map_err(|e| RefreshError::Render(format!("Failed to render chart: {}", e)))?;
    }

    let rgb = RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, pixels)
        .ok_or_else(|| RefreshError::Render("Bitmap size mismatch".to_string()))?;

    Ok(DynamicImage::ImageRgb8(rgb).to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ascending_series(symbol: &str, len: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        PriceSeries {
            symbol: symbol.to_string(),
            points: (0..len)
                .map(|i| PricePoint {
                    timestamp: start + Duration::days(i as i64),
                    price: 0.01 + i as f64 * 0.0001,
                })
                .collect(),
        }
    }

    #[test]
    fn test_window_ends_at_one() {
        let series = ascending_series("ETHBTC", 1000);
        let window = normalize_window(&series, 180, "BTC").expect("window");

        assert_eq!(window.points.len(), 180);
        assert_eq!(window.points[179].price, 1.0);
        assert_eq!(window.points[0].timestamp, series.points[820].timestamp);
        assert!(window.points.iter().all(|p| p.price <= 1.0));
    }

    #[test]
    fn test_short_series_uses_everything() {
        let series = ascending_series("ETHBTC", 3);
        let window = normalize_window(&series, 180, "BTC").expect("window");
        assert_eq!(window.points.len(), 3);
        assert_eq!(window.points[2].price, 1.0);
    }

    #[test]
    fn test_single_point_window() {
        let series = ascending_series("ETHBTC", 1);
        let window = normalize_window(&series, 180, "BTC").expect("window");
        assert_eq!(window.points.len(), 1);
        assert_eq!(window.points[0].price, 1.0);
    }

    #[test]
    fn test_empty_series_rejected() {
        let series = ascending_series("ETHBTC", 0);
        assert!(matches!(
            normalize_window(&series, 180, "BTC"),
            Err(RefreshError::EmptySeries(symbol)) if symbol == "ETHBTC"
        ));
    }

    #[test]
    fn test_window_summary_for_trailing_days() {
        let series = ascending_series("ETHBTC", 1000);
        let window = normalize_window(&series, 180, "BTC").expect("window");
        let summary = window.summary();

        assert!(summary.contains("Asset: ETH (ETHBTC)"));
        assert!(summary.contains("Days: 180"));

        let since = summary.find("Since: 2023-04-01 00:00:00").expect("since line");
        let until = summary.find("Until: 2023-09-27 00:00:00").expect("until line");
        assert!(since < until);
    }

    #[test]
    fn test_render_produces_rgba_chart() {
        let series = ascending_series("ETHBTC", 200);
        let window = normalize_window(&series, 180, "BTC").expect("window");

        let image = render_chart(&window).expect("render");
        assert_eq!(image.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_empty_window_rejected() {
        let window = NormalizedWindow {
            symbol: "ETHBTC".to_string(),
            quote_asset: "BTC".to_string(),
            points: Vec::new(),
        };
        assert!(matches!(render_chart(&window), Err(RefreshError::EmptySeries(_))));
    }
}
