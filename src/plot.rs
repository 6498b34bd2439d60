//! SVG chart of average probe counts per strategy

use std::{error::Error, path::Path};

use plotters::prelude::*;

use crate::{experiment::ExperimentReport, stats::OperationStats};

/// Colors cycled through the strategy lines
const COLORS: [RGBColor; 3] = [
    RGBColor(220, 50, 50), // red
    RGBColor(50, 90, 220), // blue
    RGBColor(50, 180, 50), // green
];

/// Operations plotted, each gets its own panel
const PANELS: [(&str, fn(&OperationStats) -> f64); 3] = [
    ("Average probes per insert", OperationStats::avg_probes_insert),
    ("Average probes per search", OperationStats::avg_probes_search),
    ("Average probes per delete", OperationStats::avg_probes_delete),
];

/// Draws average probes per operation against load factor, one line per strategy.
///
/// # Errors
///
/// Returns an error if the report is empty or the SVG cannot be written.
#[allow(clippy::arithmetic_side_effects)]
pub fn render_probe_chart(report: &ExperimentReport, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut load_factors: Vec<_> = report.load_factors.iter().collect();
    load_factors.sort_by(|a, b| a.load_factor.total_cmp(&b.load_factor));
    let (Some(first), Some(last)) = (load_factors.first(), load_factors.last()) else {
        return Err("experiment report holds no load factor".into());
    };
    let x_range = (first.load_factor - 0.05)..(last.load_factor + 0.05);

    let root = SVGBackend::new(path, (1200, 1200)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((PANELS.len(), 1));

    for (&(title, pick), area) in PANELS.iter().zip(areas.iter()) {
        let max_y = load_factors
            .iter()
            .flat_map(|lf| lf.results.iter().map(move |r| pick(&r.stats)))
            .fold(1.0, f64::max) *
            1.1;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), 0.0..max_y)?;

        chart.configure_mesh().x_desc("Load factor").y_desc("Probes").draw()?;

        let strategies = load_factors.first().map(|lf| lf.results.len()).unwrap_or_default();
        for (index, color) in (0..strategies).zip(COLORS.iter().cycle()) {
            let points: Vec<(f64, f64)> = load_factors
                .iter()
                .filter_map(|lf| lf.results.get(index).map(|r| (lf.load_factor, pick(&r.stats))))
                .collect();
            let name = first.results.get(index).map(|r| r.strategy.name()).unwrap_or_default();
            let style = ShapeStyle::from(color).stroke_width(2);

            chart
                .draw_series(LineSeries::new(points.clone(), style))?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{ExperimentConfig, run_experiment};

    #[test]
    fn test_render_probe_chart() -> Result<(), Box<dyn Error>> {
        let config = ExperimentConfig {
            elements: 100,
            load_factors: vec![0.5, 0.8],
            searches: 50,
            misses: 20,
            deletes: 10,
            runs: 1,
            ..ExperimentConfig::default()
        };
        let report = run_experiment(&config)?;
        let path = std::env::temp_dir().join(format!("probe_chart_{}.svg", std::process::id()));

        render_probe_chart(&report, &path)?;
        let svg = std::fs::read_to_string(&path)?;
        std::fs::remove_file(&path)?;
        assert!(svg.contains("<svg"));
        Ok(())
    }

    #[test]
    fn test_empty_report_is_rejected() {
        let report =
            ExperimentReport { config: ExperimentConfig::default(), load_factors: Vec::new() };
        let path = std::env::temp_dir().join("probe_chart_empty.svg");
        assert!(render_probe_chart(&report, &path).is_err());
    }
}
