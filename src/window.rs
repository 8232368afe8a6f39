//! # Search window estimation
//!
//! Derives a tighter horizontal search radius from the distribution of the raw disparities, so
//! that the rematching pass can discard implausibly large offsets.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::debug;

use crate::config::SearchConfig;
use crate::disparity::DisparityMap;

#[cfg(feature = "statistics")]
use plotters::prelude::*;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Probability mass of the disparity magnitudes pooled from both maps.
///
/// Bucket `i` holds the share of pixels with `|d| == i`. There are at least `max_window + 1`
/// buckets, more if a map holds a larger magnitude. Magnitudes beyond both `max_window` and the
/// map width cannot come from a match and share the last bucket.
pub fn magnitude_histogram(
    dmap_left: &DisparityMap,
    dmap_right: &DisparityMap,
    max_window: usize
) -> Vec<f64> {
    let cap = max_window.max(dmap_left.width()).max(dmap_right.width());
    let bucket = |d: i32| (d.unsigned_abs() as usize).min(cap);

    let len = max_window
        .max(bucket_of_max(dmap_left, cap))
        .max(bucket_of_max(dmap_right, cap)) + 1;

    let mut counts = vec![0usize; len];

    for &d in dmap_left.values().iter().chain(dmap_right.values()) {
        counts[bucket(d)] += 1;
    }

    let total: usize = counts.iter().sum();

    if total == 0 {
        return vec![0.0; len];
    }

    counts.iter().map(|&c| c as f64 / total as f64).collect()
}

fn bucket_of_max(dmap: &DisparityMap, cap: usize) -> usize {
    dmap.max_abs().min(cap)
}

/// Estimate the search radius for the rematching pass.
///
/// Scans the magnitude histogram from the largest bucket down and extends the first bucket whose
/// mass reaches `dw_threshold` by `dw_extension`. If no bucket qualifies, `max_window` is
/// returned.
pub fn estimate_window(
    dmap_left: &DisparityMap,
    dmap_right: &DisparityMap,
    config: &SearchConfig
) -> usize {
    let histogram = magnitude_histogram(dmap_left, dmap_right, config.max_window);

    #[cfg(feature = "statistics")]
    plot_histogram(&histogram, config.dw_threshold);

    let window = match histogram.iter().rposition(|&mass| mass >= config.dw_threshold) {
        Some(i) => (i as f64 * config.dw_extension).round_ties_even() as usize,
        None => {
            debug!(
                "No disparity bucket reaches {}, keeping the full window",
                config.dw_threshold
            );
            config.max_window
        }
    };

    debug!("Estimated search window: {} (initial {})", window, config.max_window);

    window
}

#[cfg(feature = "statistics")]
fn plot_histogram(histogram: &[f64], threshold: f64) {
    let result = (|| -> std::result::Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all("plots/window")?;

        let area = BitMapBackend::new("plots/window/histogram.png", (800, 600))
            .into_drawing_area();
        area.fill(&WHITE)?;

        let max_mass = histogram.iter().copied().fold(threshold, f64::max);

        let mut chart = ChartBuilder::on(&area)
            .caption("Disparity magnitude histogram", ("sans-serif", 20).into_font())
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0..histogram.len(), 0.0..max_mass)?;

        chart.configure_mesh().draw()?;

        chart
            .draw_series(LineSeries::new(
                histogram.iter().enumerate().map(|(i, &m)| (i, m)),
                &BLUE
            ))?
            .label("Mass")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .draw_series(LineSeries::new(
                vec![(0, threshold), (histogram.len(), threshold)],
                &RED
            ))?
            .label("Threshold")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        area.present()?;

        Ok(())
    })();

    if let Err(e) = result {
        log::warn!("Could not plot the disparity histogram: {}", e);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
