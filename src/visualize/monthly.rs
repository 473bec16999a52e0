// src/visualize/monthly.rs

//! Captures-per-month bar chart.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use plotters::prelude::*;
use serde::Serialize;

use crate::error::{AppError, Result};

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// Number of captures in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Bucket capture instants by calendar month.
///
/// The result covers every month from the earliest to the latest capture,
/// with zero counts for months without captures.
pub fn monthly_counts<I>(timestamps: I) -> Vec<MonthlyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for ts in timestamps {
        *buckets.entry((ts.year(), ts.month())).or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut counts = Vec::new();
    let (mut year, mut month) = first;
    loop {
        counts.push(MonthlyCount {
            year,
            month,
            count: buckets.get(&(year, month)).copied().unwrap_or(0),
        });
        if (year, month) == last {
            break;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    counts
}

/// Bar positions that carry a year label (January buckets).
pub fn january_ticks(counts: &[MonthlyCount]) -> Vec<(usize, i32)> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| c.month == 1)
        .map(|(i, c)| (i, c.year))
        .collect()
}

/// Render monthly counts as a PNG bar chart.
pub fn plot_monthly_captures(
    counts: &[MonthlyCount],
    output: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    if counts.is_empty() {
        return Err(AppError::render("no captures to plot"));
    }

    let ticks: BTreeMap<usize, i32> = january_ticks(counts).into_iter().collect();
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    let slots = counts.len();

    let root = BitMapBackend::new(output, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(AppError::render)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..slots, 0..max_count + max_count / 10 + 1)
        .map_err(AppError::render)?;

    let year_label = |x: &usize| ticks.get(x).map(|y| y.to_string()).unwrap_or_default();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&year_label)
        .y_desc("Count")
        .draw()
        .map_err(AppError::render)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            Rectangle::new([(i, 0), (i + 1, c.count)], BAR_COLOR.filled())
        }))
        .map_err(AppError::render)?;

    root.present().map_err(AppError::render)?;
    log::info!("Saved monthly capture chart to {}", output.display());
    Ok(())
}
