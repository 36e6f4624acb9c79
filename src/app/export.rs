use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::app::calculator::{format_plain, Schedule, ScheduleEntry};
use crate::app::config::ChartConfig;

/// One CSV row. Field names double as the header.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Contribution")]
    pub contribution: String,
    #[serde(rename = "Interest")]
    pub interest: String,
    #[serde(rename = "Balance")]
    pub balance: String,
}

impl From<&ScheduleEntry> for CsvRecord {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            month: entry.month,
            contribution: format_plain(entry.contribution),
            interest: format_plain(entry.interest),
            balance: format_plain(entry.balance),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Png,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Png => "png",
        }
    }

    fn dialog_title(&self) -> &'static str {
        match self {
            ExportKind::Csv => "Salvar CSV",
            ExportKind::Png => "Salvar Gráfico",
        }
    }

    fn filter_name(&self) -> &'static str {
        match self {
            ExportKind::Csv => "CSV Files",
            ExportKind::Png => "PNG Files",
        }
    }
}

/// Writes the whole document at once; nothing is created if serialization fails.
pub fn write_csv(schedule: &Schedule, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        for entry in schedule.entries() {
            wtr.serialize(CsvRecord::from(entry))?;
        }
        wtr.flush()?;
    }
    fs::write(path, buf).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
pub fn read_csv(path: &Path) -> Result<Vec<CsvRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let records = rdr.deserialize().collect::<Result<Vec<CsvRecord>, _>>()?;
    Ok(records)
}

/// Returns the written path, or `None` when there was nothing to do.
pub fn export_csv(
    schedule: Option<&Schedule>,
    pick: impl FnOnce() -> Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let Some(schedule) = schedule.filter(|s| !s.is_empty()) else {
        tracing::debug!("csv export skipped: no schedule");
        return Ok(None);
    };
    let Some(path) = pick() else {
        tracing::debug!("csv export skipped: no destination");
        return Ok(None);
    };

    write_csv(schedule, &path)?;
    tracing::info!(path = %path.display(), rows = schedule.len(), "schedule exported to csv");
    Ok(Some(path))
}

pub fn export_chart(
    schedule: Option<&Schedule>,
    chart: &ChartConfig,
    pick: impl FnOnce() -> Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let Some(schedule) = schedule.filter(|s| !s.is_empty()) else {
        tracing::debug!("chart export skipped: no schedule");
        return Ok(None);
    };
    let Some(path) = pick() else {
        tracing::debug!("chart export skipped: no destination");
        return Ok(None);
    };

    render_chart(&schedule.balances(), chart, &path)
        .with_context(|| format!("failed to save chart to {}", path.display()))?;
    tracing::info!(path = %path.display(), points = schedule.len(), "chart exported");
    Ok(Some(path))
}

/// (month, balance) pairs, months starting at 1.
pub fn chart_points(balances: &[Decimal]) -> Vec<(f64, f64)> {
    balances
        .iter()
        .enumerate()
        .map(|(i, b)| ((i + 1) as f64, b.to_f64().unwrap_or_default()))
        .collect()
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        // Unit padding vanishes for large magnitudes.
        let pad = (min.abs() * 0.05).max(1.0);
        return (min - pad, max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Line with circle markers, one point per month. Format follows the extension.
pub fn render_chart(balances: &[Decimal], chart: &ChartConfig, path: &Path) -> Result<()> {
    let points = chart_points(balances);
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));
    let x_max = points.len().max(1) as f64;
    let (r, g, b) = chart.color;
    let color = RGBColor(r, g, b);

    let root = BitMapBackend::new(path, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0.5..x_max + 0.5, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    ctx.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, chart.marker_radius, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

pub fn file_name_for(date: Date, kind: ExportKind) -> String {
    format!(
        "cronograma-{}-{:02}-{:02}.{}",
        date.year(),
        date.month() as u8,
        date.day(),
        kind.extension()
    )
}

/// Native save dialog; `None` when the user cancels.
pub fn pick_destination(kind: ExportKind) -> Option<PathBuf> {
    let today = OffsetDateTime::now_utc().date();
    let mut path = rfd::FileDialog::new()
        .set_title(kind.dialog_title())
        .add_filter(kind.filter_name(), &[kind.extension()])
        .set_file_name(file_name_for(today, kind))
        .save_file()?;

    if path.extension().is_none() {
        path.set_extension(kind.extension());
    }
    Some(path)
}
