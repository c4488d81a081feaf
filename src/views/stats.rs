//! Statistics payload to dashboard cards and bar series.

use crate::models::{Priority, Statistics, StatusCounts, WireLabel};

/// Headline counter
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
    /// CSS modifier
    pub tone: &'static str,
}

/// One bar of a series; `percent` is relative to the series maximum
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: String,
    pub percent: u32,
}

/// A chart section, or the placeholder shown in its place
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub bars: Vec<Bar>,
    pub placeholder: Option<&'static str>,
}

impl Section {
    fn new(title: &'static str, points: Vec<(String, f64, String)>, empty: &'static str) -> Self {
        if points.is_empty() {
            return Self {
                title,
                bars: Vec::new(),
                placeholder: Some(empty),
            };
        }

        let max = points.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
        let bars = points
            .into_iter()
            .map(|(label, value, text)| Bar {
                label,
                value: text,
                percent: if max > 0.0 {
                    ((value / max) * 100.0).round().clamp(0.0, 100.0) as u32
                } else {
                    0
                },
            })
            .collect();
        Self {
            title,
            bars,
            placeholder: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsView {
    pub cards: Vec<StatCard>,
    pub total: u64,
    pub by_status: Section,
    pub resolution: Section,
    pub by_priority: Section,
}

impl StatisticsView {
    pub fn from_payload(stats: &Statistics) -> Self {
        let counts = stats.stats_by_status.clone().unwrap_or_default();
        let StatusCounts {
            open,
            in_progress,
            resolved,
            closed,
        } = counts;

        let cards = vec![
            StatCard { label: "Open", value: open, tone: "open" },
            StatCard { label: "In progress", value: in_progress, tone: "progress" },
            StatCard { label: "Resolved", value: resolved, tone: "resolved" },
            StatCard { label: "Closed", value: closed, tone: "closed" },
        ];
        // Oversized counters decode as u64::MAX
        let total = [open, in_progress, resolved, closed]
            .into_iter()
            .fold(0u64, u64::saturating_add);

        let by_status = Section::new(
            "Tickets by status",
            if stats.stats_by_status.is_some() && total > 0 {
                cards
                    .iter()
                    .map(|c| (c.label.to_string(), c.value as f64, c.value.to_string()))
                    .collect()
            } else {
                Vec::new()
            },
            "No status data available.",
        );

        let resolution = Section::new(
            "Mean resolution time per technician",
            stats
                .mean_resolution_by_technician
                .iter()
                .flatten()
                .map(|entry| {
                    let label = match (&entry.technician_name, entry.technician_id) {
                        (Some(name), _) => name.clone(),
                        (None, Some(id)) => format!("Technician #{}", id),
                        (None, None) => "Unknown technician".to_string(),
                    };
                    (label, entry.mean_hours, format!("{:.1} h", entry.mean_hours))
                })
                .collect(),
            "No resolution time data available.",
        );

        let by_priority = Section::new(
            "Tickets by priority",
            stats
                .tickets_by_priority
                .iter()
                .flatten()
                .map(|entry| {
                    let label = entry
                        .priority
                        .parse::<Priority>()
                        .map(|p| p.label().to_string())
                        .unwrap_or_else(|_| entry.priority.clone());
                    (label, entry.total as f64, entry.total.to_string())
                })
                .collect(),
            "No priority breakdown available.",
        );

        Self {
            cards,
            total,
            by_status,
            resolution,
            by_priority,
        }
    }

    /// Chart sections in display order
    pub fn sections(&self) -> [&Section; 3] {
        [&self.by_status, &self.resolution, &self.by_priority]
    }
}
