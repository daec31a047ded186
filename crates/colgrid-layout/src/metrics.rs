//! Layout metrics for rendering grid handles and width labels.
//!
//! The rendering surface reports the container's content width and the gap
//! between columns in pixels. [`derive_metrics`] projects a width vector onto
//! those measurements and returns, for every boundary, where the resize handle
//! is centered and, for every column, where its width badge is anchored. Both
//! are expressed as a percentage of the container so the UI can position them
//! without knowing anything about pixels.
//!
//! Nothing here is stored in the document; the result is recomputable from
//! its three inputs at any time.

use serde::{Deserialize, Serialize};

/// Resize handle between column `index` and `index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandleMetric {
    pub index: usize,
    /// Handle center in pixels from the container's leading edge.
    pub center_px: f64,
    /// Handle center as a percentage of the container width.
    pub percent: f64,
}

/// Width label for one column, anchored at the column's trailing edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub index: usize,
    /// The column's share of the available width, in percent.
    pub width_percent: f64,
    /// The column's rendered width in pixels.
    pub width_px: f64,
    /// Trailing edge in pixels from the container's leading edge.
    pub anchor_px: f64,
    /// Trailing edge as a percentage of the container width.
    pub anchor_percent: f64,
    /// Text for the percentage badge shown during a drag.
    pub badge: String,
}

/// Derived, read-only projection of a grid onto the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub container_width: f64,
    pub gap_width: f64,
    /// Container width minus every inter-column gap.
    pub available_width: f64,
    pub handles: Vec<HandleMetric>,
    pub labels: Vec<ColumnLabel>,
}

impl LayoutMetrics {
    /// Handle `index`, if that boundary exists.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<&HandleMetric> {
        self.handles.get(index)
    }

    /// Label for column `index`, if that column exists.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&ColumnLabel> {
        self.labels.get(index)
    }
}

fn sanitize_px(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn percent_of(px: f64, container: f64) -> f64 {
    if container > 0.0 {
        px / container * 100.0
    } else {
        0.0
    }
}

/// Convert a pointer travel in pixels to a width delta in percent of the
/// container. `None` when the container has no measurable width.
#[must_use]
pub fn pixel_delta_to_percent(delta_px: f64, container_px: f64) -> Option<f64> {
    if container_px.is_finite() && container_px > 0.0 && delta_px.is_finite() {
        Some(delta_px / container_px * 100.0)
    } else {
        None
    }
}

/// Badge text for a width, e.g. `"60%"` or `"33.3%"`.
#[must_use]
pub fn format_width_badge(width: f64) -> String {
    let rounded = (width * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}

/// Project `widths` onto a container of `container_width` pixels with
/// `gap_width` pixels between adjacent columns.
///
/// Negative or non-finite measurements are treated as zero. A zero-width
/// container yields zero percentages rather than dividing by zero.
#[must_use]
pub fn derive_metrics(widths: &[f64], container_width: f64, gap_width: f64) -> LayoutMetrics {
    let container_width = sanitize_px(container_width);
    let gap_width = sanitize_px(gap_width);
    let count = widths.len();
    let gaps = count.saturating_sub(1) as f64;
    let available_width = (container_width - gap_width * gaps).max(0.0);

    let mut handles = Vec::with_capacity(count.saturating_sub(1));
    let mut labels = Vec::with_capacity(count);
    let mut cumulative = 0.0;

    for (index, &width) in widths.iter().enumerate() {
        let width_px = available_width * width / 100.0;
        cumulative += width_px;
        let trailing = cumulative + gap_width * index as f64;

        labels.push(ColumnLabel {
            index,
            width_percent: width,
            width_px,
            anchor_px: trailing,
            anchor_percent: percent_of(trailing, container_width),
            badge: format_width_badge(width),
        });

        if index + 1 < count {
            let center_px = trailing + gap_width / 2.0;
            handles.push(HandleMetric {
                index,
                center_px,
                percent: percent_of(center_px, container_width),
            });
        }
    }

    LayoutMetrics {
        container_width,
        gap_width,
        available_width,
        handles,
        labels,
    }
}
