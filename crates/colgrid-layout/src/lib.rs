#![forbid(unsafe_code)]

//! Width model and layout projection for resizable column grids.
//!
//! # Role in colgrid
//! `colgrid-layout` is the pure layer. It knows nothing about documents,
//! pointers, or rendering; it turns width vectors into valid width vectors
//! and projects them onto measured pixel sizes.
//!
//! # Primary responsibilities
//! - **Width model**: [`normalize`] and [`clamp_pair`].
//! - **Configuration**: [`GridConfig`] with the structural constants.
//! - **Metrics**: [`derive_metrics`] and the memoizing [`MetricsCache`].

pub mod cache;
pub mod config;
pub mod metrics;
pub mod width;

pub use cache::{DEFAULT_METRICS_CACHE_CAPACITY, MetricsCache, MetricsCacheKey, MetricsCacheStats};
pub use config::{ConfigError, GridConfig};
pub use metrics::{
    ColumnLabel, HandleMetric, LayoutMetrics, derive_metrics, format_width_badge,
    pixel_delta_to_percent,
};
pub use width::{
    MAX_COLUMNS, MAX_PLAUSIBLE_TOTAL, MIN_COLUMNS, MIN_WIDTH, WIDTH_SUM, WIDTH_SUM_TOLERANCE,
    WidthBounds, WidthError, check_widths, clamp_pair, equal_widths, normalize, round_width,
    widths_sum_ok,
};
