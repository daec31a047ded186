//! Measurement capability supplied by the rendering surface.

/// Pixel sizes of a rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceMetrics {
    /// Inner width of the grid container.
    pub container_width: f64,
    /// Gap between adjacent columns.
    pub gap_width: f64,
}

impl SurfaceMetrics {
    #[must_use]
    pub const fn new(container_width: f64, gap_width: f64) -> Self {
        Self {
            container_width,
            gap_width,
        }
    }

    /// Whether a drag can convert pixels against this container.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.container_width.is_finite() && self.container_width > 0.0
    }
}

/// Reports the current pixel size of a grid container.
///
/// Returns `None` while the grid is not laid out.
pub trait LayoutMeasurer {
    fn measure(&self) -> Option<SurfaceMetrics>;
}

impl<F> LayoutMeasurer for F
where
    F: Fn() -> Option<SurfaceMetrics>,
{
    fn measure(&self) -> Option<SurfaceMetrics> {
        self()
    }
}

/// Measurer that always reports the same metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedMeasurer(pub Option<SurfaceMetrics>);

impl FixedMeasurer {
    #[must_use]
    pub const fn new(container_width: f64, gap_width: f64) -> Self {
        Self(Some(SurfaceMetrics::new(container_width, gap_width)))
    }

    /// A surface that is not laid out.
    #[must_use]
    pub const fn unmeasured() -> Self {
        Self(None)
    }
}

impl LayoutMeasurer for FixedMeasurer {
    fn measure(&self) -> Option<SurfaceMetrics> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_measurers() {
        let measurer = || Some(SurfaceMetrics::new(800.0, 16.0));
        assert_eq!(measurer.measure(), Some(SurfaceMetrics::new(800.0, 16.0)));
    }

    #[test]
    fn measurable_requires_positive_width() {
        assert!(SurfaceMetrics::new(1.0, 0.0).is_measurable());
        assert!(!SurfaceMetrics::new(0.0, 0.0).is_measurable());
        assert!(!SurfaceMetrics::new(f64::NAN, 0.0).is_measurable());
        assert_eq!(FixedMeasurer::unmeasured().measure(), None);
    }
}
