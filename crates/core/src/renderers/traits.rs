use crate::errors::CoreError;
use crate::models::chart::ChartSpec;

/// A sink that turns a declarative `ChartSpec` into a concrete document.
///
/// The chart assembler never knows which renderer consumes its spec;
/// adding an output format means adding one implementation here.
pub trait ChartRenderer {
    /// Human-readable name of this renderer (for logs/errors).
    fn name(&self) -> &str;

    /// Render a single chart.
    fn render(&self, spec: &ChartSpec) -> Result<String, CoreError>;
}
