use anyhow::Result;
use grove_core::model::PointSet;

/// Base trait for all types that support writing point set data
pub trait PointSetWriter {
    /// Write the given point set to the associated destination, flushing the
    /// underlying stream before returning. If an error is returned the
    /// destination holds an incomplete encoding and should be discarded.
    fn write_point_set(&mut self, point_set: &PointSet) -> Result<()>;
}
