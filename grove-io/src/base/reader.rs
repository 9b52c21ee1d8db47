use anyhow::Result;
use grove_core::model::PointSet;

/// Base trait for all types that support reading point set data
pub trait PointSetReader {
    /// Read the complete point set from this `PointSetReader`. A reader decodes a
    /// whole file at a time: positions, the optional per-point attributes and the
    /// vertex group forest are all populated by this single call. On failure no
    /// partially built point set is handed out.
    fn read_point_set(&mut self) -> Result<PointSet>;
}
