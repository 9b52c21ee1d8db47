#![warn(clippy::all)]

//! Reading and writing of segmented point clouds
//!
//! Persistence for the [PointSet](grove_core::model::PointSet) model: the VG text
//! format, its binary sibling BVG, and a group-colored ASCII PLY export. File
//! formats are selected by extension. The quickest way in are the functions in the
//! [base](crate::base) module ([read_point_set](crate::base::read_point_set),
//! [save_point_set](crate::base::save_point_set)); the per-format readers and
//! writers in [vg](crate::vg) and [ply](crate::ply) give stream-level control.

pub mod base;
/// Error taxonomy of the high-level read/save entry points
pub mod error;
/// The group-colored ASCII PLY export (write-only)
pub mod ply;
/// The VG/BVG codec pair
pub mod vg;
