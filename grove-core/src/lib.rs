#![warn(clippy::all)]

//! Core data structures for segmented point clouds
//!
//! A segmented point cloud is a set of 3D positions, optional per-point colors and
//! normals, and a forest of vertex groups: named subsets of the points that carry a
//! display color and a primitive classification. The [PointSet](crate::model::PointSet)
//! type in the [model](crate::model) module holds all of this; persistence lives in
//! the `grove-io` crate.

pub extern crate nalgebra;

/// In-memory representation of point sets and their vertex groups
pub mod model;
