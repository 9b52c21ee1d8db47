use anyhow::{bail, Result};
use nalgebra::Vector3;

use super::{GroupHandle, VertexGroup};

/// A point cloud with optional per-point attributes and a forest of vertex groups.
///
/// Point indices are the stable identity: group membership and the optional color
/// and normal arrays all refer to points by their position in [`PointSet::positions`].
/// The color and normal arrays, when present, run parallel to the positions.
///
/// All groups, nested or top-level, live in a single arena owned by the point set;
/// [`PointSet::root_groups`] lists the top-level groups in declaration order and
/// every group links to its parent and children through [`GroupHandle`]s into that
/// arena. The point set owns its groups exclusively and drops them when it is
/// dropped itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    positions: Vec<Vector3<f64>>,
    colors: Option<Vec<Vector3<f32>>>,
    normals: Option<Vec<Vector3<f32>>>,
    groups: Vec<VertexGroup>,
    roots: Vec<GroupHandle>,
}

impl PointSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_positions(positions: Vec<Vector3<f64>>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn num_points(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    /// Per-point RGB colors with channels in `[0, 1]`, if the point set carries any
    pub fn colors(&self) -> Option<&[Vector3<f32>]> {
        self.colors.as_deref()
    }

    pub fn normals(&self) -> Option<&[Vector3<f32>]> {
        self.normals.as_deref()
    }

    /// Attaches per-point colors. The array must run parallel to the positions.
    pub fn set_colors(&mut self, colors: Vec<Vector3<f32>>) -> Result<()> {
        if colors.len() != self.positions.len() {
            bail!(
                "color count {} does not match point count {}",
                colors.len(),
                self.positions.len()
            );
        }
        self.colors = Some(colors);
        Ok(())
    }

    /// Attaches per-point normals. The array must run parallel to the positions.
    pub fn set_normals(&mut self, normals: Vec<Vector3<f32>>) -> Result<()> {
        if normals.len() != self.positions.len() {
            bail!(
                "normal count {} does not match point count {}",
                normals.len(),
                self.positions.len()
            );
        }
        self.normals = Some(normals);
        Ok(())
    }

    /// The group arena: every group of the forest, in insertion order. Iterate
    /// [`PointSet::root_groups`] instead to walk the forest top-down.
    pub fn groups(&self) -> &[VertexGroup] {
        &self.groups
    }

    /// Handles of the top-level groups, in declaration order
    pub fn root_groups(&self) -> &[GroupHandle] {
        &self.roots
    }

    /// Total number of groups in the arena, nested groups included
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Resolves a handle to its group.
    ///
    /// Panics if `handle` was issued by a different point set and is out of range
    /// for this arena.
    pub fn group(&self, handle: GroupHandle) -> &VertexGroup {
        &self.groups[handle.0]
    }

    /// Appends a top-level group and returns its handle
    pub fn add_group(&mut self, group: VertexGroup) -> GroupHandle {
        let handle = GroupHandle(self.groups.len());
        self.groups.push(group);
        self.roots.push(handle);
        handle
    }

    /// Appends a group nested under `parent` and returns its handle. The new
    /// group starts without children, so the forest stays acyclic.
    pub fn add_child_group(
        &mut self,
        parent: GroupHandle,
        group: VertexGroup,
    ) -> Result<GroupHandle> {
        if parent.0 >= self.groups.len() {
            bail!("parent group handle {} is out of range", parent.0);
        }
        let handle = GroupHandle(self.groups.len());
        let mut group = group;
        group.set_parent(parent);
        self.groups.push(group);
        self.groups[parent.0].push_child(handle);
        Ok(handle)
    }
}
