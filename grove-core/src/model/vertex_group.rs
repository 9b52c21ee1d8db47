use nalgebra::Vector3;

/// Identifies a [`VertexGroup`] within the point set that owns it.
///
/// Handles are plain indices into the owning point set's group arena and are only
/// meaningful for the point set that issued them. Using a handle with a different
/// point set is a logic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(pub(crate) usize);

impl GroupHandle {
    /// Position of the group in the arena returned by [`super::PointSet::groups`]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Classification tag of a vertex group, e.g. the geometric primitive the group's
/// points were fitted to.
///
/// The tag is opaque to the codecs: a code without a named variant survives a
/// load/save cycle through [`PrimitiveType::Other`]. [`PrimitiveType::code`] is the
/// canonical numeric form used on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Plane,
    Cylinder,
    Sphere,
    Cone,
    Torus,
    Other(u32),
}

impl PrimitiveType {
    /// Maps a numeric type code to its variant. Codes above the named range are
    /// preserved verbatim in `Other`.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => PrimitiveType::Plane,
            1 => PrimitiveType::Cylinder,
            2 => PrimitiveType::Sphere,
            3 => PrimitiveType::Cone,
            4 => PrimitiveType::Torus,
            other => PrimitiveType::Other(other),
        }
    }

    /// The numeric type code written to disk
    pub fn code(self) -> u32 {
        match self {
            PrimitiveType::Plane => 0,
            PrimitiveType::Cylinder => 1,
            PrimitiveType::Sphere => 2,
            PrimitiveType::Cone => 3,
            PrimitiveType::Torus => 4,
            PrimitiveType::Other(code) => code,
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PrimitiveType::Plane => write!(f, "plane"),
            PrimitiveType::Cylinder => write!(f, "cylinder"),
            PrimitiveType::Sphere => write!(f, "sphere"),
            PrimitiveType::Cone => write!(f, "cone"),
            PrimitiveType::Torus => write!(f, "torus"),
            PrimitiveType::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// A named subset of the points of a [`super::PointSet`].
///
/// Groups reference their member points by index into the owning point set's
/// position array; the indices are ordered and need not partition the point set (a
/// point may belong to zero or several groups). The `color` is the group-level
/// display color with channels in `[0, 1]`. Parent/child links are expressed as
/// [`GroupHandle`]s so the forest stays free of ownership cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGroup {
    label: String,
    primitive: PrimitiveType,
    color: Vector3<f32>,
    point_indices: Vec<u32>,
    parent: Option<GroupHandle>,
    children: Vec<GroupHandle>,
}

impl VertexGroup {
    /// Creates a top-level group with no parent and no children. Nesting is
    /// established through [`super::PointSet::add_child_group`].
    pub fn new(
        label: impl Into<String>,
        primitive: PrimitiveType,
        color: Vector3<f32>,
        point_indices: Vec<u32>,
    ) -> Self {
        Self {
            label: label.into(),
            primitive,
            color,
            point_indices,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }

    pub fn color(&self) -> Vector3<f32> {
        self.color
    }

    /// The member point indices, in declaration order
    pub fn point_indices(&self) -> &[u32] {
        &self.point_indices
    }

    /// Number of member points. A point appearing in both this group and one of
    /// its children is counted by each.
    pub fn size(&self) -> usize {
        self.point_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_indices.is_empty()
    }

    /// Handle of the enclosing group, or `None` for top-level groups
    pub fn parent(&self) -> Option<GroupHandle> {
        self.parent
    }

    /// Handles of the nested subgroups, in declaration order
    pub fn children(&self) -> &[GroupHandle] {
        &self.children
    }

    pub(crate) fn set_parent(&mut self, parent: GroupHandle) {
        self.parent = Some(parent);
    }

    pub(crate) fn push_child(&mut self, child: GroupHandle) {
        self.children.push(child);
    }
}
