//! Framing constants shared by the VG/BVG readers and writers

/// Magic bytes at the start of every BVG stream
pub(crate) const BVG_MAGIC: [u8; 4] = *b"BVG1";

/// Section and field keywords of the text format
pub(crate) const NUM_POINTS: &str = "num_points";
pub(crate) const NUM_COLORS: &str = "num_colors";
pub(crate) const NUM_NORMALS: &str = "num_normals";
pub(crate) const NUM_GROUPS: &str = "num_groups";
pub(crate) const GROUP_TYPE: &str = "group_type";
pub(crate) const GROUP_LABEL: &str = "group_label";
pub(crate) const GROUP_COLOR: &str = "group_color";
pub(crate) const GROUP_NUM_POINTS: &str = "group_num_points";
pub(crate) const NUM_CHILDREN: &str = "num_children";

/// Encoded size of one position (3 × f64)
pub(crate) const POSITION_RECORD_SIZE: u64 = 24;
/// Encoded size of one color or normal (3 × f32)
pub(crate) const CHANNEL_RECORD_SIZE: u64 = 12;
/// Encoded size of one point index
pub(crate) const INDEX_SIZE: u64 = 4;
/// Smallest possible group record: type code, empty label, color, zero indices,
/// zero children
pub(crate) const MIN_GROUP_RECORD_SIZE: u64 = 28;

/// Maximum group nesting depth accepted by both readers, so crafted child
/// counts cannot exhaust the stack
pub(crate) const MAX_GROUP_NESTING: usize = 64;
