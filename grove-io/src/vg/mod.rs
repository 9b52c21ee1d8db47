//! The VG/BVG codec pair
//!
//! Both encodings share one logical schema: the point positions, optional
//! per-point colors and normals (always parallel to the positions), and the
//! vertex group forest. Counts are authoritative in both encodings; there are no
//! end markers.
//!
//! # The VG text format
//!
//! Line-oriented ASCII with `key: value` section headers. The points section
//! comes first; the remaining sections may follow in any order, each at most
//! once, and each is optional (a count of `0` is equivalent to leaving the
//! section out):
//!
//! ```text
//! num_points: 3
//! 0.5 1.25 -3.75
//! 1 2 3
//! 4 5 6
//! num_colors: 3
//! 0.8 0.1 0.1
//! ...
//! num_normals: 3
//! 0 0 1
//! ...
//! num_groups: 1
//! group_type: 0
//! group_label: roof
//! group_color: 0.8 0.1 0.1
//! group_num_points: 2
//! 0 2
//! num_children: 0
//! ```
//!
//! Positions are `f64`, color and normal channels `f32`, point indices `u32`.
//! Every group block carries its type code, label, color, member index list (one
//! line, omitted when empty) and child count; child blocks follow recursively.
//! Floats are written in Rust's shortest round-trip notation, so decoding an
//! encoded file restores the exact values.
//!
//! # The BVG binary format
//!
//! The same schema packed little-endian, with the fixed widths `f64` for
//! position components, `f32` for color/normal channels and `u32` for every
//! count, index and type code:
//!
//! ```text
//! magic        4 bytes, "BVG1"
//! num_points   u32, then num_points × 3 × f64
//! num_colors   u32 (0 or num_points), then × 3 × f32
//! num_normals  u32 (0 or num_points), then × 3 × f32
//! num_groups   u32, then that many group records:
//!     type code     u32
//!     label length  u32, then that many bytes UTF-8
//!     color         3 × f32
//!     index count   u32, then that many u32
//!     child count   u32, then that many child records (recursive)
//! ```
//!
//! There is no padding and no checksum; encoding the same point set twice yields
//! byte-identical output. The reader validates every declared count against the
//! remaining stream length before allocating, so truncated or corrupt input is
//! rejected instead of over-read.

mod vg_reader;
pub use self::vg_reader::*;

mod vg_writer;
pub use self::vg_writer::*;

mod bvg_reader;
pub use self::bvg_reader::*;

mod bvg_writer;
pub use self::bvg_writer::*;

mod vg_types;
pub(crate) use self::vg_types::*;
