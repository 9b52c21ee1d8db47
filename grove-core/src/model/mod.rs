mod point_set;
pub use self::point_set::*;

mod vertex_group;
pub use self::vertex_group::*;
