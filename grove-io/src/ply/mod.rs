mod ply_writer;
pub use self::ply_writer::*;
