use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use grove_core::model::PointSet;

use crate::base::PointSetWriter;

/// Write-only `PointSetWriter` producing a group-colored ASCII PLY snapshot.
///
/// Every top-level group's member points are flattened into a single vertex
/// list, in group declaration order and point-index order within each group.
/// Each vertex carries the *owning group's* color, not the point's own stored
/// color, quantized to 8-bit channels. Groups need not partition the point set:
/// a point in two groups is emitted once per group, and points belonging to no
/// group are not exported at all. Nested child groups are not flattened; only
/// the top-level groups are walked.
pub struct PlyWriter<W: Write> {
    writer: W,
}

impl PlyWriter<BufWriter<File>> {
    /// Creates the PLY file at `path`, overwriting any previous contents
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::from_write(file))
    }
}

impl<W: Write> PlyWriter<W> {
    pub fn from_write(write: W) -> Self {
        Self { writer: write }
    }
}

/// Maps a color channel from `[0, 1]` to an 8-bit value, clamping out-of-range
/// input
fn quantize_channel(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

impl<W: Write> PointSetWriter for PlyWriter<W> {
    fn write_point_set(&mut self, point_set: &PointSet) -> Result<()> {
        let num_vertices: usize = point_set
            .root_groups()
            .iter()
            .map(|&handle| point_set.group(handle).size())
            .sum();

        writeln!(self.writer, "ply")?;
        writeln!(self.writer, "format ascii 1.0")?;
        writeln!(self.writer, "element vertex {}", num_vertices)?;
        writeln!(self.writer, "property float x")?;
        writeln!(self.writer, "property float y")?;
        writeln!(self.writer, "property float z")?;
        writeln!(self.writer, "property uchar red")?;
        writeln!(self.writer, "property uchar green")?;
        writeln!(self.writer, "property uchar blue")?;
        writeln!(self.writer, "end_header")?;

        for &handle in point_set.root_groups() {
            let group = point_set.group(handle);
            let color = group.color();
            let red = quantize_channel(color.x);
            let green = quantize_channel(color.y);
            let blue = quantize_channel(color.z);

            for &index in group.point_indices() {
                let position = point_set.positions().get(index as usize).with_context(|| {
                    format!(
                        "group '{}' references point {} outside the point set",
                        group.label(),
                        index
                    )
                })?;
                writeln!(
                    self.writer,
                    "{} {} {} {} {} {}",
                    position.x, position.y, position.z, red, green, blue
                )?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{
        model::{PrimitiveType, VertexGroup},
        nalgebra::Vector3,
    };
    use std::io::Cursor;

    fn export(point_set: &PointSet) -> String {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        PlyWriter::from_write(&mut cursor)
            .write_point_set(point_set)
            .expect("could not export point set as PLY");
        String::from_utf8(cursor.into_inner()).expect("PLY export is not valid UTF-8")
    }

    fn positions() -> Vec<Vector3<f64>> {
        (0..6)
            .map(|i| Vector3::new(i as f64, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn test_ply_vertex_count_matches_group_sizes() {
        let mut point_set = PointSet::from_positions(positions());
        point_set.add_group(VertexGroup::new(
            "a",
            PrimitiveType::Plane,
            Vector3::new(1.0, 0.0, 0.0),
            vec![0, 1, 2],
        ));
        point_set.add_group(VertexGroup::new(
            "b",
            PrimitiveType::Plane,
            Vector3::new(0.0, 1.0, 0.0),
            vec![3, 4],
        ));

        let output = export(&point_set);
        assert!(output.contains("element vertex 5\n"));
        let data_lines = output
            .lines()
            .skip_while(|line| *line != "end_header")
            .skip(1)
            .count();
        assert_eq!(5, data_lines);
    }

    #[test]
    fn test_ply_uses_group_color_over_point_color() {
        let mut point_set = PointSet::from_positions(positions());
        // per-point colors are all blue; the group color must win
        point_set
            .set_colors(vec![Vector3::new(0.0, 0.0, 1.0); 6])
            .unwrap();
        point_set.add_group(VertexGroup::new(
            "red",
            PrimitiveType::Plane,
            Vector3::new(1.0, 0.0, 0.0),
            vec![0],
        ));

        let output = export(&point_set);
        assert!(output.ends_with("0 0 0 255 0 0\n"));
    }

    #[test]
    fn test_ply_emits_overlapping_points_once_per_group() {
        let mut point_set = PointSet::from_positions(positions());
        point_set.add_group(VertexGroup::new(
            "a",
            PrimitiveType::Plane,
            Vector3::new(1.0, 0.0, 0.0),
            vec![2],
        ));
        point_set.add_group(VertexGroup::new(
            "b",
            PrimitiveType::Plane,
            Vector3::new(0.0, 0.0, 1.0),
            vec![2],
        ));

        let output = export(&point_set);
        assert!(output.contains("element vertex 2\n"));
        assert!(output.contains("2 0 0 255 0 0\n"));
        assert!(output.contains("2 0 0 0 0 255\n"));
    }

    #[test]
    fn test_ply_skips_ungrouped_points() {
        let mut point_set = PointSet::from_positions(positions());
        point_set.add_group(VertexGroup::new(
            "only",
            PrimitiveType::Plane,
            Vector3::new(0.5, 0.5, 0.5),
            vec![1],
        ));

        let output = export(&point_set);
        assert!(output.contains("element vertex 1\n"));
        // 128 = round(0.5 * 255)
        assert!(output.contains("1 0 0 128 128 128\n"));
        assert!(!output.contains("\n5 0 0"));
    }

    #[test]
    fn test_ply_clamps_out_of_range_channels() {
        assert_eq!(255, quantize_channel(1.2));
        assert_eq!(0, quantize_channel(-0.3));
        assert_eq!(255, quantize_channel(1.0));
        assert_eq!(0, quantize_channel(0.0));
        assert_eq!(128, quantize_channel(0.501));
    }
}
