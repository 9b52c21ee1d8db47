use std::{
    convert::TryFrom,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use grove_core::{
    model::{GroupHandle, PointSet},
    nalgebra::Vector3,
};

use crate::base::PointSetWriter;

use super::BVG_MAGIC;

/// `PointSetWriter` implementation for the binary BVG format.
///
/// Emits no padding and no uninitialized bytes: writing the same point set twice
/// produces byte-identical output.
pub struct BvgWriter<W: Write> {
    writer: W,
}

impl BvgWriter<BufWriter<File>> {
    /// Creates the BVG file at `path`, overwriting any previous contents
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::from_write(file))
    }
}

impl<W: Write> BvgWriter<W> {
    pub fn from_write(write: W) -> Self {
        Self { writer: write }
    }

    fn write_count(&mut self, count: usize, what: &str) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| anyhow!("number of {} exceeds the BVG limit of {}", what, u32::MAX))?;
        self.writer.write_u32::<LittleEndian>(count)?;
        Ok(())
    }

    fn write_vector3_f32(&mut self, value: Vector3<f32>) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value.x)?;
        self.writer.write_f32::<LittleEndian>(value.y)?;
        self.writer.write_f32::<LittleEndian>(value.z)?;
        Ok(())
    }

    fn write_channel_section(
        &mut self,
        channels: Option<&[Vector3<f32>]>,
        what: &str,
    ) -> Result<()> {
        match channels {
            Some(values) => {
                self.write_count(values.len(), what)?;
                for value in values {
                    self.write_vector3_f32(*value)?;
                }
            }
            None => self.write_count(0, what)?,
        }
        Ok(())
    }

    fn write_group(&mut self, point_set: &PointSet, handle: GroupHandle) -> Result<()> {
        let group = point_set.group(handle);

        self.writer
            .write_u32::<LittleEndian>(group.primitive().code())?;
        self.write_count(group.label().len(), "label bytes")?;
        self.writer.write_all(group.label().as_bytes())?;
        self.write_vector3_f32(group.color())?;

        self.write_count(group.point_indices().len(), "group point indices")?;
        for &index in group.point_indices() {
            self.writer.write_u32::<LittleEndian>(index)?;
        }

        self.write_count(group.children().len(), "child groups")?;
        for &child in group.children() {
            self.write_group(point_set, child)?;
        }
        Ok(())
    }
}

impl<W: Write> PointSetWriter for BvgWriter<W> {
    fn write_point_set(&mut self, point_set: &PointSet) -> Result<()> {
        self.writer.write_all(&BVG_MAGIC)?;

        self.write_count(point_set.num_points(), "points")?;
        for position in point_set.positions() {
            self.writer.write_f64::<LittleEndian>(position.x)?;
            self.writer.write_f64::<LittleEndian>(position.y)?;
            self.writer.write_f64::<LittleEndian>(position.z)?;
        }

        self.write_channel_section(point_set.colors(), "colors")?;
        self.write_channel_section(point_set.normals(), "normals")?;

        self.write_count(point_set.root_groups().len(), "groups")?;
        for &root in point_set.root_groups() {
            self.write_group(point_set, root)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::PointSetReader;
    use crate::vg::BvgReader;
    use grove_core::model::{PrimitiveType, VertexGroup};
    use std::io::Cursor;

    fn segmented_point_set() -> PointSet {
        let mut point_set = PointSet::from_positions(vec![
            Vector3::new(0.1, -2.5, 1e-7),
            Vector3::new(1.0 / 3.0, 2.0, 3.0),
            Vector3::new(-4.25, 5.5, 6.125),
            Vector3::new(7.0, 8.0, 9.0),
        ]);
        point_set
            .set_normals(vec![Vector3::new(0.0, 0.0, 1.0); 4])
            .unwrap();
        let root = point_set.add_group(VertexGroup::new(
            "facade",
            PrimitiveType::Plane,
            Vector3::new(0.8, 0.1, 0.1),
            vec![0, 1, 3],
        ));
        point_set
            .add_child_group(
                root,
                VertexGroup::new(
                    "window",
                    PrimitiveType::Other(9),
                    Vector3::new(0.1, 0.1, 0.8),
                    vec![2],
                ),
            )
            .unwrap();
        point_set
    }

    fn encode(point_set: &PointSet) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        BvgWriter::from_write(&mut cursor)
            .write_point_set(point_set)
            .expect("could not encode point set as BVG");
        cursor.into_inner()
    }

    #[test]
    fn test_bvg_roundtrip_is_exact() {
        let expected = segmented_point_set();
        let encoded = encode(&expected);
        let actual = BvgReader::from_read(Cursor::new(encoded))
            .expect("could not open written BVG data")
            .read_point_set()
            .expect("could not decode written BVG data");
        // binary positions are stored verbatim, so equality is exact
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_bvg_encode_is_deterministic() {
        let point_set = segmented_point_set();
        assert_eq!(encode(&point_set), encode(&point_set));
    }

    #[test]
    fn test_bvg_truncation_is_rejected() {
        let encoded = encode(&segmented_point_set());
        // cutting the stream anywhere inside the payload must fail cleanly
        let truncated = &encoded[..encoded.len() / 2];
        let result = BvgReader::from_read(Cursor::new(truncated.to_vec()))
            .and_then(|mut reader| reader.read_point_set());
        assert!(result.is_err());
    }

    #[test]
    fn test_bvg_labels_roundtrip_utf8() {
        let mut point_set = PointSet::from_positions(vec![Vector3::new(1.0, 2.0, 3.0)]);
        point_set.add_group(VertexGroup::new(
            "Fläche Nr. 1",
            PrimitiveType::Plane,
            Vector3::new(0.5, 0.5, 0.5),
            vec![0],
        ));
        let encoded = encode(&point_set);
        let actual = BvgReader::from_read(Cursor::new(encoded))
            .unwrap()
            .read_point_set()
            .unwrap();
        assert_eq!("Fläche Nr. 1", actual.group(actual.root_groups()[0]).label());
    }
}
