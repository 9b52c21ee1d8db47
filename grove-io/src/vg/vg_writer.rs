use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{bail, Result};
use grove_core::{
    model::{GroupHandle, PointSet},
    nalgebra::Vector3,
};

use crate::base::PointSetWriter;

use super::{
    GROUP_COLOR, GROUP_LABEL, GROUP_NUM_POINTS, GROUP_TYPE, NUM_CHILDREN, NUM_COLORS, NUM_GROUPS,
    NUM_NORMALS, NUM_POINTS,
};

/// `PointSetWriter` implementation for the text VG format.
///
/// Sections are emitted in the canonical order (points, colors, normals,
/// groups); absent color/normal sections are written with a count of zero.
/// Floats use Rust's shortest round-trip notation, so a decode of the output
/// restores the exact values and writing the same point set twice produces
/// identical bytes.
pub struct VgWriter<W: Write> {
    writer: W,
}

impl VgWriter<BufWriter<File>> {
    /// Creates the VG file at `path`, overwriting any previous contents
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::from_write(file))
    }
}

impl<W: Write> VgWriter<W> {
    pub fn from_write(write: W) -> Self {
        Self { writer: write }
    }

    fn write_channel_section(
        &mut self,
        key: &str,
        channels: Option<&[Vector3<f32>]>,
    ) -> Result<()> {
        match channels {
            Some(values) => {
                writeln!(self.writer, "{}: {}", key, values.len())?;
                for value in values {
                    writeln!(self.writer, "{} {} {}", value.x, value.y, value.z)?;
                }
            }
            None => writeln!(self.writer, "{}: 0", key)?,
        }
        Ok(())
    }

    fn write_group(&mut self, point_set: &PointSet, handle: GroupHandle) -> Result<()> {
        let group = point_set.group(handle);
        if group.label().contains('\n') || group.label().contains('\r') {
            bail!(
                "group label {:?} contains a line break and cannot be stored as VG text",
                group.label()
            );
        }

        writeln!(self.writer, "{}: {}", GROUP_TYPE, group.primitive().code())?;
        writeln!(self.writer, "{}: {}", GROUP_LABEL, group.label())?;
        let color = group.color();
        writeln!(
            self.writer,
            "{}: {} {} {}",
            GROUP_COLOR, color.x, color.y, color.z
        )?;

        writeln!(
            self.writer,
            "{}: {}",
            GROUP_NUM_POINTS,
            group.point_indices().len()
        )?;
        if !group.point_indices().is_empty() {
            for (i, index) in group.point_indices().iter().enumerate() {
                if i > 0 {
                    write!(self.writer, " ")?;
                }
                write!(self.writer, "{}", index)?;
            }
            writeln!(self.writer)?;
        }

        writeln!(self.writer, "{}: {}", NUM_CHILDREN, group.children().len())?;
        for &child in group.children() {
            self.write_group(point_set, child)?;
        }
        Ok(())
    }
}

impl<W: Write> PointSetWriter for VgWriter<W> {
    fn write_point_set(&mut self, point_set: &PointSet) -> Result<()> {
        writeln!(self.writer, "{}: {}", NUM_POINTS, point_set.num_points())?;
        for position in point_set.positions() {
            writeln!(
                self.writer,
                "{} {} {}",
                position.x, position.y, position.z
            )?;
        }

        self.write_channel_section(NUM_COLORS, point_set.colors())?;
        self.write_channel_section(NUM_NORMALS, point_set.normals())?;

        writeln!(self.writer, "{}: {}", NUM_GROUPS, point_set.root_groups().len())?;
        for &root in point_set.root_groups() {
            self.write_group(point_set, root)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}
