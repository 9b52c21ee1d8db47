use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use grove_core::{
    model::{GroupHandle, PointSet, PrimitiveType, VertexGroup},
    nalgebra::Vector3,
};

use crate::base::PointSetReader;

use super::{
    BVG_MAGIC, CHANNEL_RECORD_SIZE, INDEX_SIZE, MAX_GROUP_NESTING, MIN_GROUP_RECORD_SIZE,
    POSITION_RECORD_SIZE,
};

/// `PointSetReader` implementation for the binary BVG format.
///
/// See the [module documentation](crate::vg) for the framing. Every declared
/// element count is checked against the remaining stream length before the
/// matching buffer is allocated, so a truncated stream is rejected up front
/// instead of read past its end.
pub struct BvgReader<R: Read + Seek> {
    reader: R,
    stream_len: u64,
}

impl BvgReader<BufReader<File>> {
    /// Opens the BVG file at `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Self::from_read(file)
    }
}

impl<R: Read + Seek> BvgReader<R> {
    /// Verifies the format marker and measures the stream. The stream is left
    /// positioned after the marker.
    pub fn from_read(mut read: R) -> Result<Self> {
        let start = read.stream_position()?;
        let stream_len = read.seek(SeekFrom::End(0))?;
        read.seek(SeekFrom::Start(start))?;

        let mut magic = [0u8; 4];
        read.read_exact(&mut magic)
            .context("stream is too short to contain the BVG format marker")?;
        if magic != BVG_MAGIC {
            bail!("stream does not start with the BVG format marker");
        }

        Ok(Self {
            reader: read,
            stream_len,
        })
    }

    fn remaining(&mut self) -> Result<u64> {
        Ok(self.stream_len.saturating_sub(self.reader.stream_position()?))
    }

    /// Reads an element count and validates the declared payload against the
    /// remaining stream length before anything is allocated
    fn checked_count(&mut self, what: &str, element_size: u64) -> Result<usize> {
        let count = self
            .reader
            .read_u32::<LittleEndian>()
            .with_context(|| format!("truncated BVG stream in the {} count", what))?
            as u64;
        let remaining = self.remaining()?;
        let payload = count
            .checked_mul(element_size)
            .filter(|payload| *payload <= remaining);
        if payload.is_none() {
            bail!(
                "truncated BVG stream: {} {} entries declared but only {} bytes remain",
                count,
                what,
                remaining
            );
        }
        Ok(count as usize)
    }

    fn read_vector3_f64(&mut self) -> Result<Vector3<f64>> {
        let x = self.reader.read_f64::<LittleEndian>()?;
        let y = self.reader.read_f64::<LittleEndian>()?;
        let z = self.reader.read_f64::<LittleEndian>()?;
        Ok(Vector3::new(x, y, z))
    }

    fn read_vector3_f32(&mut self) -> Result<Vector3<f32>> {
        let x = self.reader.read_f32::<LittleEndian>()?;
        let y = self.reader.read_f32::<LittleEndian>()?;
        let z = self.reader.read_f32::<LittleEndian>()?;
        Ok(Vector3::new(x, y, z))
    }

    /// Reads a parallel color or normal section. A count of zero stands for an
    /// absent section.
    fn read_channel_section(
        &mut self,
        num_points: usize,
        what: &str,
    ) -> Result<Option<Vec<Vector3<f32>>>> {
        let count = self.checked_count(what, CHANNEL_RECORD_SIZE)?;
        if count == 0 {
            return Ok(None);
        }
        if count != num_points {
            bail!(
                "BVG stream declares {} {} entries for {} points",
                count,
                what,
                num_points
            );
        }
        let mut channels = Vec::with_capacity(count);
        for _ in 0..count {
            channels.push(
                self.read_vector3_f32()
                    .with_context(|| format!("truncated {} section", what))?,
            );
        }
        Ok(Some(channels))
    }

    /// Reads one group record and its children, appending them to `point_set`
    fn read_group(
        &mut self,
        point_set: &mut PointSet,
        parent: Option<GroupHandle>,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_GROUP_NESTING {
            bail!("group nesting deeper than {} levels", MAX_GROUP_NESTING);
        }

        let type_code = self
            .reader
            .read_u32::<LittleEndian>()
            .context("truncated BVG group record")?;

        let label_len = self.checked_count("label byte", 1)?;
        let mut label_bytes = vec![0u8; label_len];
        self.reader
            .read_exact(&mut label_bytes)
            .context("truncated BVG group label")?;
        let label = String::from_utf8(label_bytes).context("BVG group label is not valid UTF-8")?;

        let color = self
            .read_vector3_f32()
            .context("truncated BVG group color")?;

        let num_indices = self.checked_count("point index", INDEX_SIZE)?;
        let mut point_indices = Vec::with_capacity(num_indices);
        for _ in 0..num_indices {
            let index = self.reader.read_u32::<LittleEndian>()?;
            if index as usize >= point_set.num_points() {
                bail!(
                    "group '{}' references point {} but the set has only {} points",
                    label,
                    index,
                    point_set.num_points()
                );
            }
            point_indices.push(index);
        }

        let group = VertexGroup::new(
            label,
            PrimitiveType::from_code(type_code),
            color,
            point_indices,
        );
        let handle = match parent {
            Some(parent) => point_set.add_child_group(parent, group)?,
            None => point_set.add_group(group),
        };

        let num_children = self.checked_count("child group", MIN_GROUP_RECORD_SIZE)?;
        for _ in 0..num_children {
            self.read_group(point_set, Some(handle), depth + 1)?;
        }
        Ok(())
    }
}

impl<R: Read + Seek> PointSetReader for BvgReader<R> {
    fn read_point_set(&mut self) -> Result<PointSet> {
        let num_points = self.checked_count("position", POSITION_RECORD_SIZE)?;
        let mut positions = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            positions.push(
                self.read_vector3_f64()
                    .context("truncated positions section")?,
            );
        }
        let mut point_set = PointSet::from_positions(positions);

        if let Some(colors) = self.read_channel_section(point_set.num_points(), "color")? {
            point_set.set_colors(colors)?;
        }
        if let Some(normals) = self.read_channel_section(point_set.num_points(), "normal")? {
            point_set.set_normals(normals)?;
        }

        let num_groups = self.checked_count("group", MIN_GROUP_RECORD_SIZE)?;
        for _ in 0..num_groups {
            self.read_group(&mut point_set, None, 0)?;
        }
        Ok(point_set)
    }
}
