use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};
use grove_core::{
    model::{GroupHandle, PointSet, PrimitiveType, VertexGroup},
    nalgebra::{Scalar, Vector3},
};

use crate::base::PointSetReader;

use super::{
    GROUP_COLOR, GROUP_LABEL, GROUP_NUM_POINTS, GROUP_TYPE, MAX_GROUP_NESTING, NUM_CHILDREN,
    NUM_COLORS, NUM_GROUPS, NUM_NORMALS, NUM_POINTS,
};

/// `PointSetReader` implementation for the text VG format.
///
/// See the [module documentation](crate::vg) for the grammar. The reader is
/// keyword-driven: after the mandatory points section the remaining sections may
/// appear in any order, each at most once.
pub struct VgReader<R: BufRead> {
    reader: R,
    line_number: usize,
}

impl VgReader<BufReader<File>> {
    /// Opens the VG file at `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Ok(Self::from_read(file))
    }
}

impl<R: BufRead> VgReader<R> {
    pub fn from_read(read: R) -> Self {
        Self {
            reader: read,
            line_number: 0,
        }
    }

    /// Next non-blank line, trimmed, or `None` at end of input
    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    fn require_line(&mut self) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| anyhow!("unexpected end of input after line {}", self.line_number))
    }

    /// Reads the next line and checks that it is a `key: value` entry with the
    /// expected key. Returns the value part.
    fn keyed_value(&mut self, expected_key: &str) -> Result<String> {
        let line = self.require_line()?;
        let (key, value) =
            split_keyed_line(&line).with_context(|| format!("in line {}", self.line_number))?;
        if key != expected_key {
            bail!(
                "expected '{}' in line {}, found '{}'",
                expected_key,
                self.line_number,
                key
            );
        }
        Ok(value.to_string())
    }

    fn keyed_count(&mut self, expected_key: &str) -> Result<usize> {
        let value = self.keyed_value(expected_key)?;
        parse_token(&value)
            .with_context(|| format!("invalid {} count in line {}", expected_key, self.line_number))
    }

    /// Reads a parallel color or normal section of `count` entries. A count of
    /// zero stands for an absent section.
    fn read_channel_section(
        &mut self,
        count: usize,
        num_points: usize,
        what: &str,
    ) -> Result<Option<Vec<Vector3<f32>>>> {
        if count == 0 {
            return Ok(None);
        }
        if count != num_points {
            bail!(
                "{} section declares {} entries for {} points",
                what,
                count,
                num_points
            );
        }
        let mut channels = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self
                .require_line()
                .with_context(|| format!("truncated {} section", what))?;
            channels.push(
                parse_vector3::<f32>(&line)
                    .with_context(|| format!("invalid {} in line {}", what, self.line_number))?,
            );
        }
        Ok(Some(channels))
    }

    /// Reads one group block and its children, appending them to `point_set`
    fn read_group(
        &mut self,
        point_set: &mut PointSet,
        parent: Option<GroupHandle>,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_GROUP_NESTING {
            bail!("group nesting deeper than {} levels", MAX_GROUP_NESTING);
        }

        let type_code: u32 = parse_token(&self.keyed_value(GROUP_TYPE)?)
            .with_context(|| format!("invalid group type in line {}", self.line_number))?;
        let label = self.keyed_value(GROUP_LABEL)?;
        let color = parse_vector3::<f32>(&self.keyed_value(GROUP_COLOR)?)
            .with_context(|| format!("invalid group color in line {}", self.line_number))?;

        // the count is untrusted input, so the buffer grows as tokens arrive
        // instead of reserving for the declared size up front
        let num_indices = self.keyed_count(GROUP_NUM_POINTS)?;
        let mut point_indices = Vec::new();
        if num_indices > 0 {
            let line = self
                .require_line()
                .with_context(|| format!("truncated point index list of group '{}'", label))?;
            for token in line.split_whitespace() {
                let index: u32 = parse_token(token).with_context(|| {
                    format!("invalid point index in line {}", self.line_number)
                })?;
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
            if point_indices.len() != num_indices {
                bail!(
                    "group '{}' declares {} point indices but lists {}",
                    label,
                    num_indices,
                    point_indices.len()
                );
            }
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

        let num_children = self.keyed_count(NUM_CHILDREN)?;
        for _ in 0..num_children {
            self.read_group(point_set, Some(handle), depth + 1)?;
        }
        Ok(())
    }
}

impl<R: BufRead> PointSetReader for VgReader<R> {
    fn read_point_set(&mut self) -> Result<PointSet> {
        let num_points = self
            .keyed_count(NUM_POINTS)
            .context("VG input must start with the points section")?;
        // the count is untrusted input, so the buffer grows line by line
        // instead of reserving for the declared size up front
        let mut positions = Vec::new();
        for _ in 0..num_points {
            let line = self.require_line().context("truncated points section")?;
            positions.push(
                parse_vector3::<f64>(&line)
                    .with_context(|| format!("invalid point in line {}", self.line_number))?,
            );
        }
        let mut point_set = PointSet::from_positions(positions);

        let mut seen_colors = false;
        let mut seen_normals = false;
        let mut seen_groups = false;
        while let Some(line) = self.next_line()? {
            let (key, value) =
                split_keyed_line(&line).with_context(|| format!("in line {}", self.line_number))?;
            match key {
                NUM_COLORS => {
                    if seen_colors {
                        bail!("duplicate {} section in line {}", NUM_COLORS, self.line_number);
                    }
                    seen_colors = true;
                    let count = parse_token(value)?;
                    if let Some(colors) = self.read_channel_section(count, num_points, "color")? {
                        point_set.set_colors(colors)?;
                    }
                }
                NUM_NORMALS => {
                    if seen_normals {
                        bail!("duplicate {} section in line {}", NUM_NORMALS, self.line_number);
                    }
                    seen_normals = true;
                    let count = parse_token(value)?;
                    if let Some(normals) = self.read_channel_section(count, num_points, "normal")? {
                        point_set.set_normals(normals)?;
                    }
                }
                NUM_GROUPS => {
                    if seen_groups {
                        bail!("duplicate {} section in line {}", NUM_GROUPS, self.line_number);
                    }
                    seen_groups = true;
                    let count: usize = parse_token(value)?;
                    for _ in 0..count {
                        self.read_group(&mut point_set, None, 0)?;
                    }
                }
                other => bail!("unknown section '{}' in line {}", other, self.line_number),
            }
        }
        Ok(point_set)
    }
}

fn split_keyed_line(line: &str) -> Result<(&str, &str)> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| anyhow!("expected a 'key: value' entry, found '{}'", line))?;
    Ok((key.trim(), value.trim()))
}

fn parse_token<T: FromStr>(token: &str) -> Result<T> {
    token.parse::<T>().map_err(|_| {
        anyhow!(
            "expected {} value, found '{}'",
            std::any::type_name::<T>(),
            token
        )
    })
}

fn parse_vector3<T: Scalar + FromStr>(line: &str) -> Result<Vector3<T>> {
    let mut tokens = line.split_whitespace();
    let mut component = |axis: &str| -> Result<T> {
        let token = tokens
            .next()
            .ok_or_else(|| anyhow!("missing {} component in '{}'", axis, line))?;
        parse_token(token)
    };
    let x = component("x")?;
    let y = component("y")?;
    let z = component("z")?;
    if tokens.next().is_some() {
        bail!("expected 3 components, found more in '{}'", line);
    }
    Ok(Vector3::new(x, y, z))
}

// VG text tests
//  - Reading
//      - canonical section order
//      - sections in swapped order, absent optional sections
//      - nested groups with parent/child links
//  - Errors
//      - missing points section
//      - color count mismatch
//      - out-of-range group index
//      - malformed numeric token
//      - truncated input
//      - duplicate section
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_str(input: &str) -> Result<PointSet> {
        VgReader::from_read(Cursor::new(input.as_bytes())).read_point_set()
    }

    #[test]
    fn test_read_canonical_order() -> Result<()> {
        let input = "\
num_points: 3
0.5 1.25 -3.75
1 2 3
4 5 6
num_colors: 3
1 0 0
0 1 0
0 0 1
num_normals: 3
0 0 1
0 0 1
0 0 1
num_groups: 1
group_type: 0
group_label: roof
group_color: 0.8 0.1 0.1
group_num_points: 2
0 2
num_children: 0
";
        let point_set = read_str(input)?;
        assert_eq!(3, point_set.num_points());
        assert_eq!(Vector3::new(0.5, 1.25, -3.75), point_set.positions()[0]);
        assert_eq!(Vector3::new(1.0, 0.0, 0.0), point_set.colors().unwrap()[0]);
        assert_eq!(3, point_set.normals().unwrap().len());

        assert_eq!(1, point_set.num_groups());
        let group = point_set.group(point_set.root_groups()[0]);
        assert_eq!("roof", group.label());
        assert_eq!(PrimitiveType::Plane, group.primitive());
        assert_eq!(&[0, 2], group.point_indices());
        Ok(())
    }

    #[test]
    fn test_read_sections_in_any_order() -> Result<()> {
        let input = "\
num_points: 2
1 2 3
4 5 6
num_normals: 2
0 0 1
0 1 0
num_colors: 2
1 1 1
0 0 0
";
        let point_set = read_str(input)?;
        assert_eq!(2, point_set.colors().unwrap().len());
        assert_eq!(Vector3::new(0.0, 0.0, 1.0), point_set.normals().unwrap()[0]);
        assert_eq!(0, point_set.num_groups());
        Ok(())
    }

    #[test]
    fn test_read_zero_counts_mean_absent() -> Result<()> {
        let input = "\
num_points: 1
1 2 3
num_colors: 0
num_normals: 0
num_groups: 0
";
        let point_set = read_str(input)?;
        assert_eq!(None, point_set.colors());
        assert_eq!(None, point_set.normals());
        assert_eq!(0, point_set.num_groups());
        Ok(())
    }

    #[test]
    fn test_read_nested_groups() -> Result<()> {
        let input = "\
num_points: 4
0 0 0
1 0 0
0 1 0
0 0 1
num_groups: 1
group_type: 1
group_label: column
group_color: 0.2 0.2 0.9
group_num_points: 3
0 1 2
num_children: 1
group_type: 5
group_label: cap
group_color: 0.9 0.9 0.2
group_num_points: 1
3
num_children: 0
";
        let point_set = read_str(input)?;
        assert_eq!(2, point_set.num_groups());
        assert_eq!(1, point_set.root_groups().len());

        let root = point_set.group(point_set.root_groups()[0]);
        assert_eq!(PrimitiveType::Cylinder, root.primitive());
        assert_eq!(1, root.children().len());

        let child = point_set.group(root.children()[0]);
        assert_eq!("cap", child.label());
        assert_eq!(PrimitiveType::Other(5), child.primitive());
        assert_eq!(Some(point_set.root_groups()[0]), child.parent());
        Ok(())
    }

    #[test]
    fn test_error_missing_points_section() {
        let result = read_str("num_colors: 1\n1 0 0\n");
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("points section"));
    }

    #[test]
    fn test_error_color_count_mismatch() {
        let input = "\
num_points: 2
1 2 3
4 5 6
num_colors: 1
1 0 0
";
        let result = read_str(input);
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("declares 1 entries for 2 points"));
    }

    #[test]
    fn test_error_group_index_out_of_range() {
        let input = "\
num_points: 2
1 2 3
4 5 6
num_groups: 1
group_type: 0
group_label: bad
group_color: 1 0 0
group_num_points: 1
7
num_children: 0
";
        let result = read_str(input);
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("references point 7"));
    }

    #[test]
    fn test_error_malformed_number() {
        let result = read_str("num_points: 1\n1 2 banana\n");
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("banana"));
    }

    #[test]
    fn test_error_truncated_points() {
        let result = read_str("num_points: 3\n1 2 3\n");
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("truncated points section"));
    }

    #[test]
    fn test_error_huge_declared_count_is_rejected() {
        // an absurd declared count must surface as a parse error, not abort
        // the process on a giant up-front allocation
        let result = read_str("num_points: 100000000000\n1 2 3\n");
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("truncated points section"));

        let input = "\
num_points: 1
1 2 3
num_groups: 1
group_type: 0
group_label: huge
group_color: 1 0 0
group_num_points: 99999999999
0
num_children: 0
";
        let result = read_str(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_duplicate_section() {
        let input = "\
num_points: 1
1 2 3
num_colors: 0
num_colors: 0
";
        let result = read_str(input);
        assert!(result.is_err());
        assert!(format!("{:?}", result.err().unwrap()).contains("duplicate"));
    }
}
