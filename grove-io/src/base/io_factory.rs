use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{bail, Result};
use grove_core::model::PointSet;

use crate::{
    ply::PlyWriter,
    vg::{BvgReader, BvgWriter, VgReader, VgWriter},
};

use super::{PointSetReader, PointSetWriter};

/// The file formats understood by this crate. VG and BVG support both directions,
/// PLY is export-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Vg,
    Bvg,
    Ply,
}

impl FileFormat {
    /// Maps a file extension (without the dot) to its format. Matching ignores
    /// case, so `VG`, `Vg` and `vg` are equivalent.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "vg" => Some(FileFormat::Vg),
            "bvg" => Some(FileFormat::Bvg),
            "ply" => Some(FileFormat::Ply),
            _ => None,
        }
    }

    /// `true` for formats with a read path
    pub fn is_readable(self) -> bool {
        !matches!(self, FileFormat::Ply)
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FileFormat::Vg => write!(f, "VG"),
            FileFormat::Bvg => write!(f, "BVG"),
            FileFormat::Ply => write!(f, "PLY"),
        }
    }
}

/// Returns the format of the file at `path`, judging by its extension alone.
/// Paths without an extension, with a non-Unicode extension, or with an unknown
/// extension all yield `None`.
pub fn format_from_path(path: &Path) -> Option<FileFormat> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(FileFormat::from_extension)
}

/// Checks whether the file at `path` can be read with a [`GenericPointSetReader`]
pub fn is_supported_file<P: AsRef<Path>>(path: P) -> bool {
    format_from_path(path.as_ref()).map_or(false, FileFormat::is_readable)
}

/// A [`PointSetReader`] over all readable formats, selected by file extension
pub enum GenericPointSetReader {
    Vg(VgReader<BufReader<File>>),
    Bvg(BvgReader<BufReader<File>>),
}

impl GenericPointSetReader {
    /// Opens the point set file at `path` with the reader matching its extension
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match format_from_path(path.as_ref()) {
            Some(FileFormat::Vg) => Ok(GenericPointSetReader::Vg(VgReader::from_path(path)?)),
            Some(FileFormat::Bvg) => Ok(GenericPointSetReader::Bvg(BvgReader::from_path(path)?)),
            Some(FileFormat::Ply) => bail!(
                "the PLY export of {} cannot be read back",
                path.as_ref().display()
            ),
            None => bail!(
                "unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }

    /// The format this reader decodes
    pub fn format(&self) -> FileFormat {
        match self {
            GenericPointSetReader::Vg(_) => FileFormat::Vg,
            GenericPointSetReader::Bvg(_) => FileFormat::Bvg,
        }
    }
}

impl PointSetReader for GenericPointSetReader {
    fn read_point_set(&mut self) -> Result<PointSet> {
        match self {
            GenericPointSetReader::Vg(reader) => reader.read_point_set(),
            GenericPointSetReader::Bvg(reader) => reader.read_point_set(),
        }
    }
}

/// A [`PointSetWriter`] over all writable formats, selected by file extension
pub enum GenericPointSetWriter {
    Vg(VgWriter<BufWriter<File>>),
    Bvg(BvgWriter<BufWriter<File>>),
    Ply(PlyWriter<BufWriter<File>>),
}

impl GenericPointSetWriter {
    /// Creates the file at `path` and the writer matching its extension
    pub fn create_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match format_from_path(path.as_ref()) {
            Some(FileFormat::Vg) => Ok(GenericPointSetWriter::Vg(VgWriter::from_path(path)?)),
            Some(FileFormat::Bvg) => Ok(GenericPointSetWriter::Bvg(BvgWriter::from_path(path)?)),
            Some(FileFormat::Ply) => Ok(GenericPointSetWriter::Ply(PlyWriter::from_path(path)?)),
            None => bail!(
                "unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }

    /// The format this writer encodes
    pub fn format(&self) -> FileFormat {
        match self {
            GenericPointSetWriter::Vg(_) => FileFormat::Vg,
            GenericPointSetWriter::Bvg(_) => FileFormat::Bvg,
            GenericPointSetWriter::Ply(_) => FileFormat::Ply,
        }
    }
}

impl PointSetWriter for GenericPointSetWriter {
    fn write_point_set(&mut self, point_set: &PointSet) -> Result<()> {
        match self {
            GenericPointSetWriter::Vg(writer) => writer.write_point_set(point_set),
            GenericPointSetWriter::Bvg(writer) => writer.write_point_set(point_set),
            GenericPointSetWriter::Ply(writer) => writer.write_point_set(point_set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup_ignores_case() {
        for name in &["cloud.vg", "cloud.VG", "cloud.Vg", "cloud.vG"] {
            assert_eq!(
                Some(FileFormat::Vg),
                format_from_path(Path::new(name)),
                "extension of {} not recognized",
                name
            );
        }
        assert_eq!(
            Some(FileFormat::Bvg),
            format_from_path(Path::new("scan.BVG"))
        );
        assert_eq!(
            Some(FileFormat::Ply),
            format_from_path(Path::new("export.Ply"))
        );
    }

    #[test]
    fn test_extension_lookup_rejects_unknown() {
        assert_eq!(None, format_from_path(Path::new("mesh.obj")));
        assert_eq!(None, format_from_path(Path::new("no_extension")));
        assert_eq!(None, format_from_path(Path::new(".vg")));
    }

    #[test]
    fn test_is_supported_file() {
        assert!(is_supported_file("cloud.vg"));
        assert!(is_supported_file("cloud.bvg"));
        // PLY has no read path
        assert!(!is_supported_file("cloud.ply"));
        assert!(!is_supported_file("cloud.las"));
    }
}
