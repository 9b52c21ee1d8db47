use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    time::Instant,
};

use grove_core::model::PointSet;
use log::info;

use crate::{
    error::PointSetIoError,
    ply::PlyWriter,
    vg::{BvgReader, BvgWriter, VgReader, VgWriter},
};

mod reader;
pub use self::reader::*;

mod writer;
pub use self::writer::*;

mod io_factory;
pub use self::io_factory::*;

/// Reads the complete point set stored at `path`, selecting the codec from the
/// file extension.
///
/// Fails with [`PointSetIoError::Io`] if the path cannot be opened, with
/// [`PointSetIoError::UnsupportedFormat`] if the extension names no readable
/// format (PLY is export-only), with [`PointSetIoError::CorruptFormat`] if the
/// codec rejects the contents, and with [`PointSetIoError::EmptyData`] if the
/// file parses but holds no points. A returned point set always has at least one
/// point.
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet, PointSetIoError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PointSetIoError::Io {
        path: path.to_path_buf(),
        source: source.into(),
    })?;

    let mut reader = match format_from_path(path) {
        Some(FileFormat::Vg) => GenericPointSetReader::Vg(VgReader::from_read(BufReader::new(file))),
        Some(FileFormat::Bvg) => {
            let reader = BufReader::new(file);
            GenericPointSetReader::Bvg(BvgReader::from_read(reader).map_err(|source| {
                PointSetIoError::CorruptFormat {
                    path: path.to_path_buf(),
                    format: FileFormat::Bvg,
                    source: source.into(),
                }
            })?)
        }
        Some(FileFormat::Ply) | None => {
            return Err(PointSetIoError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };
    let format = reader.format();

    info!("reading {} point set from {}", format, path.display());
    let timer = Instant::now();

    let point_set = reader
        .read_point_set()
        .map_err(|source| PointSetIoError::CorruptFormat {
            path: path.to_path_buf(),
            format,
            source: source.into(),
        })?;
    if point_set.is_empty() {
        return Err(PointSetIoError::EmptyData {
            path: path.to_path_buf(),
        });
    }

    info!(
        "read {} points in {} groups in {:.3} sec",
        point_set.num_points(),
        point_set.num_groups(),
        timer.elapsed().as_secs_f64()
    );
    Ok(point_set)
}

/// Saves `point_set` to `path` in the format matching the file extension.
///
/// Only the VG/BVG pair can represent the full group forest, so any other
/// extension (PLY included) fails with [`PointSetIoError::UnsupportedFormat`];
/// use [`save_point_set_as_ply`] for the flattened PLY export. An encode failure
/// is reported as [`PointSetIoError::Io`] and leaves the destination file in an
/// undefined, possibly truncated state.
pub fn save_point_set<P: AsRef<Path>>(
    path: P,
    point_set: &PointSet,
) -> Result<(), PointSetIoError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PointSetIoError::Io {
        path: path.to_path_buf(),
        source: source.into(),
    })?;

    let mut writer = match format_from_path(path) {
        Some(FileFormat::Vg) => GenericPointSetWriter::Vg(VgWriter::from_write(BufWriter::new(file))),
        Some(FileFormat::Bvg) => {
            GenericPointSetWriter::Bvg(BvgWriter::from_write(BufWriter::new(file)))
        }
        Some(FileFormat::Ply) | None => {
            return Err(PointSetIoError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    info!("saving {} point set to {}", writer.format(), path.display());
    let timer = Instant::now();

    writer
        .write_point_set(point_set)
        .map_err(|source| PointSetIoError::Io {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    info!(
        "saved {} points in {:.3} sec",
        point_set.num_points(),
        timer.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Exports `point_set` to `path` as group-colored ASCII PLY, regardless of the
/// path's extension. Same open and failure behavior as [`save_point_set`].
pub fn save_point_set_as_ply<P: AsRef<Path>>(
    path: P,
    point_set: &PointSet,
) -> Result<(), PointSetIoError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PointSetIoError::Io {
        path: path.to_path_buf(),
        source: source.into(),
    })?;

    info!("exporting point set to {} as PLY", path.display());
    let timer = Instant::now();

    let mut writer = PlyWriter::from_write(BufWriter::new(file));
    writer
        .write_point_set(point_set)
        .map_err(|source| PointSetIoError::Io {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

    info!("exported in {:.3} sec", timer.elapsed().as_secs_f64());
    Ok(())
}
