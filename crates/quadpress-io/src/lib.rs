//! quadpress-io - Raster I/O for quadpress
//!
//! Decodes PNG, JPEG and BMP files into an RGB [`Raster`] and encodes
//! rasters back out. Reads identify the format by magic number; writes
//! either take an explicit [`ImageFormat`] or derive it from the output
//! file extension.
//!
//! # Examples
//!
//! ```
//! use quadpress_core::Raster;
//! use quadpress_io::{ImageFormat, read_image_mem, write_image_mem};
//!
//! let raster = Raster::new(8, 8).unwrap();
//! let bytes = write_image_mem(&raster, ImageFormat::Bmp).unwrap();
//! let back = read_image_mem(&bytes).unwrap();
//! assert_eq!(back, raster);
//! ```

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};

use quadpress_core::Raster;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

/// Read an image from a file path.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be opened, and a decode or
/// unsupported-format error if its contents are not a readable raster.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 8];
    let read = reader.read(&mut header)?;
    let format = detect_format_from_bytes(&header[..read])?;
    reader.rewind()?;

    read_image_format(reader, format)
}

/// Read an image from memory.
pub fn read_image_mem(data: &[u8]) -> IoResult<Raster> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R: std::io::BufRead + Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<Raster> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(reader),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(reader),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write an image to any writer.
pub fn write_image_writer<W: Write>(
    raster: &Raster,
    writer: W,
    format: ImageFormat,
) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(raster, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg(raster, writer),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(raster, writer),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write an image to a file path in the given format.
pub fn write_image<P: AsRef<Path>>(raster: &Raster, path: P, format: ImageFormat) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_image_writer(raster, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Write an image to a file path, choosing the format from its extension.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] before touching the filesystem
/// if the extension is not `png`, `jpg`, `jpeg` or `bmp`.
pub fn write_image_auto<P: AsRef<Path>>(raster: &Raster, path: P) -> IoResult<()> {
    let format = ImageFormat::from_path(path.as_ref())?;
    write_image(raster, path, format)
}

/// Encode an image into memory.
pub fn write_image_mem(raster: &Raster, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_writer(raster, &mut buffer, format)?;
    Ok(buffer)
}
