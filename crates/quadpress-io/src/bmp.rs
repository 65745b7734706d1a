//! BMP image format support
//!
//! Reads uncompressed (BI_RGB) 1/4/8-bit palette and 24/32-bit truecolor
//! bitmaps, top-down or bottom-up. Writes bottom-up 24-bit truecolor.

use crate::{IoError, IoResult};
use quadpress_core::{CHANNELS, Raster, RasterMut};
use std::io::{self, Read, Write};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

/// Bits per pixel written by [`write_bmp`]
const BMP_WRITE_BPP: usize = 24;

/// Largest decoded raster accepted, in bytes
const MAX_RASTER_BYTES: usize = 1 << 30;

#[inline]
fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Row stride in bytes (BMP rows are 4-byte aligned)
#[inline]
fn row_stride(width: u32, bits_per_pixel: usize) -> usize {
    (width as usize * bits_per_pixel).div_ceil(32) * 4
}

fn skip<R: Read>(reader: &mut R, count: usize) -> IoResult<()> {
    let skipped = io::copy(&mut reader.by_ref().take(count as u64), &mut io::sink())?;
    if skipped < count as u64 {
        return Err(IoError::InvalidData(format!(
            "BMP truncated: expected {} more header bytes, found {}",
            count, skipped
        )));
    }
    Ok(())
}

/// Decoded size of a `width` x `height` raster, rejecting absurd headers
fn checked_raster_bytes(width: u32, height: u32) -> IoResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .filter(|&n| n <= MAX_RASTER_BYTES)
        .ok_or_else(|| {
            IoError::InvalidData(format!("BMP dimensions {}x{} too large", width, height))
        })
}

/// Read a BMP image
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<Raster> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;
    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let pixel_offset = le_u32(&file_header, 10) as usize;

    let mut info_header = [0u8; BMP_INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info_header)?;

    let header_size = le_u32(&info_header, 0);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {}",
            header_size
        )));
    }

    let width = le_u32(&info_header, 4) as i32;
    let height = le_u32(&info_header, 8) as i32;
    let planes = le_u16(&info_header, 12);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {}",
            planes
        )));
    }
    let bits_per_pixel = le_u16(&info_header, 14) as usize;
    let compression = le_u32(&info_header, 16);
    let colors_used = le_u32(&info_header, 32) as usize;

    // BI_RGB only
    if compression != 0 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {}",
            compression
        )));
    }
    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24 | 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP bit depth: {}",
            bits_per_pixel
        )));
    }

    let top_down = height < 0;
    let width = width.unsigned_abs();
    let height = height.unsigned_abs();
    checked_raster_bytes(width, height)?;

    skip(&mut reader, header_size as usize - BMP_INFO_HEADER_SIZE as usize)?;
    let mut consumed = BMP_FILE_HEADER_SIZE + header_size as usize;

    let palette: Vec<[u8; 3]> = if bits_per_pixel <= 8 {
        let max_colors = 1usize << bits_per_pixel;
        let num_colors = match colors_used {
            0 => max_colors,
            n if n <= max_colors => n,
            n => {
                return Err(IoError::InvalidData(format!(
                    "BMP palette of {} colors exceeds {} for {}-bit pixels",
                    n, max_colors, bits_per_pixel
                )));
            }
        };
        let mut raw = vec![0u8; num_colors * 4];
        reader.read_exact(&mut raw)?;
        consumed += raw.len();
        raw.chunks_exact(4).map(|q| [q[2], q[1], q[0]]).collect()
    } else {
        Vec::new()
    };

    if pixel_offset > consumed {
        skip(&mut reader, pixel_offset - consumed)?;
    }

    let mut raster = RasterMut::new(width, height)?;
    let mut row_buffer = vec![0u8; row_stride(width, bits_per_pixel)];
    let lookup = |index: usize| -> IoResult<[u8; 3]> {
        palette.get(index).copied().ok_or_else(|| {
            IoError::InvalidData(format!("palette index {} out of range", index))
        })
    };

    for row in 0..height {
        reader.read_exact(&mut row_buffer)?;
        let y = if top_down { row } else { height - 1 - row };

        for x in 0..width {
            let xi = x as usize;
            let rgb = match bits_per_pixel {
                1 => lookup(((row_buffer[xi / 8] >> (7 - xi % 8)) & 1) as usize)?,
                4 => {
                    let byte = row_buffer[xi / 2];
                    let index = if xi % 2 == 0 { byte >> 4 } else { byte & 0xF };
                    lookup(index as usize)?
                }
                8 => lookup(row_buffer[xi] as usize)?,
                _ => {
                    let step = bits_per_pixel / 8;
                    let i = xi * step;
                    [row_buffer[i + 2], row_buffer[i + 1], row_buffer[i]]
                }
            };
            raster.set_rgb(x, y, rgb);
        }
    }

    Ok(raster.into())
}

/// Write a BMP image
pub fn write_bmp<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    let (width, height) = raster.dimensions();
    let stride = row_stride(width, BMP_WRITE_BPP);
    let pixel_data_size = stride * height as usize;
    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    let file_size = pixel_offset + pixel_data_size;

    let file_size = u32::try_from(file_size)
        .map_err(|_| IoError::EncodeError(format!("BMP too large: {} bytes", file_size)))?;

    // File header
    writer.write_all(b"BM")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(&[0u8; 4])?; // Reserved
    writer.write_all(&(pixel_offset as u32).to_le_bytes())?;

    // Info header
    writer.write_all(&BMP_INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?; // Bottom-up
    writer.write_all(&1u16.to_le_bytes())?; // Planes
    writer.write_all(&(BMP_WRITE_BPP as u16).to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // Compression
    writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?; // X pixels per meter
    writer.write_all(&0i32.to_le_bytes())?; // Y pixels per meter
    writer.write_all(&0u32.to_le_bytes())?; // Colors used
    writer.write_all(&0u32.to_le_bytes())?; // Important colors

    let mut row_buffer = vec![0u8; stride];
    for row in 0..height {
        let y = height - 1 - row;
        for (dst, src) in row_buffer
            .chunks_exact_mut(CHANNELS)
            .zip(raster.row(y).chunks_exact(CHANNELS))
        {
            dst.copy_from_slice(&[src[2], src[1], src[0]]);
        }
        writer.write_all(&row_buffer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn gradient(width: u32, height: u32) -> Raster {
        let mut raster = RasterMut::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                raster.set_rgb(x, y, [(x * 20) as u8, (y * 20) as u8, ((x + y) * 7) as u8]);
            }
        }
        raster.into()
    }

    #[test]
    fn test_bmp_roundtrip_odd_width() {
        // 5 * 3 = 15 bytes per row, padded to 16
        let raster = gradient(5, 4);

        let mut buffer = Vec::new();
        write_bmp(&raster, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 14 + 40 + 16 * 4);

        let raster2 = read_bmp(Cursor::new(buffer)).unwrap();
        assert_eq!(raster2, raster);
    }

    /// Fields of a hand-built BMP header
    struct Header {
        header_size: u32,
        width: i32,
        height: i32,
        bpp: u16,
        compression: u32,
        colors_used: u32,
    }

    impl Default for Header {
        fn default() -> Self {
            Header {
                header_size: 40,
                width: 2,
                height: 1,
                bpp: 8,
                compression: 0,
                colors_used: 2,
            }
        }
    }

    /// Serialize `header` followed by `payload` (palette and pixels)
    fn build_bmp(header: &Header, payload: &[u8]) -> Vec<u8> {
        let offset = header.header_size.wrapping_add(14);
        let mut data = Vec::new();
        data.extend_from_slice(b"BM");
        data.extend_from_slice(&offset.wrapping_add(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&header.header_size.to_le_bytes());
        data.extend_from_slice(&header.width.to_le_bytes());
        data.extend_from_slice(&header.height.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&header.bpp.to_le_bytes());
        data.extend_from_slice(&header.compression.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&header.colors_used.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_bmp_read_8bit_palette() {
        // BGRA palette: index 0 = blue, index 1 = red; then one padded row
        let payload = [255, 0, 0, 0, 0, 0, 255, 0, 1, 0, 0, 0];
        let raster = read_bmp(Cursor::new(build_bmp(&Header::default(), &payload))).unwrap();
        assert_eq!(raster.get_rgb(0, 0), Some([255, 0, 0]));
        assert_eq!(raster.get_rgb(1, 0), Some([0, 0, 255]));
    }

    #[test]
    fn test_bmp_rejects_oversized_palette() {
        let header = Header {
            colors_used: u32::MAX,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[0u8; 16]))).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)), "{err}");

        let header = Header {
            colors_used: 257,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[0u8; 16]))).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)), "{err}");
    }

    #[test]
    fn test_bmp_rejects_huge_dimensions() {
        let header = Header {
            width: 0x7fff_ffff,
            height: 0x7fff_ffff,
            bpp: 24,
            colors_used: 0,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[0u8; 16]))).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)), "{err}");

        let header = Header {
            width: 40_000,
            height: -40_000,
            bpp: 24,
            colors_used: 0,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[]))).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)), "{err}");
    }

    #[test]
    fn test_bmp_rejects_truncated_extended_header() {
        let header = Header {
            header_size: 0xffff_fff0,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[0u8; 12]))).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)), "{err}");
    }

    #[test]
    fn test_bmp_skips_extended_header() {
        // BITMAPV4HEADER-sized header: 68 bytes past the basic 40
        let header = Header {
            header_size: 108,
            bpp: 24,
            colors_used: 0,
            ..Header::default()
        };
        let mut payload = vec![0u8; 68];
        payload.extend_from_slice(&[10, 20, 30, 40, 50, 60, 0, 0]);
        let raster = read_bmp(Cursor::new(build_bmp(&header, &payload))).unwrap();
        assert_eq!(raster.get_rgb(0, 0), Some([30, 20, 10]));
        assert_eq!(raster.get_rgb(1, 0), Some([60, 50, 40]));
    }

    #[test]
    fn test_bmp_rejects_bitfields() {
        let header = Header {
            bpp: 32,
            compression: 3,
            colors_used: 0,
            ..Header::default()
        };
        let err = read_bmp(Cursor::new(build_bmp(&header, &[0u8; 20]))).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)), "{err}");
    }

    #[test]
    fn test_bmp_rejects_non_bmp() {
        let err = read_bmp(Cursor::new(vec![0u8; 64])).unwrap_err();
        assert!(matches!(err, IoError::InvalidData(_)));
    }
}
