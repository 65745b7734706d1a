//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`. Grayscale and CMYK sources are converted to RGB.

use crate::{IoError, IoResult};
use jpeg_decoder::PixelFormat;
use quadpress_core::Raster;
use std::io::{Read, Write};

/// Quality used for every JPEG write.
pub const JPEG_QUALITY: u8 = 90;

/// Read a JPEG image from a reader.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Raster> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing".to_string()))?;

    let rgb = match info.pixel_format {
        PixelFormat::RGB24 => pixels,
        PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        // 16-bit luma arrives big-endian; keep the high byte
        PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0]])
            .collect(),
        PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|c| {
                let k = 255 - c[3] as u32;
                let channel = |v: u8| ((255 - v as u32) * k / 255) as u8;
                [channel(c[0]), channel(c[1]), channel(c[2])]
            })
            .collect(),
        #[allow(unreachable_patterns)]
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    Ok(Raster::from_rgb_bytes(
        info.width as u32,
        info.height as u32,
        rgb,
    )?)
}

/// Write a JPEG image at [`JPEG_QUALITY`].
pub fn write_jpeg<W: Write>(raster: &Raster, writer: W) -> IoResult<()> {
    let (width, height) = raster.dimensions();
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(IoError::EncodeError(format!(
            "JPEG dimensions limited to 65535, got {}x{}",
            width, height
        )));
    };

    let encoder = jpeg_encoder::Encoder::new(writer, JPEG_QUALITY);
    encoder
        .encode(raster.data(), w, h, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadpress_core::RasterMut;
    use std::io::Cursor;

    #[test]
    fn test_jpeg_roundtrip_solid_color() {
        let mut raster = RasterMut::new(16, 16).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                raster.set_rgb(x, y, [200, 40, 90]);
            }
        }
        let raster: Raster = raster.into();

        let mut buffer = Vec::new();
        write_jpeg(&raster, &mut buffer).unwrap();
        assert_eq!(&buffer[..3], &[0xFF, 0xD8, 0xFF]);

        let raster2 = read_jpeg(Cursor::new(buffer)).unwrap();
        assert_eq!(raster2.dimensions(), (16, 16));
        let [r, g, b] = raster2.get_rgb(8, 8).unwrap();
        assert!((r as i32 - 200).abs() <= 4);
        assert!((g as i32 - 40).abs() <= 4);
        assert!((b as i32 - 90).abs() <= 4);
    }

    #[test]
    fn test_jpeg_read_garbage_fails() {
        assert!(read_jpeg(Cursor::new(vec![0xFF, 0xD8, 0x00, 0x00])).is_err());
    }
}
