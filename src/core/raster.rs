use crate::domain::model::{EncodedRaster, ImageFormat};
use crate::utils::error::Result;
use image::{DynamicImage, GrayImage, ImageFormat as CodecFormat, Luma};
use std::io::Cursor;

pub const OCCUPIED_THRESHOLD: u8 = 165;
pub const FREE_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
    Unknown,
}

impl Occupancy {
    pub fn from_intensity(intensity: u8) -> Self {
        if intensity > OCCUPIED_THRESHOLD {
            Occupancy::Occupied
        } else if intensity < FREE_THRESHOLD {
            Occupancy::Free
        } else {
            Occupancy::Unknown
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Occupancy::Free => 0,
            Occupancy::Occupied => 255,
            Occupancy::Unknown => 128,
        }
    }
}

pub fn classify_occupancy(intensity: u8) -> u8 {
    Occupancy::from_intensity(intensity).value()
}

/// Decodes the service image and re-encodes it as `format`, entirely in memory.
pub fn encode_raster(bytes: &[u8], format: ImageFormat) -> Result<EncodedRaster> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    tracing::debug!(
        "Decoded {}x{} map image ({:?})",
        width,
        height,
        image.color()
    );

    let bytes = match format {
        ImageFormat::Png => encode_with(&image, CodecFormat::Png)?,
        ImageFormat::Bmp => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            encode_with(&rgb, CodecFormat::Bmp)?
        }
        ImageFormat::Pgm => {
            let grid = occupancy_grid(&to_grayscale(&image));
            encode_ascii_pgm(&grid).into_bytes()
        }
    };

    Ok(EncodedRaster {
        format,
        file_name: format.file_name(),
        width,
        height,
        bytes,
    })
}

fn encode_with(image: &DynamicImage, codec: CodecFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), codec)?;
    Ok(buffer)
}

/// Single-channel conversion using the ITU-R 601-2 luma weights
/// (`L = R*299/1000 + G*587/1000 + B*114/1000`). Alpha is dropped and 16-bit
/// gray is clipped to 255, not rescaled.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(gray_alpha) => {
            GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
                Luma([gray_alpha.get_pixel(x, y)[0]])
            })
        }
        DynamicImage::ImageLuma16(gray) => GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([clip_u16(gray.get_pixel(x, y)[0])])
        }),
        DynamicImage::ImageLumaA16(gray_alpha) => {
            GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
                Luma([clip_u16(gray_alpha.get_pixel(x, y)[0])])
            })
        }
        _ => {
            let rgb = image.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                let luma =
                    (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000)
                        >> 16;
                Luma([luma as u8])
            })
        }
    }
}

fn clip_u16(value: u16) -> u8 {
    value.min(255) as u8
}

pub fn occupancy_grid(gray: &GrayImage) -> GrayImage {
    let mut grid = gray.clone();
    for pixel in grid.pixels_mut() {
        pixel[0] = classify_occupancy(pixel[0]);
    }
    grid
}

/// Plain (`P2`) PGM text. Rows are newline separated with no trailing newline.
pub fn encode_ascii_pgm(grid: &GrayImage) -> String {
    let (width, height) = grid.dimensions();
    let header = format!("P2\n{} {}\n255\n", width, height);

    if width == 0 {
        return header;
    }

    let rows: Vec<String> = grid
        .as_raw()
        .chunks(width as usize)
        .map(|row| {
            row.iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    header + &rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), CodecFormat::Png)
            .unwrap();
        buffer
    }

    fn gray_png(width: u32, height: u32, pixels: Vec<u8>) -> Vec<u8> {
        png_bytes(DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, pixels).unwrap(),
        ))
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify_occupancy(166), 255);
        assert_eq!(classify_occupancy(165), 128);
        assert_eq!(classify_occupancy(50), 128);
        assert_eq!(classify_occupancy(49), 0);
        assert_eq!(classify_occupancy(0), 0);
        assert_eq!(classify_occupancy(255), 255);
    }

    #[test]
    fn test_classification_matches_rule_for_every_intensity() {
        for p in 0..=255u8 {
            let expected = if p > 165 {
                255
            } else if p < 50 {
                0
            } else {
                128
            };
            assert_eq!(classify_occupancy(p), expected, "intensity {}", p);
        }
    }

    #[test]
    fn test_pgm_occupancy_output() {
        let bytes = gray_png(2, 2, vec![200, 100, 30, 165]);

        let raster = encode_raster(&bytes, ImageFormat::Pgm).unwrap();

        assert_eq!(raster.file_name, "map.pgm");
        assert_eq!((raster.width, raster.height), (2, 2));
        assert_eq!(
            String::from_utf8(raster.bytes).unwrap(),
            "P2\n2 2\n255\n255 128\n0 128"
        );
    }

    #[test]
    fn test_pgm_from_non_square_image_keeps_row_order() {
        let bytes = gray_png(3, 2, vec![10, 60, 170, 255, 49, 166]);

        let raster = encode_raster(&bytes, ImageFormat::Pgm).unwrap();

        assert_eq!(
            String::from_utf8(raster.bytes).unwrap(),
            "P2\n3 2\n255\n0 128 255\n255 0 255"
        );
    }

    #[test]
    fn test_rgb_grayscale_uses_601_luma() {
        let rgb = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });

        let gray = to_grayscale(&DynamicImage::ImageRgb8(rgb));

        assert_eq!(gray.as_raw(), &vec![76, 150, 29]);
    }

    #[test]
    fn test_16_bit_gray_is_clipped() {
        let gray16 = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(2, 2, vec![40, 200, 256, 65535])
            .unwrap();

        let gray = to_grayscale(&DynamicImage::ImageLuma16(gray16));

        assert_eq!(gray.as_raw(), &vec![40, 200, 255, 255]);
    }

    #[test]
    fn test_png_passthrough_preserves_pixels() {
        let bytes = gray_png(2, 2, vec![200, 100, 30, 165]);

        let raster = encode_raster(&bytes, ImageFormat::Png).unwrap();

        let decoded = image::load_from_memory(&raster.bytes).unwrap();
        assert_eq!(decoded.to_luma8().as_raw(), &vec![200, 100, 30, 165]);
    }

    #[test]
    fn test_bmp_is_24_bit_rgb() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 128]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(rgba));

        let raster = encode_raster(&bytes, ImageFormat::Bmp).unwrap();

        assert_eq!(&raster.bytes[..2], b"BM");
        let bits_per_pixel = u16::from_le_bytes([raster.bytes[28], raster.bytes[29]]);
        assert_eq!(bits_per_pixel, 24);

        let decoded = image::load_from_memory(&raster.bytes).unwrap();
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = encode_raster(b"definitely not an image", ImageFormat::Png).unwrap_err();
        assert!(matches!(err, crate::utils::error::MapError::ImageError(_)));
    }
}
