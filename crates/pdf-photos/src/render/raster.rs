//! Raster image XObjects for photo pages
//!
//! Only JPEG and PNG are accepted. The format is sniffed from the file
//! bytes rather than trusted from the photo's mimetype.

use crate::types::SkipReason;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Cursor, Write};
use std::path::Path;

/// Encoded pixel data of a photo, ready to be added to a document
#[derive(Debug, Clone)]
pub struct PhotoImage {
    pub width: u32,
    pub height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel
    alpha: Option<Vec<u8>>,
}

impl PhotoImage {
    /// Add the image (and its soft mask) to `doc`
    pub fn add_to(&self, doc: &mut Document) -> ObjectId {
        let mut dict = image_dict(self.width, self.height, self.color_space, self.filter);

        if let Some(alpha) = &self.alpha {
            let mask = image_dict(self.width, self.height, "DeviceGray", "FlateDecode");
            let mask_id = doc.add_object(Stream::new(mask, alpha.clone()));
            dict.set("SMask", Object::Reference(mask_id));
        }

        doc.add_object(Stream::new(dict, self.data.clone()))
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// True when the JPEG bytes are embedded unchanged
    pub fn is_embedded_jpeg(&self) -> bool {
        self.filter == "DCTDecode"
    }
}

/// Read and prepare an image file
pub fn load_image(path: &Path) -> Result<PhotoImage, SkipReason> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

/// Prepare in-memory image bytes
pub fn decode_image(bytes: &[u8]) -> Result<PhotoImage, SkipReason> {
    let format = image::guess_format(bytes)
        .map_err(|_| SkipReason::Unsupported("unrecognized image data".to_string()))?;

    match format {
        ImageFormat::Jpeg => jpeg_image(bytes),
        ImageFormat::Png => {
            raster_image(&image::load_from_memory_with_format(bytes, ImageFormat::Png)?)
        }
        other => Err(SkipReason::Unsupported(format!("{:?}", other))),
    }
}

fn jpeg_image(bytes: &[u8]) -> Result<PhotoImage, SkipReason> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();

    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L8 => "DeviceGray",
        ExtendedColorType::Rgb8 => "DeviceRGB",
        // CMYK and friends: re-encode rather than guess at inverted channels
        _ => {
            return raster_image(&image::load_from_memory_with_format(
                bytes,
                ImageFormat::Jpeg,
            )?);
        }
    };

    Ok(PhotoImage {
        width,
        height,
        color_space,
        filter: "DCTDecode",
        data: bytes.to_vec(),
        alpha: None,
    })
}

fn raster_image(img: &DynamicImage) -> Result<PhotoImage, SkipReason> {
    let rgb = img.to_rgb8();
    let data = deflate(rgb.as_raw())?;

    let alpha = if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|px| px.0[3]).collect();
        Some(deflate(&alpha)?)
    } else {
        None
    };

    Ok(PhotoImage {
        width: img.width(),
        height: img.height(),
        color_space: "DeviceRGB",
        filter: "FlateDecode",
        data,
        alpha,
    })
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_rgb_jpeg_is_embedded_verbatim() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([200, 10, 10]))),
            ImageFormat::Jpeg,
        );
        let image = decode_image(&bytes).unwrap();
        assert_eq!((image.width, image.height), (40, 30));
        assert!(image.is_embedded_jpeg());
        assert_eq!(image.data, bytes);
    }

    #[test]
    fn test_gray_jpeg_uses_gray_color_space() {
        let bytes = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128]))),
            ImageFormat::Jpeg,
        );
        let image = decode_image(&bytes).unwrap();
        assert_eq!(image.color_space, "DeviceGray");
    }

    #[test]
    fn test_png_with_alpha_gets_soft_mask() {
        let bytes = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 7, Rgba([0, 0, 255, 100]))),
            ImageFormat::Png,
        );
        let image = decode_image(&bytes).unwrap();
        assert_eq!((image.width, image.height), (5, 7));
        assert!(image.has_alpha());
        assert!(!image.is_embedded_jpeg());

        let mut doc = Document::with_version("1.7");
        let id = image.add_to(&mut doc);
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 5);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );
    }

    #[test]
    fn test_unsupported_formats_are_rejected() {
        let bmp = encode(
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            ImageFormat::Bmp,
        );
        assert!(matches!(
            decode_image(&bmp),
            Err(SkipReason::Unsupported(_))
        ));
        assert!(matches!(
            decode_image(b"%PDF-1.7 not an image"),
            Err(SkipReason::Unsupported(_))
        ));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let result = load_image(Path::new("/definitely/not/here.jpg"));
        assert!(matches!(result, Err(SkipReason::Unreadable(_))));
    }
}
