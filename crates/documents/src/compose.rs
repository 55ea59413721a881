use std::io::Write;

use core_types::{Orientation, PageFormat};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{GenericImageView, ImageFormat};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::{DocumentError, Result};

/// Builds a PDF with one page per image, each scaled to fit and centred.
pub fn images_to_pdf<B: AsRef<[u8]>>(
    images: &[B],
    format: PageFormat,
    orientation: Orientation,
) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(DocumentError::NoImages);
    }
    let (page_w, page_h) = format.size_points(orientation);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for (index, bytes) in images.iter().enumerate() {
        let embedded = embed_image(&mut doc, bytes.as_ref(), index)?;
        let (draw_w, draw_h) = fit_within(embedded.width, embedded.height, page_w, page_h);
        let x = (page_w - draw_w) / 2.0;
        let y = (page_h - draw_h) / 2.0;

        let content = format!("q {draw_w:.4} 0 0 {draw_h:.4} {x:.4} {y:.4} cm /Im0 Do Q");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w as f32),
                Object::Real(page_h as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => embedded.id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    tracing::info!(pages = count, ?format, ?orientation, "composed PDF from images");
    Ok(buffer)
}

/// Largest size with the image's aspect ratio that fits the page.
fn fit_within(width: u32, height: u32, page_w: f64, page_h: f64) -> (f64, f64) {
    let (w, h) = (f64::from(width), f64::from(height));
    let ratio = (page_w / w).min(page_h / h);
    (w * ratio, h * ratio)
}

pub(crate) struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Adds `bytes` to `doc` as an image XObject. Baseline RGB and greyscale
/// JPEGs are embedded untouched; everything else is stored as Flate RGB with
/// an SMask when the image has transparency.
pub(crate) fn embed_image(doc: &mut Document, bytes: &[u8], index: usize) -> Result<EmbeddedImage> {
    let invalid = |reason: String| DocumentError::InvalidImage { index, reason };
    let format = image::guess_format(bytes).map_err(|e| invalid(e.to_string()))?;
    let decoded =
        image::load_from_memory_with_format(bytes, format).map_err(|e| invalid(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(invalid("image has no pixels".into()));
    }

    if format == ImageFormat::Jpeg {
        if let Some(color_space) = jpeg_components(bytes).and_then(color_space_for) {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.to_vec(),
            )
            .with_compression(false);
            let id = doc.add_object(stream);
            return Ok(EmbeddedImage { id, width, height });
        }
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if alpha.iter().any(|&a| a < u8::MAX) {
        let smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        )
        .with_compression(false);
        let smask_id = doc.add_object(smask);
        image_dict.set("SMask", smask_id);
    }
    let id = doc.add_object(Stream::new(image_dict, deflate(&rgb)?).with_compression(false));
    Ok(EmbeddedImage { id, width, height })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn color_space_for(components: u8) -> Option<&'static str> {
    match components {
        1 => Some("DeviceGray"),
        3 => Some("DeviceRGB"),
        _ => None,
    }
}

/// Component count from the first SOF segment of a JPEG stream.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    let mut idx = 2;
    while idx + 3 < data.len() {
        if data[idx] != 0xFF {
            idx += 1;
            continue;
        }
        let marker = data[idx + 1];
        if marker == 0xFF {
            idx += 1;
            continue;
        }
        idx += 2;
        if marker == 0xD9 || marker == 0xDA {
            break;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }
        if idx + 2 > data.len() {
            break;
        }
        let len = u16::from_be_bytes([data[idx], data[idx + 1]]) as usize;
        if len < 2 || idx + len > data.len() {
            break;
        }
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            // length(2) precision(1) height(2) width(2) components(1)
            return (len >= 8).then(|| data[idx + 7]);
        }
        idx += len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, alpha]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg).unwrap();
        out
    }

    fn xobject(doc: &Document, page_id: ObjectId) -> &Stream {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        doc.get_object(id).unwrap().as_stream().unwrap()
    }

    #[test]
    fn one_page_per_image_in_order() {
        let pdf = images_to_pdf(
            &[png(100, 50, 255), jpeg(40, 80), png(10, 10, 128)],
            PageFormat::A4,
            Orientation::Portrait,
        )
        .unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        let first = xobject(&doc, pages[&1]);
        assert_eq!(first.dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert!(first.dict.get(b"SMask").is_err());

        let second = xobject(&doc, pages[&2]);
        assert_eq!(second.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");

        let third = xobject(&doc, pages[&3]);
        assert!(third.dict.get(b"SMask").is_ok());
    }

    #[test]
    fn landscape_pages_swap_media_box() {
        let pdf = images_to_pdf(&[png(10, 10, 255)], PageFormat::A4, Orientation::Landscape).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        let page_id = doc.get_pages()[&1];
        let media_box = doc.get_dictionary(page_id).unwrap().get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!(width > height);
        assert!((width - 841.89).abs() < 0.01);
    }

    #[test]
    fn fit_keeps_aspect_and_centres() {
        let (w, h) = fit_within(1000, 500, 595.28, 841.89);
        assert!((w - 595.28).abs() < 1e-9);
        assert!((h - 297.64).abs() < 1e-9);
    }

    #[test]
    fn reads_jpeg_component_count() {
        assert_eq!(jpeg_components(&jpeg(8, 8)), Some(3));
        assert_eq!(jpeg_components(b"\xFF\xD8\xFF\xD9"), None);
        assert_eq!(jpeg_components(b"nope"), None);
    }

    #[test]
    fn rejects_empty_and_broken_inputs() {
        let empty: [Vec<u8>; 0] = [];
        assert!(matches!(
            images_to_pdf(&empty, PageFormat::A4, Orientation::Portrait),
            Err(DocumentError::NoImages)
        ));
        assert!(matches!(
            images_to_pdf(&[png(4, 4, 255), b"junk".to_vec()], PageFormat::A5, Orientation::Portrait),
            Err(DocumentError::InvalidImage { index: 1, .. })
        ));
    }
}
