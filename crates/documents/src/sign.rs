use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::compose::embed_image;
use crate::merge::{inherit_page_attributes, load_pdf};
use crate::{DocumentError, Result};

/// Width of the stamped signature in PDF points; the height follows the
/// signature image's aspect ratio.
pub const SIGNATURE_WIDTH_PT: f64 = 120.0;

/// Fallback page size when a page carries no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f64, f64) = (595.0, 842.0);

/// Where to centre the signature, as a point on a page preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignaturePlacement {
    /// Zero-based page index.
    pub page_index: usize,
    /// Centre of the signature in preview pixels, origin top-left.
    pub x: f64,
    pub y: f64,
    /// Width of the preview the point was picked on. Zero or less means the
    /// point is already in PDF points.
    pub preview_width: f64,
}

/// Stamps the PNG/JPEG `signature` onto the PDF at `placement`.
pub fn sign_pdf(pdf: &[u8], signature: &[u8], placement: &SignaturePlacement) -> Result<Vec<u8>> {
    let mut doc = load_pdf(pdf, 0)?;
    let pages = doc.get_pages();
    let page_number = placement.page_index as u32 + 1;
    let page_id = *pages
        .get(&page_number)
        .ok_or(DocumentError::PageOutOfRange {
            page: placement.page_index,
            count: pages.len(),
        })?;
    inherit_page_attributes(&mut doc, page_id)?;
    let (page_w, page_h) = page_size(&doc, page_id);

    let embedded = embed_image(&mut doc, signature, 0)?;
    let sig_w = SIGNATURE_WIDTH_PT;
    let sig_h = sig_w * f64::from(embedded.height) / f64::from(embedded.width);

    let scale = if placement.preview_width > 0.0 {
        page_w / placement.preview_width
    } else {
        1.0
    };
    let pdf_x = placement.x * scale - sig_w / 2.0;
    let pdf_y = page_h - placement.y * scale - sig_h / 2.0;

    let name = register_xobject(&mut doc, page_id, embedded.id)?;
    let content = format!("q {sig_w:.2} 0 0 {sig_h:.2} {pdf_x:.2} {pdf_y:.2} cm /{name} Do Q");
    doc.add_page_contents(page_id, content.into_bytes())?;

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    tracing::info!(page = page_number, x = pdf_x, y = pdf_y, "stamped signature");
    Ok(buffer)
}

/// Adds `image_id` to the page's XObject resources under a fresh name.
///
/// Indirect resource and XObject dictionaries are copied onto the page
/// before the insert, so pages sharing them are left untouched.
fn register_xobject(doc: &mut Document, page_id: ObjectId, image_id: ObjectId) -> Result<String> {
    let mut resources = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(raw) => resolve_dictionary(doc, raw, "page resources")?,
        Err(_) => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject") {
        Ok(raw) => resolve_dictionary(doc, raw, "page XObjects")?,
        Err(_) => Dictionary::new(),
    };

    let name = (1..)
        .map(|n| format!("Sig{n}"))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .unwrap_or_else(|| "Sig".to_string());
    xobjects.set(name.as_bytes().to_vec(), image_id);
    resources.set("XObject", xobjects);

    let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
    page.set("Resources", resources);
    Ok(name)
}

fn resolve_dictionary(doc: &Document, raw: &Object, what: &str) -> Result<Dictionary> {
    match raw {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => doc
            .get_dictionary(*id)
            .cloned()
            .map_err(|_| DocumentError::InvalidInput(format!("{what} point at a missing object"))),
        _ => Err(DocumentError::InvalidInput(format!("{what} are malformed"))),
    }
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let media_box = doc
        .get_dictionary(page_id)
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(|raw| match raw {
            Object::Reference(id) => doc.get_object(*id),
            other => Ok(other),
        })
        .and_then(Object::as_array);
    let Ok(values) = media_box else {
        return DEFAULT_PAGE_SIZE;
    };
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.as_float().ok().map(f64::from))
        .collect();
    match numbers[..] {
        [llx, lly, urx, ury] if urx > llx && ury > lly => (urx - llx, ury - lly),
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::tests::{create_test_pdf, page_text};
    use image::{ImageFormat, Rgba, RgbaImage};
    use lopdf::{dictionary, Stream};
    use std::io::Cursor;

    /// Two pages drawing `/Im1`, sharing one indirect Resources dictionary
    /// whose XObject entry is itself indirect.
    fn shared_resources_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1i64,
                "Height" => 1i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            vec![255, 0, 0],
        ));
        let xobjects_id = doc.add_object(dictionary! { "Im1" => image_id });
        let resources_id = doc.add_object(dictionary! { "XObject" => xobjects_id });

        let mut kids = Vec::new();
        for _ in 0..2 {
            let content = b"q 10 0 0 10 0 0 cm /Im1 Do Q".to_vec();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            kids.push(Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            })));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 2i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn xobject_names(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = resolve_dictionary(doc, page.get(b"Resources").unwrap(), "resources").unwrap();
        let xobjects = resolve_dictionary(doc, resources.get(b"XObject").unwrap(), "xobjects").unwrap();
        let mut names: Vec<String> = xobjects
            .iter()
            .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
            .collect();
        names.sort();
        names
    }

    fn signature_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 200]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    #[test]
    fn stamps_signature_centred_on_preview_point() {
        let pdf = create_test_pdf(2, "Doc", false);
        let placement = SignaturePlacement {
            page_index: 1,
            x: 153.0,
            y: 198.0,
            preview_width: 306.0,
        };
        let signed = sign_pdf(&pdf, &signature_png(), &placement).unwrap();
        let doc = Document::load_mem(&signed).unwrap();
        let page_id = doc.get_pages()[&2];

        // scale 2: x = 306 - 60, y = 792 - 396 - 30
        let text = page_text(&doc, page_id);
        assert!(text.contains("Doc-Page-2"), "{text}");
        assert!(text.contains("120.00 0 0 60.00 246.00 366.00 cm /Sig1 Do"), "{text}");

        let resources = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Sig1"));

        let untouched = page_text(&doc, doc.get_pages()[&1]);
        assert!(!untouched.contains("Sig1"));
    }

    #[test]
    fn inherited_media_box_is_used() {
        let pdf = create_test_pdf(1, "Doc", true);
        let placement = SignaturePlacement {
            page_index: 0,
            x: 60.0,
            y: 30.0,
            preview_width: 0.0,
        };
        let signed = sign_pdf(&pdf, &signature_png(), &placement).unwrap();
        let doc = Document::load_mem(&signed).unwrap();
        let text = page_text(&doc, doc.get_pages()[&1]);
        assert!(text.contains("0.00 732.00 cm"), "{text}");
    }

    #[test]
    fn rejects_missing_page_and_bad_signature() {
        let pdf = create_test_pdf(1, "Doc", false);
        let placement = SignaturePlacement {
            page_index: 3,
            x: 0.0,
            y: 0.0,
            preview_width: 100.0,
        };
        assert!(matches!(
            sign_pdf(&pdf, &signature_png(), &placement),
            Err(DocumentError::PageOutOfRange { page: 3, count: 1 })
        ));
        let placement = SignaturePlacement {
            page_index: 0,
            ..placement
        };
        assert!(matches!(
            sign_pdf(&pdf, b"not an image", &placement),
            Err(DocumentError::InvalidImage { .. })
        ));
    }

    #[test]
    fn indirect_xobjects_keep_existing_images() {
        let pdf = shared_resources_pdf();
        let placement = SignaturePlacement {
            page_index: 0,
            x: 100.0,
            y: 100.0,
            preview_width: 0.0,
        };
        let signed = sign_pdf(&pdf, &signature_png(), &placement).unwrap();
        let doc = Document::load_mem(&signed).unwrap();
        let pages = doc.get_pages();

        assert_eq!(xobject_names(&doc, pages[&1]), ["Im1", "Sig1"]);
        let text = page_text(&doc, pages[&1]);
        assert!(text.contains("/Im1 Do"), "{text}");
        assert!(text.contains("/Sig1 Do"), "{text}");
    }

    #[test]
    fn shared_resources_stay_unchanged_on_other_pages() {
        let pdf = shared_resources_pdf();
        let placement = SignaturePlacement {
            page_index: 0,
            x: 100.0,
            y: 100.0,
            preview_width: 0.0,
        };
        let signed = sign_pdf(&pdf, &signature_png(), &placement).unwrap();
        let doc = Document::load_mem(&signed).unwrap();
        let pages = doc.get_pages();

        assert_eq!(xobject_names(&doc, pages[&2]), ["Im1"]);
        assert!(!page_text(&doc, pages[&2]).contains("Sig1"));
    }

    #[test]
    fn signing_twice_picks_a_fresh_name() {
        let pdf = shared_resources_pdf();
        let placement = SignaturePlacement {
            page_index: 1,
            x: 50.0,
            y: 50.0,
            preview_width: 0.0,
        };
        let once = sign_pdf(&pdf, &signature_png(), &placement).unwrap();
        let twice = sign_pdf(&once, &signature_png(), &placement).unwrap();
        let doc = Document::load_mem(&twice).unwrap();
        assert_eq!(xobject_names(&doc, doc.get_pages()[&2]), ["Im1", "Sig1", "Sig2"]);
    }
}
