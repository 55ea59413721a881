//! Concatenates PDFs, keeping document order and page order.
//!
//! Each source is renumbered past the objects already collected, its pages
//! get the attributes they used to inherit from their page tree copied in,
//! and a fresh page tree and catalog are built over all pages.

use lopdf::{dictionary, Document, Object, ObjectId};

use crate::{DocumentError, Result};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Deepest page tree walked when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

pub fn merge_pdfs<B: AsRef<[u8]>>(inputs: &[B]) -> Result<Vec<u8>> {
    if inputs.len() < 2 {
        return Err(DocumentError::NotEnoughDocuments {
            found: inputs.len(),
        });
    }

    let mut merged = Document::with_version("1.5");
    let mut next_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for (index, bytes) in inputs.iter().enumerate() {
        let mut doc = load_pdf(bytes.as_ref(), index)?;
        let source_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if source_pages.is_empty() {
            return Err(DocumentError::Corrupt {
                index,
                reason: "document has no pages".into(),
            });
        }
        for &page_id in &source_pages {
            inherit_page_attributes(&mut doc, page_id)?;
        }

        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;
        let renumbered: Vec<ObjectId> = doc.get_pages().into_values().collect();
        tracing::debug!(index, pages = renumbered.len(), "collected PDF pages");

        page_ids.extend(renumbered);
        merged.objects.extend(doc.objects);
    }

    // The old page trees and catalogs are replaced below.
    merged
        .objects
        .retain(|_, object| !matches!(type_name(object), Some(b"Catalog") | Some(b"Pages")));
    merged.max_id = next_id - 1;

    let pages_id = merged.new_object_id();
    for &page_id in &page_ids {
        if let Ok(page) = merged.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set("Parent", pages_id);
        }
    }
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged.compress();

    let mut buffer = Vec::new();
    merged.save_to(&mut buffer)?;
    tracing::info!(documents = inputs.len(), pages = page_ids.len(), "merged PDFs");
    Ok(buffer)
}

/// Loads a PDF, rejecting encrypted and unreadable documents.
pub(crate) fn load_pdf(bytes: &[u8], index: usize) -> Result<Document> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        if contains(bytes, b"/Encrypt") {
            DocumentError::Encrypted { index }
        } else {
            DocumentError::Corrupt {
                index,
                reason: e.to_string(),
            }
        }
    })?;
    if doc.is_encrypted() {
        return Err(DocumentError::Encrypted { index });
    }
    Ok(doc)
}

/// Copies attributes `page_id` inherits from its ancestors onto the page.
pub(crate) fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE.iter().copied().filter(|key| !page.has(key)).collect();
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    let mut depth = 0;
    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        depth += 1;
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    if inherited.is_empty() {
        return Ok(());
    }
    let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    Ok(())
}

fn type_name(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").and_then(Object::as_name).ok()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{Dictionary, Stream};

    /// PDF with `num_pages` pages whose content names `prefix` and the page
    /// number. With `inherit_media_box` the MediaBox lives on the page tree.
    pub(crate) fn create_test_pdf(num_pages: u32, prefix: &str, inherit_media_box: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ];

        let mut kids = Vec::new();
        for page_num in 0..num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td ({prefix}-Page-{}) Tj ET", page_num + 1);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {},
            };
            if !inherit_media_box {
                page.set("MediaBox", media_box.clone());
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => kids,
        };
        if inherit_media_box {
            pages.set("MediaBox", media_box);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// Decoded text of every content stream on the page.
    pub(crate) fn page_text(doc: &Document, page_id: ObjectId) -> String {
        doc.get_page_contents(page_id)
            .into_iter()
            .filter_map(|id| doc.get_object(id).and_then(Object::as_stream).ok())
            .map(|stream| {
                let bytes = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                String::from_utf8_lossy(&bytes).into_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn merge_keeps_document_and_page_order() {
        let inputs = vec![
            create_test_pdf(2, "A", false),
            create_test_pdf(1, "B", false),
            create_test_pdf(3, "C", true),
        ];
        let merged = merge_pdfs(&inputs).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 6);

        let labels: Vec<String> = pages
            .values()
            .map(|&id| page_text(&doc, id))
            .collect();
        let expected = ["A-Page-1", "A-Page-2", "B-Page-1", "C-Page-1", "C-Page-2", "C-Page-3"];
        for (text, label) in labels.iter().zip(expected) {
            assert!(text.contains(label), "expected {label} in {text}");
        }
    }

    #[test]
    fn inherited_media_box_survives_merge() {
        let inputs = vec![create_test_pdf(1, "A", false), create_test_pdf(2, "B", true)];
        let merged = merge_pdfs(&inputs).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        for page_id in doc.get_pages().into_values() {
            let page = doc.get_dictionary(page_id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            assert_eq!(media_box[3].as_i64().unwrap(), 792);
        }
    }

    #[test]
    fn merge_rejects_single_input_and_corrupt_documents() {
        assert!(matches!(
            merge_pdfs(&[create_test_pdf(1, "A", false)]),
            Err(DocumentError::NotEnoughDocuments { found: 1 })
        ));
        let broken = vec![create_test_pdf(1, "A", false), b"%PDF-1.4 garbage".to_vec()];
        assert!(matches!(
            merge_pdfs(&broken),
            Err(DocumentError::Corrupt { index: 1, .. })
        ));
    }
}
