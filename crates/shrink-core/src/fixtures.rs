//! Generated PDF documents for tests
//!
//! Content streams are written uncompressed and repetitive, so a rewrite
//! with stream compression always produces a smaller file.

use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

/// Create a valid PDF with `num_pages` text pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let mut operations = Vec::new();
        for line in 0..40 {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new(
                    "Td",
                    vec![Object::Integer(72), Object::Integer(720 - line * 16)],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {} line {} of the sample document", i + 1, line)
                            .into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap_or_default(),
        ));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", letter_media_box()),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    finish(doc, pages_id, page_ids)
}

/// Create a structurally valid PDF whose page tree has no pages
pub fn create_empty_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    finish(doc, pages_id, Vec::new())
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, page_ids: Vec<lopdf::ObjectId>) -> Vec<u8> {
    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .expect("in-memory PDF serialization cannot fail");
    buffer
}
