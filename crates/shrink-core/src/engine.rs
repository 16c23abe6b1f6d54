//! Size-reducing PDF rewrite
//!
//! [`PdfRewriter`] is the capability boundary between the transformation
//! service and whatever engine performs the byte-level rewrite. The service
//! only relies on its contract: bytes in, bytes out, same document semantics.
//!
//! [`LopdfRewriter`] is the production engine. The pipeline:
//! 1. Load the document
//! 2. Collapse byte-identical streams onto one object
//! 3. Prune objects no longer reachable from the trailer
//! 4. Drop zero-length streams
//! 5. Flate-compress remaining streams
//! 6. Renumber objects densely so the xref table shrinks
//! 7. Save

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::error::TransformError;

/// Rewrites a PDF into a smaller-or-equal representation of the same document
pub trait PdfRewriter: Send + Sync {
    fn rewrite(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Which passes [`LopdfRewriter`] applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    pub dedup_streams: bool,
    pub prune_unreferenced: bool,
    pub drop_empty_streams: bool,
    pub compress_streams: bool,
    pub renumber_objects: bool,
    /// Insert a blank Letter page when the document has none
    pub add_default_page: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            dedup_streams: true,
            prune_unreferenced: true,
            drop_empty_streams: true,
            compress_streams: true,
            renumber_objects: true,
            add_default_page: false,
        }
    }
}

/// lopdf-backed [`PdfRewriter`]
#[derive(Debug, Clone, Default)]
pub struct LopdfRewriter {
    options: RewriteOptions,
}

impl LopdfRewriter {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl PdfRewriter for LopdfRewriter {
    fn rewrite(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut doc =
            Document::load_mem(bytes).map_err(|e| TransformError::ParseError(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(TransformError::OperationError(
                "Encrypted documents are not supported".into(),
            ));
        }

        let opts = &self.options;

        if opts.dedup_streams {
            let merged = dedup_streams(&mut doc);
            debug!("Collapsed {} duplicate streams", merged);
        }

        if opts.prune_unreferenced {
            let pruned = doc.prune_objects();
            debug!("Pruned {} unreferenced objects", pruned.len());
        }

        if opts.drop_empty_streams {
            doc.delete_zero_length_streams();
        }

        if opts.add_default_page && doc.get_pages().is_empty() {
            add_blank_page(&mut doc)?;
        }

        if opts.compress_streams {
            doc.compress();
        }

        if opts.renumber_objects {
            doc.renumber_objects();
        }

        let mut buffer = Vec::with_capacity(bytes.len());
        doc.save_to(&mut buffer)
            .map_err(|e| TransformError::SaveError(e.to_string()))?;

        debug!("Rewrote PDF: {} -> {} bytes", bytes.len(), buffer.len());
        Ok(buffer)
    }
}

/// Point every reference at the first of a set of identical streams and
/// drop the rest. Returns the number of streams removed.
fn dedup_streams(doc: &mut Document) -> usize {
    let mut seen: HashMap<(String, Vec<u8>), ObjectId> = HashMap::new();
    let mut redirects: BTreeMap<ObjectId, ObjectId> = BTreeMap::new();

    for (&id, object) in &doc.objects {
        let Object::Stream(stream) = object else {
            continue;
        };
        if is_structural_stream(&stream.dict) {
            continue;
        }

        let key = (format!("{:?}", stream.dict), stream.content.clone());
        match seen.entry(key) {
            Entry::Occupied(canonical) => {
                redirects.insert(id, *canonical.get());
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
    }

    if redirects.is_empty() {
        return 0;
    }

    for object in doc.objects.values_mut() {
        redirect_refs(object, &redirects);
    }
    for (_, value) in doc.trailer.iter_mut() {
        redirect_refs(value, &redirects);
    }
    for id in redirects.keys() {
        doc.objects.remove(id);
    }

    redirects.len()
}

/// Cross-reference and object streams are rebuilt by the writer
fn is_structural_stream(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if name == b"XRef" || name == b"ObjStm"
    )
}

fn redirect_refs(obj: &mut Object, redirects: &BTreeMap<ObjectId, ObjectId>) {
    match obj {
        Object::Reference(id) => {
            if let Some(target) = redirects.get(id) {
                *id = *target;
            }
        }
        Object::Array(items) => {
            for item in items.iter_mut() {
                redirect_refs(item, redirects);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                redirect_refs(value, redirects);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                redirect_refs(value, redirects);
            }
        }
        _ => {}
    }
}

/// Append an empty US Letter page to the page tree root
fn add_blank_page(doc: &mut Document) -> Result<(), TransformError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::OperationError("No Root in trailer".into()))?;

    let pages_id = doc
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| TransformError::OperationError("No Pages in catalog".into()))?;

    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]);
    let page_id = doc.add_object(page);

    let Some(Object::Dictionary(pages)) = doc.objects.get_mut(&pages_id) else {
        return Err(TransformError::OperationError(
            "Invalid pages dictionary".into(),
        ));
    };

    let mut kids = match pages.get(b"Kids") {
        Ok(Object::Array(kids)) => kids.clone(),
        _ => Vec::new(),
    };
    kids.push(Object::Reference(page_id));
    let count = kids.len() as i64;
    pages.set("Kids", Object::Array(kids));
    pages.set("Count", Object::Integer(count));

    Ok(())
}
