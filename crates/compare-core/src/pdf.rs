//! PDF-backed document source
//!
//! Text comes from lopdf's content-stream text extraction. lopdf reports no
//! glyph positions, so lines are placed with [`LineLayout`] inside each page's
//! MediaBox.

use crate::document::{DocumentSource, LineLayout, TextLine};
use crate::error::CompareError;
use lopdf::{Document, Object, ObjectId};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Maximum number of `Parent` hops when resolving an inherited MediaBox
const MAX_INHERITANCE_DEPTH: usize = 16;

pub struct PdfDocument {
    document: Document,
    pages: Vec<ObjectId>,
    fingerprint: String,
}

impl PdfDocument {
    /// Parse PDF bytes, unlocking the document with `password` when encrypted
    ///
    /// Fails before any text is read if the document is encrypted and the
    /// password is missing or wrong.
    pub fn load(bytes: &[u8], password: Option<&str>) -> Result<Self, CompareError> {
        let mut document =
            Document::load_mem(bytes).map_err(|e| CompareError::ParseError(e.to_string()))?;

        if document.is_encrypted() {
            // The empty user password opens documents that only restrict permissions
            let candidate = password.unwrap_or("");
            if document.decrypt(candidate).is_err() {
                return Err(match password {
                    Some(_) => CompareError::InvalidPassword,
                    None => CompareError::PasswordRequired,
                });
            }
        }

        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        let fingerprint = hex::encode(Sha256::digest(bytes));
        debug!(pages = pages.len(), fingerprint = %fingerprint, "Loaded PDF");

        Ok(Self {
            document,
            pages,
            fingerprint,
        })
    }

    /// MediaBox of a page as `[x0, y0, x1, y1]`, following inheritance
    fn media_box(&self, page_id: ObjectId) -> Option<[f64; 4]> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.document.get_dictionary(current).ok()?;
            if let Ok(obj) = dict.get(b"MediaBox") {
                return self.number_array(obj);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn number_array(&self, obj: &Object) -> Option<[f64; 4]> {
        let obj = match obj {
            Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let values: Vec<f64> = obj
            .as_array()
            .ok()?
            .iter()
            .filter_map(object_to_f64)
            .collect();
        match values.as_slice() {
            [x0, y0, x1, y1] => Some([*x0, *y0, *x1, *y1]),
            _ => None,
        }
    }

    fn layout_for(&self, page_id: ObjectId) -> LineLayout {
        match self.media_box(page_id) {
            Some([x0, y0, x1, y1]) => LineLayout::for_page((x1 - x0).abs(), (y1 - y0).abs()),
            None => LineLayout::default(),
        }
    }
}

fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_lines(&self, page_index: u32) -> Result<Vec<TextLine>, CompareError> {
        let page_id =
            *self
                .pages
                .get(page_index as usize)
                .ok_or(CompareError::PageOutOfRange {
                    page_index,
                    page_count: self.page_count(),
                })?;

        // lopdf numbers pages from 1
        let text = self
            .document
            .extract_text(&[page_index + 1])
            .map_err(|e| CompareError::ExtractionError {
                page_index,
                message: e.to_string(),
            })?;

        let lines: Vec<&str> = text.lines().collect();
        Ok(self.layout_for(page_id).layout(&lines))
    }

    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }
}
