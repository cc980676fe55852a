//! Page content and resource editing
//!
//! New drawing is appended as separate content streams. Before the first
//! append on a page the existing streams are bracketed with `q`/`Q` so that
//! a graphics state left dirty by the original content (an unbalanced `cm`,
//! a fill color) cannot leak into what we draw.

use crate::error::PdfError;
use crate::parser::PdfDocument;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use shared_types::PlacementRect;

/// Stroke color of the placement outline (DeviceRGB red)
const OUTLINE_RGB: [f32; 3] = [1.0, 0.0, 0.0];
const OUTLINE_WIDTH: f32 = 1.0;
/// Stroke alpha of the placement outline
pub const OUTLINE_OPACITY: f32 = 0.8;

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// `q w 0 0 h x y cm /Name Do Q`
pub fn image_operations(name: &str, rect: &PlacementRect, origin: (f64, f64)) -> Content {
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width),
                    Object::Integer(0),
                    Object::Integer(0),
                    real(rect.height),
                    real(rect.x + origin.0),
                    real(rect.y + origin.1),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
}

/// Stroked rectangle outline, used to visualise a placement target.
/// `state` names an ExtGState resource applied before stroking.
pub fn outline_operations(rect: &PlacementRect, origin: (f64, f64), state: &str) -> Content {
    let [r, g, b] = OUTLINE_RGB;
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(state.as_bytes().to_vec())]),
            Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new("w", vec![Object::Real(OUTLINE_WIDTH)]),
            Operation::new(
                "re",
                vec![
                    real(rect.x + origin.0),
                    real(rect.y + origin.1),
                    real(rect.width),
                    real(rect.height),
                ],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}

/// ExtGState dictionary setting the stroke alpha.
pub fn stroke_alpha_state(alpha: f32) -> Dictionary {
    let mut state = Dictionary::new();
    state.set("Type", Object::Name(b"ExtGState".to_vec()));
    state.set("CA", Object::Real(alpha));
    state
}

impl PdfDocument {
    /// Make `xobject_id` available to the page under a resource name and
    /// return that name.
    pub fn add_xobject(&mut self, page_id: ObjectId, xobject_id: ObjectId) -> Result<String, PdfError> {
        self.add_resource(page_id, "XObject", "Sig", xobject_id)
    }

    /// Same as [`add_xobject`](Self::add_xobject) for graphics states.
    pub fn add_ext_gstate(&mut self, page_id: ObjectId, state_id: ObjectId) -> Result<String, PdfError> {
        self.add_resource(page_id, "ExtGState", "SigGS", state_id)
    }

    /// Register `target` in the page's `category` resource dictionary,
    /// reusing an existing entry that already points at it.
    ///
    /// Inherited or shared resource dictionaries are copied onto the page
    /// before editing, so sibling pages are left untouched.
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        prefix: &str,
        target: ObjectId,
    ) -> Result<String, PdfError> {
        let mut resources = match self.inherited_attribute(page_id, b"Resources")? {
            Some(obj) => self.resolve_dict(&obj)?,
            None => Dictionary::new(),
        };
        let mut entries = match resources.get(category.as_bytes()) {
            Ok(obj) => self.resolve_dict(obj)?,
            Err(_) => Dictionary::new(),
        };

        for (name, value) in entries.iter() {
            if value.as_reference().ok() == Some(target) {
                return Ok(String::from_utf8_lossy(name).into_owned());
            }
        }

        let mut suffix = target.0;
        let name = loop {
            let candidate = format!("{}{}", prefix, suffix);
            if !entries.has(candidate.as_bytes()) {
                break candidate;
            }
            suffix += 1;
        };

        entries.set(name.clone(), Object::Reference(target));
        resources.set(category, Object::Dictionary(entries));
        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Dictionary(resources));
        Ok(name)
    }

    /// Append a content stream to the page, isolating the original content
    /// on the first call for that page.
    pub fn append_content(&mut self, page_id: ObjectId, content: &Content) -> Result<(), PdfError> {
        let encoded = content.encode()?;
        let existing = self.content_refs(page_id)?;

        let mut contents = Vec::with_capacity(existing.len() + 3);
        if self.isolated.insert(page_id) {
            let open = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(open));
            contents.extend(existing);
            let close = self.doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
            contents.push(Object::Reference(close));
        } else {
            contents.extend(existing);
        }

        let appended = self.doc.add_object(Stream::new(Dictionary::new(), encoded));
        contents.push(Object::Reference(appended));

        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Current `/Contents` of the page as a list of stream references
    fn content_refs(&mut self, page_id: ObjectId) -> Result<Vec<Object>, PdfError> {
        let contents = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(obj) => obj.clone(),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(id) => match self.doc.get_object(id)? {
                Object::Array(items) => Ok(items.clone()),
                _ => Ok(vec![Object::Reference(id)]),
            },
            Object::Array(items) => Ok(items),
            Object::Stream(stream) => {
                let id = self.doc.add_object(stream);
                Ok(vec![Object::Reference(id)])
            }
            Object::Null => Ok(Vec::new()),
            other => Err(PdfError::StructureError(format!(
                "page Contents is neither a stream nor an array: {:?}",
                other
            ))),
        }
    }
}
