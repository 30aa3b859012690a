//! lopdf-based document backend.
//!
//! Implements [`DocumentBackend`] over [lopdf](https://crates.io/crates/lopdf):
//! page geometry from the (inherited) MediaBox, text and drawings from the
//! content stream walk in [`crate::content`], and signature insertion as an
//! image XObject drawn by an appended content stream.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use sigstamp_core::{Ctm, Drawing, PageContent, PlaceError, StampRect, TextLine, Word};
use tracing::debug;

use crate::backend::{DocumentBackend, StampDocument};
use crate::content::{self, Extraction, PageFrame, resolve, stream_bytes};
use crate::error::BackendError;
use crate::signature::SignatureImage;

/// The lopdf-based backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

/// An open PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
    /// Image XObjects already embedded, by signature path.
    images: HashMap<PathBuf, ObjectId>,
    /// Pages whose original content is already wrapped in `q`/`Q`.
    wrapped: HashSet<ObjectId>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    fn embed_image(&mut self, image: &SignatureImage) -> Result<ObjectId, BackendError> {
        if let Some(id) = self.images.get(image.path()) {
            return Ok(*id);
        }
        let (rgb, alpha) = image.split_alpha();
        let (w, h) = (i64::from(image.width()), i64::from(image.height()));

        let smask_id = self.inner.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w,
                "Height" => h,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        ));
        let image_id = self.inner.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w,
                "Height" => h,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
                "SMask" => Object::Reference(smask_id),
            },
            deflate(&rgb)?,
        ));
        self.images.insert(image.path().to_path_buf(), image_id);
        Ok(image_id)
    }

    /// Register `image_id` in the page's XObject resources and return its
    /// name. A page that already references the image keeps its name;
    /// otherwise a fresh `SigStamp{n}` is chosen.
    ///
    /// Inherited or indirect resource dictionaries are copied onto the page
    /// so other pages sharing them are not affected.
    fn register_xobject(&mut self, page_id: ObjectId, image_id: ObjectId) -> Result<String, BackendError> {
        let mut resources = match resolve_inherited(&self.inner, page_id, b"Resources")? {
            Some(obj) => resolve(&self.inner, obj)
                .as_dict()
                .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string()))?
                .clone(),
            None => Dictionary::new(),
        };
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => resolve(&self.inner, obj)
                .as_dict()
                .map_err(|_| BackendError::Parse("/XObject is not a dictionary".to_string()))?
                .clone(),
            Err(_) => Dictionary::new(),
        };

        let registered = xobjects.iter().find_map(|(key, obj)| match obj {
            Object::Reference(id) if *id == image_id => Some(String::from_utf8_lossy(key).into_owned()),
            _ => None,
        });
        if let Some(name) = registered {
            return Ok(name);
        }

        let mut n = 1;
        let name = loop {
            let candidate = format!("SigStamp{n}");
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        };
        xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        page_dict_mut(&mut self.inner, page_id)?.set("Resources", Object::Dictionary(resources));
        Ok(name)
    }

    /// Append `ops` as a new content stream, wrapping the page's existing
    /// content in `q`/`Q` the first time so its graphics state cannot leak.
    fn append_content(&mut self, page_id: ObjectId, ops: String) -> Result<(), BackendError> {
        let existing = page_dict_mut(&mut self.inner, page_id)?.remove(b"Contents");
        let mut contents: Vec<Object> = match existing {
            Some(Object::Reference(id)) => match self.inner.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(items)) => items,
            _ => Vec::new(),
        };

        if self.wrapped.insert(page_id) && !contents.is_empty() {
            let open = self.inner.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            let close = self.inner.add_object(Stream::new(dictionary! {}, b"Q\n".to_vec()));
            contents.insert(0, Object::Reference(open));
            contents.push(Object::Reference(close));
        }
        let stamp = self.inner.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
        contents.push(Object::Reference(stamp));

        page_dict_mut(&mut self.inner, page_id)?.set("Contents", Object::Array(contents));
        Ok(())
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .field("embedded_images", &self.images.len())
            .finish_non_exhaustive()
    }
}

/// A page loaded from a [`LopdfDocument`], content already extracted.
///
/// Extraction failures are kept and reported by each [`PageContent`]
/// accessor, so a page with a broken content stream can still be stamped
/// at a relative or absolute position.
#[derive(Debug, Clone)]
pub struct LopdfPage {
    index: usize,
    width: f64,
    height: f64,
    extracted: Result<Extraction, PlaceError>,
}

impl LopdfPage {
    /// The 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PageContent for LopdfPage {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn text_lines(&self) -> Result<Vec<TextLine>, PlaceError> {
        self.extracted.as_ref().map(|e| e.lines.clone()).map_err(Clone::clone)
    }

    fn words(&self) -> Result<Vec<Word>, PlaceError> {
        self.extracted.as_ref().map(|e| e.words.clone()).map_err(Clone::clone)
    }

    fn drawings(&self) -> Result<Vec<Drawing>, PlaceError> {
        self.extracted.as_ref().map(|e| e.drawings.clone()).map_err(Clone::clone)
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    loop {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

fn page_dict_mut(doc: &mut lopdf::Document, page_id: ObjectId) -> Result<&mut Dictionary, BackendError> {
    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
}

/// MediaBox as `(llx, lly, urx, ury)`, normalised.
fn media_box(doc: &lopdf::Document, page_id: ObjectId) -> Result<(f64, f64, f64, f64), BackendError> {
    let obj = resolve_inherited(doc, page_id, b"MediaBox")?
        .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
    let array = resolve(doc, obj)
        .as_array()
        .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for MediaBox, got {}",
            array.len()
        )));
    }
    let v: Vec<f64> = array
        .iter()
        .map(|o| object_to_f64(resolve(doc, o)))
        .collect::<Result<_, _>>()?;
    Ok((v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])))
}

/// Concatenated content stream bytes of a page.
fn page_content_bytes(doc: &lopdf::Document, page_id: ObjectId) -> Result<Vec<u8>, BackendError> {
    let page = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let refs: Vec<&Object> = match resolve(doc, contents) {
        Object::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut out = Vec::new();
    for item in refs {
        let stream = resolve(doc, item)
            .as_stream()
            .map_err(|e| BackendError::Parse(format!("/Contents item is not a stream: {e}")))?;
        if !out.is_empty() {
            out.push(b'\n');
        }
        out.extend_from_slice(&stream_bytes(stream)?);
    }
    Ok(out)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, BackendError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Image matrix mapping the unit square onto the PDF-space rect
/// `(px, py, w, h)`, with the image turned `rotation` degrees
/// counter-clockwise inside it.
fn image_matrix(px: f64, py: f64, w: f64, h: f64, rotation: i32) -> Result<Ctm, BackendError> {
    Ok(match rotation.rem_euclid(360) {
        0 => Ctm::new(w, 0.0, 0.0, h, px, py),
        90 => Ctm::new(0.0, h, -w, 0.0, px + w, py),
        180 => Ctm::new(-w, 0.0, 0.0, -h, px + w, py + h),
        270 => Ctm::new(0.0, -h, w, 0.0, px, py + h),
        other => {
            return Err(BackendError::Unsupported(format!(
                "rotation {other} is not a multiple of 90 degrees"
            )));
        }
    })
}

/// Number formatting for content streams: at most 4 decimals, no trailing zeros.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn ensure_parent(path: &Path) -> Result<(), BackendError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl DocumentBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn open(&self, path: &Path) -> Result<Self::Document, BackendError> {
        let inner = lopdf::Document::load(path)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Unsupported("encrypted PDF".to_string()));
        }

        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        debug!(path = %path.display(), pages = page_ids.len(), "opened document");
        Ok(LopdfDocument {
            inner,
            page_ids,
            images: HashMap::new(),
            wrapped: HashSet::new(),
        })
    }
}

impl StampDocument for LopdfDocument {
    type Page = LopdfPage;

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn load_page(&self, index: usize) -> Result<Self::Page, BackendError> {
        let page_id = self.page_id(index)?;
        let (llx, lly, urx, ury) = media_box(&self.inner, page_id)?;
        let frame = PageFrame { llx, ury };

        let extracted = page_content_bytes(&self.inner, page_id)
            .and_then(|bytes| {
                let resources = resolve_inherited(&self.inner, page_id, b"Resources")?
                    .and_then(|o| resolve(&self.inner, o).as_dict().ok());
                content::extract(&self.inner, &bytes, resources, frame)
            })
            .map_err(|e| PlaceError::Extraction(e.to_string()));

        Ok(LopdfPage {
            index,
            width: urx - llx,
            height: ury - lly,
            extracted,
        })
    }

    fn insert_image(
        &mut self,
        index: usize,
        rect: StampRect,
        image: &SignatureImage,
        rotation: i32,
    ) -> Result<(), BackendError> {
        let page_id = self.page_id(index)?;
        let (llx, _, _, ury) = media_box(&self.inner, page_id)?;
        let px = llx + rect.x;
        let py = ury - (rect.y + rect.height);
        let m = image_matrix(px, py, rect.width, rect.height, rotation)?;

        let image_id = self.embed_image(image)?;
        let name = self.register_xobject(page_id, image_id)?;
        let ops = format!(
            "q {} {} {} {} {} {} cm /{name} Do Q\n",
            fmt_num(m.a),
            fmt_num(m.b),
            fmt_num(m.c),
            fmt_num(m.d),
            fmt_num(m.e),
            fmt_num(m.f)
        );
        self.append_content(page_id, ops)?;
        debug!(page = index + 1, xobject = %name, "inserted signature image");
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), BackendError> {
        ensure_parent(path)?;
        self.inner
            .save(path)
            .map(|_| ())
            .map_err(|e| BackendError::Parse(format!("failed to save PDF: {e}")))
    }

    fn save_page_preview(&self, index: usize, path: &Path) -> Result<(), BackendError> {
        self.page_id(index)?;
        let keep = index as u32 + 1;
        let others: Vec<u32> = (1..=self.page_ids.len() as u32).filter(|p| *p != keep).collect();

        let mut preview = self.inner.clone();
        preview.delete_pages(&others);
        preview.prune_objects();
        ensure_parent(path)?;
        preview
            .save(path)
            .map(|_| ())
            .map_err(|e| BackendError::Parse(format!("failed to save preview: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigstamp_core::BBox;

    /// Build a PDF with one page per entry; each page shows its text at
    /// (72, 700) and strokes a rule from (72, 100) to (372, 100).
    fn make_pdf(dir: &Path, name: &str, texts: &[&str]) -> PathBuf {
        let mut doc = lopdf::Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for text in texts {
            let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET\n72 100 m 372 100 l S");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
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
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    fn make_signature() -> SignatureImage {
        SignatureImage::from_rgba("sig.png", 2, 1, vec![0, 0, 0, 255, 255, 255, 255, 0]).unwrap()
    }

    fn stamp_ops(doc: &LopdfDocument, index: usize) -> String {
        let page_id = doc.page_ids[index];
        let bytes = page_content_bytes(&doc.inner, page_id).unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn open_reports_pages_and_inherited_media_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One", "Two"]);
        let doc = LopdfBackend.open(&path).unwrap();
        assert_eq!(doc.page_count(), 2);
        let page = doc.load_page(1).unwrap();
        assert_eq!(page.size(), (612.0, 792.0));
        assert_eq!(page.index(), 1);
    }

    #[test]
    fn load_page_extracts_text_and_rule() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["Firma del cliente"]);
        let doc = LopdfBackend.open(&path).unwrap();
        let page = doc.load_page(0).unwrap();

        let lines = page.text_lines().unwrap();
        assert_eq!(lines[0].text(), "Firma del cliente");
        let words = page.words().unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Firma");

        let drawings = page.drawings().unwrap();
        assert_eq!(drawings.len(), 1);
        assert_eq!(drawings[0].points[0].y, 692.0);
    }

    #[test]
    fn out_of_range_page_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One"]);
        let doc = LopdfBackend.open(&path).unwrap();
        assert!(doc.load_page(3).is_err());
    }

    #[test]
    fn open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(LopdfBackend.open(&path).is_err());
    }

    #[test]
    fn insert_image_appends_draw_operators() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One"]);
        let mut doc = LopdfBackend.open(&path).unwrap();
        doc.insert_image(0, StampRect::new(10.0, 20.0, 100.0, 50.0), &make_signature(), 0)
            .unwrap();

        let ops = stamp_ops(&doc, 0);
        assert!(ops.starts_with("q\n"), "{ops}");
        assert!(ops.contains("q 100 0 0 50 10 722 cm /SigStamp1 Do Q"), "{ops}");
    }

    #[test]
    fn insert_image_rotation_matrices() {
        let m = image_matrix(10.0, 20.0, 100.0, 50.0, 90).unwrap();
        assert_eq!(m, Ctm::new(0.0, 50.0, -100.0, 0.0, 110.0, 20.0));
        let m = image_matrix(10.0, 20.0, 100.0, 50.0, -90).unwrap();
        assert_eq!(m, Ctm::new(0.0, -50.0, 100.0, 0.0, 10.0, 70.0));
        let m = image_matrix(10.0, 20.0, 100.0, 50.0, 540).unwrap();
        assert_eq!(m, Ctm::new(-100.0, 0.0, 0.0, -50.0, 110.0, 70.0));
    }

    #[test]
    fn insert_image_rejects_odd_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One"]);
        let mut doc = LopdfBackend.open(&path).unwrap();
        let err = doc
            .insert_image(0, StampRect::new(0.0, 0.0, 10.0, 10.0), &make_signature(), 45)
            .unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }

    #[test]
    fn image_embedded_once_and_named_once_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One", "Two"]);
        let mut doc = LopdfBackend.open(&path).unwrap();
        let sig = make_signature();
        doc.insert_image(0, StampRect::new(0.0, 0.0, 10.0, 10.0), &sig, 0).unwrap();
        doc.insert_image(0, StampRect::new(50.0, 50.0, 10.0, 10.0), &sig, 0).unwrap();
        doc.insert_image(1, StampRect::new(0.0, 0.0, 10.0, 10.0), &sig, 0).unwrap();

        let ops = stamp_ops(&doc, 0);
        assert_eq!(ops.matches("/SigStamp1 Do").count(), 2, "{ops}");
        assert!(!ops.contains("/SigStamp2"), "{ops}");
        assert_eq!(ops.matches("q\n").count(), 1);
        assert!(stamp_ops(&doc, 1).contains("/SigStamp1 Do"));

        let page_id = doc.page_ids[0];
        let resources = doc.inner.get_dictionary(page_id).unwrap().get(b"Resources").unwrap();
        let xobjects = resolve(&doc.inner, resources).as_dict().unwrap().get(b"XObject").unwrap();
        assert_eq!(resolve(&doc.inner, xobjects).as_dict().unwrap().len(), 1);

        let rgb_images = doc
            .inner
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| {
                s.dict
                    .get(b"ColorSpace")
                    .and_then(|c| c.as_name())
                    .is_ok_and(|n| n == b"DeviceRGB")
            })
            .count();
        assert_eq!(rgb_images, 1);
    }

    #[test]
    fn saved_document_reopens_with_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One"]);
        let mut doc = LopdfBackend.open(&path).unwrap();
        doc.insert_image(0, StampRect::new(10.0, 10.0, 20.0, 10.0), &make_signature(), 0)
            .unwrap();
        let out = dir.path().join("out").join("a.pdf");
        doc.save(&out).unwrap();

        let reopened = LopdfBackend.open(&out).unwrap();
        assert_eq!(reopened.page_count(), 1);
        assert!(stamp_ops(&reopened, 0).contains("/SigStamp1 Do"));
        // original text still extractable after wrapping
        let page = reopened.load_page(0).unwrap();
        assert_eq!(page.text_lines().unwrap()[0].text(), "One");
    }

    #[test]
    fn preview_keeps_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_pdf(dir.path(), "a.pdf", &["One", "Two", "Three"]);
        let doc = LopdfBackend.open(&path).unwrap();
        let preview = dir.path().join("previews").join("a").join("page-2.pdf");
        doc.save_page_preview(1, &preview).unwrap();

        let reopened = LopdfBackend.open(&preview).unwrap();
        assert_eq!(reopened.page_count(), 1);
        let page = reopened.load_page(0).unwrap();
        assert_eq!(page.text_lines().unwrap()[0].text(), "Two");
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn broken_content_surfaces_as_extraction_error() {
        let page = LopdfPage {
            index: 0,
            width: 100.0,
            height: 100.0,
            extracted: Err(PlaceError::Extraction("bad stream".to_string())),
        };
        assert_eq!(page.size(), (100.0, 100.0));
        assert!(matches!(page.words(), Err(PlaceError::Extraction(_))));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(fmt_num(1.0 / 3.0), "0.3333");
    }

    #[test]
    fn stamp_rect_maps_to_pdf_space() {
        let rect = StampRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.to_bbox(), BBox::new(10.0, 20.0, 110.0, 70.0));
    }
}
