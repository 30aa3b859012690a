//! Content stream walk for text and vector paths.
//!
//! This is deliberately small: enough of the text and path operators to
//! locate anchor text and ruled lines, not a renderer. Glyph boxes use a
//! fixed ascent/descent of 0.8/-0.2 em. Widths come from `/Widths`, then
//! the standard 14 metrics for the `/BaseFont`, or `/W` for Type0 fonts.
//! Unknown glyphs fall back to half an em.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use sigstamp_core::{BBox, Ctm, Drawing, DrawingKind, Point, TextLine, TextRun, Word};

use crate::encoding::SimpleEncoding;
use crate::error::BackendError;
use crate::standard_fonts::standard_widths;
use crate::to_unicode::ToUnicode;

const ASCENT: f64 = 0.8;
const DESCENT: f64 = -0.2;
const DEFAULT_GLYPH_WIDTH: f64 = 500.0;
const DEFAULT_CID_WIDTH: f64 = 1000.0;
/// Largest CID accepted from a `/W` array.
const MAX_CID: u32 = 0xFFFF;
/// Horizontal gap that splits a word even without whitespace.
const WORD_GAP: f64 = 3.0;
const MAX_FORM_DEPTH: usize = 8;

/// Maps PDF user space (bottom-left origin) to top-left page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageFrame {
    pub llx: f64,
    pub ury: f64,
}

impl PageFrame {
    fn to_page(self, p: Point) -> Point {
        Point::new(p.x - self.llx, self.ury - p.y)
    }
}

/// Text, words and drawings of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Extraction {
    pub lines: Vec<TextLine>,
    pub words: Vec<Word>,
    pub drawings: Vec<Drawing>,
}

pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|o| resolve(doc, o))
}

fn num(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Decoded stream bytes, decompressing when a filter is present.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

struct Font {
    first_char: u32,
    widths: Vec<f64>,
    standard: Option<&'static [u16; 256]>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    two_byte: bool,
    encoding: Option<SimpleEncoding>,
    to_unicode: Option<ToUnicode>,
}

impl Font {
    fn load(doc: &Document, dict: &Dictionary) -> Self {
        let two_byte = dict_entry(doc, dict, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");
        let to_unicode = dict_entry(doc, dict, b"ToUnicode")
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| stream_bytes(s).ok())
            .map(|bytes| ToUnicode::parse(&bytes));

        if two_byte {
            let descendant = dict_entry(doc, dict, b"DescendantFonts")
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(|o| resolve(doc, o).as_dict().ok());
            let default_width = descendant
                .and_then(|d| dict_entry(doc, d, b"DW"))
                .and_then(num)
                .unwrap_or(DEFAULT_CID_WIDTH);
            let cid_widths = descendant
                .and_then(|d| dict_entry(doc, d, b"W"))
                .and_then(|o| o.as_array().ok())
                .map(|w| parse_cid_widths(doc, w))
                .unwrap_or_default();
            return Self {
                first_char: 0,
                widths: Vec::new(),
                standard: None,
                cid_widths,
                default_width,
                two_byte,
                encoding: None,
                to_unicode,
            };
        }

        let first_char = dict_entry(doc, dict, b"FirstChar").and_then(num).unwrap_or(0.0) as u32;
        let widths = dict_entry(doc, dict, b"Widths")
            .and_then(|o| o.as_array().ok())
            .map(|a| a.iter().map(|w| num(resolve(doc, w)).unwrap_or(0.0)).collect())
            .unwrap_or_default();
        let standard = dict_entry(doc, dict, b"BaseFont")
            .and_then(|o| o.as_name().ok())
            .and_then(standard_widths);
        Self {
            first_char,
            widths,
            standard,
            cid_widths: HashMap::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
            two_byte,
            encoding: Some(SimpleEncoding::from_font(doc, dict)),
            to_unicode,
        }
    }

    /// Glyph width in thousandths of an em.
    fn width(&self, code: u32) -> f64 {
        if self.two_byte {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .or_else(|| {
                self.standard
                    .and_then(|table| table.get(code as usize))
                    .map(|w| f64::from(*w))
                    .filter(|w| *w > 0.0)
            })
            .unwrap_or(self.default_width)
    }

    fn decode(&self, bytes: &[u8]) -> Vec<(u32, String)> {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };
        codes
            .into_iter()
            .map(|code| {
                let text = match self.to_unicode.as_ref().and_then(|m| m.get(code)) {
                    Some(t) => t.to_string(),
                    None => {
                        let ch = match (&self.encoding, u8::try_from(code)) {
                            (Some(encoding), Ok(byte)) => encoding.decode(byte),
                            _ => char::from_u32(code),
                        };
                        ch.unwrap_or('\u{FFFD}').to_string()
                    }
                };
                (code, text)
            })
            .collect()
    }
}

fn cid(value: f64) -> Option<u32> {
    (0.0..=f64::from(MAX_CID)).contains(&value).then_some(value as u32)
}

/// `/W` array: `c [w1 w2 ...]` and `c_first c_last w` forms.
///
/// CIDs past [`MAX_CID`] are dropped, ranges are capped there, and a range
/// whose end precedes its start is skipped.
fn parse_cid_widths(doc: &Document, w: &[Object]) -> HashMap<u32, f64> {
    let mut out = HashMap::new();
    let items: Vec<&Object> = w.iter().map(|o| resolve(doc, o)).collect();
    let mut i = 0;
    while i + 1 < items.len() {
        let Some(first) = num(items[i]) else {
            i += 1;
            continue;
        };
        if let Ok(list) = items[i + 1].as_array() {
            if let Some(start) = cid(first) {
                for (code, width) in (start..=MAX_CID).zip(list) {
                    if let Some(width) = num(resolve(doc, width)) {
                        out.insert(code, width);
                    }
                }
            }
            i += 2;
        } else if let (Some(last), Some(width)) = (num(items[i + 1]), items.get(i + 2).and_then(|o| num(o))) {
            if let Some(start) = cid(first).filter(|_| last >= first) {
                let end = last.min(f64::from(MAX_CID)) as u32;
                for code in start..=end {
                    out.insert(code, width);
                }
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    out
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Ctm,
    font: Option<Rc<Font>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Ctm::identity(),
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Glyph {
    text: String,
    bbox: BBox,
}

#[derive(Debug, Clone)]
struct Run {
    glyphs: Vec<Glyph>,
    baseline: f64,
    size: f64,
}

impl Run {
    fn x0(&self) -> f64 {
        self.glyphs.first().map_or(0.0, |g| g.bbox.x0)
    }

    fn to_text_run(&self) -> Option<TextRun> {
        let bbox = BBox::union_all(self.glyphs.iter().map(|g| &g.bbox))?;
        Some(TextRun::new(self.glyphs.iter().map(|g| g.text.as_str()).collect::<String>(), bbox))
    }
}

#[derive(Default)]
struct SubPath {
    points: Vec<Point>,
    curve: bool,
    rect: bool,
}

impl SubPath {
    fn into_drawing(self) -> Option<Drawing> {
        if self.points.len() < 2 {
            return None;
        }
        let kind = if self.rect {
            DrawingKind::Rect
        } else if self.curve {
            DrawingKind::Curve
        } else if self.points.len() == 2 {
            DrawingKind::Line
        } else {
            DrawingKind::Polyline
        };
        Some(Drawing::new(kind, self.points))
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    frame: PageFrame,
    fonts: HashMap<ObjectId, Rc<Font>>,
    stack: Vec<GraphicsState>,
    gs: GraphicsState,
    tm: Ctm,
    tlm: Ctm,
    runs: Vec<Run>,
    subpaths: Vec<SubPath>,
    current: Option<SubPath>,
    drawings: Vec<Drawing>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, frame: PageFrame) -> Self {
        Self {
            doc,
            frame,
            fonts: HashMap::new(),
            stack: Vec::new(),
            gs: GraphicsState::default(),
            tm: Ctm::identity(),
            tlm: Ctm::identity(),
            runs: Vec::new(),
            subpaths: Vec::new(),
            current: None,
            drawings: Vec::new(),
        }
    }

    fn run(&mut self, content: &[u8], resources: Option<&'a Dictionary>, depth: usize) -> Result<(), BackendError> {
        let content = Content::decode(content)
            .map_err(|e| BackendError::Parse(format!("failed to decode content stream: {e}")))?;

        for op in &content.operations {
            let args: Vec<f64> = op.operands.iter().filter_map(num).collect();
            match (op.operator.as_str(), args.as_slice()) {
                ("q", _) => self.stack.push(self.gs.clone()),
                ("Q", _) => {
                    if let Some(gs) = self.stack.pop() {
                        self.gs = gs;
                    }
                }
                ("cm", &[a, b, c, d, e, f]) => self.gs.ctm = Ctm::new(a, b, c, d, e, f).concat(&self.gs.ctm),

                ("BT", _) => {
                    self.tm = Ctm::identity();
                    self.tlm = Ctm::identity();
                }
                ("Tf", &[size]) => {
                    self.gs.font_size = size;
                    self.gs.font = op
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .and_then(|name| self.font(resources, name));
                }
                ("Tc", &[v]) => self.gs.char_spacing = v,
                ("Tw", &[v]) => self.gs.word_spacing = v,
                ("Tz", &[v]) => self.gs.h_scale = v / 100.0,
                ("TL", &[v]) => self.gs.leading = v,
                ("Ts", &[v]) => self.gs.rise = v,
                ("Td", &[tx, ty]) => self.move_line(tx, ty),
                ("TD", &[tx, ty]) => {
                    self.gs.leading = -ty;
                    self.move_line(tx, ty);
                }
                ("Tm", &[a, b, c, d, e, f]) => {
                    self.tm = Ctm::new(a, b, c, d, e, f);
                    self.tlm = self.tm;
                }
                ("T*", _) => self.move_line(0.0, -self.gs.leading),
                ("Tj", _) => self.show_operands(&op.operands),
                ("'", _) => {
                    self.move_line(0.0, -self.gs.leading);
                    self.show_operands(&op.operands);
                }
                ("\"", _) => {
                    if let [aw, ac, ..] = args.as_slice() {
                        self.gs.word_spacing = *aw;
                        self.gs.char_spacing = *ac;
                    }
                    self.move_line(0.0, -self.gs.leading);
                    self.show_operands(&op.operands);
                }
                ("TJ", _) => self.show_operands(&op.operands),

                ("m", &[x, y]) => {
                    self.flush_subpath();
                    let p = self.user_to_page(x, y);
                    self.current = Some(SubPath {
                        points: vec![p],
                        ..SubPath::default()
                    });
                }
                ("l", &[x, y]) => self.path_to(x, y, false),
                ("c", &[_, _, _, _, x, y]) | ("v", &[_, _, x, y]) | ("y", &[_, _, x, y]) => self.path_to(x, y, true),
                ("h", _) => self.close_subpath(),
                ("re", &[x, y, w, h]) => {
                    self.flush_subpath();
                    let points = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)]
                        .into_iter()
                        .map(|(px, py)| self.user_to_page(px, py))
                        .collect();
                    self.subpaths.push(SubPath {
                        points,
                        rect: true,
                        ..SubPath::default()
                    });
                }
                ("s" | "b" | "b*", _) => {
                    self.close_subpath();
                    self.paint();
                }
                ("S" | "f" | "F" | "f*" | "B" | "B*", _) => self.paint(),
                ("n", _) => {
                    self.current = None;
                    self.subpaths.clear();
                }

                ("Do", _) if depth < MAX_FORM_DEPTH => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.form_xobject(resources, name, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn font(&mut self, resources: Option<&'a Dictionary>, name: &[u8]) -> Option<Rc<Font>> {
        let fonts = dict_entry(self.doc, resources?, b"Font")?.as_dict().ok()?;
        let entry = fonts.get(name).ok()?;
        if let Object::Reference(id) = entry {
            if let Some(font) = self.fonts.get(id) {
                return Some(Rc::clone(font));
            }
            let font = Rc::new(Font::load(self.doc, self.doc.get_object(*id).ok()?.as_dict().ok()?));
            self.fonts.insert(*id, Rc::clone(&font));
            return Some(font);
        }
        Some(Rc::new(Font::load(self.doc, entry.as_dict().ok()?)))
    }

    fn form_xobject(&mut self, resources: Option<&'a Dictionary>, name: &[u8], depth: usize) -> Result<(), BackendError> {
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| dict_entry(doc, r, b"XObject"))
            .and_then(|o| o.as_dict().ok())
            .and_then(|x| dict_entry(doc, x, name))
            .and_then(|o| o.as_stream().ok())
        else {
            return Ok(());
        };
        let is_form = dict_entry(doc, &stream.dict, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Form");
        if !is_form {
            return Ok(());
        }

        let matrix = dict_entry(doc, &stream.dict, b"Matrix")
            .and_then(|o| o.as_array().ok())
            .map(|a| a.iter().filter_map(num).collect::<Vec<_>>())
            .and_then(|m| match m.as_slice() {
                &[a, b, c, d, e, f] => Some(Ctm::new(a, b, c, d, e, f)),
                _ => None,
            })
            .unwrap_or_default();
        let form_resources = dict_entry(doc, &stream.dict, b"Resources")
            .and_then(|o| o.as_dict().ok())
            .or(resources);
        let bytes = stream_bytes(stream)?;

        self.stack.push(self.gs.clone());
        self.gs.ctm = matrix.concat(&self.gs.ctm);
        let (tm, tlm) = (self.tm, self.tlm);
        let result = self.run(&bytes, form_resources, depth + 1);
        self.tm = tm;
        self.tlm = tlm;
        if let Some(gs) = self.stack.pop() {
            self.gs = gs;
        }
        result
    }

    fn user_to_page(&self, x: f64, y: f64) -> Point {
        self.frame.to_page(self.gs.ctm.transform_point(Point::new(x, y)))
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty).concat(&self.tlm);
        self.tm = self.tlm;
    }

    fn advance(&mut self, tx: f64) {
        self.tm = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).concat(&self.tm);
    }

    fn show_operands(&mut self, operands: &[Object]) {
        let mut glyphs = Vec::new();
        let trm = self.tm.concat(&self.gs.ctm);
        let baseline = self.frame.to_page(trm.transform_point(Point::new(0.0, self.gs.rise))).y;
        let size = self.gs.font_size * trm.c.hypot(trm.d);

        for operand in operands {
            match operand {
                Object::String(bytes, _) => self.show_bytes(bytes, &mut glyphs),
                Object::Array(items) => {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show_bytes(bytes, &mut glyphs),
                            other => {
                                if let Some(adjust) = num(other) {
                                    self.advance(-adjust / 1000.0 * self.gs.font_size * self.gs.h_scale);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if !glyphs.is_empty() {
            self.runs.push(Run { glyphs, baseline, size });
        }
    }

    fn show_bytes(&mut self, bytes: &[u8], glyphs: &mut Vec<Glyph>) {
        let Some(font) = self.gs.font.clone() else {
            return;
        };
        let gs = &self.gs;
        let (fs, th, rise) = (gs.font_size, gs.h_scale, gs.rise);
        for (code, text) in font.decode(bytes) {
            let w0 = font.width(code) / 1000.0;
            let trm = self.tm.concat(&self.gs.ctm);
            let corners = [
                (0.0, DESCENT * fs + rise),
                (w0 * fs * th, DESCENT * fs + rise),
                (0.0, ASCENT * fs + rise),
                (w0 * fs * th, ASCENT * fs + rise),
            ];
            let points: Vec<Point> = corners
                .iter()
                .map(|&(x, y)| self.frame.to_page(trm.transform_point(Point::new(x, y))))
                .collect();
            let bbox = points
                .iter()
                .skip(1)
                .fold(BBox::new(points[0].x, points[0].y, points[0].x, points[0].y), |b, p| {
                    b.union(&BBox::new(p.x, p.y, p.x, p.y))
                });
            glyphs.push(Glyph { text, bbox });

            let word_spacing = if !font.two_byte && code == 32 {
                self.gs.word_spacing
            } else {
                0.0
            };
            self.advance((w0 * fs + self.gs.char_spacing + word_spacing) * th);
        }
    }

    fn path_to(&mut self, x: f64, y: f64, curve: bool) {
        let p = self.user_to_page(x, y);
        if let Some(sub) = self.current.as_mut() {
            sub.points.push(p);
            sub.curve |= curve;
        }
    }

    fn close_subpath(&mut self) {
        if let Some(sub) = self.current.as_mut() {
            if let (Some(first), Some(last)) = (sub.points.first().copied(), sub.points.last().copied()) {
                if sub.points.len() > 1 && first != last {
                    sub.points.push(first);
                }
            }
        }
    }

    fn flush_subpath(&mut self) {
        if let Some(sub) = self.current.take() {
            self.subpaths.push(sub);
        }
    }

    fn paint(&mut self) {
        self.flush_subpath();
        let painted = std::mem::take(&mut self.subpaths);
        self.drawings.extend(painted.into_iter().filter_map(SubPath::into_drawing));
    }
}

/// Group runs into lines: a run continues the line while its baseline stays
/// within half a font size and it does not start left of the previous run.
fn group_lines(runs: Vec<Run>) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = Vec::new();
    for run in runs {
        let continues = lines.last().and_then(|l| l.last()).is_some_and(|prev| {
            let tolerance = prev.size.max(run.size) / 2.0;
            (run.baseline - prev.baseline).abs() <= tolerance && run.x0() >= prev.x0()
        });
        match lines.last_mut() {
            Some(line) if continues => line.push(run),
            _ => lines.push(vec![run]),
        }
    }
    lines
}

fn words_of_line(line: &[Run], out: &mut Vec<Word>) {
    let mut text = String::new();
    let mut bbox: Option<BBox> = None;
    let flush = |text: &mut String, bbox: &mut Option<BBox>, out: &mut Vec<Word>| {
        if let Some(b) = bbox.take() {
            out.push(Word::new(std::mem::take(text), b));
        }
        text.clear();
    };

    for glyph in line.iter().flat_map(|r| &r.glyphs) {
        if glyph.text.trim().is_empty() {
            flush(&mut text, &mut bbox, out);
            continue;
        }
        if bbox.is_some_and(|b| glyph.bbox.x0 - b.x1 > WORD_GAP) {
            flush(&mut text, &mut bbox, out);
        }
        text.push_str(&glyph.text);
        bbox = Some(bbox.map_or(glyph.bbox, |b| b.union(&glyph.bbox)));
    }
    flush(&mut text, &mut bbox, out);
}

/// Walk a page's content and collect text lines, words and drawings.
pub(crate) fn extract(
    doc: &Document,
    content: &[u8],
    resources: Option<&Dictionary>,
    frame: PageFrame,
) -> Result<Extraction, BackendError> {
    let mut interp = Interpreter::new(doc, frame);
    interp.run(content, resources, 0)?;

    let grouped = group_lines(interp.runs);
    let mut words = Vec::new();
    for line in &grouped {
        words_of_line(line, &mut words);
    }
    let lines = grouped
        .iter()
        .map(|runs| TextLine::new(runs.iter().filter_map(Run::to_text_run).collect()))
        .collect();

    Ok(Extraction {
        lines,
        words,
        drawings: interp.drawings,
    })
}
