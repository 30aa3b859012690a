//! Shared fixtures for batch integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{Object, Stream, dictionary};

/// Build a Letter-sized PDF with one page per content string.
///
/// Every page gets Helvetica as `/F1`.
pub fn write_pdf(path: &Path, contents: &[&str]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

/// Content string showing `text` at PDF point (x, y).
pub fn text_at(text: &str, x: f64, y: f64) -> String {
    format!("BT /F1 12 Tf {x} {y} Td ({text}) Tj ET\n")
}

/// Content string stroking a horizontal rule from x0 to x1 at PDF y.
pub fn rule_at(x0: f64, x1: f64, y: f64) -> String {
    format!("{x0} {y} m {x1} {y} l S\n")
}

/// Scratch workspace with `input/`, a signature PNG and a config file.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("input")).unwrap();
        let mut sig = image::RgbaImage::new(200, 100);
        for pixel in sig.pixels_mut() {
            *pixel = image::Rgba([0, 0, 128, 255]);
        }
        sig.save(dir.path().join("sig.png")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input(&self, name: &str) -> PathBuf {
        self.root().join("input").join(name)
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.root().join("output").join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    /// Config YAML rooted in this workspace, followed by `extra` lines.
    pub fn config_yaml(&self, extra: &str) -> String {
        let root = self.root().display();
        format!(
            "signature:\n  path: {root}/sig.png\ninput_dir: {root}/input\noutput_dir: {root}/output\noutlog: {root}/output/placement_log.csv\npreviews_dir: {root}/previews\n{extra}"
        )
    }
}
