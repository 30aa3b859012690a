use std::path::Path;

use assert_cmd::Command;
use lopdf::{Object, Stream, dictionary};
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("sigstamp").unwrap()
}

/// Single-page PDF showing `text`.
fn write_pdf(path: &Path, text: &str) {
    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

/// Workspace with one input PDF, a signature and `config.yaml`.
fn setup(signature: bool) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("input")).unwrap();
    write_pdf(&root.join("input").join("doc.pdf"), "Hello");
    if signature {
        image::RgbaImage::new(40, 20).save(root.join("sig.png")).unwrap();
    }
    let config = format!(
        "signature:\n  path: {r}/sig.png\ninput_dir: {r}/input\noutput_dir: {r}/output\noutlog: {r}/output/placement_log.csv\npreviews_dir: {r}/previews\nx: 50\ny: 60\n",
        r = root.display()
    );
    std::fs::write(root.join("config.yaml"), config).unwrap();
    dir
}

#[test]
fn help_lists_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--manifest"))
        .stdout(predicate::str::contains("--rules"))
        .stdout(predicate::str::contains("--outlog"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn missing_config_exits_with_error() {
    cmd()
        .args(["--config", "/nonexistent/config.yaml", "--yes"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_without_signature_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "input_dir: input\n").unwrap();
    cmd()
        .arg("-c")
        .arg(&config)
        .arg("-y")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("signature.path"));
}

#[test]
fn yes_flag_runs_batch() {
    let dir = setup(true);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .arg("--yes")
        .assert()
        .success()
        .stderr(predicate::str::contains("dry-run:  false"))
        .stderr(predicate::str::contains("1 placement(s)"));

    assert!(root.join("output").join("doc.pdf").exists());
    let log = std::fs::read_to_string(root.join("output").join("placement_log.csv")).unwrap();
    assert!(log.contains("doc.pdf,1,absolute_xy,50.0,60.0,40.0,20.0,0"), "{log}");
}

#[test]
fn declining_prompt_exits_cleanly_without_processing() {
    let dir = setup(true);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Continue? [y/N]"))
        .stderr(predicate::str::contains("Aborted."));

    assert!(!root.join("output").exists());
}

#[test]
fn confirming_prompt_runs_batch() {
    let dir = setup(true);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .write_stdin("y\n")
        .assert()
        .success();

    assert!(root.join("output").join("doc.pdf").exists());
}

#[test]
fn dry_run_flag_writes_previews() {
    let dir = setup(true);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .args(["--dry-run", "-y"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry-run:  true"));

    assert!(root.join("previews").join("doc").join("page-1.pdf").exists());
    assert!(!root.join("output").join("doc.pdf").exists());
}

#[test]
fn outlog_flag_overrides_config() {
    let dir = setup(true);
    let root = dir.path();
    let outlog = root.join("logs").join("placements.csv");
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .arg("--outlog")
        .arg(&outlog)
        .arg("-y")
        .assert()
        .success();

    assert!(outlog.exists());
}

#[test]
fn missing_signature_is_fatal_and_logged() {
    let dir = setup(false);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .arg("-y")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load signature"));

    let errors = std::fs::read_to_string(root.join("output").join("error_log.csv")).unwrap();
    assert!(errors.contains("(global),load_signature"));
    assert!(!root.join("output").join("doc.pdf").exists());
}

#[test]
fn missing_rules_file_is_fatal() {
    let dir = setup(true);
    let root = dir.path();
    cmd()
        .arg("-c")
        .arg(root.join("config.yaml"))
        .args(["--rules", "/nonexistent/rules.yaml", "-y"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exists: false"))
        .stderr(predicate::str::contains("rules file not found"));
}
