use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use eralchemy_core::{
    intermediary_to_dot_string, render_with_engine, resolve_mode, Cardinality, ErColumn, ErTable,
    Error, Intermediary, LayoutEngine, Mode, Relation, Renderer, Result,
};

#[derive(Default)]
struct RecordingEngine {
    calls: RefCell<Vec<(String, PathBuf, String)>>,
}

impl LayoutEngine for RecordingEngine {
    fn render(&self, dot: &str, output: &Path, format: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((dot.to_string(), output.to_path_buf(), format.to_string()));
        Ok(())
    }
}

struct FailingEngine;

impl LayoutEngine for FailingEngine {
    fn render(&self, _dot: &str, _output: &Path, _format: &str) -> Result<()> {
        Err(Error::Layout("boom".to_string()))
    }
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("eralchemy_render_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn sample() -> Intermediary {
    Intermediary::new(
        vec![
            ErTable::new(
                "users",
                vec![
                    ErColumn::new("id", "INTEGER", true),
                    ErColumn::new("name", "VARCHAR(255)", false),
                ],
            ),
            ErTable::new(
                "addresses",
                vec![
                    ErColumn::new("id", "INTEGER", true),
                    ErColumn::new("user_id", "INTEGER", false),
                ],
            ),
        ],
        vec![
            Relation::new(
                "users",
                "addresses",
                Some(Cardinality::ZeroOrMore),
                Some(Cardinality::ZeroOrOne),
            ),
            Relation::new("users", "missing_table", Some(Cardinality::ExactlyOne), None),
        ],
    )
}

#[test]
fn auto_er_matches_explicit_er() {
    let dir = temp_out_dir("er");
    let engine = RecordingEngine::default();
    let auto = dir.join("auto.er");
    let explicit = dir.join("explicit.er");

    render_with_engine(&sample(), &auto, Mode::Auto, &engine).expect("render auto");
    render_with_engine(&sample(), &explicit, Mode::Er, &engine).expect("render explicit");

    let auto_text = fs::read_to_string(&auto).expect("read auto");
    assert_eq!(auto_text, fs::read_to_string(&explicit).expect("read explicit"));
    assert!(auto_text.starts_with("[users]\n"));
    assert!(auto_text.ends_with("users 1-- missing_table\n"));
    assert!(engine.calls.borrow().is_empty());
}

#[test]
fn auto_dot_matches_explicit_dot() {
    let dir = temp_out_dir("dot");
    let engine = RecordingEngine::default();
    let auto = dir.join("auto.dot");
    let explicit = dir.join("explicit.dot");

    render_with_engine(&sample(), &auto, Mode::Auto, &engine).expect("render auto");
    render_with_engine(&sample(), &explicit, Mode::Dot, &engine).expect("render explicit");

    let auto_text = fs::read_to_string(&auto).expect("read auto");
    assert_eq!(auto_text, fs::read_to_string(&explicit).expect("read explicit"));
    assert_eq!(auto_text, intermediary_to_dot_string(&sample()));
    assert!(auto_text.contains("\"users\" -- \"missing_table\""));
}

#[test]
fn other_extensions_route_to_layout_engine() {
    let dir = temp_out_dir("graph");
    let engine = RecordingEngine::default();
    let output = dir.join("diagram.png");

    render_with_engine(&sample(), &output, Mode::Auto, &engine).expect("render graph");

    let calls = engine.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (dot, path, format) = &calls[0];
    assert_eq!(dot, &intermediary_to_dot_string(&sample()));
    assert_eq!(path, &output);
    assert_eq!(format, "png");
    assert!(!output.exists());
}

#[test]
fn rendering_twice_is_byte_identical() {
    let dir = temp_out_dir("idempotent");
    let engine = RecordingEngine::default();

    for name in ["twice.er", "twice.dot"] {
        let output = dir.join(name);
        render_with_engine(&sample(), &output, Mode::Auto, &engine).expect("first render");
        let first = fs::read(&output).expect("read first");
        render_with_engine(&sample(), &output, Mode::Auto, &engine).expect("second render");
        assert_eq!(first, fs::read(&output).expect("read second"));
    }
}

#[test]
fn unsupported_mode_is_rejected_before_rendering() {
    let err = resolve_mode(Path::new("x.er"), "bogus").unwrap_err();
    assert!(matches!(err, Error::UnsupportedMode(ref mode) if mode == "bogus"));
    assert_eq!(resolve_mode(Path::new("x.er"), "auto").expect("auto"), Renderer::Er);
}

#[test]
fn layout_failures_propagate() {
    let dir = temp_out_dir("failing");
    let err = render_with_engine(&sample(), &dir.join("x.svg"), Mode::Auto, &FailingEngine)
        .unwrap_err();
    assert!(matches!(err, Error::Layout(_)));
}

#[test]
fn empty_intermediary_still_writes_framed_dot() {
    let dir = temp_out_dir("empty");
    let output = dir.join("empty.dot");
    render_with_engine(
        &Intermediary::default(),
        &output,
        Mode::Auto,
        &RecordingEngine::default(),
    )
    .expect("render empty");

    let text = fs::read_to_string(&output).expect("read empty");
    assert!(text.starts_with("graph {"));
    assert!(text.ends_with('}'));
}
