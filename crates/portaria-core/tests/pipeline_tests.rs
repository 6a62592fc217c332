//! End-to-end pipeline tests
//!
//! Runs full requests against in-memory and CSV sources and inspects the
//! produced DOCX.

use std::io::Cursor;

use portaria_core::{
    DocumentTemplate, Engine, FilterConfig, GenerationRequest, GroupColumn, HeaderRequest,
    Pipeline, PipelineError, RemovedColumns, ShapeViolation, DEFAULT_GROUP,
};
use portaria_data::{CsvProvider, MemoryProvider, SheetLayout};
use portaria_ooxml::OoxmlArchive;

/// The sheet used throughout: a title block, two blank rows, the header at
/// row 4 and two data rows
fn sample_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["PORTARIA CCM"],
        vec![],
        vec![],
        vec!["Nome", "", "Escola", "Status"],
        vec!["Ana", "", "A", "FALSE"],
        vec!["Bia", "", "B", "ATIVO"],
    ]
}

fn pipeline_with(rows: Vec<Vec<&str>>) -> Pipeline {
    let provider = MemoryProvider::new().with_table("planilha", "Escolas", rows);
    Pipeline::new(
        Box::new(provider),
        DocumentTemplate::default(),
        SheetLayout::default(),
    )
}

fn request(group: &str, terms: Option<&str>, removed: Option<&str>) -> GenerationRequest {
    GenerationRequest {
        link: "planilha".into(),
        tab: "Escolas".into(),
        group_column: group.into(),
        exclusion_terms: terms.map(String::from),
        removed_columns: removed.map(String::from),
    }
}

fn document_xml(docx: &[u8]) -> String {
    let archive = OoxmlArchive::from_reader(Cursor::new(docx)).unwrap();
    archive.get_string("word/document.xml").unwrap().unwrap()
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

#[test]
fn scenario_a_retained_columns() {
    let engine = Engine::new(
        FilterConfig::default(),
        RemovedColumns::parse(Some("1")).unwrap(),
        GroupColumn::parse("A").unwrap(),
    );
    let specs = engine.column_specs(&strings(&["Nome", "", "Escola", "Status"]));
    let pairs: Vec<(usize, &str)> = specs.iter().map(|c| (c.index, c.name.as_str())).collect();
    assert_eq!(pairs, vec![(0, "Nome"), (2, "Escola"), (3, "Status")]);
}

#[test]
fn scenario_b_exclusion_keeps_only_bia() {
    let pipeline = pipeline_with(sample_rows());
    let doc = pipeline
        .generate(&request("A", Some("FALSE"), Some("1")))
        .unwrap();

    assert_eq!(doc.stats.excluded, 1);
    assert_eq!(doc.stats.kept, 1);
    let xml = document_xml(&doc.bytes);
    assert!(xml.contains(">Bia<"));
    assert!(!xml.contains(">Ana<"));
}

#[test]
fn scenario_c_group_by_letter() {
    let pipeline = pipeline_with(sample_rows());
    let doc = pipeline
        .generate(&request("C", Some("FALSE"), Some("1")))
        .unwrap();

    assert_eq!(doc.groups, 1);
    let xml = document_xml(&doc.bytes);
    assert!(xml.contains("ANEXO — B"));
    assert!(!xml.contains("ANEXO — A"));
    // Header row plus one projection: Bia, B, ATIVO
    for cell in [">Nome<", ">Escola<", ">Status<", ">Bia<", ">B<", ">ATIVO<"] {
        assert!(xml.contains(cell), "missing {}", cell);
    }
    assert_eq!(xml.matches("<w:tr>").count(), 2);
}

#[test]
fn scenario_d_short_sheet() {
    let pipeline = pipeline_with(vec![vec!["PORTARIA"], vec!["x", "y"], vec![]]);
    let err = pipeline.try_generate(&request("A", None, None)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::ShapeViolation(ShapeViolation::SheetTooShort {
            rows: 3,
            header_row: 4
        })
    ));

    let payload = pipeline.generate(&request("A", None, None)).unwrap_err();
    assert_eq!(payload.status, 422);
}

#[test]
fn scenario_e_everything_filtered() {
    let pipeline = pipeline_with(sample_rows());
    let payload = pipeline
        .generate(&request("C", Some("false, ativo"), None))
        .unwrap_err();

    assert_eq!(payload.status, 422);
    assert!(payload.error.contains("FALSE"));
    assert!(payload.error.contains("ATIVO"));
}

#[test]
fn blank_group_cell_lands_in_default_group() {
    let mut rows = sample_rows();
    rows.push(vec!["Caio", "", "  ", "ATIVO"]);
    let pipeline = pipeline_with(rows);

    let doc = pipeline.generate(&request("C", None, None)).unwrap();
    assert_eq!(doc.groups, 3);
    let xml = document_xml(&doc.bytes);
    assert!(xml.contains(&format!("ANEXO — {}", DEFAULT_GROUP)));
}

#[test]
fn identical_requests_yield_identical_bytes() {
    let pipeline = pipeline_with(sample_rows());
    let req = request("C", None, Some("1"));
    let first = pipeline.generate(&req).unwrap();
    let second = pipeline.generate(&req).unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn missing_fields_are_input_errors() {
    let pipeline = pipeline_with(sample_rows());

    let mut req = request("", None, None);
    assert_eq!(pipeline.generate(&req).unwrap_err().status, 400);

    req = request("1", None, None);
    assert_eq!(pipeline.generate(&req).unwrap_err().status, 400);

    req = request("A", None, Some("um"));
    assert_eq!(pipeline.generate(&req).unwrap_err().status, 400);
}

#[test]
fn column_listing_uses_index_pipe_name() {
    let pipeline = pipeline_with(sample_rows());
    let listing = pipeline
        .columns(&HeaderRequest {
            link: "planilha".into(),
            tab: "Escolas".into(),
        })
        .unwrap();
    assert_eq!(listing.columns, vec!["0|Nome", "2|Escola", "3|Status"]);

    let json = serde_json::to_string(&listing).unwrap();
    assert_eq!(json, r#"{"columns":["0|Nome","2|Escola","3|Status"]}"#);
}

#[test]
fn column_listing_short_sheet() {
    let pipeline = pipeline_with(vec![vec!["PORTARIA"]]);
    let payload = pipeline
        .columns(&HeaderRequest {
            link: "planilha".into(),
            tab: "Escolas".into(),
        })
        .unwrap_err();
    assert_eq!(payload.status, 422);
}

#[test]
fn csv_source_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("escolas.csv");
    std::fs::write(
        &path,
        "PORTARIA CCM,,,\n,,,\n,,,\nNome,,Escola,Status\nAna,,A,FALSE\nBia,,B,ATIVO\nCaio,,B,ATIVO\n",
    )
    .unwrap();

    let pipeline = Pipeline::new(
        Box::new(CsvProvider::default()),
        DocumentTemplate::default(),
        SheetLayout::default(),
    );
    let doc = pipeline
        .generate(&GenerationRequest {
            link: path.display().to_string(),
            tab: "ignored".into(),
            group_column: "C".into(),
            exclusion_terms: Some("false".into()),
            removed_columns: Some("1".into()),
        })
        .unwrap();

    assert_eq!(doc.groups, 1);
    assert_eq!(doc.stats.kept, 2);
    let xml = document_xml(&doc.bytes);
    assert!(xml.contains(">Caio<"));
}

#[test]
fn custom_template_text_and_label() {
    let template = DocumentTemplate::from_toml(
        r#"
title = "Portaria 7"

[annex]
label = "Relação {number}: {key}"

[[preamble]]
role = "title"
text = "PORTARIA Nº 7/2024"
"#,
    )
    .unwrap();
    let provider = MemoryProvider::new().with_table("planilha", "Escolas", sample_rows());
    let pipeline = Pipeline::new(Box::new(provider), template, SheetLayout::default());

    let doc = pipeline.generate(&request("C", None, None)).unwrap();
    let xml = document_xml(&doc.bytes);
    assert!(xml.contains("PORTARIA Nº 7/2024"));
    assert!(xml.contains("Relação 1: A"));
    assert!(xml.contains("Relação 2: B"));

    let archive = OoxmlArchive::from_reader(Cursor::new(&doc.bytes)).unwrap();
    let core = archive.get_string("docProps/core.xml").unwrap().unwrap();
    assert!(core.contains("<dc:title>Portaria 7</dc:title>"));
}

#[test]
fn header_offset_is_configurable() {
    let layout = SheetLayout {
        header_row: 1,
        ..Default::default()
    };
    let provider = MemoryProvider::new()
        .with_layout(layout.clone())
        .with_table("planilha", "Escolas", vec![vec!["Nome", "Escola"], vec!["Ana", "A"]]);
    let pipeline = Pipeline::new(Box::new(provider), DocumentTemplate::default(), layout);

    let doc = pipeline.generate(&request("B", None, None)).unwrap();
    assert_eq!(doc.groups, 1);
}
