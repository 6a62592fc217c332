//! Document composer
//!
//! Builds the `portaria_ast::Document` for one request: the template's
//! preamble, a section break, then one labelled table per group.

use portaria_ast::{
    Block, BreakType, ColumnSpec as GridColumn, Document, DocumentMeta, Inline, Paragraph,
    ParagraphRole, Table, TableRow,
};

use crate::engine::{ColumnSpec, Groups};
use crate::error::{PipelineError, Result};
use crate::template::DocumentTemplate;

/// Assembles documents from engine output and a template
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    template: &'a DocumentTemplate,
}

impl<'a> Composer<'a> {
    pub fn new(template: &'a DocumentTemplate) -> Self {
        Self { template }
    }

    /// Build the full document
    pub fn compose(&self, columns: &[ColumnSpec], groups: &Groups) -> Result<Document> {
        let mut doc = Document {
            metadata: DocumentMeta {
                title: Some(self.template.title.clone()),
                font: self.template.font.clone(),
                page: self.template.annex_page.clone(),
            },
            blocks: Vec::new(),
        };

        for block in &self.template.preamble {
            doc.push(Block::Paragraph(self.paragraph(block.role, &block.text)));
        }
        doc.push(Block::Break(BreakType::Section(
            self.template.preamble_page.clone(),
        )));

        for (i, group) in groups.iter().enumerate() {
            let label = self.template.annex.label_for(&group.key, i + 1);
            doc.push(Block::Paragraph(
                self.paragraph(ParagraphRole::AnnexLabel, &label),
            ));
            doc.push(Block::Table(self.annex_table(&group.key, columns, &group.rows)?));
        }

        Ok(doc)
    }

    /// A styled paragraph; newlines in the text become line breaks
    fn paragraph(&self, role: ParagraphRole, text: &str) -> Paragraph {
        let style = self.template.styles.for_role(role);

        let mut inlines = Vec::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                inlines.push(Inline::Break);
            }
            if !line.is_empty() {
                inlines.push(Inline::text(line));
            }
        }

        Paragraph {
            inlines,
            role,
            format: style.format(),
            style_id: style.style_id.clone(),
        }
    }

    /// Header row of column names plus one row per projection
    fn annex_table(
        &self,
        key: &str,
        columns: &[ColumnSpec],
        projections: &[Vec<String>],
    ) -> Result<Table> {
        let annex = &self.template.annex;

        let mut rows = Vec::with_capacity(projections.len() + 1);
        rows.push(TableRow::from_texts(
            columns.iter().map(|c| c.name.as_str()),
            true,
        ));
        rows.extend(
            projections
                .iter()
                .map(|p| TableRow::from_texts(p.iter().map(String::as_str), false)),
        );

        let table = Table {
            rows,
            style_id: annex.table_style.clone(),
            columns: vec![GridColumn::default(); columns.len()],
            font_size_pt: annex.font_size_pt,
            header_fill: annex.header_fill.clone(),
        };

        if let Some(row) = table.first_ragged_row() {
            return Err(PipelineError::CompositionFailure(format!(
                "Annex '{}' row {} has {} cell(s), expected {}",
                key,
                row,
                table.rows[row].cells.len(),
                columns.len()
            )));
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PreambleBlock;
    use portaria_ast::Alignment;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec { index: 0, name: "Nome".into() },
            ColumnSpec { index: 2, name: "Escola".into() },
        ]
    }

    fn groups() -> Groups {
        let mut groups = Groups::new();
        groups.push("A".into(), vec!["Ana".into(), "A".into()]);
        groups.push("B".into(), vec!["Bia".into(), "B".into()]);
        groups.push("A".into(), vec!["Caio".into(), "A".into()]);
        groups
    }

    #[test]
    fn test_compose_layout() {
        let template = DocumentTemplate::default();
        let doc = Composer::new(&template).compose(&columns(), &groups()).unwrap();

        let preamble = template.preamble.len();
        assert!(matches!(doc.blocks[preamble], Block::Break(BreakType::Section(_))));
        // preamble + break + (label, table) per group
        assert_eq!(doc.len(), preamble + 1 + 4);
        assert_eq!(doc.metadata.title.as_deref(), Some("Portaria CCM"));

        match &doc.blocks[preamble + 1] {
            Block::Paragraph(p) => {
                assert_eq!(p.role, ParagraphRole::AnnexLabel);
                assert_eq!(p.plain_text(), "ANEXO — A");
                assert!(p.format.bold);
            }
            other => panic!("expected annex label, got {other:?}"),
        }
    }

    #[test]
    fn test_tables_have_header_and_rows() {
        let template = DocumentTemplate::default();
        let doc = Composer::new(&template).compose(&columns(), &groups()).unwrap();
        let tables: Vec<&Table> = doc.tables().collect();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 3);
        assert!(tables[0].rows[0].is_header);
        assert_eq!(tables[0].rows[0].cells[1].plain_text(), "Escola");
        assert_eq!(tables[0].rows[2].cells[0].plain_text(), "Caio");
        assert_eq!(tables[1].column_count(), 2);
        assert_eq!(tables[1].style_id.as_deref(), Some("TableGrid"));
    }

    #[test]
    fn test_ragged_projection_is_composition_failure() {
        let template = DocumentTemplate::default();
        let mut groups = Groups::new();
        groups.push("A".into(), vec!["Ana".into()]);

        let err = Composer::new(&template).compose(&columns(), &groups).unwrap_err();
        assert_eq!(err.status(), 500);
        assert!(err.to_string().contains("Annex 'A' row 1"));
    }

    #[test]
    fn test_preamble_styling_comes_from_template() {
        let mut template = DocumentTemplate::default();
        template.preamble = vec![PreambleBlock::new(ParagraphRole::Signature, "Diretora\nEscola")];
        template.styles.signature.align = Some(Alignment::Right);

        let doc = Composer::new(&template).compose(&columns(), &groups()).unwrap();
        match &doc.blocks[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.format.align, Some(Alignment::Right));
                assert_eq!(
                    p.inlines,
                    vec![Inline::text("Diretora"), Inline::Break, Inline::text("Escola")]
                );
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_default_label_format() {
        let template = DocumentTemplate::default();
        assert_eq!(template.annex.label, "ANEXO — {key}");

        let mut groups = Groups::new();
        groups.push("Escola A".into(), vec!["Ana".into(), "A".into()]);
        let doc = Composer::new(&template).compose(&columns(), &groups).unwrap();
        match doc.blocks.iter().rev().nth(1) {
            Some(Block::Paragraph(p)) => assert_eq!(p.plain_text(), "ANEXO — Escola A"),
            other => panic!("expected annex label, got {other:?}"),
        }

        let mut english = DocumentTemplate::default();
        english.annex.label = "ANNEX — {key}".into();
        let doc = Composer::new(&english).compose(&columns(), &groups).unwrap();
        match doc.blocks.iter().rev().nth(1) {
            Some(Block::Paragraph(p)) => assert_eq!(p.plain_text(), "ANNEX — Escola A"),
            other => panic!("expected annex label, got {other:?}"),
        }
    }

    #[test]
    fn test_numbered_labels() {
        let mut template = DocumentTemplate::default();
        template.annex.label = "ANEXO {number} — {key}".into();
        let doc = Composer::new(&template).compose(&columns(), &groups()).unwrap();

        let labels: Vec<String> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) if p.role == ParagraphRole::AnnexLabel => Some(p.plain_text()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["ANEXO 1 — A", "ANEXO 2 — B"]);
    }
}
