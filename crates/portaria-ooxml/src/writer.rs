//! DOCX Writer
//!
//! This module writes a `portaria_ast::Document` to DOCX, either as a fresh
//! package or into an existing DOCX/DOTX whose styles, headers and footers are
//! kept.
//!
//! # Example
//!
//! ```ignore
//! use portaria_ooxml::DocxWriter;
//! use portaria_ast::Document;
//!
//! let doc = Document::with_title("Portaria");
//! let bytes = DocxWriter::generate(&doc)?;
//! std::fs::write("Portaria_CCM.docx", bytes)?;
//! ```

use std::io::Cursor;

use portaria_ast::{
    Alignment, Block, BreakType, Document, FormatType, Inline, Orientation, PageSetup, Paragraph,
    Table,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::archive::{
    OoxmlArchive, CONTENT_TYPES_PART, CORE_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, STYLES_PART,
};
use crate::error::{OoxmlError, Result};
use crate::package::{self, DOCUMENT_CONTENT_TYPE, TEMPLATE_CONTENT_TYPE};
use crate::styles::{get_attr, StyleSheet, StyleType};

/// Twentieths of a point per millimetre
const TWIPS_PER_MM: f32 = 1440.0 / 25.4;

/// Header/footer distance from the page edge, in twips (12.5 mm)
const HEADER_FOOTER_TWIPS: u32 = 709;

/// Convert millimetres to twips
pub fn mm_to_twips(mm: f32) -> u32 {
    (mm * TWIPS_PER_MM).round().max(0.0) as u32
}

/// Convert points to half-points (`w:sz`)
pub fn half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(0.0) as u32
}

/// Convert points to twips (`w:spacing`)
pub fn pt_to_twips(pt: f32) -> u32 {
    (pt * 20.0).round().max(0.0) as u32
}

/// Character formatting carried down through nested inlines
#[derive(Debug, Clone, Copy)]
struct RunProps {
    bold: bool,
    italic: bool,
    underline: bool,
    /// Size in half-points
    size: u32,
}

/// DOCX Writer for generating DOCX files from the document model
pub struct DocxWriter {
    /// XML output buffer
    output: String,
    /// Styles of the target package
    styles: StyleSheet,
    /// Escaped font family written on every run
    font_family: String,
    /// Default run size in half-points
    font_size: u32,
    /// Header/footer references re-emitted in every section
    section_refs: Vec<String>,
}

impl DocxWriter {
    fn new(doc: &Document, styles: StyleSheet, section_refs: Vec<String>) -> Self {
        Self {
            output: String::new(),
            styles,
            font_family: escape_xml(&doc.metadata.font.family),
            font_size: half_points(doc.metadata.font.size_pt),
            section_refs,
        }
    }

    /// Generate a self-contained DOCX
    ///
    /// # Returns
    ///
    /// The generated DOCX file as bytes
    pub fn generate(doc: &Document) -> Result<Vec<u8>> {
        let mut archive =
            package::blank_archive(&doc.metadata.font, doc.metadata.title.as_deref());
        let styles = load_styles(&archive)?;

        let mut writer = Self::new(doc, styles, Vec::new());
        let document_xml = writer.generate_document_xml(doc);
        archive.set_string(DOCUMENT_PART, document_xml);

        debug!(blocks = doc.blocks.len(), "Serialized document into blank package");
        archive.to_bytes()
    }

    /// Generate a DOCX into an existing DOCX/DOTX base template
    ///
    /// The template body is replaced; its styles, headers, footers and other
    /// parts are kept. A `.dotx` main part is retyped as a document.
    pub fn generate_with_template(doc: &Document, template: &[u8]) -> Result<Vec<u8>> {
        let mut archive = OoxmlArchive::from_reader(Cursor::new(template))?;
        let styles = load_styles(&archive)?;
        let section_refs = match archive.get(DOCUMENT_PART) {
            Some(xml) => extract_section_references(xml)?,
            None => Vec::new(),
        };

        let mut writer = Self::new(doc, styles, section_refs);
        let document_xml = writer.generate_document_xml(doc);
        archive.set_string(DOCUMENT_PART, document_xml);

        if !archive.contains(DOCUMENT_RELS_PART) {
            archive.set_string(DOCUMENT_RELS_PART, minimal_document_rels(&archive));
        }
        update_content_types(&mut archive)?;
        update_core_properties(&mut archive, doc.metadata.title.as_deref())?;

        debug!(
            blocks = doc.blocks.len(),
            styles = writer.styles.len(),
            section_refs = writer.section_refs.len(),
            "Serialized document into base template"
        );
        archive.to_bytes()
    }

    /// Generate the complete document.xml content
    fn generate_document_xml(&mut self, doc: &Document) -> String {
        self.output.clear();

        self.output
            .push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        self.output.push('\n');
        self.output.push_str(r#"<w:document "#);
        self.output
            .push_str(r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#);
        self.output.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        self.output.push('\n');
        self.output.push_str("<w:body>\n");

        let pages = section_pages(doc);
        for (block, page) in doc.blocks.iter().zip(pages) {
            self.generate_block(block, page);
        }

        // Final section
        self.generate_section_properties(&doc.metadata.page);

        self.output.push_str("</w:body>\n");
        self.output.push_str("</w:document>");

        std::mem::take(&mut self.output)
    }

    fn generate_block(&mut self, block: &Block, page: &PageSetup) {
        match block {
            Block::Paragraph(para) => self.generate_paragraph(para),
            Block::Table(table) => self.generate_table(table, page),
            Block::Break(break_type) => self.generate_break(break_type),
        }
    }

    /// Style ID to reference, if the package defines the style with the right type
    fn resolve_style(&self, style_id: Option<&str>, style_type: StyleType) -> Option<String> {
        let key = style_id?;
        let resolved = self.styles.resolve(key, style_type).map(str::to_string);
        if resolved.is_none() {
            debug!(style = key, "Style not defined in package, using direct formatting");
        }
        resolved
    }

    /// Generate XML for a paragraph
    fn generate_paragraph(&mut self, para: &Paragraph) {
        self.output.push_str("<w:p>\n");

        let mut ppr = String::new();
        if let Some(style) = self.resolve_style(para.style_id.as_deref(), StyleType::Paragraph) {
            ppr.push_str(&format!("<w:pStyle w:val=\"{}\"/>\n", escape_xml(&style)));
        }
        if let Some(after) = para.format.space_after_pt {
            ppr.push_str(&format!("<w:spacing w:after=\"{}\"/>\n", pt_to_twips(after)));
        }
        if let Some(indent) = para.format.first_line_indent_mm {
            ppr.push_str(&format!("<w:ind w:firstLine=\"{}\"/>\n", mm_to_twips(indent)));
        }
        if let Some(align) = para.format.align {
            ppr.push_str(&format!("<w:jc w:val=\"{}\"/>\n", jc_value(align)));
        }
        if !ppr.is_empty() {
            self.output.push_str("<w:pPr>\n");
            self.output.push_str(&ppr);
            self.output.push_str("</w:pPr>\n");
        }

        let props = RunProps {
            bold: para.format.bold,
            italic: false,
            underline: false,
            size: para
                .format
                .font_size_pt
                .map(half_points)
                .unwrap_or(self.font_size),
        };
        for inline in &para.inlines {
            self.generate_inline(inline, props);
        }

        self.output.push_str("</w:p>\n");
    }

    /// Generate XML for a table
    fn generate_table(&mut self, table: &Table, page: &PageSetup) {
        let widths = column_widths(table, page);
        let total: u32 = widths.iter().sum();

        self.output.push_str("<w:tbl>\n");

        self.output.push_str("<w:tblPr>\n");
        if let Some(style) = self.resolve_style(table.style_id.as_deref(), StyleType::Table) {
            self.output
                .push_str(&format!("<w:tblStyle w:val=\"{}\"/>\n", escape_xml(&style)));
        }
        self.output
            .push_str(&format!("<w:tblW w:w=\"{}\" w:type=\"dxa\"/>\n", total));
        // Explicit borders so the grid survives templates without a table style
        self.output.push_str("<w:tblBorders>\n");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            self.output.push_str(&format!(
                "<w:{} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>\n",
                edge
            ));
        }
        self.output.push_str("</w:tblBorders>\n");
        self.output.push_str("<w:tblLayout w:type=\"fixed\"/>\n");
        self.output.push_str("</w:tblPr>\n");

        self.output.push_str("<w:tblGrid>\n");
        for width in &widths {
            self.output
                .push_str(&format!("<w:gridCol w:w=\"{}\"/>\n", width));
        }
        self.output.push_str("</w:tblGrid>\n");

        let size = table
            .font_size_pt
            .map(half_points)
            .unwrap_or(self.font_size);
        let header_fill = table.header_fill.as_deref().map(escape_xml);

        for row in &table.rows {
            self.output.push_str("<w:tr>\n");

            if row.is_header {
                self.output.push_str("<w:trPr>\n");
                self.output.push_str("<w:tblHeader/>\n");
                self.output.push_str("</w:trPr>\n");
            }

            for (i, cell) in row.cells.iter().enumerate() {
                self.output.push_str("<w:tc>\n");

                self.output.push_str("<w:tcPr>\n");
                let width = widths.get(i).copied().unwrap_or(0);
                self.output
                    .push_str(&format!("<w:tcW w:w=\"{}\" w:type=\"dxa\"/>\n", width));
                if row.is_header {
                    if let Some(fill) = &header_fill {
                        self.output.push_str(&format!(
                            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>\n",
                            fill
                        ));
                    }
                }
                self.output.push_str("</w:tcPr>\n");

                // Every cell holds exactly one paragraph
                self.output.push_str("<w:p>\n");
                let align = cell
                    .align
                    .or_else(|| table.columns.get(i).and_then(|c| c.align));
                if let Some(align) = align {
                    self.output.push_str(&format!(
                        "<w:pPr>\n<w:jc w:val=\"{}\"/>\n</w:pPr>\n",
                        jc_value(align)
                    ));
                }
                let props = RunProps {
                    bold: row.is_header,
                    italic: false,
                    underline: false,
                    size,
                };
                for inline in &cell.content {
                    self.generate_inline(inline, props);
                }
                self.output.push_str("</w:p>\n");

                self.output.push_str("</w:tc>\n");
            }

            self.output.push_str("</w:tr>\n");
        }

        self.output.push_str("</w:tbl>\n");
    }

    /// Generate XML for a break
    fn generate_break(&mut self, break_type: &BreakType) {
        match break_type {
            BreakType::Page => {
                self.output.push_str("<w:p>\n");
                self.output.push_str("<w:r>\n");
                self.output.push_str("<w:br w:type=\"page\"/>\n");
                self.output.push_str("</w:r>\n");
                self.output.push_str("</w:p>\n");
            }
            BreakType::Section(page) => {
                // The section being closed is described inside this paragraph
                self.output.push_str("<w:p>\n");
                self.output.push_str("<w:pPr>\n");
                self.generate_section_properties(page);
                self.output.push_str("</w:pPr>\n");
                self.output.push_str("</w:p>\n");
            }
        }
    }

    fn generate_section_properties(&mut self, page: &PageSetup) {
        let (width, height) = page.oriented_size_mm();

        self.output.push_str("<w:sectPr>\n");
        for reference in &self.section_refs {
            self.output.push_str(reference);
            self.output.push('\n');
        }
        let orient = match page.orientation {
            Orientation::Portrait => "",
            Orientation::Landscape => " w:orient=\"landscape\"",
        };
        self.output.push_str(&format!(
            "<w:pgSz w:w=\"{}\" w:h=\"{}\"{}/>\n",
            mm_to_twips(width),
            mm_to_twips(height),
            orient
        ));
        self.output.push_str(&format!(
            "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" w:header=\"{}\" w:footer=\"{}\" w:gutter=\"0\"/>\n",
            mm_to_twips(page.margin_top_mm),
            mm_to_twips(page.margin_right_mm),
            mm_to_twips(page.margin_bottom_mm),
            mm_to_twips(page.margin_left_mm),
            HEADER_FOOTER_TWIPS,
            HEADER_FOOTER_TWIPS
        ));
        self.output.push_str("</w:sectPr>\n");
    }

    fn generate_inline(&mut self, inline: &Inline, props: RunProps) {
        match inline {
            Inline::Text(text) => self.generate_run(text, props),
            Inline::Format(format_type, inner) => {
                let mut nested = props;
                match format_type {
                    FormatType::Bold => nested.bold = true,
                    FormatType::Italic => nested.italic = true,
                    FormatType::Underline => nested.underline = true,
                }
                self.generate_inline(inner, nested);
            }
            Inline::Span(inlines) => {
                for inline in inlines {
                    self.generate_inline(inline, props);
                }
            }
            Inline::Break => {
                self.output.push_str("<w:r>\n");
                self.output.push_str("<w:br/>\n");
                self.output.push_str("</w:r>\n");
            }
        }
    }

    /// Generate a run; embedded newlines become line breaks
    fn generate_run(&mut self, text: &str, props: RunProps) {
        self.output.push_str("<w:r>\n");

        self.output.push_str("<w:rPr>\n");
        self.output.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\"/>\n",
            self.font_family
        ));
        if props.bold {
            self.output.push_str("<w:b/>\n<w:bCs/>\n");
        }
        if props.italic {
            self.output.push_str("<w:i/>\n<w:iCs/>\n");
        }
        if props.underline {
            self.output.push_str("<w:u w:val=\"single\"/>\n");
        }
        self.output.push_str(&format!(
            "<w:sz w:val=\"{0}\"/>\n<w:szCs w:val=\"{0}\"/>\n",
            props.size
        ));
        self.output.push_str("</w:rPr>\n");

        // Spreadsheet cells use vertical tab and form feed as manual breaks
        for (i, line) in text.split(&['\n', '\u{b}', '\u{c}'][..]).enumerate() {
            if i > 0 {
                self.output.push_str("<w:br/>\n");
            }
            self.output.push_str(&format!(
                "<w:t xml:space=\"preserve\">{}</w:t>\n",
                escape_xml(line)
            ));
        }

        self.output.push_str("</w:r>\n");
    }
}

/// Page setup in effect for each block: the next section break, else the
/// document's final section
fn section_pages(doc: &Document) -> Vec<&PageSetup> {
    let mut current = &doc.metadata.page;
    let mut pages: Vec<&PageSetup> = doc
        .blocks
        .iter()
        .rev()
        .map(|block| {
            if let Block::Break(BreakType::Section(page)) = block {
                current = page;
            }
            current
        })
        .collect();
    pages.reverse();
    pages
}

/// Grid column widths in twips, spanning the text width of the page
fn column_widths(table: &Table, page: &PageSetup) -> Vec<u32> {
    let count = table.column_count();
    if count == 0 {
        return Vec::new();
    }

    let total = mm_to_twips(page.text_width_mm()) as u64;
    let weights: Vec<u64> = if table.columns.len() == count
        && table.columns.iter().all(|c| c.width.is_some())
    {
        table
            .columns
            .iter()
            .map(|c| c.width.unwrap_or(1).max(1) as u64)
            .collect()
    } else {
        vec![1; count]
    };
    let sum: u64 = weights.iter().sum();

    let mut widths: Vec<u32> = weights.iter().map(|w| (total * w / sum) as u32).collect();
    let assigned: u32 = widths.iter().sum();
    if let Some(last) = widths.last_mut() {
        *last += total as u32 - assigned;
    }
    widths
}

fn jc_value(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn load_styles(archive: &OoxmlArchive) -> Result<StyleSheet> {
    match archive.styles_xml() {
        Some(xml) => StyleSheet::parse(xml),
        None => Ok(StyleSheet::default()),
    }
}

/// Header and footer references of the template's final section
fn extract_section_references(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_section = false;
    let mut current = Vec::new();
    let mut last = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sectPr" => {
                in_section = true;
                current.clear();
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let kind = match e.local_name().as_ref() {
                    // <w:sectPr/> carries no references
                    b"sectPr" => {
                        last.clear();
                        None
                    }
                    b"headerReference" if in_section => Some("headerReference"),
                    b"footerReference" if in_section => Some("footerReference"),
                    _ => None,
                };
                if let (Some(kind), Some(id)) = (kind, get_attr(e, b"r:id")) {
                    let ref_type =
                        get_attr(e, b"w:type").unwrap_or_else(|| "default".to_string());
                    current.push(format!(
                        "<w:{} w:type=\"{}\" r:id=\"{}\"/>",
                        kind,
                        escape_xml(&ref_type),
                        escape_xml(&id)
                    ));
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sectPr" => {
                in_section = false;
                last = std::mem::take(&mut current);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(last)
}

fn minimal_document_rels(archive: &OoxmlArchive) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    if archive.contains(STYLES_PART) {
        xml.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
    }
    xml.push_str("</Relationships>");
    xml
}

/// Retype a template main part as a document and make sure it is declared
fn update_content_types(archive: &mut OoxmlArchive) -> Result<()> {
    let content_types = archive
        .get_string(CONTENT_TYPES_PART)?
        .ok_or_else(|| OoxmlError::MissingFile(CONTENT_TYPES_PART.to_string()))?;

    let mut updated = content_types.replace(TEMPLATE_CONTENT_TYPE, DOCUMENT_CONTENT_TYPE);
    if !updated.contains("PartName=\"/word/document.xml\"") {
        if !updated.contains("</Types>") {
            return Err(OoxmlError::InvalidStructure(
                "[Content_Types].xml has no Types element".to_string(),
            ));
        }
        updated = updated.replace(
            "</Types>",
            &format!(
                "  <Override PartName=\"/word/document.xml\" ContentType=\"{}\"/>\n</Types>",
                DOCUMENT_CONTENT_TYPE
            ),
        );
    }

    archive.set_string(CONTENT_TYPES_PART, updated);
    Ok(())
}

/// Set the title in an existing `docProps/core.xml`
fn update_core_properties(archive: &mut OoxmlArchive, title: Option<&str>) -> Result<()> {
    let Some(title) = title else {
        return Ok(());
    };
    let Some(core_xml) = archive.get_string(CORE_PART)? else {
        debug!("Template has no core properties, title not written");
        return Ok(());
    };

    let element = format!("<dc:title>{}</dc:title>", escape_xml(title));
    let updated = if let Some(start) = core_xml.find("<dc:title>") {
        match core_xml[start..].find("</dc:title>") {
            Some(end) => {
                let end = start + end + "</dc:title>".len();
                format!("{}{}{}", &core_xml[..start], element, &core_xml[end..])
            }
            None => core_xml,
        }
    } else if core_xml.contains("<dc:title/>") {
        core_xml.replacen("<dc:title/>", &element, 1)
    } else {
        core_xml.replace(
            "</cp:coreProperties>",
            &format!("{}</cp:coreProperties>", element),
        )
    };

    archive.set_string(CORE_PART, updated);
    Ok(())
}

/// Escape special XML characters
///
/// Characters XML 1.0 cannot carry (control codes other than tab and line
/// ends, U+FFFE, U+FFFF) are dropped.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{fffe}' || c == '\u{ffff}' => {}
            c => out.push(c),
        }
    }
    out
}
