//! Parts of a blank DOCX package
//!
//! Used when no base template is configured. The package is the smallest set
//! of parts Word opens without repair: content types, relationships, styles,
//! settings and core properties. Nothing here carries a timestamp.

use portaria_ast::FontSpec;

use crate::archive::{
    OoxmlArchive, CONTENT_TYPES_PART, CORE_PART, DOCUMENT_RELS_PART, PACKAGE_RELS_PART,
    SETTINGS_PART, STYLES_PART,
};
use crate::writer::{escape_xml, half_points};

/// Content type of the main part of a document
pub const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type of the main part of a template (.dotx)
pub const TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";

/// Build an archive holding every part except `word/document.xml`
pub fn blank_archive(font: &FontSpec, title: Option<&str>) -> OoxmlArchive {
    let mut archive = OoxmlArchive::new();
    archive.set_string(CONTENT_TYPES_PART, content_types_xml());
    archive.set_string(PACKAGE_RELS_PART, package_rels_xml());
    archive.set_string(DOCUMENT_RELS_PART, document_rels_xml());
    archive.set_string(STYLES_PART, styles_xml(font));
    archive.set_string(SETTINGS_PART, settings_xml());
    archive.set_string(CORE_PART, core_xml(title));
    archive
}

fn content_types_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="{}"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#,
        DOCUMENT_CONTENT_TYPE
    )
}

fn package_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#
}

fn document_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>
</Relationships>"#
}

/// Styles part: document defaults from the font, `Normal` and `TableGrid`
fn styles_xml(font: &FontSpec) -> String {
    let family = escape_xml(&font.family);
    let size = half_points(font.size_pt);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="{family}" w:hAnsi="{family}" w:cs="{family}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/><w:lang w:val="pt-BR"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="table" w:default="1" w:styleId="TableNormal">
    <w:name w:val="Normal Table"/>
    <w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr>
  </w:style>
  <w:style w:type="table" w:styleId="TableGrid">
    <w:name w:val="Table Grid"/>
    <w:basedOn w:val="TableNormal"/>
    <w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr>
  </w:style>
</w:styles>"#
    )
}

fn settings_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:defaultTabStop w:val="708"/>
  <w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>
</w:settings>"#
}

/// Core properties with the title only; creation dates are left out
fn core_xml(title: Option<&str>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(t) = title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(t)));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{StyleSheet, StyleType};

    #[test]
    fn test_blank_archive_parts() {
        let archive = blank_archive(&FontSpec::default(), Some("Portaria"));
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/settings.xml",
            "docProps/core.xml",
        ] {
            assert!(archive.contains(part), "missing {}", part);
        }
        assert!(!archive.contains("word/document.xml"));

        let core = archive.get_string("docProps/core.xml").unwrap().unwrap();
        assert!(core.contains("<dc:title>Portaria</dc:title>"));
        assert!(!core.contains("dcterms:created"));
    }

    #[test]
    fn test_styles_carry_font_defaults() {
        let font = FontSpec {
            family: "Times New Roman".to_string(),
            size_pt: 11.0,
        };
        let xml = styles_xml(&font);
        assert!(xml.contains(r#"w:ascii="Times New Roman""#));
        assert!(xml.contains(r#"<w:sz w:val="22"/>"#));

        let sheet = StyleSheet::parse(xml.as_bytes()).unwrap();
        assert!(sheet.has("Normal", StyleType::Paragraph));
        assert!(sheet.has("TableGrid", StyleType::Table));
    }

    #[test]
    fn test_core_without_title() {
        let xml = core_xml(None);
        assert!(!xml.contains("dc:title"));
        assert!(xml.ends_with("</cp:coreProperties>"));
    }
}
