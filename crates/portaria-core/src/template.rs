//! Declarative document template
//!
//! Everything visual about a portaria lives here rather than in the composer:
//! the static preamble text, fonts, page setups, per-role paragraph styling
//! and the annex label format. Templates are plain TOML so institutions can
//! adapt the wording without touching code.
//!
//! ```toml
//! title = "Portaria CCM"
//!
//! [font]
//! family = "Arial"
//! size_pt = 12.0
//!
//! [[preamble]]
//! role = "title"
//! text = "PORTARIA CCM Nº ___/____"
//!
//! [annex]
//! label = "ANEXO — {key}"
//! ```

use portaria_ast::{Alignment, FontSpec, Orientation, PageSetup, ParagraphFormat, ParagraphRole};
use serde::{Deserialize, Serialize};

/// Default annex label; `{key}` is the group key, `{number}` the 1-based annex number
pub const DEFAULT_ANNEX_LABEL: &str = "ANEXO — {key}";

/// Styling and static text of a generated portaria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTemplate {
    /// Document title written to the core properties
    pub title: String,
    /// Default font of every run
    pub font: FontSpec,
    /// Page setup of the preamble section
    pub preamble_page: PageSetup,
    /// Page setup of the annex section
    pub annex_page: PageSetup,
    /// Paragraph styling per role
    pub styles: RoleStyles,
    /// Annex label and table styling
    pub annex: AnnexStyle,
    /// Static preamble paragraphs, in order
    pub preamble: Vec<PreambleBlock>,
}

/// One static paragraph of the preamble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreambleBlock {
    #[serde(default)]
    pub role: ParagraphRole,
    /// Text; newlines become line breaks
    pub text: String,
}

impl PreambleBlock {
    pub fn new(role: ParagraphRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Styling of the paragraph roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleStyles {
    pub title: RoleStyle,
    pub body: RoleStyle,
    pub signature: RoleStyle,
    pub annex_label: RoleStyle,
}

/// Styling of one paragraph role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleStyle {
    /// Paragraph style to reference when the output package defines it
    pub style_id: Option<String>,
    pub align: Option<Alignment>,
    pub bold: bool,
    pub font_size_pt: Option<f32>,
    pub space_after_pt: Option<f32>,
    pub first_line_indent_mm: Option<f32>,
}

impl RoleStyle {
    /// Direct paragraph formatting for this role
    pub fn format(&self) -> ParagraphFormat {
        ParagraphFormat {
            align: self.align,
            bold: self.bold,
            font_size_pt: self.font_size_pt,
            space_after_pt: self.space_after_pt,
            first_line_indent_mm: self.first_line_indent_mm,
        }
    }
}

impl Default for RoleStyles {
    fn default() -> Self {
        Self {
            title: RoleStyle {
                style_id: Some("Title".to_string()),
                align: Some(Alignment::Center),
                bold: true,
                font_size_pt: Some(14.0),
                space_after_pt: Some(18.0),
                ..Default::default()
            },
            body: RoleStyle {
                align: Some(Alignment::Justify),
                space_after_pt: Some(12.0),
                first_line_indent_mm: Some(12.5),
                ..Default::default()
            },
            signature: RoleStyle {
                align: Some(Alignment::Center),
                bold: true,
                space_after_pt: Some(12.0),
                ..Default::default()
            },
            annex_label: RoleStyle {
                align: Some(Alignment::Left),
                bold: true,
                space_after_pt: Some(6.0),
                ..Default::default()
            },
        }
    }
}

impl RoleStyles {
    pub fn for_role(&self, role: ParagraphRole) -> &RoleStyle {
        match role {
            ParagraphRole::Title => &self.title,
            ParagraphRole::Body => &self.body,
            ParagraphRole::Signature => &self.signature,
            ParagraphRole::AnnexLabel => &self.annex_label,
        }
    }
}

/// Annex label and table styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnexStyle {
    /// Label format, see [`DEFAULT_ANNEX_LABEL`]
    pub label: String,
    /// Table style to reference when the output package defines it
    pub table_style: Option<String>,
    /// Font size of table cells
    pub font_size_pt: Option<f32>,
    /// Header row shading (hex RGB)
    pub header_fill: Option<String>,
}

impl Default for AnnexStyle {
    fn default() -> Self {
        Self {
            label: DEFAULT_ANNEX_LABEL.to_string(),
            table_style: Some("TableGrid".to_string()),
            font_size_pt: Some(9.0),
            header_fill: Some("D9D9D9".to_string()),
        }
    }
}

impl AnnexStyle {
    /// Render the label for one group
    pub fn label_for(&self, key: &str, number: usize) -> String {
        self.label
            .replace("{number}", &number.to_string())
            .replace("{key}", key)
    }
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            title: "Portaria CCM".to_string(),
            font: FontSpec::default(),
            preamble_page: PageSetup::default(),
            annex_page: PageSetup {
                orientation: Orientation::Landscape,
                margin_top_mm: 20.0,
                margin_bottom_mm: 20.0,
                margin_left_mm: 20.0,
                margin_right_mm: 20.0,
                ..Default::default()
            },
            styles: RoleStyles::default(),
            annex: AnnexStyle::default(),
            preamble: default_preamble(),
        }
    }
}

fn default_preamble() -> Vec<PreambleBlock> {
    vec![
        PreambleBlock::new(ParagraphRole::Title, "PORTARIA CCM Nº ____/______"),
        PreambleBlock::new(
            ParagraphRole::Body,
            "A Direção da unidade escolar, no uso das atribuições que lhe são conferidas \
             pela legislação vigente, RESOLVE:",
        ),
        PreambleBlock::new(
            ParagraphRole::Body,
            "Art. 1º Ficam designados os estudantes relacionados nos anexos desta portaria, \
             organizados por agrupamento, para participação no programa.",
        ),
        PreambleBlock::new(
            ParagraphRole::Body,
            "Art. 2º Esta portaria entra em vigor na data de sua publicação, revogadas as \
             disposições em contrário.",
        ),
        PreambleBlock::new(
            ParagraphRole::Signature,
            "Publique-se. Registre-se. Cumpra-se.\n\n\n______________________________\nDireção",
        ),
    ]
}

impl DocumentTemplate {
    /// Parse a template from TOML; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
