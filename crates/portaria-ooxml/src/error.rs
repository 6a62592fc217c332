//! Errors raised while reading or writing DOCX packages

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The bytes are not a readable ZIP package
    #[error("Invalid ZIP package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A part (styles, document, section properties) is not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A part the operation needs is absent
    #[error("Package part missing: {0}")]
    MissingFile(String),

    #[error("Malformed package: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, OoxmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_part() {
        let err = OoxmlError::MissingFile("word/document.xml".into());
        assert_eq!(err.to_string(), "Package part missing: word/document.xml");
    }
}
