use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("file contains no readable text")]
    EmptyFile,
    #[error("file is not valid UTF-8")]
    InvalidEncoding,
}

/// Pull plain text out of an uploaded document. Plain-text formats only;
/// binary formats are rejected up front instead of producing mojibake.
pub(crate) fn extract_text(
    filename: &str,
    data: &[u8],
    allowed_extensions: &[String],
) -> Result<String, ExtractionError> {
    let extension = filename
        .rsplit('.')
        .next()
        .filter(|ext| *ext != filename)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !allowed_extensions.iter().any(|allowed| *allowed == extension) {
        return Err(ExtractionError::UnsupportedFileType(if extension.is_empty() {
            "(none)".to_string()
        } else {
            extension
        }));
    }

    let text = std::str::from_utf8(data).map_err(|_| ExtractionError::InvalidEncoding)?;

    let cleaned = match extension.as_str() {
        // CSV cells read better for the analyzer as whitespace-joined rows.
        "csv" => text
            .lines()
            .map(|line| line.split(',').map(str::trim).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => text.to_string(),
    };

    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        return Err(ExtractionError::EmptyFile);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["txt".to_string(), "md".to_string(), "csv".to_string()]
    }

    #[test]
    fn plain_text_passes_through() {
        let text = extract_text("notes.txt", b"Hello world.", &allowed()).unwrap();
        assert_eq!(text, "Hello world.");
    }

    #[test]
    fn csv_rows_are_joined_with_spaces() {
        let text = extract_text("words.csv", b"serene,calm\nvivid,bright", &allowed()).unwrap();
        assert_eq!(text, "serene calm\nvivid bright");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = extract_text("report.pdf", b"%PDF-1.4", &allowed()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(ext) if ext == "pdf"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = extract_text("README", b"text", &allowed()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(_)));
    }

    #[test]
    fn whitespace_only_file_is_empty() {
        let err = extract_text("blank.txt", b"   \n\t ", &allowed()).unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyFile));
    }

    #[test]
    fn non_utf8_is_rejected() {
        let err = extract_text("weird.txt", &[0xff, 0xfe, 0x00], &allowed()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEncoding));
    }
}
