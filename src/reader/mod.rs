//! Document reading for the supported formats.
//!
//! Dispatches on the file extension: `.txt` is read as UTF-8, `.docx` is
//! parsed with docx-rs and `.pdf` with pdf-extract. Uploaded bytes are
//! staged in a temporary file that is removed as soon as reading has been
//! attempted.

use crate::error::ReadError;
use crate::models::{DocumentFormat, Upload};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Read a document's text, dispatching on its extension.
pub fn read_document(path: &Path) -> Result<String, ReadError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| ReadError::UnsupportedFormat {
        extension: extension_label(path),
    })?;

    let text = match format {
        DocumentFormat::Text => read_plain_text(path)?,
        DocumentFormat::Word => read_docx(path)?,
        DocumentFormat::Pdf => read_pdf(path)?,
    };

    debug!(
        "Read {} ({}, {} chars)",
        path.display(),
        format,
        text.chars().count()
    );
    Ok(text)
}

/// Read a document, logging and yielding `None` on any failure.
#[allow(dead_code)] // Callers that need the reason use read_document
pub fn read_text(path: &Path) -> Option<String> {
    match read_document(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// Read an uploaded document via a temporary file in the system temp dir.
pub fn read_upload(upload: &Upload) -> Result<String, ReadError> {
    read_upload_in(upload, &std::env::temp_dir())
}

/// Stage the upload's bytes in `staging_dir`, read them, and remove the
/// staged file whatever the outcome of the read.
pub fn read_upload_in(upload: &Upload, staging_dir: &Path) -> Result<String, ReadError> {
    let format = upload.format().ok_or_else(|| ReadError::UnsupportedFormat {
        extension: extension_label(Path::new(&upload.name)),
    })?;

    let staging_error = |source: std::io::Error| ReadError::Staging {
        name: upload.name.clone(),
        source,
    };

    // The NamedTempFile guard deletes the file on drop, including unwinding.
    let mut staged = tempfile::Builder::new()
        .prefix("toneprobe-upload-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(staging_dir)
        .map_err(staging_error)?;
    staged.write_all(&upload.bytes).map_err(staging_error)?;
    staged.flush().map_err(staging_error)?;

    debug!(
        "Staged {} ({} bytes) at {}",
        upload.name,
        upload.bytes.len(),
        staged.path().display()
    );

    let result = read_document(staged.path());

    if let Err(e) = staged.close() {
        warn!("Failed to remove staged copy of {}: {}", upload.name, e);
    }

    result
}

/// Expand files and directories into the list of supported documents.
///
/// Directory contents are returned in sorted order. Files with other
/// extensions are returned separately so the caller can report them.
pub fn discover_documents(inputs: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Cannot read directory entry: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.into_path();
                if DocumentFormat::from_path(&path).is_some() {
                    documents.push(path);
                } else {
                    skipped.push(path);
                }
            }
        } else if DocumentFormat::from_path(input).is_some() {
            documents.push(input.clone());
        } else {
            skipped.push(input.clone());
        }
    }

    (documents, skipped)
}

fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('.')).unwrap_or(false)
}

fn extension_label(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| "(none)".to_string())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ReadError> {
    fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_plain_text(path: &Path) -> Result<String, ReadError> {
    fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Paragraph texts joined by newlines, empty paragraphs included.
///
/// Hyperlink text counts as paragraph text; tabs become `\t` and breaks
/// become `\n`.
fn read_docx(path: &Path) -> Result<String, ReadError> {
    use docx_rs::DocumentChild;

    let bytes = read_bytes(path)?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| ReadError::Docx {
        path: path.to_path_buf(),
        message: format!("{:?}", e),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(para),
            _ => None,
        })
        .map(|para| {
            let mut text = String::new();
            collect_paragraph_text(&para.children, &mut text);
            text
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn collect_paragraph_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    use docx_rs::{ParagraphChild, RunChild};

    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_paragraph_text(&link.children, out),
            _ => {}
        }
    }
}

fn read_pdf(path: &Path) -> Result<String, ReadError> {
    let bytes = read_bytes(path)?;

    // pdf-extract can panic on malformed input; treat that as a read failure.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| ReadError::Pdf {
            path: path.to_path_buf(),
            message: "PDF extractor panicked".to_string(),
        })?;

    extracted.map_err(|e| ReadError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};

        let docx = paragraphs.iter().fold(Docx::new(), |doc, text| {
            doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
        });
        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_read_plain_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "Hello, reader.\nSecond line.").unwrap();

        assert_eq!(read_document(&path).unwrap(), "Hello, reader.\nSecond line.");
    }

    #[test]
    fn test_read_docx_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.DOCX");
        fs::write(&path, docx_bytes(&["First paragraph.", "Second paragraph."])).unwrap();

        let text = read_document(&path).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_read_docx_hyperlinks_tabs_and_breaks() {
        use docx_rs::{BreakType, Docx, Hyperlink, HyperlinkType, Paragraph, Run};

        let docx = Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Read our"))
                    .add_hyperlink(
                        Hyperlink::new("https://example.com/report", HyperlinkType::External)
                            .add_run(Run::new().add_text(" annual report")),
                    )
                    .add_run(Run::new().add_text(" today.")),
            )
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text("left").add_tab().add_text("right")),
            )
            .add_paragraph(
                Paragraph::new().add_run(
                    Run::new()
                        .add_text("line one")
                        .add_break(BreakType::TextWrapping)
                        .add_text("line two"),
                ),
            );
        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linked.docx");
        fs::write(&path, buffer.into_inner()).unwrap();

        assert_eq!(
            read_document(&path).unwrap(),
            "Read our annual report today.\nleft\tright\nline one\nline two"
        );
    }

    #[test]
    fn test_unsupported_format() {
        let err = read_document(Path::new("slides.pptx")).unwrap_err();
        match err {
            ReadError::UnsupportedFormat { extension } => assert_eq!(extension, ".pptx"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_document(Path::new("no/such/file.txt")).unwrap_err();
        assert!(matches!(err, ReadError::Io { .. }));
        assert!(read_text(Path::new("no/such/file.txt")).is_none());
    }

    #[test]
    fn test_invalid_utf8_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        assert!(matches!(read_document(&path), Err(ReadError::Io { .. })));
    }

    #[test]
    fn test_corrupt_docx_and_pdf() {
        let dir = TempDir::new().unwrap();
        let docx = dir.path().join("broken.docx");
        let pdf = dir.path().join("broken.pdf");
        fs::write(&docx, b"not a zip archive").unwrap();
        fs::write(&pdf, b"not a pdf either").unwrap();

        assert!(matches!(read_document(&docx), Err(ReadError::Docx { .. })));
        assert!(matches!(read_document(&pdf), Err(ReadError::Pdf { .. })));
    }

    #[test]
    fn test_read_upload_removes_staged_file() {
        let staging = TempDir::new().unwrap();
        let upload = Upload::new("post.txt", b"Staged content.".to_vec());

        let text = read_upload_in(&upload, staging.path()).unwrap();
        assert_eq!(text, "Staged content.");
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_upload_removes_staged_file_on_failure() {
        let staging = TempDir::new().unwrap();
        let upload = Upload::new("broken.pdf", b"garbage".to_vec());

        assert!(read_upload_in(&upload, staging.path()).is_err());
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_upload_unsupported_is_not_staged() {
        let staging = TempDir::new().unwrap();
        let upload = Upload::new("page.html", b"<p>hi</p>".to_vec());

        assert!(matches!(
            read_upload_in(&upload, staging.path()),
            Err(ReadError::UnsupportedFormat { .. })
        ));
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_discover_documents() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.pdf"), "a").unwrap();
        fs::write(dir.path().join("nested/c.docx"), "c").unwrap();
        fs::write(dir.path().join("notes.md"), "skip").unwrap();
        fs::write(dir.path().join(".hidden/d.txt"), "hidden").unwrap();

        let (documents, skipped) = discover_documents(&[dir.path().to_path_buf()]);
        let names: Vec<_> = documents
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.pdf", "b.txt", "nested/c.docx"]);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].ends_with("notes.md"));
    }

    #[test]
    fn test_discover_explicit_files() {
        let (documents, skipped) =
            discover_documents(&[PathBuf::from("one.txt"), PathBuf::from("two.odt")]);
        assert_eq!(documents, vec![PathBuf::from("one.txt")]);
        assert_eq!(skipped, vec![PathBuf::from("two.odt")]);
    }
}
