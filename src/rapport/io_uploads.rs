// Turning uploaded documents into text.

use calamine::{Reader, Xls, Xlsx};
use std::io::{Cursor, Write};
use std::process::{Command as Process, Stdio};

use crate::rapport::io_common::{cell_text, render_table};
use crate::rapport::*;

pub const UNSUPPORTED_FORMAT: &str = "Format file tidak didukung";

fn upload_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Reads a local file as an upload.
pub fn read_upload(path: &str) -> RapportResult<Upload> {
    let content = fs::read(path).context(ReadingUploadSnafu { path })?;
    let file_name = upload_name(path);
    debug!("read_upload: {:?}: {} bytes", file_name, content.len());
    Ok(Upload::new(&file_name, content))
}

/// Reads an optional upload. A file that cannot be read is not an error: the
/// reason takes the place of its text.
pub fn read_optional_upload(path: &str) -> Upload {
    let file_name = upload_name(path);
    match fs::read(path) {
        Ok(content) => {
            debug!("read_optional_upload: {:?}: {} bytes", file_name, content.len());
            Upload::new(&file_name, content)
        }
        Err(e) => {
            warn!("read_optional_upload: cannot read {:?}: {}", path, e);
            Upload::unreadable(&file_name, format!("Error reading file: {}", e))
        }
    }
}

/// Picks the reader from the file extension.
pub struct FileExtractor {
    ocr_command: String,
    ocr_languages: String,
}

impl FileExtractor {
    pub fn new(ocr: &OcrSettings) -> FileExtractor {
        FileExtractor {
            ocr_command: ocr.command(),
            ocr_languages: ocr.languages(),
        }
    }
}

impl ContentExtractor for FileExtractor {
    fn extract(&self, upload: &Upload) -> String {
        let ext = upload.extension().unwrap_or_default();
        debug!("extract: {:?} as {:?}", upload.file_name, ext);
        let res = match ext.as_str() {
            "xlsx" | "xls" => spreadsheet_text(&ext, &upload.content)
                .map_err(|e| format!("Error reading file: {}", e)),
            "csv" => csv_text(&upload.content).map_err(|e| format!("Error reading file: {}", e)),
            "pdf" => pdf_text(&upload.content).map_err(|e| format!("Error reading PDF: {}", e)),
            "png" | "jpg" | "jpeg" => self
                .image_text(&upload.content)
                .map_err(|e| format!("Error reading image: {}", e)),
            _ => {
                warn!("extract: unsupported format for {:?}", upload.file_name);
                Ok(UNSUPPORTED_FORMAT.to_string())
            }
        };
        match res {
            Ok(text) => {
                info!("extract: {:?}: {} chars", upload.file_name, text.len());
                text
            }
            Err(msg) => {
                warn!("extract: {:?}: {}", upload.file_name, msg);
                msg
            }
        }
    }
}

impl FileExtractor {
    fn image_text(&self, content: &[u8]) -> RapportResult<String> {
        let spawned = Process::new(&self.ocr_command)
            .args(["stdin", "stdout", "-l", self.ocr_languages.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = whatever!(spawned, "could not start {}", self.ocr_command);
        // stdin is dropped after the write, which closes the pipe
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(content),
            None => Ok(()),
        };
        if sent.is_err() {
            let _ = child.kill();
            let _ = child.wait();
        }
        whatever!(sent, "could not send the image to {}", self.ocr_command);
        let output = whatever!(child.wait_with_output(), "{} did not complete", self.ocr_command);
        if !output.status.success() {
            whatever!(
                "{} failed ({}): {}",
                self.ocr_command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// The first worksheet, as a text table.
fn spreadsheet_text(ext: &str, content: &[u8]) -> RapportResult<String> {
    let cursor = Cursor::new(content.to_vec());
    let worksheets = if ext == "xls" {
        let mut workbook = whatever!(Xls::new(cursor), "not a valid xls workbook");
        workbook.worksheets()
    } else {
        let mut workbook = whatever!(Xlsx::new(cursor), "not a valid xlsx workbook");
        workbook.worksheets()
    };
    let (name, wrange) = match worksheets.into_iter().next() {
        Some(w) => w,
        None => whatever!("the workbook has no worksheet"),
    };
    debug!("spreadsheet_text: worksheet {:?}", name);
    let mut rows = wrange
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let header = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();
    Ok(render_table(&header, &rows))
}

fn csv_text(content: &[u8]) -> RapportResult<String> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);
    let mut records: Vec<Vec<String>> = Vec::new();
    for record in rdr.into_records() {
        let record = whatever!(record, "malformed CSV line");
        records.push(record.iter().map(|s| s.to_string()).collect());
    }
    let mut iter = records.into_iter();
    let header = iter.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = iter.collect();
    Ok(render_table(&header, &rows))
}

/// The text of every page, each followed by a newline.
fn pdf_text(content: &[u8]) -> RapportResult<String> {
    let doc = whatever!(lopdf::Document::load_mem(content), "not a valid PDF document");
    let mut text = String::new();
    for page in doc.get_pages().keys() {
        let page_text = whatever!(doc.extract_text(&[*page]), "could not extract the text of page {}", page);
        text.push_str(&page_text);
        text.push('\n');
    }
    Ok(text)
}
