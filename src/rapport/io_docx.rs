// Writing the report as a Word document.

use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts};
use std::io::Cursor;

use crate::rapport::*;

const FONT: &str = "Calibri";
// Sizes are in half-points.
const BODY_SIZE: usize = 22;
const HEADING_SIZE: usize = 28;
const TITLE_SIZE: usize = 52;

/// Characters that XML 1.0 does not allow become spaces. `\r` is dropped.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' | '\n' => c,
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => ' ',
            _ => c,
        })
        .collect()
}

/// A run of text, with `\n` turned into line breaks and `\t` into tabs.
fn text_run(text: &str) -> Run {
    let text = xml_safe(text);
    let mut run = Run::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (jdx, part) in line.split('\t').enumerate() {
            if jdx > 0 {
                run = run.add_tab();
            }
            if !part.is_empty() {
                run = run.add_text(part);
            }
        }
    }
    run
}

fn block_paragraph(block: &Block) -> Paragraph {
    match block {
        Block::Title(t) => Paragraph::new()
            .add_run(text_run(t).bold().size(TITLE_SIZE))
            .align(AlignmentType::Center),
        Block::Subtitle(t) => Paragraph::new()
            .add_run(text_run(t).bold())
            .align(AlignmentType::Center),
        Block::Heading(t) => Paragraph::new().add_run(text_run(t).bold().size(HEADING_SIZE)),
        Block::Paragraph(t) => Paragraph::new().add_run(text_run(t)),
        Block::Emphasis(t) => Paragraph::new().add_run(text_run(t).italic()),
        Block::Rule => Paragraph::new().add_run(Run::new().add_text("_".repeat(80))),
        Block::Blank => Paragraph::new(),
        Block::Footer(t) => Paragraph::new()
            .add_run(text_run(t).italic())
            .align(AlignmentType::Center),
    }
}

/// The report as the bytes of a .docx file.
pub fn render_docx(document: &ReportDocument) -> RapportResult<Vec<u8>> {
    let mut docx = Docx::new()
        .default_fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT))
        .default_size(BODY_SIZE);
    for block in document.blocks.iter() {
        docx = docx.add_paragraph(block_paragraph(block));
    }
    let mut buf = Cursor::new(Vec::new());
    if let Err(e) = docx.build().pack(&mut buf) {
        whatever!("Error writing the report document: {}", e)
    }
    let bytes = buf.into_inner();
    debug!(
        "render_docx: {} blocks, {} bytes",
        document.blocks.len(),
        bytes.len()
    );
    Ok(bytes)
}
