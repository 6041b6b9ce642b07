use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::config::{AnalysisBundle, Topic};

pub const REPORT_TITLE: &str = "Rapport Writer Assistance";

const INTRODUCTION: &str = "Laporan ini disusun dengan pendekatan apresiatif untuk memberikan gambaran komprehensif \
mengenai implementasi budaya kerja dengan fokus pada aspek perilaku (behavior). \
Analisis dilakukan berdasarkan data evidence, survei, dan perbandingan dengan benchmark.";

const CLOSING: &str = "Laporan ini disusun sebagai bahan refleksi dan pengembangan berkelanjutan dalam implementasi \
budaya kerja. Kami mengapresiasi komitmen dan dedikasi seluruh tim dalam mewujudkan \
transformasi budaya yang positif dan berkelanjutan.";

/// One element of the report, in reading order.
///
/// Text may contain `\n`, which the writer renders as a line break.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Block {
    /// Centred document title.
    Title(String),
    /// Bold and centred.
    Subtitle(String),
    /// Numbered section heading.
    Heading(String),
    /// Body text, rendered verbatim.
    Paragraph(String),
    /// Italic body text.
    Emphasis(String),
    /// A line of underscores.
    Rule,
    Blank,
    /// Italic and centred.
    Footer(String),
}

/// The report as a sequence of blocks, independent of any file format.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Lays out the report of a sub-unit.
///
/// All five sections are always present, in topic order. Their text is taken
/// verbatim from the bundle, whether it is a narrative or a failure notice.
pub fn assemble(sub_unit: &str, bundle: &AnalysisBundle, generated_at: NaiveDateTime) -> ReportDocument {
    let mut blocks = vec![
        Block::Title(REPORT_TITLE.to_string()),
        Block::Subtitle(format!(
            "Laporan Analisis Implementasi Budaya Kerja\n{}\n{}",
            sub_unit,
            generated_at.format("%d %B %Y")
        )),
        Block::Blank,
        Block::Rule,
        Block::Blank,
        Block::Emphasis(INTRODUCTION.to_string()),
        Block::Blank,
    ];

    for (idx, (topic, outcome)) in bundle.sections().into_iter().enumerate() {
        debug!("assemble: section {} {:?} generated={}", idx + 1, topic, outcome.is_generated());
        blocks.push(Block::Heading(section_heading(idx + 1, topic)));
        blocks.push(Block::Paragraph(outcome.as_text().to_string()));
        blocks.push(Block::Blank);
    }

    blocks.extend(vec![
        Block::Blank,
        Block::Rule,
        Block::Blank,
        Block::Emphasis(CLOSING.to_string()),
        Block::Blank,
        Block::Footer(format!(
            "\nDibuat oleh {}\n{} WIB",
            REPORT_TITLE,
            generated_at.format("%d %B %Y, %H:%M")
        )),
    ]);
    ReportDocument { blocks }
}

pub fn section_heading(number: usize, topic: Topic) -> String {
    format!("{}. {}", number, topic.title())
}

/// `Rapp_<sub-unit>_<MM_DD>.docx`, with spaces and slashes of the sub-unit replaced by `_`.
pub fn report_file_name(sub_unit: &str, date: NaiveDate) -> String {
    let cleaned: String = sub_unit
        .chars()
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect();
    format!("Rapp_{}_{}.docx", cleaned, date.format("%m_%d"))
}
