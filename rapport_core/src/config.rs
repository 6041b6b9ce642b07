// ********* Input data structures ***********

use std::fmt::Display;

/// The content of one spreadsheet cell, as handed over by the table readers.
///
/// The readers are responsible for mapping their own cell types onto these three cases.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The cell rendered as a label (identifiers, sub-unit names, headers).
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(x) => write!(f, "{}", x),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A table as read from one worksheet: the first row is the header.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Table {
        Table { header, rows }
    }

    /// Position of the column with the given name. Surrounding whitespace in the header is ignored.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }
}

/// A metric value after coercion.
///
/// Only the `Numeric` case takes part in delta computations.
#[derive(PartialEq, Debug, Clone)]
pub enum MetricValue {
    Numeric(f64),
    /// Blank cell, explicit "N/A" marker, or a column that does not exist.
    NotAvailable,
    /// Some content that is not a number. The raw content is kept for display.
    Unparseable(String),
}

impl MetricValue {
    pub fn from_cell(cell: &CellValue) -> MetricValue {
        match cell {
            CellValue::Empty => MetricValue::NotAvailable,
            CellValue::Number(x) if x.is_finite() => MetricValue::Numeric(*x),
            CellValue::Number(_) => MetricValue::NotAvailable,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() || t.eq_ignore_ascii_case("N/A") || t.eq_ignore_ascii_case("NA") {
                    return MetricValue::NotAvailable;
                }
                match t.parse::<f64>() {
                    Ok(x) if x.is_finite() => MetricValue::Numeric(x),
                    Ok(_) => MetricValue::NotAvailable,
                    Err(_) => MetricValue::Unparseable(s.clone()),
                }
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Numeric(x) => Some(*x),
            _ => None,
        }
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Numeric(x) => write!(f, "{}", x),
            MetricValue::NotAvailable => write!(f, "N/A"),
            MetricValue::Unparseable(s) => write!(f, "{}", s),
        }
    }
}

/// One (unit, sub-unit) record of a score table.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreRow {
    /// The raw unit identifier, if the table carries one.
    pub identifier: Option<String>,
    /// Normalized form of `identifier`, computed once at load time.
    pub normalized: String,
    pub sub_unit: String,
    /// Named metrics, in the order of the table layout.
    pub metrics: Vec<(String, MetricValue)>,
}

impl ScoreRow {
    pub fn metric(&self, name: &str) -> MetricValue {
        self.metrics
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or(MetricValue::NotAvailable)
    }
}

/// One row of a benchmark table. The identifier sits in the first cell and the
/// metrics are addressed by their offset from it.
#[derive(PartialEq, Debug, Clone)]
pub struct BenchmarkRow {
    pub identifier: String,
    /// Normalized form of `identifier`, computed once at load time.
    pub normalized: String,
    pub cells: Vec<CellValue>,
}

impl BenchmarkRow {
    pub fn at_offset(&self, offset: usize) -> MetricValue {
        self.cells
            .get(offset)
            .map(MetricValue::from_cell)
            .unwrap_or(MetricValue::NotAvailable)
    }
}

// ********* Table layouts **********

// The column layout of the four source workbooks. Changing the workbooks means
// changing these tables, nothing else.

/// How a metric is located in a score table.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnRef {
    /// By header name.
    Named(&'static str),
    /// By offset from the unit identifier column (the first column when the table has none).
    Offset(usize),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Key of the metric in a `ScoreRow`.
    pub name: &'static str,
    /// Label used in the comparison reports.
    pub label: &'static str,
    pub own: ColumnRef,
    /// Offset of the metric from the identifier column of the benchmark table.
    pub benchmark_offset: usize,
}

const fn evidence_metric(i: usize, name: &'static str) -> MetricSpec {
    MetricSpec {
        name,
        label: name,
        own: ColumnRef::Offset(3 + i),
        benchmark_offset: 1 + i,
    }
}

const fn survey_metric(
    name: &'static str,
    label: &'static str,
    benchmark_offset: usize,
) -> MetricSpec {
    MetricSpec {
        name,
        label,
        own: ColumnRef::Named(name),
        benchmark_offset,
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TableLayout {
    pub version: u32,
    pub unit_column: &'static str,
    pub sub_unit_column: &'static str,
    /// All the metrics carried by a row, grouped as they appear in the reports.
    pub groups: &'static [&'static [MetricSpec]],
}

impl TableLayout {
    pub fn metrics(&self) -> impl Iterator<Item = &'static MetricSpec> {
        let groups: &'static [&'static [MetricSpec]] = self.groups;
        groups.iter().flat_map(|g| g.iter())
    }
}

pub const EVIDENCE_METRICS: [MetricSpec; 9] = [
    evidence_metric(0, "Strategi Budaya"),
    evidence_metric(1, "Monitoring & Evaluasi"),
    evidence_metric(2, "Sosialisasi & Partisipasi"),
    evidence_metric(3, "Pelaporan Bulanan"),
    evidence_metric(4, "Apresiasi Pelanggan"),
    evidence_metric(5, "Pemahaman Program"),
    evidence_metric(6, "Reward & Consequences"),
    evidence_metric(7, "SK AoC"),
    evidence_metric(8, "Impact to Business"),
];

/// Total, worker and partner scores.
pub const SURVEY_HEADLINES: [MetricSpec; 3] = [
    survey_metric("Skor Survei", "Skor Survei Total", 13),
    survey_metric("SKOR PEKERJA", "SKOR PEKERJA", 6),
    survey_metric("SKOR MITRA KERJA", "SKOR MITRA KERJA", 12),
];

pub const SURVEY_WORKER_DIMENSIONS: [MetricSpec; 5] = [
    survey_metric("P. AKHLAK", "P. AKHLAK", 1),
    survey_metric("P. ONE Pertamina", "P. ONE Pertamina", 2),
    survey_metric("P. Program Budaya", "P. Program Budaya", 3),
    survey_metric("P. Keberlanjutan", "P. Keberlanjutan", 4),
    survey_metric("P. Safety", "P. Safety", 5),
];

pub const SURVEY_PARTNER_DIMENSIONS: [MetricSpec; 5] = [
    survey_metric("MK. AKHLAK", "MK. AKHLAK", 7),
    survey_metric("MK. ONE Pertamina", "MK. ONE Pertamina", 8),
    survey_metric("MK. Program Budaya", "MK. Program Budaya", 9),
    survey_metric("MK. Keberlanjutan", "MK. Keberlanjutan", 10),
    survey_metric("MK. Safety", "MK. Safety", 11),
];

pub const EVIDENCE_LAYOUT: TableLayout = TableLayout {
    version: 1,
    unit_column: "HSH",
    sub_unit_column: "Fungsi",
    groups: &[&EVIDENCE_METRICS],
};

pub const SURVEY_LAYOUT: TableLayout = TableLayout {
    version: 1,
    unit_column: "HSH",
    sub_unit_column: "Fungsi",
    groups: &[
        &SURVEY_HEADLINES,
        &SURVEY_WORKER_DIMENSIONS,
        &SURVEY_PARTNER_DIMENSIONS,
    ],
};

pub const DEFAULT_FALLBACK_BENCHMARK: &str = "PERTAMINA GROUP";

// ******** Output data structures *********

/// The five analyses of a report, in report order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Topic {
    Strategy,
    Programs,
    Impact,
    EvidenceComparison,
    SurveyComparison,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Strategy,
        Topic::Programs,
        Topic::Impact,
        Topic::EvidenceComparison,
        Topic::SurveyComparison,
    ];

    /// Output budget handed to the text generator.
    pub fn max_output_units(&self) -> u32 {
        match self {
            Topic::Strategy | Topic::Programs | Topic::Impact => 4000,
            Topic::EvidenceComparison => 3000,
            Topic::SurveyComparison => 3500,
        }
    }

    /// Section title in the report.
    pub fn title(&self) -> &'static str {
        match self {
            Topic::Strategy => "Analisis Strategi Budaya",
            Topic::Programs => "Analisis Program Budaya",
            Topic::Impact => "Analisis Impact to Business",
            Topic::EvidenceComparison => "Analisis Perbandingan Evidence dengan Benchmark",
            Topic::SurveyComparison => "Analisis Perbandingan Survei dengan Benchmark",
        }
    }
}

/// The result of one analysis slot.
///
/// Whatever the variant, the text is rendered verbatim in the report.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalysisOutcome {
    /// Narrative produced by the text generator.
    Generated(String),
    /// The analysis could not be run on this input (no data, no document).
    Unavailable(String),
    /// The text generator failed. Holds the failure description.
    Failed(String),
}

impl AnalysisOutcome {
    pub fn as_text(&self) -> &str {
        match self {
            AnalysisOutcome::Generated(s)
            | AnalysisOutcome::Unavailable(s)
            | AnalysisOutcome::Failed(s) => s.as_str(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, AnalysisOutcome::Generated(_))
    }
}

/// The five outcomes of one run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnalysisBundle {
    pub strategy: AnalysisOutcome,
    pub programs: AnalysisOutcome,
    pub impact: AnalysisOutcome,
    pub evidence_comparison: AnalysisOutcome,
    pub survey_comparison: AnalysisOutcome,
}

impl AnalysisBundle {
    pub fn get(&self, topic: Topic) -> &AnalysisOutcome {
        match topic {
            Topic::Strategy => &self.strategy,
            Topic::Programs => &self.programs,
            Topic::Impact => &self.impact,
            Topic::EvidenceComparison => &self.evidence_comparison,
            Topic::SurveyComparison => &self.survey_comparison,
        }
    }

    /// The outcomes in report order.
    pub fn sections(&self) -> Vec<(Topic, &AnalysisOutcome)> {
        Topic::ALL.iter().map(|t| (*t, self.get(*t))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_value_coercion() {
        assert_eq!(
            MetricValue::from_cell(&CellValue::Number(7.5)),
            MetricValue::Numeric(7.5)
        );
        assert_eq!(
            MetricValue::from_cell(&CellValue::Text(" 6.25 ".to_string())),
            MetricValue::Numeric(6.25)
        );
        assert_eq!(
            MetricValue::from_cell(&CellValue::Text("N/A".to_string())),
            MetricValue::NotAvailable
        );
        assert_eq!(
            MetricValue::from_cell(&CellValue::Text("nan".to_string())),
            MetricValue::NotAvailable
        );
        assert_eq!(
            MetricValue::from_cell(&CellValue::Empty),
            MetricValue::NotAvailable
        );
        assert_eq!(
            MetricValue::from_cell(&CellValue::Text("baik".to_string())),
            MetricValue::Unparseable("baik".to_string())
        );
    }

    #[test]
    fn metric_value_display() {
        assert_eq!(MetricValue::Numeric(8.0).to_string(), "8");
        assert_eq!(MetricValue::Numeric(7.5).to_string(), "7.5");
        assert_eq!(MetricValue::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn evidence_offsets() {
        assert_eq!(EVIDENCE_METRICS[0].own, ColumnRef::Offset(3));
        assert_eq!(EVIDENCE_METRICS[0].benchmark_offset, 1);
        assert_eq!(EVIDENCE_METRICS[8].own, ColumnRef::Offset(11));
        assert_eq!(EVIDENCE_METRICS[8].benchmark_offset, 9);
        assert_eq!(SURVEY_LAYOUT.metrics().count(), 13);
    }

    #[test]
    fn topic_budgets() {
        let budgets: Vec<u32> = Topic::ALL.iter().map(|t| t.max_output_units()).collect();
        assert_eq!(budgets, vec![4000, 4000, 4000, 3000, 3500]);
    }
}
