use log::{debug, info, warn};

use std::collections::BTreeSet;
use std::error::Error;

use crate::config::*;
use crate::matching::{normalize, normalize_opt};
use crate::ReportErrors;

/// The four raw tables a dataset is built from.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SourceTables {
    pub evidence_scores: Table,
    pub survey_scores: Table,
    pub evidence_benchmarks: Table,
    pub survey_benchmarks: Table,
}

/// Provides the raw source tables (for example from a set of workbooks).
pub trait TableSource {
    fn load_tables(&self) -> Result<SourceTables, Box<dyn Error>>;
}

/// The score and benchmark tables, loaded once and never modified.
///
/// Identifiers are normalized when the dataset is built. To pick up changes in the
/// sources, build a new dataset with [`Dataset::load`].
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    evidence_scores: Vec<ScoreRow>,
    survey_scores: Vec<ScoreRow>,
    evidence_benchmarks: Vec<BenchmarkRow>,
    survey_benchmarks: Vec<BenchmarkRow>,
}

impl Dataset {
    /// Reads all the tables from the source. Any failure makes the whole dataset unavailable.
    pub fn load(source: &dyn TableSource) -> Result<Dataset, ReportErrors> {
        let tables = source.load_tables().map_err(|e| {
            warn!("Dataset::load: {}", e);
            ReportErrors::DatasetUnavailable(e.to_string())
        })?;
        let dataset = Dataset::from_tables(tables)
            .map_err(|e| ReportErrors::DatasetUnavailable(e.to_string()))?;
        info!(
            "Dataset loaded: {} evidence rows, {} survey rows, {} evidence benchmarks, {} survey benchmarks",
            dataset.evidence_scores.len(),
            dataset.survey_scores.len(),
            dataset.evidence_benchmarks.len(),
            dataset.survey_benchmarks.len()
        );
        Ok(dataset)
    }

    pub fn from_tables(tables: SourceTables) -> Result<Dataset, ReportErrors> {
        Ok(Dataset {
            evidence_scores: read_score_rows(&tables.evidence_scores, &EVIDENCE_LAYOUT)?,
            survey_scores: read_score_rows(&tables.survey_scores, &SURVEY_LAYOUT)?,
            evidence_benchmarks: read_benchmark_rows(&tables.evidence_benchmarks),
            survey_benchmarks: read_benchmark_rows(&tables.survey_benchmarks),
        })
    }

    pub fn evidence_scores(&self) -> &[ScoreRow] {
        &self.evidence_scores
    }

    pub fn survey_scores(&self) -> &[ScoreRow] {
        &self.survey_scores
    }

    pub fn evidence_benchmarks(&self) -> &[BenchmarkRow] {
        &self.evidence_benchmarks
    }

    pub fn survey_benchmarks(&self) -> &[BenchmarkRow] {
        &self.survey_benchmarks
    }

    /// The evidence row of a sub-unit, if any.
    pub fn evidence_row(&self, unit: &str, sub_unit: &str) -> Option<&ScoreRow> {
        rows_for(&self.evidence_scores, unit, sub_unit)
    }

    /// The survey row of a sub-unit, if any.
    pub fn survey_row(&self, unit: &str, sub_unit: &str) -> Option<&ScoreRow> {
        rows_for(&self.survey_scores, unit, sub_unit)
    }

    /// The distinct units of the evidence table, sorted.
    pub fn units(&self) -> Vec<String> {
        let s: BTreeSet<String> = self
            .evidence_scores
            .iter()
            .filter_map(|r| r.identifier.clone())
            .collect();
        s.into_iter().collect()
    }

    /// The distinct sub-units of a unit in the evidence table, sorted.
    pub fn sub_units(&self, unit: &str) -> Vec<String> {
        let s: BTreeSet<String> = self
            .evidence_scores
            .iter()
            .filter(|r| r.identifier.as_deref() == Some(unit))
            .map(|r| r.sub_unit.clone())
            .collect();
        s.into_iter().collect()
    }
}

/// Finds the row of a (unit, sub-unit) pair.
///
/// The sub-unit must match exactly. The unit is compared on its normalized form,
/// and is not checked at all for tables that carry no unit column.
pub fn rows_for<'a>(rows: &'a [ScoreRow], unit: &str, sub_unit: &str) -> Option<&'a ScoreRow> {
    let unit_n = normalize(unit);
    rows.iter().find(|r| {
        r.sub_unit == sub_unit && (r.identifier.is_none() || r.normalized == unit_n)
    })
}

fn read_score_rows(table: &Table, layout: &TableLayout) -> Result<Vec<ScoreRow>, ReportErrors> {
    let sub_unit_idx = table
        .column_index(layout.sub_unit_column)
        .ok_or_else(|| ReportErrors::MissingColumn(layout.sub_unit_column.to_string()))?;
    let unit_idx = table.column_index(layout.unit_column);
    if unit_idx.is_none() {
        warn!(
            "read_score_rows: no {:?} column, rows will not carry a unit identifier",
            layout.unit_column
        );
    }
    let base = unit_idx.unwrap_or(0);

    let metric_columns: Vec<(&'static str, Option<usize>)> = layout
        .metrics()
        .map(|m| {
            let idx = match m.own {
                ColumnRef::Named(name) => table.column_index(name),
                ColumnRef::Offset(off) => Some(base + off),
            };
            if idx.is_none() {
                debug!("read_score_rows: column for {:?} not found", m.name);
            }
            (m.name, idx)
        })
        .collect();

    let mut res: Vec<ScoreRow> = Vec::new();
    for row in table.rows.iter() {
        if row.iter().all(|c| *c == CellValue::Empty) {
            continue;
        }
        let identifier: Option<String> = unit_idx.map(|idx| cell_label(row, idx));
        let normalized = normalize_opt(identifier.as_deref());
        let metrics = metric_columns
            .iter()
            .map(|(name, idx)| {
                let v = idx
                    .and_then(|i| row.get(i))
                    .map(MetricValue::from_cell)
                    .unwrap_or(MetricValue::NotAvailable);
                (name.to_string(), v)
            })
            .collect();
        res.push(ScoreRow {
            identifier,
            normalized,
            sub_unit: cell_label(row, sub_unit_idx),
            metrics,
        });
    }
    Ok(res)
}

fn read_benchmark_rows(table: &Table) -> Vec<BenchmarkRow> {
    table
        .rows
        .iter()
        .filter(|row| row.iter().any(|c| *c != CellValue::Empty))
        .map(|row| {
            let identifier = cell_label(row, 0);
            BenchmarkRow {
                normalized: normalize(&identifier),
                identifier,
                cells: row.clone(),
            }
        })
        .collect()
}

fn cell_label(row: &[CellValue], idx: usize) -> String {
    row.get(idx).map(|c| c.label()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    struct FailingSource {}

    impl TableSource for FailingSource {
        fn load_tables(&self) -> Result<SourceTables, Box<dyn Error>> {
            Err("documents/SKOR_TOTAL_ALL.xlsx not found".into())
        }
    }

    #[test]
    fn normalized_columns_are_attached() {
        let tables = SourceTables {
            evidence_scores: evidence_scores(&[("  ru  i ", "Operasi", &[1.0])]),
            survey_scores: survey_scores(&[]),
            evidence_benchmarks: benchmarks(&[(" Pertamina   group", &[1.0])]),
            survey_benchmarks: benchmarks(&[]),
        };
        let ds = Dataset::from_tables(tables).unwrap();
        assert_eq!(ds.evidence_scores()[0].normalized, "RU I");
        assert_eq!(
            ds.evidence_scores()[0].normalized,
            normalize_opt(ds.evidence_scores()[0].identifier.as_deref())
        );
        assert_eq!(ds.evidence_benchmarks()[0].normalized, "PERTAMINA GROUP");
        assert_eq!(ds.evidence_benchmarks()[0].identifier, " Pertamina   group");
    }

    #[test]
    fn evidence_metrics_read_by_offset() {
        let ds = small_dataset();
        let row = ds.evidence_row("RU I", "Operasi").unwrap();
        assert_eq!(row.metric("Strategi Budaya"), MetricValue::Numeric(8.0));
        assert_eq!(row.metric("Impact to Business"), MetricValue::Numeric(7.0));
        // Columns past the end of the row
        let tables = SourceTables {
            evidence_scores: evidence_scores(&[("RU I", "Operasi", &[8.0])]),
            survey_scores: survey_scores(&[]),
            ..SourceTables::default()
        };
        let ds = Dataset::from_tables(tables).unwrap();
        let row = ds.evidence_row("RU I", "Operasi").unwrap();
        assert_eq!(row.metric("SK AoC"), MetricValue::NotAvailable);
    }

    #[test]
    fn unknown_pair_is_absent() {
        let ds = small_dataset();
        assert!(ds.evidence_row("RU I", "Operasi").is_some());
        assert!(ds.evidence_row("ru  i", "Operasi").is_some());
        assert!(ds.evidence_row("RU I", "Pemasaran").is_none());
        assert!(ds.evidence_row("RU II", "Operasi").is_none());
        assert!(ds.survey_row("RU I", "Keuangan").is_none());
    }

    #[test]
    fn missing_unit_column_matches_on_sub_unit() {
        let table = Table::new(
            header(&["Fungsi", "Skor Survei"]),
            vec![vec![text("Operasi"), num(81.5)]],
        );
        let tables = SourceTables {
            evidence_scores: evidence_scores(&[]),
            survey_scores: table,
            ..SourceTables::default()
        };
        let ds = Dataset::from_tables(tables).unwrap();
        let row = ds.survey_row("RU I", "Operasi").unwrap();
        assert_eq!(row.identifier, None);
        assert_eq!(row.normalized, "");
        assert_eq!(row.metric("Skor Survei"), MetricValue::Numeric(81.5));
        assert_eq!(row.metric("P. Safety"), MetricValue::NotAvailable);
    }

    #[test]
    fn missing_sub_unit_column_is_an_error() {
        let tables = SourceTables {
            evidence_scores: Table::new(header(&["HSH"]), vec![]),
            survey_scores: survey_scores(&[]),
            ..SourceTables::default()
        };
        assert_eq!(
            Dataset::from_tables(tables),
            Err(ReportErrors::MissingColumn("Fungsi".to_string()))
        );
    }

    #[test]
    fn failing_source_makes_dataset_unavailable() {
        let res = Dataset::load(&FailingSource {});
        assert!(matches!(res, Err(ReportErrors::DatasetUnavailable(_))));
    }

    #[test]
    fn selection_lists_are_sorted_and_distinct() {
        let ds = small_dataset();
        assert_eq!(ds.units(), vec!["MOR III".to_string(), "RU I".to_string()]);
        assert_eq!(
            ds.sub_units("RU I"),
            vec!["Keuangan".to_string(), "Operasi".to_string()]
        );
        assert!(ds.sub_units("RU IX").is_empty());
    }

    #[test]
    fn blank_rows_are_skipped() {
        let mut table = evidence_scores(&[("RU I", "Operasi", &[1.0])]);
        table.rows.push(vec![CellValue::Empty; 4]);
        let tables = SourceTables {
            evidence_scores: table,
            survey_scores: survey_scores(&[]),
            ..SourceTables::default()
        };
        let ds = Dataset::from_tables(tables).unwrap();
        assert_eq!(ds.evidence_scores().len(), 1);
    }
}
