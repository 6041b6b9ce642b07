// Reading the source tables from Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use std::error::Error;

use crate::rapport::io_common::{cell_text, cell_value};
use crate::rapport::*;

/// The four source worksheets, with their paths already resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WorkbookSource {
    pub evidence_scores: (PathBuf, String),
    pub survey_scores: (PathBuf, String),
    pub evidence_benchmarks: (PathBuf, String),
    pub survey_benchmarks: (PathBuf, String),
}

impl WorkbookSource {
    pub fn from_config(config: &RapportConfig, root: &Path) -> WorkbookSource {
        let sources = config.data_sources();
        let resolve = |s: SheetSource| (s.resolve(root), s.worksheet_name);
        WorkbookSource {
            evidence_scores: resolve(sources.evidence_scores()),
            survey_scores: resolve(sources.survey_scores()),
            evidence_benchmarks: resolve(sources.evidence_benchmarks()),
            survey_benchmarks: resolve(sources.survey_benchmarks()),
        }
    }
}

impl TableSource for WorkbookSource {
    fn load_tables(&self) -> Result<SourceTables, Box<dyn Error>> {
        let read = |(path, worksheet): &(PathBuf, String)| read_worksheet(path, worksheet);
        Ok(SourceTables {
            evidence_scores: read(&self.evidence_scores)?,
            survey_scores: read(&self.survey_scores)?,
            evidence_benchmarks: read(&self.evidence_benchmarks)?,
            survey_benchmarks: read(&self.survey_benchmarks)?,
        })
    }
}

pub fn read_worksheet(path: &Path, worksheet: &str) -> RapportResult<Table> {
    let path_s = path.display().to_string();
    debug!("read_worksheet: path: {:?} worksheet: {:?}", path_s, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path_s.clone(),
    })?;
    let wrange = workbook
        .worksheet_range(worksheet)
        .context(MissingWorksheetSnafu {
            path: path_s.clone(),
            worksheet,
        })?
        .context(OpeningExcelSnafu { path: path_s.clone() })?;
    let table = range_to_table(&wrange);
    info!(
        "read_worksheet: {:?} / {:?}: {} columns, {} rows",
        path_s,
        worksheet,
        table.header.len(),
        table.rows.len()
    );
    Ok(table)
}

/// The first row is the header, the other rows are kept as they are.
pub fn range_to_table(wrange: &Range<DataType>) -> Table {
    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Table::default(),
    };
    let rows: Vec<Vec<CellValue>> = iter
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    Table::new(header, rows)
}
