use std::cell::Cell;

use chrono::NaiveDate;
use rapport_core::*;

struct EchoGenerator {
    calls: Cell<usize>,
}

impl TextGenerator for EchoGenerator {
    fn complete(&self, _system: &str, prompt: &str, _max: u32) -> Result<String, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(format!("analisis ({} chars)", prompt.len()))
    }
}

struct Utf8Extractor {}

impl ContentExtractor for Utf8Extractor {
    fn extract(&self, upload: &Upload) -> String {
        String::from_utf8_lossy(&upload.content).to_string()
    }
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn row(id: &str, prefix: &[&str], values: &[f64]) -> Vec<CellValue> {
    let mut r: Vec<CellValue> = vec![text(id)];
    r.extend(prefix.iter().map(|s| text(s)));
    r.extend(values.iter().map(|x| CellValue::Number(*x)));
    r
}

fn tables() -> SourceTables {
    let mut evidence_header = vec!["HSH".to_string(), "Fungsi".to_string(), "Direktorat".to_string()];
    evidence_header.extend(EVIDENCE_METRICS.iter().map(|m| m.name.to_string()));
    let mut survey_header = vec!["HSH".to_string(), "Fungsi".to_string()];
    survey_header.extend(SURVEY_LAYOUT.metrics().map(|m| m.name.to_string()));

    SourceTables {
        evidence_scores: Table::new(
            evidence_header,
            vec![row(
                "RU I",
                &["Operasi", "Pengolahan"],
                &[8.0, 7.0, 9.0, 6.0, 7.0, 8.0, 5.0, 9.0, 7.0],
            )],
        ),
        survey_scores: Table::new(survey_header, vec![]),
        evidence_benchmarks: Table::new(
            vec!["HSH".to_string()],
            vec![
                row("PERTAMINA GROUP", &[], &[6.0; 9]),
                row("RU I", &[], &[7.0, 7.0, 8.0, 6.0, 7.0, 8.0, 5.0, 9.0, 7.0]),
            ],
        ),
        survey_benchmarks: Table::new(vec!["HSH".to_string()], vec![row("PERTAMINA GROUP", &[], &[80.0; 13])]),
    }
}

#[test]
fn evidence_deltas_in_metric_order() {
    let dataset = Dataset::from_tables(tables()).unwrap();
    let own = dataset.evidence_row("RU I", "Operasi").unwrap();
    let resolution = resolve("RU I", dataset.evidence_benchmarks(), DEFAULT_FALLBACK_BENCHMARK).unwrap();
    assert_eq!(resolution.tier, MatchTier::Exact);

    let result = compare(own, resolution.row, &EVIDENCE_METRICS);
    let first_three: Vec<(&str, Delta)> = result
        .metrics
        .iter()
        .take(3)
        .map(|m| (m.name, m.delta))
        .collect();
    assert_eq!(
        first_three,
        vec![
            (
                "Strategi Budaya",
                Delta::Comparable {
                    value: 1.0,
                    classification: Classification::Ahead
                }
            ),
            (
                "Monitoring & Evaluasi",
                Delta::Comparable {
                    value: 0.0,
                    classification: Classification::Parity
                }
            ),
            (
                "Sosialisasi & Partisipasi",
                Delta::Comparable {
                    value: 1.0,
                    classification: Classification::Ahead
                }
            ),
        ]
    );
}

#[test]
fn full_report_run() {
    let _ = env_logger::try_init();
    let generator = EchoGenerator { calls: Cell::new(0) };
    let extractor = Utf8Extractor {};
    let pipeline = Pipeline::new(&generator, &extractor);
    let request = RunRequest {
        unit: "RU I".to_string(),
        sub_unit: "Operasi".to_string(),
        pcb: Some(Upload::new("pcb.csv", b"Goals,Initiatives".to_vec())),
        impact: None,
        generated_at: NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
    };
    let mut last = Stage::Idle;
    let outcome = pipeline
        .run(&Dataset::from_tables(tables()), &request, &mut |s| last = s)
        .unwrap();

    // Ready is left to the caller, after the document is written
    assert_eq!(last, Stage::Assembled);
    // strategy, programs, evidence. No impact document, no survey row.
    assert_eq!(generator.calls.get(), 3);
    assert!(outcome.bundle.evidence_comparison.is_generated());
    assert!(!outcome.bundle.impact.is_generated());
    assert!(!outcome.bundle.survey_comparison.is_generated());
    assert!(outcome.advisories.is_empty());
    assert_eq!(outcome.document.headings().len(), 5);
    assert_eq!(
        report_file_name(&request.sub_unit, request.generated_at.date()),
        "Rapp_Operasi_03_07.docx"
    );
}
