use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::assemble::{assemble, ReportDocument};
use crate::compare::{evidence_comparison, survey_comparison, Comparison};
use crate::config::{AnalysisBundle, AnalysisOutcome, Topic, DEFAULT_FALLBACK_BENCHMARK};
use crate::dataset::Dataset;
use crate::matching::Advisory;
use crate::narrative::{Narrator, TextGenerator};
use crate::ReportErrors;

/// The stages of a run, in the order they are entered.
///
/// [`Pipeline::run`] stops at `Assembled`. `Ready` belongs to the caller, once the
/// document has been delivered.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Stage {
    Idle,
    DatasetLoaded,
    InputsRead,
    Strategy,
    Programs,
    Impact,
    EvidenceComparison,
    SurveyComparison,
    Assembled,
    Ready,
}

impl Stage {
    /// Percentage of the run completed when the stage is entered.
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::DatasetLoaded => 5,
            Stage::InputsRead => 10,
            Stage::Strategy => 25,
            Stage::Programs => 40,
            Stage::Impact => 55,
            Stage::EvidenceComparison => 70,
            Stage::SurveyComparison => 85,
            Stage::Assembled => 95,
            Stage::Ready => 100,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Idle => "Memulai analisis...",
            Stage::DatasetLoaded => "Memuat data...",
            Stage::InputsRead => "Membaca dokumen...",
            Stage::Strategy => "Menganalisis Strategi Budaya...",
            Stage::Programs => "Menganalisis Program Budaya...",
            Stage::Impact => "Menganalisis Impact to Business...",
            Stage::EvidenceComparison => "Menganalisis Perbandingan Evidence...",
            Stage::SurveyComparison => "Menganalisis Perbandingan Survei...",
            Stage::Assembled => "Membuat dokumen Word...",
            Stage::Ready => "Analisis selesai!",
        }
    }
}

/// An uploaded document: the original file name and the raw bytes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Set when the file could not be read. The reason stands in for its text.
    pub unreadable: Option<String>,
}

impl Upload {
    pub fn new(file_name: &str, content: Vec<u8>) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content,
            unreadable: None,
        }
    }

    pub fn unreadable(file_name: &str, reason: String) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content: Vec::new(),
            unreadable: Some(reason),
        }
    }

    /// The lower-cased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

/// Turns an upload into text.
///
/// Never fails: unreadable or unsupported uploads are described in the returned text.
pub trait ContentExtractor {
    fn extract(&self, upload: &Upload) -> String;
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunRequest {
    pub unit: String,
    pub sub_unit: String,
    /// The primary (PCB) document. Required.
    pub pcb: Option<Upload>,
    pub impact: Option<Upload>,
    pub generated_at: NaiveDateTime,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunOutcome {
    pub bundle: AnalysisBundle,
    /// Notices about benchmarks that were not found by exact match.
    pub advisories: Vec<Advisory>,
    pub document: ReportDocument,
}

/// Sequences one report run: checks, extraction, the five analyses, assembly.
pub struct Pipeline<'a> {
    generator: &'a dyn TextGenerator,
    extractor: &'a dyn ContentExtractor,
    fallback_label: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(generator: &'a dyn TextGenerator, extractor: &'a dyn ContentExtractor) -> Pipeline<'a> {
        Pipeline {
            generator,
            extractor,
            fallback_label: DEFAULT_FALLBACK_BENCHMARK.to_string(),
        }
    }

    /// Sets the label of the benchmark row used when a unit has no benchmark of its own.
    pub fn fallback_label(mut self, label: &str) -> Pipeline<'a> {
        self.fallback_label = label.to_string();
        self
    }

    fn extract(&self, upload: &Upload) -> String {
        match &upload.unreadable {
            Some(reason) => {
                warn!("extract: {:?} is unreadable: {}", upload.file_name, reason);
                reason.clone()
            }
            None => self.extractor.extract(upload),
        }
    }

    /// Runs the analyses of one sub-unit.
    ///
    /// Fails only when the dataset did not load or when the PCB document is missing.
    /// Both are checked before any extraction or generator call. Every other failure
    /// ends up as text in the corresponding section.
    ///
    /// The observer is told about each stage as it is entered, up to `Assembled`.
    pub fn run(
        &self,
        dataset: &Result<Dataset, ReportErrors>,
        request: &RunRequest,
        observer: &mut dyn FnMut(Stage),
    ) -> Result<RunOutcome, ReportErrors> {
        observer(Stage::Idle);
        let dataset = dataset.as_ref().map_err(|e| e.clone())?;
        observer(Stage::DatasetLoaded);

        let pcb = request
            .pcb
            .as_ref()
            .ok_or(ReportErrors::MissingPrimaryDocument)?;
        info!(
            "run: {:?} / {:?}, pcb {:?}, impact {:?}",
            request.unit,
            request.sub_unit,
            pcb.file_name,
            request.impact.as_ref().map(|u| u.file_name.as_str())
        );
        let pcb_text = self.extract(pcb);
        let impact_text = request.impact.as_ref().map(|u| self.extract(u));
        debug!(
            "run: extracted {} chars of pcb, {:?} chars of impact",
            pcb_text.len(),
            impact_text.as_ref().map(|s| s.len())
        );
        observer(Stage::InputsRead);

        let narrator = Narrator::new(self.generator);
        let mut advisories: Vec<Advisory> = Vec::new();

        observer(Stage::Strategy);
        let strategy = narrator.generate(Topic::Strategy, &pcb_text);

        observer(Stage::Programs);
        let programs = narrator.generate(Topic::Programs, &pcb_text);

        observer(Stage::Impact);
        let impact = narrator.generate_impact(impact_text.as_deref());

        observer(Stage::EvidenceComparison);
        let evidence = match evidence_comparison(
            dataset,
            &request.unit,
            &request.sub_unit,
            &self.fallback_label,
        ) {
            Comparison::Ready { report, advisory } => {
                advisories.extend(advisory);
                narrator.generate(Topic::EvidenceComparison, &report.to_string())
            }
            Comparison::NoData(msg) => AnalysisOutcome::Unavailable(msg),
        };

        observer(Stage::SurveyComparison);
        let survey = match survey_comparison(
            dataset,
            &request.unit,
            &request.sub_unit,
            &self.fallback_label,
        ) {
            Comparison::Ready { report, advisory } => {
                advisories.extend(advisory);
                narrator.generate(Topic::SurveyComparison, &report.to_string())
            }
            Comparison::NoData(msg) => AnalysisOutcome::Unavailable(msg),
        };

        let bundle = AnalysisBundle {
            strategy,
            programs,
            impact,
            evidence_comparison: evidence,
            survey_comparison: survey,
        };

        observer(Stage::Assembled);
        let document = assemble(&request.sub_unit, &bundle, request.generated_at);
        info!(
            "run: done, {} of 5 sections generated, {} advisories",
            bundle.sections().iter().filter(|(_, o)| o.is_generated()).count(),
            advisories.len()
        );
        Ok(RunOutcome {
            bundle,
            advisories,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::small_dataset;
    use crate::narrative::testing::ScriptedGenerator;
    use crate::narrative::IMPACT_NOT_PROVIDED;
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct CountingExtractor {
        calls: Cell<usize>,
    }

    impl CountingExtractor {
        fn new() -> CountingExtractor {
            CountingExtractor { calls: Cell::new(0) }
        }
    }

    impl ContentExtractor for CountingExtractor {
        fn extract(&self, upload: &Upload) -> String {
            self.calls.set(self.calls.get() + 1);
            String::from_utf8_lossy(&upload.content).to_string()
        }
    }

    fn upload(name: &str, content: &str) -> Upload {
        Upload::new(name, content.as_bytes().to_vec())
    }

    fn request(unit: &str, sub_unit: &str, pcb: Option<Upload>, impact: Option<Upload>) -> RunRequest {
        RunRequest {
            unit: unit.to_string(),
            sub_unit: sub_unit.to_string(),
            pcb,
            impact,
            generated_at: NaiveDate::from_ymd_opt(2025, 3, 7)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn dataset_failure_stops_before_any_call() {
        let generator = ScriptedGenerator::new();
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor);
        let dataset = Err(ReportErrors::DatasetUnavailable("no such file".to_string()));
        let mut stages = vec![];
        let req = request("RU I", "Operasi", Some(upload("pcb.csv", "a,b")), None);
        let res = pipeline.run(&dataset, &req, &mut |s| stages.push(s));
        assert_eq!(
            res,
            Err(ReportErrors::DatasetUnavailable("no such file".to_string()))
        );
        assert_eq!(generator.count(), 0);
        assert_eq!(extractor.calls.get(), 0);
        assert_eq!(stages, vec![Stage::Idle]);
    }

    #[test]
    fn missing_pcb_stops_before_any_call() {
        let generator = ScriptedGenerator::new();
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor);
        let req = request("RU I", "Operasi", None, Some(upload("impact.pdf", "x")));
        let res = pipeline.run(&Ok(small_dataset()), &req, &mut |_| {});
        assert_eq!(res, Err(ReportErrors::MissingPrimaryDocument));
        assert_eq!(generator.count(), 0);
        assert_eq!(extractor.calls.get(), 0);
    }

    #[test]
    fn full_run_in_stage_order() {
        let generator = ScriptedGenerator::new();
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor);
        let req = request(
            "RU I",
            "Operasi",
            Some(upload("pcb.csv", "strategi")),
            Some(upload("impact.csv", "dampak")),
        );
        let mut stages = vec![];
        let out = pipeline
            .run(&Ok(small_dataset()), &req, &mut |s| stages.push(s))
            .unwrap();
        assert_eq!(generator.count(), 5);
        assert_eq!(extractor.calls.get(), 2);
        assert_eq!(
            stages,
            vec![
                Stage::Idle,
                Stage::DatasetLoaded,
                Stage::InputsRead,
                Stage::Strategy,
                Stage::Programs,
                Stage::Impact,
                Stage::EvidenceComparison,
                Stage::SurveyComparison,
                Stage::Assembled,
            ]
        );
        let progress: Vec<u8> = stages.iter().map(|s| s.progress()).collect();
        let mut sorted = progress.clone();
        sorted.sort_unstable();
        assert_eq!(progress, sorted);
        assert!(!stages.contains(&Stage::Ready));
        assert!(out.advisories.is_empty());
        assert_eq!(out.bundle.strategy, AnalysisOutcome::Generated("narasi 0".to_string()));
        assert_eq!(
            out.bundle.survey_comparison,
            AnalysisOutcome::Generated("narasi 4".to_string())
        );
        // The comparison report is what the generator sees
        let calls = generator.calls.borrow();
        assert!(calls[3].0.contains("PERBANDINGAN EVIDENCE"));
        assert!(calls[4].0.contains("PERBANDINGAN SKOR SURVEI"));
        assert_eq!(out.document.headings().len(), 5);
    }

    #[test]
    fn one_failed_slot_still_gives_five_sections() {
        let generator = ScriptedGenerator::failing_at(1);
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor);
        let req = request("RU I", "Operasi", Some(upload("pcb.csv", "strategi")), None);
        let out = pipeline.run(&Ok(small_dataset()), &req, &mut |_| {}).unwrap();
        assert!(matches!(out.bundle.programs, AnalysisOutcome::Failed(_)));
        assert_eq!(
            out.bundle.impact,
            AnalysisOutcome::Unavailable(IMPACT_NOT_PROVIDED.to_string())
        );
        // strategy, programs, evidence, survey
        assert_eq!(generator.count(), 4);
        assert_eq!(out.document.headings().len(), 5);
    }

    #[test]
    fn missing_rows_and_fallback_benchmark() {
        let generator = ScriptedGenerator::new();
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor).fallback_label("pertamina group");
        let req = request("MOR III", "Pemasaran", Some(upload("pcb.csv", "x")), None);
        let out = pipeline.run(&Ok(small_dataset()), &req, &mut |_| {}).unwrap();
        assert!(out.bundle.evidence_comparison.is_generated());
        assert_eq!(
            out.bundle.survey_comparison,
            AnalysisOutcome::Unavailable(crate::compare::SURVEY_ROW_MISSING.to_string())
        );
        assert_eq!(out.advisories.len(), 1);
        assert_eq!(out.advisories[0].chosen, "PERTAMINA GROUP");
        // strategy, programs, evidence
        assert_eq!(generator.count(), 3);
    }

    #[test]
    fn unreadable_impact_keeps_the_run_going() {
        let generator = ScriptedGenerator::new();
        let extractor = CountingExtractor::new();
        let pipeline = Pipeline::new(&generator, &extractor);
        let impact = Upload::unreadable(
            "impact.pdf",
            "Error reading file: No such file or directory (os error 2)".to_string(),
        );
        let req = request("RU I", "Operasi", Some(upload("pcb.csv", "strategi")), Some(impact));
        let out = pipeline.run(&Ok(small_dataset()), &req, &mut |_| {}).unwrap();
        // only the pcb goes through the extractor
        assert_eq!(extractor.calls.get(), 1);
        assert_eq!(generator.count(), 5);
        assert!(out.bundle.impact.is_generated());
        let calls = generator.calls.borrow();
        assert!(calls[2].0.contains("Error reading file: No such file or directory"));
        assert_eq!(out.document.headings().len(), 5);
    }

    #[test]
    fn upload_extension() {
        assert_eq!(upload("PCB.XLSX", "").extension(), Some("xlsx".to_string()));
        assert_eq!(upload("laporan.final.pdf", "").extension(), Some("pdf".to_string()));
        assert_eq!(upload("README", "").extension(), None);
    }
}
