use log::{debug, info, warn};

use rapport_core::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::{Args, Command};
use crate::rapport::config_reader::*;
use crate::rapport::io_docx::render_docx;
use crate::rapport::io_tables::WorkbookSource;
use crate::rapport::io_uploads::{read_optional_upload, read_upload, FileExtractor};
use crate::rapport::openai::OpenAiGenerator;

pub mod config_reader;
mod io_common;
mod io_docx;
mod io_tables;
mod io_uploads;
mod openai;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RapportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet:?} not found in {path}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error reading configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error reading {path}"))]
    ReadingUpload {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Environment variable {variable} is not set: the API key is required"))]
    MissingApiKey { variable: String },
    #[snafu(display("Error building the HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Report { source: ReportErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RapportResult<T> = Result<T, RapportError>;

pub fn run(args: &Args) -> RapportResult<()> {
    let (config, root) = read_config(args.config.as_deref())?;
    let source = WorkbookSource::from_config(&config, &root);
    match &args.command {
        Command::List { unit } => run_list(&config, &source, unit.as_deref()),
        Command::Analyze {
            unit,
            sub_unit,
            pcb,
            impact,
            out,
        } => run_analysis(
            &config,
            &root,
            &source,
            unit,
            sub_unit,
            pcb.as_deref(),
            impact.as_deref(),
            out.as_deref(),
        ),
    }
}

/// Prints the units, or the sub-units of one unit.
pub fn run_list(config: &RapportConfig, source: &WorkbookSource, unit: Option<&str>) -> RapportResult<()> {
    let dataset = load_dataset(config, source)?;
    match unit {
        None => {
            for u in dataset.units() {
                println!("{}", u);
            }
        }
        Some(u) => {
            let sub_units = dataset.sub_units(u);
            if sub_units.is_empty() {
                warn!("run_list: no sub-unit found for {:?}", u);
            }
            for s in sub_units {
                println!("{}", s);
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_analysis(
    config: &RapportConfig,
    root: &Path,
    source: &WorkbookSource,
    unit: &str,
    sub_unit: &str,
    pcb_path: Option<&str>,
    impact_path: Option<&str>,
    out: Option<&str>,
) -> RapportResult<()> {
    let settings = config.generator();
    let variable = settings.api_key_env();
    let api_key = match std::env::var(&variable) {
        Ok(k) if !k.trim().is_empty() => k,
        _ => return MissingApiKeySnafu { variable }.fail(),
    };
    let generator = OpenAiGenerator::new(&settings, api_key)?;
    let extractor = FileExtractor::new(&config.ocr());

    let dataset = Dataset::load(source);
    if let Err(e) = &dataset {
        print_dataset_hint(config, e);
    }

    let request = RunRequest {
        unit: unit.to_string(),
        sub_unit: sub_unit.to_string(),
        pcb: pcb_path.map(read_upload).transpose()?,
        impact: impact_path.map(read_optional_upload),
        generated_at: chrono::Local::now().naive_local(),
    };
    if request.pcb.is_some() {
        println!("✅ Memproses analisis untuk {} (HSH: {})", sub_unit, unit);
    }

    let fallback = config.fallback_benchmark();
    let pipeline = Pipeline::new(&generator, &extractor).fallback_label(&fallback);
    let outcome = pipeline
        .run(&dataset, &request, &mut print_stage)
        .context(ReportSnafu {})?;

    for advisory in outcome.advisories.iter() {
        println!("⚠ {}", advisory);
    }

    println!();
    println!("Hasil Analisis");
    for (idx, (topic, analysis)) in outcome.bundle.sections().into_iter().enumerate() {
        println!();
        println!("### {}", section_heading(idx + 1, topic));
        println!("{}", analysis.as_text());
    }

    let path: PathBuf = match out {
        Some(p) => PathBuf::from(p),
        None => config
            .output_directory(root)
            .join(report_file_name(sub_unit, request.generated_at.date())),
    };
    write_report(&outcome.document, &path)?;
    print_stage(Stage::Ready);
    println!();
    println!("✅ Dokumen siap didownload: {}", path.display());
    Ok(())
}

fn print_stage(stage: Stage) {
    println!("[{:>3}%] {}", stage.progress(), stage.description())
}

fn write_report(document: &ReportDocument, path: &Path) -> RapportResult<()> {
    let bytes = render_docx(document)?;
    debug!("write_report: writing {} bytes to {:?}", bytes.len(), path);
    fs::write(path, bytes).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })?;
    info!("write_report: report written to {:?}", path);
    Ok(())
}

fn load_dataset(config: &RapportConfig, source: &WorkbookSource) -> RapportResult<Dataset> {
    Dataset::load(source).map_err(|e| {
        print_dataset_hint(config, &e);
        RapportError::Report { source: e }
    })
}

fn print_dataset_hint(config: &RapportConfig, err: &ReportErrors) {
    warn!("load_dataset: {}", err);
    let sources = config.data_sources();
    eprintln!(
        "Pastikan file berikut tersedia: {} ({}), {} ({}), {} ({}), {} ({})",
        sources.evidence_scores().file_path,
        sources.evidence_scores().worksheet_name,
        sources.survey_scores().file_path,
        sources.survey_scores().worksheet_name,
        sources.evidence_benchmarks().file_path,
        sources.evidence_benchmarks().worksheet_name,
        sources.survey_benchmarks().file_path,
        sources.survey_benchmarks().worksheet_name,
    );
}
