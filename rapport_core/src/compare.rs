use log::{debug, info};

use std::fmt::Display;

use crate::config::*;
use crate::dataset::Dataset;
use crate::matching::{resolve, Advisory, MatchTier};

/// The three-way classification of a delta.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Classification {
    /// The sub-unit is above its benchmark.
    Ahead,
    /// Same value as the benchmark.
    Parity,
    /// The sub-unit is below its benchmark: a development opportunity.
    Opportunity,
}

impl Classification {
    pub fn of(delta: f64) -> Classification {
        if delta > 0.0 {
            Classification::Ahead
        } else if delta < 0.0 {
            Classification::Opportunity
        } else {
            Classification::Parity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Ahead => "✓ LEBIH BAIK",
            Classification::Parity => "= SESUAI",
            Classification::Opportunity => "⚠ PELUANG PENGEMBANGAN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Classification::Ahead => "✓",
            Classification::Parity => "=",
            Classification::Opportunity => "⚠",
        }
    }
}

/// Own value minus benchmark value.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Delta {
    Comparable {
        value: f64,
        classification: Classification,
    },
    /// At least one of the two values is not a number.
    NotComparable,
}

impl Delta {
    pub fn between(own: &MetricValue, benchmark: &MetricValue) -> Delta {
        match (own.as_number(), benchmark.as_number()) {
            (Some(o), Some(b)) => {
                let value = o - b;
                Delta::Comparable {
                    value,
                    classification: Classification::of(value),
                }
            }
            _ => Delta::NotComparable,
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Delta::Comparable { classification, .. } => Some(*classification),
            Delta::NotComparable => None,
        }
    }

    /// The signed value with its short marker, e.g. `+1.50 ✓`.
    pub fn short(&self) -> String {
        match self {
            Delta::Comparable {
                value,
                classification,
            } => format!("{:+.2} {}", value, classification.symbol()),
            Delta::NotComparable => "N/A".to_string(),
        }
    }
}

impl Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delta::Comparable {
                value,
                classification,
            } => write!(f, "{:+.2} {}", value, classification.label()),
            Delta::NotComparable => write!(f, "N/A (tidak dapat dibandingkan)"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct MetricComparison {
    pub name: &'static str,
    pub label: &'static str,
    pub own: MetricValue,
    pub benchmark: MetricValue,
    pub delta: Delta,
}

/// A sub-unit's metrics side by side with the benchmark's, in layout order.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonResult {
    pub benchmark_identifier: String,
    pub metrics: Vec<MetricComparison>,
}

impl ComparisonResult {
    pub fn get(&self, name: &str) -> Option<&MetricComparison> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Compares the own row against the benchmark row, metric by metric.
///
/// Own values are read by name, benchmark values by their offset from the benchmark
/// identifier column.
pub fn compare(own: &ScoreRow, benchmark: &BenchmarkRow, metrics: &[MetricSpec]) -> ComparisonResult {
    let metrics = metrics
        .iter()
        .map(|spec| {
            let own_v = own.metric(spec.name);
            let bench_v = benchmark.at_offset(spec.benchmark_offset);
            let delta = Delta::between(&own_v, &bench_v);
            debug!(
                "compare: {}: own {:?} benchmark {:?} delta {:?}",
                spec.name, own_v, bench_v, delta
            );
            MetricComparison {
                name: spec.name,
                label: spec.label,
                own: own_v,
                benchmark: bench_v,
                delta,
            }
        })
        .collect();
    ComparisonResult {
        benchmark_identifier: benchmark.identifier.clone(),
        metrics,
    }
}

/// The outcome of one of the two comparison analyses.
#[derive(PartialEq, Debug, Clone)]
pub enum Comparison<R> {
    Ready {
        report: R,
        /// Set when the benchmark was not found by exact match.
        advisory: Option<Advisory>,
    },
    /// The comparison could not be made. Holds the message for the report.
    NoData(String),
}

/// Evidence metrics of a sub-unit against its benchmark.
#[derive(PartialEq, Debug, Clone)]
pub struct EvidenceReport {
    pub sub_unit: String,
    pub own_identifier: String,
    pub tier: MatchTier,
    pub comparison: ComparisonResult,
}

impl Display for EvidenceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bench = &self.comparison.benchmark_identifier;
        writeln!(f, "PERBANDINGAN EVIDENCE")?;
        writeln!(f)?;
        writeln!(f, "Fungsi: {}", self.sub_unit)?;
        writeln!(f, "HSH Fungsi: {}", self.own_identifier)?;
        writeln!(f, "HSH Benchmark: {}", bench)?;
        writeln!(f)?;
        writeln!(f, "=== DATA FUNGSI ===")?;
        for m in self.comparison.metrics.iter() {
            writeln!(f, "- {}: {}", m.label, m.own)?;
        }
        writeln!(f)?;
        writeln!(f, "=== BENCHMARK ({}) ===", bench)?;
        for m in self.comparison.metrics.iter() {
            writeln!(f, "- {}: {}", m.label, m.benchmark)?;
        }
        writeln!(f)?;
        writeln!(f, "=== SELISIH (Fungsi - Benchmark) ===")?;
        for m in self.comparison.metrics.iter() {
            writeln!(f, "- {}: {}", m.label, m.delta)?;
        }
        writeln!(f)?;
        writeln!(f, "Catatan:")?;
        writeln!(f, "- Nilai positif (+) = Fungsi LEBIH BAIK dari benchmark")?;
        writeln!(f, "- Nilai negatif (-) = Fungsi memiliki PELUANG PENGEMBANGAN")?;
        writeln!(f, "- Nilai nol (0) = Fungsi SESUAI dengan benchmark")
    }
}

/// Survey scores of a sub-unit against its benchmark: the three headline scores,
/// then the worker and partner dimensions.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyReport {
    pub sub_unit: String,
    pub own_identifier: String,
    pub tier: MatchTier,
    pub headlines: ComparisonResult,
    pub worker: ComparisonResult,
    pub partner: ComparisonResult,
}

impl SurveyReport {
    fn write_side(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        value: fn(&MetricComparison) -> &MetricValue,
    ) -> std::fmt::Result {
        let h = &self.headlines.metrics;
        // Headlines are total, worker, partner
        if let [total, worker, partner] = h.as_slice() {
            writeln!(f, "• {}: {}", total.label, value(total))?;
            writeln!(f, "• {}: {}", worker.label, value(worker))?;
            for m in self.worker.metrics.iter() {
                writeln!(f, "  - {}: {}", m.label, value(m))?;
            }
            writeln!(f)?;
            writeln!(f, "• {}: {}", partner.label, value(partner))?;
            for m in self.partner.metrics.iter() {
                writeln!(f, "  - {}: {}", m.label, value(m))?;
            }
        }
        Ok(())
    }
}

impl Display for SurveyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bench = &self.headlines.benchmark_identifier;
        writeln!(f, "PERBANDINGAN SKOR SURVEI")?;
        writeln!(f)?;
        writeln!(f, "Fungsi: {}", self.sub_unit)?;
        writeln!(f, "HSH Fungsi: {}", self.own_identifier)?;
        writeln!(f, "HSH Benchmark: {}", bench)?;
        writeln!(f)?;
        writeln!(f, "=== RINGKASAN SKOR FUNGSI ===")?;
        self.write_side(f, |m| &m.own)?;
        writeln!(f)?;
        writeln!(f, "=== BENCHMARK ({}) ===", bench)?;
        self.write_side(f, |m| &m.benchmark)?;
        writeln!(f)?;
        writeln!(f, "=== SELISIH (Fungsi - Benchmark) ===")?;
        for m in self.headlines.metrics.iter() {
            writeln!(f, "• {}: {}", m.label, m.delta.short())?;
        }
        writeln!(f)?;
        writeln!(f, "=== SELISIH PER DIMENSI ===")?;
        for m in self.worker.metrics.iter().chain(self.partner.metrics.iter()) {
            writeln!(f, "  - {}: {}", m.label, m.delta.short())?;
        }
        writeln!(f)?;
        writeln!(f, "Catatan:")?;
        writeln!(f, "✓ = Fungsi LEBIH BAIK dari benchmark")?;
        writeln!(f, "⚠ = Fungsi memiliki PELUANG PENGEMBANGAN")?;
        writeln!(f, "= = Fungsi SESUAI dengan benchmark")
    }
}

pub const EVIDENCE_ROW_MISSING: &str = "Data fungsi tidak ditemukan dalam file SKOR_TOTAL_ALL";
pub const SURVEY_ROW_MISSING: &str = "Data survei fungsi tidak ditemukan dalam file Skor_SURVEI_ALL";

fn no_benchmark(table: &str) -> String {
    format!(
        "Data benchmark {} tidak ditemukan: tabel benchmark kosong",
        table
    )
}

/// Runs the evidence comparison of a sub-unit.
pub fn evidence_comparison(
    dataset: &Dataset,
    unit: &str,
    sub_unit: &str,
    fallback_label: &str,
) -> Comparison<EvidenceReport> {
    let row = match dataset.evidence_row(unit, sub_unit) {
        Some(r) => r,
        None => {
            info!("evidence_comparison: no row for {:?} / {:?}", unit, sub_unit);
            return Comparison::NoData(EVIDENCE_ROW_MISSING.to_string());
        }
    };
    let own_identifier = row.identifier.clone().unwrap_or_else(|| unit.to_string());
    let resolution = match resolve(&own_identifier, dataset.evidence_benchmarks(), fallback_label) {
        Ok(r) => r,
        Err(e) => {
            info!("evidence_comparison: {}", e);
            return Comparison::NoData(no_benchmark("evidence"));
        }
    };
    let advisory = Advisory::for_resolution("evidence", &own_identifier, &resolution);
    let report = EvidenceReport {
        sub_unit: sub_unit.to_string(),
        tier: resolution.tier,
        comparison: compare(row, resolution.row, &EVIDENCE_METRICS),
        own_identifier,
    };
    Comparison::Ready { report, advisory }
}

/// Runs the survey comparison of a sub-unit.
pub fn survey_comparison(
    dataset: &Dataset,
    unit: &str,
    sub_unit: &str,
    fallback_label: &str,
) -> Comparison<SurveyReport> {
    let row = match dataset.survey_row(unit, sub_unit) {
        Some(r) => r,
        None => {
            info!("survey_comparison: no row for {:?} / {:?}", unit, sub_unit);
            return Comparison::NoData(SURVEY_ROW_MISSING.to_string());
        }
    };
    let own_identifier = row.identifier.clone().unwrap_or_else(|| unit.to_string());
    let resolution = match resolve(&own_identifier, dataset.survey_benchmarks(), fallback_label) {
        Ok(r) => r,
        Err(e) => {
            info!("survey_comparison: {}", e);
            return Comparison::NoData(no_benchmark("survei"));
        }
    };
    let advisory = Advisory::for_resolution("survei", &own_identifier, &resolution);
    let report = SurveyReport {
        sub_unit: sub_unit.to_string(),
        tier: resolution.tier,
        headlines: compare(row, resolution.row, &SURVEY_HEADLINES),
        worker: compare(row, resolution.row, &SURVEY_WORKER_DIMENSIONS),
        partner: compare(row, resolution.row, &SURVEY_PARTNER_DIMENSIONS),
        own_identifier,
    };
    Comparison::Ready { report, advisory }
}
