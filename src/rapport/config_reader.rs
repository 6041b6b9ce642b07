use crate::rapport::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-5-mini-2025-08-07";

/// One worksheet of a workbook.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SheetSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: String,
}

impl SheetSource {
    fn new(file_path: &str, worksheet_name: &str) -> SheetSource {
        SheetSource {
            file_path: file_path.to_string(),
            worksheet_name: worksheet_name.to_string(),
        }
    }

    /// The file path, resolved against the given directory when relative.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.file_path)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataSources {
    #[serde(rename = "evidenceScores")]
    _evidence_scores: Option<SheetSource>,
    #[serde(rename = "surveyScores")]
    _survey_scores: Option<SheetSource>,
    #[serde(rename = "evidenceBenchmarks")]
    _evidence_benchmarks: Option<SheetSource>,
    #[serde(rename = "surveyBenchmarks")]
    _survey_benchmarks: Option<SheetSource>,
}

impl DataSources {
    pub fn evidence_scores(&self) -> SheetSource {
        self._evidence_scores
            .clone()
            .unwrap_or_else(|| SheetSource::new("documents/SKOR_TOTAL_ALL.xlsx", "SKOR TOTAL_ALL"))
    }

    pub fn survey_scores(&self) -> SheetSource {
        self._survey_scores.clone().unwrap_or_else(|| {
            SheetSource::new("documents/Skor_SURVEI_ALL.xlsx", "Skor_SURVEI_ALL_FUNGSI")
        })
    }

    pub fn evidence_benchmarks(&self) -> SheetSource {
        self._evidence_benchmarks
            .clone()
            .unwrap_or_else(|| SheetSource::new("documents/Skor_benchmark.xlsx", "Evidence"))
    }

    pub fn survey_benchmarks(&self) -> SheetSource {
        self._survey_benchmarks
            .clone()
            .unwrap_or_else(|| SheetSource::new("documents/Skor_benchmark.xlsx", "Survei"))
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratorSettings {
    #[serde(rename = "endpoint")]
    _endpoint: Option<String>,
    #[serde(rename = "model")]
    _model: Option<String>,
    #[serde(rename = "temperature")]
    _temperature: Option<f64>,
    #[serde(rename = "timeoutSeconds")]
    _timeout_seconds: Option<u64>,
    #[serde(rename = "apiKeyEnv")]
    _api_key_env: Option<String>,
}

impl GeneratorSettings {
    pub fn endpoint(&self) -> String {
        self._endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn model(&self) -> String {
        self._model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn temperature(&self) -> f64 {
        self._temperature.unwrap_or(0.7)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self._timeout_seconds.unwrap_or(60)
    }

    /// Name of the environment variable holding the API key.
    pub fn api_key_env(&self) -> String {
        self._api_key_env
            .clone()
            .unwrap_or_else(|| "OPENAI_API_KEY".to_string())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OcrSettings {
    #[serde(rename = "command")]
    _command: Option<String>,
    #[serde(rename = "languages")]
    _languages: Option<String>,
}

impl OcrSettings {
    pub fn command(&self) -> String {
        self._command.clone().unwrap_or_else(|| "tesseract".to_string())
    }

    pub fn languages(&self) -> String {
        self._languages.clone().unwrap_or_else(|| "ind+eng".to_string())
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RapportConfig {
    #[serde(rename = "dataSources")]
    _data_sources: Option<DataSources>,
    #[serde(rename = "generator")]
    _generator: Option<GeneratorSettings>,
    #[serde(rename = "ocr")]
    _ocr: Option<OcrSettings>,
    #[serde(rename = "fallbackBenchmark")]
    _fallback_benchmark: Option<String>,
    #[serde(rename = "outputDirectory")]
    _output_directory: Option<String>,
}

impl RapportConfig {
    pub fn data_sources(&self) -> DataSources {
        self._data_sources.clone().unwrap_or_default()
    }

    pub fn generator(&self) -> GeneratorSettings {
        self._generator.clone().unwrap_or_default()
    }

    pub fn ocr(&self) -> OcrSettings {
        self._ocr.clone().unwrap_or_default()
    }

    pub fn fallback_benchmark(&self) -> String {
        self._fallback_benchmark
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK_BENCHMARK.to_string())
    }

    pub fn output_directory(&self, root: &Path) -> PathBuf {
        root.join(self._output_directory.as_deref().unwrap_or("."))
    }
}

/// Reads the configuration file, if any.
///
/// Returns the configuration and the directory relative paths are resolved against:
/// the directory of the file, or the working directory without a file.
pub fn read_config(path: Option<&str>) -> RapportResult<(RapportConfig, PathBuf)> {
    let path = match path {
        Some(p) => p,
        None => {
            info!("read_config: no configuration file, using defaults");
            return Ok((RapportConfig::default(), PathBuf::from(".")));
        }
    };
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config = parse_config(&contents)?;
    let root = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu {})?
        .to_path_buf();
    debug!("read_config: {:?} root: {:?}", config, root);
    Ok((config, root))
}

pub fn parse_config(contents: &str) -> RapportResult<RapportConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gives_defaults() {
        let config = parse_config("{}").unwrap();
        let sources = config.data_sources();
        assert_eq!(sources.evidence_scores().file_path, "documents/SKOR_TOTAL_ALL.xlsx");
        assert_eq!(sources.evidence_scores().worksheet_name, "SKOR TOTAL_ALL");
        assert_eq!(sources.survey_scores().worksheet_name, "Skor_SURVEI_ALL_FUNGSI");
        assert_eq!(sources.evidence_benchmarks().worksheet_name, "Evidence");
        assert_eq!(sources.survey_benchmarks().worksheet_name, "Survei");
        let generator = config.generator();
        assert_eq!(generator.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(generator.model(), DEFAULT_MODEL);
        assert_eq!(generator.timeout_seconds(), 60);
        assert_eq!(generator.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.ocr().languages(), "ind+eng");
        assert_eq!(config.fallback_benchmark(), "PERTAMINA GROUP");
    }

    #[test]
    fn partial_config_overrides() {
        let config = parse_config(
            r#"{
                "dataSources": {
                    "surveyScores": { "filePath": "/data/survei.xlsx", "worksheetName": "2025" }
                },
                "generator": { "model": "gpt-4o-mini", "temperature": 0.2 },
                "fallbackBenchmark": "HOLDING",
                "outputDirectory": "out"
            }"#,
        )
        .unwrap();
        let sources = config.data_sources();
        assert_eq!(
            sources.survey_scores(),
            SheetSource::new("/data/survei.xlsx", "2025")
        );
        assert_eq!(sources.evidence_benchmarks().file_path, "documents/Skor_benchmark.xlsx");
        assert_eq!(config.generator().model(), "gpt-4o-mini");
        assert_eq!(config.generator().temperature(), 0.2);
        assert_eq!(config.generator().timeout_seconds(), 60);
        assert_eq!(config.fallback_benchmark(), "HOLDING");
        assert_eq!(
            config.output_directory(Path::new("/etc/rapport")),
            PathBuf::from("/etc/rapport/out")
        );
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let s = SheetSource::new("documents/a.xlsx", "A");
        assert_eq!(
            s.resolve(Path::new("/srv/rapport")),
            PathBuf::from("/srv/rapport/documents/a.xlsx")
        );
        let s = SheetSource::new("/abs/a.xlsx", "A");
        assert_eq!(s.resolve(Path::new("/srv/rapport")), PathBuf::from("/abs/a.xlsx"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            parse_config("{ \"generator\": 3 }"),
            Err(RapportError::ParsingJson { .. })
        ));
    }
}
