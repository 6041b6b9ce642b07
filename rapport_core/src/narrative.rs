use log::{debug, info, warn};

use crate::config::{AnalysisOutcome, Topic};

/// A remote text generator: one system instruction, one prompt, one bounded answer.
///
/// Implementations never panic on remote failures. They return the failure as a
/// human readable description, which ends up verbatim in the report.
pub trait TextGenerator {
    fn complete(
        &self,
        system_instruction: &str,
        prompt: &str,
        max_output_units: u32,
    ) -> Result<String, String>;
}

/// Shared by all the calls: tone and shape of the answers.
pub const SYSTEM_INSTRUCTION: &str = r#"Anda adalah konsultan senior budaya kerja perusahaan yang berpengalaman dengan pendekatan apresiatif dan profesional.

TONE & GAYA KOMUNIKASI:
- Gunakan bahasa yang apresiatif, menghargai usaha yang telah dilakukan
- Profesional namun hangat dan mendukung
- Fokus pada kekuatan (strength-based approach) sebelum memberikan saran perbaikan
- Hindari kata-kata negatif atau menghakimi
- Gunakan frasa seperti "telah menunjukkan komitmen yang baik", "dapat lebih dioptimalkan", "peluang untuk pengembangan lebih lanjut"
- Berikan apresiasi spesifik terhadap pencapaian yang ada

FOKUS ANALISIS:
- Fokus pada aspek PERILAKU (behavior): perubahan mindset, kolaborasi, komunikasi, kepemimpinan, keterlibatan, partisipasi
- Hindari aspek teknis operasional
- Berikan analisis yang singkat, padat, jelas, dan actionable
- Setiap poin harus spesifik dan dapat ditindaklanjuti

FORMAT OUTPUT:
- Mulai dengan apresiasi umum
- "Hal yang Sudah Baik" harus spesifik dan menghargai pencapaian
- "Hal yang Dapat Diperbaiki" disampaikan sebagai peluang pengembangan, bukan kritik"#;

/// Returned for the impact analysis when no impact document was provided.
pub const IMPACT_NOT_PROVIDED: &str =
    "Analisis impact tidak dapat dilakukan karena tidak ada file impact to business yang di upload";

const CONTENT_MARKER: &str = "{content}";

const STRATEGY_TEMPLATE: &str = r#"
Analisis form PCB berikut dengan pendekatan APRESIATIF dan PROFESIONAL, fokus pada aspek PERILAKU:

{content}

EVALUASI:
1. Apakah Goals/Business Initiatives/Improvement menggunakan metode SMART (Specific, Measurable, Achievable, Relevant, Time-bound)?
2. Apakah ada kerunutan logis dari identifikasi kendala/Peluang Perbaikan Bisnis ke Business Initiatives/improvement?
3. Apakah PCB lengkap dan utuh dalam menggambarkan strategi budaya?

FOKUS UTAMA: Aspek PERILAKU seperti:
- Perubahan mindset dan pola pikir
- Peningkatan kolaborasi antar tim
- Perbaikan komunikasi internal
- Penguatan kepemimpinan
- Peningkatan keterlibatan dan partisipasi pekerja
- Penerapan nilai-nilai AKHLAK dalam keseharian

TONE: Apresiatif, profesional, dan konstruktif

Berikan output dalam format:

**Apresiasi Umum:**
[Berikan apresiasi terhadap upaya dan komitmen yang telah ditunjukkan dalam penyusunan PCB, fokus pada aspek positif yang terlihat]

**Hal yang Sudah Baik:**
- [Poin spesifik 1 - apresiasi pencapaian konkret terkait perilaku]
- [Poin spesifik 2 - apresiasi pencapaian konkret terkait perilaku]
- [Poin spesifik 3 - jika ada]

**Peluang Pengembangan Lebih Lanjut:**
- [Saran 1 - disampaikan sebagai peluang, bukan kritik, fokus perilaku]
- [Saran 2 - disampaikan sebagai peluang, bukan kritik, fokus perilaku]
- [Saran 3 - jika perlu]
"#;

const PROGRAMS_TEMPLATE: &str = r#"
Analisis Program Budaya dari form PCB berikut dengan pendekatan APRESIATIF dan PROFESIONAL, fokus pada aspek PERILAKU:

{content}

EVALUASI PROGRAM:
1. **Program Standar (One Hour Meeting)**: Kualitas dialog, keterbukaan komunikasi, partisipasi aktif
2. **Program Mandatory (ONE Action)**: Implementasi aksi nyata, keterlibatan pekerja, dampak perilaku
3. **Program Spesifik (ONE KOLAB)**: Kolaborasi lintas fungsi, sinergi tim, inovasi bersama

Untuk setiap program, evaluasi:
- Kesesuaian judul dengan tujuan perubahan perilaku
- Kualitas deliverables dalam mendorong perubahan perilaku
- Kontribusi program terhadap pencapaian Goals/Business Initiatives
- Tingkat keterlibatan dan partisipasi pekerja

FOKUS: Aspek PERILAKU (komunikasi, kolaborasi, keterlibatan, perubahan mindset)

TONE: Apresiatif, profesional, dan mendukung

Berikan output dalam format:

**Apresiasi Umum:**
[Apresiasi terhadap desain dan implementasi program budaya yang telah dilakukan, soroti komitmen tim]

**Hal yang Sudah Baik:**
- [Apresiasi spesifik program 1 - fokus dampak perilaku positif]
- [Apresiasi spesifik program 2 - fokus dampak perilaku positif]
- [Apresiasi spesifik program 3 - jika ada]

**Peluang Pengembangan Lebih Lanjut:**
- [Saran pengembangan 1 - sebagai peluang optimalisasi, fokus perilaku]
- [Saran pengembangan 2 - sebagai peluang optimalisasi, fokus perilaku]
- [Saran pengembangan 3 - jika perlu]
"#;

const IMPACT_TEMPLATE: &str = r#"
Analisis form Impact to Business berikut dengan pendekatan APRESIATIF dan PROFESIONAL, fokus pada aspek PERILAKU:

{content}

EVALUASI:
1. Perubahan PERILAKU yang terjadi dari kondisi sebelum dan sesudah implementasi program budaya
2. Peningkatan/efisiensi yang terjadi sebagai hasil dari perubahan perilaku
3. Dampak perubahan perilaku terhadap kinerja bisnis

FOKUS UTAMA - Aspek PERILAKU (BUKAN TEKNIS):
- Peningkatan kolaborasi dan kerja sama tim
- Perbaikan komunikasi dan koordinasi
- Perubahan mindset dan budaya kerja
- Peningkatan kepemimpinan dan ownership
- Peningkatan keterlibatan dan motivasi pekerja
- Penerapan nilai-nilai AKHLAK dalam praktik kerja

TONE: Apresiatif, profesional, mengakui pencapaian

Berikan output dalam format:

**Apresiasi Pencapaian:**
[Apresiasi terhadap dampak positif yang telah dicapai, soroti perubahan perilaku yang signifikan]

**Hal yang Sudah Baik:**
- [Apresiasi spesifik 1 - perubahan perilaku positif yang terukur]
- [Apresiasi spesifik 2 - perubahan perilaku positif yang terukur]
- [Apresiasi spesifik 3 - jika ada]

**Peluang Pengembangan Lebih Lanjut:**
- [Saran 1 - peluang untuk memperkuat dampak perilaku]
- [Saran 2 - peluang untuk memperkuat dampak perilaku]
- [Saran 3 - jika perlu]
"#;

const EVIDENCE_TEMPLATE: &str = r#"
Analisis perbandingan Evidence berikut dengan pendekatan APRESIATIF dan PROFESIONAL:

{content}

EVALUASI:
Bandingkan performa fungsi dengan benchmark pada aspek:
1. Strategi Budaya dan implementasinya
2. Monitoring & Evaluasi oleh AoC dan Pimpinan
3. Sosialisasi & Partisipasi dalam program budaya
4. Sistem pelaporan dan apresiasi
5. Pemahaman program dan sistem reward
6. Impact to Business dari program budaya

FOKUS: Aspek PERILAKU dalam implementasi budaya kerja

TONE: Apresiatif, profesional, berbasis data

Berikan output dalam format:

**Apresiasi Pencapaian:**
[Apresiasi terhadap area yang sudah di atas atau sesuai benchmark, soroti komitmen dan konsistensi]

**Hal yang Sudah Baik:**
- [Area spesifik 1 yang di atas benchmark - dengan angka dan apresiasi]
- [Area spesifik 2 yang di atas benchmark - dengan angka dan apresiasi]
- [Area spesifik 3 - jika ada]

**Peluang Pengembangan Lebih Lanjut:**
- [Area 1 yang dapat dioptimalkan - dengan saran konkret berbasis perilaku]
- [Area 2 yang dapat dioptimalkan - dengan saran konkret berbasis perilaku]
- [Area 3 - jika perlu]
"#;

const SURVEY_TEMPLATE: &str = r#"
Analisis perbandingan Survei berikut dengan pendekatan APRESIATIF dan PROFESIONAL:

{content}

EVALUASI:
Bandingkan persepsi pekerja dan mitra kerja terhadap implementasi budaya pada fungsi dengan benchmark, meliputi:
1. Pemahaman dan penerapan nilai AKHLAK
2. Implementasi ONE Pertamina
3. Partisipasi dalam Program Budaya
4. Komitmen terhadap Keberlanjutan
5. Budaya Safety

FOKUS: Aspek PERILAKU - persepsi dan pengalaman pekerja & mitra kerja terhadap budaya kerja

TONE: Apresiatif, profesional, berbasis data survei

Berikan output dalam format:

**Apresiasi Pencapaian:**
[Apresiasi terhadap skor yang sudah di atas atau sesuai benchmark, soroti area kekuatan dalam persepsi pekerja dan mitra kerja]

**Hal yang Sudah Baik:**
- [Area spesifik 1 dengan skor di atas benchmark - apresiasi dengan data]
- [Area spesifik 2 dengan skor di atas benchmark - apresiasi dengan data]
- [Area spesifik 3 - jika ada]

**Peluang Pengembangan Lebih Lanjut:**
- [Area 1 yang dapat ditingkatkan - saran konkret untuk meningkatkan persepsi dan pengalaman]
- [Area 2 yang dapat ditingkatkan - saran konkret untuk meningkatkan persepsi dan pengalaman]
- [Area 3 - jika perlu]
"#;

fn template(topic: Topic) -> &'static str {
    match topic {
        Topic::Strategy => STRATEGY_TEMPLATE,
        Topic::Programs => PROGRAMS_TEMPLATE,
        Topic::Impact => IMPACT_TEMPLATE,
        Topic::EvidenceComparison => EVIDENCE_TEMPLATE,
        Topic::SurveyComparison => SURVEY_TEMPLATE,
    }
}

/// The user prompt of a topic, with the input embedded.
pub fn build_prompt(topic: Topic, input: &str) -> String {
    template(topic).replacen(CONTENT_MARKER, input, 1)
}

/// Turns topic inputs into narrative through a text generator.
pub struct Narrator<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> Narrator<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Narrator<'a> {
        Narrator { generator }
    }

    /// Runs one analysis. A generator failure becomes `AnalysisOutcome::Failed`.
    pub fn generate(&self, topic: Topic, input: &str) -> AnalysisOutcome {
        let prompt = build_prompt(topic, input);
        debug!(
            "generate: {:?}: prompt of {} chars, budget {}",
            topic,
            prompt.len(),
            topic.max_output_units()
        );
        match self
            .generator
            .complete(SYSTEM_INSTRUCTION, &prompt, topic.max_output_units())
        {
            Ok(text) => {
                info!("generate: {:?}: received {} chars", topic, text.len());
                AnalysisOutcome::Generated(text)
            }
            Err(msg) => {
                warn!("generate: {:?} failed: {}", topic, msg);
                AnalysisOutcome::Failed(msg)
            }
        }
    }

    /// The impact analysis. Without an impact document, no call is made.
    pub fn generate_impact(&self, input: Option<&str>) -> AnalysisOutcome {
        match input {
            Some(text) => self.generate(Topic::Impact, text),
            None => {
                info!("generate_impact: no impact document");
                AnalysisOutcome::Unavailable(IMPACT_NOT_PROVIDED.to_string())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGenerator;
    use super::*;

    #[test]
    fn prompt_embeds_input_once() {
        let p = build_prompt(Topic::Strategy, "ISI PCB");
        assert!(p.contains("\nISI PCB\n"));
        assert!(!p.contains(CONTENT_MARKER));
        // Braces in the input are kept as they are
        let p = build_prompt(Topic::Programs, "tabel {content}");
        assert!(p.contains("tabel {content}"));
    }

    #[test]
    fn templates_are_distinct() {
        for (i, a) in Topic::ALL.iter().enumerate() {
            for b in Topic::ALL.iter().skip(i + 1) {
                assert_ne!(template(*a), template(*b));
            }
        }
    }

    #[test]
    fn budget_follows_topic() {
        let generator = ScriptedGenerator::new();
        let narrator = Narrator::new(&generator);
        for topic in Topic::ALL.iter() {
            narrator.generate(*topic, "x");
        }
        let budgets: Vec<u32> = generator.calls.borrow().iter().map(|(_, b)| *b).collect();
        assert_eq!(budgets, vec![4000, 4000, 4000, 3000, 3500]);
    }

    #[test]
    fn impact_without_document_makes_no_call() {
        let generator = ScriptedGenerator::new();
        let narrator = Narrator::new(&generator);
        assert_eq!(
            narrator.generate_impact(None),
            AnalysisOutcome::Unavailable(IMPACT_NOT_PROVIDED.to_string())
        );
        assert_eq!(generator.count(), 0);
        assert!(narrator.generate_impact(Some("dampak")).is_generated());
        assert_eq!(generator.count(), 1);
    }

    #[test]
    fn failure_is_kept_as_text() {
        let generator = ScriptedGenerator::failing_at(0);
        let narrator = Narrator::new(&generator);
        let res = narrator.generate(Topic::Strategy, "x");
        assert_eq!(
            res,
            AnalysisOutcome::Failed("Exception in OpenAI API call: timed out".to_string())
        );
        assert_eq!(res.as_text(), "Exception in OpenAI API call: timed out");
    }
}
