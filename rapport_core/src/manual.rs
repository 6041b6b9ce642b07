/*!

This is the long-form manual for `rapport_core` and the `rapport` program.

## Running

```text
rapport list
rapport list --unit "RU I"
rapport analyze --unit "RU I" --sub-unit Operasi --pcb pcb.xlsx --impact impact.pdf
```

`list` shows the units (HSH) found in the evidence table, or the sub-units (Fungsi) of
one unit. `analyze` produces the report of one sub-unit. The PCB document is mandatory,
the impact document is optional. An impact file that cannot be read does not stop the
run: the reading error is analyzed in its place. The report is written as
`Rapp_<Fungsi>_<MM_DD>.docx` in the output directory, with spaces and slashes of the
sub-unit replaced by `_`.

The API key of the text generator is read from the environment (`OPENAI_API_KEY` by
default).

## Source tables

Four worksheets are read once when the program starts. If any of them cannot be read,
no analysis is run.

### Evidence scores

Default: `documents/SKOR_TOTAL_ALL.xlsx`, worksheet `SKOR TOTAL_ALL`.

|  HSH | Fungsi  | (any)  | Strategi Budaya | Monitoring & Evaluasi | ... | Impact to Business |
|------|---------|--------|-----------------|-----------------------|-----|--------------------|
| RU I | Operasi | ...    | 8               | 7                     | ... | 7                  |

The nine metrics are read by position: they start three columns after `HSH`, in this
order: Strategi Budaya, Monitoring & Evaluasi, Sosialisasi & Partisipasi, Pelaporan
Bulanan, Apresiasi Pelanggan, Pemahaman Program, Reward & Consequences, SK AoC, Impact
to Business. The header names of these columns are not significant.

### Survey scores

Default: `documents/Skor_SURVEI_ALL.xlsx`, worksheet `Skor_SURVEI_ALL_FUNGSI`.

Columns are read by name: `Skor Survei`, `SKOR PEKERJA`, `SKOR MITRA KERJA`, the worker
dimensions `P. AKHLAK`, `P. ONE Pertamina`, `P. Program Budaya`, `P. Keberlanjutan`,
`P. Safety`, and the partner dimensions with the `MK.` prefix. A missing column is
reported as `N/A`.

The `HSH` column is optional in this table. When it is absent, rows are matched on
`Fungsi` only.

### Benchmarks

Default: `documents/Skor_benchmark.xlsx`, worksheets `Evidence` and `Survei`.

The first column holds the benchmark identifier. Values are read by their offset from
that column:

- `Evidence`: the nine evidence metrics at offsets 1 to 9, same order as above.
- `Survei`: the five `P.` dimensions at 1 to 5, `SKOR PEKERJA` at 6, the five `MK.`
  dimensions at 7 to 11, `SKOR MITRA KERJA` at 12 and `Skor Survei` at 13.

These offsets are defined in one place, [`crate::EVIDENCE_METRICS`] and the survey
layout tables next to it.

## Benchmark selection

The benchmark of a unit is found by comparing identifiers after normalization (upper
case, single spaces):
1. the same identifier
2. the first identifier that contains the unit, or is contained in it
3. the first identifier containing the fallback label (`PERTAMINA GROUP` by default)
4. the first row

Anything but the first rule prints a notice.

Cells holding `N/A`, nothing, or text that is not a number are kept as they are and the
corresponding difference is shown as not comparable.

## Configuration

All the settings have defaults. A JSON file can be passed with `--config`:

```text
{
  "dataSources": {
    "evidenceScores": { "filePath": "documents/SKOR_TOTAL_ALL.xlsx", "worksheetName": "SKOR TOTAL_ALL" },
    "surveyScores": { "filePath": "documents/Skor_SURVEI_ALL.xlsx", "worksheetName": "Skor_SURVEI_ALL_FUNGSI" },
    "evidenceBenchmarks": { "filePath": "documents/Skor_benchmark.xlsx", "worksheetName": "Evidence" },
    "surveyBenchmarks": { "filePath": "documents/Skor_benchmark.xlsx", "worksheetName": "Survei" }
  },
  "generator": {
    "endpoint": "https://api.openai.com/v1/chat/completions",
    "model": "gpt-5-mini-2025-08-07",
    "temperature": 0.7,
    "timeoutSeconds": 60,
    "apiKeyEnv": "OPENAI_API_KEY"
  },
  "ocr": { "command": "tesseract", "languages": "ind+eng" },
  "fallbackBenchmark": "PERTAMINA GROUP",
  "outputDirectory": "."
}
```

Relative paths are resolved against the directory of the configuration file.

## Uploaded documents

- `xlsx`, `xls`, `csv`: the first worksheet, rendered as a text table
- `pdf`: the text of each page
- `png`, `jpg`, `jpeg`: text recognition with `tesseract`, which must be installed

Other formats are passed to the analyses as `Format file tidak didukung`.

 */
