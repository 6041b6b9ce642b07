use clap::{Parser, Subcommand};

/// Report writing assistant: compares the scores of a sub-unit with its benchmark
/// and writes an appreciative analysis report (.docx).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. All the settings have defaults.
    /// Relative paths in the file are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Lists the units (HSH), or the sub-units (Fungsi) of a unit.
    List {
        /// (optional) The unit whose sub-units are listed.
        #[clap(short, long, value_parser)]
        unit: Option<String>,
    },
    /// Analyzes one sub-unit and writes the report.
    Analyze {
        /// The unit (HSH).
        #[clap(short, long, value_parser)]
        unit: String,
        /// The sub-unit (Fungsi).
        #[clap(short, long, value_parser)]
        sub_unit: String,
        /// (file path) The PCB document: xlsx, xls, csv, pdf, png, jpg or jpeg.
        #[clap(short, long, value_parser)]
        pcb: Option<String>,
        /// (file path, optional) The impact to business document, same formats as the PCB.
        #[clap(short, long, value_parser)]
        impact: Option<String>,
        /// (file path, optional) Where to write the report. Defaults to
        /// Rapp_<sub-unit>_<MM_DD>.docx in the output directory.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },
}
