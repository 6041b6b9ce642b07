use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod rapport;

fn main() {
    let args = args::Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = rapport::run(&args) {
        warn!("Error occurred {:?}", e);
        eprintln!("⚠️ {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
