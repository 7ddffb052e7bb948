use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use va_results::args::Args;
use va_results::pipeline::config_reader::build_settings;
use va_results::pipeline::{run_pipeline, PipelineResult};

fn run(args: &Args) -> PipelineResult<()> {
    let settings = build_settings(args)?;
    run_pipeline(&settings)?;
    info!("run completed");
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = run(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
