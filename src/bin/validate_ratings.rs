use clap::Parser;
use log::LevelFilter;

use va_results::args::ValidateArgs;
use va_results::pipeline::validate::run_validate;

fn main() {
    let args = ValidateArgs::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    std::process::exit(run_validate(&args));
}
