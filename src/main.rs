use log::info;

use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod study;

fn main() {
    let args = args::Args::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    if args.verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    }
    log_builder.init();

    let config_path = match args.config {
        Some(p) => p,
        None => {
            eprintln!("A study file must be provided with --config");
            std::process::exit(2);
        }
    };
    info!("Reading study description from {:?}", config_path);

    let res = study::run_study(config_path, args.participants, args.out, args.reference);
    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
