use std::process::ExitCode;

use clap::Parser;
use fm_classify::cli::Cli;
use fm_classify::FeatureMatrixClassifier;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match cli.dispatch(&FeatureMatrixClassifier) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
