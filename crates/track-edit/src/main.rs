use clap::Parser;
use track_edit::{Settings, run, setup_logging_and_profiling};

fn main() {
    let settings = Settings::parse();
    let _guard = setup_logging_and_profiling();

    if let Err(err) = run(settings) {
        tracing::error!(error = %err, "track-edit failed");
        drop(_guard);
        std::process::exit(1);
    }
}
