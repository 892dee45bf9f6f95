//! phosphor - terminal polyphonic synthesizer with a CRT-style scope
//!
//! Run with: cargo run

mod app;
mod input;
mod ui;

use app::Phosphor;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so they stay out of the UI when redirected:
    //   RUST_LOG=phosphor_synth=debug cargo run 2>phosphor.log
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let app = Phosphor::new()?;
    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}
