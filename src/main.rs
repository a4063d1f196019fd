use anyhow::Context;
use letter_linker::PipelineConfig;
use log::{info, warn};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::from_env().context("Invalid LINKER_* environment")?;
    let output = letter_linker::run(&config).context("Clinical letter linkage failed")?;

    let summary = &output.summary;
    if summary.not_found > 0 || summary.failed > 0 {
        warn!(
            "{} of {} patients were not found and {} failed; see {} and {}",
            summary.not_found,
            summary.roster_size,
            summary.failed,
            output.artifacts.not_found.display(),
            output.artifacts.failed.display()
        );
    }
    info!(
        "Matrix {}x{} written to {}",
        summary.matrix_rows,
        summary.matrix_cols,
        output.artifacts.matrix.display()
    );

    Ok(())
}
