use clap::Parser;
use color_eyre::eyre::{Report, WrapErr};
use color_eyre::Section;
use tracing::info;

use lookalike_prime::cli::Args;
use lookalike_prime::tracing_setup::init_tracing;
use lookalike_prime::{prime_with_defaults, PrimerConfig};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_deref()).wrap_err("failed to set up logging")?;

    let mut config = PrimerConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!(cache = %config.cache_path().display(), model = %config.model, "priming model cache");
    let primed = prime_with_defaults(&config).map_err(|e| {
        let network = e.is_network();
        let report = Report::new(e);
        if network {
            report.suggestion(
                "check access to the model hub, or point source.endpoint at a reachable mirror",
            )
        } else {
            report
        }
    })?;
    info!(
        accelerator = %primed.accelerator,
        deleted_stale = primed.deleted_stale,
        handle = ?primed.handle,
        "done"
    );
    Ok(())
}
