use clap::Parser;
use modelzoo::commands::{handle_catalog_commands, handle_publish_commands};
use modelzoo::{load_config, print_error, CatalogError, Cli};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "modelzoo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.root)?;
    if handle_catalog_commands(cli, &config)? {
        return Ok(());
    }
    handle_publish_commands(cli, &config)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        let code = e
            .downcast_ref::<CatalogError>()
            .map(|c| c.code())
            .unwrap_or("ERROR");
        print_error(cli.json, code, &format!("{:#}", e));
        std::process::exit(1);
    }
}
