use anyhow::Result;
use clap::Parser;
use encodec_asr::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("encodec_asr=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
