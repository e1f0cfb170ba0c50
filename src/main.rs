use anyhow::Result;
use tracing::{info, warn};

use rotconv::cli::{USAGE, parse_args};
use rotconv::geometry::RotationConverter;
use rotconv::io::ConverterConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rotconv=info")),
        )
        .init();

    let invocation = match parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = match &invocation.config_path {
        Some(path) => {
            info!("Loading converter config from {:?}", path);
            ConverterConfig::load(path)?
        }
        None => ConverterConfig::default(),
    };
    if !config.validate_inputs {
        warn!("Input validation disabled; non-unit or non-orthonormal inputs pass through");
    }

    let converter = RotationConverter::new(config);
    println!("{}", invocation.command.run(&converter)?);

    Ok(())
}
