use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dna::logging::init_logging;
use dna::{ConfigurationBuilder, Framework, FrameworkConstruction, FrameworkEnvironment};

#[derive(Debug, Parser)]
#[command(name = "dna", version, about = "Bootstrap the framework and report its state")]
struct Args {
    /// Environment name, overrides DNA_ENVIRONMENT
    #[arg(short, long)]
    environment: Option<String>,

    /// Directory holding dna.toml and dna.<environment>.toml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Configuration keys to print, e.g. `logging:level`
    #[arg(short, long = "key")]
    keys: Vec<String>,

    /// Do not log the startup line
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let environment = args
        .environment
        .map(FrameworkEnvironment::new)
        .unwrap_or_else(FrameworkEnvironment::from_env);
    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };
    let configuration = ConfigurationBuilder::default_for(&config_dir, &environment)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))?;

    init_logging(&configuration);

    let mut construction = FrameworkConstruction::with_environment_value(environment);
    construction
        .add_configuration(configuration)
        .add_default_services();
    Framework::build(construction, !args.quiet)?;

    let environment = Framework::environment()?;
    println!("environment: {}", environment);

    let configuration = Framework::configuration()?;
    for key in &args.keys {
        match configuration.get(key) {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} is not set", key),
        }
    }

    Ok(())
}
