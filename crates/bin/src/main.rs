mod cli;
mod output;

use std::{
    fs,
    io::{self, Read},
    path::Path,
    process::ExitCode,
};

use clap::Parser;
use dtree::{Document, Pool, PoolConfig, PoolScope};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Commands},
    output::{print_document, print_entry, print_flag},
};

type BoxError = Box<dyn std::error::Error>;

fn main() -> Result<ExitCode, BoxError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dtree=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let pool = match &cli.pool_config {
        Some(path) => Pool::with_config(load_pool_config(path)?)?,
        None => Pool::new(),
    };
    let text = read_input(cli.input.as_deref())?;

    let code = pool.run(|scope| run(&cli, scope, &text))?;
    tracing::debug!(stats = ?pool.stats(), "finished");
    Ok(code)
}

fn run(cli: &Cli, scope: &PoolScope, text: &str) -> Result<ExitCode, BoxError> {
    let doc = scope.parse(text)?;
    match &cli.command {
        Commands::Get(args) => print_entry(&doc.get(&args.path)?, cli.format)?,
        Commands::Set(args) => {
            match scope.parse(&args.value) {
                Ok(value) if value.is_single_value()? => doc.set(&args.path, value.get_value("")?)?,
                Ok(value) => doc.set(&args.path, &value)?,
                Err(err) if err.is_invalid_input() => doc.set(&args.path, args.value.as_str())?,
                Err(err) => return Err(err.into()),
            }
            print_document(&doc, false, cli.format)?;
        }
        Commands::Delete(args) => {
            let removed = doc.delete(&args.path)?;
            tracing::info!(removed, path = %args.path, "deleted");
            print_document(&doc, false, cli.format)?;
        }
        Commands::Transform(args) => {
            let renamed = doc.transform(&args.rules)?;
            tracing::info!(renamed, "transformed");
            print_document(&doc, false, cli.format)?;
        }
        Commands::Encode(args) => print_document(&doc, args.canonical, cli.format)?,
        Commands::Schema(args) => println!("{}", doc.encode_schema(args.canonical)?),
        Commands::Equals(args) => {
            let other = Document::parse(&fs::read_to_string(&args.other)?)?;
            let equal = doc == other;
            print_flag(equal, cli.format);
            if !equal {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_pool_config(path: &Path) -> Result<PoolConfig, BoxError> {
    let config: PoolConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
    tracing::info!(path = %path.display(), "loaded pool configuration");
    Ok(config)
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
