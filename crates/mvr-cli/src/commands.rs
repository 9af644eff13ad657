use colored::Colorize;
use mvr_server::{MvrServer, ServerConfig, StorageConfig};
use mvr_types::{ArtifactCoordinate, Coordinate};
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Path(args) => cmd_path(args, cli.format),
        Command::Parse(args) => cmd_parse(args, cli.format),
    }
}

fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = &args.root {
        config.storage = StorageConfig::Filesystem { root: root.clone() };
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    let backend = match &config.storage {
        StorageConfig::Memory => "memory".to_string(),
        StorageConfig::Filesystem { root } => root.display().to_string(),
    };
    println!(
        "{} mvr listening on {} (storage: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        backend.cyan()
    );
    MvrServer::new(config)?.serve().await?;
    Ok(())
}

fn cmd_path(args: PathArgs, format: OutputFormat) -> anyhow::Result<()> {
    let coordinate = ArtifactCoordinate::parse(&args.coordinate)?;
    match format {
        OutputFormat::Text => println!("{}", coordinate.path()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "coordinate": coordinate.to_string(),
                "path": coordinate.path(),
            }))?
        ),
    }
    Ok(())
}

fn cmd_parse(args: ParseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let coordinate = Coordinate::parse(&args.path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&coordinate)?),
        OutputFormat::Text => match &coordinate {
            Coordinate::Artifact(a) => {
                println!("{} {}", "artifact".green(), a.to_string().bold());
                println!("  groupId:    {}", a.group_id());
                println!("  artifactId: {}", a.artifact_id());
                println!("  version:    {} (base {})", a.version().as_str().yellow(), a.base_version());
                println!("  extension:  {}", a.extension());
                if let Some(c) = a.classifier() {
                    println!("  classifier: {c}");
                }
            }
            Coordinate::Metadata(m) => {
                println!("{} {}", "metadata".cyan(), m.to_string().bold());
                println!("  file: {}", m.file_name());
            }
        },
    }
    Ok(())
}
