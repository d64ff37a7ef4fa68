//! Tessel CLI
//!
//! Inspect widget markup and print the effective widget configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tessel_core::WidgetConfig;
use tessel_widgets::{write_markup, AnyWidget, WidgetFactory};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tessel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tessel widget markup tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Widget configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the widgets in a markup file and print them back
    Inspect {
        /// Markup file
        file: PathBuf,

        /// Print only the one-line summaries
        #[arg(short, long)]
        summary: bool,
    },

    /// Check that a markup file builds, without printing it
    Check {
        /// Markup files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// List the supported markup tags
    Tags,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let factory = WidgetFactory::with_config(config);

    match cli.command {
        Commands::Inspect { file, summary } => cmd_inspect(&factory, &file, summary),
        Commands::Check { files } => cmd_check(&factory, &files),
        Commands::Config => cmd_config(factory.config()),
        Commands::Tags => cmd_tags(&factory),
    }
}

fn load_config(path: Option<&Path>) -> Result<WidgetConfig> {
    match path {
        Some(path) => {
            let config = WidgetConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(WidgetConfig::default()),
    }
}

fn build_file(factory: &WidgetFactory, file: &Path) -> Result<Vec<AnyWidget>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    factory
        .build_markup(&content)
        .with_context(|| format!("Failed to build {}", file.display()))
}

fn cmd_inspect(factory: &WidgetFactory, file: &Path, summary_only: bool) -> Result<()> {
    let widgets = build_file(factory, file)?;
    info!("{}: {} widget(s)", file.display(), widgets.len());

    for widget in &widgets {
        println!("{}", widget.summary());
    }
    if !summary_only {
        let elements: Vec<_> = widgets.iter().map(AnyWidget::to_element).collect();
        println!();
        print!("{}", write_markup(&elements));
    }
    Ok(())
}

fn cmd_check(factory: &WidgetFactory, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let widgets = build_file(factory, file)?;
        println!("{}: ok ({} widget(s))", file.display(), widgets.len());
    }
    Ok(())
}

fn cmd_config(config: &WidgetConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    print!("{text}");
    Ok(())
}

fn cmd_tags(factory: &WidgetFactory) -> Result<()> {
    for tag in factory.tags() {
        println!("{tag}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect_arguments() {
        let cli = Cli::parse_from(["tessel", "-v", "inspect", "panel.xml", "--summary"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Inspect { file, summary } => {
                assert_eq!(file, PathBuf::from("panel.xml"));
                assert!(summary);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_default_config_serializes() {
        let config = load_config(None).unwrap();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(WidgetConfig::from_toml_str(&text).unwrap(), config);
    }
}
