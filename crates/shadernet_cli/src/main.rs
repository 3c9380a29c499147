// SPDX-License-Identifier: MIT OR Apache-2.0
//! `shadernet` - command line front end for the shader network passes
//!
//! Reads a network from RON or JSON, runs the passes described by a
//! [`PassSettings`] file plus any command line overrides, and writes the
//! result back out. Also converts to and from the flat shader list encoding.

mod format;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shadernet::algo;
use shadernet::{PassSettings, Shader, ShaderNetwork};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "shadernet", version, about = "Convert and clean up shader networks")]
struct Cli {
    /// Log pass details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run passes over a network and write the result
    Convert(ConvertArgs),
    /// Write a network as a flat shader list
    Flatten(FlattenArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Network to read (`.json` for JSON, anything else is RON)
    input: PathBuf,

    /// Where to write the result; stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pass settings file (RON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Input is a flat shader list instead of a network
    #[arg(long)]
    flat: bool,

    /// Remove shaders the output doesn't use
    #[arg(long, overrides_with = "no_prune")]
    prune: bool,

    /// Keep unused shaders
    #[arg(long, overrides_with = "prune")]
    no_prune: bool,

    /// Convert component connections for this OSL version (e.g. 10900)
    #[arg(long, value_name = "N")]
    osl_version: Option<u32>,

    /// Expand spline parameters into flat triples
    #[arg(long)]
    expand_splines: bool,

    /// Collapse flat spline triples into spline parameters
    #[arg(long)]
    collapse_splines: bool,

    /// Retype an `ai:shader` output as `ai:surface`
    #[arg(long)]
    surface_output: bool,
}

#[derive(Args, Debug)]
struct FlattenArgs {
    /// Network to read
    input: PathBuf,

    /// Where to write the shader list; stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ConvertArgs {
    /// Layer the command line flags over `settings`
    fn override_settings(&self, mut settings: PassSettings) -> PassSettings {
        if self.prune {
            settings.prune = true;
        }
        if self.no_prune {
            settings.prune = false;
        }
        if let Some(version) = self.osl_version {
            let mut conversion = settings.component_connections.take().unwrap_or_default();
            conversion.version = version;
            settings.component_connections = Some(conversion);
        }
        settings.expand_splines |= self.expand_splines;
        settings.collapse_splines |= self.collapse_splines;
        settings.surface_output_convention |= self.surface_output;
        settings
    }

    fn settings(&self) -> Result<PassSettings> {
        let settings = match &self.settings {
            Some(path) => PassSettings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => PassSettings::default(),
        };
        Ok(self.override_settings(settings))
    }
}

fn read_network(path: &Path, flat: bool) -> Result<ShaderNetwork> {
    if flat {
        let shaders: Vec<Shader> = format::read(path)?;
        algo::from_object_vector(&shaders)
            .with_context(|| format!("invalid shader list in {}", path.display()))
    } else {
        format::read(path)
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    let settings = args.settings()?;
    let mut network = read_network(&args.input, args.flat)?;
    tracing::debug!(
        shaders = network.len(),
        connections = network.connection_count(),
        "Loaded {}",
        args.input.display()
    );

    let summary = settings
        .apply(&mut network)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    tracing::debug!(?summary, "Passes complete");

    format::write(&network, args.output.as_deref())
}

fn flatten(args: &FlattenArgs) -> Result<()> {
    let network: ShaderNetwork = format::read(&args.input)?;
    let shaders = algo::to_object_vector(&network);
    tracing::info!(shaders = shaders.len(), "Flattened {}", args.input.display());
    format::write(&shaders, args.output.as_deref())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("shadernet={level}").parse()?)
        .add_directive(format!("shadernet_cli={level}").parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Convert(args) => convert(args),
        Command::Flatten(args) => flatten(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to set up logging: {e}");
    }

    if let Err(e) = run(&cli) {
        tracing::error!("shadernet failed: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadernet::algo::ComponentConversion;

    fn parse(args: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Convert(args) => args,
            Command::Flatten(_) => panic!("expected convert"),
        }
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let args = parse(&["shadernet", "convert", "in.ron"]);
        let settings = PassSettings {
            expand_splines: true,
            prune: false,
            ..PassSettings::default()
        };
        assert_eq!(args.override_settings(settings.clone()), settings);
    }

    #[test]
    fn test_prune_flags() {
        let settings = PassSettings::default();
        assert!(!parse(&["shadernet", "convert", "in.ron", "--no-prune"])
            .override_settings(settings.clone())
            .prune);

        let off = PassSettings {
            prune: false,
            ..PassSettings::default()
        };
        assert!(parse(&["shadernet", "convert", "in.ron", "--prune"])
            .override_settings(off.clone())
            .prune);

        // Last flag wins
        assert!(parse(&["shadernet", "convert", "in.ron", "--no-prune", "--prune"])
            .override_settings(off)
            .prune);
    }

    #[test]
    fn test_osl_version_override() {
        let args = parse(&["shadernet", "convert", "in.ron", "--osl-version", "11000"]);
        let settings = args.override_settings(PassSettings::default());
        assert_eq!(
            settings.component_connections,
            Some(ComponentConversion::osl(11000))
        );

        // Keeps the language and threshold from the settings file
        let from_file = PassSettings {
            component_connections: Some(ComponentConversion {
                language: "glsl".to_string(),
                version: 1,
                native_threshold: 5,
            }),
            ..PassSettings::default()
        };
        let settings = args.override_settings(from_file);
        let conversion = settings.component_connections.unwrap();
        assert_eq!(conversion.language, "glsl");
        assert_eq!(conversion.version, 11000);
        assert_eq!(conversion.native_threshold, 5);
    }

    #[test]
    fn test_pass_flags() {
        let args = parse(&[
            "shadernet",
            "convert",
            "in.json",
            "-o",
            "out.ron",
            "--expand-splines",
            "--collapse-splines",
            "--surface-output",
            "--flat",
        ]);
        assert!(args.flat);
        assert_eq!(args.output.as_deref(), Some(Path::new("out.ron")));

        let settings = args.override_settings(PassSettings::default());
        assert!(settings.expand_splines);
        assert!(settings.collapse_splines);
        assert!(settings.surface_output_convention);
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["shadernet", "flatten", "in.ron", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Flatten(_)));
    }
}
