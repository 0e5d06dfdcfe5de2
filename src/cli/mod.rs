//! CLI module for Sketchpad
//!
//! Commands:
//! - `new`: Create a project and write its exchange file
//! - `render`: Execute a script once and export the drawing
//! - `watch`: Re-render a script file as it changes
//! - `save` / `load`: Move the session project to and from exchange files
//! - `export`: Render the session project to SVG
//! - `presets`: List canvas sizes
//! - `doctor`: Storage and sandbox diagnostics

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::load_config;

pub mod doctor;
pub mod new;
pub mod presets;
pub mod render;
pub mod runtime;
pub mod session;
pub mod watch;

/// Sketchpad CLI
#[derive(Parser, Debug)]
#[command(name = "sketchpad")]
#[command(about = "Vector drawings from small scripts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project and write its exchange file
    New {
        /// Project name
        name: String,
        /// Canvas size: preset label or WxH in inches
        #[arg(long)]
        size: Option<String>,
        /// Script file to start from
        #[arg(long)]
        script: Option<PathBuf>,
        /// Exchange file to write (defaults to <name>.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Execute a script or exchange file once and export the drawing
    Render {
        /// Script file, or a .json exchange file
        file: PathBuf,
        /// Canvas size override
        #[arg(long)]
        size: Option<String>,
        /// SVG file to write (defaults to <name>.svg)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Watch a script file and re-render on every change
    Watch {
        /// Script file to watch
        script: PathBuf,
        /// Canvas size
        #[arg(long)]
        size: Option<String>,
        /// Use the shorter live debounce window
        #[arg(long)]
        live: bool,
        /// Preview SVG file (defaults to <name>.preview.svg)
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Write the session project to an exchange file
    Save {
        /// Exchange file to write
        file: PathBuf,
    },
    /// Make an exchange file the session project
    Load {
        /// Exchange file to read
        file: PathBuf,
    },
    /// Render the session project to SVG
    Export {
        /// SVG file to write (defaults to <name>.svg)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List canvas size presets
    Presets,
    /// Check storage and the script sandbox
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config()?;
    match command {
        Commands::New {
            name,
            size,
            script,
            out,
        } => new::run(&config, &name, size.as_deref(), script.as_deref(), out).await,
        Commands::Render { file, size, out } => {
            render::run(&config, &file, size.as_deref(), out).await
        }
        Commands::Watch {
            script,
            size,
            live,
            preview,
        } => watch::run(&config, &script, size.as_deref(), live, preview).await,
        Commands::Save { file } => session::save(&config, &file).await,
        Commands::Load { file } => session::load(&config, &file).await,
        Commands::Export { out } => session::export(&config, out).await,
        Commands::Presets => {
            presets::run();
            Ok(())
        }
        Commands::Doctor => doctor::run(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from(["sketchpad", "render", "spiral.js", "--size", "6x6"]).unwrap();
        match cli.command {
            Some(Commands::Render { file, size, out }) => {
                assert_eq!(file, PathBuf::from("spiral.js"));
                assert_eq!(size.as_deref(), Some("6x6"));
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_watch_live() {
        let cli = Cli::try_parse_from(["sketchpad", "watch", "a.js", "--live"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Watch { live: true, .. })
        ));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["sketchpad"]).unwrap();
        assert!(cli.command.is_none());
    }
}
