use clap::{Parser, Subcommand};
use log::{error, info};
use mesh_shader::app::{layout_report, run_render, write_wgsl};
use mesh_shader::io::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mesh-shader", version)]
#[command(about = "Lambert + ambient mesh shading: software render, layout dump, WGSL export")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene headlessly to an image.
    Render {
        /// Scene file (TOML). The built-in demo scene is used when omitted.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Overrides `render.output`.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long)]
        width: Option<usize>,
        #[arg(long)]
        height: Option<usize>,
    },
    /// Print the binding table and struct sizes.
    Layout,
    /// Write the WGSL program (stdout when no path is given).
    Wgsl {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> mesh_shader::Result<()> {
    match cli.command {
        Command::Render {
            config,
            output,
            width,
            height,
        } => {
            let mut config = match config {
                Some(path) => {
                    info!("Loading config: {:?}", path);
                    Config::load(path)?
                }
                None => {
                    info!("No config given, rendering the demo scene");
                    Config::default()
                }
            };
            if let Some(output) = output {
                config.render.output = output.to_string_lossy().into_owned();
            }
            if let Some(width) = width {
                config.render.width = width;
            }
            if let Some(height) = height {
                config.render.height = height;
            }
            config.validate()?;
            run_render(&config)?;
        }
        Command::Layout => print!("{}", layout_report()?),
        Command::Wgsl { output } => {
            if let Some(source) = write_wgsl(output.as_deref())? {
                print!("{source}");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
