#![deny(unsafe_code)]
//! CLI for the magfield core.
//!
//! Subcommands:
//! - `scene`: write the default scene (one centred dipole) as JSON
//! - `field <x> <y>`: total field at a point
//! - `line <x> <y>`: one streamline through a point
//! - `trace`: full streamline render, driven tick by tick when progressive
//! - `grid`: vector-grid arrow samples
//! - `schema`: configuration keys accepted by `--params`
//!
//! Set `RUST_LOG=debug` to see scheduler and session activity.

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use log::info;
use magfield_core::{RenderPass, Scene, Session, SessionConfig, Streamline, Tick};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "magfield", about = "2D magnetostatics field and streamline engine")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where the scene comes from and how to override it.
#[derive(Args, Clone)]
struct SceneArgs {
    /// Scene JSON file. Without it, one dipole at the canvas centre is used.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Canvas width in pixels (ignored with --scene).
    #[arg(short = 'W', long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height in pixels (ignored with --scene).
    #[arg(short = 'H', long, default_value_t = 600.0)]
    height: f64,

    /// PRNG seed for seed-point jitter (ignored with --scene).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Configuration overrides as a JSON object, e.g. '{"stream_density": 20}'.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[derive(Subcommand)]
enum Command {
    /// Write a scene file.
    Scene {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the total field at a point.
    Field {
        x: f64,
        y: f64,

        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Trace a single streamline through a point.
    Line {
        x: f64,
        y: f64,

        #[command(flatten)]
        scene: SceneArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Trace the full streamline set and write it as JSON.
    Trace {
        #[command(flatten)]
        scene: SceneArgs,

        #[arg(short, long, default_value = "streamlines.json")]
        output: PathBuf,
    },
    /// Sample the vector grid and write it as JSON.
    Grid {
        #[command(flatten)]
        scene: SceneArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the configuration schema.
    Schema,
}

/// Reads the scene file (or builds the default scene) and applies `--params`.
fn load_scene(args: &SceneArgs) -> Result<Scene, CliError> {
    let params: Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

    let mut scene = match &args.scene {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid scene {}: {e}", path.display())))?
        }
        None => Scene::with_default_dipole(args.width, args.height, args.seed),
    };
    scene.config.apply_json(&params);
    scene.validate()?;
    Ok(scene)
}

fn write_json(value: &impl serde::Serialize, output: Option<&Path>) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display()))),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

/// Runs a full render, ticking the progressive scheduler to completion.
fn trace_all(session: &mut Session) -> (Vec<Streamline>, usize) {
    match session.render() {
        RenderPass::Complete(lines) => (lines, 0),
        RenderPass::Progressive { seeds, batches } => {
            info!("tracing {seeds} seeds in {batches} batches");
            let mut lines = Vec::new();
            let mut ticks = 0;
            loop {
                ticks += 1;
                match session.tick() {
                    Tick::Traced {
                        streamlines,
                        progress,
                        finished,
                    } => {
                        lines.extend(streamlines);
                        info!("progress {progress:.0}%");
                        if finished {
                            break;
                        }
                    }
                    Tick::Paused { .. } | Tick::Idle => break,
                }
            }
            (lines, ticks)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            write_json(&SessionConfig::param_schema(), None)?;
        }
        Command::Scene { scene, output } => {
            let scene = load_scene(&scene)?;
            write_json(&scene, output.as_deref())?;
        }
        Command::Field { x, y, scene } => {
            let session = Session::from_scene(&load_scene(&scene)?)?;
            let b = session.total_field(x, y);
            if cli.json {
                let info = json!({"x": x, "y": y, "bx": b.x, "by": b.y, "magnitude": b.length()});
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("B({x}, {y}) = ({:.6e}, {:.6e}), |B| = {:.6e}", b.x, b.y, b.length());
            }
        }
        Command::Line {
            x,
            y,
            scene,
            output,
        } => {
            let session = Session::from_scene(&load_scene(&scene)?)?;
            let line = session.trace(x, y);
            if !line.is_drawable() {
                info!("streamline through ({x}, {y}) is degenerate ({} points)", line.len());
            }
            write_json(&line, output.as_deref())?;
        }
        Command::Trace { scene, output } => {
            let mut session = Session::from_scene(&load_scene(&scene)?)?;
            let (lines, ticks) = trace_all(&mut session);
            write_json(&lines, Some(output.as_path()))?;
            let points: usize = lines.iter().map(Streamline::len).sum();
            if cli.json {
                let info = json!({
                    "streamlines": lines.len(),
                    "points": points,
                    "ticks": ticks,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "traced {} streamlines ({points} points, {ticks} ticks) -> {}",
                    lines.len(),
                    output.display()
                );
            }
        }
        Command::Grid { scene, output } => {
            let session = Session::from_scene(&load_scene(&scene)?)?;
            write_json(&session.vector_grid(), output.as_deref())?;
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
