//! Replays a scripted editing session and prints what the surface and the
//! host would have received, one JSON line per step.

use anyhow::{Context, Result};
use clap::Parser;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use sketchlog_core::{
    EditorSession, HostEvent, InteractionMode, Operation, PointerEvent, RawSurfaceEvent,
    RecordingHost, RecordingSurface, SaveOptions, SerializableColor, SessionConfig,
    SurfaceCommand, SurfaceEvent,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sketchlog-replay", about = "Replay a sketch editing script", version)]
struct Cli {
    /// Script file (JSON)
    script: PathBuf,

    /// Session config file, overriding the script's own config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print each step
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: SessionConfig,
    /// Operations the session starts with.
    #[serde(default)]
    operations: Vec<Operation>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum Step {
    Layout { width: f64, height: f64 },
    Mount,
    Append { operation: Operation },
    InsertText { text: String, x: f64, y: f64 },
    Pointer { event: PointerEvent },
    /// A surface event in the legacy field-discriminated form.
    SurfaceEvent { event: RawSurfaceEvent },
    Undo,
    Redo,
    UndoOwnStroke,
    Delete { id: Uuid },
    Clear,
    Redraw,
    Mode { mode: InteractionMode },
    StrokeColor { color: SerializableColor },
    StrokeWidth { width: f64 },
    Save {
        #[serde(default)]
        options: SaveOptions,
    },
}

#[derive(Serialize)]
struct StepOutput {
    step: usize,
    commands: Vec<SurfaceCommand>,
    host: Vec<HostEvent>,
    active: usize,
}

type Session = EditorSession<RecordingSurface, RecordingHost>;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let json = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading {}", cli.script.display()))?;
    let script: Script = serde_json::from_str(&json).context("parsing script")?;
    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => script.config,
    };

    log::info!("Replaying {} steps", script.steps.len());
    let mut session = EditorSession::with_operations(
        config,
        RecordingSurface::new(),
        RecordingHost::new(),
        script.operations,
    );

    for (index, step) in script.steps.into_iter().enumerate() {
        log::debug!("Step {index}: {step:?}");
        run_step(&mut session, step)?;
        let output = StepOutput {
            step: index,
            commands: session.surface_mut().drain(),
            host: session.host_mut().drain(),
            active: session.active_operations().len(),
        };
        let line = if cli.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        println!("{line}");
    }
    Ok(())
}

fn run_step(session: &mut Session, step: Step) -> Result<()> {
    match step {
        Step::Layout { width, height } => session.on_layout(Size::new(width, height)),
        Step::Mount => {
            session.surface_mut().mount();
            session.surface_mounted();
        }
        Step::Append { operation } => {
            session.append_operation(operation);
        }
        Step::InsertText { text, x, y } => {
            let size = session.surface_size();
            if let Err(e) = session.insert_text(text, Point::new(x, y), size) {
                log::warn!("Skipping insert_text ({e}); add a layout step before it");
            }
        }
        Step::Pointer { event } => session.handle_pointer(event),
        Step::SurfaceEvent { event } => session.handle_surface_event(SurfaceEvent::from(event)),
        Step::Undo => {
            session.undo();
        }
        Step::Redo => {
            session.redo();
        }
        Step::UndoOwnStroke => {
            session.undo_own_stroke();
        }
        Step::Delete { id } => {
            if session.delete_operation(id).is_none() {
                log::warn!("No active operation {id}");
            }
        }
        Step::Clear => session.clear(),
        Step::Redraw => session.redraw(),
        Step::Mode { mode } => session.set_mode(mode),
        Step::StrokeColor { color } => session.set_stroke_color(color),
        Step::StrokeWidth { width } => session.set_stroke_width(width),
        Step::Save { options } => session.save(options)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        EditorSession::new(
            SessionConfig::default(),
            RecordingSurface::new(),
            RecordingHost::new(),
        )
    }

    fn insert_text() -> Step {
        serde_json::from_str(r#"{ "step": "insert_text", "text": "label", "x": 10, "y": 20 }"#)
            .unwrap()
    }

    #[test]
    fn test_insert_text_before_layout_skipped() {
        let mut session = session();
        run_step(&mut session, insert_text()).unwrap();
        assert!(session.active_operations().is_empty());
        assert!(session.host().events().is_empty());

        run_step(&mut session, Step::Layout { width: 300.0, height: 500.0 }).unwrap();
        run_step(&mut session, insert_text()).unwrap();
        let shape = session.active_operations()[0].as_text().unwrap();
        assert_eq!(shape.screensize, Size::new(300.0, 500.0));
    }
}
