use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;
use tracing_subscriber::EnvFilter;

use massing_growth::{
    application::{OrbitCamera, Playback, Scenario},
    domain::{CellView, EvaluationMode},
    input::{self, InputState},
    rendering::{self, Scene},
    ui::{self, Command},
};

/// Grow a layered massing and watch it build up
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scenario JSON file; a built-in demo site when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Seed for every random choice of the run
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Candidate evaluation: serial or parallel
    #[arg(long, default_value_t = EvaluationMode::Parallel)]
    mode: EvaluationMode,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Massing Growth".to_owned(),
        window_width: 1200,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

fn load_playback(args: &Args) -> Result<Playback, massing_growth::GrowthError> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo(),
    };
    Playback::new(scenario, args.seed, args.mode)
}

#[macroquad::main(window_conf)]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut playback = match load_playback(&args) {
        Ok(playback) => playback,
        Err(err) => {
            tracing::error!(%err, "cannot start run");
            return;
        }
    };
    let (cols, rows) = playback.stack().setup().constraints.dimensions();
    tracing::info!(cols, rows, seed = args.seed, mode = %args.mode, "viewer started");

    let mut scene = Scene::new();
    let mut camera = OrbitCamera::new();
    let mut input_state = InputState::new();
    rendering::frame_stack(&mut camera, &scene, cols, rows);

    loop {
        let mouse_pos = mouse_position();
        let buttons = ui::create_buttons(playback.is_running, playback.stack().is_complete());

        input_state.handle_orbit(&mut camera, mouse_pos);
        input::handle_zoom(&mut camera);
        let mut commands = input::button_commands(&buttons, mouse_pos);
        commands.extend(input::keyboard_commands(&mut camera));

        for command in commands {
            playback = match command {
                Command::Step => {
                    playback.step(&mut scene);
                    playback
                }
                Command::ToggleRun => playback.toggle_running(),
                Command::Reset => {
                    if let Err(err) = playback.reset(&mut scene) {
                        tracing::error!(%err, "reset failed");
                    }
                    playback
                }
                Command::Faster => playback.adjust_speed(1.0),
                Command::Slower => playback.adjust_speed(-1.0),
                Command::FrameStack => {
                    rendering::frame_stack(&mut camera, &scene, cols, rows);
                    playback
                }
            };
        }

        if playback.tick(get_frame_time(), &mut scene) {
            if let Some(layer) = playback.stack().layers().last() {
                tracing::debug!(layer = layer.index, cells = layer.grid.alive_count(), "drawn");
            }
        }

        clear_background(Color::from_rgba(12, 12, 16, 255));
        rendering::draw_scene(&scene, &camera, cols, rows);
        rendering::draw_controls(&playback, &scene, &camera, &buttons, mouse_pos);

        next_frame().await;
    }
}
