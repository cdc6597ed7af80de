//! windowed bootstrap for the worm digger
//!
//! Usage: `wormhole_digger [seed]`. Reads `assets/level.ron` when present.

use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};

use wormhole_digger::camera::camera_follow_system;
use wormhole_digger::input::worm_input_system;
use wormhole_digger::plugin::session_tick_system;
use wormhole_digger::render::{
    rebuild_level_system, redraw_changed_tiles_system, sync_sprites_system, TileSprites,
};
use wormhole_digger::{DiggerPlugin, LevelConfig};

const LEVEL_FILE: &str = "assets/level.ron";

/* ------------------------------------------------------------------------ */
/* camera                                                                   */
/* ------------------------------------------------------------------------ */
fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/* ------------------------------------------------------------------------ */
/* F11 borderless‑fullscreen toggle                                         */
/* ------------------------------------------------------------------------ */
fn toggle_fullscreen(
    keys: Res<ButtonInput<KeyCode>>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !keys.just_pressed(KeyCode::F11) {
        return;
    }
    let Ok(mut window) = window_q.get_single_mut() else { return };
    window.mode = match window.mode {
        WindowMode::Windowed => WindowMode::BorderlessFullscreen(MonitorSelection::Primary),
        _ => WindowMode::Windowed,
    };
}

/* ------------------------------------------------------------------------ */
/* config fallback notice (logging is only up once the app runs)            */
/* ------------------------------------------------------------------------ */
#[derive(Resource)]
struct ConfigFallback(Option<String>);

fn report_config_system(fallback: Res<ConfigFallback>) {
    match &fallback.0 {
        Some(reason) => warn!("using built‑in level settings: {}", reason),
        None => info!("level settings loaded from {}", LEVEL_FILE),
    }
}

/* ------------------------------------------------------------------------ */
/* main                                                                     */
/* ------------------------------------------------------------------------ */
fn main() {
    let (config, fallback) = match LevelConfig::load(LEVEL_FILE) {
        Ok(config) => (config, None),
        Err(e) => (LevelConfig::default(), Some(e.to_string())),
    };
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);

    App::new()
        /* diagnostics ----------------------------------------------------- */
        .add_plugins((
            LogDiagnosticsPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
        ))

        /* bevy core ------------------------------------------------------- */
        .insert_resource(ClearColor(Color::srgb(0.18, 0.65, 1.0)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "wormhole digger".into(),
                resolution: (1280., 720.).into(),
                mode: WindowMode::Windowed,
                ..default()
            }),
            ..default()
        }))

        /* game core ------------------------------------------------------- */
        .add_plugins(DiggerPlugin { config, seed })
        .init_resource::<TileSprites>()
        .insert_resource(ConfigFallback(fallback))

        /* startup systems ------------------------------------------------- */
        .add_systems(Startup, (setup_camera, report_config_system))

        /* frame‑update systems ------------------------------------------- */
        .add_systems(Update, worm_input_system.before(session_tick_system))
        .add_systems(
            Update,
            (
                rebuild_level_system,        // new level ⇒ full redraw
                redraw_changed_tiles_system, // dug cells only
                sync_sprites_system,         // worm & pickups
            )
                .chain()
                .after(session_tick_system),
        )
        .add_systems(Update, toggle_fullscreen)

        /* post‑update (camera) -------------------------------------------- */
        .add_systems(PostUpdate, camera_follow_system)
        .run();
}
