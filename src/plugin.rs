//! headless Bevy glue: owns the `Session` resource and drives it each frame
use bevy::prelude::*;

use crate::config::LevelConfig;
use crate::session::{Session, WormCommand};

/// Cells that just turned `Empty`, for incremental redraw.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TerrainChanged {
    pub cells: Vec<IVec2>,
}

/// A fresh grid is in place; everything drawn from the old one is stale.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStarted {
    pub number: u32,
}

#[derive(Resource, Debug, Clone)]
pub struct DiggerSettings {
    pub config: LevelConfig,
    pub seed: u64,
}

/// Core game loop without any rendering or input, so it runs under
/// `MinimalPlugins` as well as `DefaultPlugins`.
pub struct DiggerPlugin {
    pub config: LevelConfig,
    pub seed: u64,
}

impl Plugin for DiggerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DiggerSettings {
            config: self.config.clone(),
            seed: self.seed,
        })
        .add_event::<WormCommand>()
        .add_event::<TerrainChanged>()
        .add_event::<LevelStarted>()
        .add_systems(Startup, start_session_system)
        .add_systems(Update, session_tick_system);
    }
}

pub fn start_session_system(
    mut commands: Commands,
    settings: Res<DiggerSettings>,
    mut started: EventWriter<LevelStarted>,
) {
    match Session::new(settings.config.clone(), settings.seed) {
        Ok(session) => {
            info!("session started with seed {}", settings.seed);
            started.send(LevelStarted {
                number: session.level_number(),
            });
            commands.insert_resource(session);
        }
        Err(e) => error!("could not start a session: {}", e),
    }
}

pub fn session_tick_system(
    time: Res<Time>,
    session: Option<ResMut<Session>>,
    mut commands: EventReader<WormCommand>,
    mut changed: EventWriter<TerrainChanged>,
    mut started: EventWriter<LevelStarted>,
) {
    let Some(mut session) = session else {
        commands.clear();
        return;
    };

    let report = session.tick(time.delta_secs(), commands.read().copied());
    if !report.changed.is_empty() {
        changed.send(TerrainChanged {
            cells: report.changed,
        });
    }

    if report.reached_goal {
        match session.next_level() {
            Ok(()) => {
                started.send(LevelStarted {
                    number: session.level_number(),
                });
            }
            Err(e) => error!("could not build the next level: {}", e),
        }
    }
}
