use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use wormhole_digger::config::Placement;
use wormhole_digger::plugin::session_tick_system;
use wormhole_digger::{
    DiggerPlugin, LevelConfig, LevelStarted, Material, Session, TerrainChanged, WormCommand,
};

/// everything the plugin announced, gathered by a plain reader system
#[derive(Resource, Default)]
struct Seen {
    started: Vec<u32>,
    changed: Vec<IVec2>,
}

fn record(
    mut seen: ResMut<Seen>,
    mut started: EventReader<LevelStarted>,
    mut changed: EventReader<TerrainChanged>,
) {
    seen.started.extend(started.read().map(|e| e.number));
    for event in changed.read() {
        seen.changed.extend(event.cells.iter().copied());
    }
}

fn app(config: LevelConfig, seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(DiggerPlugin { config, seed })
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .init_resource::<Seen>()
        .add_systems(Update, record.after(session_tick_system));
    app
}

fn small() -> LevelConfig {
    LevelConfig {
        width: 48,
        height: 32,
        ..LevelConfig::default()
    }
}

#[test]
fn startup_creates_a_session_and_announces_level_one() {
    let mut app = app(small(), 3);
    app.update();

    let session = app.world().resource::<Session>();
    assert_eq!(session.level_number(), 1);
    assert_eq!(session.grid().width(), 48);

    assert_eq!(app.world().resource::<Seen>().started, vec![1]);
}

#[test]
fn invalid_config_leaves_no_session() {
    let mut config = small();
    config.width = 0;
    let mut app = app(config, 1);
    app.update();
    app.world_mut().send_event(WormCommand::Jump);
    app.update();
    assert!(app.world().get_resource::<Session>().is_none());
}

#[test]
fn tool_commands_dig_and_report_changed_cells() {
    let mut config = small();
    config.supplies.unlimited = true;
    let mut app = app(config, 5);
    app.update();

    let at = app.world().resource::<Session>().worm().position + Vec2::new(0.0, 3.5);
    app.world_mut()
        .send_event(WormCommand::UseTool { at, direction: None });
    app.update();

    let session = app.world().resource::<Session>();
    for cell in &app.world().resource::<Seen>().changed {
        assert_eq!(session.grid().material_at(*cell), Some(Material::Empty));
    }
}

#[test]
fn reaching_the_goal_starts_the_next_level() {
    let mut config = small();
    config.placement = Placement::Fixed {
        start: (10, 10),
        goal: (12, 10),
    };
    let mut app = app(config, 8);
    app.update();
    let first_seed = app.world().resource::<Session>().level().seed;

    for _ in 0..5 {
        app.world_mut()
            .send_event(WormCommand::Move { horizontal: 1.0 });
        app.update();
    }

    let session = app.world().resource::<Session>();
    assert!(session.level_number() >= 2);
    assert_ne!(session.level().seed, first_seed);
    assert!(!session.is_complete());
    let started = &app.world().resource::<Seen>().started;
    assert_eq!(started.first(), Some(&1));
    assert!(started.windows(2).all(|w| w[1] == w[0] + 1));
}
