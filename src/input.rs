//! keyboard & mouse → `WormCommand`
//!
//! A/D walk, Space jumps, W/S swing the aim, Q cycles tools, F uses the
//! tool in front of the worm and the left mouse button uses it at the
//! cursor.
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::constants::{AIM_DISTANCE, AIM_TURN_RATE};
use crate::session::{Session, WormCommand};
use crate::terrain::world_to_cell;
use crate::tools::ToolShape;

/// where a tool use lands, given a target point in cell space
fn tool_use(session: &Session, target: Vec2) -> WormCommand {
    let worm = session.worm();
    match session.current_tool().map(|t| t.shape) {
        // beams always leave from the worm
        Some(ToolShape::Line { .. }) => WormCommand::UseTool {
            at: worm.position,
            direction: (target - worm.position).try_normalize().or(Some(worm.aim)),
        },
        _ => WormCommand::UseTool {
            at: target,
            direction: None,
        },
    }
}

pub fn worm_input_system(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
    session: Option<Res<Session>>,
    mut out: EventWriter<WormCommand>,
) {
    let Some(session) = session else { return };
    let worm = session.worm();

    /* ---- walking & jumping ---- */
    let horizontal = match (keys.pressed(KeyCode::KeyA), keys.pressed(KeyCode::KeyD)) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    out.send(WormCommand::Move { horizontal });
    if keys.just_pressed(KeyCode::Space) {
        out.send(WormCommand::Jump);
    }

    /* ---- aim (up is -y in cell space) ---- */
    let swing = match (keys.pressed(KeyCode::KeyW), keys.pressed(KeyCode::KeyS)) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    if swing != 0.0 {
        let angle = swing * worm.facing * AIM_TURN_RATE * time.delta_secs();
        out.send(WormCommand::Aim(Vec2::from_angle(angle).rotate(worm.aim)));
    }

    /* ---- tools ---- */
    if keys.just_pressed(KeyCode::KeyQ) {
        out.send(WormCommand::SelectNextTool);
    }
    if keys.just_pressed(KeyCode::KeyF) {
        out.send(tool_use(&session, worm.position + worm.aim * AIM_DISTANCE));
    }

    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = window_q.get_single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok((cam, cam_tf)) = cam_q.get_single() else { return };
    let Ok(world) = cam.viewport_to_world_2d(cam_tf, cursor) else {
        return;
    };
    let target = world_to_cell(session.grid().height(), session.config().tile_size, world);
    out.send(tool_use(&session, target));
}
