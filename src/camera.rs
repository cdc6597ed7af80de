use bevy::prelude::*;

use crate::components::WormSprite;
use crate::session::Session;

/// pixel snapping helper – keeps the camera on whole pixels so sprites never
/// land on half‑pixels and shimmer
#[inline]
fn snap(v: f32) -> f32 {
    v.round()
}

/// keep `v` inside `[half, world - half]`; a level narrower than the view
/// is centred instead
fn clamp_axis(v: f32, half: f32, world: f32) -> f32 {
    if world <= half * 2.0 {
        world * 0.5
    } else {
        v.clamp(half, world - half)
    }
}

/// simple camera follow with level clamping
///
/// NOTE: runs in **PostUpdate**, after the worm sprite has been moved.
pub fn camera_follow_system(
    mut cam_q: Query<&mut Transform, (With<Camera>, Without<WormSprite>)>,
    worm_q: Query<&Transform, With<WormSprite>>,
    window_q: Query<&Window>,
    session: Option<Res<Session>>,
) {
    let Some(session) = session else { return };
    let Ok(mut cam_tf) = cam_q.get_single_mut() else { return };
    let Ok(worm_tf) = worm_q.get_single() else { return };
    let Ok(window) = window_q.get_single() else { return };

    let tile = session.config().tile_size;
    let world_w = session.grid().width() as f32 * tile;
    let world_h = session.grid().height() as f32 * tile;

    let x = clamp_axis(worm_tf.translation.x, window.width() * 0.5, world_w);
    let y = clamp_axis(worm_tf.translation.y, window.height() * 0.5, world_h);

    cam_tf.translation.x = snap(x);
    cam_tf.translation.y = snap(y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_levels_are_centred() {
        assert_eq!(clamp_axis(10.0, 640.0, 480.0), 240.0);
        assert_eq!(clamp_axis(10.0, 640.0, 2000.0), 640.0);
        assert_eq!(clamp_axis(1900.0, 640.0, 2000.0), 1360.0);
    }
}
