use crate::player::{KinematicState, SlideParams, INPUT_DEAD_ZONE};
use crate::util::{Side, TimerBank, TimerKind};

/// Slide down a wall while airborne and pushing into it. Jumps and dashes take priority.
pub fn should_slide(state: &KinematicState, timers: &TimerBank, move_axis: f32) -> bool {
    if state.is_jumping || state.is_wall_jumping || state.is_dashing || timers.is_active(TimerKind::Ground) {
        return false;
    }
    match Side::from_axis(move_axis, INPUT_DEAD_ZONE) {
        Some(Side::Left) => timers.is_active(TimerKind::WallLeft),
        Some(Side::Right) => timers.is_active(TimerKind::WallRight),
        None => false,
    }
}

/// Vertical force that eases the body towards the slide speed.
///
/// The force is clamped so that a single step of `delta` seconds never changes the
/// velocity by more than the remaining gap.
pub fn slide_force(vertical_vel: f32, slide: &SlideParams, mass: f32, delta: f32) -> f32 {
    let speed_diff = -slide.speed - vertical_vel;
    let force = speed_diff * slide.acceleration * mass;
    if delta <= 0.0 {
        return force;
    }
    let limit = speed_diff.abs() * mass / delta;
    force.clamp(-limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airborne_on_right_wall() -> TimerBank {
        let mut timers = TimerBank::default();
        timers.reset(TimerKind::WallRight, 0.1);
        timers
    }

    #[test]
    fn slides_only_when_pushing_into_the_wall() {
        let state = KinematicState::default();
        let timers = airborne_on_right_wall();
        assert!(should_slide(&state, &timers, 1.0));
        assert!(!should_slide(&state, &timers, -1.0));
        assert!(!should_slide(&state, &timers, 0.0));
    }

    #[test]
    fn jumping_dashing_or_grounded_prevents_sliding() {
        let mut timers = airborne_on_right_wall();
        for state in [
            KinematicState { is_jumping: true, ..Default::default() },
            KinematicState { is_wall_jumping: true, ..Default::default() },
            KinematicState { is_dashing: true, ..Default::default() },
        ] {
            assert!(!should_slide(&state, &timers, 1.0));
        }
        timers.reset(TimerKind::Ground, 0.1);
        assert!(!should_slide(&KinematicState::default(), &timers, 1.0));
    }

    #[test]
    fn force_never_overshoots_the_slide_speed() {
        let slide = SlideParams {
            speed: 5.0,
            acceleration: 1000.0,
        };
        let delta = 0.02;
        let force = slide_force(0.0, &slide, 2.0, delta);
        // F * dt / m is exactly the gap of 5
        assert!((force * delta / 2.0 + 5.0).abs() < 1e-4);

        let gentle = SlideParams {
            speed: 5.0,
            acceleration: 2.0,
        };
        assert!((slide_force(-1.0, &gentle, 1.0, delta) + 8.0).abs() < 1e-5);
        // already sliding faster than the slide speed: pushed back up
        assert!(slide_force(-9.0, &gentle, 1.0, delta) > 0.0);
    }
}
