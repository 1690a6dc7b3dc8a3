use crate::player::{JumpParams, RunParams};

/// Inputs below this magnitude count as "not pressing anything"
pub const INPUT_DEAD_ZONE: f32 = 0.01;

/// Move `current` towards `target` by at most `max_delta`, without overshooting
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta * delta.signum()
    }
}

/// Per-step context for [solve_horizontal]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunContext {
    /// horizontal input axis, in `[-1, 1]`
    pub move_axis: f32,
    pub grounded: bool,
    /// friction of the surface being stood on, subtracted from the max speed
    pub friction: f32,
    /// fraction of control the player has, from 0 (none) to 1 (full).
    /// Reduced while wall jumping or ending a dash.
    pub lerp: f32,
    /// near the apex of a jump, where the player gets a bit of extra air control
    pub in_jump_hang: bool,
}

/// Pick the rate for reaching `target_vel`:
/// acceleration when speeding up, turn speed when reversing, deceleration when stopping.
fn select_rate(current_vel: f32, target_vel: f32, grounded: bool, run: &RunParams) -> f32 {
    let stopping = target_vel.abs() < INPUT_DEAD_ZONE;
    let reversing = !stopping
        && current_vel.abs() > INPUT_DEAD_ZONE
        && current_vel.signum() != target_vel.signum();

    match (stopping, reversing, grounded) {
        (true, _, true) => run.deceleration,
        (true, _, false) => run.deceleration * run.air_deceleration_mult,
        (false, true, true) => run.turn_speed,
        (false, true, false) => run.turn_speed * run.air_turn_mult,
        (false, false, true) => run.acceleration,
        (false, false, false) => run.acceleration * run.air_acceleration_mult,
    }
}

/// Solve for the character's new horizontal velocity after one physics step of `delta` seconds
pub fn solve_horizontal(current_vel: f32, ctx: &RunContext, run: &RunParams, jump: &JumpParams, delta: f32) -> f32 {
    let max_speed = (run.max_speed - ctx.friction).max(0.0);
    let desired = ctx.move_axis.clamp(-1.0, 1.0) * max_speed;

    // reduced control blends the goal with what the character is already doing
    let mut target_vel = current_vel + (desired - current_vel) * ctx.lerp.clamp(0.0, 1.0);

    if !run.use_acceleration && ctx.grounded {
        return target_vel;
    }

    let mut rate = select_rate(current_vel, target_vel, ctx.grounded, run);

    if ctx.in_jump_hang {
        rate *= jump.hang_acceleration_mult;
        target_vel *= jump.hang_max_speed_mult;
    }

    if run.conserve_momentum && !ctx.grounded {
        let same_direction = current_vel.signum() == target_vel.signum();
        let over_target = same_direction
            && target_vel.abs() > INPUT_DEAD_ZONE
            && current_vel.abs() > target_vel.abs();
        let coasting = target_vel.abs() < INPUT_DEAD_ZONE && current_vel.abs() > max_speed;
        if over_target || coasting {
            // keep the momentum from e.g. a dash or wall jump, rather than braking to the normal max speed
            return current_vel;
        }
    }

    move_towards(current_vel, target_vel, rate * delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 50.0;

    fn grounded(axis: f32) -> RunContext {
        RunContext {
            move_axis: axis,
            grounded: true,
            friction: 0.0,
            lerp: 1.0,
            in_jump_hang: false,
        }
    }

    fn airborne(axis: f32) -> RunContext {
        RunContext {
            grounded: false,
            ..grounded(axis)
        }
    }

    fn run_params() -> RunParams {
        RunParams {
            max_speed: 10.0,
            acceleration: 52.0,
            deceleration: 40.0,
            turn_speed: 80.0,
            air_acceleration_mult: 0.5,
            air_deceleration_mult: 0.5,
            air_turn_mult: 0.5,
            use_acceleration: true,
            conserve_momentum: true,
        }
    }

    #[test]
    fn move_towards_never_overshoots() {
        assert_eq!(move_towards(0.0, 1.0, 5.0), 1.0);
        assert_eq!(move_towards(0.0, 10.0, 2.0), 2.0);
        assert_eq!(move_towards(0.0, -10.0, 2.0), -2.0);
        assert_eq!(move_towards(3.0, 3.0, 0.0), 3.0);
    }

    #[test]
    fn accelerates_monotonically_to_max_speed() {
        let run = run_params();
        let jump = JumpParams::default();
        let mut vx = 0.0;
        let mut reached_at = None;
        for step in 1..=50 {
            let next = solve_horizontal(vx, &grounded(1.0), &run, &jump, DT);
            assert!(next >= vx);
            vx = next;
            if reached_at.is_none() && (10.0 - vx).abs() < 0.1 {
                reached_at = Some(step);
            }
        }
        assert_eq!(vx, 10.0);
        // 10 / 52 is about 0.19 seconds
        assert!(reached_at.unwrap() <= 10);
    }

    #[test]
    fn instant_policy_snaps_on_the_ground_only() {
        let mut run = run_params();
        run.use_acceleration = false;
        let jump = JumpParams::default();
        assert_eq!(solve_horizontal(0.0, &grounded(-1.0), &run, &jump, DT), -10.0);
        let air = solve_horizontal(0.0, &airborne(-1.0), &run, &jump, DT);
        assert!((air + 52.0 * 0.5 * DT).abs() < 1e-5);
    }

    #[test]
    fn friction_lowers_the_target_speed() {
        let mut run = run_params();
        run.use_acceleration = false;
        let jump = JumpParams::default();
        let ctx = RunContext {
            friction: 4.0,
            ..grounded(1.0)
        };
        assert_eq!(solve_horizontal(0.0, &ctx, &run, &jump, DT), 6.0);
        let sticky = RunContext {
            friction: 40.0,
            ..grounded(1.0)
        };
        assert_eq!(solve_horizontal(0.0, &sticky, &run, &jump, DT), 0.0);
    }

    #[test]
    fn reversing_uses_the_turn_rate() {
        let run = run_params();
        let jump = JumpParams::default();
        let vx = solve_horizontal(5.0, &grounded(-1.0), &run, &jump, DT);
        assert!((vx - (5.0 - 80.0 * DT)).abs() < 1e-5);
    }

    #[test]
    fn releasing_input_decelerates_on_the_ground() {
        let run = run_params();
        let jump = JumpParams::default();
        let vx = solve_horizontal(5.0, &grounded(0.0), &run, &jump, DT);
        assert!((vx - (5.0 - 40.0 * DT)).abs() < 1e-5);
    }

    #[test]
    fn airborne_momentum_is_conserved_above_max_speed() {
        let run = run_params();
        let jump = JumpParams::default();
        assert_eq!(solve_horizontal(18.0, &airborne(0.0), &run, &jump, DT), 18.0);
        assert_eq!(solve_horizontal(18.0, &airborne(1.0), &run, &jump, DT), 18.0);
        assert_eq!(solve_horizontal(-18.0, &airborne(-0.5), &run, &jump, DT), -18.0);

        // but pressing the other way still turns around
        assert!(solve_horizontal(18.0, &airborne(-1.0), &run, &jump, DT) < 18.0);

        let mut braking = run_params();
        braking.conserve_momentum = false;
        assert!(solve_horizontal(18.0, &airborne(0.0), &braking, &jump, DT) < 18.0);
    }

    #[test]
    fn reduced_lerp_limits_control() {
        let mut run = run_params();
        run.use_acceleration = false;
        let jump = JumpParams::default();
        let ctx = RunContext {
            lerp: 0.5,
            ..grounded(1.0)
        };
        assert_eq!(solve_horizontal(0.0, &ctx, &run, &jump, DT), 5.0);
    }

    #[test]
    fn jump_hang_boosts_air_control() {
        let run = run_params();
        let jump = JumpParams {
            hang_acceleration_mult: 2.0,
            hang_max_speed_mult: 1.5,
            ..JumpParams::default()
        };
        let normal = solve_horizontal(0.0, &airborne(1.0), &run, &jump, DT);
        let hang = solve_horizontal(
            0.0,
            &RunContext {
                in_jump_hang: true,
                ..airborne(1.0)
            },
            &run,
            &jump,
            DT,
        );
        assert!((hang - normal * 2.0).abs() < 1e-5);
    }
}
