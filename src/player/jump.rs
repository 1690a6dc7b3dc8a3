use bevy::log::debug;
use bevy::math::Vec2;
use crate::player::{Body, ContactState, ControlProfile, KinematicState};
use crate::util::{Side, TimerBank, TimerKind};

/// Which kind of jump fired
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JumpKind {
    /// from the ground, or within coyote time of leaving it
    Ground,
    /// mid-air, using up an air jump
    Air,
    /// off the wall on the given side
    Wall(Side),
}

/// Gravity the body should have for the next physics step
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GravityIntent {
    pub scale: f32,
    /// terminal velocity to enforce, if any
    pub max_fall_speed: Option<f32>,
}

impl GravityIntent {
    /// Plain base gravity, with no terminal velocity
    pub fn base(profile: &ControlProfile) -> Self {
        Self {
            scale: profile.derived().gravity_scale,
            max_fall_speed: None,
        }
    }

    pub fn apply(&self, body: &mut impl Body) {
        body.set_gravity_scale(self.scale);
        if let Some(max_fall_speed) = self.max_fall_speed {
            let velocity = body.velocity();
            if velocity.y < -max_fall_speed {
                body.set_velocity(Vec2::new(velocity.x, -max_fall_speed));
            }
        }
    }
}

/// Pick the gravity scale for the character's current state.
///
/// Conditions are checked in priority order; the first one that holds wins. Fast-falling is
/// checked before the jump cut, so holding down always gets the stronger pull.
pub fn gravity_intent(state: &KinematicState, down_held: bool, profile: &ControlProfile) -> GravityIntent {
    let config = profile.config();
    let base = profile.derived().gravity_scale;
    let vy = state.velocity.y;

    let (scale, max_fall_speed) = if state.is_dash_attacking || state.is_sliding {
        (0.0, None)
    } else if vy < 0.0 && down_held {
        (base * config.gravity.fast_fall_mult, Some(config.gravity.max_fast_fall_speed))
    } else if state.is_jump_cut {
        (base * config.jump.cut_gravity_mult, Some(config.gravity.max_fall_speed))
    } else if state.is_in_jump_hang(config.jump.hang_threshold) {
        (base * config.jump.hang_gravity_mult, None)
    } else if vy < 0.0 {
        (base * config.gravity.fall_mult, Some(config.gravity.max_fall_speed))
    } else {
        (base, None)
    };
    GravityIntent { scale, max_fall_speed }
}

/// Jump bookkeeping that outlives a single frame
#[derive(Default, Debug, Clone)]
pub struct JumpMachine {
    air_jumps_remaining: u8,
    /// the wall the most recent wall jump pushed off from
    last_wall: Option<Side>,
}

impl JumpMachine {
    pub fn new(profile: &ControlProfile) -> Self {
        Self {
            air_jumps_remaining: profile.config().jump.max_air_jumps,
            last_wall: None,
        }
    }

    pub fn air_jumps_remaining(&self) -> u8 {
        self.air_jumps_remaining
    }

    /// Follow a change to the number of air jumps allowed. Jumps already spent stay spent.
    pub fn set_max_air_jumps(&mut self, max: u8) {
        self.air_jumps_remaining = self.air_jumps_remaining.min(max);
    }

    /// The jump button was released: rising characters start falling sooner
    pub fn on_jump_released(&self, state: &mut KinematicState) {
        if (state.is_jumping || state.is_wall_jumping) && state.velocity.y > 0.0 {
            state.is_jump_cut = true;
        }
    }

    /// Per-frame transitions that don't depend on input: apex, end of wall jump, landing.
    pub fn update_phase(
        &mut self,
        state: &mut KinematicState,
        timers: &TimerBank,
        contacts: &ContactState,
        profile: &ControlProfile,
    ) {
        if state.is_jumping && state.velocity.y < 0.0 {
            state.is_jumping = false;
            if !state.is_wall_jumping {
                state.is_jump_falling = true;
            }
        }

        if state.is_wall_jumping && !timers.is_active(TimerKind::WallJump) {
            state.is_wall_jumping = false;
        }

        if timers.is_active(TimerKind::Ground) && !state.is_jumping && !state.is_wall_jumping {
            state.is_jump_cut = false;
            state.is_jump_falling = false;
        }

        // air jumps come back once the character is actually standing on something
        if contacts.on_ground && !state.is_jumping {
            self.air_jumps_remaining = profile.config().jump.max_air_jumps;
            self.last_wall = None;
        }
    }

    /// Fire a buffered jump if the character is in a position to jump
    pub fn try_jump(
        &mut self,
        state: &mut KinematicState,
        timers: &mut TimerBank,
        contacts: &ContactState,
        profile: &ControlProfile,
        body: &mut impl Body,
    ) -> Option<JumpKind> {
        if state.is_dashing || !timers.is_active(TimerKind::JumpPressed) {
            return None;
        }

        let near_ground = contacts.on_ground || timers.is_active(TimerKind::Ground);
        let kind = if near_ground && !state.is_jumping {
            JumpKind::Ground
        } else if let Some(wall) = self.wall_to_jump_from(state, timers, profile) {
            JumpKind::Wall(wall)
        } else if !near_ground && self.air_jumps_remaining > 0 {
            self.air_jumps_remaining -= 1;
            JumpKind::Air
        } else {
            return None;
        };

        match kind {
            JumpKind::Ground | JumpKind::Air => {
                debug!("{:?} jump (coyote timer {:?})", kind, timers[TimerKind::Ground]);
                timers.clear(TimerKind::JumpPressed);
                timers.clear(TimerKind::Ground);
                state.is_jumping = true;
                state.is_wall_jumping = false;
                state.is_jump_cut = false;
                state.is_jump_falling = false;
                apply_jump_impulse(body, profile.derived().jump_speed);
            }
            JumpKind::Wall(wall) => {
                debug!("wall jumping from {:?} wall!", wall);
                timers.clear(TimerKind::JumpPressed);
                timers.clear(TimerKind::Ground);
                timers.clear(TimerKind::WallLeft);
                timers.clear(TimerKind::WallRight);
                timers.reset(TimerKind::WallJump, profile.config().wall.jump_time);
                state.is_wall_jumping = true;
                state.is_jumping = false;
                state.is_jump_cut = false;
                state.is_jump_falling = false;
                if profile.config().wall.turn_on_wall_jump {
                    state.facing = -wall;
                }
                self.last_wall = Some(wall);
                apply_wall_jump_impulse(body, profile.config().wall.jump_force, wall);
            }
        }
        state.velocity = body.velocity();
        Some(kind)
    }

    /// A wall jump is possible off a wall touched within its grace time, once the ground is out of reach.
    /// During a wall jump, only the opposite wall counts.
    fn wall_to_jump_from(&self, state: &KinematicState, timers: &TimerBank, profile: &ControlProfile) -> Option<Side> {
        if !profile.config().wall.jump_enabled || timers.is_active(TimerKind::Ground) {
            return None;
        }
        let wall = if timers.is_active(TimerKind::WallRight) {
            Side::Right
        } else if timers.is_active(TimerKind::WallLeft) {
            Side::Left
        } else {
            return None;
        };
        if state.is_wall_jumping && self.last_wall != Some(-wall) {
            return None;
        }
        Some(wall)
    }
}

/// Bring the vertical speed up to `jump_speed`. Upward speed the body already has counts
/// towards the jump, and a falling body gets its fall cancelled first.
fn apply_jump_impulse(body: &mut impl Body, jump_speed: f32) {
    let vy = body.velocity().y;
    let delta_vy = if vy > 0.0 {
        (jump_speed - vy).max(0.0)
    } else {
        jump_speed - vy
    };
    let mass = body.mass();
    body.add_impulse(Vec2::Y * delta_vy * mass);
}

/// Push away from `wall` with `force`, cancelling any velocity that works against it
fn apply_wall_jump_impulse(body: &mut impl Body, force: Vec2, wall: Side) {
    let velocity = body.velocity();
    let mut delta = Vec2::new(force.x * -wall, force.y);
    if velocity.x.signum() != delta.x.signum() {
        delta.x -= velocity.x;
    }
    if velocity.y < 0.0 {
        delta.y -= velocity.y;
    }
    let mass = body.mass();
    body.add_impulse(delta * mass);
}
