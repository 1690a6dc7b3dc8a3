use bevy::math::Vec2;
use bevy::prelude::Resource;
use crate::util::{Side, SideMap};

/// Everything the controller needs from the player's inputs for one frame
#[derive(Resource, Copy, Clone, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// horizontal movement axis, in `[-1, 1]`
    pub move_axis: f32,
    /// jump was pressed this frame
    pub jump_down: bool,
    /// jump is currently held
    pub jump_held: bool,
    /// jump was released this frame
    pub jump_up: bool,
    /// dash was pressed this frame
    pub dash_down: bool,
    /// "down" is held (fast-fall, downward dashes)
    pub down_held: bool,
    /// "up" is held (upward dashes)
    pub up_held: bool,
}

impl ControlInput {
    /// Direction the player is aiming in, e.g. for dashes. Zero when nothing is pressed.
    pub fn aim(&self) -> Vec2 {
        let y = match (self.up_held, self.down_held) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        Vec2::new(self.move_axis.clamp(-1.0, 1.0), y)
    }
}

/// Result of one frame's contact probes
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContactState {
    pub on_ground: bool,
    pub on_wall: SideMap<bool>,
    /// friction coefficient of the ground surface, 0 when there is none
    pub ground_friction: f32,
}

/// Coarse phase of the jump state machine, derived from the [KinematicState] flags
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JumpPhase {
    Grounded,
    Rising,
    Falling,
    WallJumping,
    JumpCut,
}

/// The character's motion flags. Only the controller's state machines change these.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct KinematicState {
    /// the body's velocity as of the latest frame or physics step
    pub velocity: Vec2,
    pub facing: Side,
    pub is_jumping: bool,
    pub is_wall_jumping: bool,
    pub is_dashing: bool,
    pub is_dash_attacking: bool,
    pub is_sliding: bool,
    pub is_jump_cut: bool,
    pub is_jump_falling: bool,
}

impl KinematicState {
    pub fn jump_phase(&self, grounded: bool) -> JumpPhase {
        if self.is_wall_jumping {
            JumpPhase::WallJumping
        } else if self.is_jump_cut && !grounded {
            JumpPhase::JumpCut
        } else if self.is_jumping {
            JumpPhase::Rising
        } else if grounded {
            JumpPhase::Grounded
        } else {
            JumpPhase::Falling
        }
    }

    /// True while the character is at the top of a jump arc, moving slower than `threshold` vertically
    pub fn is_in_jump_hang(&self, threshold: f32) -> bool {
        (self.is_jumping || self.is_wall_jumping || self.is_jump_falling) && self.velocity.y.abs() < threshold
    }

    /// Drop every jump-related flag, e.g. because a dash overrides the jump
    pub fn cancel_jump(&mut self) {
        self.is_jumping = false;
        self.is_wall_jumping = false;
        self.is_jump_cut = false;
    }
}

/// Dash charges, bounded by `max`
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DashResource {
    charges: u8,
    max: u8,
}

impl DashResource {
    /// Starts full
    pub fn full(max: u8) -> Self {
        Self { charges: max, max }
    }

    pub fn charges(&self) -> u8 {
        self.charges
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.charges >= self.max
    }

    /// Use up one charge; false if there was nothing left
    pub fn try_spend(&mut self) -> bool {
        if self.charges > 0 {
            self.charges -= 1;
            true
        } else {
            false
        }
    }

    pub fn refill_one(&mut self) {
        self.charges = self.charges.saturating_add(1).min(self.max);
    }

    /// Change the bound, dropping charges above the new maximum
    pub fn set_max(&mut self, max: u8) {
        self.max = max;
        self.charges = self.charges.min(max);
    }
}
