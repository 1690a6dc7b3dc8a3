use bevy::log::debug;
use bevy::math::Vec2;
use crate::player::{Body, ControlInput, ControlProfile, DashResource, EventSink, KinematicState, INPUT_DEAD_ZONE};
use crate::util::{TaskSlot, TaskTick, TimerBank, TimerKind};

/// Where a dash is in its lifecycle
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum DashPhase {
    #[default]
    Idle,
    /// velocity is pinned to the dash velocity, gravity is off
    Attacking { elapsed: f32, direction: Vec2 },
    /// gravity is back, and the player regains part of their horizontal control
    Ending { elapsed: f32, direction: Vec2 },
}

/// Timed dash with a pool of charges that refill while grounded
#[derive(Default, Debug, Clone)]
pub struct DashMachine {
    phase: DashPhase,
    charges: DashResource,
    refill: TaskSlot,
}

impl DashMachine {
    pub fn new(profile: &ControlProfile) -> Self {
        Self {
            phase: DashPhase::Idle,
            charges: DashResource::full(profile.config().dash.charges),
            refill: TaskSlot::default(),
        }
    }

    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    pub fn charges(&self) -> &DashResource {
        &self.charges
    }

    pub fn is_refilling(&self) -> bool {
        self.refill.is_running()
    }

    /// How far along the running refill is, from 0 to 1
    pub fn refill_progress(&self) -> Option<f32> {
        self.refill.progress()
    }

    /// Advance an in-progress dash by `delta` seconds
    pub fn advance(&mut self, delta: f32, state: &mut KinematicState, profile: &ControlProfile, body: &mut impl Body) {
        let dash = &profile.config().dash;
        self.phase = match self.phase {
            DashPhase::Idle => DashPhase::Idle,
            DashPhase::Attacking { elapsed, direction } => {
                let elapsed = elapsed + delta;
                if elapsed <= dash.attack_time {
                    body.set_velocity(direction * dash.speed);
                    DashPhase::Attacking { elapsed, direction }
                } else {
                    state.is_dash_attacking = false;
                    body.set_gravity_scale(profile.derived().gravity_scale);
                    body.set_velocity(dash.end_speed * direction);
                    DashPhase::Ending { elapsed: 0.0, direction }
                }
            }
            DashPhase::Ending { elapsed, direction } => {
                let elapsed = elapsed + delta;
                if elapsed <= dash.end_time {
                    DashPhase::Ending { elapsed, direction }
                } else {
                    debug!("dash over");
                    state.is_dashing = false;
                    DashPhase::Idle
                }
            }
        };
        state.velocity = body.velocity();
    }

    /// Tick the refill task, and start a new one when grounded and short on charges.
    /// Leaving the ground drops a refill in progress.
    pub fn update_refill(&mut self, delta: f32, state: &KinematicState, timers: &TimerBank, profile: &ControlProfile) {
        if !timers.is_active(TimerKind::Ground) {
            if self.refill.is_running() {
                debug!("left the ground, dash refill dropped");
                self.refill.cancel();
            }
            return;
        }
        if self.refill.tick(delta) == TaskTick::Completed {
            self.charges.refill_one();
            debug!("dash refilled ({} / {})", self.charges.charges(), self.charges.max());
        }
        if !state.is_dashing && !self.charges.is_full() {
            self.refill.start(profile.config().dash.refill_time);
        }
    }

    /// Start a buffered dash, if there is a charge for it
    pub fn try_dash(
        &mut self,
        input: &ControlInput,
        state: &mut KinematicState,
        timers: &mut TimerBank,
        profile: &ControlProfile,
        body: &mut impl Body,
        events: &mut impl EventSink,
    ) -> bool {
        if state.is_dashing
            || !timers.is_active(TimerKind::DashPressed)
            || timers.is_active(TimerKind::DashCooldown)
            || !self.charges.try_spend()
        {
            return false;
        }
        let dash = &profile.config().dash;

        let aim = input.aim();
        let direction = if aim.length() > INPUT_DEAD_ZONE {
            aim.normalize()
        } else {
            state.facing.unit()
        };
        debug!("dashing towards {:?}, {} charges left", direction, self.charges.charges());

        state.is_dashing = true;
        state.is_dash_attacking = true;
        state.is_sliding = false;
        state.cancel_jump();

        timers.clear(TimerKind::Ground);
        timers.clear(TimerKind::DashPressed);
        timers.reset(TimerKind::DashCooldown, dash.cooldown);

        body.set_gravity_scale(0.0);
        body.set_velocity(direction * dash.speed);
        state.velocity = body.velocity();
        self.phase = DashPhase::Attacking { elapsed: 0.0, direction };

        events.on_dash_started();
        if dash.sleep_time > 0.0 {
            events.on_sleep_requested(dash.sleep_time);
        }
        true
    }

    /// Stop any dash and refill in progress, and restore the full set of charges
    pub fn reset(&mut self, profile: &ControlProfile) {
        self.refill.cancel();
        self.phase = DashPhase::Idle;
        self.charges = DashResource::full(profile.config().dash.charges);
    }

    /// Follow a change to the maximum number of charges
    pub fn set_max_charges(&mut self, max: u8) {
        self.charges.set_max(max);
        if self.charges.is_full() {
            self.refill.cancel();
        }
    }
}
