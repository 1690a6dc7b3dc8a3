use bevy::log::{debug, info};
use bevy::math::Vec2;
use crate::player::{
    gravity_intent, should_slide, slide_force, solve_horizontal, Body, ConfigError, ContactQuery, ContactSensor,
    ContactState, ControlInput, ControlProfile, DashMachine, EventSink, GravityIntent, JumpKind, JumpMachine,
    KinematicState, MovementConfig, RunContext, INPUT_DEAD_ZONE,
};
use crate::util::{Side, TimerBank, TimerKind};

/// Drives one character's rigid body from its inputs and contacts.
///
/// Call [CharacterController::frame] once per rendered frame, and
/// [CharacterController::physics_step] once per fixed physics step. The physics step may run
/// zero or more times between two frames; one-shot effects (jump impulses, dash starts) only
/// ever happen in `frame`.
#[derive(Debug, Clone)]
pub struct CharacterController {
    profile: ControlProfile,
    /// validated config waiting for a safe moment to take over
    pending_profile: Option<ControlProfile>,
    state: KinematicState,
    timers: TimerBank,
    contacts: ContactSensor,
    jump: JumpMachine,
    dash: DashMachine,
    input: ControlInput,
    gravity: GravityIntent,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::from_profile(ControlProfile::default())
    }
}

impl CharacterController {
    pub fn new(config: MovementConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_profile(ControlProfile::new(config)?))
    }

    pub fn from_profile(profile: ControlProfile) -> Self {
        Self {
            gravity: GravityIntent::base(&profile),
            jump: JumpMachine::new(&profile),
            dash: DashMachine::new(&profile),
            profile,
            pending_profile: None,
            state: KinematicState::default(),
            timers: TimerBank::default(),
            contacts: ContactSensor::default(),
            input: ControlInput::default(),
        }
    }

    pub fn profile(&self) -> &ControlProfile {
        &self.profile
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    pub fn contacts(&self) -> &ContactState {
        self.contacts.current()
    }

    pub fn jump(&self) -> &JumpMachine {
        &self.jump
    }

    pub fn dash(&self) -> &DashMachine {
        &self.dash
    }

    pub fn gravity(&self) -> GravityIntent {
        self.gravity
    }

    pub fn has_pending_config(&self) -> bool {
        self.pending_profile.is_some()
    }

    /// Replace the config. It is validated right away, but only takes over at the start of the
    /// next frame that isn't in the middle of a dash.
    pub fn swap_config(&mut self, config: MovementConfig) -> Result<(), ConfigError> {
        self.pending_profile = Some(ControlProfile::new(config)?);
        Ok(())
    }

    /// Put the character back in its initial state: no motion flags, no timers, full dash charges.
    /// Any in-flight refill is cancelled.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending_profile.take() {
            self.profile = pending;
        }
        self.state = KinematicState::default();
        self.timers = TimerBank::default();
        self.contacts.clear();
        self.jump = JumpMachine::new(&self.profile);
        self.dash.reset(&self.profile);
        self.input = ControlInput::default();
        self.gravity = GravityIntent::base(&self.profile);
    }

    fn apply_pending_profile(&mut self) {
        if self.state.is_dashing {
            return;
        }
        if let Some(pending) = self.pending_profile.take() {
            info!(
                "movement config swapped (jump speed {} -> {})",
                self.profile.derived().jump_speed,
                pending.derived().jump_speed
            );
            self.profile = pending;
            self.dash.set_max_charges(self.profile.config().dash.charges);
            self.jump.set_max_air_jumps(self.profile.config().jump.max_air_jumps);
        }
    }

    /// Buffer presses and releases, and turn to face the input direction
    fn read_input(&mut self, input: ControlInput) {
        self.input = input;
        let config = self.profile.config();

        if input.jump_down {
            self.timers.reset(TimerKind::JumpPressed, config.assists.jump_input_buffer);
        }
        if input.jump_up {
            self.jump.on_jump_released(&mut self.state);
        }
        if input.dash_down {
            self.timers.reset(TimerKind::DashPressed, config.dash.input_buffer);
        }

        if !self.state.is_dashing {
            if let Some(side) = Side::from_axis(input.move_axis, INPUT_DEAD_ZONE) {
                self.state.facing = side;
            }
        }
    }

    /// Per-frame update: timers, input, contacts, then jump, dash, and slide transitions.
    ///
    /// Ends by deciding the gravity the next physics steps will use.
    pub fn frame(
        &mut self,
        delta: f32,
        input: ControlInput,
        body: &mut impl Body,
        contacts: &impl ContactQuery,
        events: &mut impl EventSink,
    ) {
        self.apply_pending_profile();
        self.timers.tick(delta);

        self.state.velocity = body.velocity();
        self.dash.advance(delta, &mut self.state, &self.profile, body);

        self.read_input(input);

        let refresh = self
            .contacts
            .refresh(contacts, &self.state, self.profile.config(), &mut self.timers);
        if refresh.landed {
            events.on_landed();
        }

        self.jump
            .update_phase(&mut self.state, &self.timers, self.contacts.current(), &self.profile);
        match self.jump.try_jump(
            &mut self.state,
            &mut self.timers,
            self.contacts.current(),
            &self.profile,
            body,
        ) {
            Some(JumpKind::Ground | JumpKind::Air) => events.on_jump_started(),
            Some(JumpKind::Wall(wall)) => events.on_wall_jumped(wall),
            None => {}
        }

        self.dash.update_refill(delta, &self.state, &self.timers, &self.profile);
        self.dash.try_dash(
            &self.input,
            &mut self.state,
            &mut self.timers,
            &self.profile,
            body,
            events,
        );

        let sliding = should_slide(&self.state, &self.timers, self.input.move_axis);
        if sliding != self.state.is_sliding {
            debug!("sliding: {}", sliding);
        }
        self.state.is_sliding = sliding;

        self.gravity = gravity_intent(&self.state, self.input.down_held, &self.profile);
    }

    /// Fraction of horizontal control the player has right now
    fn run_lerp(&self) -> f32 {
        let config = self.profile.config();
        if self.state.is_dashing {
            config.dash.end_run_lerp
        } else if self.state.is_wall_jumping {
            config.wall.jump_run_lerp
        } else {
            1.0
        }
    }

    /// Fixed-rate update: gravity, horizontal run, and wall slide forces
    pub fn physics_step(&mut self, delta: f32, body: &mut impl Body) {
        self.state.velocity = body.velocity();
        self.gravity = gravity_intent(&self.state, self.input.down_held, &self.profile);
        self.gravity.apply(body);

        let config = self.profile.config();
        if !self.state.is_dash_attacking {
            let ctx = RunContext {
                move_axis: self.input.move_axis,
                grounded: self.timers.is_active(TimerKind::Ground),
                friction: self.contacts.current().ground_friction,
                lerp: self.run_lerp(),
                in_jump_hang: self.state.is_in_jump_hang(config.jump.hang_threshold),
            };
            let velocity = body.velocity();
            let vx = solve_horizontal(velocity.x, &ctx, &config.run, &config.jump, delta);
            body.set_velocity(Vec2::new(vx, velocity.y));
        }

        if self.state.is_sliding {
            let force = slide_force(body.velocity().y, &config.slide, body.mass(), delta);
            body.add_force(Vec2::Y * force);
        }

        self.state.velocity = body.velocity();
    }
}
