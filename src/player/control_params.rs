use bevy::math::Vec2;
use bevy::prelude::{Asset, TypePath};
use serde::Deserialize;
use thiserror::Error;
use crate::player::FeedbackParams;

/// Every tunable of the character controller, as loaded from a `.ron` profile.
///
/// Speeds are in world units per second, accelerations in world units per second squared,
/// and durations in seconds.
#[derive(Asset, Clone, Debug, Deserialize, TypePath, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
	/// Magnitude of the physics engine's gravity. Gravity scales are relative to this.
	pub world_gravity: f32,
	pub gravity: GravityParams,
	pub run: RunParams,
	pub jump: JumpParams,
	pub wall: WallParams,
	pub slide: SlideParams,
	pub assists: AssistParams,
	pub dash: DashParams,
	/// Cosmetic squash and tilt of the sprite. Has no effect on movement.
	pub feedback: FeedbackParams,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GravityParams {
	/// gravity multiplier while falling
	pub fall_mult: f32,
	/// terminal velocity while falling
	pub max_fall_speed: f32,
	/// gravity multiplier while falling and holding down
	pub fast_fall_mult: f32,
	pub max_fast_fall_speed: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunParams {
	pub max_speed: f32,
	pub acceleration: f32,
	pub deceleration: f32,
	/// rate used when pressing against the current direction of travel
	pub turn_speed: f32,
	pub air_acceleration_mult: f32,
	pub air_deceleration_mult: f32,
	pub air_turn_mult: f32,
	/// when false, grounded movement snaps straight to the target speed
	pub use_acceleration: bool,
	/// when true, airborne characters moving faster than their target speed are never slowed down
	pub conserve_momentum: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct JumpParams {
	pub height: f32,
	pub time_to_apex: f32,
	/// gravity multiplier after releasing the jump button early
	pub cut_gravity_mult: f32,
	/// gravity multiplier near the apex of a jump
	pub hang_gravity_mult: f32,
	/// vertical speeds below this count as "near the apex"
	pub hang_threshold: f32,
	pub hang_acceleration_mult: f32,
	pub hang_max_speed_mult: f32,
	/// number of extra jumps allowed while airborne, re-armed on landing
	pub max_air_jumps: u8,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WallParams {
	pub jump_enabled: bool,
	/// velocity change of a wall jump, for a wall on the left (mirrored for a wall on the right)
	pub jump_force: Vec2,
	/// how long the character is considered "wall jumping"
	pub jump_time: f32,
	/// fraction of normal horizontal control while wall jumping
	pub jump_run_lerp: f32,
	pub turn_on_wall_jump: bool,
	/// how long after leaving a wall it still counts for wall jumps and slides
	pub coyote_time: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlideParams {
	/// downward speed the character settles at while sliding
	pub speed: f32,
	pub acceleration: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistParams {
	pub coyote_time: f32,
	pub jump_input_buffer: f32,
	/// skip contact probes while jumping or dashing, and wall probes while wall jumping
	pub restrict_sensing: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashParams {
	pub charges: u8,
	pub speed: f32,
	/// how long the simulation freezes when a dash starts
	pub sleep_time: f32,
	pub attack_time: f32,
	pub end_time: f32,
	/// per-axis speed the character is left with once the attack phase ends
	pub end_speed: Vec2,
	/// fraction of normal horizontal control during the end phase
	pub end_run_lerp: f32,
	pub refill_time: f32,
	pub input_buffer: f32,
	/// minimum time between dash starts
	pub cooldown: f32,
}

impl Default for MovementConfig {
	fn default() -> Self {
		Self {
			world_gravity: 98.1,
			gravity: GravityParams::default(),
			run: RunParams::default(),
			jump: JumpParams::default(),
			wall: WallParams::default(),
			slide: SlideParams::default(),
			assists: AssistParams::default(),
			dash: DashParams::default(),
			feedback: FeedbackParams::default(),
		}
	}
}

impl Default for GravityParams {
	fn default() -> Self {
		Self {
			fall_mult: 1.5,
			max_fall_speed: 60.0,
			fast_fall_mult: 2.0,
			max_fast_fall_speed: 80.0,
		}
	}
}

impl Default for RunParams {
	fn default() -> Self {
		Self {
			max_speed: 30.0,
			acceleration: 250.0,
			deceleration: 300.0,
			turn_speed: 400.0,
			air_acceleration_mult: 0.65,
			air_deceleration_mult: 0.65,
			air_turn_mult: 0.8,
			use_acceleration: true,
			conserve_momentum: true,
		}
	}
}

impl Default for JumpParams {
	fn default() -> Self {
		Self {
			height: 12.0,
			time_to_apex: 0.4,
			cut_gravity_mult: 2.0,
			hang_gravity_mult: 0.5,
			hang_threshold: 4.0,
			hang_acceleration_mult: 1.1,
			hang_max_speed_mult: 1.3,
			max_air_jumps: 0,
		}
	}
}

impl Default for WallParams {
	fn default() -> Self {
		Self {
			jump_enabled: true,
			jump_force: Vec2::new(30.0, 50.0),
			jump_time: 0.2,
			jump_run_lerp: 0.5,
			turn_on_wall_jump: false,
			coyote_time: 0.1,
		}
	}
}

impl Default for SlideParams {
	fn default() -> Self {
		Self {
			speed: 10.0,
			acceleration: 20.0,
		}
	}
}

impl Default for AssistParams {
	fn default() -> Self {
		Self {
			coyote_time: 0.1,
			jump_input_buffer: 0.1,
			restrict_sensing: true,
		}
	}
}

impl Default for DashParams {
	fn default() -> Self {
		Self {
			charges: 1,
			speed: 60.0,
			sleep_time: 0.05,
			attack_time: 0.15,
			end_time: 0.15,
			end_speed: Vec2::new(30.0, 20.0),
			end_run_lerp: 0.5,
			refill_time: 0.1,
			input_buffer: 0.1,
			cooldown: 0.0,
		}
	}
}

/// Rejected configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("`{field}` must be a finite number")]
	NonFinite { field: &'static str },

	#[error("`{field}` must be greater than zero (got {value})")]
	NotPositive { field: &'static str, value: f32 },

	#[error("`{field}` must not be negative (got {value})")]
	Negative { field: &'static str, value: f32 },
}

/// Lowest rate any acceleration may be configured to
pub const MIN_ACCELERATION: f32 = 0.01;

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
	if !value.is_finite() {
		Err(ConfigError::NonFinite { field })
	} else if value <= 0.0 {
		Err(ConfigError::NotPositive { field, value })
	} else {
		Ok(())
	}
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
	if !value.is_finite() {
		Err(ConfigError::NonFinite { field })
	} else if value < 0.0 {
		Err(ConfigError::Negative { field, value })
	} else {
		Ok(())
	}
}

fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
	if value.is_finite() {
		Ok(())
	} else {
		Err(ConfigError::NonFinite { field })
	}
}

impl MovementConfig {
	/// Checks every value, failing on anything that would produce NaN or infinity during simulation,
	/// and clamps the rest into their documented ranges.
	pub fn sanitized(mut self) -> Result<Self, ConfigError> {
		require_positive("world_gravity", self.world_gravity)?;
		require_positive("run.max_speed", self.run.max_speed)?;
		require_positive("jump.height", self.jump.height)?;
		require_positive("jump.time_to_apex", self.jump.time_to_apex)?;

		for (field, value) in [
			("gravity.fall_mult", self.gravity.fall_mult),
			("gravity.max_fall_speed", self.gravity.max_fall_speed),
			("gravity.fast_fall_mult", self.gravity.fast_fall_mult),
			("gravity.max_fast_fall_speed", self.gravity.max_fast_fall_speed),
			("run.acceleration", self.run.acceleration),
			("run.deceleration", self.run.deceleration),
			("run.turn_speed", self.run.turn_speed),
			("jump.cut_gravity_mult", self.jump.cut_gravity_mult),
			("jump.hang_threshold", self.jump.hang_threshold),
			("wall.jump_time", self.wall.jump_time),
			("wall.coyote_time", self.wall.coyote_time),
			("slide.speed", self.slide.speed),
			("slide.acceleration", self.slide.acceleration),
			("assists.coyote_time", self.assists.coyote_time),
			("assists.jump_input_buffer", self.assists.jump_input_buffer),
			("dash.speed", self.dash.speed),
			("dash.sleep_time", self.dash.sleep_time),
			("dash.attack_time", self.dash.attack_time),
			("dash.end_time", self.dash.end_time),
			("dash.refill_time", self.dash.refill_time),
			("dash.input_buffer", self.dash.input_buffer),
			("dash.cooldown", self.dash.cooldown),
			("feedback.jump.duration", self.feedback.jump.duration),
			("feedback.land.duration", self.feedback.land.duration),
		] {
			require_non_negative(field, value)?;
		}

		for (field, value) in [
			("run.air_acceleration_mult", self.run.air_acceleration_mult),
			("run.air_deceleration_mult", self.run.air_deceleration_mult),
			("run.air_turn_mult", self.run.air_turn_mult),
			("jump.hang_gravity_mult", self.jump.hang_gravity_mult),
			("jump.hang_acceleration_mult", self.jump.hang_acceleration_mult),
			("jump.hang_max_speed_mult", self.jump.hang_max_speed_mult),
			("wall.jump_force.x", self.wall.jump_force.x),
			("wall.jump_force.y", self.wall.jump_force.y),
			("wall.jump_run_lerp", self.wall.jump_run_lerp),
			("dash.end_speed.x", self.dash.end_speed.x),
			("dash.end_speed.y", self.dash.end_speed.y),
			("dash.end_run_lerp", self.dash.end_run_lerp),
			("feedback.jump_multiplier", self.feedback.jump_multiplier),
			("feedback.land_multiplier", self.feedback.land_multiplier),
			("feedback.max_tilt", self.feedback.max_tilt),
			("feedback.tilt_speed", self.feedback.tilt_speed),
		] {
			require_finite(field, value)?;
		}

		self.run.acceleration = self.run.acceleration.max(MIN_ACCELERATION);
		self.run.deceleration = self.run.deceleration.max(MIN_ACCELERATION);
		self.run.turn_speed = self.run.turn_speed.max(MIN_ACCELERATION);
		self.run.air_acceleration_mult = self.run.air_acceleration_mult.clamp(0.0, 1.0);
		self.run.air_deceleration_mult = self.run.air_deceleration_mult.clamp(0.0, 1.0);
		self.run.air_turn_mult = self.run.air_turn_mult.clamp(0.0, 1.0);
		// hang gravity only ever lightens the pull near the apex
		self.jump.hang_gravity_mult = self.jump.hang_gravity_mult.clamp(0.0, 1.0);
		self.jump.hang_acceleration_mult = self.jump.hang_acceleration_mult.clamp(0.0, 2.0);
		self.jump.hang_max_speed_mult = self.jump.hang_max_speed_mult.clamp(0.0, 2.0);
		self.wall.jump_run_lerp = self.wall.jump_run_lerp.clamp(0.0, 1.0);
		self.dash.end_run_lerp = self.dash.end_run_lerp.clamp(0.0, 1.0);
		self.dash.input_buffer = self.dash.input_buffer.max(0.01);
		self.feedback.tilt_speed = self.feedback.tilt_speed.clamp(0.0, 1.0);

		Ok(self)
	}
}

/// Quantities computed from a [MovementConfig]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DerivedParams {
	/// Acceleration (negative, i.e. downwards) that makes a jump of `jump.height` peak after `jump.time_to_apex`
	pub gravity_strength: f32,
	/// `gravity_strength` relative to the engine's gravity; the body's default gravity scale
	pub gravity_scale: f32,
	/// Initial upward speed of a jump
	pub jump_speed: f32,
}

impl DerivedParams {
	pub fn compute(config: &MovementConfig) -> Self {
		let JumpParams { height, time_to_apex, .. } = config.jump;
		let gravity_strength = -(2.0 * height) / (time_to_apex * time_to_apex);
		let gravity_scale = gravity_strength / -config.world_gravity;
		// v = sqrt(2 * g * h), which for this gravity is also g * t
		let jump_speed = (2.0 * -gravity_strength * height).sqrt();
		Self {
			gravity_strength,
			gravity_scale,
			jump_speed,
		}
	}
}

/// A validated [MovementConfig] together with its [DerivedParams].
///
/// The config can only be changed through [ControlProfile::edit], which recomputes the
/// derived values exactly once after the change.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlProfile {
	config: MovementConfig,
	derived: DerivedParams,
}

impl Default for ControlProfile {
	/// The default config is already within every bound, so it skips validation
	fn default() -> Self {
		let config = MovementConfig::default();
		let derived = DerivedParams::compute(&config);
		Self { config, derived }
	}
}

impl ControlProfile {
	pub fn new(config: MovementConfig) -> Result<Self, ConfigError> {
		let config = config.sanitized()?;
		let derived = DerivedParams::compute(&config);
		Ok(Self { config, derived })
	}

	pub fn config(&self) -> &MovementConfig {
		&self.config
	}

	pub fn derived(&self) -> &DerivedParams {
		&self.derived
	}

	/// Re-validate the config and refresh the derived values
	pub fn recompute(&mut self) -> Result<(), ConfigError> {
		self.config = self.config.clone().sanitized()?;
		self.derived = DerivedParams::compute(&self.config);
		Ok(())
	}

	/// Apply `change` to a copy of the config. The profile is left untouched if the result is invalid.
	pub fn edit(&mut self, change: impl FnOnce(&mut MovementConfig)) -> Result<(), ConfigError> {
		let mut edited = self.clone();
		change(&mut edited.config);
		edited.recompute()?;
		*self = edited;
		Ok(())
	}
}
