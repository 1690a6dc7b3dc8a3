use bevy::color::Color;
use bevy::math::Vec2;
use bevy::prelude::{default, Component, Entity, Gizmos, Query};
use bevy_rapier2d::pipeline::{QueryFilter, QueryFilterFlags};
use bevy_rapier2d::plugin::RapierContext;
use bevy_rapier2d::prelude::{CoefficientCombineRule, Friction};
use crate::player::{ContactError, ContactQuery};
use crate::util::{Side, SideMap};

/// How far past the collider's edge the probes reach, in world units
const PROBE_LENGTH: f32 = 0.2;

/// Ratio values between 0.0 and 1.0 saying where along the bottom edge the ground probes sit
const GROUND_PROBE_OFFSETS: [f32; 3] = [0.05, 0.5, 0.95];

/// A single ray cast out of the side of the player's collider.
#[derive(Default, Debug, Clone)]
pub struct WallSensor {
	/// Ratio value between 0.0 and 1.0 representing how far from the bottom of the
	/// player's collider this sensor exists
	local_offset: f32,

	/// Tracks whether the ray-casts on each side of the player have hit something
	pub hits: SideMap<bool>,
}

impl WallSensor {
	pub fn at_offset(local_offset: f32) -> Self {
		Self {
			local_offset,
			hits: default(),
		}
	}
}

/// A sensor-based interpretation of what's beside the player, as decided by [ContactSensors::interpret]
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum WallInterpretation {
	/// Empty space, or a small obstacle that doesn't seem to be a wall
	NotAWall,

	/// A small obstacle that only impedes the lower quarter of the player,
	/// for example a stair that the player could step onto.
	Step,

	/// A medium obstacle that only impedes the lower half of the player
	Ledge,

	/// A large obstacle that impedes most or all of the player; something to slide down or jump off of
	Wall,
}

/// Ground and wall probes around the player's box collider, answered by ray casts in the
/// Rapier physics world.
///
/// The four wall sensors sit at local height offsets `[1/8, 3/8, 5/8, 7/8]`, so that a wall
/// can be told apart from steps and ledges.
#[derive(Component, Debug, Clone)]
pub struct ContactSensors {
	walls: [WallSensor; 4],
	/// the collider found under the player, and its friction coefficient
	ground: Option<(Entity, f32)>,
	sampled: bool,
}

impl Default for ContactSensors {
	fn default() -> Self {
		let gap = 0.25;
		let bottom_height = gap * 0.5;
		ContactSensors {
			walls: [
				WallSensor::at_offset(bottom_height),
				WallSensor::at_offset(bottom_height + gap),
				WallSensor::at_offset(bottom_height + gap * 2.0),
				WallSensor::at_offset(bottom_height + gap * 3.0),
			],
			ground: None,
			sampled: false,
		}
	}
}

fn probe_filter(excluded_entity: Entity) -> QueryFilter<'static> {
	QueryFilter {
		flags: QueryFilterFlags::EXCLUDE_DYNAMIC | QueryFilterFlags::EXCLUDE_SENSORS,
		exclude_collider: Some(excluded_entity),
		exclude_rigid_body: Some(excluded_entity),
		..default()
	}
}

impl ContactSensors {
	/// Re-cast every probe in the given `rapier_context`, with edges of the rectangular "player"
	/// defined in terms of its `center` and `half_extents` values.
	pub fn update(
		&mut self,
		center: Vec2,
		half_extents: Vec2,
		rapier_context: &RapierContext,
		excluded_entity: Entity,
		frictions: &Query<&Friction>,
	) {
		let bottom_y = center.y - half_extents.y;
		let height = half_extents.y * 2.0;
		for sensor in &mut self.walls {
			let sensor_y = bottom_y + height * sensor.local_offset;
			for side in Side::BOTH {
				let raycast_start = Vec2::new(center.x + half_extents.x * side, sensor_y);
				sensor.hits[side] = rapier_context
					.cast_ray(raycast_start, side.unit(), PROBE_LENGTH, true, probe_filter(excluded_entity))
					.is_some();
			}
		}

		let left_x = center.x - half_extents.x;
		self.ground = GROUND_PROBE_OFFSETS.iter().find_map(|offset| {
			let raycast_start = Vec2::new(left_x + half_extents.x * 2.0 * offset, bottom_y);
			rapier_context
				.cast_ray(raycast_start, Vec2::NEG_Y, PROBE_LENGTH, true, probe_filter(excluded_entity))
				.map(|(entity, _toi)| {
					let friction = frictions.get(entity).map_or(0.0, |f| f.coefficient);
					(entity, friction)
				})
		});
		self.sampled = true;
	}

	/// Uses the given `gizmos` to draw each of the rays that would be cast during `update`
	pub fn draw(&self, center: Vec2, half_extents: Vec2, gizmos: &mut Gizmos) {
		let hit_color = Color::srgb(0.8, 0.5, 0.0);
		let miss_color = Color::srgb(0., 0., 1.);
		let bottom_y = center.y - half_extents.y;
		let height = half_extents.y * 2.0;
		for sensor in &self.walls {
			let sensor_y = bottom_y + height * sensor.local_offset;
			for side in Side::BOTH {
				let raycast_start = Vec2::new(center.x + half_extents.x * side, sensor_y);
				let color = if sensor.hits[side] { hit_color } else { miss_color };
				gizmos.ray_2d(raycast_start, side.unit() * PROBE_LENGTH, color);
			}
		}
		let color = if self.ground.is_some() { hit_color } else { miss_color };
		for offset in GROUND_PROBE_OFFSETS {
			let raycast_start = Vec2::new(center.x - half_extents.x + half_extents.x * 2.0 * offset, bottom_y);
			gizmos.ray_2d(raycast_start, Vec2::NEG_Y * PROBE_LENGTH, color);
		}
	}

	/// Interprets the current wall `hits`, to determine whether there is
	/// a wall (or something else) on the requested `side`.
	pub fn interpret(&self, side: Side) -> WallInterpretation {
		// make a 4-bit number to represent the wall sensors, where the least-significant bit
		// represents the bottom sensor, and the bit is 1 when its respective sensor was "hit"
		let mut hit_flags = 0u8;
		for (i, hit) in self.walls.iter().map(|s| s.hits[side]).enumerate() {
			if hit {
				hit_flags |= 1 << i;
			}
		}
		match hit_flags {
			0b0001 => WallInterpretation::Step,
			0b0011 => WallInterpretation::Ledge,
			0b0111 | 0b1111 | 0b1110 => WallInterpretation::Wall,
			_ => WallInterpretation::NotAWall,
		}
	}
}

impl ContactQuery for ContactSensors {
	fn probe_ground(&self) -> Result<bool, ContactError> {
		if !self.sampled {
			return Err(ContactError::NotSampled);
		}
		Ok(self.ground.is_some())
	}

	fn probe_wall(&self, side: Side) -> Result<bool, ContactError> {
		if !self.sampled {
			return Err(ContactError::NotSampled);
		}
		Ok(self.interpret(side) == WallInterpretation::Wall)
	}

	fn contact_friction(&self) -> Result<f32, ContactError> {
		if !self.sampled {
			return Err(ContactError::NotSampled);
		}
		Ok(self.ground.map_or(0.0, |(_, friction)| friction))
	}
}

/// Friction for level geometry. The player's own collider uses zero friction with
/// [CoefficientCombineRule::Min], so that surfaces only slow the player through the controller.
pub fn surface_friction(coefficient: f32) -> Friction {
	Friction {
		coefficient,
		combine_rule: CoefficientCombineRule::Average,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn with_hits(side: Side, pattern: [bool; 4]) -> ContactSensors {
		let mut sensors = ContactSensors::default();
		for (sensor, hit) in sensors.walls.iter_mut().zip(pattern) {
			sensor.hits[side] = hit;
		}
		sensors.sampled = true;
		sensors
	}

	#[test]
	fn unsampled_sensors_report_an_error() {
		let sensors = ContactSensors::default();
		assert_eq!(sensors.probe_ground(), Err(ContactError::NotSampled));
		assert_eq!(sensors.probe_wall(Side::Left), Err(ContactError::NotSampled));
	}

	#[test]
	fn only_tall_obstacles_count_as_walls() {
		let wall = with_hits(Side::Right, [true, true, true, true]);
		assert_eq!(wall.probe_wall(Side::Right), Ok(true));
		assert_eq!(wall.probe_wall(Side::Left), Ok(false));

		let hanging = with_hits(Side::Left, [false, true, true, true]);
		assert_eq!(hanging.interpret(Side::Left), WallInterpretation::Wall);

		let step = with_hits(Side::Left, [true, false, false, false]);
		assert_eq!(step.interpret(Side::Left), WallInterpretation::Step);
		assert_eq!(step.probe_wall(Side::Left), Ok(false));

		let ledge = with_hits(Side::Left, [true, true, false, false]);
		assert_eq!(ledge.interpret(Side::Left), WallInterpretation::Ledge);
	}

	#[test]
	fn friction_comes_from_the_ground_hit() {
		let mut sensors = ContactSensors::default();
		sensors.sampled = true;
		assert_eq!(sensors.contact_friction(), Ok(0.0));
		sensors.ground = Some((Entity::PLACEHOLDER, 0.3));
		assert_eq!(sensors.probe_ground(), Ok(true));
		assert_eq!(sensors.contact_friction(), Ok(0.3));
	}
}
