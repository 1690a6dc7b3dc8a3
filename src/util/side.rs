use bevy::prelude::Vec2;
use std::ops::{Index, IndexMut, Mul, Neg};

/// Horizontal side of the character. Doubles as the facing direction.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Hash)]
pub enum Side {
	Left,
	#[default]
	Right,
}

/// A pair of values, one for each [Side]
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct SideMap<A> {
	pub left: A,
	pub right: A,
}

impl Side {
	pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

	/// Interprets a horizontal axis value, treating anything within `dead_zone` of 0 as "no side"
	pub fn from_axis(axis: f32, dead_zone: f32) -> Option<Side> {
		if axis > dead_zone {
			Some(Side::Right)
		} else if axis < -dead_zone {
			Some(Side::Left)
		} else {
			None
		}
	}

	/// `-1.0` for left, `1.0` for right
	pub fn sign(self) -> f32 {
		1.0 * self
	}

	pub fn unit(self) -> Vec2 {
		Vec2::X * self
	}
}

impl<A> Index<Side> for SideMap<A> {
	type Output = A;
	fn index(&self, side: Side) -> &Self::Output {
		match side {
			Side::Left => &self.left,
			Side::Right => &self.right,
		}
	}
}

impl<A> IndexMut<Side> for SideMap<A> {
	fn index_mut(&mut self, side: Side) -> &mut Self::Output {
		match side {
			Side::Left => &mut self.left,
			Side::Right => &mut self.right,
		}
	}
}

impl Neg for Side {
	type Output = Side;
	fn neg(self) -> Self::Output {
		match self {
			Side::Left => Side::Right,
			Side::Right => Side::Left,
		}
	}
}

// `value * side` mirrors the value for the left side
macro_rules! impl_side_mul {
	($($T:ty),*) => {
		$(
			impl Mul<Side> for $T {
				type Output = Self;
				fn mul(self, side: Side) -> Self::Output {
					match side {
						Side::Right => self,
						Side::Left => -self,
					}
				}
			}
		)*
	};
}
impl_side_mul!(f32, Vec2);
