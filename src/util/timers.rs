use std::ops::{Index, IndexMut};

/// A timer that counts down in seconds.
///
/// Ticking never clamps the value, so after expiring the (negative) value says how long
/// ago the timer ran out. The timer is "active" while its value is strictly positive.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Countdown(pub f32);

impl Countdown {
	/// Advance the timer by `delta` seconds
	pub fn tick(&mut self, delta: f32) {
		self.0 -= delta;
	}

	/// Restart the timer, so it stays active for the next `duration` seconds
	pub fn reset(&mut self, duration: f32) {
		self.0 = duration;
	}

	/// Expire the timer immediately
	pub fn clear(&mut self) {
		self.0 = 0.0;
	}

	pub fn is_active(&self) -> bool {
		self.0 > 0.0
	}
}

/// Names for each timer in a [TimerBank]
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum TimerKind {
	/// Coyote window; refreshed while standing on the ground
	Ground,
	/// Wall-stick grace for a wall on the left
	WallLeft,
	/// Wall-stick grace for a wall on the right
	WallRight,
	/// Jump input buffer
	JumpPressed,
	/// Dash input buffer
	DashPressed,
	/// Minimum time between dash starts
	DashCooldown,
	/// Remaining duration of the wall-jumping state
	WallJump,
}

impl TimerKind {
	pub const ALL: [TimerKind; 7] = [
		TimerKind::Ground,
		TimerKind::WallLeft,
		TimerKind::WallRight,
		TimerKind::JumpPressed,
		TimerKind::DashPressed,
		TimerKind::DashCooldown,
		TimerKind::WallJump,
	];

	fn slot(self) -> usize {
		self as usize
	}
}

/// Fixed set of [Countdown]s, ticked together once per frame.
#[derive(Default, Debug, Clone)]
pub struct TimerBank([Countdown; TimerKind::ALL.len()]);

impl TimerBank {
	/// Decrement every timer by `delta` seconds
	pub fn tick(&mut self, delta: f32) {
		for timer in &mut self.0 {
			timer.tick(delta);
		}
	}

	pub fn reset(&mut self, kind: TimerKind, duration: f32) {
		self[kind].reset(duration);
	}

	pub fn clear(&mut self, kind: TimerKind) {
		self[kind].clear();
	}

	pub fn is_active(&self, kind: TimerKind) -> bool {
		self[kind].is_active()
	}
}

impl Index<TimerKind> for TimerBank {
	type Output = Countdown;
	fn index(&self, kind: TimerKind) -> &Self::Output {
		&self.0[kind.slot()]
	}
}

impl IndexMut<TimerKind> for TimerBank {
	fn index_mut(&mut self, kind: TimerKind) -> &mut Self::Output {
		&mut self.0[kind.slot()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn countdown_goes_negative_after_expiring() {
		let mut timer = Countdown::default();
		timer.reset(0.1);
		timer.tick(0.05);
		assert!(timer.is_active());
		timer.tick(0.1);
		assert!(!timer.is_active());
		assert!((timer.0 + 0.05).abs() < 1e-6);
	}

	#[test]
	fn bank_ticks_every_timer() {
		let mut timers = TimerBank::default();
		timers.reset(TimerKind::Ground, 0.2);
		timers.reset(TimerKind::JumpPressed, 0.1);
		timers.tick(0.15);
		assert!(timers.is_active(TimerKind::Ground));
		assert!(!timers.is_active(TimerKind::JumpPressed));
		assert!(!timers.is_active(TimerKind::DashCooldown));
		assert!(timers[TimerKind::DashCooldown].0 < 0.0);
	}

	#[test]
	fn clear_expires_immediately() {
		let mut timers = TimerBank::default();
		timers.reset(TimerKind::WallLeft, 1.0);
		assert!(timers.is_active(TimerKind::WallLeft));
		timers.clear(TimerKind::WallLeft);
		assert!(!timers.is_active(TimerKind::WallLeft));
	}
}
