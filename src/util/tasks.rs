/// Result of advancing a [TaskSlot] by one tick
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum TaskTick {
	/// Nothing is running in the slot
	Idle,
	/// The task is still running; `progress` goes from 0 to 1 over its duration
	Running { progress: f32 },
	/// The task reached its duration during this tick. Reported exactly once per run.
	Completed,
}

#[derive(Debug, Copy, Clone)]
struct TimedTask {
	elapsed: f32,
	duration: f32,
}

/// A slot that runs at most one timed task at a time.
///
/// Replaces "coroutine + in-progress flag" pairs: starting while a task is already running
/// is a no-op. The slot's owner drives it through [TaskSlot::tick], so a cancelled run is
/// simply gone and can never complete later.
#[derive(Default, Debug, Clone)]
pub struct TaskSlot {
	task: Option<TimedTask>,
}

impl TaskSlot {
	pub fn is_running(&self) -> bool {
		self.task.is_some()
	}

	/// Start a task lasting `duration` seconds, unless one is already running.
	/// Returns whether a new task started.
	pub fn start(&mut self, duration: f32) -> bool {
		if self.task.is_some() {
			return false;
		}
		self.task = Some(TimedTask {
			elapsed: 0.0,
			duration: duration.max(0.0),
		});
		true
	}

	/// Stop the running task, if any. Cancelling an idle slot does nothing.
	pub fn cancel(&mut self) {
		self.task = None;
	}

	/// Progress of the running task, from 0 to 1
	pub fn progress(&self) -> Option<f32> {
		self.task.map(|task| {
			if task.duration <= 0.0 {
				1.0
			} else {
				(task.elapsed / task.duration).min(1.0)
			}
		})
	}

	pub fn tick(&mut self, delta: f32) -> TaskTick {
		let Some(task) = self.task.as_mut() else {
			return TaskTick::Idle;
		};
		task.elapsed += delta;
		if task.elapsed >= task.duration {
			self.task = None;
			TaskTick::Completed
		} else {
			TaskTick::Running {
				progress: task.elapsed / task.duration,
			}
		}
	}
}
