mod body;
mod contact;
mod control_params;
mod control_state;
mod controller;
mod dash;
mod feedback;
mod jump;
mod loader;
mod movement;
#[cfg(test)]
pub(crate) mod sim;
mod slide;
mod system;

use crate::util::ContactSensors;
use bevy::asset::Handle;
use bevy::prelude::Component;
pub use body::*;
pub use contact::*;
pub use control_params::*;
pub use control_state::*;
pub use controller::*;
pub use dash::*;
pub use feedback::*;
pub use jump::*;
pub use loader::*;
pub use movement::*;
pub use slide::*;
pub use system::*;

/// A character driven by a [CharacterController], tuned by the [MovementConfig] asset behind `config`.
///
/// The controller starts out with the default config, and switches over once the asset loads.
#[derive(Component, Debug)]
#[require(ContactSensors, SquashAnimator)]
pub struct Player {
	pub controller: CharacterController,
	pub config: Handle<MovementConfig>,
}

impl Player {
	pub fn new(config: Handle<MovementConfig>) -> Self {
		Self {
			controller: CharacterController::default(),
			config,
		}
	}
}
