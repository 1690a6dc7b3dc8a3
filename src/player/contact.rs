use bevy::log::debug;
use thiserror::Error;
use crate::player::{ContactState, KinematicState, MovementConfig};
use crate::util::{Side, TimerBank, TimerKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactError {
    #[error("contact sensors were not sampled this frame")]
    NotSampled,

    #[error("collision backend unavailable: {0}")]
    Backend(String),
}

/// Ground and wall probes, answered by the collision backend.
///
/// The backend must report a contact within one physics step of first touch,
/// and report its loss within one step of separation.
pub trait ContactQuery {
    /// Is there ground just below the character?
    fn probe_ground(&self) -> Result<bool, ContactError>;

    /// Is there a wall directly to the given `side` of the character?
    fn probe_wall(&self, side: Side) -> Result<bool, ContactError>;

    /// Friction coefficient of the ground being touched
    fn contact_friction(&self) -> Result<f32, ContactError>;
}

/// What happened during a [ContactSensor::refresh]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContactRefresh {
    /// ground contact started this frame
    pub landed: bool,
}

/// Turns contact probes into a [ContactState] once per frame, and keeps the
/// ground and wall grace timers topped up while contacts last.
#[derive(Default, Debug, Clone)]
pub struct ContactSensor {
    current: ContactState,
}

/// Failed probes count as "no contact", so a broken backend can't leave the character stuck
fn or_no_contact<T: Default>(what: &str, result: Result<T, ContactError>) -> T {
    result.unwrap_or_else(|err| {
        debug!("{} probe failed, assuming no contact: {}", what, err);
        T::default()
    })
}

impl ContactSensor {
    pub fn current(&self) -> &ContactState {
        &self.current
    }

    pub fn refresh(
        &mut self,
        query: &impl ContactQuery,
        state: &KinematicState,
        config: &MovementConfig,
        timers: &mut TimerBank,
    ) -> ContactRefresh {
        let restrict = config.assists.restrict_sensing;
        let sense_ground = !(restrict && (state.is_jumping || state.is_dashing));

        let on_ground = sense_ground && or_no_contact("ground", query.probe_ground());
        let ground_friction = if on_ground {
            or_no_contact("friction", query.contact_friction()).max(0.0)
        } else {
            0.0
        };

        let sense_walls = sense_ground && !(restrict && (state.is_wall_jumping || on_ground));
        let mut next = ContactState {
            on_ground,
            ground_friction,
            ..Default::default()
        };
        if sense_walls {
            for side in Side::BOTH {
                next.on_wall[side] = or_no_contact("wall", query.probe_wall(side));
            }
        }

        if next.on_ground {
            timers.reset(TimerKind::Ground, config.assists.coyote_time);
        }
        if next.on_wall.left {
            timers.reset(TimerKind::WallLeft, config.wall.coyote_time);
        }
        if next.on_wall.right {
            timers.reset(TimerKind::WallRight, config.wall.coyote_time);
        }

        let landed = next.on_ground && !self.current.on_ground;
        if landed {
            debug!("landed (friction {})", next.ground_friction);
        }
        self.current = next;
        ContactRefresh { landed }
    }

    /// Forget all contacts, so the next ground contact counts as a landing
    pub fn clear(&mut self) {
        self.current = ContactState::default();
    }
}
