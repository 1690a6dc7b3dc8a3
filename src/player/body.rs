use bevy::math::Vec2;
use bevy::prelude::Event;
use crate::util::Side;

/// The rigid body driven by the controller
pub trait Body {
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn set_gravity_scale(&mut self, scale: f32);
    /// Instant change in momentum
    fn add_impulse(&mut self, impulse: Vec2);
    /// Force applied over the next physics step
    fn add_force(&mut self, force: Vec2);
    fn mass(&self) -> f32;
}

/// Notifications emitted by the controller. Implementations must not block.
pub trait EventSink {
    fn on_jump_started(&mut self);
    fn on_landed(&mut self);
    fn on_dash_started(&mut self);
    fn on_wall_jumped(&mut self, _wall: Side) {}
    /// Ask for the whole simulation to freeze for `seconds` of real time
    fn on_sleep_requested(&mut self, _seconds: f32) {}
}

#[derive(Event, Copy, Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    JumpStarted,
    WallJumped(Side),
    Landed,
    DashStarted,
    SleepRequested(f32),
}

impl EventSink for Vec<ControllerEvent> {
    fn on_jump_started(&mut self) {
        self.push(ControllerEvent::JumpStarted);
    }
    fn on_landed(&mut self) {
        self.push(ControllerEvent::Landed);
    }
    fn on_dash_started(&mut self) {
        self.push(ControllerEvent::DashStarted);
    }
    fn on_wall_jumped(&mut self, wall: Side) {
        self.push(ControllerEvent::WallJumped(wall));
    }
    fn on_sleep_requested(&mut self, seconds: f32) {
        self.push(ControllerEvent::SleepRequested(seconds));
    }
}
