//! Headless stand-ins for the physics engine, used to drive the controller in tests.

use bevy::math::Vec2;
use crate::player::{
    Body, CharacterController, ContactError, ContactQuery, ControlInput, ControllerEvent, MovementConfig,
};
use crate::util::{Side, SideMap};

/// Point-mass body integrated with constant acceleration over each step
#[derive(Debug, Clone)]
pub struct SimBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub mass: f32,
    pub world_gravity: f32,
    force: Vec2,
}

impl SimBody {
    pub fn new(world_gravity: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            mass: 1.0,
            world_gravity,
            force: Vec2::ZERO,
        }
    }

    /// Acceleration gravity currently applies to the body
    pub fn gravity(&self) -> f32 {
        self.world_gravity * self.gravity_scale
    }

    pub fn integrate(&mut self, delta: f32) {
        let acceleration = self.force / self.mass + Vec2::NEG_Y * self.gravity();
        let before = self.velocity;
        self.velocity += acceleration * delta;
        self.position += (before + self.velocity) * 0.5 * delta;
        self.force = Vec2::ZERO;
    }
}

impl Body for SimBody {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }
    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }
    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }
    fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass;
    }
    fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }
    fn mass(&self) -> f32 {
        self.mass
    }
}

/// Contacts decided by the test
#[derive(Debug, Clone, Default)]
pub struct ScriptedContacts {
    pub ground: bool,
    pub walls: SideMap<bool>,
    pub friction: f32,
    pub offline: bool,
}

impl ContactQuery for ScriptedContacts {
    fn probe_ground(&self) -> Result<bool, ContactError> {
        if self.offline {
            return Err(ContactError::Backend("scripted outage".into()));
        }
        Ok(self.ground)
    }
    fn probe_wall(&self, side: Side) -> Result<bool, ContactError> {
        if self.offline {
            return Err(ContactError::Backend("scripted outage".into()));
        }
        Ok(self.walls[side])
    }
    fn contact_friction(&self) -> Result<f32, ContactError> {
        if self.offline {
            return Err(ContactError::Backend("scripted outage".into()));
        }
        Ok(self.friction)
    }
}

/// A controller, its body, and an optional flat floor, stepped at a fixed rate
pub struct Sim {
    pub controller: CharacterController,
    pub body: SimBody,
    pub contacts: ScriptedContacts,
    /// when set, ground contact follows the body's height above this floor
    pub floor: Option<f32>,
    pub events: Vec<ControllerEvent>,
    pub delta: f32,
}

impl Sim {
    pub fn new(config: MovementConfig) -> Self {
        let world_gravity = config.world_gravity;
        Self {
            controller: CharacterController::new(config).unwrap(),
            body: SimBody::new(world_gravity),
            contacts: ScriptedContacts::default(),
            floor: Some(0.0),
            events: Vec::new(),
            delta: 1.0 / 50.0,
        }
    }

    /// Run one frame, followed by `physics_steps` physics steps
    pub fn frame_with_steps(&mut self, input: ControlInput, physics_steps: usize) {
        if let Some(floor) = self.floor {
            self.contacts.ground = self.body.position.y <= floor + 0.01 && self.body.velocity.y <= 0.0;
        }
        self.controller
            .frame(self.delta, input, &mut self.body, &self.contacts, &mut self.events);
        for _ in 0..physics_steps {
            self.controller.physics_step(self.delta, &mut self.body);
            self.body.integrate(self.delta);
            if let Some(floor) = self.floor {
                if self.body.position.y < floor {
                    self.body.position.y = floor;
                    self.body.velocity.y = self.body.velocity.y.max(0.0);
                }
            }
        }
    }

    pub fn step(&mut self, input: ControlInput) {
        self.frame_with_steps(input, 1);
    }

    pub fn count(&self, event: ControllerEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}
