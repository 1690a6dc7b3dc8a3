use crate::player::{Body, ControlInput, ControllerEvent, EventSink, MovementConfig, Player, SquashAnimator};
use crate::util::{ContactSensors, Side, TaskSlot, TaskTick};
use crate::PlayerStatusText;
use bevy::asset::{AssetEvent, Assets};
use bevy::input::ButtonInput;
use bevy::log::{debug, info, warn};
use bevy::math::{Quat, Vec2};
use bevy::prelude::{
    Children, Component, Entity, EventReader, EventWriter, Gizmos, KeyCode, Query, Real, Res, ResMut, Resource, Sprite,
    Text, Time, Transform, Virtual, With, Without,
};
use bevy_rapier2d::dynamics::{ExternalForce, GravityScale, ReadMassProperties, Velocity};
use bevy_rapier2d::geometry::{Collider, Friction};
use bevy_rapier2d::plugin::ReadRapierContext;

/// The Rapier rigid body of a player, seen through the controller's [Body] interface.
///
/// Impulses are turned into an immediate velocity change, since Rapier only applies its own
/// `ExternalImpulse` during the next physics step.
struct RapierBody<'a> {
    velocity: &'a mut Velocity,
    gravity_scale: &'a mut GravityScale,
    force: &'a mut ExternalForce,
    mass: f32,
}

impl<'a> RapierBody<'a> {
    fn new(
        velocity: &'a mut Velocity,
        gravity_scale: &'a mut GravityScale,
        force: &'a mut ExternalForce,
        mass_props: &ReadMassProperties,
    ) -> Self {
        // mass properties are zero until Rapier has seen the collider once
        let mass = match mass_props.get().mass {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        Self {
            velocity,
            gravity_scale,
            force,
            mass,
        }
    }
}

impl Body for RapierBody<'_> {
    fn velocity(&self) -> Vec2 {
        self.velocity.linvel
    }
    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity.linvel = velocity;
    }
    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale.0 = scale;
    }
    fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity.linvel += impulse / self.mass;
    }
    fn add_force(&mut self, force: Vec2) {
        self.force.force += force;
    }
    fn mass(&self) -> f32 {
        self.mass
    }
}

impl EventSink for EventWriter<'_, ControllerEvent> {
    fn on_jump_started(&mut self) {
        self.send(ControllerEvent::JumpStarted);
    }
    fn on_landed(&mut self) {
        self.send(ControllerEvent::Landed);
    }
    fn on_dash_started(&mut self) {
        self.send(ControllerEvent::DashStarted);
    }
    fn on_wall_jumped(&mut self, wall: Side) {
        self.send(ControllerEvent::WallJumped(wall));
    }
    fn on_sleep_requested(&mut self, seconds: f32) {
        self.send(ControllerEvent::SleepRequested(seconds));
    }
}

/// Samples the keyboard into the [ControlInput] snapshot for this frame
pub fn read_input_system(kb: Res<ButtonInput<KeyCode>>, mut input: ResMut<ControlInput>) {
    let left = kb.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    let right = kb.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);
    let jump_keys = [KeyCode::Space];
    let dash_keys = [KeyCode::ShiftLeft, KeyCode::ShiftRight, KeyCode::KeyJ];

    *input = ControlInput {
        move_axis: match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        },
        jump_down: kb.any_just_pressed(jump_keys),
        jump_held: kb.any_pressed(jump_keys),
        jump_up: kb.any_just_released(jump_keys),
        dash_down: kb.any_just_pressed(dash_keys),
        down_held: kb.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        up_held: kb.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
    };
}

/// Per-frame half of the controller: probes contacts, then runs jump/dash/slide transitions
pub fn player_frame_system(
    time: Res<Time>,
    input: Res<ControlInput>,
    mut player_query: Query<(
        Entity,
        &mut Player,
        &mut ContactSensors,
        &mut Velocity,
        &mut GravityScale,
        &mut ExternalForce,
        &ReadMassProperties,
        &Transform,
        &Collider,
    )>,
    frictions: Query<&Friction>,
    rapier_context: ReadRapierContext,
    mut events: EventWriter<ControllerEvent>,
    mut gizmos: Gizmos,
) {
    let rapier_context = rapier_context.single();

    for (
        player_entity,
        mut player,
        mut sensors,
        mut velocity,
        mut gravity_scale,
        mut force,
        mass_props,
        player_transform,
        player_collider,
    ) in &mut player_query
    {
        let Some(cuboid) = player_collider.as_cuboid() else {
            warn!("player collider isn't a cuboid; contact sensing is unavailable");
            continue;
        };
        let player_center = player_transform.translation.truncate();
        let player_half_extents = cuboid.half_extents();
        sensors.update(player_center, player_half_extents, &rapier_context, player_entity, &frictions);
        sensors.draw(player_center, player_half_extents, &mut gizmos);

        let mut body = RapierBody::new(&mut *velocity, &mut *gravity_scale, &mut *force, mass_props);
        player
            .controller
            .frame(time.delta_secs(), *input, &mut body, &*sensors, &mut events);
    }
}

/// Fixed-rate half of the controller. Scheduled ahead of Rapier's backend sync, so the forces
/// and velocities it writes go into the same physics step.
pub fn player_physics_system(
    time: Res<Time>,
    mut player_query: Query<(
        &mut Player,
        &mut Velocity,
        &mut GravityScale,
        &mut ExternalForce,
        &ReadMassProperties,
    )>,
) {
    for (mut player, mut velocity, mut gravity_scale, mut force, mass_props) in &mut player_query {
        // forces only last for one step
        force.force = Vec2::ZERO;
        let mut body = RapierBody::new(&mut *velocity, &mut *gravity_scale, &mut *force, mass_props);
        player.controller.physics_step(time.delta_secs(), &mut body);
    }
}

/// Hand freshly loaded or edited configs to the controllers that use them.
/// Feedback settings apply right away, since they never touch the physics body.
pub fn config_swap_system(
    mut asset_events: EventReader<AssetEvent<MovementConfig>>,
    configs: Res<Assets<MovementConfig>>,
    mut player_query: Query<(&mut Player, &mut SquashAnimator)>,
) {
    for event in asset_events.read() {
        let id = match event {
            AssetEvent::LoadedWithDependencies { id } | AssetEvent::Modified { id } => *id,
            _ => continue,
        };
        let Some(config) = configs.get(id) else {
            continue;
        };
        for (mut player, mut animator) in &mut player_query {
            if player.config.id() != id {
                continue;
            }
            match player.controller.swap_config(config.clone()) {
                Ok(()) => {
                    info!("movement config {:?} queued for swap", id);
                    animator.set_params(config.feedback.clone());
                }
                Err(err) => warn!("rejected movement config {:?}: {}", id, err),
            }
        }
    }
}

/// Marks the child entity holding the player's sprite, which the feedback system squashes and tilts
#[derive(Component, Default)]
pub struct PlayerSprite;

/// Plays squash/stretch and tilt on the player's sprite. Never touches the physics body.
pub fn player_feedback_system(
    time: Res<Time>,
    mut events: EventReader<ControllerEvent>,
    mut player_query: Query<(&Player, &mut SquashAnimator, &Collider, &Children)>,
    mut sprite_query: Query<(&mut Transform, &mut Sprite), (With<PlayerSprite>, Without<Player>)>,
) {
    let events: Vec<ControllerEvent> = events.read().copied().collect();

    for (player, mut animator, collider, children) in &mut player_query {
        for event in &events {
            animator.on_event(event);
        }

        let state = player.controller.state();
        let max_speed = player.controller.profile().config().run.max_speed;
        let pose = animator.tick(time.delta_secs());
        let tilt = animator.update_tilt(state.velocity.x, max_speed, state.is_sliding, state.facing);

        let height = collider.as_cuboid().map_or(1.0, |c| c.half_extents().y * 2.0);

        for child in children.iter() {
            if let Ok((mut transform, mut sprite)) = sprite_query.get_mut(*child) {
                transform.scale = pose.scale.extend(1.0);
                transform.translation = (pose.offset * height).extend(transform.translation.z);
                transform.rotation = Quat::from_rotation_z(tilt.to_radians());
                sprite.flip_x = state.facing == Side::Left;
            }
        }
    }
}

/// Freezes virtual time for a moment when a dash asks for it
#[derive(Resource, Default)]
pub struct DashSleep(TaskSlot);

/// Pauses `Time<Virtual>` on a sleep request, and measures the pause on `Time<Real>` so that the
/// pause itself can't stop the clock that ends it.
pub fn dash_sleep_system(
    mut events: EventReader<ControllerEvent>,
    mut sleep: ResMut<DashSleep>,
    mut virtual_time: ResMut<Time<Virtual>>,
    real_time: Res<Time<Real>>,
) {
    if sleep.0.tick(real_time.delta_secs()) == TaskTick::Completed {
        debug!("waking from dash sleep");
        virtual_time.unpause();
    }
    for event in events.read() {
        if let ControllerEvent::SleepRequested(seconds) = *event {
            if sleep.0.start(seconds) {
                debug!("sleeping for {} seconds", seconds);
                virtual_time.pause();
            }
        }
    }
}

pub fn player_status_system(
    player_query: Query<&Player>,
    mut status_text_query: Query<&mut Text, With<PlayerStatusText>>,
) {
    let Ok(mut status_text) = status_text_query.get_single_mut() else {
        return;
    };
    for player in &player_query {
        let controller = &player.controller;
        let state = controller.state();
        let contacts = controller.contacts();
        status_text.0 = format!(
            "vx: {:.2}\nvy: {:.2}\nphase: {:?}\nfacing: {:?}\ngrounded: {}\nwalls: {:?}\ndashing: {}\nsliding: {}\ndash charges: {}/{}{}\nair jumps: {}",
            state.velocity.x,
            state.velocity.y,
            state.jump_phase(contacts.on_ground),
            state.facing,
            contacts.on_ground,
            contacts.on_wall,
            state.is_dashing,
            state.is_sliding,
            controller.dash().charges().charges(),
            controller.dash().charges().max(),
            controller
                .dash()
                .refill_progress()
                .map_or(String::new(), |progress| format!(" (refill {:.0}%)", progress * 100.0)),
            controller.jump().air_jumps_remaining(),
        );
    }
}
