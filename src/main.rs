mod player;
mod util;

use crate::player::*;
use crate::util::*;
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy_rapier2d::prelude::*;

/// Where the player appears, and returns to on reset
const PLAYER_SPAWN: Vec2 = Vec2::new(25., 25.);

/// Physics rate, shared by Bevy's fixed schedule and Rapier
const PHYSICS_HZ: f64 = 50.;

fn main() {
	App::new()
		// baseline bevy stuff
		.add_plugins(DefaultPlugins)
		.insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
		//
		// player config, loaded from (and hot-reloaded out of) assets/player.ron
		.init_asset::<MovementConfig>()
		.init_asset_loader::<MovementConfigLoader>()
		.add_event::<ControllerEvent>()
		.init_resource::<ControlInput>()
		.init_resource::<DashSleep>()
		//
		// platformer learning zone
		.add_systems(Startup, setup_camera)
		.add_systems(Startup, setup_player)
		.add_systems(Startup, setup_platforms)
		.add_systems(
			Update,
			(
				read_input_system,
				config_swap_system,
				reset_player_system,
				player_frame_system,
				(player_feedback_system, dash_sleep_system, player_status_system),
			)
				.chain(),
		)
		.add_systems(FixedUpdate, player_physics_system.before(PhysicsSet::SyncBackend))
		//
		// rapier physics
		//
		.insert_resource(TimestepMode::Fixed {
			dt: 1. / PHYSICS_HZ as f32,
			substeps: 1,
		})
		.add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(10.0).in_fixed_schedule())
		.add_plugins(RapierDebugRenderPlugin::default())
		.run();
}

fn setup_camera(mut commands: Commands) {
	commands.spawn((
		Camera2d,
		Transform::from_xyz(50.0, 50.0, 1.0),
		OrthographicProjection {
			scaling_mode: ScalingMode::AutoMin {
				min_width: 100.,
				min_height: 100.,
			},
			..OrthographicProjection::default_2d()
		},
	));
}

#[derive(Component)]
pub struct PlayerStatusText;

/// A solid, axis-aligned box in the level
struct Block {
	color: Color,
	center: Vec2,
	size: Vec2,
	/// how much the surface eats into the player's run speed
	friction: f32,
}

const GRASS: Color = Color::srgb(0.15, 0.8, 0.25);
const MUD: Color = Color::srgb(0.55, 0.45, 0.25);
const STONE: Color = Color::srgb(0.3, 0.45, 0.35);

/// A 100x100 room: floor, ceiling, two walls to slide down and jump between, and a few ledges
const LEVEL: [Block; 7] = [
	Block { color: GRASS, center: Vec2::new(50., 3.), size: Vec2::new(98., 4.), friction: 0. },
	Block { color: STONE, center: Vec2::new(50., 97.), size: Vec2::new(98., 4.), friction: 0. },
	Block { color: STONE, center: Vec2::new(3., 50.), size: Vec2::new(4., 98.), friction: 0. },
	Block { color: STONE, center: Vec2::new(97., 50.), size: Vec2::new(4., 98.), friction: 0. },
	Block { color: MUD, center: Vec2::new(75., 18.), size: Vec2::new(20., 4.), friction: 10. },
	Block { color: GRASS, center: Vec2::new(50., 35.), size: Vec2::new(20., 2.), friction: 0. },
	// a free-standing pillar, tall enough to count as a wall
	Block { color: STONE, center: Vec2::new(25., 60.), size: Vec2::new(4., 30.), friction: 0. },
];

fn setup_platforms(mut commands: Commands) {
	commands.spawn((
		Sprite::from_color(Color::srgba(0., 0.5, 0.75, 0.2), Vec2::new(100., 100.)),
		Transform::from_xyz(50., 50., 0.),
	));

	for block in LEVEL {
		commands.spawn((
			RigidBody::Fixed,
			Sprite::from_color(block.color, block.size),
			Collider::cuboid(block.size.x * 0.5, block.size.y * 0.5),
			surface_friction(block.friction),
			Transform::from_translation(block.center.extend(0.)),
		));
	}
}

fn setup_player(mut commands: Commands, asset_server: Res<AssetServer>) {
	commands
		.spawn((
			Player::new(asset_server.load("player.ron")),
			// the controller decides how surfaces slow the player down, not the contact solver
			Friction {
				coefficient: 0.0,
				combine_rule: CoefficientCombineRule::Min,
			},
			Collider::cuboid(1.5, 2.5),
			Transform::from_translation(PLAYER_SPAWN.extend(0.)),
			Visibility::default(),
			RigidBody::Dynamic,
			LockedAxes::ROTATION_LOCKED,
			Velocity::zero(),
			GravityScale(1.0),
			ExternalForce::default(),
			ReadMassProperties::default(),
			Ccd::enabled(),
		))
		.with_children(|parent| {
			parent.spawn((
				PlayerSprite,
				Sprite::from_color(Color::srgb(1., 0.5, 0.), Vec2::new(3.0, 5.0)),
				Transform::default(),
			));
		});

	// Debug text for player state
	commands.spawn((
		PlayerStatusText,
		Text::default(),
		TextLayout::new_with_justify(JustifyText::Right),
		Node {
			position_type: PositionType::Absolute,
			top: Val::Px(10.0),
			right: Val::Px(10.0),
			..default()
		},
	));
}

/// R puts the player back at the spawn point, with a fresh controller state
fn reset_player_system(
	kb: Res<ButtonInput<KeyCode>>,
	mut player_query: Query<(&mut Player, &mut Transform, &mut Velocity, &mut SquashAnimator)>,
) {
	if !kb.just_pressed(KeyCode::KeyR) {
		return;
	}
	for (mut player, mut transform, mut velocity, mut animator) in &mut player_query {
		info!("resetting player");
		player.controller.reset();
		animator.cancel();
		transform.translation = PLAYER_SPAWN.extend(transform.translation.z);
		*velocity = Velocity::zero();
	}
}
