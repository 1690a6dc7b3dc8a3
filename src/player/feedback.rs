use bevy::math::Vec2;
use bevy::prelude::Component;
use serde::Deserialize;
use crate::player::ControllerEvent;
use crate::util::{Side, TaskSlot, TaskTick};

/// Time spent getting into a squash pose, before easing back out of it
const SQUASH_IN_TIME: f32 = 0.01;

/// Shape of one squash or stretch
#[derive(Copy, Clone, Debug, Deserialize, PartialEq)]
pub struct SquashShape {
    pub width: f32,
    pub height: f32,
    /// seconds to ease back to the rest pose
    pub duration: f32,
    /// how far the sprite sinks, in sprite heights
    pub drop: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackParams {
    pub jump: SquashShape,
    pub land: SquashShape,
    /// Values at or below 1 turn the effect off
    pub jump_multiplier: f32,
    pub land_multiplier: f32,
    /// degrees
    pub max_tilt: f32,
    /// fraction of the way to the target tilt covered each frame
    pub tilt_speed: f32,
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            jump: SquashShape {
                width: 1.0,
                height: 1.0,
                duration: 0.2,
                drop: 0.0,
            },
            land: SquashShape {
                width: 1.0,
                height: 1.0,
                duration: 0.15,
                drop: 0.1,
            },
            jump_multiplier: 1.3,
            land_multiplier: 1.4,
            max_tilt: 10.0,
            tilt_speed: 0.2,
        }
    }
}

/// Sprite transform relative to the rest pose
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpritePose {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl Default for SpritePose {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Squash {
    target: SpritePose,
    duration: f32,
}

impl Squash {
    fn pose_at(&self, elapsed: f32) -> SpritePose {
        let rest = SpritePose::default();
        let t = if elapsed < SQUASH_IN_TIME {
            elapsed / SQUASH_IN_TIME
        } else {
            1.0 - ((elapsed - SQUASH_IN_TIME) / self.duration).min(1.0)
        };
        SpritePose {
            scale: rest.scale.lerp(self.target.scale, t),
            offset: rest.offset.lerp(self.target.offset, t),
        }
    }
}

/// Cosmetic squash and stretch on jumps and landings, plus a lean in the direction of travel.
///
/// Never touches the physics body; it only reads controller events and the current velocity.
#[derive(Component, Debug, Default, Clone)]
pub struct SquashAnimator {
    params: FeedbackParams,
    jump_task: TaskSlot,
    jump: Squash,
    land_task: TaskSlot,
    land: Squash,
    pose: SpritePose,
    tilt: f32,
}

impl SquashAnimator {
    pub fn new(params: FeedbackParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Use new settings from the next squash on. Squashes already playing keep their shape.
    pub fn set_params(&mut self, params: FeedbackParams) {
        self.params = params;
    }

    pub fn pose(&self) -> SpritePose {
        self.pose
    }

    pub fn is_squashing(&self) -> bool {
        self.jump_task.is_running() || self.land_task.is_running()
    }

    pub fn on_event(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::JumpStarted | ControllerEvent::WallJumped(_) => self.on_jump_started(),
            ControllerEvent::Landed => self.on_landed(),
            _ => {}
        }
    }

    /// Stretch upwards. Ignored while a jump stretch is still playing.
    pub fn on_jump_started(&mut self) {
        let mult = self.params.jump_multiplier;
        if mult <= 1.0 || self.jump_task.is_running() {
            return;
        }
        let shape = self.params.jump;
        self.jump = Squash {
            target: SpritePose {
                scale: Vec2::new(shape.width / mult, shape.height * mult),
                offset: Vec2::NEG_Y * shape.drop,
            },
            duration: shape.duration,
        };
        self.jump_task.start(SQUASH_IN_TIME + shape.duration);
    }

    /// Squash downwards, cutting short any jump stretch
    pub fn on_landed(&mut self) {
        self.jump_task.cancel();
        let mult = self.params.land_multiplier;
        if mult <= 1.0 || self.land_task.is_running() {
            return;
        }
        let shape = self.params.land;
        self.land = Squash {
            target: SpritePose {
                scale: Vec2::new(shape.width * mult, shape.height / mult),
                offset: Vec2::NEG_Y * shape.drop,
            },
            duration: shape.duration,
        };
        self.land_task.start(SQUASH_IN_TIME + shape.duration);
    }

    fn tick_squash(task: &mut TaskSlot, squash: &Squash, delta: f32) -> Option<SpritePose> {
        let duration = SQUASH_IN_TIME + squash.duration;
        match task.tick(delta) {
            TaskTick::Running { progress } => Some(squash.pose_at(progress * duration)),
            TaskTick::Idle | TaskTick::Completed => None,
        }
    }

    /// Advance the running squashes by `delta` seconds, and return the pose to draw
    pub fn tick(&mut self, delta: f32) -> SpritePose {
        let land = Self::tick_squash(&mut self.land_task, &self.land, delta);
        let jump = Self::tick_squash(&mut self.jump_task, &self.jump, delta);
        // a landing squash wins over a jump stretch
        self.pose = land.or(jump).unwrap_or_default();
        self.pose
    }

    /// Ease the lean towards the one matching the current horizontal speed.
    /// Sliding holds a fixed lean into the wall.
    pub fn update_tilt(&mut self, velocity_x: f32, max_speed: f32, sliding: bool, facing: Side) -> f32 {
        let (progress, mult) = if sliding {
            (0.25, -1.0)
        } else {
            let progress = ((velocity_x + max_speed) / (2.0 * max_speed)).clamp(0.0, 1.0);
            (progress, facing.sign())
        };
        let target = (2.0 * progress - 1.0) * self.params.max_tilt * mult;
        self.tilt += (target - self.tilt) * self.params.tilt_speed.clamp(0.0, 1.0);
        self.tilt
    }

    /// Stop every squash in progress and return to the rest pose
    pub fn cancel(&mut self) {
        self.jump_task.cancel();
        self.land_task.cancel();
        self.pose = SpritePose::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn jump_stretches_then_returns_to_rest() {
        let mut animator = SquashAnimator::new(FeedbackParams::default());
        animator.on_jump_started();
        let pose = animator.tick(0.005);
        assert!(pose.scale.y > 1.0);
        assert!(pose.scale.x < 1.0);

        for _ in 0..30 {
            animator.tick(DT);
        }
        assert_eq!(animator.pose(), SpritePose::default());
        assert!(!animator.is_squashing());
    }

    #[test]
    fn retrigger_while_squashing_is_ignored() {
        let mut animator = SquashAnimator::new(FeedbackParams::default());
        animator.on_jump_started();
        animator.tick(0.1);
        let before = animator.jump_task.progress();
        animator.on_jump_started();
        assert_eq!(animator.jump_task.progress(), before);
    }

    #[test]
    fn landing_cuts_the_jump_stretch_short() {
        let mut animator = SquashAnimator::new(FeedbackParams::default());
        animator.on_event(&ControllerEvent::JumpStarted);
        animator.tick(DT);
        animator.on_event(&ControllerEvent::Landed);
        assert!(!animator.jump_task.is_running());
        let pose = animator.tick(0.005);
        assert!(pose.scale.x > 1.0);
        assert!(pose.scale.y < 1.0);
        assert!(pose.offset.y < 0.0);
    }

    #[test]
    fn weak_multipliers_disable_squash() {
        let mut animator = SquashAnimator::new(FeedbackParams {
            jump_multiplier: 1.0,
            ..Default::default()
        });
        animator.on_jump_started();
        assert!(!animator.is_squashing());
    }

    #[test]
    fn new_params_apply_to_the_next_squash() {
        let mut animator = SquashAnimator::default();
        animator.on_jump_started();
        animator.set_params(FeedbackParams {
            jump_multiplier: 1.0,
            ..Default::default()
        });
        assert!(animator.is_squashing());

        for _ in 0..30 {
            animator.tick(DT);
        }
        animator.on_jump_started();
        assert!(!animator.is_squashing());
    }

    #[test]
    fn tilt_leans_with_speed() {
        let mut animator = SquashAnimator::new(FeedbackParams {
            tilt_speed: 1.0,
            ..Default::default()
        });
        assert_eq!(animator.update_tilt(0.0, 10.0, false, Side::Right), 0.0);
        assert_eq!(animator.update_tilt(10.0, 10.0, false, Side::Right), 10.0);
        assert_eq!(animator.update_tilt(-20.0, 10.0, false, Side::Left), 10.0);
        assert_eq!(animator.update_tilt(0.0, 10.0, true, Side::Right), 5.0);
    }
}
