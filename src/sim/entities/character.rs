//! The controllable archer
//!
//! Aim and fire form a small state machine:
//! - a directional grid input picks a launch angle and offset from a fixed table
//! - center input cancels aiming and parks the visual marker off screen
//! - firing is only accepted while aiming with arrows left
//! - an accepted shot queues a spawn command and starts a cooldown

use glam::{Affine2, Vec2};

use super::animation::FrameStrip;
use super::arrow_holder::ArrowHolder;
use super::projectile::Projectile;
use super::visual_arrow::VisualArrow;
use crate::assets::{TextureHandle, TextureId, TextureProvider};
use crate::consts::{HITBOX_HEIGHT, HITBOX_WIDTH, MARKER_PARKED};
use crate::error::AssetError;
use crate::input::{AimGrid, PlayerInput};
use crate::render::{RenderTarget, Sprite};
use crate::settings::Settings;
use crate::sim::category::Category;
use crate::sim::command::{Command, CommandQueue};
use crate::sim::entity::{Entity, UpdateContext};
use crate::sim::event::GameEvent;
use crate::sim::transform::{Rect, Transform};

/// Sprite frame size, wider than the hitbox
const FRAME_WIDTH: f32 = 48.0;
const FRAME_HEIGHT: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Archer,
}

/// Presentational state, derived from motion every update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Run,
    Jump,
    Death,
}

/// Texture set for one player slot
#[derive(Debug, Clone, Copy)]
pub struct CharacterTextures {
    pub idle: TextureHandle,
    pub run: TextureHandle,
    pub jump: TextureHandle,
    pub death: TextureHandle,
    pub arrow: TextureHandle,
}

impl CharacterTextures {
    /// Slot 1 is the blue archer, anything else pink
    pub fn load(slot: u8, textures: &impl TextureProvider) -> Result<Self, AssetError> {
        let ids = match slot {
            1 => [TextureId::BlueIdle, TextureId::BlueRun, TextureId::BlueJump, TextureId::BlueDeath],
            _ => [TextureId::PinkIdle, TextureId::PinkRun, TextureId::PinkJump, TextureId::PinkDeath],
        };
        Ok(Self {
            idle: textures.get(ids[0])?,
            run: textures.get(ids[1])?,
            jump: textures.get(ids[2])?,
            death: textures.get(ids[3])?,
            arrow: textures.get(TextureId::Arrow)?,
        })
    }
}

/// Movement and shooting numbers, taken from `Settings`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterTuning {
    pub run_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub fire_cooldown: f32,
    pub arrow_speed: f32,
    pub arrow_gravity: f32,
    pub starting_arrows: u32,
}

impl From<&Settings> for CharacterTuning {
    fn from(settings: &Settings) -> Self {
        Self {
            run_speed: settings.run_speed,
            jump_speed: settings.jump_speed,
            gravity: settings.gravity,
            max_fall_speed: settings.max_fall_speed,
            fire_cooldown: settings.fire_cooldown,
            arrow_speed: settings.arrow_speed,
            arrow_gravity: settings.arrow_gravity,
            starting_arrows: settings.starting_arrows,
        }
    }
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Launch rotation (degrees) and offset from the hitbox top-left for an aim input.
///
/// `None` for the center cell.
fn aim_table(grid: AimGrid) -> Option<(f32, Vec2)> {
    let entry = match (grid.x, grid.y) {
        (1, 2) => (135.0, Vec2::new(6.0, 47.0)),
        (1, 1) => (225.0, Vec2::new(-10.0, 10.0)),
        (1, _) => (180.0, Vec2::new(-5.0, 33.0)),
        (2, 2) => (45.0, Vec2::new(55.0, 25.0)),
        (2, 1) => (-45.0, Vec2::new(32.0, -12.0)),
        (2, _) => (0.0, Vec2::new(45.0, 3.0)),
        (_, 2) => (90.0, Vec2::new(37.0, 34.0)),
        (_, 1) => (-90.0, Vec2::new(4.0, -1.0)),
        _ => return None,
    };
    Some(entry)
}

struct Animations {
    idle: FrameStrip,
    run: FrameStrip,
    jump: FrameStrip,
    death: FrameStrip,
}

impl Animations {
    fn new() -> Self {
        Self {
            idle: FrameStrip::new(FRAME_WIDTH, FRAME_HEIGHT, 8, 1.0, true),
            run: FrameStrip::new(FRAME_WIDTH, FRAME_HEIGHT, 8, 0.5, true),
            jump: FrameStrip::new(FRAME_WIDTH, FRAME_HEIGHT, 6, 0.5, true),
            death: FrameStrip::new(FRAME_WIDTH, FRAME_HEIGHT, 11, 1.5, false),
        }
    }

    fn strip(&self, state: AnimationState) -> &FrameStrip {
        match state {
            AnimationState::Idle => &self.idle,
            AnimationState::Run => &self.run,
            AnimationState::Jump => &self.jump,
            AnimationState::Death => &self.death,
        }
    }

    fn strip_mut(&mut self, state: AnimationState) -> &mut FrameStrip {
        match state {
            AnimationState::Idle => &mut self.idle,
            AnimationState::Run => &mut self.run,
            AnimationState::Jump => &mut self.jump,
            AnimationState::Death => &mut self.death,
        }
    }
}

pub struct Character {
    slot: u8,
    archetype: Archetype,
    textures: CharacterTextures,
    animations: Animations,
    animation: AnimationState,
    tuning: CharacterTuning,

    velocity: Vec2,
    /// -1, 0 or 1
    run: i8,
    wants_jump: bool,
    grounded: bool,
    was_grounded: bool,
    collidable: bool,
    facing_left: bool,

    arrow_rotation: f32,
    arrow_offset: Vec2,
    arrows: u32,
    aiming: bool,
    firing: bool,
    cooldown: f32,
    dead: bool,
}

impl Character {
    pub fn new(slot: u8, textures: CharacterTextures, tuning: CharacterTuning) -> Self {
        Self {
            slot,
            archetype: Archetype::Archer,
            textures,
            animations: Animations::new(),
            animation: AnimationState::Idle,
            tuning,
            velocity: Vec2::ZERO,
            run: 0,
            wants_jump: false,
            grounded: false,
            was_grounded: false,
            collidable: true,
            facing_left: slot == 2,
            arrow_rotation: 0.0,
            arrow_offset: Vec2::from(MARKER_PARKED),
            arrows: tuning.starting_arrows,
            aiming: false,
            firing: false,
            cooldown: 0.0,
            dead: false,
        }
    }

    /// Local transform that places the hitbox centered on `position`
    pub fn transform_at(position: Vec2) -> Transform {
        Transform::at(position).with_origin(Vec2::new(
            (HITBOX_WIDTH / 2.0).floor(),
            (HITBOX_HEIGHT / 2.0).floor(),
        ))
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn arrows(&self) -> u32 {
        self.arrows
    }

    pub fn is_aiming(&self) -> bool {
        self.aiming
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn arrow_rotation(&self) -> f32 {
        self.arrow_rotation
    }

    /// Launch offset from the hitbox top-left, parked while not aiming
    pub fn arrow_offset(&self) -> Vec2 {
        self.arrow_offset
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation
    }

    pub fn set_arrows(&mut self, arrows: u32) {
        self.arrows = arrows;
    }

    pub fn set_velocity_vector(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Set one velocity component
    pub fn set_velocity(&mut self, value: f32, horizontal: bool) {
        if horizontal {
            self.velocity.x = value;
        } else {
            self.velocity.y = value;
        }
    }

    /// Standing on something this tick
    pub fn land(&mut self) {
        self.grounded = true;
        self.collidable = false;
    }

    pub fn kill(&mut self) {
        if !self.dead {
            log::info!("Player {} was shot", self.slot);
        }
        self.dead = true;
        self.aiming = false;
        self.firing = false;
        self.run = 0;
    }

    pub fn recover_arrow(&mut self) {
        self.arrows += 1;
        log::info!("Player {} recovered an arrow ({} left)", self.slot, self.arrows);
    }

    /// Apply one tick of player input
    pub fn control(&mut self, input: &PlayerInput, commands: &mut CommandQueue) {
        if self.dead {
            return;
        }
        self.run = input.run.signum();
        self.wants_jump |= input.jump;
        self.aim(input.aim, commands);
        if input.fire {
            self.fire();
        }
    }

    /// Choose a launch angle and offset, and always queue a marker reposition
    pub fn aim(&mut self, grid: AimGrid, commands: &mut CommandQueue) {
        self.arrow_rotation = 0.0;
        match aim_table(grid).filter(|_| self.arrows > 0) {
            Some((rotation, offset)) => {
                self.aiming = true;
                self.arrow_rotation = rotation;
                self.arrow_offset = offset;
            }
            None => {
                self.aiming = false;
                self.firing = false;
                self.arrow_offset = Vec2::from(MARKER_PARKED);
            }
        }

        let slot = self.slot;
        let (offset, rotation) = (self.arrow_offset, self.arrow_rotation);
        commands.push(Command::new::<VisualArrow, _>(
            Category::VISUAL_ARROW,
            move |marker, ctx| {
                if marker.slot() == slot {
                    marker.aim(ctx.transform, offset, rotation);
                }
            },
        ));
    }

    /// Request a shot; refused unless aiming with arrows left
    pub fn fire(&mut self) {
        self.firing = self.aiming && self.arrows > 0;
    }

    /// Runs after movement, so the launch point is where the archer stands
    /// when the next drain spawns the arrow.
    fn check_projectile_launch(&mut self, ctx: &mut UpdateContext<'_>) {
        let armed = self.firing && self.aiming && self.arrows > 0;
        if armed && self.cooldown <= 0.0 {
            let spawn_at = ctx.world_transform().transform_point2(self.arrow_offset);
            let rotation = self.arrow_rotation;
            let shooter = self.slot;
            let texture = self.textures.arrow;
            let (speed, gravity) = (self.tuning.arrow_speed, self.tuning.arrow_gravity);

            ctx.commands.push(Command::new::<ArrowHolder, _>(
                Category::ARROW_SPAWNER,
                move |_, action| {
                    action.spawn_child_at_world(
                        Projectile::new(shooter, rotation, speed, gravity, texture),
                        Transform::at(spawn_at).with_rotation(rotation),
                    );
                },
            ));
            self.cooldown += self.tuning.fire_cooldown;
            self.firing = false;
            self.arrows = self.arrows.saturating_sub(1);
            ctx.events.push(GameEvent::ArrowFired {
                player: self.slot,
                position: spawn_at,
            });
            log::info!("Player {} fired ({} arrows left)", self.slot, self.arrows);
        } else if self.cooldown > 0.0 {
            self.cooldown -= ctx.dt;
        }
    }

    fn derive_animation(&self) -> AnimationState {
        if self.dead {
            AnimationState::Death
        } else if !self.grounded || self.velocity.y < 0.0 {
            AnimationState::Jump
        } else if self.run != 0 {
            AnimationState::Run
        } else {
            AnimationState::Idle
        }
    }

    fn animate(&mut self, dt: f32) {
        let state = self.derive_animation();
        if state != self.animation {
            self.animations.strip_mut(state).restart();
            self.animation = state;
        }
        self.animations.strip_mut(state).update(dt);
    }

    fn texture_for(&self, state: AnimationState) -> TextureHandle {
        match state {
            AnimationState::Idle => self.textures.idle,
            AnimationState::Run => self.textures.run,
            AnimationState::Jump => self.textures.jump,
            AnimationState::Death => self.textures.death,
        }
    }
}

impl Entity for Character {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.dt;
        self.animate(dt);

        if self.dead {
            self.run = 0;
            self.wants_jump = false;
        }
        self.velocity.x = self.run as f32 * self.tuning.run_speed;
        if self.run != 0 {
            self.facing_left = self.run < 0;
        }
        if self.grounded && !self.was_grounded {
            ctx.events.push(GameEvent::PlayerLanded {
                player: self.slot,
                position: ctx.world_transform().transform_point2(Vec2::ZERO),
            });
        }
        self.was_grounded = self.grounded;
        if self.wants_jump && self.grounded {
            self.velocity.y = -self.tuning.jump_speed;
            ctx.events.push(GameEvent::PlayerJumped {
                player: self.slot,
                position: ctx.world_transform().transform_point2(Vec2::ZERO),
            });
        }
        self.wants_jump = false;
        self.velocity.y = (self.velocity.y + self.tuning.gravity * dt).min(self.tuning.max_fall_speed);
        ctx.move_world(self.velocity * dt);
        self.check_projectile_launch(ctx);

        self.collidable = true;
        self.grounded = false;
    }

    fn draw(&self, target: &mut dyn RenderTarget, transform: &Affine2) {
        let strip = self.animations.strip(self.animation);
        let sprite = Sprite::new(self.texture_for(self.animation), strip.frame_rect());
        let inset = (FRAME_WIDTH - HITBOX_WIDTH) / 2.0;
        let local = if self.facing_left {
            Affine2::from_translation(Vec2::new(HITBOX_WIDTH + inset, 0.0))
                * Affine2::from_scale(Vec2::new(-1.0, 1.0))
        } else {
            Affine2::from_translation(Vec2::new(-inset, 0.0))
        };
        target.draw_sprite(&sprite, &(*transform * local));
    }

    fn category(&self) -> Category {
        let collision = if self.collidable {
            Category::COLLIDABLE
        } else {
            Category::COLLIDABLE | Category::IGNORES_WALL_COLLISION
        };
        Category::player(self.slot) | collision
    }

    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, HITBOX_WIDTH, HITBOX_HEIGHT)
    }

    fn collidable(&self) -> bool {
        self.collidable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureHolder;
    use crate::sim::node::SceneGraph;

    fn archer(slot: u8) -> Character {
        let textures = CharacterTextures::load(slot, &TextureHolder::with_defaults()).unwrap();
        Character::new(slot, textures, CharacterTuning::default())
    }

    fn update(character: &mut Character, commands: &mut CommandQueue) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut transform = Character::transform_at(Vec2::new(100.0, 100.0));
        let mut ctx = UpdateContext {
            dt: 1.0 / 60.0,
            commands,
            events: &mut events,
            transform: &mut transform,
            parent_world: Affine2::IDENTITY,
            world_bounds: Rect::new(0.0, 0.0, 768.0, 576.0),
        };
        character.update(&mut ctx);
        events
    }

    #[test]
    fn test_aim_table() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(1, 2), &mut commands);
        assert!(character.is_aiming());
        assert_eq!(character.arrow_rotation(), 135.0);
        assert_eq!(character.arrow_offset(), Vec2::new(6.0, 47.0));

        character.aim(AimGrid::new(2, 0), &mut commands);
        assert_eq!(character.arrow_rotation(), 0.0);
        assert_eq!(character.arrow_offset(), Vec2::new(45.0, 3.0));

        character.aim(AimGrid::new(0, 1), &mut commands);
        assert_eq!(character.arrow_rotation(), -90.0);
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn test_center_aim_parks_marker() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 2), &mut commands);
        character.aim(AimGrid::CENTER, &mut commands);

        assert!(!character.is_aiming());
        assert_eq!(character.arrow_offset(), Vec2::from(MARKER_PARKED));
        assert_eq!(commands.len(), 2);

        let mut graph = SceneGraph::new();
        let texture = TextureHolder::with_defaults().get(TextureId::Arrow).unwrap();
        let marker = graph
            .spawn(graph.root(), VisualArrow::new(1, texture), Transform::IDENTITY)
            .unwrap();
        let mut queue = CommandQueue::new();
        while let Some(mut command) = commands.pop() {
            graph.on_command(&mut command, 0.0, &mut queue).unwrap();
        }
        assert_eq!(graph.transform(marker).unwrap().position, Vec2::from(MARKER_PARKED));
    }

    #[test]
    fn test_marker_command_only_moves_own_marker() {
        let mut character = archer(2);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 0), &mut commands);

        let mut graph = SceneGraph::new();
        let texture = TextureHolder::with_defaults().get(TextureId::Arrow).unwrap();
        let mine = graph
            .spawn(graph.root(), VisualArrow::new(2, texture), Transform::IDENTITY)
            .unwrap();
        let theirs = graph
            .spawn(graph.root(), VisualArrow::new(1, texture), Transform::IDENTITY)
            .unwrap();
        let mut command = commands.pop().unwrap();
        graph.on_command(&mut command, 0.0, &mut CommandQueue::new()).unwrap();

        assert_eq!(graph.transform(mine).unwrap().position, Vec2::new(45.0, 3.0));
        assert_eq!(graph.transform(theirs).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_fire_without_arrows_is_refused() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 0), &mut commands);
        character.set_arrows(0);
        character.fire();
        assert!(!character.is_firing());

        let mut launches = CommandQueue::new();
        let events = update(&mut character, &mut launches);
        assert!(launches.is_empty());
        assert!(events.iter().all(|e| !matches!(e, GameEvent::ArrowFired { .. })));
    }

    #[test]
    fn test_aim_without_arrows_is_not_aiming() {
        let mut character = archer(1);
        character.set_arrows(0);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 0), &mut commands);
        assert!(!character.is_aiming());
        assert_eq!(character.arrow_offset(), Vec2::from(MARKER_PARKED));
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_fire_queues_spawn_and_starts_cooldown() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 0), &mut commands);
        character.fire();
        assert!(character.is_firing());

        let mut launches = CommandQueue::new();
        let events = update(&mut character, &mut launches);
        assert_eq!(launches.len(), 1);
        assert_eq!(launches.pop().map(|c| c.category()), Some(Category::ARROW_SPAWNER));
        assert_eq!(character.arrows(), 3);
        assert!(!character.is_firing());
        assert!(character.cooldown() > 0.0);
        assert!(matches!(events[0], GameEvent::ArrowFired { player: 1, .. }));

        // re-triggering during the cooldown queues nothing
        character.fire();
        let mut launches = CommandQueue::new();
        update(&mut character, &mut launches);
        assert!(launches.is_empty());
        assert_eq!(character.arrows(), 3);
    }

    #[test]
    fn test_cancelled_aim_drops_pending_shot() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        character.aim(AimGrid::new(2, 0), &mut commands);
        character.fire();
        update(&mut character, &mut CommandQueue::new());
        assert_eq!(character.arrows(), 3);

        // trigger again while cooling down, then let go of the aim
        character.fire();
        assert!(character.is_firing());
        character.aim(AimGrid::CENTER, &mut commands);
        assert!(!character.is_firing());

        let mut launches = CommandQueue::new();
        for _ in 0..30 {
            let events = update(&mut character, &mut launches);
            assert!(events.iter().all(|e| !matches!(e, GameEvent::ArrowFired { .. })));
        }
        assert!(launches.is_empty());
        assert_eq!(character.arrows(), 3);
    }

    #[test]
    fn test_launch_point_follows_movement() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        let input = PlayerInput {
            aim: AimGrid::new(2, 0),
            fire: true,
            run: 1,
            jump: false,
        };
        character.control(&input, &mut commands);

        let events = update(&mut character, &mut CommandQueue::new());
        let Some(GameEvent::ArrowFired { position, .. }) = events.first() else {
            panic!("expected a shot, got {events:?}");
        };
        // hitbox top-left starts at (80, 84) and moves one step before launch
        let moved = Vec2::new(80.0, 84.0) + character.velocity() / 60.0;
        let expected = moved + Vec2::new(45.0, 3.0);
        assert!((*position - expected).length() < 1e-3, "{position} vs {expected}");
    }

    #[test]
    fn test_dead_character_ignores_input() {
        let mut character = archer(1);
        character.kill();
        let mut commands = CommandQueue::new();
        let input = PlayerInput {
            aim: AimGrid::new(2, 0),
            fire: true,
            run: 1,
            jump: true,
        };
        character.control(&input, &mut commands);
        assert!(commands.is_empty());
        assert!(!character.is_firing());
        update(&mut character, &mut commands);
        assert_eq!(character.velocity().x, 0.0);
        assert_eq!(character.animation_state(), AnimationState::Death);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        let input = PlayerInput {
            jump: true,
            ..PlayerInput::default()
        };
        character.control(&input, &mut commands);
        let events = update(&mut character, &mut commands);
        assert!(events.is_empty());
        assert!(character.velocity().y > 0.0);

        character.land();
        character.set_velocity(0.0, false);
        character.control(&input, &mut commands);
        let events = update(&mut character, &mut commands);
        assert!(matches!(events[0], GameEvent::PlayerLanded { player: 1, .. }));
        assert!(matches!(events[1], GameEvent::PlayerJumped { player: 1, .. }));
        assert!(character.velocity().y < 0.0);
    }

    #[test]
    fn test_landing_reported_once_per_touchdown() {
        let mut character = archer(1);
        let mut commands = CommandQueue::new();
        let landings = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerLanded { .. }))
                .count()
        };

        assert_eq!(landings(&update(&mut character, &mut commands)), 0);
        character.land();
        assert_eq!(landings(&update(&mut character, &mut commands)), 1);
        // still standing on the next tick
        character.land();
        assert_eq!(landings(&update(&mut character, &mut commands)), 0);
        // airborne for a tick, then down again
        update(&mut character, &mut commands);
        character.land();
        assert_eq!(landings(&update(&mut character, &mut commands)), 1);
    }

    #[test]
    fn test_wall_suspension_flag() {
        let mut character = archer(2);
        assert_eq!(
            character.category(),
            Category::PLAYER_TWO | Category::COLLIDABLE
        );
        character.land();
        assert!(character.category().contains(Category::IGNORES_WALL_COLLISION));
        let mut commands = CommandQueue::new();
        update(&mut character, &mut commands);
        assert!(character.collidable());
    }
}
