//! World orchestration
//!
//! Owns the scene graph and the command queue and runs one tick as:
//! 1. drain every command queued before the tick into the graph
//! 2. discover and resolve collisions
//! 3. sweep transient nodes
//! 4. update every node, which queues the next tick's commands
//!
//! Events produced along the way are forwarded to the audio sink at the end.

use glam::Vec2;
use rand::Rng;

use super::category::Category;
use super::collision::{BroadPhase, TreeWalk};
use super::command::{Command, CommandQueue};
use super::entities::{
    ArrowHolder, Backdrop, Character, CharacterTextures, CharacterTuning, VisualArrow, Wall,
    WallSet,
};
use super::entity::Group;
use super::event::GameEvent;
use super::map::{self, Map};
use super::node::{NodeId, SceneGraph};
use super::resolve::ResolutionTable;
use super::transform::{Rect, Transform};
use crate::assets::{TextureId, TextureProvider};
use crate::audio::{AudioSink, Silence};
use crate::consts::{TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::error::{SceneError, WorldError};
use crate::input::TickInput;
use crate::render::{RenderTarget, Sprite};
use crate::settings::Settings;

/// Top-level scene layers, drawn in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Ground,
    Foreground,
    Hud,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Background, Layer::Ground, Layer::Foreground, Layer::Hud];
}

pub struct World {
    graph: SceneGraph,
    layers: [NodeId; 4],
    commands: CommandQueue,
    players: [NodeId; 2],
    spawner: NodeId,
    resolution: ResolutionTable,
    broad_phase: Box<dyn BroadPhase>,
    settings: Settings,
    map_name: String,
    wall_set: WallSet,
    events: Vec<GameEvent>,
    audio: Box<dyn AudioSink>,
}

impl World {
    /// Build a world, rolling the layout and skin from `rng`.
    ///
    /// A `map_path` in the settings replaces the rolled layout but keeps the
    /// rolled skin.
    pub fn new(
        settings: Settings,
        textures: &impl TextureProvider,
        rng: &mut impl Rng,
    ) -> Result<Self, WorldError> {
        let (id, wall_set) = map::select(rng);
        let map = match &settings.map_path {
            Some(path) => Map::load(path)?,
            None => Map::builtin(id),
        };
        Self::from_map(settings, &map, wall_set, textures)
    }

    /// Build a world from an explicit layout and skin
    pub fn from_map(
        settings: Settings,
        map: &Map,
        wall_set: WallSet,
        textures: &impl TextureProvider,
    ) -> Result<Self, WorldError> {
        let mut graph = SceneGraph::new();
        graph.set_world_bounds(Rect::new(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT));

        let root = graph.root();
        let mut layers = [root; 4];
        for (slot, layer) in layers.iter_mut().zip(Layer::ALL) {
            *slot = graph.spawn(root, Group, Transform::IDENTITY)?;
            log::trace!("layer {:?} attached", layer);
        }
        let [background, ground, foreground, _hud] = layers;

        let backdrop = Sprite::new(
            textures.get(wall_set.background_texture())?,
            Rect::new(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT),
        );
        graph.spawn(background, Backdrop::new(backdrop), Transform::IDENTITY)?;

        let walls = graph.spawn(ground, Group, Transform::IDENTITY)?;
        let wall_texture = textures.get(wall_set.wall_texture())?;
        let mut wall_count = 0;
        for (row, col, tile) in map.walls() {
            let position = Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
            graph.spawn(walls, Wall::new(wall_set, tile, wall_texture), Transform::at(position))?;
            wall_count += 1;
        }

        let tuning = CharacterTuning::from(&settings);
        let arrow_texture = textures.get(TextureId::Arrow)?;
        let mut players = [root; 2];
        for (index, spawn) in [settings.spawn_player_one, settings.spawn_player_two]
            .into_iter()
            .enumerate()
        {
            let slot = index as u8 + 1;
            let character = Character::new(slot, CharacterTextures::load(slot, textures)?, tuning);
            let id = graph.spawn(ground, character, Character::transform_at(spawn))?;
            graph.spawn(id, VisualArrow::new(slot, arrow_texture), VisualArrow::parked())?;
            players[index] = id;
        }

        let spawner = graph.spawn(foreground, ArrowHolder, Transform::IDENTITY)?;

        log::info!(
            "Built {} ({:?}) with {} walls, {} nodes",
            map.name(),
            wall_set,
            wall_count,
            graph.len()
        );

        Ok(Self {
            graph,
            layers,
            commands: CommandQueue::new(),
            players,
            spawner,
            resolution: ResolutionTable::standard(),
            broad_phase: Box::new(TreeWalk::new()),
            settings,
            map_name: map.name().to_string(),
            wall_set,
            events: Vec::new(),
            audio: Box::new(Silence),
        })
    }

    /// Advance the simulation by one fixed step
    pub fn update(&mut self, dt: f32, input: &TickInput) -> Result<(), SceneError> {
        self.graph.begin_tick();
        self.events.clear();

        for slot in [1u8, 2] {
            let controls = input.player(slot);
            self.commands.push(Command::new::<Character, _>(
                Category::player(slot),
                move |character, ctx| character.control(&controls, ctx.commands),
            ));
        }

        let mut batch = self.commands.take_batch();
        let mut dispatched = 0;
        while let Some(mut command) = batch.pop() {
            let hits = self.graph.on_command(&mut command, dt, &mut self.commands)?;
            if hits == 0 {
                log::trace!("command for {} matched nothing", command.target_type());
            }
            dispatched += 1;
        }

        let pairs = self.broad_phase.find_pairs(&self.graph);
        let resolved = self.resolution.resolve(&mut self.graph, &pairs, &mut self.events)?;
        let swept = self.graph.sweep_transient();
        self.graph.update(dt, &mut self.commands, &mut self.events);

        log::debug!(
            "tick {}: {} commands, {} pairs ({} resolved), {} swept",
            self.graph.tick(),
            dispatched,
            pairs.len(),
            resolved,
            swept
        );

        for event in &self.events {
            self.audio.play_at(event.sound(), event.position());
        }
        Ok(())
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.graph.draw(target);
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn layer(&self, layer: Layer) -> NodeId {
        self.layers[layer as usize]
    }

    pub fn player_id(&self, slot: u8) -> NodeId {
        match slot {
            2 => self.players[1],
            _ => self.players[0],
        }
    }

    pub fn player(&self, slot: u8) -> Option<&Character> {
        self.graph.get::<Character>(self.player_id(slot))
    }

    pub fn player_mut(&mut self, slot: u8) -> Option<&mut Character> {
        let id = self.player_id(slot);
        self.graph.get_mut::<Character>(id)
    }

    /// Node that fired arrows are attached to
    pub fn spawner(&self) -> NodeId {
        self.spawner
    }

    /// Live projectile nodes
    pub fn projectiles(&self) -> Vec<NodeId> {
        self.graph.find(Category::ARROW)
    }

    /// Events produced by the last tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Commands queued here run in the next tick's drain
    pub fn command_queue_mut(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn wall_set(&self) -> WallSet {
        self.wall_set
    }

    pub fn set_audio(&mut self, audio: Box<dyn AudioSink>) {
        self.audio = audio;
    }

    pub fn set_broad_phase(&mut self, broad_phase: Box<dyn BroadPhase>) {
        self.broad_phase = broad_phase;
    }

    /// The surviving slot once exactly one player is left standing
    pub fn winner(&self) -> Option<u8> {
        let alive: Vec<u8> = [1u8, 2]
            .into_iter()
            .filter(|&slot| self.player(slot).is_some_and(|c| !c.is_dead()))
            .collect();
        match alive.as_slice() {
            [slot] => Some(*slot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureHolder;
    use crate::render::DrawList;
    use crate::sim::map::MapId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> World {
        World::from_map(
            Settings::default(),
            &Map::builtin(MapId::One),
            WallSet::Purple,
            &TextureHolder::with_defaults(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_scene() {
        let world = world();
        let graph = world.graph();
        assert_eq!(graph.children(graph.root()).len(), 4);
        assert!(world.player(1).is_some());
        assert_eq!(world.player(2).map(|c| c.slot()), Some(2));
        assert_eq!(graph.find(Category::VISUAL_ARROW).len(), 2);
        assert_eq!(graph.find(Category::ARROW_SPAWNER), vec![world.spawner()]);
        assert_eq!(
            graph.find(Category::WALL).len(),
            Map::builtin(MapId::One).walls().count()
        );
        assert!(world.projectiles().is_empty());
    }

    #[test]
    fn test_missing_texture_fails_build() {
        let result = World::from_map(
            Settings::default(),
            &Map::builtin(MapId::One),
            WallSet::Purple,
            &TextureHolder::new(),
        );
        assert!(matches!(result, Err(WorldError::Asset(_))));
    }

    #[test]
    fn test_seeded_build_is_deterministic() {
        let textures = TextureHolder::with_defaults();
        let a = World::new(Settings::default(), &textures, &mut Pcg32::seed_from_u64(3)).unwrap();
        let b = World::new(Settings::default(), &textures, &mut Pcg32::seed_from_u64(3)).unwrap();
        assert_eq!(a.map_name(), b.map_name());
        assert_eq!(a.wall_set(), b.wall_set());
    }

    #[test]
    fn test_draw_order_follows_layers() {
        let world = world();
        let mut list = DrawList::new();
        world.draw(&mut list);
        // backdrop first, then walls, then characters
        let textures = TextureHolder::with_defaults();
        assert_eq!(
            list.calls[0].sprite.texture,
            textures.get(TextureId::PurpleBg).unwrap()
        );
        assert_eq!(
            list.calls[1].sprite.texture,
            textures.get(TextureId::PurpleWall).unwrap()
        );
    }

    #[test]
    fn test_players_land_on_floor() {
        let mut world = world();
        for _ in 0..120 {
            world.update(crate::consts::SIM_DT, &TickInput::default()).unwrap();
        }
        let graph = world.graph();
        for slot in [1, 2] {
            let rect = graph.bound_rect(world.player_id(slot));
            // both spawn above the row 4 platform
            assert!((rect.bottom() - 4.0 * TILE_SIZE).abs() < 1.0, "{rect:?}");
        }
        assert_eq!(world.winner(), None);
    }
}
