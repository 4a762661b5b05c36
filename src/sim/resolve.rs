//! Category-based collision response
//!
//! A discovered pair is matched against a table of `(first, second)` category
//! rules. When the pair matches a rule in reverse it is swapped, so every
//! handler sees its arguments in a fixed order. Pairs no rule recognises are
//! ignored.

use std::collections::BTreeSet;

use super::category::Category;
use super::collision::{CollisionPair, PushOut, minimal_push_out};
use super::entities::{Character, Projectile};
use super::entity::Entity;
use super::event::GameEvent;
use super::node::{NodeMut, SceneGraph};
use crate::error::SceneError;

type Handler = fn(&mut NodeMut<'_>, &mut NodeMut<'_>, &mut Vec<GameEvent>) -> Result<(), SceneError>;

/// One recognised category combination
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub first: Category,
    pub second: Category,
    pub handler: Handler,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("first", &self.first)
            .field("second", &self.second)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionTable {
    rules: Vec<Rule>,
}

impl Default for ResolutionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResolutionTable {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Player/wall, player/arrow and arrow/wall responses
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.add(Rule {
            name: "player-wall",
            first: Category::PLAYER,
            second: Category::WALL,
            handler: player_hits_wall,
        });
        table.add(Rule {
            name: "player-arrow",
            first: Category::PLAYER,
            second: Category::ARROW,
            handler: arrow_hits_player,
        });
        table.add(Rule {
            name: "arrow-wall",
            first: Category::ARROW,
            second: Category::WALL,
            handler: arrow_hits_wall,
        });
        table
    }

    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Index of the first matching rule and whether the pair must be swapped
    pub fn classify(&self, a: Category, b: Category) -> Option<(usize, bool)> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            if a.intersects(rule.first) && b.intersects(rule.second) {
                Some((index, false))
            } else if a.intersects(rule.second) && b.intersects(rule.first) {
                Some((index, true))
            } else {
                None
            }
        })
    }

    /// Run the matching handler for every pair; returns how many were handled.
    ///
    /// Categories are read when each pair is reached, so earlier responses in
    /// the same pass are visible to later ones.
    pub fn resolve(
        &self,
        graph: &mut SceneGraph,
        pairs: &BTreeSet<CollisionPair>,
        events: &mut Vec<GameEvent>,
    ) -> Result<usize, SceneError> {
        let mut handled = 0;
        for pair in pairs {
            let (Some(a), Some(b)) = (graph.entity(pair.first()), graph.entity(pair.second())) else {
                continue;
            };
            let Some((index, swapped)) = self.classify(a.category(), b.category()) else {
                continue;
            };
            let rule = &self.rules[index];
            let (first, second) = if swapped {
                (pair.second(), pair.first())
            } else {
                (pair.first(), pair.second())
            };

            let (mut x, mut y) = graph.pair_mut(first, second)?;
            (rule.handler)(&mut x, &mut y, events)?;
            log::trace!("resolved {} pair", rule.name);
            handled += 1;
        }
        Ok(handled)
    }
}

fn character<'a>(node: &'a mut NodeMut<'_>) -> Result<&'a mut Character, SceneError> {
    node.entity
        .downcast_mut::<Character>()
        .ok_or(SceneError::UnexpectedEntity { expected: "Character" })
}

fn projectile<'a>(node: &'a mut NodeMut<'_>) -> Result<&'a mut Projectile, SceneError> {
    node.entity
        .downcast_mut::<Projectile>()
        .ok_or(SceneError::UnexpectedEntity { expected: "Projectile" })
}

/// Push the player out along the shallowest axis and stop motion on it
fn player_hits_wall(
    player: &mut NodeMut<'_>,
    wall: &mut NodeMut<'_>,
    _events: &mut Vec<GameEvent>,
) -> Result<(), SceneError> {
    let Some(push) = minimal_push_out(&player.bounds, &wall.bounds) else {
        return Ok(());
    };
    // landing suspends further vertical correction until the next move
    let suspended = player.entity.category().contains(Category::IGNORES_WALL_COLLISION);
    if push.is_vertical() && suspended {
        return Ok(());
    }

    let character = character(player)?;
    match push {
        PushOut::Up(_) => {
            character.set_velocity(0.0, false);
            character.land();
        }
        PushOut::Down(_) => character.set_velocity(0.0, false),
        PushOut::Left(_) | PushOut::Right(_) => character.set_velocity(0.0, true),
    }
    player.move_world(push.offset());
    Ok(())
}

/// A live arrow kills; an inert one is picked up
fn arrow_hits_player(
    player: &mut NodeMut<'_>,
    arrow: &mut NodeMut<'_>,
    events: &mut Vec<GameEvent>,
) -> Result<(), SceneError> {
    let position = player.center();
    let character = character(player)?;
    let projectile = projectile(arrow)?;
    if character.is_dead() || projectile.is_picked_up() {
        return Ok(());
    }

    let player = character.slot();
    if projectile.collidable() {
        character.kill();
        projectile.strike();
        events.push(GameEvent::PlayerKilled { player, position });
    } else {
        projectile.pick_up();
        character.recover_arrow();
        events.push(GameEvent::ArrowRecovered { player, position });
    }
    Ok(())
}

/// Snap the arrow onto the wall surface and leave it there, inert
fn arrow_hits_wall(
    arrow: &mut NodeMut<'_>,
    wall: &mut NodeMut<'_>,
    events: &mut Vec<GameEvent>,
) -> Result<(), SceneError> {
    let bounds = arrow.bounds;
    let projectile = projectile(arrow)?;
    if projectile.is_embedded() || projectile.is_picked_up() {
        return Ok(());
    }
    let Some(push) = minimal_push_out(&bounds, &wall.bounds) else {
        return Ok(());
    };
    projectile.embed();
    arrow.move_world(push.offset());
    events.push(GameEvent::ArrowEmbedded {
        position: arrow.center(),
    });
    Ok(())
}
