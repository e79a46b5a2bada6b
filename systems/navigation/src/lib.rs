#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic navigation system that keeps a cached route per enemy and
//! proposes one step for every enemy that is ready to move.
//!
//! Pacing is owned by the world: an enemy accrues simulated time on every
//! tick and reports `ready_for_step` once it may move again. Navigation only
//! reacts to [`Event::TimeAdvanced`], so each enemy receives at most one step
//! command per tick.

use std::collections::BTreeMap;

use labyrinth_core::{CellCoord, Command, Direction, EnemyId, EnemyView, Event};
use labyrinth_system_pathfinding::{AStar, Path, PathPlanner};
use labyrinth_world::grid::GridWorld;
use tracing::{debug, trace};

/// Observable state of a single enemy's navigator after the latest tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AgentPhase {
    /// Ready to move but holding position, because the target cannot be
    /// reached or is already occupied.
    #[default]
    Idle,
    /// Holding a route while waiting for enough time to step again.
    PathCached,
    /// Issued a step toward the next cell of its route.
    Moving,
    /// Waiting for enough time to step again without a route; a fresh search
    /// runs once it is ready.
    WaitingOnTimer,
}

/// Pure system that reacts to world events and emits enemy step commands.
#[derive(Debug)]
pub struct Navigation<P = AStar> {
    planner: P,
    agents: BTreeMap<EnemyId, AgentNavigator>,
}

impl Navigation {
    /// Creates a navigation system backed by the A* planner.
    #[must_use]
    pub fn new() -> Self {
        Self::with_planner(AStar::new())
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathPlanner> Navigation<P> {
    /// Creates a navigation system that plans with the provided planner.
    #[must_use]
    pub fn with_planner(planner: P) -> Self {
        Self {
            planner,
            agents: BTreeMap::new(),
        }
    }

    /// Consumes world events and immutable views to emit step commands.
    ///
    /// `target` is the cell every enemy chases. Agents for enemies missing
    /// from `enemy_view` are discarded before any planning happens.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemy_view: &EnemyView,
        target: CellCoord,
        grid: &GridWorld,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { .. } => self.agents.clear(),
                Event::EnemyDefeated { enemy, .. } => {
                    let _ = self.agents.remove(enemy);
                }
                _ => {}
            }
        }

        self.agents
            .retain(|id, _| enemy_view.iter().any(|snapshot| snapshot.id == *id));

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for snapshot in enemy_view.iter() {
            let agent = self
                .agents
                .entry(snapshot.id)
                .or_insert_with(AgentNavigator::default);

            if !snapshot.ready_for_step {
                agent.phase = if agent.path.is_empty() {
                    AgentPhase::WaitingOnTimer
                } else {
                    AgentPhase::PathCached
                };
                continue;
            }

            if agent.needs_search(snapshot.cell, target) {
                agent.path = self.planner.find_path(snapshot.cell, target, grid);
                agent.searches = agent.searches.saturating_add(1);
                debug!(
                    enemy = snapshot.id.get(),
                    from = ?snapshot.cell,
                    ?target,
                    steps = agent.path.len(),
                    "enemy route planned"
                );
            }

            match agent.next_direction(snapshot.cell) {
                Some(direction) => {
                    trace!(enemy = snapshot.id.get(), ?direction, "enemy step proposed");
                    agent.phase = AgentPhase::Moving;
                    out.push(Command::StepEnemy {
                        enemy: snapshot.id,
                        direction,
                    });
                }
                None => agent.phase = AgentPhase::Idle,
            }
        }
    }

    /// Number of enemies currently tracked.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Phase of the enemy's navigator, if it is tracked.
    #[must_use]
    pub fn phase(&self, enemy: EnemyId) -> Option<AgentPhase> {
        self.agents.get(&enemy).map(|agent| agent.phase)
    }

    /// Number of searches requested on behalf of the enemy since it became
    /// tracked.
    #[must_use]
    pub fn search_count(&self, enemy: EnemyId) -> Option<u32> {
        self.agents.get(&enemy).map(|agent| agent.searches)
    }

    /// Remaining cached route of the enemy, if it is tracked.
    #[must_use]
    pub fn cached_path(&self, enemy: EnemyId) -> Option<&Path> {
        self.agents.get(&enemy).map(|agent| &agent.path)
    }

    /// Planner used for route searches.
    #[must_use]
    pub fn planner(&self) -> &P {
        &self.planner
    }
}

#[derive(Debug, Default)]
struct AgentNavigator {
    path: Path,
    phase: AgentPhase,
    searches: u32,
}

impl AgentNavigator {
    /// A cached route is reused only while it still ends at the target and
    /// starts next to the enemy.
    fn needs_search(&self, current: CellCoord, target: CellCoord) -> bool {
        if self.path.last() != Some(target) {
            return true;
        }

        self.path
            .first()
            .and_then(|next| current.direction_to(next))
            .is_none()
    }

    fn next_direction(&mut self, current: CellCoord) -> Option<Direction> {
        let next = self.path.first()?;
        let direction = current.direction_to(next)?;
        let _ = self.path.pop_front();
        Some(direction)
    }
}
