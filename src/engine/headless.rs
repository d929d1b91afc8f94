//! In-memory engine for hosts without a real physics engine
//!
//! Records bodies and loop state, and replays a scripted finish order as
//! collision-start batches. No integration happens here.

use std::collections::{HashMap, VecDeque};

use super::{
    BodyDef, BodyLabel, CollisionBatch, CollisionPair, CollisionSink, PhysicsEngine, WorldConfig,
    WorldId,
};
use crate::error::EngineError;
use crate::sim::RacerId;

/// One world as the headless engine tracks it
#[derive(Debug)]
pub struct HeadlessWorld {
    pub config: WorldConfig,
    bodies: Vec<BodyDef>,
    sinks: Vec<CollisionSink>,
    rendering: bool,
    running: bool,
    steps: u64,
}

impl HeadlessWorld {
    pub fn bodies(&self) -> &[BodyDef] {
        &self.bodies
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Headless stand-in for the physics engine
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    worlds: HashMap<WorldId, HeadlessWorld>,
    next_world: u32,
    script: VecDeque<RacerId>,
    finish_every: u64,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue racers to cross the finish sensor, one every `every_steps` steps
    pub fn script_finishes(&mut self, order: impl IntoIterator<Item = RacerId>, every_steps: u64) {
        self.script = order.into_iter().collect();
        self.finish_every = every_steps.max(1);
    }

    /// Racers still waiting to finish
    pub fn scripted_remaining(&self) -> usize {
        self.script.len()
    }

    pub fn world(&self, id: WorldId) -> Option<&HeadlessWorld> {
        self.worlds.get(&id)
    }

    /// Worlds created and not yet cleared
    pub fn live_worlds(&self) -> usize {
        self.worlds.len()
    }

    /// Deliver one batch to every subscriber of `world`
    ///
    /// Subscribers whose receiver was dropped are forgotten. Returns the number
    /// of subscribers reached.
    pub fn emit(&mut self, world: WorldId, batch: CollisionBatch) -> usize {
        let Some(state) = self.worlds.get_mut(&world) else {
            return 0;
        };
        state.sinks.retain(|sink| sink.send(batch.clone()).is_ok());
        state.sinks.len()
    }

    /// Advance every running world by one step
    pub fn step(&mut self) {
        let mut due = Vec::new();
        for (id, world) in self.worlds.iter_mut() {
            if !world.running {
                continue;
            }
            world.steps += 1;
            if self.finish_every > 0 && world.steps % self.finish_every == 0 {
                due.push(*id);
            }
        }
        for id in due {
            let Some(racer) = self.script.pop_front() else {
                break;
            };
            let ball = BodyLabel::Ball(racer).as_label();
            // bodyA/bodyB order is arbitrary in real engines
            let pair = if racer.get() % 2 == 0 {
                CollisionPair::new(BodyLabel::FINISH, ball)
            } else {
                CollisionPair::new(ball, BodyLabel::FINISH)
            };
            self.emit(id, vec![pair]);
        }
    }

    fn world_mut(&mut self, id: WorldId) -> Result<&mut HeadlessWorld, EngineError> {
        self.worlds
            .get_mut(&id)
            .ok_or(EngineError::UnknownWorld(id.0))
    }
}

impl PhysicsEngine for HeadlessEngine {
    fn create_world(&mut self, config: &WorldConfig) -> Result<WorldId, EngineError> {
        let id = WorldId(self.next_world);
        self.next_world += 1;
        self.worlds.insert(
            id,
            HeadlessWorld {
                config: *config,
                bodies: Vec::new(),
                sinks: Vec::new(),
                rendering: false,
                running: false,
                steps: 0,
            },
        );
        Ok(id)
    }

    fn add_bodies(&mut self, world: WorldId, bodies: &[BodyDef]) -> Result<(), EngineError> {
        self.world_mut(world)?.bodies.extend_from_slice(bodies);
        Ok(())
    }

    fn subscribe_collisions(
        &mut self,
        world: WorldId,
        sink: CollisionSink,
    ) -> Result<(), EngineError> {
        self.world_mut(world)?.sinks.push(sink);
        Ok(())
    }

    fn start_render(&mut self, world: WorldId) -> Result<(), EngineError> {
        self.world_mut(world)?.rendering = true;
        Ok(())
    }

    fn stop_render(&mut self, world: WorldId) -> Result<(), EngineError> {
        self.world_mut(world)?.rendering = false;
        Ok(())
    }

    fn start_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
        self.world_mut(world)?.running = true;
        Ok(())
    }

    fn stop_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
        self.world_mut(world)?.running = false;
        Ok(())
    }

    fn clear_world(&mut self, world: WorldId) -> Result<(), EngineError> {
        self.worlds
            .remove(&world)
            .map(|_| ())
            .ok_or(EngineError::UnknownWorld(world.0))
    }
}
