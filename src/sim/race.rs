//! Race lifecycle
//!
//! `RaceController` owns one `RaceSession` per race and drives
//! Building → Running → AllFinished → Podium. Everything is single-threaded:
//! the host forwards the engine's notifications and its own frame callbacks:
//!
//! - `poll` once per host frame (drains collision batches, fires the podium timer)
//! - `after_render` from the engine's render-complete hook (overlay repaint)
//! - `animation_frame` from the display-refresh callback while fireworks run

use std::sync::mpsc::{self, Receiver, Sender};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::arena::Arena;
use super::finish::FinishTracker;
use super::particles::ParticleSimulator;
use super::state::{FinishRecord, RaceEvent, RacePhase, RaceSnapshot, Standing};
use crate::celebration_point;
use crate::consts::{ARENA_WIDTH, FINISH_Y, RACER_COUNT};
use crate::engine::{CollisionBatch, CollisionPair, PhysicsEngine, WorldId};
use crate::error::RaceError;
use crate::platform::Clock;
use crate::podium::PodiumSummary;
use crate::renderer::{DrawSurface, OverlayRenderer};
use crate::settings::Settings;

/// Handles that live exactly as long as one race
#[derive(Debug)]
pub struct RaceSession {
    world: WorldId,
    arena: Arena,
    collisions: Option<Receiver<CollisionBatch>>,
    overlay_hooked: bool,
    rendering: bool,
    running: bool,
}

impl RaceSession {
    fn new(world: WorldId, arena: Arena) -> Self {
        Self {
            world,
            arena,
            collisions: None,
            overlay_hooked: false,
            rendering: false,
            running: false,
        }
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Drain every batch the engine has delivered so far
    fn pending_batches(&self) -> Vec<CollisionBatch> {
        self.collisions
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default()
    }
}

/// Top-level race state machine
pub struct RaceController<E: PhysicsEngine, S: DrawSurface, C: Clock> {
    engine: E,
    surface: S,
    clock: C,
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    overlay: OverlayRenderer,
    phase: RacePhase,
    session: Option<RaceSession>,
    tracker: FinishTracker,
    /// First-finish latch, reset on every build
    celebrated: bool,
    /// Podium timer deadline (clock ms)
    podium_due_ms: Option<f64>,
    fireworks: ParticleSimulator,
    subscribers: Vec<Sender<RaceEvent>>,
}

impl<E: PhysicsEngine, S: DrawSurface, C: Clock> RaceController<E, S, C> {
    pub fn new(engine: E, surface: S, clock: C, settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Race controller ready (seed {seed})");
        Self {
            engine,
            surface,
            clock,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            overlay: OverlayRenderer::new(ARENA_WIDTH, FINISH_Y),
            settings,
            phase: RacePhase::Idle,
            session: None,
            tracker: FinishTracker::new(),
            celebrated: false,
            podium_due_ms: None,
            fireworks: ParticleSimulator::new(),
            subscribers: Vec::new(),
        }
    }

    /// Build a fresh arena and start racing
    pub fn start(&mut self) -> Result<(), RaceError> {
        self.rebuild()
    }

    /// Throw the current race away and start a new one
    pub fn reset(&mut self) -> Result<(), RaceError> {
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<(), RaceError> {
        self.cleanup();

        self.phase = RacePhase::Building;
        self.tracker = FinishTracker::new();
        self.celebrated = false;
        self.publish(RaceEvent::Building);

        match self.build_session() {
            Ok(session) => {
                log::info!(
                    "Race started: world {:?}, {} bodies",
                    session.world,
                    session.arena.bodies.len()
                );
                self.session = Some(session);
                self.phase = RacePhase::Running;
                self.publish(RaceEvent::Running);
                Ok(())
            }
            Err(e) => {
                log::error!("Race setup failed: {e}");
                self.phase = RacePhase::Idle;
                Err(e)
            }
        }
    }

    fn build_session(&mut self) -> Result<RaceSession, RaceError> {
        let arena = Arena::build(&mut self.rng);
        let world = self.engine.create_world(&arena.world_config())?;
        let mut session = RaceSession::new(world, arena);
        if let Err(e) = self.wire_session(&mut session) {
            // Half-built: release whatever did start
            self.release(session);
            return Err(e);
        }
        Ok(session)
    }

    fn wire_session(&mut self, session: &mut RaceSession) -> Result<(), RaceError> {
        let world = session.world;
        self.engine.add_bodies(world, &session.arena.bodies)?;

        let (tx, rx) = mpsc::channel();
        self.engine.subscribe_collisions(world, tx)?;
        session.collisions = Some(rx);

        self.engine.start_render(world)?;
        session.rendering = true;
        session.overlay_hooked = true;

        self.engine.start_runner(world)?;
        session.running = true;
        Ok(())
    }

    /// Release every per-race resource
    ///
    /// Safe from any state and before any build. Each resource is released on
    /// its own; failures are logged and the rest still get released.
    pub fn cleanup(&mut self) {
        self.fireworks.stop();
        self.podium_due_ms = None;
        if let Err(e) = self.surface.clear() {
            log::warn!("Teardown: failed to clear overlay: {e}");
        }
        if let Some(session) = self.session.take() {
            self.release(session);
            self.publish(RaceEvent::TornDown);
        }
        self.phase = RacePhase::Idle;
    }

    fn release(&mut self, mut session: RaceSession) {
        let world = session.world;
        session.overlay_hooked = false;
        if session.rendering {
            if let Err(e) = self.engine.stop_render(world) {
                log::error!("Teardown: failed to stop render loop: {e}");
            }
            session.rendering = false;
        }
        if session.running {
            if let Err(e) = self.engine.stop_runner(world) {
                log::error!("Teardown: failed to stop runner: {e}");
            }
            session.running = false;
        }
        // Dropping the receiver unsubscribes from the collision stream
        session.collisions = None;
        if let Err(e) = self.engine.clear_world(world) {
            log::error!("Teardown: failed to clear world {world:?}: {e}");
        }
        log::debug!("Released world {world:?}");
    }

    /// Route one step's collision-start pairs through the finish tracker
    ///
    /// Pairs are handled in the order given; same-step ties keep engine order.
    pub fn on_collision_start(&mut self, pairs: &[CollisionPair]) {
        if self.session.is_none() {
            return;
        }
        let now = self.clock.now_ms();
        for pair in pairs {
            if let Some(record) = self.tracker.on_collision(&pair.label_a, &pair.label_b, now) {
                self.on_finish(record, now);
            }
        }
    }

    fn on_finish(&mut self, record: FinishRecord, now: f64) {
        let place = self.tracker.len();
        log::info!("{} finished #{place}", record.racer.display_name());
        self.publish(RaceEvent::Finished(Standing::from_record(place, &record)));

        // Ranking grew from 0 to 1
        if place == 1 && !self.celebrated {
            self.celebrated = true;
            self.celebrate();
        }
        if place == RACER_COUNT {
            self.phase = RacePhase::AllFinished;
            self.podium_due_ms = Some(now + self.settings.podium_delay_ms as f64);
            log::info!("All racers finished, podium in {} ms", self.settings.podium_delay_ms);
            self.publish(RaceEvent::AllFinished);
        }
    }

    fn celebrate(&mut self) {
        let (width, finish_y) = self
            .session
            .as_ref()
            .map(|s| (s.arena.width, s.arena.finish_y))
            .unwrap_or((ARENA_WIDTH, FINISH_Y));
        let origin = celebration_point(width, finish_y);
        if self.settings.effective_celebration() {
            self.fireworks.burst(origin, &mut self.rng);
        }
        self.publish(RaceEvent::Celebration { origin });
    }

    /// Per-frame housekeeping: drain collision batches and fire the podium timer
    ///
    /// Returns the number of batches processed.
    pub fn poll(&mut self) -> usize {
        let batches = self
            .session
            .as_ref()
            .map(RaceSession::pending_batches)
            .unwrap_or_default();
        for batch in &batches {
            self.on_collision_start(batch);
        }

        if let Some(due) = self.podium_due_ms {
            if self.phase == RacePhase::AllFinished && self.clock.now_ms() >= due {
                self.podium_due_ms = None;
                self.phase = RacePhase::Podium;
                log::info!("Podium");
                self.publish(RaceEvent::PodiumShown);
            }
        }
        batches.len()
    }

    /// Engine render-complete hook: repaint the overlay (band, labels, sparks)
    pub fn after_render(&mut self) {
        if !self.overlay_hooked() {
            return;
        }
        if let Err(e) = self
            .overlay
            .draw_frame(&mut self.surface, true, self.fireworks.frame())
        {
            log::warn!("Overlay draw failed: {e}");
        }
    }

    /// Display-refresh callback for the fireworks loop
    ///
    /// Returns whether another frame should be requested.
    pub fn animation_frame(&mut self) -> bool {
        if !self.fireworks.is_running() {
            return false;
        }
        let with_static = self.overlay_hooked();
        let frame = self.fireworks.tick();
        if let Err(e) = self.overlay.draw_frame(&mut self.surface, with_static, frame) {
            log::warn!("Fireworks draw failed: {e}");
        }
        if self.fireworks.is_running() {
            return true;
        }
        // Burned out: repaint without sparks
        self.fireworks.stop();
        if let Err(e) = self.overlay.draw_frame(&mut self.surface, with_static, &[]) {
            log::warn!("Failed to clear fireworks: {e}");
        }
        false
    }

    fn overlay_hooked(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.overlay_hooked)
    }

    /// Observe lifecycle and ranking changes, delivered in order
    pub fn subscribe(&mut self) -> Receiver<RaceEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: RaceEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    /// Finishers in order, with places and colours
    pub fn ranking(&self) -> Vec<Standing> {
        self.tracker.standings()
    }

    pub fn finish_records(&self) -> &[FinishRecord] {
        self.tracker.ranking()
    }

    pub fn is_podium_visible(&self) -> bool {
        self.phase == RacePhase::Podium
    }

    /// Fireworks are playing
    pub fn is_celebrating(&self) -> bool {
        self.fireworks.is_running()
    }

    /// Podium contents, once the podium is showing
    pub fn podium(&self) -> Option<PodiumSummary> {
        self.is_podium_visible()
            .then(|| PodiumSummary::from_ranking(&self.ranking()))
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            phase: self.phase,
            ranking: self.ranking(),
            podium_visible: self.is_podium_visible(),
            celebrating: self.is_celebrating(),
            live_particles: self.fireworks.live_count(),
        }
    }

    pub fn session(&self) -> Option<&RaceSession> {
        self.session.as_ref()
    }

    pub fn fireworks(&self) -> &ParticleSimulator {
        &self.fireworks
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<E: PhysicsEngine, S: DrawSurface, C: Clock> Drop for RaceController<E, S, C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BURST_PARTICLES;
    use crate::engine::{BodyDef, CollisionSink, HeadlessEngine, WorldConfig};
    use crate::error::EngineError;
    use crate::platform::ManualClock;
    use crate::renderer::{DrawCommand, RecordingSurface};
    use crate::sim::RacerId;

    type Controller = RaceController<HeadlessEngine, RecordingSurface, ManualClock>;

    fn controller() -> (Controller, ManualClock) {
        let clock = ManualClock::new();
        let controller = RaceController::new(
            HeadlessEngine::new(),
            RecordingSurface::new(800.0, 600.0),
            clock.clone(),
            Settings::default().with_seed(7),
        );
        (controller, clock)
    }

    fn finish(c: &mut Controller, id: u8) {
        c.on_collision_start(&[CollisionPair::new(format!("ball_{id}"), "finish")]);
    }

    fn ranked_ids(c: &Controller) -> Vec<u8> {
        c.ranking().iter().map(|s| s.racer.get()).collect()
    }

    #[test]
    fn start_builds_and_runs_the_arena() {
        let (mut c, _) = controller();
        let events = c.subscribe();
        c.start().unwrap();

        assert_eq!(c.phase(), RacePhase::Running);
        let world = c.session().unwrap().world();
        let state = c.engine().world(world).unwrap();
        assert!(state.is_running());
        assert!(state.is_rendering());
        assert_eq!(state.subscriber_count(), 1);
        assert_eq!(state.bodies().len(), c.session().unwrap().arena().bodies.len());
        assert_eq!(state.config.gravity_y, 1.1);

        let seen: Vec<RaceEvent> = events.try_iter().collect();
        assert_eq!(seen, vec![RaceEvent::Building, RaceEvent::Running]);
    }

    #[test]
    fn scenario_full_race_order_celebration_and_podium() {
        let (mut c, clock) = controller();
        c.start().unwrap();
        let events = c.subscribe();

        for (i, id) in [2u8, 0, 4, 1, 3].into_iter().enumerate() {
            clock.advance(100.0);
            finish(&mut c, id);
            c.poll();
            if i == 0 {
                assert!(c.is_celebrating());
            }
            if i < 4 {
                assert!(!c.is_podium_visible());
            }
        }
        assert_eq!(ranked_ids(&c), vec![2, 0, 4, 1, 3]);
        assert_eq!(c.phase(), RacePhase::AllFinished);

        clock.advance(1299.0);
        c.poll();
        assert!(!c.is_podium_visible());
        clock.advance(1.0);
        c.poll();
        assert!(c.is_podium_visible());
        assert_eq!(c.podium().unwrap().champion().unwrap().racer.get(), 2);

        let seen: Vec<RaceEvent> = events.try_iter().collect();
        let celebration = seen
            .iter()
            .position(|e| matches!(e, RaceEvent::Celebration { .. }))
            .unwrap();
        assert!(matches!(&seen[celebration - 1], RaceEvent::Finished(s) if s.racer.get() == 2));
        assert!(matches!(&seen[celebration + 1], RaceEvent::Finished(s) if s.racer.get() == 0));
        assert_eq!(
            seen.iter()
                .filter(|e| matches!(e, RaceEvent::Celebration { .. }))
                .count(),
            1
        );
        assert_eq!(seen.last(), Some(&RaceEvent::PodiumShown));
    }

    #[test]
    fn celebration_launches_from_above_the_finish_line() {
        let (mut c, _) = controller();
        c.start().unwrap();
        let events = c.subscribe();
        finish(&mut c, 1);
        let origin = events
            .try_iter()
            .find_map(|e| match e {
                RaceEvent::Celebration { origin } => Some(origin),
                _ => None,
            })
            .unwrap();
        assert_eq!(origin, glam::Vec2::new(400.0, 500.0));
        assert_eq!(c.fireworks().live_count(), BURST_PARTICLES);
    }

    #[test]
    fn duplicate_sensor_overlap_is_ignored() {
        let (mut c, _) = controller();
        c.start().unwrap();
        finish(&mut c, 0);
        finish(&mut c, 3);
        finish(&mut c, 0);
        assert_eq!(ranked_ids(&c), vec![0, 3]);
    }

    #[test]
    fn same_step_finishes_keep_engine_order() {
        let (mut c, _) = controller();
        c.start().unwrap();
        c.on_collision_start(&[
            CollisionPair::new("finish", "ball_4"),
            CollisionPair::new("ball_1", "finish"),
        ]);
        assert_eq!(ranked_ids(&c), vec![4, 1]);
    }

    #[test]
    fn collisions_flow_through_the_engine_stream() {
        let (mut c, _) = controller();
        c.start().unwrap();
        let world = c.session().unwrap().world();
        c.engine_mut()
            .emit(world, vec![CollisionPair::new("ball_2", "finish")]);
        c.engine_mut().emit(
            world,
            vec![
                CollisionPair::new("ball_2", "peg"),
                CollisionPair::new("finish", "ball_2"),
            ],
        );
        assert_eq!(c.poll(), 2);
        assert_eq!(ranked_ids(&c), vec![2]);
    }

    #[test]
    fn celebration_fires_once_per_race() {
        let (mut c, _) = controller();
        c.start().unwrap();
        let events = c.subscribe();
        finish(&mut c, 0);
        while c.animation_frame() {}
        assert!(!c.is_celebrating());
        finish(&mut c, 1);
        finish(&mut c, 2);
        assert!(!c.is_celebrating());
        let celebrations = events
            .try_iter()
            .filter(|e| matches!(e, RaceEvent::Celebration { .. }))
            .count();
        assert_eq!(celebrations, 1);

        // ...and again after a reset
        c.reset().unwrap();
        finish(&mut c, 4);
        assert!(c.is_celebrating());
    }

    fn circles(c: &Controller) -> usize {
        c.surface()
            .visible()
            .iter()
            .filter(|d| matches!(d, DrawCommand::Circle { .. }))
            .count()
    }

    fn bands(c: &Controller) -> usize {
        c.surface()
            .visible()
            .iter()
            .filter(|d| matches!(d, DrawCommand::Rect { .. }))
            .count()
    }

    #[test]
    fn fireworks_loop_ends_with_only_the_static_overlay() {
        let (mut c, _) = controller();
        c.start().unwrap();
        finish(&mut c, 0);
        let mut frames = 0;
        while c.animation_frame() {
            frames += 1;
            assert!(circles(&c) > 0);
            assert_eq!(bands(&c), 1);
        }
        assert!((35..=70).contains(&(frames + 1)));
        assert_eq!(circles(&c), 0);
        assert_eq!(c.surface().visible().len(), 3);
        assert_eq!(c.fireworks().live_count(), 0);
        assert!(!c.animation_frame());
    }

    #[test]
    fn repeated_render_hooks_keep_a_single_band() {
        let (mut c, _) = controller();
        c.start().unwrap();
        for _ in 0..10 {
            c.after_render();
        }
        assert_eq!(bands(&c), 1);
        assert_eq!(c.surface().visible().len(), 3);
    }

    #[test]
    fn render_hook_and_fireworks_share_one_frame() {
        let (mut c, _) = controller();
        c.start().unwrap();
        finish(&mut c, 2);
        c.animation_frame();
        c.after_render();
        // the render hook repaints the sparks instead of wiping them
        assert_eq!(circles(&c), BURST_PARTICLES);
        assert_eq!(bands(&c), 1);
        c.animation_frame();
        assert_eq!(circles(&c), BURST_PARTICLES);
        assert_eq!(bands(&c), 1);
    }

    #[test]
    fn reduced_motion_skips_particles_but_keeps_latch() {
        let clock = ManualClock::new();
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default().with_seed(1)
        };
        let mut c = RaceController::new(
            HeadlessEngine::new(),
            RecordingSurface::new(800.0, 600.0),
            clock,
            settings,
        );
        c.start().unwrap();
        let events = c.subscribe();
        finish(&mut c, 0);
        assert!(!c.is_celebrating());
        assert!(
            events
                .try_iter()
                .any(|e| matches!(e, RaceEvent::Celebration { .. }))
        );
    }

    #[test]
    fn reset_mid_race_clears_everything_and_cancels_podium() {
        let (mut c, clock) = controller();
        c.start().unwrap();
        let old_world = c.session().unwrap().world();
        for id in [0, 1, 2] {
            finish(&mut c, id);
        }
        c.animation_frame();
        assert!(c.is_celebrating());

        c.reset().unwrap();
        assert!(c.ranking().is_empty());
        assert!(!c.is_celebrating());
        assert!(c.surface().is_blank());
        assert!(c.engine().world(old_world).is_none());
        assert_eq!(c.engine().live_worlds(), 1);
        // late batches for the old arena go nowhere
        assert_eq!(
            c.engine_mut()
                .emit(old_world, vec![CollisionPair::new("ball_3", "finish")]),
            0
        );

        clock.advance(5000.0);
        c.poll();
        assert!(!c.is_podium_visible());
        assert_eq!(c.phase(), RacePhase::Running);
    }

    #[test]
    fn reset_during_podium_delay_cancels_it() {
        let (mut c, clock) = controller();
        c.start().unwrap();
        for id in 0..5 {
            finish(&mut c, id);
        }
        assert_eq!(c.phase(), RacePhase::AllFinished);
        clock.advance(1000.0);
        c.reset().unwrap();
        for id in 0..3 {
            finish(&mut c, id);
        }
        clock.advance(1000.0);
        c.poll();
        assert!(!c.is_podium_visible());
    }

    #[test]
    fn ranking_only_grows_within_a_race() {
        let (mut c, _) = controller();
        c.start().unwrap();
        let mut last = 0;
        for label in ["ball_0", "peg", "ball_0", "ball_3", "bumper", "ball_1"] {
            c.on_collision_start(&[CollisionPair::new(label, "finish")]);
            assert!(c.ranking().len() >= last);
            last = c.ranking().len();
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn static_overlay_only_draws_while_hooked() {
        let (mut c, _) = controller();
        c.after_render();
        assert!(c.surface().commands().iter().all(|d| *d == DrawCommand::Clear));
        c.start().unwrap();
        c.after_render();
        assert_eq!(c.surface().visible().len(), 3);
        c.cleanup();
        c.after_render();
        assert!(c.surface().is_blank());
    }

    #[test]
    fn teardown_is_idempotent_and_safe_before_build() {
        let (mut c, _) = controller();
        c.cleanup();
        c.cleanup();
        assert_eq!(c.phase(), RacePhase::Idle);

        c.start().unwrap();
        c.cleanup();
        c.cleanup();
        assert_eq!(c.phase(), RacePhase::Idle);
        assert_eq!(c.engine().live_worlds(), 0);
    }

    #[test]
    fn collisions_without_a_session_are_ignored() {
        let (mut c, _) = controller();
        finish(&mut c, 0);
        assert!(c.ranking().is_empty());
    }

    #[test]
    fn same_seed_same_launch_velocities() {
        let velocities = || -> Vec<glam::Vec2> {
            let (mut c, _) = controller();
            c.start().unwrap();
            assert_eq!(c.seed(), 7);
            c.session().unwrap().arena().balls().map(|b| b.velocity).collect()
        };
        assert_eq!(velocities(), velocities());
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut c, _) = controller();
        c.start().unwrap();
        finish(&mut c, 3);
        let snapshot = c.snapshot();
        assert_eq!(snapshot.phase, RacePhase::Running);
        assert_eq!(snapshot.ranking.len(), 1);
        assert_eq!(snapshot.ranking[0].racer, RacerId::new(3).unwrap());
        assert!(snapshot.celebrating);
        assert_eq!(snapshot.live_particles, BURST_PARTICLES);
        assert!(!snapshot.podium_visible);
    }

    /// Wraps the headless engine with switchable failures
    #[derive(Default)]
    struct FlakyEngine {
        inner: HeadlessEngine,
        fail_create: bool,
        fail_start_runner: bool,
        fail_stop_render: bool,
        fail_clear: bool,
        stop_runner_calls: usize,
    }

    impl PhysicsEngine for FlakyEngine {
        fn create_world(&mut self, config: &WorldConfig) -> Result<WorldId, EngineError> {
            if self.fail_create {
                return Err(EngineError::WorldCreation("no canvas context".into()));
            }
            self.inner.create_world(config)
        }

        fn add_bodies(&mut self, world: WorldId, bodies: &[BodyDef]) -> Result<(), EngineError> {
            self.inner.add_bodies(world, bodies)
        }

        fn subscribe_collisions(
            &mut self,
            world: WorldId,
            sink: CollisionSink,
        ) -> Result<(), EngineError> {
            self.inner.subscribe_collisions(world, sink)
        }

        fn start_render(&mut self, world: WorldId) -> Result<(), EngineError> {
            self.inner.start_render(world)
        }

        fn stop_render(&mut self, world: WorldId) -> Result<(), EngineError> {
            if self.fail_stop_render {
                return Err(EngineError::Render("canvas already detached".into()));
            }
            self.inner.stop_render(world)
        }

        fn start_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
            if self.fail_start_runner {
                return Err(EngineError::Runner("refused".into()));
            }
            self.inner.start_runner(world)
        }

        fn stop_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
            self.stop_runner_calls += 1;
            self.inner.stop_runner(world)
        }

        fn clear_world(&mut self, world: WorldId) -> Result<(), EngineError> {
            if self.fail_clear {
                return Err(EngineError::Other("textures busy".into()));
            }
            self.inner.clear_world(world)
        }
    }

    fn flaky(engine: FlakyEngine) -> RaceController<FlakyEngine, RecordingSurface, ManualClock> {
        RaceController::new(
            engine,
            RecordingSurface::new(800.0, 600.0),
            ManualClock::new(),
            Settings::default().with_seed(3),
        )
    }

    #[test]
    fn setup_failure_is_surfaced() {
        let mut c = flaky(FlakyEngine {
            fail_create: true,
            ..Default::default()
        });
        let err = c.start().unwrap_err();
        assert!(matches!(err, RaceError::Engine(EngineError::WorldCreation(_))));
        assert_eq!(c.phase(), RacePhase::Idle);
        assert!(c.session().is_none());

        // retried only on explicit action
        c.engine_mut().fail_create = false;
        c.reset().unwrap();
        assert_eq!(c.phase(), RacePhase::Running);
    }

    #[test]
    fn half_built_arena_is_released() {
        let mut c = flaky(FlakyEngine {
            fail_start_runner: true,
            ..Default::default()
        });
        assert!(matches!(c.start(), Err(RaceError::Engine(EngineError::Runner(_)))));
        assert_eq!(c.engine().inner.live_worlds(), 0);
        // the runner never started, so it is not stopped either
        assert_eq!(c.engine().stop_runner_calls, 0);
    }

    #[test]
    fn one_failing_resource_does_not_block_the_others() {
        let mut c = flaky(FlakyEngine::default());
        c.start().unwrap();
        let world = c.session().unwrap().world();
        c.engine_mut().fail_stop_render = true;

        c.reset().unwrap();
        assert_eq!(c.engine().stop_runner_calls, 1);
        assert!(c.engine().inner.world(world).is_none());
        assert_eq!(c.phase(), RacePhase::Running);
    }

    #[test]
    fn failing_world_clear_is_swallowed() {
        let mut c = flaky(FlakyEngine::default());
        c.start().unwrap();
        c.engine_mut().fail_clear = true;
        c.cleanup();
        c.cleanup();
        assert!(c.session().is_none());
        assert_eq!(c.phase(), RacePhase::Idle);
    }
}
