//! Peg Race entry point
//!
//! Web: sets up logging and the panic hook; the page then drives a `WebRace`.
//! Native: runs one seeded race against the headless engine and prints the podium.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
    }
    log::info!("Peg Race loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use rand::SeedableRng;
    use rand::seq::SliceRandom;
    use rand_pcg::Pcg32;

    use peg_race::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    use peg_race::engine::HeadlessEngine;
    use peg_race::platform::ManualClock;
    use peg_race::renderer::RecordingSurface;
    use peg_race::sim::{RaceController, RaceEvent, RacerId};
    use peg_race::Settings;

    type HeadlessRace = RaceController<HeadlessEngine, RecordingSurface, ManualClock>;

    /// 60 Hz
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Engine steps between scripted finishes
    const FINISH_SPACING: u64 = 45;
    /// Give up after two simulated minutes
    const MAX_FRAMES: u32 = 60 * 120;

    fn settings() -> Settings {
        let settings = Settings::default();
        match std::env::var("PEG_RACE_SEED") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(seed) => settings.with_seed(seed),
                Err(e) => {
                    eprintln!("Ignoring PEG_RACE_SEED={raw}: {e}");
                    settings
                }
            },
            Err(_) => settings,
        }
    }

    /// One 60 Hz host frame: engine step, collisions/timers, overlay
    ///
    /// The recorded draw calls are drained every frame so a long race does not
    /// accumulate them.
    fn step_frame(race: &mut HeadlessRace, clock: &ManualClock) {
        clock.advance(FRAME_MS);
        race.engine_mut().step();
        race.poll();
        race.after_render();
        if race.is_celebrating() {
            race.animation_frame();
        }
        race.surface_mut().take();
    }

    pub fn run() {
        let settings = settings();
        env_logger::Builder::new()
            .filter_level(settings.level_filter())
            .parse_default_env()
            .init();
        log::info!("Peg Race (headless) starting...");

        let clock = ManualClock::new();
        let mut race = RaceController::new(
            HeadlessEngine::new(),
            RecordingSurface::new(ARENA_WIDTH, ARENA_HEIGHT),
            clock.clone(),
            settings,
        );
        let events = race.subscribe();

        // Physics is not simulated here; the finish order comes from the seed
        let mut order: Vec<RacerId> = RacerId::all().collect();
        order.shuffle(&mut Pcg32::seed_from_u64(race.seed()));
        race.engine_mut().script_finishes(order, FINISH_SPACING);

        if let Err(e) = race.start() {
            log::error!("Could not start race: {e}");
            std::process::exit(1);
        }

        for _ in 0..MAX_FRAMES {
            step_frame(&mut race, &clock);
            for event in events.try_iter() {
                match event {
                    RaceEvent::Finished(standing) => log::info!(
                        "#{} {} at {:.0} ms",
                        standing.place,
                        standing.racer.display_name(),
                        standing.timestamp_ms
                    ),
                    other => log::debug!("{other:?}"),
                }
            }
            if race.is_podium_visible() {
                break;
            }
        }

        let Some(podium) = race.podium() else {
            log::warn!("Race did not reach the podium");
            return;
        };
        println!("\nPodium (seed {}):", race.seed());
        for step in &podium.steps {
            println!("  {}. {}", step.place, step.label());
        }
        for other in &podium.others {
            println!("  {}. {}", other.place, other.racer.display_name());
        }
        race.cleanup();
    }

}
