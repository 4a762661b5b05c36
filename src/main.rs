//! Quiver headless runner
//!
//! Builds a world from optional JSON settings and plays a scripted duel at a
//! fixed timestep, logging gameplay events. Set `RUST_LOG=debug` for per-tick
//! detail.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use quiver::WorldError;
    use quiver::assets::TextureHolder;
    use quiver::audio::{AudioSink, SoundEffect, SoundPlayer};
    use quiver::consts::SIM_DT;
    use quiver::input::{AimGrid, InputSource, PlayerInput, ScriptedInput, TickInput};
    use quiver::render::DrawList;
    use quiver::settings::Settings;
    use quiver::sim::World;

    /// Upper bound on simulated ticks (20 seconds)
    const MAX_TICKS: u64 = 60 * 20;

    /// Both archers settle, then trade shots across the platform
    fn duel_script() -> Vec<TickInput> {
        let idle = TickInput::default();
        let mut frames = vec![idle; 60];

        let p1_aim = PlayerInput {
            aim: AimGrid::new(2, 0),
            ..PlayerInput::default()
        };
        let p1_shoot = PlayerInput { fire: true, ..p1_aim };
        let p2_hop = PlayerInput {
            aim: AimGrid::new(1, 1),
            jump: true,
            run: -1,
            ..PlayerInput::default()
        };
        let p2_shoot = PlayerInput {
            aim: AimGrid::new(1, 1),
            fire: true,
            ..PlayerInput::default()
        };

        frames.extend(std::iter::repeat_n(TickInput { players: [p1_aim, idle.players[1]] }, 20));
        frames.extend(std::iter::repeat_n(TickInput { players: [p1_shoot, p2_hop] }, 5));
        frames.extend(std::iter::repeat_n(TickInput { players: [p1_aim, p2_shoot] }, 30));
        frames.extend(std::iter::repeat_n(TickInput { players: [p1_shoot, idle.players[1]] }, 30));
        frames
    }

    fn seed(settings: &Settings) -> u64 {
        settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
    }

    pub fn run() -> Result<(), WorldError> {
        let settings_path = std::env::args().nth(1).map(PathBuf::from);
        let settings = Settings::load_or_default(settings_path.as_deref())?;

        let seed = seed(&settings);
        log::info!("Quiver starting with seed {}", seed);
        let mut rng = Pcg32::seed_from_u64(seed);

        let textures = TextureHolder::with_defaults();
        let mut world = World::new(settings.clone(), &textures, &mut rng)?;

        let mut audio = SoundPlayer::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.play(SoundEffect::MenuStart);
        world.set_audio(Box::new(audio));

        let mut input = ScriptedInput::new(duel_script());
        let mut frame = DrawList::new();
        for tick in 0..MAX_TICKS {
            world.update(SIM_DT, &input.poll())?;
            for event in world.events() {
                log::info!("tick {}: {:?}", tick, event);
            }

            frame.clear();
            world.draw(&mut frame);
            log::trace!("tick {}: {} draw calls", tick, frame.len());

            if let Some(winner) = world.winner() {
                log::info!("Player {} wins after {} ticks", winner, tick + 1);
                return Ok(());
            }
            if input.is_finished() && world.projectiles().is_empty() && tick > 300 {
                break;
            }
        }

        for slot in [1, 2] {
            if let Some(character) = world.player(slot) {
                log::info!(
                    "Player {}: {} arrows, {}",
                    slot,
                    character.arrows(),
                    if character.is_dead() { "dead" } else { "alive" }
                );
            }
        }
        log::info!("No winner on {}", world.map_name());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is the deliverable on wasm
}
