//! Coin Dodge entry point
//!
//! Headless native runner: loads settings and the roster, then plays one
//! session at a fixed 60 Hz step and logs the result.
//!
//! Usage: `coin-dodge [settings.json]` (or set `COIN_DODGE_SETTINGS`)

use std::path::PathBuf;

use coin_dodge::platform::{IdleInput, LogHud, NullRenderer, ScriptedInput, SilentAudio};
use coin_dodge::sim::TickInput;
use coin_dodge::{Game, Roster, Settings};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Enough frames for a full session plus slack
const MAX_FRAMES: u64 = 60 * 200;

fn main() {
    env_logger::init();
    log::info!("Coin Dodge (headless) starting...");

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref());

    let roster = match &settings.roster_path {
        Some(path) => Roster::load_or_bundled(path),
        None => Roster::bundled(),
    };
    if roster.is_empty() {
        log::warn!("No coins available; the sky will stay empty");
    }

    let summary = if settings.autopilot {
        let mut game = Game::new(
            roster,
            settings,
            IdleInput,
            NullRenderer::default(),
            LogHud::default(),
            Box::new(SilentAudio::default()),
        );
        game.run(FRAME_DT, MAX_FRAMES)
    } else {
        // Without the autopilot nobody moves: the player stands at the origin
        let input = ScriptedInput::new(Vec::new()).then(TickInput::default());
        let mut game = Game::new(
            roster,
            settings,
            input,
            NullRenderer::default(),
            LogHud::default(),
            Box::new(SilentAudio::default()),
        );
        game.run(FRAME_DT, MAX_FRAMES)
    };

    match summary {
        Some(summary) => {
            let outcome = if summary.health_depleted {
                "out of health"
            } else {
                "time up"
            };
            log::info!(
                "Game over ({outcome}): score {}, dodged {}, hit {}, survived {}",
                summary.score,
                summary.coins_dodged,
                summary.coins_hit,
                summary.time_survived()
            );
        }
        None => log::warn!("Session still running after {MAX_FRAMES} frames"),
    }
}
