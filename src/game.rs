//! Frame driver
//!
//! Owns a session and its collaborators. Each frame: poll input, tick the
//! simulation, dispatch the tick's events to audio and HUD, then push the
//! render frame and HUD status.

use crate::audio::AudioMixer;
use crate::consts::MAX_FRAME_DT;
use crate::platform::{AudioOut, Hud, InputSource, Renderer};
use crate::roster::Roster;
use crate::settings::Settings;
use crate::sim::{GameOverSummary, Session, tick};
use crate::snapshot::{FrameSnapshot, HudMessage, HudStatus, ViewOptions};

/// A running game: one session plus the collaborators it drives
pub struct Game<I, R, H> {
    session: Session,
    settings: Settings,
    input: I,
    renderer: R,
    hud: H,
    audio: AudioMixer,
    frames: u64,
}

impl<I: InputSource, R: Renderer, H: Hud> Game<I, R, H> {
    pub fn new(
        roster: Roster,
        settings: Settings,
        input: I,
        renderer: R,
        hud: H,
        audio: Box<dyn AudioOut>,
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut session = Session::new(roster, seed);
        session.effects.set_budget(settings.max_effects());
        let audio = AudioMixer::with_settings(audio, &settings);

        let mut game = Self {
            session,
            settings,
            input,
            renderer,
            hud,
            audio,
            frames: 0,
        };
        // Session start events (music, "Get Ready!") go out before the first tick
        game.dispatch_events();
        game
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn view_options(&self) -> ViewOptions {
        ViewOptions {
            screen_shake: self.settings.effective_screen_shake(),
            hit_flash: self.settings.effective_hit_flash(),
        }
    }

    /// Run one frame of `dt` wall-clock seconds. Returns whether the session
    /// is still running afterwards.
    pub fn frame(&mut self, dt: f32) -> bool {
        let input = self.input.poll();
        let restarting = input.restart;
        tick(&mut self.session, &input, dt.min(MAX_FRAME_DT));
        if restarting {
            self.session.effects.set_budget(self.settings.max_effects());
        }
        self.frames += 1;

        self.dispatch_events();

        let frame = FrameSnapshot::build(&self.session, self.view_options());
        self.renderer.render(&frame);
        self.hud
            .apply(&HudMessage::Status(HudStatus::build(&self.session)));

        self.session.is_running()
    }

    /// Drive frames at a fixed `dt` until the session ends or `max_frames`
    /// have run. Returns the summary if the session ended.
    pub fn run(&mut self, dt: f32, max_frames: u64) -> Option<GameOverSummary> {
        for _ in 0..max_frames {
            if !self.frame(dt) {
                break;
            }
        }
        if self.session.is_running() {
            None
        } else {
            Some(self.session.summary())
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.session.drain_events() {
            self.audio.on_event(&event);
            if let Some(message) = HudMessage::from_event(&event) {
                self.hud.apply(&message);
            }
        }
    }
}
