use crate::clock::Clock;
use crate::session::{Audio, Cue};

const FLASH_MS: u64 = 250;

/// Terminal stand-in for a sound pool: the bell for start and miss cues,
/// plus a short colour flash for every cue so a muted terminal still gives
/// feedback.
pub(crate) struct TerminalAudio<C: Clock> {
    sound: bool,
    clock: C,
    pending_bells: u32,
    flash: Option<(Cue, u64)>,
}

impl<C: Clock> TerminalAudio<C> {
    pub(crate) fn new(sound: bool, clock: C) -> Self {
        Self {
            sound,
            clock,
            pending_bells: 0,
            flash: None,
        }
    }

    /// Bells queued since the last call.
    pub(crate) fn take_bells(&mut self) -> u32 {
        std::mem::take(&mut self.pending_bells)
    }

    pub(crate) fn flash(&self) -> Option<Cue> {
        match self.flash {
            Some((cue, at)) if self.clock.now_ms().saturating_sub(at) < FLASH_MS => Some(cue),
            _ => None,
        }
    }
}

impl<C: Clock> Audio for TerminalAudio<C> {
    fn play_cue(&mut self, cue: Cue) {
        if self.sound && matches!(cue, Cue::Start | Cue::Incorrect) {
            // at most one bell per frame
            self.pending_bells = 1;
        }
        self.flash = Some((cue, self.clock.now_ms()));
    }
}
