//! Round lifecycle for the find-the-item game.
//!
//! The controller owns exactly one [`Round`] at a time and reaches the
//! screen and speaker only through [`View`] and [`Audio`]. Randomness and
//! time come in through [`RandomSource`] and [`Clock`] so rounds can be
//! replayed in tests.

use crate::catalog::{Catalog, ItemId};
use crate::clock::{format_seconds, Clock};
use crate::rng::{sample_distinct, RandomSource};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cue {
    Start,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScoreColor {
    Neutral,
    Highlight,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TargetStatus {
    pub(crate) name: &'static str,
    pub(crate) found: bool,
}

/// Outbound drawing requests.
pub(crate) trait View {
    fn render_tiles(&mut self, order: &[ItemId]);
    fn set_tile_highlighted(&mut self, item: ItemId, on: bool);
    fn set_status_title(&mut self, text: &str);
    fn set_status_targets(&mut self, targets: &[TargetStatus]);
    fn set_score_text(&mut self, text: &str, color: ScoreColor);
    fn set_start_enabled(&mut self, enabled: bool);
}

/// Outbound sound requests. Fire-and-forget.
pub(crate) trait Audio {
    fn play_cue(&mut self, cue: Cue);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    InRound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TapOutcome {
    /// No round, or the round already ended.
    Ignored,
    Correct,
    /// Non-target, or a target that was already found.
    Miss,
    Cleared { elapsed_ms: u64 },
}

#[derive(Clone, Debug)]
pub(crate) struct Round {
    /// Selection order; also the order targets are listed in.
    targets: Vec<ItemId>,
    found: BTreeMap<ItemId, bool>,
    correct_count: usize,
    started_at_ms: u64,
    active: bool,
    misses: u32,
}

impl Round {
    fn new(targets: Vec<ItemId>, started_at_ms: u64) -> Self {
        let found = targets.iter().map(|&t| (t, false)).collect();
        Self {
            targets,
            found,
            correct_count: 0,
            started_at_ms,
            active: true,
            misses: 0,
        }
    }

    pub(crate) fn targets(&self) -> &[ItemId] {
        &self.targets
    }

    pub(crate) fn is_found(&self, item: ItemId) -> bool {
        self.found.get(&item).copied().unwrap_or(false)
    }

    pub(crate) fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    pub(crate) fn misses(&self) -> u32 {
        self.misses
    }

    fn is_complete(&self) -> bool {
        self.correct_count == self.targets.len()
    }
}

/// In-memory totals for this process only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionStats {
    pub(crate) rounds_started: u32,
    pub(crate) rounds_cleared: u32,
    pub(crate) best_ms: Option<u64>,
    pub(crate) total_misses: u32,
}

pub(crate) struct Session<R, C> {
    catalog: Catalog,
    target_range: RangeInclusive<usize>,
    rng: R,
    clock: C,
    round: Option<Round>,
    stats: SessionStats,
}

impl<R: RandomSource, C: Clock> Session<R, C> {
    pub(crate) fn new(
        catalog: Catalog,
        target_range: RangeInclusive<usize>,
        rng: R,
        clock: C,
    ) -> anyhow::Result<Self> {
        let (lo, hi) = (*target_range.start(), *target_range.end());
        anyhow::ensure!(lo >= 1, "target count must be at least 1");
        anyhow::ensure!(lo <= hi, "target range {lo}..={hi} is empty");
        anyhow::ensure!(
            hi <= catalog.len(),
            "target range {lo}..={hi} exceeds catalog of {} items",
            catalog.len()
        );
        Ok(Self {
            catalog,
            target_range,
            rng,
            clock,
            round: None,
            stats: SessionStats::default(),
        })
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub(crate) fn stats(&self) -> SessionStats {
        self.stats
    }

    pub(crate) fn phase(&self) -> Phase {
        match &self.round {
            Some(r) if r.active() => Phase::InRound,
            _ => Phase::Idle,
        }
    }

    pub(crate) fn start_round(&mut self, view: &mut dyn View, audio: &mut dyn Audio) {
        self.round = None;

        let count = self
            .rng
            .range_inclusive(*self.target_range.start(), *self.target_range.end());
        let all = self.catalog.ids();
        let targets = sample_distinct(&mut self.rng, &all, count);

        let mut order = all;
        self.rng.shuffle(&mut order);

        let round = Round::new(targets, self.clock.now_ms());
        self.stats.rounds_started += 1;
        info!(
            round = self.stats.rounds_started,
            targets = round.targets.len(),
            "round started"
        );

        view.render_tiles(&order);
        view.set_status_title(&format!("Find {} items", round.targets.len()));
        self.round = Some(round);
        self.refresh_targets(view);
        view.set_score_text(&format!("Clear time: {}", format_seconds(0)), ScoreColor::Neutral);
        audio.play_cue(Cue::Start);
        view.set_start_enabled(false);
    }

    pub(crate) fn handle_tap(
        &mut self,
        item: ItemId,
        view: &mut dyn View,
        audio: &mut dyn Audio,
    ) -> TapOutcome {
        debug_assert!(self.catalog.contains(item), "tap on unknown item {item:?}");
        let Some(round) = self.round.as_mut().filter(|r| r.active) else {
            debug!(item = item.0, "tap ignored outside a round");
            return TapOutcome::Ignored;
        };

        let hit = match round.found.get_mut(&item) {
            Some(found) if !*found => {
                *found = true;
                true
            }
            _ => false,
        };

        let outcome = if hit {
            round.correct_count += 1;
            view.set_tile_highlighted(item, true);
            audio.play_cue(Cue::Correct);
            debug!(item = self.catalog.name(item), found = round.correct_count, "correct tap");
            TapOutcome::Correct
        } else {
            round.misses += 1;
            self.stats.total_misses += 1;
            audio.play_cue(Cue::Incorrect);
            debug!(item = self.catalog.name(item), "missed tap");
            TapOutcome::Miss
        };

        self.refresh_targets(view);

        if self.round.as_ref().is_some_and(Round::is_complete) {
            if let Some(elapsed_ms) = self.end_round(view) {
                return TapOutcome::Cleared { elapsed_ms };
            }
        }
        outcome
    }

    /// Stops the active round and reports its clear time. Returns `None`
    /// when no round is active.
    pub(crate) fn end_round(&mut self, view: &mut dyn View) -> Option<u64> {
        let round = self.round.as_mut().filter(|r| r.active)?;
        let elapsed_ms = self.clock.now_ms().saturating_sub(round.started_at_ms);
        round.active = false;

        self.stats.rounds_cleared += 1;
        self.stats.best_ms = Some(self.stats.best_ms.map_or(elapsed_ms, |b| b.min(elapsed_ms)));
        info!(elapsed_ms, misses = round.misses, "round cleared");

        view.set_score_text(
            &format!("Clear time: {}", format_seconds(elapsed_ms)),
            ScoreColor::Highlight,
        );
        view.set_start_enabled(true);
        Some(elapsed_ms)
    }

    fn refresh_targets(&self, view: &mut dyn View) {
        let Some(round) = &self.round else {
            return;
        };
        let status: Vec<TargetStatus> = round
            .targets()
            .iter()
            .map(|&t| TargetStatus {
                name: self.catalog.name(t),
                found: round.is_found(t),
            })
            .collect();
        view.set_status_targets(&status);
    }
}
