use crate::audio::TerminalAudio;
use crate::catalog::Catalog;
use crate::clock::MonotonicClock;
use crate::config::{load_or_create_settings, project_paths, Args, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::render::Terminal;
use crate::rng::RngSource;
use crate::session::{Session, TapOutcome};
use crate::view::{BoardView, DrawContext};
use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub(crate) struct App {
    settings: Settings,
    session: Session<RngSource<StdRng>, MonotonicClock>,
    view: BoardView,
    audio: TerminalAudio<MonotonicClock>,
    term: Terminal,
    show_help: bool,
    last_flash: Option<crate::session::Cue>,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let catalog = Catalog::fruits();
        settings.validate(catalog.len())?;

        let session = Session::new(
            catalog,
            settings.target_min..=settings.target_max,
            RngSource::from_seed_or_entropy(settings.seed),
            MonotonicClock::new(),
        )?;
        let view = BoardView::new(settings.columns);
        let audio = TerminalAudio::new(settings.sound, MonotonicClock::new());
        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            session,
            view,
            audio,
            term,
            show_help: false,
            last_flash: None,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            let frame_start = Instant::now();
            if self.term.resize_if_needed()? {
                self.view.mark_dirty();
            }
            self.view.relayout(self.term.cols, self.term.rows);

            let events = collect_input_nonblocking(frame_dt)?;
            for ev in &events {
                let action = map_event_to_action(
                    &self.view,
                    self.show_help,
                    self.settings.allow_restart,
                    ev,
                );
                if let Some(action) = action {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            for _ in 0..self.audio.take_bells() {
                self.term.bell()?;
            }

            let flash = self.audio.flash();
            if flash != self.last_flash {
                self.last_flash = flash;
                self.view.mark_dirty();
            }
            if self.view.take_dirty() {
                self.render_frame()?;
            }

            spin_sleep(frame_dt, frame_start);
        }

        let stats = self.session.stats();
        info!(
            rounds = stats.rounds_started,
            cleared = stats.rounds_cleared,
            best_ms = stats.best_ms,
            misses = stats.total_misses,
            "session over"
        );
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Start => {
                self.session.start_round(&mut self.view, &mut self.audio);
                // fresh tiles need a layout before the first click lands
                self.view.relayout(self.term.cols, self.term.rows);
            }
            Action::Tap(item) => {
                let outcome = self.session.handle_tap(item, &mut self.view, &mut self.audio);
                if let (TapOutcome::Cleared { elapsed_ms }, Some(round)) =
                    (outcome, self.session.round())
                {
                    debug!(
                        elapsed_ms,
                        found = round.correct_count(),
                        misses = round.misses(),
                        "board cleared"
                    );
                }
            }
            Action::HelpToggle => {
                self.show_help = !self.show_help;
                self.view.mark_dirty();
            }
            Action::Back => {
                self.show_help = false;
                self.view.mark_dirty();
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let ctx = DrawContext {
            catalog: self.session.catalog(),
            stats: self.session.stats(),
            phase: self.session.phase(),
            flash: self.last_flash,
            enable_color: self.settings.enable_color,
            show_help: self.show_help,
        };
        self.view
            .draw(&mut self.term.cur, &mut self.term.canvas, &ctx);
        self.term.present(true)
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let paths = project_paths()?;

    let log_path = args.log_file.clone().unwrap_or(paths.log_path);
    crate::logging::init(&log_path, &args.log_level)?;

    let settings_path = args.config.clone().unwrap_or(paths.settings_path);
    let mut settings = load_or_create_settings(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    settings.apply_args(&args);
    info!(?settings, "starting");

    let mut app = App::init(settings)?;
    let result = app.run();
    // restore the terminal even when the loop failed
    let restored = app.term.end();
    result.and(restored)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
