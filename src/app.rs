use crate::cli::Cli;
use crate::clock::{frame_period, Clock, FramePacer, ManualClock, MonotonicClock};
use crate::config::{ensure_settings_file, load_settings, project_paths, Paths, Settings};
use crate::fish::{FishView, Timing};
use crate::input::{collect_actions, Action};
use crate::logging::init_tracing;
use crate::render::{render_frame, sprite_size, Hud, Metrics, Renderer, TerminalGuard};
use crate::tank::Tank;
use anyhow::{Context, Result};
use crossterm::terminal;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::io;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Terminal size assumed by headless runs.
const HEADLESS_COLS: u16 = 80;
const HEADLESS_ROWS: u16 = 24;

pub(crate) fn run(cli: Cli) -> Result<()> {
    let paths = project_paths()?;
    init_tracing(cli.log_file.as_deref().unwrap_or(paths.log_path.as_path()))?;
    let settings = resolve_settings(&cli, &paths)?;
    info!(
        fish = settings.fish.len(),
        swim_ms = settings.swim_interval_ms,
        float_ms = settings.float_interval_ms,
        fps = settings.fps(),
        seed = ?settings.seed,
        "starting fishtank"
    );

    if let Some(frames) = cli.headless {
        let report = run_headless(&settings, frames)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut app = App::init(settings)?;
    app.run()
}

fn resolve_settings(cli: &Cli, paths: &Paths) -> Result<Settings> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => {
            ensure_settings_file(&paths.settings_path)?;
            paths.settings_path.clone()
        }
    };
    let mut settings = load_settings(&path);
    settings.apply_cli(cli);
    settings.validate()?;
    Ok(settings)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn metrics(settings: &Settings) -> Metrics {
    Metrics {
        cell_w: settings.cell_width_px,
        cell_h: settings.cell_height_px,
    }
}

fn timing(settings: &Settings) -> Timing {
    Timing {
        swim_ms: settings.swim_interval_ms,
        float_ms: settings.float_interval_ms,
    }
}

/// Sizes the tank for a terminal and adds the configured fish.
fn build_tank<R: Rng + ?Sized>(
    settings: &Settings,
    cols: u16,
    rows: u16,
    now: u64,
    rng: &mut R,
) -> Result<Tank> {
    let metrics = metrics(settings);
    let (w, h) = metrics.tank_px(cols, rows);
    let mut tank = Tank::new(w, h, timing(settings), settings.placement_floor_px)
        .with_context(|| format!("terminal is {cols}x{rows}"))?;
    for f in &settings.fish {
        let size = sprite_size(&f.name, metrics);
        tank.add_fish(f.name.clone(), f.note.clone(), size, now, rng)?;
    }
    Ok(tank)
}

#[derive(Debug, Serialize)]
pub(crate) struct HeadlessReport {
    pub(crate) frames: u64,
    pub(crate) elapsed_ms: u64,
    pub(crate) tank: (i32, i32),
    pub(crate) water_line: i32,
    pub(crate) swim_ticks: usize,
    pub(crate) float_ticks: usize,
    pub(crate) fish: Vec<FishView>,
}

/// Runs the tank against a manual clock advanced one frame per tick.
pub(crate) fn run_headless(settings: &Settings, frames: u64) -> Result<HeadlessReport> {
    let clock = ManualClock::default();
    let mut rng = seeded_rng(settings.seed);
    let mut tank = build_tank(settings, HEADLESS_COLS, HEADLESS_ROWS, clock.now_ms(), &mut rng)?;

    let step = (frame_period(settings.fps()).as_millis() as u64).max(1);
    let mut swim_ticks = 0;
    let mut float_ticks = 0;
    for _ in 0..frames {
        clock.advance(step);
        let report = tank.frame(clock.now_ms(), &mut rng);
        swim_ticks += report.swim_ticks;
        float_ticks += report.float_ticks;
    }

    info!(frames, swim_ticks, float_ticks, "headless run finished");
    Ok(HeadlessReport {
        frames,
        elapsed_ms: clock.now_ms(),
        tank: tank.dimensions(),
        water_line: tank.water_line(),
        swim_ticks,
        float_ticks,
        fish: tank.fish().iter().map(|f| f.view()).collect(),
    })
}

struct App {
    metrics: Metrics,
    tank: Tank,
    rng: StdRng,
    clock: MonotonicClock,
    pacer: FramePacer,
    renderer: Renderer,
    hud: Hud,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> Result<Self> {
        let (cols, rows) = terminal::size().context("could not read terminal size")?;
        let clock = MonotonicClock::new();
        let mut rng = seeded_rng(settings.seed);
        let tank = build_tank(&settings, cols, rows, clock.now_ms(), &mut rng)?;

        Ok(Self {
            metrics: metrics(&settings),
            tank,
            rng,
            clock,
            pacer: FramePacer::new(settings.fps()),
            renderer: Renderer::new(cols, rows),
            hud: Hud {
                show_hud: settings.show_hud,
                show_help: false,
                fps: 0.0,
            },
            should_quit: false,
        })
    }

    fn run(&mut self) -> Result<()> {
        let _guard = TerminalGuard::enter().context("could not set up the terminal")?;
        let mut out = io::stdout();

        let start = Instant::now();
        let mut last = start;
        let mut fps_acc = 0.0f32;
        let mut fps_frames = 0u32;

        while !self.should_quit {
            for action in collect_actions(self.pacer.frame_period())? {
                self.apply(action);
            }

            let report = self.tank.frame(self.clock.now_ms(), &mut self.rng);
            trace!(swim = report.swim_ticks, float = report.float_ticks, "frame");

            let now = Instant::now();
            fps_acc += (now - last).as_secs_f32();
            fps_frames += 1;
            last = now;
            if fps_acc >= 0.5 {
                self.hud.fps = fps_frames as f32 / fps_acc;
                fps_acc = 0.0;
                fps_frames = 0;
            }

            let t = (now - start).as_secs_f32();
            render_frame(&mut self.renderer, &self.tank, self.metrics, t, &self.hud);
            self.renderer.flush(&mut out)?;

            self.pacer.wait();
        }

        info!("quitting");
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleFish(i) => {
                if let Err(err) = self.tank.toggle_fish(i) {
                    debug!(%err, "toggle ignored");
                }
            }
            Action::Click { col, row } => {
                let (x, y) = self.metrics.cell_center(col, row);
                if let Some(i) = self.tank.fish_at(x, y) {
                    self.apply(Action::ToggleFish(i));
                }
            }
            Action::AddFish => self.add_fish(),
            Action::HudToggle => self.hud.show_hud = !self.hud.show_hud,
            Action::HelpToggle => self.hud.show_help = !self.hud.show_help,
            Action::Redraw => self.renderer.full_redraw = true,
            Action::Resize { cols, rows } => {
                self.renderer.resize(cols, rows);
                let (w, h) = self.metrics.tank_px(cols, rows);
                match self.tank.resize(w, h) {
                    Ok(()) => info!(cols, rows, "terminal resized"),
                    Err(err) => warn!(%err, cols, rows, "resize ignored"),
                }
            }
        }
    }

    fn add_fish(&mut self) {
        let label = format!("Fish {}", self.tank.fish().len() + 1);
        let size = sprite_size(&label, self.metrics);
        let now = self.clock.now_ms();
        if let Err(err) = self.tank.add_fish(label, None, size, now, &mut self.rng) {
            warn!(%err, "could not add fish");
        }
    }
}
