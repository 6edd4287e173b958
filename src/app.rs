use crate::config::{load_settings, save_settings_atomic, Cli, Paths, Settings};
use crate::display::compose;
use crate::input::{collect_input_nonblocking, map_event, Command};
use crate::needs::SeededDice;
use crate::render::{draw_screen, Layout, Terminal};
use crate::scheduler::TickScheduler;
use crate::sim::Engine;
use crate::sprites::SpriteSheet;
use anyhow::Context;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;

pub(crate) struct App {
    settings: Settings,
    engine: Engine<SeededDice>,
    sprites: Rc<SpriteSheet>,
    scheduler: TickScheduler,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        // assets are checked before the terminal switches to raw mode
        let sprites = Rc::new(load_sprites(&settings)?);
        let rules = settings.rules.clone();
        let scheduler = TickScheduler::new(
            Duration::from_millis(rules.tick_ms.max(1)),
            Duration::from_millis(rules.clean_tick_ms.max(1)),
            Instant::now(),
        );
        let engine = Engine::new(rules, Rc::clone(&sprites), SeededDice::new(settings.seed));

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            engine,
            sprites,
            scheduler,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let result = self.main_loop();
        self.term.end()?;
        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            self.term.resize_if_needed()?;
            let layout = Layout::new(self.term.cols, self.term.rows, self.settings.display);

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event(&ev, &layout) {
                    Some(Command::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(Command::Control(c)) => self.engine.press(c),
                    None => {}
                }
            }

            // a queued clean wants the fast clock before its first step
            let now = Instant::now();
            self.sync_rate(now);
            if self.scheduler.poll(now) {
                self.engine.tick_fixed_step()?;
                self.sync_rate(now);
            }

            self.render_frame(&layout)?;

            let now = Instant::now();
            spin_sleep(frame_dt.min(self.scheduler.until_due(now)), now);
        }
        info!("quit requested");
        Ok(())
    }

    fn sync_rate(&mut self, now: Instant) {
        if self.scheduler.set_rate(self.engine.tick_rate(), now) {
            info!(
                rate = ?self.scheduler.rate(),
                interval_ms = self.scheduler.interval().as_millis() as u64,
                "tick rate changed"
            );
        }
    }

    fn render_frame(&mut self, layout: &Layout) -> anyhow::Result<()> {
        let shown = compose(&self.engine.snapshot(), self.engine.rules(), &self.sprites)?;
        self.term.cur.clear(crossterm::style::Color::Black);
        draw_screen(&mut self.term.cur, layout, &shown, &self.settings);
        self.term.present(true)?;
        Ok(())
    }
}

fn load_sprites(settings: &Settings) -> anyhow::Result<SpriteSheet> {
    match &settings.sprite_dir {
        Some(dir) => {
            let sheet = SpriteSheet::load_dir(dir)
                .with_context(|| format!("loading sprites from {}", dir.display()))?;
            info!(dir = %dir.display(), "loaded sprite directory");
            Ok(sheet)
        }
        None => SpriteSheet::builtin().context("built-in sprites are incomplete"),
    }
}

pub(crate) fn run(cli: Cli, paths: Paths) -> anyhow::Result<()> {
    if !paths.settings_path.exists() {
        save_settings_atomic(&paths.settings_path, &Settings::default())?;
        info!(path = %paths.settings_path.display(), "wrote default settings");
    }
    let mut settings = load_settings(&paths.settings_path);
    settings.apply_cli(&cli);
    info!(
        seed = ?settings.seed,
        display = ?settings.display,
        tick_ms = settings.rules.tick_ms,
        "starting"
    );

    let mut app = App::init(settings)?;
    app.run()
}

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
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
