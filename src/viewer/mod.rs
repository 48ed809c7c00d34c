mod grid;

use std::time::Instant;

use ggez::{
    conf::{WindowMode, WindowSetup},
    event::{self, EventHandler},
    graphics::{Canvas, Color, DrawParam, Text},
    input::keyboard::{KeyCode, KeyInput},
    Context, ContextBuilder, GameResult,
};
use glam::Vec2;
use tracing::{debug, warn};

use lang_vm::{InputOutcome, Scheduler};

use crate::launch::Launch;

const PANEL_WIDTH: f32 = 420.0;
const MIN_HEIGHT: f32 = 480.0;
const MARGIN: f32 = 8.0;
const VISIBLE_LINES: usize = 28;

const BACKGROUND: Color = Color::new(0.12, 0.12, 0.12, 1.0);

/// Window host: the grid on the left, the I/O buffer on the right.
pub struct Viewer {
    sched: Scheduler,
    launch: Launch,
    typed: String,
    panel: Vec2,
}

impl Viewer {
    fn new(mut sched: Scheduler, launch: Launch, panel: Vec2) -> anyhow::Result<Self> {
        launch.start(&mut sched)?;

        Ok(Self {
            sched,
            launch,
            typed: String::new(),
            panel,
        })
    }

    fn restart(&mut self) {
        self.typed.clear();
        if let Err(err) = self.launch.start(&mut self.sched) {
            warn!("cannot restart: {}", err);
        }
    }

    fn submit(&mut self) {
        if !self.sched.is_running() {
            return;
        }

        let text = format!("{}{}\n", self.sched.output(), self.typed);
        if self.sched.set_input(&text) == InputOutcome::Rejected {
            debug!("input rejected");
        }
        self.typed.clear();
    }

    fn panel_text(&self) -> String {
        let state = match self.sched.interpreter() {
            Some(vm) => format!("{} {:?}", vm.language(), self.sched.state()),
            None => format!("{:?}", self.sched.state()),
        };

        let buffer = format!("{}{}_", self.sched.output(), self.typed);
        let lines: Vec<&str> = buffer.split('\n').collect();
        let start = lines.len().saturating_sub(VISIBLE_LINES);

        format!("{}\n\n{}", state, lines[start..].join("\n"))
    }
}

impl EventHandler for Viewer {
    fn update(&mut self, _ctx: &mut Context) -> GameResult<()> {
        self.sched.burst(Instant::now());
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult<()> {
        let mut canvas = Canvas::from_frame(ctx, BACKGROUND);

        if let Some(program) = self.launch.program() {
            let position = self.sched.interpreter().and_then(|vm| vm.position());
            grid::draw(ctx, &mut canvas, program, position)?;
        }

        let dest = self.panel + Vec2::splat(MARGIN);
        let text = Text::new(self.panel_text());
        canvas.draw(
            &text,
            DrawParam::default().dest(dest.to_array()).color(Color::WHITE),
        );

        canvas.finish(ctx)
    }

    fn text_input_event(&mut self, _ctx: &mut Context, character: char) -> GameResult<()> {
        if !character.is_control() {
            self.typed.push(character);
        }
        Ok(())
    }

    fn key_down_event(&mut self, _ctx: &mut Context, key: KeyInput, _repeat: bool) -> GameResult<()> {
        match key.keycode {
            Some(KeyCode::Return) => self.submit(),
            Some(KeyCode::Back) => {
                self.typed.pop();
            }
            Some(KeyCode::Escape) => self.sched.stop(),
            Some(KeyCode::F5) => self.restart(),
            _ => (),
        }
        Ok(())
    }
}

pub fn run(sched: Scheduler, launch: Launch) -> anyhow::Result<()> {
    let (cols, rows) = launch
        .program()
        .map(|p| (p.grid.width(), p.grid.height()))
        .unwrap_or((0, 0));
    let panel = Vec2::new(cols as f32 * grid::CODEL_SIZE, 0.0);
    let size = Vec2::new(
        panel.x + PANEL_WIDTH,
        (rows as f32 * grid::CODEL_SIZE).max(MIN_HEIGHT),
    );

    let title = format!("esolangs v{}", env!("CARGO_PKG_VERSION"));
    let window_setup = WindowSetup::default().title(&title);
    let window_mode = WindowMode::default()
        .dimensions(size.x, size.y)
        .resizable(false);

    let (ctx, event_loop) = ContextBuilder::new("esolangs", "esolangs")
        .window_setup(window_setup)
        .window_mode(window_mode)
        .build()
        .map_err(|err| anyhow::anyhow!("cannot create window: {}", err))?;
    let viewer = Viewer::new(sched, launch, panel)?;

    event::run(ctx, event_loop, viewer)
}
