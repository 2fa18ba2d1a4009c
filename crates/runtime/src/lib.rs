//! Runtime layer for driving the presenter with a winit + pixels loop.

pub mod assets;
pub mod audio;
pub mod config;
mod error;
pub mod input;
mod loader;
pub mod render;

pub use loader::{AsyncImageLoader, ImageHandle, SceneImages};

use std::sync::Arc;
use std::time::{Duration, Instant};

use pixel_novel::{
    compose_frame, Canvas, Clock, EditEffect, FrameAssets, FrameGate, FrameSummary, KeyValueStore,
    LayoutMode, OverridePersistence, SceneStore, Session, TapOutcome,
};
use tracing::{debug, error, info};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

pub use self::assets::{ImageSource, MemoryImageSource};
pub use self::audio::{default_audio, Audio, RodioBackend, SilentAudio, SquareBeep, Tone};
pub use self::config::{DisplayInfo, PresenterConfig, ResolvedConfig};
pub use self::error::RuntimeError;
pub use self::input::{action_for_key, Input, InputAction, PresenterInput};
use self::render::{PixelsBackend, RenderBackend};

/// Presenter controller: owns the story, the session and the collaborators,
/// and turns input plus time into frames.
pub struct PresenterApp<I, A, C, K> {
    store: SceneStore,
    session: Session,
    persistence: OverridePersistence<K>,
    input: I,
    audio: A,
    clock: C,
    gate: FrameGate,
    layout: LayoutMode,
    images: SceneImages,
    canvas: Canvas,
}

impl<I, A, C, K> PresenterApp<I, A, C, K>
where
    I: Input,
    A: Audio,
    C: Clock,
    K: KeyValueStore,
{
    /// Applies stored overrides before the first frame.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mut store: SceneStore,
        session: Session,
        persistence: OverridePersistence<K>,
        input: I,
        audio: A,
        clock: C,
        layout: LayoutMode,
        images: SceneImages,
    ) -> Self {
        persistence.load(&mut store);
        let (width, height) = layout.canvas_size();
        Self {
            store,
            session,
            persistence,
            input,
            audio,
            clock,
            gate: FrameGate::default(),
            layout,
            images,
            canvas: Canvas::new(width, height),
        }
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn persistence(&self) -> &OverridePersistence<K> {
        &self.persistence
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn frame(&self) -> &Canvas {
        &self.canvas
    }

    /// Feeds one window event through the input map. Returns false on quit.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let action = self.input.handle_window_event(event);
        self.handle_action(action)
    }

    /// Returns false when the presenter should shut down.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::None => {}
            InputAction::Quit => return false,
            InputAction::Tap => self.tap(),
            InputAction::ToggleEditor => {
                let mode = self.session.toggle_mode();
                info!(?mode, scene = self.session.index(), "editor toggled");
            }
            InputAction::Edit(command) => {
                let sprite = self.images.sprite.dimensions();
                let effect =
                    self.session
                        .apply(command, &mut self.store, self.layout.playfield(), sprite);
                match effect {
                    EditEffect::None => debug!(?command, "edit ignored"),
                    EditEffect::View => {}
                    EditEffect::Persist => {
                        self.persistence.save(&self.store);
                    }
                    EditEffect::Dump => self.dump(),
                }
            }
        }
        true
    }

    fn tap(&mut self) {
        match self.session.tap(self.clock.now()) {
            TapOutcome::Scheduled { due } => {
                self.audio.play_tone(Tone::ADVANCE_CUE);
                debug!(?due, "advance scheduled");
            }
            TapOutcome::Pending => debug!("tap ignored, advance pending"),
            TapOutcome::Editing => debug!("tap ignored while editing"),
        }
    }

    fn dump(&self) {
        match self.store.to_pretty_json() {
            Ok(json) => info!("scene store:\n{json}"),
            Err(err) => error!("scene dump failed: {err}"),
        }
    }

    /// Fires a due advance and reports whether a draw is due now.
    pub fn update(&mut self) -> bool {
        let now = self.clock.now();
        if self.session.update(now, &self.store) {
            info!(scene = self.session.index(), "advanced");
        }
        self.gate.tick(now)
    }

    /// Composes the current scene into the frame buffer.
    pub fn draw(&mut self) -> FrameSummary {
        let index = self.session.index();
        let assets = FrameAssets {
            background: self.images.background(index),
            sprite: self.images.sprite.image(),
        };
        compose_frame(
            &mut self.canvas,
            &self.store,
            &self.session,
            self.layout,
            assets,
        )
    }

    /// Time until the loop has work again: next draw or pending advance.
    pub fn next_wakeup(&self) -> Duration {
        let now = self.clock.now();
        let next = match (self.gate.next_due(), self.session.pending_advance()) {
            (Some(draw), Some(advance)) => draw.min(advance),
            (Some(at), None) | (None, Some(at)) => at,
            (None, None) => now,
        };
        next.saturating_sub(now)
    }
}

/// Opens the window and runs the presenter until it quits or the window closes.
///
/// The window scale comes from `config` or, when unset, from the primary
/// monitor.
pub fn run_winit<I, A, C, K>(
    mut app: PresenterApp<I, A, C, K>,
    config: &PresenterConfig,
) -> Result<(), RuntimeError>
where
    I: Input + 'static,
    A: Audio + 'static,
    C: Clock + 'static,
    K: KeyValueStore + 'static,
{
    let event_loop = EventLoop::new()?;
    let display = event_loop.primary_monitor().map(|monitor| {
        let size = monitor.size();
        DisplayInfo {
            width: size.width,
            height: size.height,
        }
    });
    let config = config.resolve(display);
    let canvas = app.layout().canvas_size();
    let (width, height) = config.window_size;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_min_inner_size(PhysicalSize::new(canvas.0, canvas.1))
            .build(&event_loop)?,
    );
    let mut backend = PixelsBackend::new(window.clone(), canvas)?;
    info!(scale = config.scale, ?canvas, "presenter window ready");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                if let Err(err) = backend.resize(size.width, size.height) {
                    error!("resize failed: {err}");
                    elwt.exit();
                }
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = backend.present(app.frame()) {
                    error!("render error: {err}");
                    elwt.exit();
                }
            }
            other => {
                if !app.handle_window_event(&other) {
                    elwt.exit();
                }
            }
        },
        Event::AboutToWait => {
            if app.update() {
                app.draw();
                window.request_redraw();
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + app.next_wakeup()));
        }
        _ => {}
    })?;
    Ok(())
}
