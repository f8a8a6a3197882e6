use crate::emitter::ScreenEmitter;
use crate::report;
use anyhow::{Context, Result};
use chrono::Utc;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use rtlab_core::TrialState;
use rtlab_experiment::{ExperimentConfig, SessionCommand, TrialController};
use rtlab_timing::HighPrecisionTimer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

type Controller = TrialController<HighPrecisionTimer, ScreenEmitter, ThreadRng>;

pub struct App {
    window: Option<Arc<Window>>,
    controller: Controller,
    config: ExperimentConfig,
    fullscreen: bool,
    should_exit: bool,
}

impl App {
    pub fn new(config: ExperimentConfig, fullscreen: bool) -> Result<Self> {
        config.validate()?;
        let controller = TrialController::new(
            &config,
            HighPrecisionTimer::new(),
            ScreenEmitter::new(),
            rand::rng(),
        );

        Ok(Self {
            window: None,
            controller,
            config,
            fullscreen,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "event loop ready"
        );
        println!("{}", report::welcome());

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut window_attributes = Window::default_attributes()
            .with_title("Reaction Time Lab")
            .with_resizable(!self.fullscreen);

        if self.fullscreen {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .context("no monitor available")?;
            window_attributes =
                window_attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            "window created"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels = Pixels::new(size.width, size.height, surface_texture)
            .context("failed to create pixel buffer")?;

        self.controller
            .emitter_mut()
            .attach(window.clone(), pixels);
        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn handle_input(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Space => self.respond(),
            KeyCode::Enter | KeyCode::NumpadEnter => self.next_action(),
            KeyCode::KeyR => {
                self.controller.handle_command(SessionCommand::Restart);
                println!("{}", report::welcome());
            }
            KeyCode::KeyE => match self.export() {
                Ok(path) => println!("Results exported to {}", path.display()),
                Err(e) => error!(error = ?e, "export failed"),
            },
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            _ => {}
        }
    }

    fn respond(&mut self) {
        if !self.controller.handle_command(SessionCommand::Respond) {
            return;
        }
        match self.controller.state() {
            TrialState::Completed => {
                if let Some(result) = self.controller.last_result() {
                    println!(
                        "{}",
                        report::round_result(
                            result,
                            self.controller.plan().len(),
                            self.controller.is_last_trial()
                        )
                    );
                }
            }
            TrialState::Disqualified => {
                println!(
                    "{}",
                    report::disqualified(self.controller.current_trial_index())
                );
            }
            _ => {}
        }
    }

    fn next_action(&mut self) {
        let Some(command) =
            command_for(self.controller.state(), self.controller.is_last_trial())
        else {
            return;
        };
        if self.controller.handle_command(command) {
            self.show_screen();
        }
    }

    fn show_screen(&self) {
        match self.controller.state() {
            TrialState::PreTrial => {
                if let Some(trial) = self.controller.current_trial() {
                    println!(
                        "{}",
                        report::pre_trial(
                            self.controller.current_trial_index(),
                            trial,
                            self.config.grace_range_ms
                        )
                    );
                }
            }
            TrialState::GracePeriod => println!("{}", report::grace_period()),
            TrialState::Summary => {
                println!("{}", report::statistics(&self.controller.statistics()))
            }
            _ => {}
        }
    }

    fn export(&self) -> Result<PathBuf> {
        let export = self.controller.export(Utc::now());
        let json = export
            .to_json_pretty()
            .context("failed to serialize session")?;
        std::fs::create_dir_all(&self.config.export_dir).with_context(|| {
            format!(
                "failed to create export directory {}",
                self.config.export_dir.display()
            )
        })?;
        let path = self.config.export_dir.join(export.file_name());
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), results = export.results.len(), "session exported");
        Ok(path)
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.controller
            .emitter_mut()
            .resize(new_size.width, new_size.height);
        debug!(width = new_size.width, height = new_size.height, "resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.controller.handle_command(SessionCommand::Restart);
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        println!("\nThank you for participating!");
        self.should_exit = true;
        event_loop.exit();
    }
}

/// ENTER does whatever the current screen offers.
pub(crate) fn command_for(state: TrialState, is_last: bool) -> Option<SessionCommand> {
    match state {
        TrialState::Idle => Some(SessionCommand::Start),
        TrialState::PreTrial => Some(SessionCommand::BeginTrial),
        TrialState::Completed if is_last => Some(SessionCommand::ViewSummary),
        TrialState::Completed => Some(SessionCommand::Advance),
        TrialState::Disqualified => Some(SessionCommand::Retry),
        TrialState::GracePeriod | TrialState::AwaitingResponse | TrialState::Summary => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = ?e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.controller.emitter_mut().present() {
                    error!(error = %e, "render failed");
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    // held keys still count as a response, but not as navigation
                    if event.repeat && code != KeyCode::Space {
                        return;
                    }
                    self.handle_input(code, event_loop);
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        if self.controller.poll() {
            debug!("stimulus presented");
        }
        match self.controller.timer().next_wakeup() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
