//! App entrypoint for the rendering layer.
//!
//! This module owns:
//! - the winit application lifecycle + event loop
//! - creating the window
//! - delegating to an injected async state builder
//!
//! Design:
//! - The app runner is generic over a state type `S` implementing `AppState`
//!   (resize + render, and a way to request redraw).
//! - The builder is async and receives the created window.
//! - Startup failures (no event loop, no window, no GPU) stop the loop and are returned
//!   from `run_with_builder` as `StartupError`, so the binary can map them to exit codes.

use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Context as _;
use log::{info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::error::StartupError;

/// App-facing configuration for running the winit event loop.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial inner size in logical pixels.
    pub inner_size: (u32, u32),
    /// ControlFlow for the event loop. Default is `Poll` (continuous animation).
    pub control_flow: ControlFlow,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "calcmotion".to_string(),
            inner_size: (800, 800),
            control_flow: ControlFlow::Poll,
        }
    }
}

/// Minimal trait a state must implement to be driven by the app runner.
pub trait AppState: 'static {
    /// Handle window resize.
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>);

    /// Render one frame.
    fn render(&mut self) -> anyhow::Result<()>;

    /// Request a redraw on the underlying window (used for continuous animation).
    fn request_redraw(&self);
}

/// Run the winit event loop with an injected async state builder.
///
/// Notes:
/// - The builder is called once when the app is first resumed (after the window is created).
/// - The builder runs on the current thread using `pollster::block_on`.
/// - Returns `Ok(())` when the window is closed.
pub fn run_with_builder<S, B, Fut>(config: AppConfig, builder: B) -> Result<(), StartupError>
where
    S: AppState,
    B: FnOnce(Arc<Window>) -> Fut + 'static,
    Fut: Future<Output = Result<S, StartupError>> + 'static,
{
    let event_loop = EventLoop::new()
        .context("winit: failed to create EventLoop")
        .map_err(StartupError::Window)?;
    event_loop.set_control_flow(config.control_flow);

    let mut app = App::<S>::new_with_builder(config, builder);
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")
        .map_err(StartupError::Window)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Type-erased async builder for creating a state `S` from a created window.
///
/// The future is boxed and pinned so `pollster::block_on(...)` can drive it
/// (`dyn Future` is not `Unpin`).
type BoxedStateBuilder<S> = Box<
    dyn FnOnce(Arc<Window>) -> Pin<Box<dyn Future<Output = Result<S, StartupError>> + 'static>>
        + 'static,
>;

/// Application state used by winit.
struct App<S: AppState> {
    config: AppConfig,
    builder: Option<BoxedStateBuilder<S>>,
    state: Option<S>,
    fatal: Option<StartupError>,
    exiting: bool,
}

impl<S: AppState> App<S> {
    fn new_with_builder<B, Fut>(config: AppConfig, builder: B) -> Self
    where
        B: FnOnce(Arc<Window>) -> Fut + 'static,
        Fut: Future<Output = Result<S, StartupError>> + 'static,
    {
        Self {
            config,
            builder: Some(Box::new(|window| Box::pin(builder(window)))),
            state: None,
            fatal: None,
            exiting: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: StartupError) {
        warn!("startup failed, stopping event loop");
        self.fatal = Some(err);
        self.exiting = true;
        event_loop.exit();
    }
}

impl<S: AppState> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only the first resume builds the state.
        let Some(builder) = self.builder.take() else {
            return;
        };

        let (w, h) = self.config.inner_size;
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.as_str())
            .with_inner_size(LogicalSize::new(w, h));

        let window = match event_loop
            .create_window(attrs)
            .context("winit: failed to create window")
        {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, StartupError::Window(err)),
        };

        match pollster::block_on(builder(window)) {
            Ok(state) => {
                // Kick off rendering
                state.request_redraw();
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; exiting");
                self.exiting = true;
                // Release GPU resources before the loop winds down.
                self.state = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if self.exiting {
                    return;
                }
                state.resize(size);
                state.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if self.exiting {
                    return;
                }
                if let Err(err) = state.render() {
                    warn!("render error: {:#}", err);
                }
            }
            _ => {}
        }
    }
}
