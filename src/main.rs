use anyhow::{Context as _, Result};
use image_comparison_view::config::{command, ViewerConfig};
use image_comparison_view::{
    load_surface, snapshot, Color, FixedAdvanceMeasure, ImageComparisonView,
    ImageSurfaceProvider,
};
use log::info;

#[cfg(feature = "viewer")]
mod app;

fn main() -> Result<()> {
    env_logger::init();

    let matches = command().get_matches();
    let config = ViewerConfig::from_matches(&matches)?;

    info!(
        "Starting image comparison view with left: {}, right: {}, window size: {}x{}",
        config.left.display(),
        config.right.display(),
        config.window_width,
        config.window_height
    );

    let left = load_surface(&config.left)?;
    let right = load_surface(&config.right)?;

    let mut view = ImageComparisonView::new(
        ImageSurfaceProvider::default(),
        FixedAdvanceMeasure::default(),
        config.view_options(Some(left), Some(right)),
    );
    view.set_listener(|percentage: i32| info!("Delimiter position: {}%", percentage));

    match config.snapshot.clone() {
        Some(path) => {
            view.on_resize(config.window_width, config.window_height);
            if let Some(position) = config.position {
                view.set_delimiter_position_percent(position);
            }
            let frame = snapshot(&mut view, Color::BLACK);
            frame
                .save(&path)
                .with_context(|| format!("Failed to write snapshot '{}'", path.display()))?;
            info!("Wrote snapshot to {}", path.display());
            Ok(())
        }
        None => run_viewer(&config, view),
    }
}

#[cfg(feature = "viewer")]
fn run_viewer(config: &ViewerConfig, view: ImageComparisonView) -> Result<()> {
    use log::error;
    use winit::{
        event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
        event_loop::{ControlFlow, EventLoop},
        window::WindowBuilder,
    };

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Image Comparison View")
        .with_inner_size(winit::dpi::PhysicalSize::new(
            config.window_width,
            config.window_height,
        ))
        .build(&event_loop)?;

    let mut app_state = pollster::block_on(app::AppState::new(&window, view, config.position))?;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        app_state.handle_event(&window, &event);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => *control_flow = ControlFlow::Exit,
                _ => {}
            },
            Event::MainEventsCleared => {
                if app_state.needs_redraw() {
                    window.request_redraw();
                }
            }
            Event::RedrawRequested(_) => {
                if let Err(e) = app_state.render(&window) {
                    error!("Render error: {:#}", e);
                }
            }
            _ => {}
        }
    });
}

#[cfg(not(feature = "viewer"))]
fn run_viewer(_config: &ViewerConfig, _view: ImageComparisonView) -> Result<()> {
    anyhow::bail!(
        "Interactive viewer is not built in; rebuild with `--features viewer` or pass --snapshot"
    )
}
