use anyhow::{anyhow, Context as _, Result};
use image::RgbaImage;
use image_comparison_view::{
    rounded_corners, ArrowPaint, ArrowPath, ArrowStyle, Canvas, Capture, Color,
    ImageComparisonView, Point, Rect, Side, TouchAction, TouchResponse,
};
use imgui::{DrawListMut, ImColor32, TextureId};
use imgui_wgpu::{Renderer, RendererConfig, Texture, TextureConfig};
use log::{debug, info, trace};
use std::time::Instant;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, MouseButton, WindowEvent},
    window::Window,
};

pub struct AppState {
    view: ImageComparisonView,
    surface: wgpu::Surface,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    imgui: imgui::Context,
    platform: imgui_winit_support::WinitPlatform,
    renderer: Renderer,
    textures: [Option<TextureId>; 2],
    cursor_x: f32,
    dragging: bool,
    last_frame: Instant,
}

impl AppState {
    pub async fn new(
        window: &Window,
        view: ImageComparisonView,
        position: Option<i32>,
    ) -> Result<Self> {
        info!("Initializing AppState");
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = unsafe { instance.create_surface(window) }
            .map_err(|e| anyhow!("Failed to create surface: {e}"))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .map_err(|e| anyhow!("Failed to create device: {e}"))?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .context("Surface reports no texture formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        let mut platform = imgui_winit_support::WinitPlatform::init(&mut imgui);
        // View coordinates are physical pixels, so keep imgui unscaled.
        platform.attach_window(
            imgui.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Locked(1.0),
        );
        imgui
            .fonts()
            .add_font(&[imgui::FontSource::DefaultFontData { config: None }]);

        let renderer_config = RendererConfig {
            texture_format: format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut imgui, &device, &queue, renderer_config);

        let mut state = Self {
            view,
            surface,
            surface_config,
            device,
            queue,
            imgui,
            platform,
            renderer,
            textures: [None, None],
            cursor_x: 0.0,
            dragging: false,
            last_frame: Instant::now(),
        };
        state.view.on_resize(size.width, size.height);
        if let Some(position) = position {
            state.view.set_delimiter_position_percent(position);
        }
        state.upload_textures();
        info!("AppState initialized successfully");
        Ok(state)
    }

    pub fn handle_event(&mut self, window: &Window, event: &Event<()>) {
        self.platform
            .handle_event(self.imgui.io_mut(), window, event);

        let Event::WindowEvent { event, .. } = event else {
            return;
        };
        match event {
            WindowEvent::Resized(size) => self.resize(*size),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_x = position.x as f32;
                if self.dragging {
                    self.touch(TouchAction::Move);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.dragging = self.touch(TouchAction::Down).consumed;
                }
                ElementState::Released => {
                    if self.dragging {
                        self.touch(TouchAction::Up);
                        self.dragging = false;
                    }
                }
            },
            WindowEvent::CursorLeft { .. } => {
                if self.dragging {
                    self.touch(TouchAction::Cancel);
                    self.dragging = false;
                }
            }
            _ => {}
        }
    }

    fn touch(&mut self, action: TouchAction) -> TouchResponse {
        let response = self.view.handle_touch(action, self.cursor_x);
        match response.capture {
            Capture::Acquire => debug!("Drag started at {}", self.cursor_x),
            Capture::Release => debug!("Drag ended at {}", self.view.delimiter_position()),
            Capture::Unchanged => {}
        }
        response
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width > 0 && size.height > 0 {
            self.surface_config.width = size.width;
            self.surface_config.height = size.height;
            self.surface.configure(&self.device, &self.surface_config);
        }
        self.view.on_resize(size.width, size.height);
        self.upload_textures();
    }

    /// Copies the view's scaled surfaces into imgui textures.
    fn upload_textures(&mut self) {
        for side in [Side::Left, Side::Right] {
            let slot = texture_slot(side);
            let Some(image) = self.view.surface(side) else {
                if let Some(id) = self.textures[slot].take() {
                    self.renderer.textures.remove(id);
                }
                continue;
            };
            let (width, height) = image.dimensions();
            let texture_config = TextureConfig {
                size: wgpu::Extent3d {
                    width,
                    height,
                    ..Default::default()
                },
                label: Some(match side {
                    Side::Left => "left surface",
                    Side::Right => "right surface",
                }),
                format: Some(wgpu::TextureFormat::Rgba8UnormSrgb),
                ..Default::default()
            };
            let texture = Texture::new(&self.device, &self.renderer, texture_config);
            texture.write(&self.queue, image.as_raw(), width, height);
            trace!("Uploaded {:?} surface {}x{}", side, width, height);

            let id = match self.textures[slot] {
                Some(id) => {
                    self.renderer.textures.replace(id, texture);
                    id
                }
                None => self.renderer.textures.insert(texture),
            };
            self.textures[slot] = Some(id);
        }
    }

    pub fn needs_redraw(&mut self) -> bool {
        self.view.take_redraw_request()
    }

    pub fn render(&mut self, window: &Window) -> Result<()> {
        let now = Instant::now();
        self.imgui.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(e) => return Err(anyhow!("Failed to acquire frame: {e}")),
        };

        self.platform
            .prepare_frame(self.imgui.io_mut(), window)
            .context("Failed to prepare imgui frame")?;
        let ui = self.imgui.new_frame();
        {
            let mut canvas = ImguiCanvas {
                draw_list: ui.get_background_draw_list(),
                textures: self.textures,
            };
            self.view.render(&mut canvas);
        }
        self.platform.prepare_render(ui, window);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("comparison encoder"),
            });
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("comparison pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.renderer
                .render(self.imgui.render(), &self.queue, &self.device, &mut rpass)
                .map_err(|e| anyhow!("imgui render failed: {e:?}"))?;
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn texture_slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

fn im_color(color: Color) -> ImColor32 {
    let [r, g, b, a] = color.to_rgba();
    ImColor32::from_rgba(r, g, b, a)
}

/// Line segments used to approximate each rounded arrow corner.
const CORNER_SEGMENTS: u32 = 6;

fn im_point(point: Point) -> [f32; 2] {
    [point.x as f32, point.y as f32]
}

/// Paints onto imgui's background draw list. Arrow corner rounding is not
/// supported by imgui triangles and is ignored.
struct ImguiCanvas<'ui> {
    draw_list: DrawListMut<'ui>,
    textures: [Option<TextureId>; 2],
}

impl Canvas for ImguiCanvas<'_> {
    type Surface = RgbaImage;

    fn draw_surface(&mut self, side: Side, surface: &RgbaImage, clip: Option<Rect>) {
        let Some(texture) = self.textures[texture_slot(side)] else {
            trace!("No texture uploaded for {:?} surface", side);
            return;
        };
        let max = [surface.width() as f32, surface.height() as f32];
        match clip {
            Some(clip) => {
                let draw_list = &self.draw_list;
                draw_list.with_clip_rect(
                    [clip.left as f32, clip.top as f32],
                    [clip.right as f32, clip.bottom as f32],
                    || draw_list.add_image(texture, [0.0, 0.0], max).build(),
                );
            }
            None => self.draw_list.add_image(texture, [0.0, 0.0], max).build(),
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.draw_list
            .add_line(im_point(from), im_point(to), im_color(color))
            .thickness(width)
            .build();
    }

    fn draw_arrow(&mut self, _side: Side, arrow: &ArrowPath, paint: &ArrowPaint) {
        let mut outline = Vec::new();
        for corner in rounded_corners(arrow, paint.corner_radius) {
            if corner.is_sharp() {
                outline.push(corner.apex);
                continue;
            }
            let steps = (0..=CORNER_SEGMENTS).map(|i| i as f32 / CORNER_SEGMENTS as f32);
            outline.extend(steps.map(|t| corner.at(t)));
        }
        match paint.style {
            ArrowStyle::Fill => self
                .draw_list
                .add_polyline(outline, im_color(paint.color))
                .filled(true)
                .build(),
            ArrowStyle::Stroke { width } => {
                // Polylines are open; repeat the start to close the outline.
                if let Some(&first) = outline.first() {
                    outline.push(first);
                }
                self.draw_list
                    .add_polyline(outline, im_color(paint.color))
                    .thickness(width)
                    .build()
            }
        }
    }

    fn draw_text(&mut self, _side: Side, text: &str, origin: Point, color: Color, size: f32) {
        // imgui positions text by its top-left corner.
        let top = origin.y as f32 - size;
        self.draw_list
            .add_text([origin.x as f32, top], im_color(color), text);
    }
}
