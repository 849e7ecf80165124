// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `hello-trans`.
//
// `hello-trans` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `hello-trans` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `hello-trans`. If not, see <https://www.gnu.org/licenses/>.

//! Window and OpenGL context creation.
//!
//! Uses `glutin` to set up a GL 3.3 core context on a `winit` window and
//! `glow` to resolve the entry points for it.

use glow::HasContext;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};

use glutin_winit::DisplayBuilder;
use glutin_winit::GlWindow as _;

use raw_window_handle::HasRawWindowHandle;

use std::error::Error;
use std::fmt;
use std::num::NonZeroU32;

use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Window, WindowBuilder};

/// Client-area dimensions at creation. The window stays resizable.
pub const SCREEN_WIDTH: u32 = 640;
pub const SCREEN_HEIGHT: u32 = 400;

const WINDOW_TITLE: &str = "hello_trans";

/// A fatal setup failure. Each variant is reported once and the process
/// exits with a nonzero status; there are no retries and no fallbacks.
#[derive(Debug)]
pub enum SetupError {
    /// The windowing backend could not be initialized.
    Init(Box<dyn Error>),

    /// The window, context, or surface request was rejected.
    WindowCreation(Box<dyn Error>),

    /// GL entry points could not be resolved for the new context.
    Loader(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Init(e) => write!(f, "failed to initialize the windowing backend: {e}"),
            SetupError::WindowCreation(e) => {
                write!(f, "failed to create the window or GL context: {e}")
            }
            SetupError::Loader(msg) => write!(f, "failed to load the GL API: {msg}"),
        }
    }
}

impl Error for SetupError {}

/// The window, its GL surface and context, and the loaded entry points,
/// owned together for the lifetime of the process.
pub struct GlWindow {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    gl: glow::Context,
}

impl GlWindow {
    /// Create the window together with a current OpenGL 3.3 core context.
    ///
    /// Requests exactly one context version; an unsupported driver is a
    /// [`SetupError::WindowCreation`], not a cue to try older versions.
    pub fn create(event_loop: &EventLoopWindowTarget<()>) -> Result<Self, SetupError> {
        let window_builder = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT));

        // Build the display along with the window. Any config works here;
        // the flag needs nothing beyond a color buffer.
        let display = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display
            .build(event_loop, ConfigTemplateBuilder::new(), |mut configs| {
                configs.next().unwrap()
            })
            .map_err(SetupError::Init)?;
        let window = window
            .ok_or_else(|| SetupError::WindowCreation("display produced no window".into()))?;

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let gl_display = gl_config.display();
        let context = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| SetupError::WindowCreation(e.into()))?;

        let attrs = window.build_surface_attributes(<_>::default());
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .map_err(|e| SetupError::WindowCreation(e.into()))?;

        let context = context
            .make_current(&surface)
            .map_err(|e| SetupError::WindowCreation(e.into()))?;

        // Vsync paces the render loop; one buffered frame between swaps.
        if let Err(res) =
            surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
        {
            tracing::warn!("error setting vsync: {res:?}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| gl_display.get_proc_address(s) as *const _)
        };

        let version = gl.version();
        tracing::debug!(
            "loaded GL {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info,
        );
        if version.major < 3 || (version.major == 3 && version.minor < 3) {
            return Err(SetupError::Loader(format!(
                "OpenGL 3.3 or higher is required, got {}.{}",
                version.major, version.minor
            )));
        }

        if gl.supported_extensions().contains("GL_KHR_debug") {
            unsafe {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.debug_message_callback(debug_message_callback);
            }
        }

        Ok(Self {
            window,
            surface,
            context,
            gl,
        })
    }

    /// The loaded GL entry points. The context stays current on the main
    /// thread for the lifetime of this value.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Track a window resize: grow the surface and point the viewport at
    /// the new pixel dimensions. Zero-sized updates are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        // EGL-backed platforms need the surface resized explicitly;
        // elsewhere this is a no-op.
        self.surface.resize(
            &self.context,
            NonZeroU32::new(size.width).unwrap(),
            NonZeroU32::new(size.height).unwrap(),
        );

        unsafe {
            self.gl
                .viewport(0, 0, size.width as i32, size.height as i32);
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Present the finished frame. Blocks until the display is ready for
    /// it when vsync is on.
    pub fn swap_buffers(&self) {
        self.surface.swap_buffers(&self.context).unwrap();
    }
}

fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let source = match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        glow::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    };

    let ty = match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        glow::DEBUG_TYPE_OTHER => "Other",
        _ => "Unknown",
    };

    match severity {
        glow::DEBUG_SEVERITY_HIGH => {
            tracing::error!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_LOW => {
            tracing::info!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_NOTIFICATION => {
            tracing::debug!("{ty}-{id} ({source}): {message}");
        }
        _ => (),
    };
}
