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

//! Renders the five-stripe transgender pride flag in an OpenGL 3.3 core
//! window. The content is static; the render loop only keeps the window
//! responsive and redraws the same frame at the display's refresh rate.
//! Close the window or press escape to quit.

mod context;
mod shader;
mod stripe;

use glow::HasContext;

use std::process;

use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::EventLoop;

use context::GlWindow;
use shader::Programs;
use stripe::{Flag, DRAW_PLAN};

fn main() {
    tracing_subscriber::fmt::init();

    let event_loop = EventLoop::new();

    let gl_window = match GlWindow::create(&event_loop) {
        Ok(gl_window) => gl_window,
        Err(err) => fail(&err),
    };

    // One-time GPU setup: three programs sharing a vertex shader, then
    // the five stripe meshes.
    let gl = gl_window.gl();
    let programs = match unsafe { Programs::compile(gl) } {
        Ok(programs) => programs,
        Err(err) => fail(&err),
    };
    let flag = match unsafe { Flag::upload(gl) } {
        Ok(flag) => flag,
        Err(err) => fail(&err),
    };

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_poll();

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => control_flow.set_exit(),
                WindowEvent::Resized(size) => gl_window.resize(size),
                _ => (),
            },
            Event::RedrawEventsCleared => {
                let gl = gl_window.gl();

                unsafe {
                    gl.clear_color(0.0, 0.0, 0.0, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT);

                    for (color, stripes) in DRAW_PLAN {
                        gl.use_program(Some(programs.get(color)));

                        for stripe in stripes {
                            flag.mesh(*stripe).draw(gl);
                        }
                    }
                }

                gl_window.request_redraw();
                gl_window.swap_buffers();
            }
            Event::LoopDestroyed => {
                // Free the GPU objects before the context goes away.
                let gl = gl_window.gl();
                unsafe {
                    flag.delete(gl);
                    programs.delete(gl);
                }
            }
            _ => (),
        }
    })
}

/// Report a fatal setup failure and bail. One line on stdout, nonzero
/// exit status, no retries.
fn fail(err: &dyn std::error::Error) -> ! {
    println!("{err}");
    process::exit(1);
}
