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

//! Shader compilation and the three stripe programs.
//!
//! One pass-through vertex shader is shared by three programs whose
//! fragment shaders each emit a single flag color.

use glow::HasContext;

use std::fmt;

// The sources are small enough to keep inline; nothing is loaded from
// disk.
const VERTEX_SHADER: &str = "
#version 330 core

layout (location = 0) in vec3 aPos;

void main() {
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

const FRAGMENT_SHADER_BLUE: &str = "
#version 330 core

out vec4 FragColor;

void main() {
    FragColor = vec4(0.36, 0.81, 0.98, 1.0);
}
";

const FRAGMENT_SHADER_PINK: &str = "
#version 330 core

out vec4 FragColor;

void main() {
    FragColor = vec4(0.96, 0.62, 0.72, 1.0);
}
";

const FRAGMENT_SHADER_WHITE: &str = "
#version 330 core

out vec4 FragColor;

void main() {
    FragColor = vec4(1.0, 1.0, 1.0, 1.0);
}
";

/// Which of the three stripe programs a draw call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeColor {
    Blue,
    Pink,
    White,
}

/// The three linked shader programs, one per stripe color.
pub struct Programs {
    blue: glow::NativeProgram,
    pink: glow::NativeProgram,
    white: glow::NativeProgram,
}

impl Programs {
    /// Compile the shared vertex shader and link the three programs.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn compile(gl: &glow::Context) -> Result<Self, GlError> {
        let vertex = compile_shader(gl, glow::VERTEX_SHADER, VERTEX_SHADER)?;
        let _delete_vertex = CallOnDrop(|| gl.delete_shader(vertex));

        let blue = link_stripe_program(gl, vertex, FRAGMENT_SHADER_BLUE)?;
        let pink = link_stripe_program(gl, vertex, FRAGMENT_SHADER_PINK)?;
        let white = link_stripe_program(gl, vertex, FRAGMENT_SHADER_WHITE)?;

        Ok(Self { blue, pink, white })
    }

    pub fn get(&self, color: StripeColor) -> glow::NativeProgram {
        match color {
            StripeColor::Blue => self.blue,
            StripeColor::Pink => self.pink,
            StripeColor::White => self.white,
        }
    }

    /// Free the programs.
    ///
    /// # Safety
    ///
    /// The context must be current, and the programs must not be used
    /// afterwards.
    pub unsafe fn delete(&self, gl: &glow::Context) {
        gl.delete_program(self.blue);
        gl.delete_program(self.pink);
        gl.delete_program(self.white);
    }
}

/// Link one fragment shader against the shared vertex shader.
///
/// The stock sources always compile and link; a failed status is reported
/// with the driver's log rather than tearing the context down mid-setup,
/// and the handle is returned as-is.
unsafe fn link_stripe_program(
    gl: &glow::Context,
    vertex: glow::NativeShader,
    fragment_source: &str,
) -> Result<glow::NativeProgram, GlError> {
    let fragment = compile_shader(gl, glow::FRAGMENT_SHADER, fragment_source)?;
    let _delete_fragment = CallOnDrop(|| gl.delete_shader(fragment));

    let program = gl.create_program().gl_err()?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    let _detach_shaders = CallOnDrop(|| {
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
    });
    gl.link_program(program);

    if !gl.get_program_link_status(program) {
        tracing::error!(
            "program failed to link: {}",
            gl.get_program_info_log(program)
        );
    }

    gl_error(gl);

    Ok(program)
}

unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::NativeShader, GlError> {
    let shader = gl.create_shader(shader_type).gl_err()?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        tracing::error!(
            "shader failed to compile: {}",
            gl.get_shader_info_log(shader)
        );
    }

    Ok(shader)
}

/// A GL object could not be allocated.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

/// Drain the GL error queue into the log.
pub(crate) fn gl_error(gl: &glow::Context) {
    let err = unsafe { gl.get_error() };

    if err != glow::NO_ERROR {
        let error_str = match err {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => "Unknown GL error",
        };

        tracing::error!("GL error: {}", error_str)
    }
}

pub(crate) trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}

pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pull the RGBA literal out of a fragment shader body.
    fn fragment_color(source: &str) -> [f32; 4] {
        let start = source.find("vec4(").expect("no vec4 literal") + "vec4(".len();
        let end = start + source[start..].find(')').expect("unterminated vec4");
        let mut channels = source[start..end]
            .split(',')
            .map(|c| c.trim().parse::<f32>().expect("bad channel literal"));

        std::array::from_fn(|_| channels.next().expect("missing channel"))
    }

    #[test]
    fn fragment_colors_match_the_flag() {
        assert_eq!(
            fragment_color(FRAGMENT_SHADER_BLUE),
            [0.36, 0.81, 0.98, 1.0]
        );
        assert_eq!(
            fragment_color(FRAGMENT_SHADER_PINK),
            [0.96, 0.62, 0.72, 1.0]
        );
        assert_eq!(fragment_color(FRAGMENT_SHADER_WHITE), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn sources_target_gl33_core() {
        for source in [
            VERTEX_SHADER,
            FRAGMENT_SHADER_BLUE,
            FRAGMENT_SHADER_PINK,
            FRAGMENT_SHADER_WHITE,
        ] {
            assert_eq!(
                source.trim_start().lines().next(),
                Some("#version 330 core")
            );
        }
    }

    #[test]
    fn vertex_shader_passes_attribute_zero_through() {
        assert!(VERTEX_SHADER.contains("layout (location = 0) in vec3 aPos;"));
        assert!(VERTEX_SHADER.contains("gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);"));
    }
}
