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

//! Stripe geometry and its GPU-side buffers.
//!
//! The flag is five horizontal bands of equal height tiling clip space.
//! Each band is a quad with its own vertex array, vertex buffer, and
//! index buffer; the index list is shared by all five.

use glow::HasContext;

use crate::shader::{CallOnDrop, GlError, ResultExt, StripeColor};

// Each quad lists its corners clockwise from the top right.
const STRIPE_BLUE_TOP: [f32; 12] = [
    1.0, 1.0, 0.0, //
    1.0, 0.6, 0.0, //
    -1.0, 0.6, 0.0, //
    -1.0, 1.0, 0.0,
];
const STRIPE_PINK_TOP: [f32; 12] = [
    1.0, 0.6, 0.0, //
    1.0, 0.2, 0.0, //
    -1.0, 0.2, 0.0, //
    -1.0, 0.6, 0.0,
];
const STRIPE_WHITE: [f32; 12] = [
    1.0, 0.2, 0.0, //
    1.0, -0.2, 0.0, //
    -1.0, -0.2, 0.0, //
    -1.0, 0.2, 0.0,
];
const STRIPE_PINK_BOTTOM: [f32; 12] = [
    1.0, -0.2, 0.0, //
    1.0, -0.6, 0.0, //
    -1.0, -0.6, 0.0, //
    -1.0, -0.2, 0.0,
];
const STRIPE_BLUE_BOTTOM: [f32; 12] = [
    1.0, -0.6, 0.0, //
    1.0, -1.0, 0.0, //
    -1.0, -1.0, 0.0, //
    -1.0, -0.6, 0.0,
];

/// Triangle index list shared by every stripe quad.
pub const STRIPE_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// One band of the flag. Discriminants index the [`Flag`] arena, top
/// band first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stripe {
    BlueTop,
    PinkTop,
    White,
    PinkBottom,
    BlueBottom,
}

impl Stripe {
    pub fn vertices(self) -> &'static [f32; 12] {
        match self {
            Stripe::BlueTop => &STRIPE_BLUE_TOP,
            Stripe::PinkTop => &STRIPE_PINK_TOP,
            Stripe::White => &STRIPE_WHITE,
            Stripe::PinkBottom => &STRIPE_PINK_BOTTOM,
            Stripe::BlueBottom => &STRIPE_BLUE_BOTTOM,
        }
    }
}

/// Stripes grouped by program, in submission order. The order is part of
/// the program's observable behavior and must not change.
pub const DRAW_PLAN: [(StripeColor, &[Stripe]); 3] = [
    (StripeColor::Blue, &[Stripe::BlueTop, Stripe::BlueBottom]),
    (StripeColor::Pink, &[Stripe::PinkTop, Stripe::PinkBottom]),
    (StripeColor::White, &[Stripe::White]),
];

/// GPU-side storage for one stripe.
pub struct StripeMesh {
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
    ebo: glow::NativeBuffer,
}

impl StripeMesh {
    /// Upload one quad and the shared index list into fresh buffers.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn upload(gl: &glow::Context, vertices: &[f32; 12]) -> Result<Self, GlError> {
        let vbo = gl.create_buffer().gl_err()?;
        let ebo = gl.create_buffer().gl_err()?;
        let vao = gl.create_vertex_array().gl_err()?;

        gl.bind_vertex_array(Some(vao));
        let _unbind = CallOnDrop(|| gl.bind_vertex_array(None));

        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            glow::STATIC_DRAW,
        );

        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&STRIPE_INDICES),
            glow::STATIC_DRAW,
        );

        // Tightly packed, so stride 0 lets GL infer 3 floats per vertex.
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 0, 0);
        gl.enable_vertex_attrib_array(0);

        crate::shader::gl_error(gl);

        Ok(Self { vao, vbo, ebo })
    }

    /// Issue the indexed draw for this stripe.
    ///
    /// # Safety
    ///
    /// The context must be current and the caller has bound the program.
    pub unsafe fn draw(&self, gl: &glow::Context) {
        gl.bind_vertex_array(Some(self.vao));
        gl.draw_elements(
            glow::TRIANGLES,
            STRIPE_INDICES.len() as i32,
            glow::UNSIGNED_INT,
            0,
        );
    }

    /// # Safety
    ///
    /// The context must be current, and the mesh must not be drawn
    /// afterwards.
    pub unsafe fn delete(&self, gl: &glow::Context) {
        gl.delete_buffer(self.vbo);
        gl.delete_buffer(self.ebo);
        gl.delete_vertex_array(self.vao);
    }
}

/// The five stripe meshes, top band first.
pub struct Flag {
    meshes: [StripeMesh; 5],
}

impl Flag {
    /// Upload all five stripes.
    ///
    /// # Safety
    ///
    /// The context must be current.
    pub unsafe fn upload(gl: &glow::Context) -> Result<Self, GlError> {
        Ok(Self {
            meshes: [
                StripeMesh::upload(gl, Stripe::BlueTop.vertices())?,
                StripeMesh::upload(gl, Stripe::PinkTop.vertices())?,
                StripeMesh::upload(gl, Stripe::White.vertices())?,
                StripeMesh::upload(gl, Stripe::PinkBottom.vertices())?,
                StripeMesh::upload(gl, Stripe::BlueBottom.vertices())?,
            ],
        })
    }

    pub fn mesh(&self, stripe: Stripe) -> &StripeMesh {
        &self.meshes[stripe as usize]
    }

    /// Free every mesh.
    ///
    /// # Safety
    ///
    /// The context must be current, and the flag must not be drawn
    /// afterwards.
    pub unsafe fn delete(&self, gl: &glow::Context) {
        for mesh in &self.meshes {
            mesh.delete(gl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stripes in top-to-bottom visual order.
    const TOP_TO_BOTTOM: [Stripe; 5] = [
        Stripe::BlueTop,
        Stripe::PinkTop,
        Stripe::White,
        Stripe::PinkBottom,
        Stripe::BlueBottom,
    ];

    fn vertex(quad: &[f32; 12], corner: usize) -> [f32; 3] {
        [quad[corner * 3], quad[corner * 3 + 1], quad[corner * 3 + 2]]
    }

    #[test]
    fn bands_tile_clip_space_top_to_bottom() {
        let edges = [1.0f32, 0.6, 0.2, -0.2, -0.6, -1.0];

        for (i, stripe) in TOP_TO_BOTTOM.iter().enumerate() {
            let quad = stripe.vertices();
            let top = edges[i];
            let bottom = edges[i + 1];

            // TR, BR, BL, TL.
            assert_eq!(vertex(quad, 0)[1], top);
            assert_eq!(vertex(quad, 1)[1], bottom);
            assert_eq!(vertex(quad, 2)[1], bottom);
            assert_eq!(vertex(quad, 3)[1], top);
        }
    }

    #[test]
    fn stripes_span_full_width_at_depth_zero() {
        for stripe in TOP_TO_BOTTOM {
            let quad = stripe.vertices();

            for corner in 0..4 {
                let [x, _, z] = vertex(quad, corner);
                assert!(x == 1.0 || x == -1.0);
                assert_eq!(z, 0.0);
            }

            // Right-hand corners first, left-hand corners last.
            assert_eq!(vertex(quad, 0)[0], 1.0);
            assert_eq!(vertex(quad, 1)[0], 1.0);
            assert_eq!(vertex(quad, 2)[0], -1.0);
            assert_eq!(vertex(quad, 3)[0], -1.0);
        }
    }

    #[test]
    fn shared_indices_cover_each_quad_exactly() {
        let mut used = [false; 4];
        for &i in &STRIPE_INDICES {
            used[i as usize] = true;
        }
        assert_eq!(used, [true; 4]);

        for stripe in TOP_TO_BOTTOM {
            let quad = stripe.vertices();

            let areas: Vec<f32> = STRIPE_INDICES
                .chunks(3)
                .map(|tri| {
                    let a = vertex(quad, tri[0] as usize);
                    let b = vertex(quad, tri[1] as usize);
                    let c = vertex(quad, tri[2] as usize);
                    ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
                })
                .collect();

            // Two non-degenerate triangles that tile the 2.0 x 0.4 band
            // with no gap and no overlap.
            assert_eq!(areas.len(), 2);
            for &area in &areas {
                assert!((area - 0.4).abs() < 1e-6);
            }
            assert!((areas.iter().sum::<f32>() - 0.8).abs() < 1e-6);
        }
    }

    #[test]
    fn draw_plan_orders_blue_pink_white() {
        let flattened: Vec<(StripeColor, Stripe)> = DRAW_PLAN
            .iter()
            .flat_map(|(color, stripes)| stripes.iter().map(move |&stripe| (*color, stripe)))
            .collect();

        assert_eq!(
            flattened,
            [
                (StripeColor::Blue, Stripe::BlueTop),
                (StripeColor::Blue, Stripe::BlueBottom),
                (StripeColor::Pink, Stripe::PinkTop),
                (StripeColor::Pink, Stripe::PinkBottom),
                (StripeColor::White, Stripe::White),
            ]
        );

        // Six indices per draw call, thirty per frame.
        assert_eq!(flattened.len() * STRIPE_INDICES.len(), 30);
    }
}
