//! The vertex layout shared by every imported mesh.

use glam::{Vec2, Vec3};
use glow::HasContext;

use crate::abs::Vertex;

/// Maximum number of bones that can influence a single vertex.
pub const MAX_BONE_INFLUENCE: usize = 4;

/// One vertex of a renderable mesh. The bone arrays are part of the GPU
/// layout but stay zero on this loading path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub bone_weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for ModelVertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            tex_coords: Vec2::ZERO,
            tangent: Vec3::ZERO,
            bitangent: Vec3::ZERO,
            bone_ids: [0; MAX_BONE_INFLUENCE],
            bone_weights: [0.0; MAX_BONE_INFLUENCE],
        }
    }
}

impl Vertex for ModelVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = size_of::<ModelVertex>() as i32;
            let mut offset = 0;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, offset);
            offset += size_of::<Vec3>() as i32;

            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, offset);
            offset += size_of::<Vec3>() as i32;

            // Texture coordinate attribute
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, offset);
            offset += size_of::<Vec2>() as i32;

            // Tangent attribute
            gl.enable_vertex_attrib_array(3);
            gl.vertex_attrib_pointer_f32(3, 3, glow::FLOAT, false, stride, offset);
            offset += size_of::<Vec3>() as i32;

            // Bitangent attribute
            gl.enable_vertex_attrib_array(4);
            gl.vertex_attrib_pointer_f32(4, 3, glow::FLOAT, false, stride, offset);
            offset += size_of::<Vec3>() as i32;

            // Bone index attribute
            gl.enable_vertex_attrib_array(5);
            gl.vertex_attrib_pointer_i32(5, MAX_BONE_INFLUENCE as i32, glow::INT, stride, offset);
            offset += size_of::<[i32; MAX_BONE_INFLUENCE]>() as i32;

            // Bone weight attribute
            gl.enable_vertex_attrib_array(6);
            gl.vertex_attrib_pointer_f32(
                6,
                MAX_BONE_INFLUENCE as i32,
                glow::FLOAT,
                false,
                stride,
                offset,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        // 14 floats of geometry data plus 4 + 4 bone slots.
        assert_eq!(size_of::<ModelVertex>(), (14 + 4 + 4) * 4);
    }
}
