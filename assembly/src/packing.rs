//! Interleaved vertex buffers for composed submeshes
//!
//! Vertex layout (in order): Position → UV → Color → Normal → Skinning
//! - Position: f32 × 3 (12 bytes)
//! - UV: f32 × 2, first texcoord set (8 bytes)
//! - Color: f32 × 4 (16 bytes)
//! - Normal: f32 × 3 (12 bytes)
//! - Skinning: joint indices u16 × 4 + weights f32 × 4 (24 bytes)
//!
//! Attributes missing on some vertices of a submesh are filled with
//! defaults so every vertex has the same stride. All values are written
//! little-endian regardless of the host.

use bytemuck::{cast_slice, Pod};
use thiserror::Error;

use crate::mesh::Submesh;

/// Vertex format flag: has UV coordinates
pub const FORMAT_UV: u8 = 1;
/// Vertex format flag: has per-vertex RGBA color
pub const FORMAT_COLOR: u8 = 2;
/// Vertex format flag: has normals
pub const FORMAT_NORMAL: u8 = 4;
/// Vertex format flag: has joint indices and weights
pub const FORMAT_SKINNED: u8 = 8;

/// Influences per vertex in the packed layout
pub const PACKED_INFLUENCES: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum PackingError {
    #[error("vertex {vertex} has {count} influences, packed layout holds {PACKED_INFLUENCES}")]
    TooManyInfluences { vertex: usize, count: usize },
    #[error("index {index} does not fit in 16 bits")]
    IndexOverflow { index: u32 },
}

/// Vertex stride in bytes for `format`
#[inline]
pub const fn vertex_stride(format: u8) -> u32 {
    let mut stride = 12; // Position: Float32x3

    if format & FORMAT_UV != 0 {
        stride += 8;
    }
    if format & FORMAT_COLOR != 0 {
        stride += 16;
    }
    if format & FORMAT_NORMAL != 0 {
        stride += 12;
    }
    if format & FORMAT_SKINNED != 0 {
        stride += 24;
    }

    stride
}

/// Format flags covering every attribute present on any vertex
pub fn submesh_format(submesh: &Submesh) -> u8 {
    submesh.vertices.iter().fold(0u8, |format, v| {
        let mut format = format;
        if !v.texcoords.is_empty() {
            format |= FORMAT_UV;
        }
        if v.color.is_some() {
            format |= FORMAT_COLOR;
        }
        if v.normal.is_some() {
            format |= FORMAT_NORMAL;
        }
        if v.is_skinned() {
            format |= FORMAT_SKINNED;
        }
        format
    })
}

/// GPU-ready copy of one submesh
#[derive(Debug, Clone, PartialEq)]
pub struct PackedMesh {
    pub format: u8,
    pub stride: u32,
    pub vertex_count: usize,
    pub bytes: Vec<u8>,
    pub indices: Vec<u32>,
}

/// Interleave `submesh` in the layout named by its format.
pub fn interleave(submesh: &Submesh) -> Result<PackedMesh, PackingError> {
    let format = submesh_format(submesh);
    let has_uv = format & FORMAT_UV != 0;
    let has_color = format & FORMAT_COLOR != 0;
    let has_normal = format & FORMAT_NORMAL != 0;
    let has_skinning = format & FORMAT_SKINNED != 0;

    let stride = vertex_stride(format);
    let mut bytes = Vec::with_capacity(submesh.vertices.len() * stride as usize);

    for (i, v) in submesh.vertices.iter().enumerate() {
        put_le(&mut bytes, &v.position);

        if has_uv {
            let uv = v.texcoords.first().copied().unwrap_or([0.0, 0.0]);
            put_le(&mut bytes, &uv);
        }

        if has_color {
            let color = v.color.unwrap_or([1.0, 1.0, 1.0, 1.0]);
            put_le(&mut bytes, &color);
        }

        if has_normal {
            let normal = v.normal.unwrap_or([0.0, 1.0, 0.0]);
            put_le(&mut bytes, &normal);
        }

        if has_skinning {
            if v.joints.len() > PACKED_INFLUENCES {
                return Err(PackingError::TooManyInfluences {
                    vertex: i,
                    count: v.joints.len(),
                });
            }
            let mut joints = [0u16; PACKED_INFLUENCES];
            let mut weights = [0.0f32; PACKED_INFLUENCES];
            for (slot, &joint) in joints.iter_mut().zip(&v.joints) {
                *slot = joint;
            }
            for (slot, &weight) in weights.iter_mut().zip(&v.weights) {
                *slot = weight;
            }
            put_le(&mut bytes, &joints);
            put_le(&mut bytes, &weights);
        }
    }

    Ok(PackedMesh {
        format,
        stride,
        vertex_count: submesh.vertices.len(),
        bytes,
        indices: submesh.indices.clone(),
    })
}

/// Append `values` as little-endian bytes
fn put_le<T: Pod>(bytes: &mut Vec<u8>, values: &[T]) {
    let start = bytes.len();
    bytes.extend_from_slice(cast_slice(values));
    if cfg!(target_endian = "big") {
        for value in bytes[start..].chunks_exact_mut(std::mem::size_of::<T>()) {
            value.reverse();
        }
    }
}

/// Narrow indices for 16-bit index buffers
pub fn narrow_indices_u16(indices: &[u32]) -> Result<Vec<u16>, PackingError> {
    indices
        .iter()
        .map(|&index| u16::try_from(index).map_err(|_| PackingError::IndexOverflow { index }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CompositeVertex, Topology};
    use smallvec::smallvec;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn shorts(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    fn submesh(vertices: Vec<CompositeVertex>) -> Submesh {
        Submesh {
            material: None,
            topology: Topology::TriangleList,
            indices: (0..vertices.len() as u32).collect(),
            vertices,
        }
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(vertex_stride(0), 12);
        assert_eq!(vertex_stride(FORMAT_UV), 20);
        assert_eq!(vertex_stride(FORMAT_UV | FORMAT_NORMAL), 32);
        assert_eq!(
            vertex_stride(FORMAT_UV | FORMAT_COLOR | FORMAT_NORMAL | FORMAT_SKINNED),
            72
        );
    }

    #[test]
    fn test_position_only() {
        let packed = interleave(&submesh(vec![CompositeVertex {
            position: [1.0, 2.0, 3.0],
            ..Default::default()
        }]))
        .unwrap();
        assert_eq!(packed.format, 0);
        assert_eq!(packed.bytes.len(), 12);
        assert_eq!(floats(&packed.bytes), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bytes_are_little_endian() {
        let packed = interleave(&submesh(vec![CompositeVertex {
            position: [1.0, 0.0, -2.0],
            joints: smallvec![258],
            weights: smallvec![1.0],
            ..Default::default()
        }]))
        .unwrap();
        assert_eq!(&packed.bytes[0..4], &[0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(&packed.bytes[8..12], &[0x00, 0x00, 0x00, 0xc0]);
        assert_eq!(&packed.bytes[12..14], &[0x02, 0x01]);
    }

    #[test]
    fn test_missing_attributes_use_defaults() {
        let packed = interleave(&submesh(vec![
            CompositeVertex {
                normal: Some([0.0, 0.0, 1.0]),
                ..Default::default()
            },
            CompositeVertex::default(),
        ]))
        .unwrap();
        assert_eq!(packed.format, FORMAT_NORMAL);
        assert_eq!(packed.bytes.len(), 2 * 24);
        assert_eq!(floats(&packed.bytes[24..])[3..], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_skinning_padded_to_four() {
        let packed = interleave(&submesh(vec![CompositeVertex {
            joints: smallvec![2, 5],
            weights: smallvec![0.75, 0.25],
            ..Default::default()
        }]))
        .unwrap();
        assert_eq!(packed.format, FORMAT_SKINNED);
        assert_eq!(shorts(&packed.bytes[12..20]), vec![2, 5, 0, 0]);
        assert_eq!(floats(&packed.bytes[20..36]), vec![0.75, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_too_many_influences() {
        let err = interleave(&submesh(vec![CompositeVertex {
            joints: smallvec![0, 1, 2, 3, 4],
            weights: smallvec![0.2; 5],
            ..Default::default()
        }]))
        .unwrap_err();
        assert_eq!(err, PackingError::TooManyInfluences { vertex: 0, count: 5 });
    }

    #[test]
    fn test_narrow_indices() {
        assert_eq!(narrow_indices_u16(&[0, 1, 65535]).unwrap(), vec![0, 1, 65535]);
        assert_eq!(
            narrow_indices_u16(&[0, 65536]).unwrap_err(),
            PackingError::IndexOverflow { index: 65536 }
        );
    }
}
