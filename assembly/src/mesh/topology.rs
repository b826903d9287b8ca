//! Primitive decoding and triangulation
//!
//! Every primitive kind is reduced to a flat list of index tuples, three per
//! triangle or two per line segment. Polygons and fans are triangulated from
//! their first corner; strips alternate winding so every triangle keeps the
//! orientation of the first.
//!
//! Fan triangulation assumes convex planar faces. Concave or non-planar faces
//! still produce valid (if visually wrong) triangles.

use nether_dae::PrimitiveData;

use super::types::Topology;
use crate::error::{AssemblyError, Result};

/// Corner tuples of one primitive, grouped by `topology`
#[derive(Debug)]
pub(crate) struct Corners<'a> {
    pub topology: Topology,
    pub tuples: Vec<&'a [u32]>,
}

pub(crate) fn decode<'a>(
    data: &'a PrimitiveData,
    stride: usize,
    context: &str,
) -> Result<Corners<'a>> {
    let stride = stride.max(1);
    let mut tuples = Vec::new();
    let topology = match data {
        PrimitiveData::Triangles { p } => {
            let corners = split(p, stride, context)?;
            if corners.len() % 3 != 0 {
                return Err(AssemblyError::topology(
                    context,
                    format!("{} corners do not form whole triangles", corners.len()),
                ));
            }
            tuples = corners;
            Topology::TriangleList
        }
        PrimitiveData::Polylist { vcount, p } => {
            let corners = split(p, stride, context)?;
            let expected: usize = vcount.iter().map(|&n| n as usize).sum();
            if expected != corners.len() {
                return Err(AssemblyError::bounds(
                    format!("{context}: polylist vcount"),
                    expected,
                    corners.len(),
                ));
            }
            let mut cursor = 0;
            for &arity in vcount {
                let arity = arity as usize;
                fan(&mut tuples, &corners[cursor..cursor + arity], context)?;
                cursor += arity;
            }
            Topology::TriangleList
        }
        PrimitiveData::Polygons { faces: lists } | PrimitiveData::Trifans { fans: lists } => {
            for list in lists {
                let corners = split(list, stride, context)?;
                fan(&mut tuples, &corners, context)?;
            }
            Topology::TriangleList
        }
        PrimitiveData::Tristrips { strips } => {
            for list in strips {
                let corners = split(list, stride, context)?;
                strip(&mut tuples, &corners, context)?;
            }
            Topology::TriangleList
        }
        PrimitiveData::Lines { p } => {
            let corners = split(p, stride, context)?;
            if corners.len() % 2 != 0 {
                return Err(AssemblyError::topology(
                    context,
                    format!("{} corners do not form whole segments", corners.len()),
                ));
            }
            tuples = corners;
            Topology::LineList
        }
        PrimitiveData::Linestrips { strips } => {
            for list in strips {
                let corners = split(list, stride, context)?;
                if corners.len() < 2 {
                    return Err(AssemblyError::topology(
                        context,
                        format!("line strip with {} corners", corners.len()),
                    ));
                }
                for pair in corners.windows(2) {
                    tuples.extend_from_slice(pair);
                }
            }
            Topology::LineList
        }
    };
    Ok(Corners { topology, tuples })
}

fn split<'a>(list: &'a [u32], stride: usize, context: &str) -> Result<Vec<&'a [u32]>> {
    if list.len() % stride != 0 {
        return Err(AssemblyError::bounds(
            format!("{context}: index list of stride {stride}"),
            list.len().div_ceil(stride) * stride,
            list.len(),
        ));
    }
    Ok(list.chunks_exact(stride).collect())
}

/// `(0, i, i + 1)` for every interior corner
fn fan<'a>(out: &mut Vec<&'a [u32]>, corners: &[&'a [u32]], context: &str) -> Result<()> {
    if corners.len() < 3 {
        return Err(AssemblyError::topology(
            context,
            format!("face with {} corners", corners.len()),
        ));
    }
    for i in 1..corners.len() - 1 {
        out.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
    }
    Ok(())
}

fn strip<'a>(out: &mut Vec<&'a [u32]>, corners: &[&'a [u32]], context: &str) -> Result<()> {
    if corners.len() < 3 {
        return Err(AssemblyError::topology(
            context,
            format!("triangle strip with {} corners", corners.len()),
        ));
    }
    for i in 0..corners.len() - 2 {
        if i % 2 == 0 {
            out.extend_from_slice(&[corners[i], corners[i + 1], corners[i + 2]]);
        } else {
            out.extend_from_slice(&[corners[i + 1], corners[i], corners[i + 2]]);
        }
    }
    Ok(())
}
