//! Matrix forms of transform elements
//!
//! Document matrices are row-major and column-vector (`p' = M · p`), so a
//! node's local matrix is the left-to-right product of its transform stack in
//! document order: the last element applies to the point first.

use glam::{Mat4, Vec3, Vec4};
use nether_dae::{Transform, TransformKind, UpAxis};

/// Convert a row-major document matrix into a glam matrix
pub fn from_row_major(values: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(values).transpose()
}

/// Convert a glam matrix back into row-major document order
pub fn to_row_major(matrix: &Mat4) -> [f32; 16] {
    matrix.transpose().to_cols_array()
}

/// Matrix form of one element, with translation-valued parts scaled by
/// `unit_scale`.
pub fn to_matrix(kind: &TransformKind, unit_scale: f32) -> Mat4 {
    match kind {
        TransformKind::Matrix(values) => scale_translation(from_row_major(values), unit_scale),
        TransformKind::Translate([x, y, z]) => {
            Mat4::from_translation(Vec3::new(*x, *y, *z) * unit_scale)
        }
        TransformKind::Rotate([x, y, z, angle]) => rotation(Vec3::new(*x, *y, *z), *angle),
        TransformKind::Scale([x, y, z]) => Mat4::from_scale(Vec3::new(*x, *y, *z)),
        TransformKind::Skew(values) => skew(values),
        TransformKind::Lookat(values) => lookat(values, unit_scale),
    }
}

/// `T1 · T2 · … · Tn` over the stack in document order
pub fn compose_local(transforms: &[Transform], unit_scale: f32) -> Mat4 {
    transforms
        .iter()
        .fold(Mat4::IDENTITY, |acc, t| acc * to_matrix(&t.kind, unit_scale))
}

/// Rotation taking a document's up axis onto +Y
pub fn up_axis_correction(up_axis: UpAxis) -> Mat4 {
    match up_axis {
        UpAxis::YUp => Mat4::IDENTITY,
        // Z up: (x, y, z) -> (x, z, -y)
        UpAxis::ZUp => Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        // X up: (x, y, z) -> (-y, x, z)
        UpAxis::XUp => Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2),
    }
}

/// Scale the translation column of an affine matrix
pub fn scale_translation(mut matrix: Mat4, unit_scale: f32) -> Mat4 {
    if unit_scale != 1.0 {
        let w = matrix.w_axis;
        matrix.w_axis = Vec4::new(w.x * unit_scale, w.y * unit_scale, w.z * unit_scale, w.w);
    }
    matrix
}

fn rotation(axis: Vec3, degrees: f32) -> Mat4 {
    match axis.try_normalize() {
        Some(axis) => Mat4::from_axis_angle(axis, degrees.to_radians()),
        None => Mat4::IDENTITY,
    }
}

/// `[angle, rotation axis, translation axis]`, RenderMan-style skew
fn skew(values: &[f32; 7]) -> Mat4 {
    let angle = values[0].to_radians();
    let (Some(a), Some(b)) = (
        Vec3::new(values[1], values[2], values[3]).try_normalize(),
        Vec3::new(values[4], values[5], values[6]).try_normalize(),
    ) else {
        return Mat4::IDENTITY;
    };

    // Component of `a` perpendicular to `b`
    let a1 = b * a.dot(b);
    let a2 = a - a1;
    let Some(a2) = a2.try_normalize() else {
        return Mat4::IDENTITY;
    };

    let an1 = a.dot(a2);
    let an2 = a.dot(b);
    let rx = an1 * angle.cos() - an2 * angle.sin();
    let ry = an1 * angle.sin() + an2 * angle.cos();
    if rx.abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    let alpha = ry / rx - an2 / an1;

    // M = I + alpha * (b ⊗ a2), applied to column vectors
    let mut m = Mat4::IDENTITY;
    m.x_axis += (b * (alpha * a2.x)).extend(0.0);
    m.y_axis += (b * (alpha * a2.y)).extend(0.0);
    m.z_axis += (b * (alpha * a2.z)).extend(0.0);
    m
}

/// `[eye, interest, up]` camera-style placement (object-to-parent)
fn lookat(values: &[f32; 9], unit_scale: f32) -> Mat4 {
    let eye = Vec3::new(values[0], values[1], values[2]) * unit_scale;
    let interest = Vec3::new(values[3], values[4], values[5]) * unit_scale;
    let up = Vec3::new(values[6], values[7], values[8]);
    if (interest - eye).length_squared() <= f32::EPSILON || up.length_squared() <= f32::EPSILON {
        return Mat4::from_translation(eye);
    }
    Mat4::look_at_rh(eye, interest, up).inverse()
}
