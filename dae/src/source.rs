//! Raw sources and the strided accessors that view them

use serde::{Deserialize, Serialize};

use crate::traits::{impl_has_id, impl_has_name, HasId};

/// One named flat array plus the accessor describing how to read it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub array: DataArray,
    /// `<technique_common><accessor>`; sources without one cannot be resolved
    #[serde(default)]
    pub accessor: Option<Accessor>,
}

impl_has_id!(Source);
impl_has_name!(Source);

/// Typed backing array of a [`Source`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataArray {
    Float {
        #[serde(default)]
        id: Option<String>,
        values: Vec<f32>,
    },
    Int {
        #[serde(default)]
        id: Option<String>,
        values: Vec<i64>,
    },
    Bool {
        #[serde(default)]
        id: Option<String>,
        values: Vec<bool>,
    },
    Name {
        #[serde(default)]
        id: Option<String>,
        values: Vec<String>,
    },
    IdRef {
        #[serde(default)]
        id: Option<String>,
        values: Vec<String>,
    },
}

impl DataArray {
    pub fn len(&self) -> usize {
        match self {
            DataArray::Float { values, .. } => values.len(),
            DataArray::Int { values, .. } => values.len(),
            DataArray::Bool { values, .. } => values.len(),
            DataArray::Name { values, .. } | DataArray::IdRef { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            DataArray::Float { .. } => "float_array",
            DataArray::Int { .. } => "int_array",
            DataArray::Bool { .. } => "bool_array",
            DataArray::Name { .. } => "Name_array",
            DataArray::IdRef { .. } => "IDREF_array",
        }
    }
}

impl HasId for DataArray {
    fn id(&self) -> Option<&str> {
        match self {
            DataArray::Float { id, .. }
            | DataArray::Int { id, .. }
            | DataArray::Bool { id, .. }
            | DataArray::Name { id, .. }
            | DataArray::IdRef { id, .. } => id.as_deref(),
        }
    }
}

/// A strided view of a [`DataArray`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    /// Reference to the backing array (`#array-id`)
    pub source: String,
    pub count: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default)]
    pub params: Vec<Param>,
}

fn default_stride() -> usize {
    1
}

impl Accessor {
    /// Number of components produced per tuple (skip params excluded)
    pub fn tuple_width(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.is_skip())
            .map(Param::width)
            .sum()
    }

    /// Number of array slots one element occupies, skip params included
    pub fn element_span(&self) -> usize {
        self.params.iter().map(Param::width).sum()
    }

    /// Number of backing values needed to read every tuple.
    ///
    /// `offset + (count - 1) * stride + span`; zero when `count` is zero and
    /// `None` when the range does not fit in `usize`.
    pub fn required_len(&self) -> Option<usize> {
        if self.count == 0 {
            return Some(0);
        }
        (self.count - 1)
            .checked_mul(self.stride)?
            .checked_add(self.offset)?
            .checked_add(self.element_span().max(1))
    }
}

/// One component slot of an accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Unnamed params are skipped when reading tuples
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_param_type")]
    pub ty: String,
}

fn default_param_type() -> String {
    "float".to_string()
}

impl Param {
    pub fn named(name: &str, ty: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ty: ty.to_string(),
        }
    }

    pub fn skip(ty: &str) -> Self {
        Self {
            name: None,
            ty: ty.to_string(),
        }
    }

    pub fn is_skip(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
    }

    /// Array slots occupied by this param (`float4x4` spans 16)
    pub fn width(&self) -> usize {
        match self.ty.as_str() {
            "float4x4" => 16,
            "float3x3" => 9,
            "float2x2" | "float4" | "int4" => 4,
            "float3" | "int3" => 3,
            "float2" | "int2" => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xyz_accessor(count: usize, offset: usize, stride: usize) -> Accessor {
        Accessor {
            source: "#arr".into(),
            count,
            offset,
            stride,
            params: vec![
                Param::named("X", "float"),
                Param::named("Y", "float"),
                Param::named("Z", "float"),
            ],
        }
    }

    #[test]
    fn test_required_len() {
        assert_eq!(xyz_accessor(3, 0, 3).required_len(), Some(9));
        assert_eq!(xyz_accessor(3, 2, 4).required_len(), Some(2 + 8 + 3));
        assert_eq!(xyz_accessor(0, 5, 3).required_len(), Some(0));
    }

    #[test]
    fn test_required_len_overflow() {
        assert_eq!(xyz_accessor(usize::MAX / 2, 0, 3).required_len(), None);
        assert_eq!(xyz_accessor(2, usize::MAX, 3).required_len(), None);
    }

    #[test]
    fn test_skip_params_count_toward_span_only() {
        let accessor = Accessor {
            source: "#arr".into(),
            count: 2,
            offset: 0,
            stride: 3,
            params: vec![
                Param::named("S", "float"),
                Param::skip("float"),
                Param::named("T", "float"),
            ],
        };
        assert_eq!(accessor.tuple_width(), 2);
        assert_eq!(accessor.element_span(), 3);
    }

    #[test]
    fn test_matrix_param_width() {
        let param = Param::named("TRANSFORM", "float4x4");
        assert_eq!(param.width(), 16);
    }

    #[test]
    fn test_data_array_json_shape() {
        let json = r#"{"type":"name","id":"joints-array","values":["hip","knee"]}"#;
        let array: DataArray = serde_json::from_str(json).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.id(), Some("joints-array"));
        assert_eq!(array.type_name(), "Name_array");
    }
}
