//! Small document builders shared by the unit tests

use nether_dae::{
    Accessor, DataArray, Document, GeometricElement, Geometry, Mesh, Param, Primitive,
    PrimitiveData, Semantic, SharedInput, Source, UnsharedInput, Vertices,
};

pub(crate) fn float_source(id: &str, params: &[&str], values: Vec<f32>) -> Source {
    let width = params.len().max(1);
    Source {
        id: Some(id.to_string()),
        name: None,
        accessor: Some(Accessor {
            source: format!("#{id}-array"),
            count: values.len() / width,
            offset: 0,
            stride: width,
            params: params.iter().map(|p| Param::named(p, "float")).collect(),
        }),
        array: DataArray::Float {
            id: Some(format!("{id}-array")),
            values,
        },
    }
}

pub(crate) fn matrix_source(id: &str, values: Vec<f32>) -> Source {
    Source {
        id: Some(id.to_string()),
        name: None,
        accessor: Some(Accessor {
            source: format!("#{id}-array"),
            count: values.len() / 16,
            offset: 0,
            stride: 16,
            params: vec![Param::named("TRANSFORM", "float4x4")],
        }),
        array: DataArray::Float {
            id: Some(format!("{id}-array")),
            values,
        },
    }
}

pub(crate) fn name_source(id: &str, param: &str, values: &[&str]) -> Source {
    Source {
        id: Some(id.to_string()),
        name: None,
        accessor: Some(Accessor {
            source: format!("#{id}-array"),
            count: values.len(),
            offset: 0,
            stride: 1,
            params: vec![Param::named(param, "name")],
        }),
        array: DataArray::Name {
            id: Some(format!("{id}-array")),
            values: values.iter().map(|v| v.to_string()).collect(),
        },
    }
}

pub(crate) fn input(semantic: Semantic, source: &str, offset: usize) -> SharedInput {
    SharedInput {
        semantic,
        source: format!("#{source}"),
        offset,
        set: None,
    }
}

pub(crate) fn input_set(semantic: Semantic, source: &str, offset: usize, set: u32) -> SharedInput {
    SharedInput {
        set: Some(set),
        ..input(semantic, source, offset)
    }
}

pub(crate) fn unshared(semantic: Semantic, source: &str) -> UnsharedInput {
    UnsharedInput {
        semantic,
        source: format!("#{source}"),
    }
}

pub(crate) fn primitive(
    material: Option<&str>,
    inputs: Vec<SharedInput>,
    data: PrimitiveData,
) -> Primitive {
    Primitive {
        name: None,
        material: material.map(str::to_string),
        count: 0,
        inputs,
        data,
    }
}

/// Mesh geometry whose `<vertices>` (id `{id}-vertices`) holds the given inputs
pub(crate) fn mesh_geometry(
    id: &str,
    sources: Vec<Source>,
    vertex_inputs: Vec<UnsharedInput>,
    primitives: Vec<Primitive>,
) -> Geometry {
    Geometry {
        id: Some(id.to_string()),
        name: Some(id.to_string()),
        element: GeometricElement::Mesh(Mesh {
            sources,
            vertices: Vertices {
                id: format!("{id}-vertices"),
                name: None,
                inputs: vertex_inputs,
            },
            primitives,
        }),
    }
}

pub(crate) fn doc_with_geometry(geometry: Geometry) -> Document {
    Document {
        geometries: vec![geometry],
        ..Default::default()
    }
}
