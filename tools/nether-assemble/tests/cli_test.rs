//! Integration tests for the nether-assemble binary
//!
//! Writes documents into a temp dir, runs the CLI and checks its output.

use std::path::Path;
use std::process::{Command, Output};

use nether_dae::{
    Accessor, DataArray, Document, GeometricElement, Geometry, InstanceGeometry, Mesh, Node,
    NodeInstance, Param, Primitive, PrimitiveData, Semantic, SharedInput, Source, UnsharedInput,
    Vertices, VisualScene,
};
use tempfile::tempdir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nether-assemble"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run nether-assemble")
}

/// One triangle instanced by one node
fn triangle_document(url: &str) -> Document {
    let positions = Source {
        id: Some("tri-pos".into()),
        name: None,
        accessor: Some(Accessor {
            source: "#tri-pos-array".into(),
            count: 3,
            offset: 0,
            stride: 3,
            params: ["X", "Y", "Z"]
                .iter()
                .map(|p| Param::named(p, "float"))
                .collect(),
        }),
        array: DataArray::Float {
            id: Some("tri-pos-array".into()),
            values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        },
    };
    let geometry = Geometry {
        id: Some("tri".into()),
        name: Some("Triangle".into()),
        element: GeometricElement::Mesh(Mesh {
            sources: vec![positions],
            vertices: Vertices {
                id: "tri-vertices".into(),
                name: None,
                inputs: vec![UnsharedInput {
                    semantic: Semantic::Position,
                    source: "#tri-pos".into(),
                }],
            },
            primitives: vec![Primitive {
                name: None,
                material: None,
                count: 1,
                inputs: vec![SharedInput {
                    semantic: Semantic::Vertex,
                    source: "#tri-vertices".into(),
                    offset: 0,
                    set: None,
                }],
                data: PrimitiveData::Triangles { p: vec![0, 1, 2] },
            }],
        }),
    };
    Document {
        geometries: vec![geometry],
        visual_scenes: vec![VisualScene {
            id: Some("scene".into()),
            name: None,
            nodes: vec![Node {
                id: Some("Prop".into()),
                instances: vec![NodeInstance::Geometry(InstanceGeometry {
                    url: url.into(),
                    name: None,
                    bind_material: None,
                })],
                ..Default::default()
            }],
        }],
        ..Default::default()
    }
}

fn write_document(path: &Path, doc: &Document) {
    let json = serde_json::to_string(doc).expect("Failed to serialize document");
    std::fs::write(path, json).expect("Failed to write document");
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&content).expect("Output is not JSON")
}

#[test]
fn test_assemble_writes_content() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.json");
    let output = dir.path().join("scene.out.json");
    write_document(&input, &triangle_document("#tri"));

    let result = run(&[
        "assemble",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let content = read_json(&output);
    let submeshes = content["meshes"]["tri"]["submeshes"].as_array().unwrap();
    assert_eq!(submeshes.len(), 1);
    assert_eq!(submeshes[0]["indices"], serde_json::json!([0, 1, 2]));
    assert_eq!(content["nodes"][0]["instances"][0]["mesh"], "tri");
}

#[test]
fn test_default_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.json");
    write_document(&input, &triangle_document("#tri"));

    let result = run(&["assemble", input.to_str().unwrap(), "--sequential"]);
    assert!(result.status.success());
    assert!(dir.path().join("scene.content.json").exists());
}

#[test]
fn test_config_output_path() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.json");
    let config = dir.path().join("assemble.toml");
    write_document(&input, &triangle_document("#tri"));
    std::fs::write(
        &config,
        "[assembly]\nparallel = false\n\n[output]\npath = \"build/content.json\"\npretty = true\n",
    )
    .unwrap();

    let result = run(&[
        "assemble",
        input.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let output = dir.path().join("build").join("content.json");
    let text = std::fs::read_to_string(&output).expect("Config output missing");
    assert!(text.contains('\n'), "expected pretty-printed JSON");
}

#[test]
fn test_dangling_reference_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("broken.json");
    let output = dir.path().join("broken.out.json");
    write_document(&input, &triangle_document("#missing"));

    let result = run(&[
        "assemble",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("missing"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn test_invalid_json_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("garbage.json");
    std::fs::write(&input, "{ not json").unwrap();

    let result = run(&["assemble", input.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Failed to parse document"));
}

#[test]
fn test_inspect_lists_geometry() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("scene.json");
    write_document(&input, &triangle_document("#tri"));

    let result = run(&["inspect", input.to_str().unwrap()]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("'Triangle': mesh [triangles]"), "stdout: {stdout}");
}
