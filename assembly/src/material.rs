//! Per-instance material binding
//!
//! Submeshes carry only the material *symbol* written on their primitives.
//! Each geometry or controller instance maps those symbols to concrete
//! materials through its own `<bind_material>`, so the same mesh can appear
//! with different materials on different nodes.

use nether_dae::{fragment, BindMaterial, Document, HasId};
use serde::Serialize;

use crate::error::{AssemblyError, Result};

/// One material symbol resolved at one instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialBinding {
    pub symbol: String,
    /// Bound material id; `None` when the instance leaves the symbol unbound
    pub material: Option<String>,
    pub material_name: Option<String>,
    /// Effect referenced by the bound material
    pub effect: Option<String>,
    /// Effect texcoord semantic to geometry texcoord set
    pub texcoord_sets: Vec<TexcoordBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TexcoordBinding {
    pub semantic: String,
    pub input_set: u32,
}

/// Resolve each distinct symbol, in first-seen order.
pub fn resolve_bindings<'s>(
    doc: &Document,
    bind_material: Option<&BindMaterial>,
    symbols: impl IntoIterator<Item = &'s str>,
    context: &str,
) -> Result<Vec<MaterialBinding>> {
    let mut bindings: Vec<MaterialBinding> = Vec::new();
    for symbol in symbols {
        if bindings.iter().any(|b| b.symbol == symbol) {
            continue;
        }

        let instance = bind_material.and_then(|bm| {
            bm.instance_materials
                .iter()
                .find(|im| im.symbol == symbol)
        });
        let Some(instance) = instance else {
            tracing::warn!("{}: material symbol '{}' is not bound", context, symbol);
            bindings.push(MaterialBinding {
                symbol: symbol.to_string(),
                material: None,
                material_name: None,
                effect: None,
                texcoord_sets: Vec::new(),
            });
            continue;
        };

        let material = doc.material(&instance.target).ok_or_else(|| {
            AssemblyError::reference(&instance.target, format!("{context} symbol '{symbol}'"))
        })?;
        let texcoord_sets = instance
            .bind_vertex_inputs
            .iter()
            .filter(|input| input.input_semantic == "TEXCOORD")
            .map(|input| TexcoordBinding {
                semantic: input.semantic.clone(),
                input_set: input.input_set.unwrap_or(0),
            })
            .collect();

        bindings.push(MaterialBinding {
            symbol: symbol.to_string(),
            material: material.id().map(str::to_string),
            material_name: material.name.clone(),
            effect: material
                .effect
                .as_deref()
                .and_then(fragment)
                .map(str::to_string),
            texcoord_sets,
        });
    }
    Ok(bindings)
}
