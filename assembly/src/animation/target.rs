//! SID target paths
//!
//! `Node/element` addresses a whole transform element, `Node/element.X` one
//! named member and `Node/element(3)` or `Node/element(0)(3)` one array or
//! matrix cell.

use nether_dae::TransformKind;

use crate::error::{AssemblyError, Result};

/// Parsed channel target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    /// Node id (the first path segment)
    pub node: String,
    /// Sid of the targeted transform element
    pub element: String,
    pub member: Member,
}

/// Which part of the element a channel drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Whole,
    /// `.X`, `.ANGLE`, ...
    Name(String),
    /// `(i)`
    Index(usize),
    /// `(row)(column)` of a matrix
    Cell(usize, usize),
}

/// Parse a channel's `target` attribute.
pub fn parse_target(path: &str) -> Result<TargetPath> {
    let invalid = |reason: &str| AssemblyError::target(format!("target '{path}'"), reason);

    let trimmed = path.trim();
    let (node, rest) = trimmed
        .split_once('/')
        .ok_or_else(|| invalid("expected 'node/element'"))?;
    if node.is_empty() {
        return Err(invalid("empty node id"));
    }
    if rest.contains('/') {
        return Err(invalid("nested sid scopes are not supported"));
    }

    let (element, member) = if let Some(open) = rest.find('(') {
        let (element, mut selectors) = rest.split_at(open);
        let mut indices = Vec::new();
        while let Some(inner) = selectors.strip_prefix('(') {
            let close = inner.find(')').ok_or_else(|| invalid("unclosed '('"))?;
            let index = inner[..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("member index is not a number"))?;
            indices.push(index);
            selectors = &inner[close + 1..];
        }
        if !selectors.is_empty() {
            return Err(invalid("unexpected text after member index"));
        }
        let member = match indices.as_slice() {
            [i] => Member::Index(*i),
            [row, column] => Member::Cell(*row, *column),
            _ => return Err(invalid("expected one or two member indices")),
        };
        (element, member)
    } else if let Some((element, name)) = rest.rsplit_once('.') {
        if name.is_empty() {
            return Err(invalid("empty member name"));
        }
        (element, Member::Name(name.to_string()))
    } else {
        (rest, Member::Whole)
    };

    if element.is_empty() {
        return Err(invalid("empty element sid"));
    }

    Ok(TargetPath {
        node: node.to_string(),
        element: element.to_string(),
        member,
    })
}

impl Member {
    /// Component index within `kind`'s values, or `None` for the whole element
    pub fn component(&self, kind: &TransformKind, context: &str) -> Result<Option<usize>> {
        let width = kind.values().len();
        let index = match self {
            Member::Whole => return Ok(None),
            Member::Index(i) => *i,
            Member::Cell(row, column) => match kind {
                TransformKind::Matrix(_) if *row < 4 && *column < 4 => row * 4 + column,
                TransformKind::Matrix(_) => {
                    return Err(AssemblyError::target(
                        context,
                        format!("matrix cell ({row})({column})"),
                    ));
                }
                _ => {
                    return Err(AssemblyError::target(
                        context,
                        format!("cell addressing on {}", kind.element_name()),
                    ));
                }
            },
            Member::Name(name) => named_component(kind, name).ok_or_else(|| {
                AssemblyError::target(
                    context,
                    format!("unknown member '{name}' of {}", kind.element_name()),
                )
            })?,
        };
        if index >= width {
            return Err(AssemblyError::target(
                context,
                format!("member {index} outside {} of width {width}", kind.element_name()),
            ));
        }
        Ok(Some(index))
    }
}

fn named_component(kind: &TransformKind, name: &str) -> Option<usize> {
    if let TransformKind::Rotate(_) = kind {
        if name == "ANGLE" {
            return Some(3);
        }
    }
    match name {
        "X" | "R" | "S" | "U" => Some(0),
        "Y" | "G" | "T" | "V" => Some(1),
        "Z" | "B" | "P" => Some(2),
        "W" | "A" | "Q" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_whole_element() {
        let path = parse_target("Bone1/transform").unwrap();
        assert_eq!(path.node, "Bone1");
        assert_eq!(path.element, "transform");
        assert_eq!(path.member, Member::Whole);
    }

    #[test]
    fn test_named_member() {
        let path = parse_target("Bone1/rotateZ.ANGLE").unwrap();
        assert_eq!(path.element, "rotateZ");
        assert_eq!(path.member, Member::Name("ANGLE".into()));

        let rotate = TransformKind::Rotate([0.0, 0.0, 1.0, 0.0]);
        assert_eq!(path.member.component(&rotate, "t").unwrap(), Some(3));
    }

    #[test]
    fn test_matrix_cell() {
        let path = parse_target("Root/transform(0)(3)").unwrap();
        assert_eq!(path.member, Member::Cell(0, 3));

        let matrix = TransformKind::Matrix([0.0; 16]);
        assert_eq!(path.member.component(&matrix, "t").unwrap(), Some(3));
    }

    #[test]
    fn test_array_index() {
        let path = parse_target("Root/location(2)").unwrap();
        assert_eq!(path.member, Member::Index(2));
        let translate = TransformKind::Translate([0.0; 3]);
        assert_eq!(path.member.component(&translate, "t").unwrap(), Some(2));
    }

    #[test]
    fn test_node_ids_may_contain_dots() {
        let path = parse_target("Armature.001/location.X").unwrap();
        assert_eq!(path.node, "Armature.001");
        assert_eq!(path.element, "location");
    }

    #[test]
    fn test_malformed_paths() {
        for path in [
            "NoSlash",
            "/location",
            "Node/",
            "Node/location.",
            "Node/m(1",
            "Node/m(x)",
            "Node/m(0)(1)(2)",
            "Node/m(0)junk",
            "A/B/C",
        ] {
            let err = parse_target(path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AnimationTarget, "path {path}");
        }
    }

    #[test]
    fn test_component_out_of_range() {
        let scale = TransformKind::Scale([1.0; 3]);
        let err = Member::Name("W".into()).component(&scale, "t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AnimationTarget);
        let err = Member::Name("ANGLE".into()).component(&scale, "t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AnimationTarget);
    }
}
