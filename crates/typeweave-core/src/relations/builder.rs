//! Relationship builder.

use std::collections::HashSet;

use crate::model::{FieldDefinition, RelationshipKind, TypeDefinition, TypeRef, TypeRelationship};

/// Derive the typed edge list for one repository's definitions.
///
/// Edges are emitted in definition order: heritage first, then fields, then
/// variant payloads. Only targets that name a definition in `types` produce
/// an edge; references to external types stay visible through the field's
/// raw type text only.
pub fn build_relationships(types: &[TypeDefinition]) -> Vec<TypeRelationship> {
    let known: HashSet<&str> = types.iter().map(|t| t.name.as_str()).collect();
    let mut edges = Vec::new();

    for def in types {
        let mut emit = |to: &TypeRef, kind: RelationshipKind, via: Option<String>| {
            if !known.contains(to.name.as_str()) {
                return;
            }
            let edge = TypeRelationship::new(&def.name, &to.name, kind, &def.file);
            edges.push(match via {
                Some(field) => edge.via(field),
                None => edge,
            });
        };

        for parent in &def.extends {
            emit(parent, RelationshipKind::Extends, None);
        }
        for contract in &def.implements {
            emit(contract, RelationshipKind::Implements, None);
        }
        for field in &def.fields {
            field_edges(field, field.name.clone(), &mut emit);
        }
        for variant in &def.variants {
            for field in &variant.fields {
                field_edges(field, format!("{}.{}", variant.name, field.name), &mut emit);
            }
        }
    }

    edges
}

/// `contains`/`collection` for the field's own type, `references` for each
/// generic argument.
fn field_edges<F>(field: &FieldDefinition, via: String, emit: &mut F)
where
    F: FnMut(&TypeRef, RelationshipKind, Option<String>),
{
    let kind = if field.type_ref.is_collection {
        RelationshipKind::Collection
    } else {
        RelationshipKind::Contains
    };
    emit(&field.type_ref, kind, Some(via.clone()));
    for argument in &field.type_ref.generics {
        emit(argument, RelationshipKind::References, Some(via.clone()));
    }
}
