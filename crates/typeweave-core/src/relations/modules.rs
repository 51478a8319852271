//! Directory-based module grouping.

use std::collections::{BTreeMap, HashSet};

use crate::model::{TypeDefinition, TypeModule, TypeRelationship, ROOT_MODULE_PATH};

/// Group definitions by the directory of their file, sorted by path.
///
/// A relationship belongs to every module containing its `from` type; it is
/// internal there when `to` is in the same module and external otherwise.
pub fn build_modules(types: &[TypeDefinition], relationships: &[TypeRelationship]) -> Vec<TypeModule> {
    let mut groups: BTreeMap<&str, Vec<TypeDefinition>> = BTreeMap::new();
    for def in types {
        groups
            .entry(module_path(&def.file))
            .or_default()
            .push(def.clone());
    }

    groups
        .into_iter()
        .map(|(path, members)| {
            let names: HashSet<&str> = members.iter().map(|t| t.name.as_str()).collect();
            let (internal, external): (Vec<_>, Vec<_>) = relationships
                .iter()
                .filter(|r| names.contains(r.from.as_str()))
                .cloned()
                .partition(|r| names.contains(r.to.as_str()));

            TypeModule {
                path: path.to_string(),
                name: module_name(path).to_string(),
                types: members,
                internal_relationships: internal,
                external_relationships: external,
            }
        })
        .collect()
}

/// Directory portion of a repository-relative file path.
pub fn module_path(file: &str) -> &str {
    let file = file.trim_start_matches("./");
    match file.rfind(['/', '\\']) {
        Some(0) | None => ROOT_MODULE_PATH,
        Some(idx) => &file[..idx],
    }
}

fn module_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, RelationshipKind, TypeKind};

    fn def(name: &str, file: &str) -> TypeDefinition {
        TypeDefinition::new(name, TypeKind::Struct, file, 1, Language::Go)
    }

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("main.go"), ".");
        assert_eq!(module_path("./main.go"), ".");
        assert_eq!(module_path("pkg/billing/invoice.go"), "pkg/billing");
        assert_eq!(module_path("pkg\\billing\\invoice.go"), "pkg\\billing");
    }

    #[test]
    fn test_partition() {
        let types = vec![
            def("Invoice", "billing/invoice.go"),
            def("LineItem", "billing/item.go"),
            def("Customer", "crm/customer.go"),
            def("Config", "main.go"),
        ];
        let relationships = vec![
            TypeRelationship::new("Invoice", "LineItem", RelationshipKind::Collection, "billing/invoice.go")
                .via("items"),
            TypeRelationship::new("Invoice", "Customer", RelationshipKind::Contains, "billing/invoice.go")
                .via("customer"),
        ];

        let modules = build_modules(&types, &relationships);
        let paths: Vec<_> = modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec![".", "billing", "crm"]);

        let billing = &modules[1];
        assert_eq!(billing.name, "billing");
        assert_eq!(billing.types.len(), 2);
        assert_eq!(billing.internal_relationships.len(), 1);
        assert_eq!(billing.internal_relationships[0].to, "LineItem");
        assert_eq!(billing.external_relationships.len(), 1);
        assert_eq!(billing.external_relationships[0].to, "Customer");

        assert!(modules[2].internal_relationships.is_empty());
        assert!(modules[2].external_relationships.is_empty());
    }
}
