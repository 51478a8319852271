//! Rust parser using syn for AST-based extraction.
//!
//! Extracts structs, enums (with payload variants), unions, traits and type
//! aliases. `impl Trait for Type` blocks in the same file are folded into the
//! implementing type's `implements` list.

use proc_macro2::Span;
use syn::{
    spanned::Spanned, visit::Visit, Attribute, Fields, GenericParam, Generics, Item, ItemEnum,
    ItemImpl, ItemStruct, ItemTrait, ItemType, ItemUnion, Type, TypeParamBound,
    Visibility as SynVisibility,
};

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, TypeRef, VariantDefinition, Visibility,
};

/// Rust parser using syn.
#[derive(Debug, Default)]
pub struct RustParser;

impl RustParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for RustParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let syntax = syn::parse_file(content)?;

        let mut visitor = RustVisitor::new(path, include_private);
        visitor.visit_file(&syntax);

        Ok(visitor.finish())
    }

    fn language(&self) -> Language {
        Language::Rust
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["rs"]
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// Visitor that extracts type definitions from a Rust AST.
struct RustVisitor {
    result: ParseResult,
    /// `(type name, trait)` pairs from trait impls, applied after the walk.
    trait_impls: Vec<(String, TypeRef)>,
}

impl RustVisitor {
    fn new(path: &str, include_private: bool) -> Self {
        Self {
            result: ParseResult::new(path, include_private),
            trait_impls: Vec::new(),
        }
    }

    fn finish(mut self) -> ParseResult {
        for (type_name, trait_ref) in std::mem::take(&mut self.trait_impls) {
            if let Some(def) = self.result.type_mut(&type_name) {
                if !def.implements.contains(&trait_ref) {
                    def.implements.push(trait_ref);
                }
            }
        }
        self.result
    }

    fn line_of(span: Span) -> u32 {
        span.start().line as u32
    }

    fn definition(&self, name: &syn::Ident, kind: TypeKind) -> TypeDefinition {
        TypeDefinition::new(
            name.to_string(),
            kind,
            self.result.file_path.clone(),
            Self::line_of(name.span()),
            Language::Rust,
        )
    }

    /// Extract doc comments from attributes.
    fn extract_doc_comment(attrs: &[Attribute]) -> Option<String> {
        let doc_lines: Vec<String> = attrs
            .iter()
            .filter_map(|attr| {
                if attr.path().is_ident("doc") {
                    if let syn::Meta::NameValue(nv) = &attr.meta {
                        if let syn::Expr::Lit(lit) = &nv.value {
                            if let syn::Lit::Str(s) = &lit.lit {
                                return Some(s.value().trim().to_string());
                            }
                        }
                    }
                }
                None
            })
            .collect();

        if doc_lines.is_empty() {
            None
        } else {
            Some(doc_lines.join("\n"))
        }
    }

    /// Non-doc attributes, rendered as written (`derive(Debug, Clone)`).
    fn extract_decorators(attrs: &[Attribute]) -> Vec<String> {
        attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("doc"))
            .map(|attr| {
                let meta = &attr.meta;
                meta.span()
                    .source_text()
                    .unwrap_or_else(|| compact_tokens(&quote::quote!(#meta).to_string()))
            })
            .collect()
    }

    fn convert_visibility(vis: &SynVisibility) -> Visibility {
        match vis {
            SynVisibility::Public(_) => Visibility::Public,
            SynVisibility::Restricted(_) => Visibility::Internal,
            SynVisibility::Inherited => Visibility::Private,
        }
    }

    /// Generic parameter names; lifetimes are not type parameters.
    fn extract_generics(generics: &Generics) -> Vec<String> {
        generics
            .params
            .iter()
            .filter_map(|param| match param {
                GenericParam::Type(t) => Some(t.ident.to_string()),
                GenericParam::Const(c) => Some(c.ident.to_string()),
                GenericParam::Lifetime(_) => None,
            })
            .collect()
    }

    fn extract_fields(fields: &Fields) -> Vec<FieldDefinition> {
        fields
            .iter()
            .enumerate()
            .map(|(index, f)| {
                let name = f
                    .ident
                    .as_ref()
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| index.to_string());
                FieldDefinition::new(name, decompose(&type_text(&f.ty)))
                    .with_visibility(Self::convert_visibility(&f.vis))
                    .with_decorators(Self::extract_decorators(&f.attrs))
                    .with_doc(Self::extract_doc_comment(&f.attrs))
            })
            .collect()
    }

    fn process_struct(&mut self, item: &ItemStruct) {
        let mut def = self.definition(&item.ident, TypeKind::Struct);
        def.visibility = Self::convert_visibility(&item.vis);
        def.generics = Self::extract_generics(&item.generics);
        def.fields = Self::extract_fields(&item.fields);
        def.decorators = Self::extract_decorators(&item.attrs);
        def.doc = Self::extract_doc_comment(&item.attrs);
        self.result.add_type(def);
    }

    fn process_union(&mut self, item: &ItemUnion) {
        let mut def = self.definition(&item.ident, TypeKind::Union);
        def.visibility = Self::convert_visibility(&item.vis);
        def.generics = Self::extract_generics(&item.generics);
        def.fields = Self::extract_fields(&Fields::Named(item.fields.clone()));
        def.decorators = Self::extract_decorators(&item.attrs);
        def.doc = Self::extract_doc_comment(&item.attrs);
        self.result.add_type(def);
    }

    fn process_enum(&mut self, item: &ItemEnum) {
        let mut def = self.definition(&item.ident, TypeKind::Enum);
        def.visibility = Self::convert_visibility(&item.vis);
        def.generics = Self::extract_generics(&item.generics);
        def.decorators = Self::extract_decorators(&item.attrs);
        def.doc = Self::extract_doc_comment(&item.attrs);
        def.variants = item
            .variants
            .iter()
            .map(|v| {
                let value = v.discriminant.as_ref().map(|(_, expr)| {
                    expr.span()
                        .source_text()
                        .unwrap_or_else(|| compact_tokens(&quote::quote!(#expr).to_string()))
                });
                VariantDefinition::new(v.ident.to_string())
                    .with_fields(Self::extract_fields(&v.fields))
                    .with_value(value)
            })
            .collect();
        self.result.add_type(def);
    }

    fn process_trait(&mut self, item: &ItemTrait) {
        let mut def = self.definition(&item.ident, TypeKind::Trait);
        def.visibility = Self::convert_visibility(&item.vis);
        def.generics = Self::extract_generics(&item.generics);
        def.decorators = Self::extract_decorators(&item.attrs);
        def.doc = Self::extract_doc_comment(&item.attrs);
        def.extends = item
            .supertraits
            .iter()
            .filter_map(|bound| match bound {
                TypeParamBound::Trait(t) => Some(decompose(&path_text(&t.path))),
                _ => None,
            })
            .collect();
        self.result.add_type(def);
    }

    fn process_type_alias(&mut self, item: &ItemType) {
        let mut def = self.definition(&item.ident, TypeKind::TypeAlias);
        def.visibility = Self::convert_visibility(&item.vis);
        def.generics = Self::extract_generics(&item.generics);
        def.decorators = Self::extract_decorators(&item.attrs);
        def.doc = Self::extract_doc_comment(&item.attrs);
        self.result.add_type(def);
    }

    fn process_impl(&mut self, item: &ItemImpl) {
        let Some((_, trait_path, _)) = &item.trait_ else {
            return;
        };
        if let Type::Path(self_ty) = item.self_ty.as_ref() {
            if let Some(segment) = self_ty.path.segments.last() {
                self.trait_impls
                    .push((segment.ident.to_string(), decompose(&path_text(trait_path))));
            }
        }
    }
}

impl<'ast> Visit<'ast> for RustVisitor {
    fn visit_item(&mut self, item: &'ast Item) {
        match item {
            Item::Struct(s) => self.process_struct(s),
            Item::Enum(e) => self.process_enum(e),
            Item::Union(u) => self.process_union(u),
            Item::Trait(t) => self.process_trait(t),
            Item::Type(t) => self.process_type_alias(t),
            Item::Impl(i) => self.process_impl(i),
            // Types declared inside function bodies are not part of the API.
            Item::Fn(_) => {}
            _ => syn::visit::visit_item(self, item),
        }
    }
}

/// Source text of a type, as written.
fn type_text(ty: &Type) -> String {
    ty.span()
        .source_text()
        .unwrap_or_else(|| compact_tokens(&quote::quote!(#ty).to_string()))
}

fn path_text(path: &syn::Path) -> String {
    path.span()
        .source_text()
        .unwrap_or_else(|| compact_tokens(&quote::quote!(#path).to_string()))
}

/// Collapse the token spacing `quote` produces (`Vec < T >` → `Vec<T>`).
fn compact_tokens(text: &str) -> String {
    text.replace(" :: ", "::")
        .replace(" < ", "<")
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
        .replace(" (", "(")
}
