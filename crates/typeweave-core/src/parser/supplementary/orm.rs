//! ORM model parser for Python.
//!
//! Recognizes SQLAlchemy declarative models (including Flask-SQLAlchemy and
//! SQLModel) and Django models. Column declarations become fields whose
//! types are mapped from the column type to the Python type it loads as.

use tree_sitter::Node;

use super::ORM_DECORATOR;
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{FieldDefinition, Language, TypeDefinition, TypeKind};
use crate::parser::python::{
    annotation_ref, class_assignments, class_bases, docstring, last_segment, top_level_classes, visibility_of,
    PythonParser,
};
use crate::parser::result::ParseResult;
use crate::parser::treesitter::TreeSitterParser;

const SQLALCHEMY_BASES: &[&str] = &["Base", "DeclarativeBase", "db.Model", "SQLModel"];
const DJANGO_BASES: &[&str] = &["models.Model"];

/// Callables that declare a mapped SQLAlchemy attribute.
const SQLALCHEMY_ATTRIBUTES: &[&str] = &["Column", "mapped_column", "relationship"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framework {
    SqlAlchemy,
    Django,
}

impl Framework {
    fn detect(bases: &[String]) -> Option<Self> {
        if bases.iter().any(|b| DJANGO_BASES.contains(&b.as_str())) {
            return Some(Self::Django);
        }
        bases
            .iter()
            .any(|b| SQLALCHEMY_BASES.contains(&b.as_str()) || last_segment(b) == "DeclarativeBase")
            .then_some(Self::SqlAlchemy)
    }

    fn decorator(&self) -> &'static str {
        match self {
            Self::SqlAlchemy => "orm:sqlalchemy",
            Self::Django => "orm:django",
        }
    }
}

/// A call expression split into callee and arguments.
struct Call<'t> {
    callee: &'t str,
    positional: Vec<Node<'t>>,
    keywords: Vec<(&'t str, Node<'t>)>,
}

impl<'t> Call<'t> {
    fn from_node(node: &Node<'t>, content: &'t str) -> Option<Self> {
        if node.kind() != "call" {
            return None;
        }
        let callee = TreeSitterParser::field_text(node, "function", content)?;
        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            for arg in TreeSitterParser::named_children(&args) {
                match arg.kind() {
                    "keyword_argument" => {
                        if let (Some(name), Some(value)) = (
                            TreeSitterParser::field_text(&arg, "name", content),
                            arg.child_by_field_name("value"),
                        ) {
                            keywords.push((name, value));
                        }
                    }
                    "comment" => {}
                    _ => positional.push(arg),
                }
            }
        }
        Some(Self {
            callee,
            positional,
            keywords,
        })
    }

    /// `models.CharField` → `CharField`.
    fn name(&self) -> &'t str {
        last_segment(self.callee)
    }

    fn keyword(&self, name: &str, content: &'t str) -> Option<&'t str> {
        self.keywords
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| TreeSitterParser::node_text(v, content))
    }

    fn flag(&self, name: &str, content: &'t str) -> bool {
        self.keyword(name, content) == Some("True")
    }

    fn positional_texts(&self, content: &'t str) -> impl Iterator<Item = &'t str> + '_ {
        self.positional
            .iter()
            .map(move |n| TreeSitterParser::node_text(n, content))
    }

    /// Related model from the first positional argument or the `to=` keyword.
    fn target(&self, content: &'t str) -> Option<&'t str> {
        let text = self
            .positional_texts(content)
            .next()
            .or_else(|| self.keyword("to", content))
            .or_else(|| self.keyword("argument", content))?;
        // "app.Customer" references resolve to the model name.
        Some(last_segment(unquote(text)))
    }
}

/// ORM model parser for Python.
pub struct OrmModelParser {
    python: PythonParser,
}

impl Default for OrmModelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OrmModelParser {
    pub fn new() -> Self {
        Self {
            python: PythonParser::new(),
        }
    }

    pub fn applies_to(&self, language: Language) -> bool {
        language == Language::Python
    }

    pub fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let mut result = ParseResult::new(path, include_private);
        if !content.contains("Model") && !content.contains("Base") {
            return Ok(result);
        }

        let tree = self.python.tree_sitter().parse_tree(content)?;
        for (class, _) in top_level_classes(&tree.root_node(), content) {
            let bases = class_bases(&class, content);
            let Some(framework) = Framework::detect(&bases) else {
                continue;
            };
            let (Some(name), Some(body)) = (
                TreeSitterParser::field_text(&class, "name", content),
                class.child_by_field_name("body"),
            ) else {
                continue;
            };

            // SQLModel tables declare columns as plain annotations; other
            // declarative classes need at least one mapped attribute.
            let plain_annotations = bases.iter().any(|b| last_segment(b) == "SQLModel");
            let assignments = class_assignments(&body);
            if framework == Framework::SqlAlchemy
                && !plain_annotations
                && !assignments.iter().any(|a| is_mapped_attribute(a, content))
            {
                continue;
            }

            let mut def = TypeDefinition::new(
                name,
                TypeKind::Model,
                path,
                TreeSitterParser::node_line(&class),
                Language::Python,
            );
            def.visibility = visibility_of(name);
            def.decorators = vec![ORM_DECORATOR.to_string(), framework.decorator().to_string()];
            def.doc = docstring(&body, content);
            def.fields = assignments
                .iter()
                .filter_map(|a| model_field(a, framework, plain_annotations, content))
                .collect();

            result.add_type(def);
        }

        Ok(result)
    }
}

/// `Mapped[..]` annotation or a `Column` / `mapped_column` / `relationship` call.
fn is_mapped_attribute(assignment: &Node, content: &str) -> bool {
    let mapped = TreeSitterParser::field_text(assignment, "type", content)
        .is_some_and(|t| t.starts_with("Mapped["));
    mapped
        || assignment
            .child_by_field_name("right")
            .and_then(|r| Call::from_node(&r, content))
            .is_some_and(|c| SQLALCHEMY_ATTRIBUTES.contains(&c.name()))
}

fn model_field(
    assignment: &Node,
    framework: Framework,
    plain_annotations: bool,
    content: &str,
) -> Option<FieldDefinition> {
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    let name = TreeSitterParser::node_text(&left, content);
    if name.starts_with("__") {
        return None;
    }
    let annotation = TreeSitterParser::field_text(assignment, "type", content);
    let right = assignment.child_by_field_name("right");
    let call = right.as_ref().and_then(|r| Call::from_node(r, content));

    let field = match framework {
        Framework::SqlAlchemy => {
            let defaults_to_none = right
                .as_ref()
                .is_some_and(|r| TreeSitterParser::node_text(r, content) == "None");
            sqlalchemy_field(name, annotation, call.as_ref(), plain_annotations, content)?
                .or_optional(defaults_to_none)
        }
        Framework::Django => django_field(name, call.as_ref()?, content)?,
    };
    Some(field.with_visibility(visibility_of(name)))
}

fn sqlalchemy_field(
    name: &str,
    annotation: Option<&str>,
    call: Option<&Call>,
    plain_annotations: bool,
    content: &str,
) -> Option<FieldDefinition> {
    let nullable = call.is_some_and(|c| c.flag("nullable", content));

    // `Mapped[..]` and SQLModel annotations carry the Python type directly.
    if let Some(annotation) = annotation.filter(|a| !a.starts_with("ClassVar")) {
        if let Some(inner) = annotation
            .strip_prefix("Mapped[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return Some(FieldDefinition::new(name, annotation_ref(inner)).or_optional(nullable));
        }
        if plain_annotations {
            return Some(FieldDefinition::new(name, annotation_ref(annotation)).or_optional(nullable));
        }
    }

    let call = call?;
    match call.name() {
        "Column" | "mapped_column" => {
            let type_text = call
                .positional_texts(content)
                .find(|t| !t.starts_with("ForeignKey") && !t.starts_with(['"', '\'']))
                .map(sql_type)
                .unwrap_or("Any");
            Some(FieldDefinition::new(name, decompose(type_text)).or_optional(nullable))
        }
        "relationship" => {
            let target = call.target(content)?;
            let type_text = if call.keyword("uselist", content) == Some("False") {
                target.to_string()
            } else {
                format!("List[{}]", target)
            };
            Some(FieldDefinition::new(name, decompose(&type_text)))
        }
        _ => None,
    }
}

fn django_field(name: &str, call: &Call, content: &str) -> Option<FieldDefinition> {
    let field_class = call.name();
    if !field_class.ends_with("Field") && !matches!(field_class, "ForeignKey") {
        return None;
    }
    let null = call.flag("null", content);

    let type_text = match field_class {
        "ForeignKey" | "OneToOneField" => call.target(content)?.to_string(),
        "ManyToManyField" => format!("List[{}]", call.target(content)?),
        other => django_type(other).to_string(),
    };
    Some(FieldDefinition::new(name, decompose(&type_text)).or_optional(null))
}

/// Python type a SQLAlchemy column type loads as.
fn sql_type(column_type: &str) -> &str {
    let base = column_type.split('(').next().unwrap_or(column_type).trim();
    match last_segment(base) {
        "Integer" | "BigInteger" | "SmallInteger" => "int",
        "String" | "Text" | "Unicode" | "UnicodeText" | "VARCHAR" | "CHAR" => "str",
        "Boolean" => "bool",
        "Float" | "REAL" => "float",
        "Numeric" | "DECIMAL" => "Decimal",
        "DateTime" | "TIMESTAMP" => "datetime",
        "Date" => "date",
        "Time" => "time",
        "JSON" | "JSONB" => "dict",
        "LargeBinary" | "BLOB" => "bytes",
        "Uuid" | "UUID" => "UUID",
        _ => base,
    }
}

/// Python type a Django model field loads as.
fn django_type(field_class: &str) -> &str {
    match field_class {
        "CharField" | "TextField" | "SlugField" | "EmailField" | "URLField"
        | "GenericIPAddressField" | "FilePathField" => "str",
        "AutoField" | "BigAutoField" | "SmallAutoField" | "IntegerField" | "BigIntegerField"
        | "SmallIntegerField" | "PositiveIntegerField" | "PositiveBigIntegerField"
        | "PositiveSmallIntegerField" => "int",
        "BooleanField" | "NullBooleanField" => "bool",
        "FloatField" => "float",
        "DecimalField" => "Decimal",
        "DateTimeField" => "datetime",
        "DateField" => "date",
        "TimeField" => "time",
        "DurationField" => "timedelta",
        "JSONField" => "dict",
        "UUIDField" => "UUID",
        "BinaryField" => "bytes",
        "FileField" | "ImageField" => "File",
        other => other,
    }
}

fn unquote(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<TypeDefinition> {
        OrmModelParser::new()
            .parse_file("app/models.py", code, false)
            .unwrap()
            .into_types()
    }

    #[test]
    fn test_sqlalchemy_columns() {
        let code = r#"
class Invoice(Base):
    """An invoice row."""
    __tablename__ = "invoices"

    id = Column(Integer, primary_key=True)
    customer_id = Column(ForeignKey("customers.id"), Integer)
    total = Column(Numeric(10, 2), nullable=True)
    items = relationship("LineItem", back_populates="invoice")
    customer = relationship("Customer", uselist=False)
"#;
        let types = parse(code);
        assert_eq!(types.len(), 1);

        let invoice = &types[0];
        assert_eq!(invoice.kind, TypeKind::Model);
        assert_eq!(invoice.decorators, vec!["schema:orm", "orm:sqlalchemy"]);
        assert_eq!(invoice.doc.as_deref(), Some("An invoice row."));

        let names: Vec<_> = invoice.field_names().collect();
        assert_eq!(names, vec!["id", "customer_id", "total", "items", "customer"]);
        assert_eq!(invoice.fields[0].type_ref.name, "int");
        assert_eq!(invoice.fields[1].type_ref.name, "int");
        assert_eq!(invoice.fields[2].type_ref.name, "Decimal");
        assert!(invoice.fields[2].optional);
        assert!(invoice.fields[3].type_ref.is_collection);
        assert_eq!(invoice.fields[3].type_ref.name, "LineItem");
        assert!(!invoice.fields[4].type_ref.is_collection);
        assert_eq!(invoice.fields[4].type_ref.name, "Customer");
    }

    #[test]
    fn test_sqlalchemy_mapped() {
        let code = r#"
class User(DeclarativeBase):
    id: Mapped[int] = mapped_column(primary_key=True)
    nickname: Mapped[Optional[str]]
    posts: Mapped[List["Post"]] = relationship(back_populates="author")
"#;
        let types = parse(code);
        let user = &types[0];
        assert_eq!(user.fields[0].type_ref.name, "int");
        assert!(user.fields[1].optional);
        assert_eq!(user.fields[1].type_ref.name, "str");
        assert!(user.fields[2].type_ref.is_collection);
        assert_eq!(user.fields[2].type_ref.name, "Post");
    }

    #[test]
    fn test_django_model() {
        let code = r#"
class Order(models.Model):
    number = models.CharField(max_length=32)
    placed_at = models.DateTimeField(null=True)
    customer = models.ForeignKey("shop.Customer", on_delete=models.CASCADE)
    tags = models.ManyToManyField(Tag)

    class Meta:
        ordering = ["number"]

    def __str__(self):
        return self.number
"#;
        let types = parse(code);
        assert_eq!(types.len(), 1);

        let order = &types[0];
        assert_eq!(order.decorators[1], "orm:django");
        let names: Vec<_> = order.field_names().collect();
        assert_eq!(names, vec!["number", "placed_at", "customer", "tags"]);
        assert_eq!(order.fields[0].type_ref.name, "str");
        assert!(order.fields[1].optional);
        assert_eq!(order.fields[2].type_ref.name, "Customer");
        assert!(order.fields[3].type_ref.is_collection);
        assert_eq!(order.fields[3].type_ref.name, "Tag");
    }

    #[test]
    fn test_base_subclass_without_mapped_attributes_ignored() {
        let code = r#"
@dataclass
class Invoice(Base):
    id: str
    note: Optional[str] = None

class Customer(db.Model):
    name = "anonymous"
"#;
        assert!(parse(code).is_empty());
    }

    #[test]
    fn test_plain_annotations_only_for_sqlmodel() {
        let code = r#"
class Hero(SQLModel, table=True):
    id: Optional[int] = Field(default=None, primary_key=True)
    name: str
    team: "Team"

class Villain(Base):
    __tablename__ = "villains"
    id = Column(Integer, primary_key=True)
    alias: str
"#;
        let types = parse(code);
        assert_eq!(types.len(), 2);

        let hero = &types[0];
        let names: Vec<_> = hero.field_names().collect();
        assert_eq!(names, vec!["id", "name", "team"]);
        assert!(hero.fields[0].optional);
        assert_eq!(hero.fields[2].type_ref.name, "Team");

        let villain = &types[1];
        let names: Vec<_> = villain.field_names().collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn test_plain_classes_ignored() {
        let code = "class Base:\n    pass\n\nclass Service(object):\n    name = 'x'\n";
        assert!(parse(code).is_empty());
    }
}
