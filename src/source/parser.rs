//! Schema and function file parsing
//!
//! Files are parsed as TypeScript with `oxc` and the resulting `Program`
//! is walked for the declarative parts only: `defineSchema(...)`,
//! `export const X = query(...)` and the `v.*` validator calls inside
//! them. Imports, helpers and handler bodies are never looked at.

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, BindingPatternKind, CallExpression, Declaration, Expression, ObjectExpression,
    ObjectPropertyKind, Program, PropertyKey, Statement,
};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};
use oxc::syntax::operator::UnaryOperator;

use crate::functions::{Endpoint, FunctionKind};
use crate::schema::{DocumentShape, IndexDef};
use crate::types::{FieldMap, Literal, TypeError, TypeNode};

use super::errors::{SourceError, SourceResult};

/// Validator constructors understood after `v.`
pub const VALID_VALIDATORS: &[&str] = &[
    "id", "null", "int64", "bigint", "number", "float64", "boolean", "string", "bytes", "array",
    "object", "record", "union", "literal", "optional", "any",
];

/// One `name: defineTable(...)` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub name: String,
    pub shape: DocumentShape,
    /// `.searchIndex` / `.vectorIndex` declarations that were skipped
    pub ignored_indexes: Vec<String>,
}

/// Parsed `defineSchema(...)` call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaSource {
    /// Tables in declaration order
    pub tables: Vec<TableSource>,
}

/// Parses a schema file.
pub fn parse_schema(src: &str) -> SourceResult<SchemaSource> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, src)?;
    if program.body.is_empty() {
        return Err(SourceError::EmptySource);
    }

    let call = program
        .body
        .iter()
        .find_map(schema_call)
        .ok_or(SourceError::MissingSchema)?;
    Walker::new(src).schema_body(call)
}

/// Parses the exported endpoints of a function file. `module` is the file
/// stem the endpoints are addressed under.
pub fn parse_functions(module: &str, src: &str) -> SourceResult<Vec<Endpoint>> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, src)?;
    let mut walker = Walker::new(src);
    let mut endpoints = Vec::new();

    for statement in &program.body {
        let declaration = match statement {
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(declaration)) => declaration,
                _ => continue,
            },
            _ => continue,
        };

        for declarator in &declaration.declarations {
            let name = match &declarator.id.kind {
                BindingPatternKind::BindingIdentifier(ident) => ident.name.as_str(),
                _ => continue,
            };
            let call = match declarator.init.as_ref().map(unwrap_expression) {
                Some(Expression::CallExpression(call)) => call,
                _ => continue,
            };
            let (kind, internal) = match unwrap_expression(&call.callee) {
                Expression::Identifier(ident) => {
                    match FunctionKind::from_constructor(ident.name.as_str()) {
                        Some(found) => found,
                        None => continue,
                    }
                }
                _ => continue,
            };

            let endpoint = walker.endpoint(module, name, kind, call)?;
            endpoints.push(endpoint.internal(internal));
        }
    }

    Ok(endpoints)
}

/// Parses a single validator expression such as `v.array(v.string())`.
pub fn parse_validator(src: &str) -> SourceResult<TypeNode> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, src)?;
    let mut walker = Walker::new(src);

    let expression = match program.body.first() {
        Some(Statement::ExpressionStatement(statement)) => &statement.expression,
        Some(other) => {
            return Err(walker.unexpected(other.span(), "validator (v.*)", "statement".into()))
        }
        None => {
            let end = Span::new(src.len() as u32, src.len() as u32);
            return Err(walker.unexpected(end, "validator (v.*)", "end of input".into()));
        }
    };
    if let Some(extra) = program.body.get(1) {
        return Err(walker.unexpected(extra.span(), "end of input", "statement".into()));
    }

    walker.validator(expression)
}

fn parse_program<'a>(allocator: &'a Allocator, src: &'a str) -> SourceResult<Program<'a>> {
    let parsed = Parser::new(allocator, src, SourceType::ts()).parse();
    if let Some(error) = parsed.errors.first() {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map_or(0, |label| label.offset());
        let (line, column) = line_column(src, offset);
        return Err(SourceError::Syntax {
            line,
            column,
            message: error.message.to_string(),
        });
    }
    Ok(parsed.program)
}

/// 1-based line and column of a byte offset
fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let before = src.get(..offset.min(src.len())).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |last| last.chars().count()) + 1;
    (line, column)
}

/// Strips parentheses and `as` / `satisfies` wrappers.
fn unwrap_expression<'b, 'a>(expression: &'b Expression<'a>) -> &'b Expression<'a> {
    match expression {
        Expression::ParenthesizedExpression(inner) => unwrap_expression(&inner.expression),
        Expression::TSAsExpression(inner) => unwrap_expression(&inner.expression),
        Expression::TSSatisfiesExpression(inner) => unwrap_expression(&inner.expression),
        other => other,
    }
}

/// `name(...)` with a plain identifier callee
fn called<'b, 'a>(expression: &'b Expression<'a>, name: &str) -> Option<&'b CallExpression<'a>> {
    match unwrap_expression(expression) {
        Expression::CallExpression(call) => match unwrap_expression(&call.callee) {
            Expression::Identifier(ident) if ident.name.as_str() == name => Some(call),
            _ => None,
        },
        _ => None,
    }
}

/// The `defineSchema(...)` call of a top-level statement, if it has one
fn schema_call<'b, 'a>(statement: &'b Statement<'a>) -> Option<&'b CallExpression<'a>> {
    const DEFINE: &str = "defineSchema";
    match statement {
        Statement::ExportDefaultDeclaration(export) => export
            .declaration
            .as_expression()
            .and_then(|expression| called(expression, DEFINE)),
        Statement::ExpressionStatement(statement) => called(&statement.expression, DEFINE),
        Statement::VariableDeclaration(declaration) => declaration
            .declarations
            .iter()
            .filter_map(|declarator| declarator.init.as_ref())
            .find_map(|init| called(init, DEFINE)),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::VariableDeclaration(declaration)) => declaration
                .declarations
                .iter()
                .filter_map(|declarator| declarator.init.as_ref())
                .find_map(|init| called(init, DEFINE)),
            _ => None,
        },
        _ => None,
    }
}

/// Static name of an object key: `a`, `"a"` or `'a'`
fn property_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::StringLiteral(literal) => Some(literal.value.to_string()),
        _ => None,
    }
}

/// Short form of an expression for error messages
fn found(expression: &Expression<'_>) -> String {
    match unwrap_expression(expression) {
        Expression::Identifier(ident) => format!("'{}'", ident.name),
        Expression::StringLiteral(literal) => format!("string {:?}", literal.value.as_str()),
        Expression::NumericLiteral(literal) => format!("number {}", literal.value),
        Expression::BigIntLiteral(_) => "bigint".into(),
        Expression::BooleanLiteral(literal) => literal.value.to_string(),
        Expression::NullLiteral(_) => "null".into(),
        Expression::ObjectExpression(_) => "object literal".into(),
        Expression::ArrayExpression(_) => "array literal".into(),
        Expression::CallExpression(_) => "call".into(),
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => {
            "function".into()
        }
        _ => "expression".into(),
    }
}

struct Walker<'s> {
    src: &'s str,
    /// Declaration path for type errors, e.g. `games.win_count`
    path: Vec<String>,
}

impl<'s> Walker<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            path: Vec::new(),
        }
    }

    fn position(&self, span: Span) -> (usize, usize) {
        line_column(self.src, span.start as usize)
    }

    fn unexpected(&self, span: Span, expected: &str, found: String) -> SourceError {
        let (line, column) = self.position(span);
        SourceError::Unexpected {
            line,
            column,
            expected: expected.to_string(),
            found,
        }
    }

    fn unexpected_expression(&self, expression: &Expression<'_>, expected: &str) -> SourceError {
        self.unexpected(expression.span(), expected, found(expression))
    }

    fn type_error(&self, span: Span, source: TypeError) -> SourceError {
        let (line, column) = self.position(span);
        let path = if self.path.is_empty() {
            "$root".to_string()
        } else {
            self.path.join(".")
        };
        SourceError::Type {
            line,
            column,
            path,
            source,
        }
    }

    /// Positional argument `index` of a call
    fn argument<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
        index: usize,
        expected: &str,
    ) -> SourceResult<&'b Expression<'a>> {
        match call.arguments.get(index) {
            Some(Argument::SpreadElement(spread)) => {
                Err(self.unexpected(spread.span, expected, "spread".into()))
            }
            Some(argument) => match argument.as_expression() {
                Some(expression) => Ok(unwrap_expression(expression)),
                None => Err(self.unexpected(argument.span(), expected, "expression".into())),
            },
            None => {
                let end = Span::new(call.span.end.saturating_sub(1), call.span.end);
                Err(self.unexpected(end, expected, "')'".into()))
            }
        }
    }

    /// Rejects arguments past the first `count`.
    fn expect_arity(&self, call: &CallExpression<'_>, count: usize) -> SourceResult<()> {
        match call.arguments.get(count) {
            Some(extra) => Err(self.unexpected(extra.span(), "')'", "extra argument".into())),
            None => Ok(()),
        }
    }

    fn string_argument(
        &self,
        call: &CallExpression<'_>,
        index: usize,
        expected: &str,
    ) -> SourceResult<String> {
        match self.argument(call, index, expected)? {
            Expression::StringLiteral(literal) => Ok(literal.value.to_string()),
            other => Err(self.unexpected_expression(other, expected)),
        }
    }

    // ---------------------------------------------------------------
    // Validators
    // ---------------------------------------------------------------

    fn validator(&mut self, expression: &Expression<'_>) -> SourceResult<TypeNode> {
        const EXPECTED: &str = "validator (v.*)";

        let call = match unwrap_expression(expression) {
            Expression::CallExpression(call) => call,
            other => return Err(self.unexpected_expression(other, EXPECTED)),
        };
        let member = match unwrap_expression(&call.callee) {
            Expression::StaticMemberExpression(member)
                if matches!(&member.object, Expression::Identifier(v) if v.name.as_str() == "v") =>
            {
                member
            }
            other => return Err(self.unexpected_expression(other, EXPECTED)),
        };
        let at = member.property.span;
        let name = member.property.name.as_str();

        let (node, arity) = match name {
            "id" => (TypeNode::id(self.string_argument(call, 0, "table name")?), 1),
            "null" => (TypeNode::Null, 0),
            "int64" | "bigint" => (TypeNode::Int64, 0),
            "number" | "float64" => (TypeNode::Float64, 0),
            "boolean" => (TypeNode::Boolean, 0),
            "string" => (TypeNode::String, 0),
            "bytes" => (TypeNode::Bytes, 0),
            "any" => (TypeNode::Any, 0),
            "array" => {
                let item = self.argument(call, 0, EXPECTED)?;
                (TypeNode::array(self.validator(item)?), 1)
            }
            "optional" => {
                let inner = self.argument(call, 0, EXPECTED)?;
                (TypeNode::optional(self.validator(inner)?), 1)
            }
            "object" => {
                let fields = match self.argument(call, 0, "object of validators")? {
                    Expression::ObjectExpression(object) => self.fields(object)?,
                    other => return Err(self.unexpected_expression(other, "object of validators")),
                };
                (TypeNode::Object { fields }, 1)
            }
            "literal" => {
                let value = self.literal(self.argument(call, 0, "literal")?)?;
                (TypeNode::Literal { value }, 1)
            }
            "record" => {
                let key = self.validator(self.argument(call, 0, EXPECTED)?)?;
                let value = self.validator(self.argument(call, 1, EXPECTED)?)?;
                let node = TypeNode::record(key, value).map_err(|e| self.type_error(at, e))?;
                (node, 2)
            }
            "union" => {
                let mut alternatives = Vec::with_capacity(call.arguments.len());
                for index in 0..call.arguments.len() {
                    alternatives.push(self.validator(self.argument(call, index, EXPECTED)?)?);
                }
                let count = alternatives.len();
                let node = TypeNode::union(alternatives).map_err(|e| self.type_error(at, e))?;
                (node, count)
            }
            _ => {
                let (line, column) = self.position(at);
                return Err(SourceError::UnknownValidator {
                    line,
                    column,
                    name: name.to_string(),
                    valid: VALID_VALIDATORS.join(", "),
                });
            }
        };

        self.expect_arity(call, arity)?;
        Ok(node)
    }

    /// `{ key: validator, ... }`
    fn fields(&mut self, object: &ObjectExpression<'_>) -> SourceResult<FieldMap> {
        let mut fields = FieldMap::new();

        for property in &object.properties {
            let property = match property {
                ObjectPropertyKind::ObjectProperty(property) => property,
                ObjectPropertyKind::SpreadProperty(spread) => {
                    return Err(self.unexpected(spread.span, "field name", "spread".into()))
                }
            };
            let key = match property_name(&property.key) {
                Some(key) => key,
                None => {
                    return Err(self.unexpected(
                        property.key.span(),
                        "field name",
                        "computed key".into(),
                    ))
                }
            };

            self.path.push(key.clone());
            let node = self.validator(&property.value)?;
            self.path.pop();

            if fields.contains_key(&key) {
                return Err(self.type_error(property.key.span(), TypeError::DuplicateField(key)));
            }
            fields.insert(key, node);
        }

        Ok(fields)
    }

    /// Either an object literal of validators or a `v.object(...)` call.
    /// Returns `None` when neither form is present.
    fn field_set(&mut self, expression: &Expression<'_>) -> SourceResult<Option<FieldMap>> {
        match unwrap_expression(expression) {
            Expression::ObjectExpression(object) => self.fields(object).map(Some),
            Expression::CallExpression(call) => match unwrap_expression(&call.callee) {
                Expression::StaticMemberExpression(member)
                    if member.property.name.as_str() == "object" =>
                {
                    match self.validator(expression)? {
                        TypeNode::Object { fields } => Ok(Some(fields)),
                        _ => Ok(None),
                    }
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn literal(&self, expression: &Expression<'_>) -> SourceResult<Literal> {
        const EXPECTED: &str = "string, number, bigint or boolean literal";

        match unwrap_expression(expression) {
            Expression::StringLiteral(literal) => Ok(Literal::String(literal.value.to_string())),
            Expression::NumericLiteral(literal) => Ok(Literal::Float64(literal.value)),
            Expression::BigIntLiteral(literal) => self.bigint(literal.span, false),
            Expression::BooleanLiteral(literal) => Ok(Literal::Boolean(literal.value)),
            Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::UnaryNegation => {
                match unwrap_expression(&unary.argument) {
                    Expression::NumericLiteral(literal) => Ok(Literal::Float64(-literal.value)),
                    Expression::BigIntLiteral(literal) => self.bigint(literal.span, true),
                    other => Err(self.unexpected_expression(other, EXPECTED)),
                }
            }
            other => Err(self.unexpected_expression(other, EXPECTED)),
        }
    }

    /// Reads a `123n` literal from its source text.
    fn bigint(&self, span: Span, negative: bool) -> SourceResult<Literal> {
        let raw = self
            .src
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default();
        let digits: String = raw
            .trim_end_matches('n')
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let text = if negative {
            format!("-{}", digits)
        } else {
            digits
        };
        text.parse::<i64>()
            .map(Literal::Int64)
            .map_err(|_| self.unexpected(span, "bigint within int64 range", raw.to_string()))
    }

    // ---------------------------------------------------------------
    // Schema files
    // ---------------------------------------------------------------

    fn schema_body(&mut self, call: &CallExpression<'_>) -> SourceResult<SchemaSource> {
        let tables = match self.argument(call, 0, "object of tables")? {
            Expression::ObjectExpression(object) => object,
            other => return Err(self.unexpected_expression(other, "object of tables")),
        };
        let mut schema = SchemaSource::default();

        for property in &tables.properties {
            let property = match property {
                ObjectPropertyKind::ObjectProperty(property) => property,
                ObjectPropertyKind::SpreadProperty(spread) => {
                    return Err(self.unexpected(spread.span, "table name", "spread".into()))
                }
            };
            let name = match property_name(&property.key) {
                Some(name) => name,
                None => {
                    return Err(self.unexpected(
                        property.key.span(),
                        "table name",
                        "computed key".into(),
                    ))
                }
            };

            self.path.push(name.clone());
            let table = self.table(name, &property.value)?;
            self.path.pop();
            schema.tables.push(table);
        }

        // Schema options (`{ schemaValidation: ... }`) carry no types
        Ok(schema)
    }

    /// `defineTable(...)` followed by any chain of index declarations
    fn table(&mut self, name: String, expression: &Expression<'_>) -> SourceResult<TableSource> {
        const EXPECTED: &str = "defineTable(...)";

        let call = match unwrap_expression(expression) {
            Expression::CallExpression(call) => call,
            other => return Err(self.unexpected_expression(other, EXPECTED)),
        };

        match unwrap_expression(&call.callee) {
            Expression::Identifier(ident) if ident.name.as_str() == "defineTable" => {
                let fields = match self.field_set(self.argument(call, 0, "table fields")?)? {
                    Some(fields) => fields,
                    None => {
                        let argument = self.argument(call, 0, "table fields")?;
                        return Err(self.unexpected_expression(argument, "table fields"));
                    }
                };
                self.expect_arity(call, 1)?;
                Ok(TableSource {
                    name,
                    shape: DocumentShape::from_fields(fields),
                    ignored_indexes: Vec::new(),
                })
            }
            Expression::StaticMemberExpression(member) => {
                let mut table = self.table(name, &member.object)?;
                match member.property.name.as_str() {
                    "index" => {
                        let index_name = self.string_argument(call, 0, "index name")?;
                        let fields = self.string_list(call, 1)?;
                        self.expect_arity(call, 2)?;
                        table.shape = table.shape.with_index(IndexDef::new(index_name, fields));
                    }
                    "searchIndex" | "vectorIndex" => {
                        let index_name = self.string_argument(call, 0, "index name")?;
                        table.ignored_indexes.push(index_name);
                    }
                    other => {
                        return Err(self.unexpected(
                            member.property.span,
                            "index, searchIndex or vectorIndex",
                            format!("'{}'", other),
                        ))
                    }
                }
                Ok(table)
            }
            other => Err(self.unexpected_expression(other, EXPECTED)),
        }
    }

    fn string_list(&self, call: &CallExpression<'_>, index: usize) -> SourceResult<Vec<String>> {
        let array = match self.argument(call, index, "list of field paths")? {
            Expression::ArrayExpression(array) => array,
            other => return Err(self.unexpected_expression(other, "list of field paths")),
        };
        let mut items = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            match element.as_expression().map(unwrap_expression) {
                Some(Expression::StringLiteral(literal)) => items.push(literal.value.to_string()),
                Some(other) => return Err(self.unexpected_expression(other, "field path")),
                None => return Err(self.unexpected(element.span(), "field path", "hole".into())),
            }
        }
        Ok(items)
    }

    // ---------------------------------------------------------------
    // Function files
    // ---------------------------------------------------------------

    fn endpoint(
        &mut self,
        module: &str,
        name: &str,
        kind: FunctionKind,
        call: &CallExpression<'_>,
    ) -> SourceResult<Endpoint> {
        let mut endpoint = Endpoint::new(module, name, kind);

        let options = match call.arguments.first().and_then(|a| a.as_expression()) {
            Some(expression) => match unwrap_expression(expression) {
                Expression::ObjectExpression(options) => options,
                // Bare handler: no declared arguments
                _ => return Ok(endpoint),
            },
            None => return Ok(endpoint),
        };

        for property in &options.properties {
            let property = match property {
                ObjectPropertyKind::ObjectProperty(property) => property,
                ObjectPropertyKind::SpreadProperty(_) => continue,
            };
            match property_name(&property.key).as_deref() {
                Some("args") => {
                    self.path.push(name.to_string());
                    let fields = self.field_set(&property.value)?;
                    self.path.pop();
                    match fields {
                        Some(fields) => endpoint = endpoint.with_args(fields),
                        None => {
                            let (line, column) = self.position(property.value.span());
                            return Err(SourceError::InvalidArgs {
                                line,
                                column,
                                function: endpoint.path(),
                            });
                        }
                    }
                }
                Some("returns") => {
                    self.path.push(name.to_string());
                    self.path.push("returns".into());
                    let returns = self.validator(&property.value)?;
                    self.path.truncate(self.path.len() - 2);
                    endpoint = endpoint.with_returns(returns);
                }
                _ => {}
            }
        }

        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::describe;

    #[test]
    fn test_parse_games_schema() {
        let src = r#"
            import { defineSchema, defineTable } from "convex/server";
            import { v } from "convex/values";

            export default defineSchema({
                games: defineTable({
                    win_count: v.int64(),
                    loss_count: v.int64(),
                }).index("by_wins", ["win_count"]),
            });
        "#;
        let schema = parse_schema(src).unwrap();
        assert_eq!(schema.tables.len(), 1);

        let games = &schema.tables[0];
        assert_eq!(games.name, "games");
        assert_eq!(
            games.shape.fields().keys().collect::<Vec<_>>(),
            vec!["win_count", "loss_count"]
        );
        assert_eq!(games.shape.indexes()[0], IndexDef::new("by_wins", ["win_count"]));
    }

    #[test]
    fn test_table_from_v_object() {
        let src = r#"defineSchema({ t: defineTable(v.object({ a: v.string() })) })"#;
        let schema = parse_schema(src).unwrap();
        assert_eq!(schema.tables[0].shape.field("a"), Some(&TypeNode::String));
    }

    #[test]
    fn test_search_index_is_ignored() {
        let src = r#"
            defineSchema({
                messages: defineTable({ body: v.string() })
                    .searchIndex("search_body", { searchField: "body" })
                    .index("by_body", ["body"]),
            })
        "#;
        let table = &parse_schema(src).unwrap().tables[0];
        assert_eq!(table.ignored_indexes, vec!["search_body"]);
        assert_eq!(table.shape.indexes().len(), 1);
    }

    #[test]
    fn test_missing_and_empty_schema() {
        assert_eq!(parse_schema("  // nothing\n").unwrap_err(), SourceError::EmptySource);
        assert_eq!(
            parse_schema("export default {}").unwrap_err(),
            SourceError::MissingSchema
        );
    }

    #[test]
    fn test_unknown_validator() {
        let err = parse_validator("v.int32()").unwrap_err();
        match err {
            SourceError::UnknownValidator { name, valid, .. } => {
                assert_eq!(name, "int32");
                assert!(valid.contains("int64"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_type_error_carries_declaration_path() {
        let src = r#"defineSchema({
            games: defineTable({ meta: v.object({ a: v.string(), a: v.int64() }) }),
        })"#;
        match parse_schema(src).unwrap_err() {
            SourceError::Type { path, source, .. } => {
                assert_eq!(path, "games.meta");
                assert_eq!(source, TypeError::DuplicateField("a".into()));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse_validator("v.union()").unwrap_err();
        assert!(matches!(
            err,
            SourceError::Type {
                source: TypeError::EmptyUnion,
                ..
            }
        ));
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_validator(r#"v.literal("asc")"#).unwrap(), TypeNode::literal("asc"));
        assert_eq!(parse_validator("v.literal(3)").unwrap(), TypeNode::literal(3.0));
        assert_eq!(parse_validator("v.literal(3n)").unwrap(), TypeNode::literal(3i64));
        assert_eq!(parse_validator("v.literal(false)").unwrap(), TypeNode::literal(false));
        assert_eq!(parse_validator("v.literal(-2n)").unwrap(), TypeNode::literal(-2i64));
    }

    #[test]
    fn test_describe_output_parses_back() {
        let node = TypeNode::object([
            ("_id", TypeNode::id("test")),
            ("first name", TypeNode::optional(TypeNode::String)),
            (
                "tags",
                TypeNode::record(TypeNode::String, TypeNode::array(TypeNode::Bytes)).unwrap(),
            ),
            (
                "sort",
                TypeNode::union(vec![
                    TypeNode::literal("asc"),
                    TypeNode::literal(-1.5),
                    TypeNode::literal(7i64),
                    TypeNode::Null,
                ])
                .unwrap(),
            ),
            ("any", TypeNode::Any),
        ])
        .unwrap();
        assert_eq!(parse_validator(&describe(&node)).unwrap(), node);
    }

    #[test]
    fn test_parse_functions() {
        let src = r#"
            import { query, mutation } from "./_generated/server";

            export const getGame = query({
                args: {},
                handler: async (ctx, args) => {
                    return await ctx.db.query("games").first();
                },
            });

            export const record = internalMutation({
                args: v.object({ won: v.boolean() }),
                returns: v.null(),
                handler: async (ctx, { won }) => { if (won) { return null; } },
            });

            export const bare = action(async (ctx) => {});

            async function helper(ctx: QueryCtx) {
                return 1;
            }
        "#;
        let endpoints = parse_functions("games", src).unwrap();
        assert_eq!(endpoints.len(), 3);

        assert_eq!(endpoints[0].path(), "games:getGame");
        assert_eq!(endpoints[0].kind, FunctionKind::Query);
        assert!(endpoints[0].arg_fields().is_empty());

        assert_eq!(endpoints[1].kind, FunctionKind::Mutation);
        assert!(endpoints[1].internal);
        assert_eq!(endpoints[1].arg_fields()["won"], TypeNode::Boolean);
        assert_eq!(endpoints[1].returns, Some(TypeNode::Null));

        assert_eq!(endpoints[2].kind, FunctionKind::Action);
        assert!(endpoints[2].arg_fields().is_empty());
    }

    #[test]
    fn test_invalid_args() {
        let src = r#"export const q = query({ args: v.string(), handler: async () => {} });"#;
        match parse_functions("test", src).unwrap_err() {
            SourceError::InvalidArgs { function, .. } => assert_eq!(function, "test:q"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_validator("v.array(v.string()").unwrap_err();
        assert!(matches!(err, SourceError::Syntax { line: 1, .. }));

        let src = "defineSchema({\n    t: defineTable({ a: v.string( }),\n})";
        match parse_schema(src).unwrap_err() {
            SourceError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_handler_bodies_are_not_interpreted() {
        let src = r#"
            export const check = mutation({
                args: { s: v.string() },
                handler: async (ctx, args) => {
                    const ok = /[}"']/.test(args.s);
                    const label = `${args.s}: {${ok ? "}" : "{"}`;
                    return label.length > 0 && ok;
                },
            });
        "#;
        let endpoints = parse_functions("strings", src).unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].path(), "strings:check");
        assert_eq!(endpoints[0].arg_fields()["s"], TypeNode::String);
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(line_column("abc", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("é\nx", 4), (2, 2));
    }

    #[test]
    fn test_extra_arguments_rejected() {
        let err = parse_validator("v.string(1)").unwrap_err();
        assert!(matches!(err, SourceError::Unexpected { line: 1, column: 10, .. }));
    }
}
