// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! SQL parser adapter
//!
//! Wraps the `sqlparser` crate and converts its AST into the statement tree
//! in [`crate::ast`]. `USE` and the two supported `SHOW` forms are matched
//! by keyword before delegating, the same way the server special-cases them
//! ahead of full SQL parsing.

use crate::ast::*;
use sqlparser::ast as sql;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

impl ParseError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub struct TinyParser;

impl TinyParser {
    /// Parse a single SQL statement.
    pub fn parse_one(query: &str) -> Result<Statement, ParseError> {
        let trimmed = query.trim().trim_end_matches(';').trim();
        if trimmed.is_empty() {
            return Err(ParseError::new("empty statement"));
        }

        if let Some(stmt) = Self::parse_keyword_statement(trimmed) {
            return stmt;
        }

        let dialect = MySqlDialect {};
        let mut statements = Parser::parse_sql(&dialect, trimmed)
            .map_err(|e| ParseError::new(e.to_string()))?;

        if statements.len() != 1 {
            return Err(ParseError::new(format!(
                "expected exactly one statement, got {}",
                statements.len()
            )));
        }

        Statement::from_sqlparser(statements.remove(0))
    }

    /// USE / SHOW DATABASES / SHOW TABLES, recognized without a full parse.
    fn parse_keyword_statement(trimmed: &str) -> Option<Result<Statement, ParseError>> {
        let use_prefix = trimmed
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("use "));
        if use_prefix {
            let db = trimmed[4..].trim().trim_matches('`').to_string();
            if db.is_empty() {
                return Some(Err(ParseError::new("USE requires a database name")));
            }
            return Some(Ok(Statement::Use(db)));
        }

        if trimmed.eq_ignore_ascii_case("show databases") {
            return Some(Ok(Statement::ShowDatabases));
        }
        if trimmed.eq_ignore_ascii_case("show tables") {
            return Some(Ok(Statement::ShowTables));
        }

        None
    }
}

impl Statement {
    fn from_sqlparser(stmt: sql::Statement) -> Result<Self, ParseError> {
        match stmt {
            sql::Statement::CreateTable(create) => {
                Ok(Statement::CreateTable(convert_create_table(create)?))
            }
            sql::Statement::Drop {
                object_type, names, ..
            } => {
                if object_type != sql::ObjectType::Table {
                    return Err(ParseError::new("only DROP TABLE is supported"));
                }
                let name = names
                    .first()
                    .ok_or_else(|| ParseError::new("missing table name in DROP TABLE"))?;
                Ok(Statement::DropTable(DropTableStatement {
                    name: convert_object_name(name)?,
                }))
            }
            sql::Statement::Insert(insert) => Ok(Statement::Insert(convert_insert(insert)?)),
            sql::Statement::Query(query) => Ok(Statement::Select(convert_query(*query)?)),
            other => Err(ParseError::new(format!(
                "unsupported statement: {}",
                statement_kind(&other)
            ))),
        }
    }
}

fn statement_kind(stmt: &sql::Statement) -> &'static str {
    match stmt {
        sql::Statement::Update { .. } => "UPDATE",
        sql::Statement::Delete(_) => "DELETE",
        sql::Statement::SetVariable { .. } => "SET",
        _ => "statement",
    }
}

fn convert_object_name(name: &sql::ObjectName) -> Result<TableName, ParseError> {
    let parts: Vec<String> = name.0.iter().map(|ident| ident.value.clone()).collect();
    match parts.len() {
        1 => Ok(TableName::new(None, parts.into_iter().next().unwrap())),
        2 => {
            let mut it = parts.into_iter();
            let schema = it.next().unwrap();
            Ok(TableName::new(Some(schema), it.next().unwrap()))
        }
        _ => Err(ParseError::new(format!(
            "invalid table name '{}'",
            name
        ))),
    }
}

fn convert_create_table(create: sql::CreateTable) -> Result<CreateTableStatement, ParseError> {
    let name = convert_object_name(&create.name)?;

    if create.columns.is_empty() {
        return Err(ParseError::new("table must have at least one column"));
    }

    let mut columns = Vec::with_capacity(create.columns.len());
    for col in create.columns {
        columns.push(convert_column_def(col)?);
    }

    Ok(CreateTableStatement { name, columns })
}

fn convert_column_def(col: sql::ColumnDef) -> Result<ColumnSpec, ParseError> {
    let mut spec = ColumnSpec {
        name: col.name.value,
        data_type: col.data_type.to_string(),
        not_null: false,
        primary_key: false,
        auto_increment: false,
        default: None,
    };

    for option in col.options {
        match option.option {
            sql::ColumnOption::NotNull => spec.not_null = true,
            sql::ColumnOption::Unique {
                is_primary: true, ..
            } => spec.primary_key = true,
            sql::ColumnOption::Default(expr) => {
                spec.default = Some(convert_literal(&expr)?);
            }
            sql::ColumnOption::DialectSpecific(tokens) => {
                let is_auto_increment = tokens.iter().any(|t| {
                    matches!(t, Token::Word(w)
                        if w.value.eq_ignore_ascii_case("AUTO_INCREMENT")
                            || w.value.eq_ignore_ascii_case("AUTOINCREMENT"))
                });
                if is_auto_increment {
                    spec.auto_increment = true;
                }
            }
            _ => {}
        }
    }

    Ok(spec)
}

fn convert_insert(insert: sql::Insert) -> Result<InsertStatement, ParseError> {
    let name = convert_object_name(&insert.table_name)?;
    let columns = insert
        .columns
        .iter()
        .map(|ident| ident.value.clone())
        .collect();

    let source = *insert
        .source
        .ok_or_else(|| ParseError::new("INSERT requires a VALUES clause"))?;

    let rows = match *source.body {
        sql::SetExpr::Values(values) => values.rows,
        _ => return Err(ParseError::new("INSERT requires a VALUES clause")),
    };

    if rows.len() != 1 {
        return Err(ParseError::new("multi-row INSERT is not supported"));
    }

    let values = rows
        .into_iter()
        .next()
        .unwrap()
        .iter()
        .map(convert_literal)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InsertStatement {
        name,
        columns,
        values,
    })
}

fn convert_query(query: sql::Query) -> Result<SelectStatement, ParseError> {
    if query.order_by.is_some() {
        return Err(ParseError::new("ORDER BY is not supported"));
    }

    let select = match *query.body {
        sql::SetExpr::Select(select) => *select,
        _ => return Err(ParseError::new("only plain SELECT queries are supported")),
    };

    match &select.group_by {
        sql::GroupByExpr::Expressions(exprs, _) if !exprs.is_empty() => {
            return Err(ParseError::new("GROUP BY is not supported"));
        }
        sql::GroupByExpr::All(_) => {
            return Err(ParseError::new("GROUP BY is not supported"));
        }
        _ => {}
    }

    if select.from.len() != 1 {
        return Err(ParseError::new(
            "SELECT requires exactly one table in FROM",
        ));
    }
    let table_ref = &select.from[0];
    if !table_ref.joins.is_empty() {
        return Err(ParseError::new("JOIN is not supported"));
    }

    let name = match &table_ref.relation {
        sql::TableFactor::Table { name, .. } => convert_object_name(name)?,
        _ => return Err(ParseError::new("unsupported FROM clause")),
    };

    let projection = convert_projection(&select.projection)?;

    let selection = select
        .selection
        .as_ref()
        .map(convert_expr)
        .transpose()?;

    let limit = match &query.limit {
        Some(expr) => match convert_literal(expr)? {
            Literal::Integer(n) => n,
            _ => return Err(ParseError::new("LIMIT must be an integer")),
        },
        None => -1,
    };

    let offset = match &query.offset {
        Some(offset) => match convert_literal(&offset.value)? {
            Literal::Integer(n) if n >= 0 => n as u64,
            _ => return Err(ParseError::new("OFFSET must be a non-negative integer")),
        },
        None => 0,
    };

    Ok(SelectStatement {
        name,
        projection,
        selection,
        limit,
        offset,
    })
}

fn convert_projection(items: &[sql::SelectItem]) -> Result<Projection, ParseError> {
    if items.len() == 1 {
        if let sql::SelectItem::Wildcard(_) = items[0] {
            return Ok(Projection::Wildcard);
        }
    }

    let mut columns = Vec::with_capacity(items.len());
    for item in items {
        match item {
            sql::SelectItem::UnnamedExpr(sql::Expr::Identifier(ident)) => {
                columns.push(ident.value.clone());
            }
            sql::SelectItem::Wildcard(_) => {
                return Err(ParseError::new(
                    "'*' cannot be combined with named columns",
                ));
            }
            _ => {
                return Err(ParseError::new(
                    "only plain column names are supported in the select list",
                ));
            }
        }
    }
    Ok(Projection::Columns(columns))
}

fn convert_expr(expr: &sql::Expr) -> Result<Expr, ParseError> {
    match expr {
        sql::Expr::Identifier(ident) => Ok(Expr::Column(ident.value.clone())),
        sql::Expr::Value(_) | sql::Expr::UnaryOp { .. } => {
            Ok(Expr::Literal(convert_literal(expr)?))
        }
        sql::Expr::Nested(inner) => convert_expr(inner),
        sql::Expr::BinaryOp { left, op, right } => {
            let op = convert_binary_op(op)?;
            Ok(Expr::Binary {
                left: Box::new(convert_expr(left)?),
                op,
                right: Box::new(convert_expr(right)?),
            })
        }
        other => Err(ParseError::new(format!(
            "unsupported expression: {}",
            other
        ))),
    }
}

fn convert_binary_op(op: &sql::BinaryOperator) -> Result<BinaryOp, ParseError> {
    match op {
        sql::BinaryOperator::Eq => Ok(BinaryOp::Eq),
        sql::BinaryOperator::NotEq => Ok(BinaryOp::NotEq),
        sql::BinaryOperator::Lt => Ok(BinaryOp::Lt),
        sql::BinaryOperator::Gt => Ok(BinaryOp::Gt),
        sql::BinaryOperator::LtEq => Ok(BinaryOp::LtEq),
        sql::BinaryOperator::GtEq => Ok(BinaryOp::GtEq),
        sql::BinaryOperator::And => Ok(BinaryOp::And),
        sql::BinaryOperator::Or => Ok(BinaryOp::Or),
        other => Err(ParseError::new(format!("unsupported operator: {}", other))),
    }
}

fn convert_literal(expr: &sql::Expr) -> Result<Literal, ParseError> {
    match expr {
        sql::Expr::Value(value) => convert_value(value),
        sql::Expr::UnaryOp {
            op: sql::UnaryOperator::Minus,
            expr,
        } => match convert_literal(expr)? {
            Literal::Integer(n) => Ok(Literal::Integer(-n)),
            Literal::Float(f) => Ok(Literal::Float(-f)),
            _ => Err(ParseError::new("'-' applies only to numeric literals")),
        },
        sql::Expr::Nested(inner) => convert_literal(inner),
        other => Err(ParseError::new(format!(
            "expected a literal value, got {}",
            other
        ))),
    }
}

fn convert_value(value: &sql::Value) -> Result<Literal, ParseError> {
    match value {
        sql::Value::Number(repr, _) => {
            if repr.contains(['.', 'e', 'E']) {
                repr.parse::<f64>()
                    .map(Literal::Float)
                    .map_err(|_| ParseError::new(format!("invalid numeric literal '{}'", repr)))
            } else {
                repr.parse::<i64>()
                    .map(Literal::Integer)
                    .map_err(|_| ParseError::new(format!("invalid integer literal '{}'", repr)))
            }
        }
        sql::Value::SingleQuotedString(s) | sql::Value::DoubleQuotedString(s) => {
            Ok(Literal::String(s.clone()))
        }
        sql::Value::Boolean(b) => Ok(Literal::Boolean(*b)),
        sql::Value::Null => Ok(Literal::Null),
        other => Err(ParseError::new(format!(
            "unsupported literal: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let stmt = TinyParser::parse_one(
            "CREATE TABLE t (id INT PRIMARY KEY, name VARCHAR(32))",
        )
        .unwrap();

        let create = match stmt {
            Statement::CreateTable(c) => c,
            other => panic!("expected CREATE TABLE, got {:?}", other),
        };
        assert_eq!(create.name.table, "t");
        assert_eq!(create.columns.len(), 2);
        assert_eq!(create.columns[0].name, "id");
        assert!(create.columns[0].primary_key);
        assert_eq!(create.columns[1].data_type, "VARCHAR(32)");
    }

    #[test]
    fn test_parse_create_table_attributes() {
        let stmt = TinyParser::parse_one(
            "CREATE TABLE t (id INT AUTO_INCREMENT, n INT NOT NULL, s VARCHAR(8) DEFAULT 'x')",
        )
        .unwrap();

        let create = match stmt {
            Statement::CreateTable(c) => c,
            other => panic!("expected CREATE TABLE, got {:?}", other),
        };
        assert!(create.columns[0].auto_increment);
        assert!(create.columns[1].not_null);
        assert_eq!(
            create.columns[2].default,
            Some(Literal::String("x".to_string()))
        );
    }

    #[test]
    fn test_parse_drop_table() {
        let stmt = TinyParser::parse_one("DROP TABLE test.users").unwrap();
        let drop = match stmt {
            Statement::DropTable(d) => d,
            other => panic!("expected DROP TABLE, got {:?}", other),
        };
        assert_eq!(drop.name.schema.as_deref(), Some("test"));
        assert_eq!(drop.name.table, "users");
    }

    #[test]
    fn test_parse_insert_positional() {
        let stmt = TinyParser::parse_one("INSERT INTO t VALUES (1, 'alice')").unwrap();
        let insert = match stmt {
            Statement::Insert(i) => i,
            other => panic!("expected INSERT, got {:?}", other),
        };
        assert!(insert.columns.is_empty());
        assert_eq!(
            insert.values,
            vec![Literal::Integer(1), Literal::String("alice".to_string())]
        );
    }

    #[test]
    fn test_parse_insert_with_columns() {
        let stmt =
            TinyParser::parse_one("INSERT INTO t (name, score) VALUES ('bob', -2.5)").unwrap();
        let insert = match stmt {
            Statement::Insert(i) => i,
            other => panic!("expected INSERT, got {:?}", other),
        };
        assert_eq!(insert.columns, vec!["name", "score"]);
        assert_eq!(insert.values[1], Literal::Float(-2.5));
    }

    #[test]
    fn test_parse_multi_row_insert_rejected() {
        let result = TinyParser::parse_one("INSERT INTO t VALUES (1), (2)");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_select_wildcard() {
        let stmt = TinyParser::parse_one("SELECT * FROM t").unwrap();
        let select = match stmt {
            Statement::Select(s) => s,
            other => panic!("expected SELECT, got {:?}", other),
        };
        assert_eq!(select.projection, Projection::Wildcard);
        assert_eq!(select.limit, -1);
        assert_eq!(select.offset, 0);
    }

    #[test]
    fn test_parse_select_where_limit_offset() {
        let stmt = TinyParser::parse_one(
            "SELECT name FROM t WHERE id > 1 AND name != 'x' LIMIT 10 OFFSET 2",
        )
        .unwrap();
        let select = match stmt {
            Statement::Select(s) => s,
            other => panic!("expected SELECT, got {:?}", other),
        };
        assert_eq!(
            select.projection,
            Projection::Columns(vec!["name".to_string()])
        );
        assert_eq!(select.limit, 10);
        assert_eq!(select.offset, 2);

        let expr = select.selection.unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::And, .. } => {}
            other => panic!("expected AND at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_select_rejects_order_by() {
        assert!(TinyParser::parse_one("SELECT * FROM t ORDER BY id").is_err());
    }

    #[test]
    fn test_parse_select_rejects_join() {
        assert!(TinyParser::parse_one("SELECT * FROM a JOIN b ON a.id = b.id").is_err());
    }

    #[test]
    fn test_parse_use() {
        assert_eq!(
            TinyParser::parse_one("USE test;").unwrap(),
            Statement::Use("test".to_string())
        );
        assert_eq!(
            TinyParser::parse_one("use `mydb`").unwrap(),
            Statement::Use("mydb".to_string())
        );
    }

    #[test]
    fn test_parse_show() {
        assert_eq!(
            TinyParser::parse_one("SHOW DATABASES").unwrap(),
            Statement::ShowDatabases
        );
        assert_eq!(
            TinyParser::parse_one("show tables;").unwrap(),
            Statement::ShowTables
        );
    }

    #[test]
    fn test_parse_syntax_error() {
        assert!(TinyParser::parse_one("SELEC * FROM t").is_err());
        assert!(TinyParser::parse_one("").is_err());
    }
}
