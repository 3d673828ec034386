//! WITH (common table expression) prefixes.

use std::fmt;

use crate::compose::Composer;
use crate::error::SqlResult;
use crate::fragment::{Fragment, Node};
use crate::qb::delete::DeleteBuilder;
use crate::qb::insert::InsertBuilder;
use crate::qb::select::SelectBuilder;
use crate::qb::statement::StatementBuilder;
use crate::qb::update::UpdateBuilder;
use crate::store::{Handle, List, kind};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct WithData {
    statement: StatementBuilder,
    parts: List<(String, Node)>,
}

kind!(WithData as "WithBuilder" {
    STATEMENT: StatementBuilder => statement,
    PARTS: List<(String, Node)> => parts,
});

/// `WITH a AS (...), b AS (...)`, usable as a prefix or as a starter for the
/// primary statement.
///
/// Statements started here inherit the placeholder format, runner, timeout
/// and WHERE predicates of the [`StatementBuilder`] this was created from.
/// With no parts the prefix is omitted.
#[derive(Clone, Default)]
pub struct WithBuilder(Handle<WithData>);

impl fmt::Debug for WithBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl WithBuilder {
    pub fn new(statement: StatementBuilder) -> Self {
        Self(Handle::new().set(WithData::STATEMENT, statement))
    }

    /// Add `alias AS (cte)`.
    pub fn as_(&self, alias: &str, cte: impl Into<Node>) -> Self {
        Self(
            self.0
                .append(WithData::PARTS, (alias.to_string(), cte.into())),
        )
    }

    /// Set the placeholder format of the statements started from here.
    pub fn placeholder_format(&self, format: crate::PlaceholderFormat) -> Self {
        let statement = self.0.get(WithData::STATEMENT).placeholder_format(format);
        Self(self.0.set(WithData::STATEMENT, statement))
    }

    fn statement(&self) -> &StatementBuilder {
        self.0.get(WithData::STATEMENT)
    }

    fn has_parts(&self) -> bool {
        !self.0.get(WithData::PARTS).is_empty()
    }

    pub fn select(&self, columns: &[&str]) -> SelectBuilder {
        let sql = self.statement().select(columns);
        if self.has_parts() {
            sql.prefix(self.clone())
        } else {
            sql
        }
    }

    pub fn insert(&self, into: &str) -> InsertBuilder {
        let sql = self.statement().insert(into);
        if self.has_parts() {
            sql.prefix(self.clone())
        } else {
            sql
        }
    }

    pub fn update(&self, table: &str) -> UpdateBuilder {
        let sql = self.statement().update(table);
        if self.has_parts() {
            sql.prefix(self.clone())
        } else {
            sql
        }
    }

    pub fn delete(&self, from: &str) -> DeleteBuilder {
        let sql = self.statement().delete(from);
        if self.has_parts() {
            sql.prefix(self.clone())
        } else {
            sql
        }
    }
}

impl Fragment for WithBuilder {
    fn render_raw(&self) -> SqlResult<(String, Vec<Value>)> {
        let parts = self.0.get(WithData::PARTS);
        if parts.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut out = Composer::new();
        out.push_str("WITH");
        for (i, (alias, cte)) in parts.iter().enumerate() {
            out.push_str(if i > 0 { ", " } else { " " });
            out.push_str(alias);
            out.push_str(" AS (");
            out.write(cte, " ");
            out.push_str(")");
        }
        out.finish()
    }

    fn is_blank(&self) -> bool {
        self.0.get(WithData::PARTS).is_empty()
    }
}
