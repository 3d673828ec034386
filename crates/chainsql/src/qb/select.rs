//! SELECT statement builder.

use std::time::Duration;

use crate::args;
use crate::compose::Composer;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, alias, concat};
use crate::fragment::Node;
use crate::placeholder::PlaceholderFormat;
use crate::runner::SharedRunner;
use crate::store::{Handle, List, kind};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct SelectData {
    pub(crate) format: PlaceholderFormat,
    pub(crate) runner: Option<SharedRunner>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) prefixes: List<Node>,
    pub(crate) options: List<String>,
    pub(crate) columns: List<Node>,
    pub(crate) from: Option<Node>,
    pub(crate) joins: List<Node>,
    pub(crate) where_parts: List<Node>,
    pub(crate) group_bys: List<String>,
    pub(crate) having_parts: List<Node>,
    pub(crate) order_by_parts: List<Node>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) suffixes: List<Node>,
}

kind!(SelectData as "SelectBuilder" {
    FORMAT: PlaceholderFormat => format,
    RUNNER: Option<SharedRunner> => runner,
    TIMEOUT: Option<Duration> => timeout,
    PREFIXES: List<Node> => prefixes,
    OPTIONS: List<String> => options,
    COLUMNS: List<Node> => columns,
    FROM: Option<Node> => from,
    JOINS: List<Node> => joins,
    WHERE_PARTS: List<Node> => where_parts,
    GROUP_BYS: List<String> => group_bys,
    HAVING_PARTS: List<Node> => having_parts,
    ORDER_BY_PARTS: List<Node> => order_by_parts,
    LIMIT: Option<u64> => limit,
    OFFSET: Option<u64> => offset,
    SUFFIXES: List<Node> => suffixes,
});

/// SELECT statement builder.
///
/// Every method returns a new builder; the receiver is never modified, so a
/// partially built query can be shared and extended in several directions.
#[derive(Clone, Default)]
pub struct SelectBuilder(Handle<SelectData>);

impl_statement_fragment!(SelectBuilder, SelectData, subquery = true);

impl SelectBuilder {
    pub(crate) fn from_data(data: SelectData) -> Self {
        Self(Handle::from_state(data))
    }

    impl_statement_exec!(SelectData);

    fn assemble(&self) -> SqlResult<(String, Vec<Value>)> {
        let d = self.0.state();
        if d.columns.is_empty() {
            return Err(SqlError::missing(
                "select statements must have at least one result column",
            ));
        }

        let mut out = Composer::new();
        if !d.prefixes.is_empty() {
            out.write_all(d.prefixes.iter(), " ");
            out.push_str(" ");
        }

        out.push_str("SELECT ");
        if !d.options.is_empty() {
            out.push_str(&d.options.join(" "));
            out.push_str(" ");
        }
        out.write_all(d.columns.iter(), ", ");

        if let Some(from) = &d.from {
            out.push_str(" FROM ");
            out.write(from, "");
        }

        out.section("", &d.joins, " ");
        out.section("WHERE", &d.where_parts, " AND ");
        if !d.group_bys.is_empty() {
            out.push_str(" GROUP BY ");
            out.push_str(&d.group_bys.join(", "));
        }
        out.section("HAVING", &d.having_parts, " AND ");
        out.section("ORDER BY", &d.order_by_parts, ", ");

        if let Some(limit) = d.limit {
            out.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = d.offset {
            out.push_str(&format!(" OFFSET {offset}"));
        }

        out.section("", &d.suffixes, " ");
        out.finish()
    }

    // ==================== Prefix / options ====================

    /// Add a fragment written before `SELECT`, e.g. a `WITH` clause.
    pub fn prefix(&self, prefix: impl Into<Node>) -> Self {
        Self(self.0.append(SelectData::PREFIXES, prefix.into()))
    }

    pub fn remove_prefixes(&self) -> Self {
        Self(self.0.delete(SelectData::PREFIXES))
    }

    pub fn distinct(&self) -> Self {
        self.options(&["DISTINCT"])
    }

    /// Add keywords written right after `SELECT`.
    pub fn options(&self, options: &[&str]) -> Self {
        Self(
            self.0
                .extend(SelectData::OPTIONS, options.iter().map(|o| o.to_string())),
        )
    }

    // ==================== Columns ====================

    pub fn columns(&self, columns: &[&str]) -> Self {
        Self(
            self.0
                .extend(SelectData::COLUMNS, columns.iter().map(|c| Node::from(*c))),
        )
    }

    /// Add one result column, which may be any fragment.
    pub fn column(&self, column: impl Into<Node>) -> Self {
        Self(self.0.append(SelectData::COLUMNS, column.into()))
    }

    /// Remove every result column; rendering fails until one is added again.
    pub fn remove_columns(&self) -> Self {
        Self(self.0.delete(SelectData::COLUMNS))
    }

    // ==================== FROM ====================

    pub fn from(&self, from: &str) -> Self {
        Self(self.0.set(SelectData::FROM, Some(Node::from(from))))
    }

    /// `FROM (subquery) AS alias`
    pub fn from_select(&self, from: impl Into<Node>, alias_name: &str) -> Self {
        let from = alias(from, alias_name);
        Self(self.0.set(SelectData::FROM, Some(Node::new(from))))
    }

    // ==================== JOIN ====================

    /// Add a complete join clause, written as given.
    pub fn join_clause(&self, join: impl Into<Node>) -> Self {
        Self(self.0.append(SelectData::JOINS, join.into()))
    }

    pub fn remove_joins(&self) -> Self {
        Self(self.0.delete(SelectData::JOINS))
    }

    fn keyword_join(&self, keyword: &str, join: impl Into<Expr>) -> Self {
        let join: Expr = join.into();
        self.join_clause(join.prefixed(keyword))
    }

    /// `JOIN <join>`; the template may carry arguments.
    pub fn join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("JOIN", join)
    }

    pub fn left_join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("LEFT JOIN", join)
    }

    pub fn right_join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("RIGHT JOIN", join)
    }

    pub fn inner_join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("INNER JOIN", join)
    }

    pub fn cross_join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("CROSS JOIN", join)
    }

    pub fn full_join(&self, join: impl Into<Expr>) -> Self {
        self.keyword_join("FULL JOIN", join)
    }

    fn keyword_join_on(
        &self,
        keyword: &'static str,
        target: impl Into<Node>,
        on: impl Into<Node>,
    ) -> Self {
        let target: Node = target.into();
        let on: Node = on.into();
        self.join_clause(concat(args![keyword, " ", target, " ON ", on]))
    }

    /// `JOIN <target> ON <on>`
    pub fn join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("JOIN", target, on)
    }

    pub fn left_join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("LEFT JOIN", target, on)
    }

    pub fn right_join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("RIGHT JOIN", target, on)
    }

    pub fn inner_join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("INNER JOIN", target, on)
    }

    pub fn cross_join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("CROSS JOIN", target, on)
    }

    pub fn full_join_on(&self, target: impl Into<Node>, on: impl Into<Node>) -> Self {
        self.keyword_join_on("FULL JOIN", target, on)
    }

    /// `JOIN (select) AS alias ON <on>`
    pub fn join_select(&self, select: SelectBuilder, alias_name: &str, on: impl Into<Node>) -> Self {
        self.join_on(alias(select, alias_name), on)
    }

    pub fn left_join_select(
        &self,
        select: SelectBuilder,
        alias_name: &str,
        on: impl Into<Node>,
    ) -> Self {
        self.left_join_on(alias(select, alias_name), on)
    }

    pub fn right_join_select(
        &self,
        select: SelectBuilder,
        alias_name: &str,
        on: impl Into<Node>,
    ) -> Self {
        self.right_join_on(alias(select, alias_name), on)
    }

    pub fn inner_join_select(
        &self,
        select: SelectBuilder,
        alias_name: &str,
        on: impl Into<Node>,
    ) -> Self {
        self.inner_join_on(alias(select, alias_name), on)
    }

    pub fn cross_join_select(
        &self,
        select: SelectBuilder,
        alias_name: &str,
        on: impl Into<Node>,
    ) -> Self {
        self.cross_join_on(alias(select, alias_name), on)
    }

    pub fn full_join_select(
        &self,
        select: SelectBuilder,
        alias_name: &str,
        on: impl Into<Node>,
    ) -> Self {
        self.full_join_on(alias(select, alias_name), on)
    }

    // ==================== WHERE ====================

    /// Add a predicate; predicates are joined with `AND`. Blank predicates
    /// (such as `""`) are ignored.
    pub fn where_(&self, pred: impl Into<Node>) -> Self {
        let pred: Node = pred.into();
        if pred.is_blank() {
            return self.clone();
        }
        Self(self.0.append(SelectData::WHERE_PARTS, pred))
    }

    pub fn remove_where(&self) -> Self {
        Self(self.0.delete(SelectData::WHERE_PARTS))
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group_by(&self, group_bys: &[&str]) -> Self {
        Self(
            self.0
                .extend(SelectData::GROUP_BYS, group_bys.iter().map(|g| g.to_string())),
        )
    }

    pub fn remove_group_by(&self) -> Self {
        Self(self.0.delete(SelectData::GROUP_BYS))
    }

    pub fn having(&self, pred: impl Into<Node>) -> Self {
        let pred: Node = pred.into();
        if pred.is_blank() {
            return self.clone();
        }
        Self(self.0.append(SelectData::HAVING_PARTS, pred))
    }

    pub fn remove_having(&self) -> Self {
        Self(self.0.delete(SelectData::HAVING_PARTS))
    }

    // ==================== ORDER BY ====================

    /// Add an ORDER BY term that may carry arguments.
    pub fn order_by_clause(&self, clause: impl Into<Node>) -> Self {
        Self(self.0.append(SelectData::ORDER_BY_PARTS, clause.into()))
    }

    pub fn order_by(&self, order_bys: &[&str]) -> Self {
        Self(self.0.extend(
            SelectData::ORDER_BY_PARTS,
            order_bys.iter().map(|o| Node::from(*o)),
        ))
    }

    pub fn remove_order_by(&self) -> Self {
        Self(self.0.delete(SelectData::ORDER_BY_PARTS))
    }

    // ==================== LIMIT / OFFSET ====================

    pub fn limit(&self, limit: u64) -> Self {
        Self(self.0.set(SelectData::LIMIT, Some(limit)))
    }

    pub fn remove_limit(&self) -> Self {
        Self(self.0.delete(SelectData::LIMIT))
    }

    pub fn offset(&self, offset: u64) -> Self {
        Self(self.0.set(SelectData::OFFSET, Some(offset)))
    }

    pub fn remove_offset(&self) -> Self {
        Self(self.0.delete(SelectData::OFFSET))
    }

    // ==================== Suffix ====================

    /// Add a fragment written after the statement, e.g. `FOR UPDATE`.
    pub fn suffix(&self, suffix: impl Into<Node>) -> Self {
        Self(self.0.append(SelectData::SUFFIXES, suffix.into()))
    }

    pub fn remove_suffixes(&self) -> Self {
        Self(self.0.delete(SelectData::SUFFIXES))
    }
}
