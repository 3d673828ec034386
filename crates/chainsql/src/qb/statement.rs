//! Shared defaults for starting statements.

use std::time::Duration;

use crate::config::BuilderConfig;
use crate::fragment::Node;
use crate::placeholder::PlaceholderFormat;
use crate::qb::case::CaseBuilder;
use crate::qb::delete::{DeleteBuilder, DeleteData};
use crate::qb::insert::{InsertBuilder, InsertData};
use crate::qb::select::{SelectBuilder, SelectData};
use crate::qb::update::{UpdateBuilder, UpdateData};
use crate::qb::with::WithBuilder;
use crate::runner::{Runner, SharedRunner};
use crate::store::{Handle, List, kind};

#[derive(Debug, Clone, Default)]
pub struct StatementData {
    pub(crate) format: PlaceholderFormat,
    pub(crate) runner: Option<SharedRunner>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) where_parts: List<Node>,
}

kind!(StatementData as "StatementBuilder" {
    FORMAT: PlaceholderFormat => format,
    RUNNER: Option<SharedRunner> => runner,
    TIMEOUT: Option<Duration> => timeout,
    WHERE_PARTS: List<Node> => where_parts,
});

/// Starts statements that share a placeholder format, a runner, a timeout
/// and a list of WHERE predicates.
///
/// ```ignore
/// let sb = StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar);
/// let (sql, _) = sb.select(&["id"]).from("users").where_(expr("id = ?", [1])).to_sql()?;
/// assert_eq!(sql, "SELECT id FROM users WHERE id = $1");
/// ```
#[derive(Clone, Default)]
pub struct StatementBuilder(Handle<StatementData>);

impl std::fmt::Debug for StatementBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded from configuration.
    pub fn from_config(config: &BuilderConfig) -> Self {
        let sb = Self::new().placeholder_format(config.placeholder_format);
        match config.query_timeout() {
            Some(timeout) => sb.timeout(timeout),
            None => sb,
        }
    }

    pub fn placeholder_format(&self, format: PlaceholderFormat) -> Self {
        Self(self.0.set(StatementData::FORMAT, format))
    }

    pub fn run_with(&self, runner: impl Runner + 'static) -> Self {
        self.run_with_shared(SharedRunner::new(runner))
    }

    pub fn run_with_shared(&self, runner: SharedRunner) -> Self {
        Self(self.0.set(StatementData::RUNNER, Some(runner)))
    }

    pub fn timeout(&self, timeout: Duration) -> Self {
        Self(self.0.set(StatementData::TIMEOUT, Some(timeout)))
    }

    /// Add a predicate carried into every SELECT, UPDATE and DELETE started
    /// from this builder. Blank predicates are ignored.
    pub fn where_(&self, pred: impl Into<Node>) -> Self {
        let pred: Node = pred.into();
        if pred.is_blank() {
            return self.clone();
        }
        Self(self.0.append(StatementData::WHERE_PARTS, pred))
    }

    pub(crate) fn state(&self) -> &StatementData {
        self.0.state()
    }

    pub fn select(&self, columns: &[&str]) -> SelectBuilder {
        let st = self.state();
        SelectBuilder::from_data(SelectData {
            format: st.format,
            runner: st.runner.clone(),
            timeout: st.timeout,
            where_parts: st.where_parts.clone(),
            ..SelectData::default()
        })
        .columns(columns)
    }

    pub fn insert(&self, into: &str) -> InsertBuilder {
        self.insert_with_keyword("INSERT", into)
    }

    /// `REPLACE INTO ...`, for backends that support it.
    pub fn replace(&self, into: &str) -> InsertBuilder {
        self.insert_with_keyword("REPLACE", into)
    }

    fn insert_with_keyword(&self, keyword: &'static str, into: &str) -> InsertBuilder {
        let st = self.state();
        InsertBuilder::from_data(InsertData {
            format: st.format,
            runner: st.runner.clone(),
            timeout: st.timeout,
            keyword,
            into: into.to_string(),
            ..InsertData::default()
        })
    }

    pub fn update(&self, table: &str) -> UpdateBuilder {
        let st = self.state();
        UpdateBuilder::from_data(UpdateData {
            format: st.format,
            runner: st.runner.clone(),
            timeout: st.timeout,
            table: table.to_string(),
            where_parts: st.where_parts.clone(),
            ..UpdateData::default()
        })
    }

    pub fn delete(&self, from: &str) -> DeleteBuilder {
        let st = self.state();
        DeleteBuilder::from_data(DeleteData {
            format: st.format,
            runner: st.runner.clone(),
            timeout: st.timeout,
            from: from.to_string(),
            where_parts: st.where_parts.clone(),
            ..DeleteData::default()
        })
    }

    /// Start a `WITH` prefix; the statement it starts inherits this builder.
    pub fn with(&self) -> WithBuilder {
        WithBuilder::new(self.clone())
    }

    pub fn case(&self) -> CaseBuilder {
        CaseBuilder::new()
    }

    pub fn case_value(&self, what: impl Into<Node>) -> CaseBuilder {
        CaseBuilder::new().what(what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::expr;

    #[test]
    fn test_where_is_carried_into_statements() {
        let sb = StatementBuilder::new().where_(expr("x = ?", [1]));
        let (sql, args) = sb.select(&["test"]).where_(expr("y = ?", [2])).to_sql().unwrap();
        assert_eq!(sql, "SELECT test WHERE x = ? AND y = ?");
        assert_eq!(args.len(), 2);

        let (sql, _) = sb.delete("t").to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM t WHERE x = ?");

        let (sql, _) = sb.update("t").set("a", 1).to_sql().unwrap();
        assert_eq!(sql, "UPDATE t SET a = ? WHERE x = ?");
    }

    #[test]
    fn test_format_is_carried() {
        let sb = StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar);
        let (sql, _) = sb.select(&["test"]).where_("x = ?").to_sql().unwrap();
        assert_eq!(sql, "SELECT test WHERE x = $1");

        let (sql, _) = sb.insert("t").values([1, 2]).to_sql().unwrap();
        assert_eq!(sql, "INSERT INTO t VALUES ($1,$2)");
    }

    #[test]
    fn test_blank_where_is_ignored() {
        let sb = StatementBuilder::new().where_("");
        assert!(sb.state().where_parts.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = BuilderConfig::new()
            .with_placeholder_format(PlaceholderFormat::Colon)
            .with_query_timeout_ms(250);
        let sb = StatementBuilder::from_config(&config);
        assert_eq!(sb.state().format, PlaceholderFormat::Colon);
        assert_eq!(sb.state().timeout, Some(Duration::from_millis(250)));
    }
}
