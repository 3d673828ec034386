//! Statement builders.
//!
//! Each builder is an immutable value: every method returns a new builder and
//! leaves the receiver untouched, so partially built statements can be kept
//! around and extended in several directions.
//!
//! ```ignore
//! use chainsql::{PlaceholderFormat, expr, predicate::eq, qb};
//!
//! let active = qb::select(&["id", "name"]).from("users").where_(eq().add("active", true));
//!
//! let (sql, args) = active
//!     .where_(expr("created_at > ?", [cutoff]))
//!     .order_by(&["created_at DESC"])
//!     .limit(20)
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! // SELECT id, name FROM users WHERE active = $1 AND created_at > $2
//! //     ORDER BY created_at DESC LIMIT 20
//! ```

#[macro_use]
mod exec;

mod case;
mod delete;
mod insert;
mod select;
mod statement;
mod update;
mod with;


pub use case::{CaseBuilder, CaseData};
pub use delete::{DeleteBuilder, DeleteData};
pub use insert::{InsertBuilder, InsertData};
pub use select::{SelectBuilder, SelectData};
pub use statement::{StatementBuilder, StatementData};
pub use update::{UpdateBuilder, UpdateData};
pub use with::{WithBuilder, WithData};

use crate::fragment::Node;

/// Start a SELECT with the default statement settings.
pub fn select(columns: &[&str]) -> SelectBuilder {
    StatementBuilder::new().select(columns)
}

/// Start an INSERT into `into`.
pub fn insert(into: &str) -> InsertBuilder {
    StatementBuilder::new().insert(into)
}

/// Start a `REPLACE INTO` statement.
pub fn replace(into: &str) -> InsertBuilder {
    StatementBuilder::new().replace(into)
}

pub fn update(table: &str) -> UpdateBuilder {
    StatementBuilder::new().update(table)
}

pub fn delete(from: &str) -> DeleteBuilder {
    StatementBuilder::new().delete(from)
}

/// `CASE WHEN ... END`
pub fn case() -> CaseBuilder {
    CaseBuilder::new()
}

/// `CASE <what> WHEN ... END`
pub fn case_value(what: impl Into<Node>) -> CaseBuilder {
    CaseBuilder::new().what(what)
}

/// Start a `WITH` prefix.
pub fn with() -> WithBuilder {
    StatementBuilder::new().with()
}
