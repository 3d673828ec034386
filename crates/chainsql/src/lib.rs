//! # chainsql
//!
//! Immutable, composable SQL builders.
//!
//! ## Features
//!
//! - **Fragments compose**: expressions, predicates, CASE expressions and whole
//!   statements nest inside each other and flatten into one SQL string
//! - **One marker, many backends**: fragments are written with `?` and rewritten
//!   to `?`, `$n`, `:n` or `@pn` once, at the outermost statement
//! - **Immutable builders**: every call returns a new builder, so a partial
//!   statement can be shared and extended in several directions
//! - **Optional execution**: attach a [`Runner`] to a builder to execute it
//!   through `tokio-postgres` or a `deadpool-postgres` pool
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use chainsql::{PlaceholderFormat, eq, expr, qb};
//!
//! let (sql, args) = qb::select(&["id", "name"])
//!     .from("users")
//!     .where_(eq().add("status", "active"))
//!     .where_(expr("created_at > ?", [cutoff]))
//!     .order_by(&["created_at DESC"])
//!     .limit(10)
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//!
//! // Execution
//! let rows = qb::select(&["*"])
//!     .from("users")
//!     .run_with(client)
//!     .query()
//!     .await?;
//! ```

pub mod compose;
pub mod config;
pub mod debug;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod placeholder;
pub mod predicate;
pub mod qb;
pub mod runner;
pub mod set_op;
pub mod store;
pub mod value;

pub use config::BuilderConfig;
pub use debug::{debug, interpolate};
pub use error::{SqlError, SqlResult};
pub use expr::{Alias, Concat, Conjunction, Expr, alias, and, concat, expr, or};
pub use fragment::{Fragment, Node};
pub use placeholder::{PlaceholderFormat, placeholders};
pub use predicate::{
    Op, PredicateMap, eq, gt, gte, ilike, like, lt, lte, ne, not_ilike, not_like,
};
pub use runner::{Runner, SharedRunner};
pub use set_op::{
    SetOp, except_all, except_distinct, intersect_all, intersect_distinct, union_all,
    union_distinct,
};
pub use value::{Arg, Value};

// Re-export qb module for easy access
pub use qb::{
    CaseBuilder, DeleteBuilder, InsertBuilder, SelectBuilder, StatementBuilder, UpdateBuilder,
    WithBuilder, case, case_value, delete, insert, replace, select, update, with,
};
