//! Human-readable rendering with arguments substituted inline.
//!
//! The output is for logs and error messages only. Values are quoted with a
//! naive `'` doubling and must never be sent to a database.

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::placeholder::count_markers;
use crate::value::Value;

/// Substitute each non-escaped `?` in `sql` with the matching argument.
pub fn interpolate(sql: &str, args: &[Value]) -> SqlResult<String> {
    let markers = count_markers(sql);
    if markers != args.len() {
        return Err(SqlError::PlaceholderMismatch {
            markers,
            args: args.len(),
        });
    }

    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut values = args.iter();
    let mut rest = sql;
    while let Some(pos) = rest.find('?') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(after) = tail.strip_prefix('?') {
            out.push('?');
            rest = after;
            continue;
        }
        if let Some(value) = values.next() {
            out.push_str(&value.to_string());
        }
        rest = tail;
    }
    out.push_str(rest);
    Ok(out)
}

/// Render `fragment` and interpolate its arguments.
///
/// Failures are reported inline as `[render error: ...]` or
/// `[debug error: ...]` so the result can always be logged.
pub fn debug(fragment: &dyn Fragment) -> String {
    let (sql, args) = match fragment.render_raw() {
        Ok(rendered) => rendered,
        Err(err) => return format!("[render error: {err}]"),
    };
    match interpolate(&sql, &args) {
        Ok(text) => text,
        Err(err) => format!("[debug error: {err}]"),
    }
}
