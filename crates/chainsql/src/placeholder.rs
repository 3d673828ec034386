//! Placeholder rewriting.
//!
//! Fragments always compose with the abstract `?` marker. Once a statement is
//! fully flattened, a single left-to-right scan turns the marker stream into
//! the backend's native parameter syntax. The running counter spans the whole
//! text, so sub-selects flattened into their parent share one numbering.
//!
//! `??` is the escape for a literal `?` and never counts as a marker. The scan
//! is not quote-aware: a `?` inside a string literal is still a marker.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The target backend's parameter syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderFormat {
    /// `?` (MySQL, SQLite)
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL)
    Dollar,
    /// `:1, :2, ...` (Oracle)
    Colon,
    /// `@p1, @p2, ...` (SQL Server)
    AtP,
}

impl PlaceholderFormat {
    /// Rewrite every non-escaped `?` marker in `sql`.
    pub fn replace(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len() + 8);
        let mut rest = sql;
        let mut n = 0usize;

        while let Some(pos) = rest.find('?') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if let Some(after) = tail.strip_prefix('?') {
                out.push('?');
                rest = after;
                continue;
            }
            n += 1;
            match self {
                PlaceholderFormat::Question => out.push('?'),
                PlaceholderFormat::Dollar => {
                    out.push('$');
                    out.push_str(&n.to_string());
                }
                PlaceholderFormat::Colon => {
                    out.push(':');
                    out.push_str(&n.to_string());
                }
                PlaceholderFormat::AtP => {
                    out.push_str("@p");
                    out.push_str(&n.to_string());
                }
            }
            rest = tail;
        }
        out.push_str(rest);
        out
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderFormat::Question => "question",
            PlaceholderFormat::Dollar => "dollar",
            PlaceholderFormat::Colon => "colon",
            PlaceholderFormat::AtP => "atp",
        }
    }
}

impl FromStr for PlaceholderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(PlaceholderFormat::Question),
            "dollar" | "$" => Ok(PlaceholderFormat::Dollar),
            "colon" | ":" => Ok(PlaceholderFormat::Colon),
            "atp" | "@p" => Ok(PlaceholderFormat::AtP),
            other => Err(format!("unknown placeholder format: {other}")),
        }
    }
}

/// Count the non-escaped `?` markers in `sql`.
pub fn count_markers(sql: &str) -> usize {
    let mut count = 0;
    let mut rest = sql;
    while let Some(pos) = rest.find('?') {
        let tail = &rest[pos + 1..];
        match tail.strip_prefix('?') {
            Some(after) => rest = after,
            None => {
                count += 1;
                rest = tail;
            }
        }
    }
    count
}

/// `"?,?,?"` for `n = 3`. Handy for hand-written `IN (...)` lists.
pub fn placeholders(n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(n * 2 - 1);
    for i in 0..n {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question() {
        let sql = "x = ? AND y = ?";
        assert_eq!(PlaceholderFormat::Question.replace(sql), sql);
    }

    #[test]
    fn test_dollar() {
        let sql = "x = ? AND y = ?";
        assert_eq!(PlaceholderFormat::Dollar.replace(sql), "x = $1 AND y = $2");
    }

    #[test]
    fn test_multi_digit_numbers() {
        let sql = vec!["?"; 11].join(",");
        assert_eq!(
            PlaceholderFormat::AtP.replace(&sql),
            "@p1,@p2,@p3,@p4,@p5,@p6,@p7,@p8,@p9,@p10,@p11"
        );
    }

    #[test]
    fn test_colon() {
        let sql = "x = ? AND y = ?";
        assert_eq!(PlaceholderFormat::Colon.replace(sql), "x = :1 AND y = :2");
    }

    #[test]
    fn test_atp() {
        let sql = "x = ? AND y = ?";
        assert_eq!(PlaceholderFormat::AtP.replace(sql), "x = @p1 AND y = @p2");
    }

    #[test]
    fn test_escape_is_uniform() {
        let sql = "x = ? AND y ?? z AND w = ?";
        assert_eq!(
            PlaceholderFormat::Dollar.replace(sql),
            "x = $1 AND y ? z AND w = $2"
        );
        assert_eq!(
            PlaceholderFormat::Question.replace(sql),
            "x = ? AND y ? z AND w = ?"
        );
        assert_eq!(PlaceholderFormat::Dollar.replace("a ??? b"), "a ?$1 b");
    }

    #[test]
    fn test_not_quote_aware() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace("x = '?' AND y = ?"),
            "x = '$1' AND y = $2"
        );
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let sql = "a = ? OR b IN (?,?,?)";
        let once = PlaceholderFormat::Dollar.replace(sql);
        assert_eq!(once, "a = $1 OR b IN ($2,$3,$4)");
        assert_eq!(PlaceholderFormat::Dollar.replace(sql), once);
    }

    #[test]
    fn test_unicode_passthrough() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace("名前 = ? AND ü = ?"),
            "名前 = $1 AND ü = $2"
        );
    }

    #[test]
    fn test_count_markers() {
        assert_eq!(count_markers("a = ? AND b ?? c AND d = ?"), 2);
        assert_eq!(count_markers("no markers"), 0);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?,?,?");
    }

    #[test]
    fn test_parse() {
        assert_eq!("Dollar".parse::<PlaceholderFormat>(), Ok(PlaceholderFormat::Dollar));
        assert_eq!("atp".parse::<PlaceholderFormat>(), Ok(PlaceholderFormat::AtP));
        assert!("percent".parse::<PlaceholderFormat>().is_err());
        assert_eq!(PlaceholderFormat::default(), PlaceholderFormat::Question);
    }
}
