//! Filter types for dynamic query building.
//!
//! A [`Filter`] is the predicate accepted by `first_or_default` and
//! `bulk_remove`: a conjunction of column conditions that every store can
//! evaluate, either as a SQL `WHERE` clause or directly against a record.

use serde::Serialize;

use super::schema::Record;
use super::value::FieldValue;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `LIKE` pattern match.
    Like,
    /// SQL `ILIKE` case-insensitive pattern match.
    ILike,
    /// SQL `IS NULL` check.
    IsNull,
    /// SQL `IS NOT NULL` check.
    IsNotNull,
}

impl FilterOp {
    /// Return the SQL operator for this comparison.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// A single filter condition on a named column.
#[derive(Debug, Clone, Serialize)]
pub struct FilterField {
    /// The column name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FieldValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Shorthand for an inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    /// Shorthand for a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Gt, value)
    }

    /// Shorthand for a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Lt, value)
    }

    /// Shorthand for a case-insensitive LIKE filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FieldValue::Text(pattern.into()))
    }

    /// Shorthand for an `IS NULL` filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNull, FieldValue::Null)
    }

    /// Evaluate this condition against a record.
    ///
    /// A missing column or a comparison between incompatible types is
    /// `false`, like a SQL comparison that yields `NULL`.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(self.field.as_str()).unwrap_or(&FieldValue::Null);

        match self.op {
            FilterOp::IsNull => return actual.is_null(),
            FilterOp::IsNotNull => return !actual.is_null(),
            _ => {}
        }
        if actual.is_null() || self.value.is_null() {
            return false;
        }

        match self.op {
            FilterOp::Like | FilterOp::ILike => {
                let (Some(text), Some(pattern)) = (actual.as_str(), self.value.as_str()) else {
                    return false;
                };
                if self.op == FilterOp::ILike {
                    like_match(&text.to_lowercase(), &pattern.to_lowercase())
                } else {
                    like_match(text, pattern)
                }
            }
            op => match actual.compare(&self.value) {
                Some(ordering) => match op {
                    FilterOp::Eq => ordering.is_eq(),
                    FilterOp::Ne => ordering.is_ne(),
                    FilterOp::Gt => ordering.is_gt(),
                    FilterOp::Gte => ordering.is_ge(),
                    FilterOp::Lt => ordering.is_lt(),
                    FilterOp::Lte => ordering.is_le(),
                    _ => false,
                },
                None => false,
            },
        }
    }
}

/// A conjunction of conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Filter {
    /// Conditions that must all hold.
    pub conditions: Vec<FilterField>,
}

impl Filter {
    /// A filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn and(mut self, condition: FilterField) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Whether there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate every condition against a record.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

impl From<FilterField> for Filter {
    fn from(condition: FilterField) -> Self {
        Self {
            conditions: vec![condition],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    Many,
    One,
    Literal(char),
}

/// Split a pattern into tokens. A backslash makes the next character
/// literal, as PostgreSQL's default `LIKE` escape does.
fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::Many,
            '_' => LikeToken::One,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            c => LikeToken::Literal(c),
        });
    }
    tokens
}

/// SQL `LIKE` semantics: `%` matches any run of characters, `_` exactly one.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern = like_tokens(pattern);

    let (mut t, mut p) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(LikeToken::One) => {
                t += 1;
                p += 1;
                continue;
            }
            Some(LikeToken::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
                continue;
            }
            Some(LikeToken::Many) => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            Some((star_p, star_t)) => {
                p = star_p + 1;
                t = star_t + 1;
                backtrack = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|token| *token == LikeToken::Many)
}
