//! Structured SQL filter accumulation.
//!
//! Handlers collect an open set of optional filters; `Predicate` turns the
//! present ones into a `WHERE` clause with explicit `?N` placeholders and a
//! parallel ordered argument list. Filter values are always bound, never
//! interpolated into the query text.

/// A value bound to one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Int(i64),
    Text(String),
}

/// Accumulates optional filter clauses joined with `AND`.
///
/// Placeholder indices are assigned in the order filters are added, starting
/// at `?1`, so the same predicate can back both a count query and a page
/// query (which appends its `LIMIT`/`OFFSET` binds after the filter binds).
#[derive(Debug, Default)]
pub struct Predicate {
    clauses: Vec<String>,
    args: Vec<SqlArg>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound arguments; also the highest placeholder index in use.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// `""` when no filters are active, otherwise `"WHERE a AND b ..."`.
    pub fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }

    /// Exact match on a text column. Empty or whitespace-only values are
    /// treated as an absent filter.
    pub fn equals_text(&mut self, column: &str, value: Option<&str>) {
        if let Some(v) = present(value) {
            self.add(&format!("{column} = {{}}"), SqlArg::Text(v.to_string()));
        }
    }

    /// Exact match on an integer column.
    pub fn equals_int(&mut self, column: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.add(&format!("{column} = {{}}"), SqlArg::Int(v));
        }
    }

    /// Case-insensitive substring match, wildcarded on both sides.
    pub fn contains(&mut self, column: &str, value: Option<&str>) {
        if let Some(v) = present(value) {
            self.add(
                &format!("LOWER({column}) LIKE LOWER({{}})"),
                SqlArg::Text(format!("%{v}%")),
            );
        }
    }

    /// Case-insensitive substring match against either of two columns,
    /// sharing a single placeholder.
    pub fn contains_either(&mut self, col_a: &str, col_b: &str, value: Option<&str>) {
        if let Some(v) = present(value) {
            self.add(
                &format!("(LOWER({col_a}) LIKE LOWER({{}}) OR LOWER({col_b}) LIKE LOWER({{}}))"),
                SqlArg::Text(format!("%{v}%")),
            );
        }
    }

    /// Integer equality against either of two columns, sharing a single
    /// placeholder.
    pub fn equals_either(&mut self, col_a: &str, col_b: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.add(&format!("({col_a} = {{}} OR {col_b} = {{}})"), SqlArg::Int(v));
        }
    }

    /// Inclusive lower bound on a timestamp column.
    pub fn at_least(&mut self, column: &str, value: Option<&str>) {
        if let Some(v) = present(value) {
            self.add(&format!("{column} >= {{}}"), SqlArg::Text(v.to_string()));
        }
    }

    /// Inclusive upper bound on a timestamp column.
    pub fn at_most(&mut self, column: &str, value: Option<&str>) {
        if let Some(v) = present(value) {
            self.add(&format!("{column} <= {{}}"), SqlArg::Text(v.to_string()));
        }
    }

    /// Append a clause, substituting every `{}` in the template with this
    /// clause's `?N` placeholder.
    fn add(&mut self, template: &str, arg: SqlArg) {
        let placeholder = format!("?{}", self.args.len() + 1);
        self.clauses.push(template.replace("{}", &placeholder));
        self.args.push(arg);
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
