use anyhow::Result;
use rusqlite::types::ToSql;

use crate::Database;
use crate::dreams::{DREAM_COLS, attach_symbols, dream_from_row};
use crate::models::DreamRow;

/// Typed search specification. Absent fields are omitted from the SQL
/// entirely rather than defaulted to wildcard comparisons; present fields
/// are AND-combined. Values only ever reach the query through bound
/// parameters.
#[derive(Debug, Clone)]
pub struct DreamFilter {
    pub user_id: String,
    /// Case-insensitive substring match over content or summary.
    pub query: Option<String>,
    /// Exact-name match against any linked symbol.
    pub symbols: Vec<String>,
    /// Inclusive dream-date bounds, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub is_lucid: Option<bool>,
    /// Inclusive mood bounds.
    pub mood_min: Option<i64>,
    pub mood_max: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl DreamFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            query: None,
            symbols: Vec::new(),
            date_from: None,
            date_to: None,
            is_lucid: None,
            mood_min: None,
            mood_max: None,
            limit: 50,
            offset: 0,
        }
    }

    /// Collect WHERE fragments with numbered placeholders and the matching
    /// parameter vector, in lockstep.
    fn build_where(&self) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(self.user_id.clone())];
        let mut clauses = vec!["d.user_id = ?1".to_string()];

        if let Some(q) = self.query.as_deref().map(str::trim)
            && !q.is_empty()
        {
            // SQLite LIKE is case-insensitive for ASCII by default.
            params.push(Box::new(format!("%{}%", q)));
            clauses.push(format!(
                "(d.content LIKE ?{n} OR d.summary LIKE ?{n})",
                n = params.len()
            ));
        }

        if !self.symbols.is_empty() {
            let mut placeholders = Vec::with_capacity(self.symbols.len());
            for name in &self.symbols {
                params.push(Box::new(name.clone()));
                placeholders.push(format!("?{}", params.len()));
            }
            clauses.push(format!(
                "d.id IN (
                    SELECT ds.dream_id FROM dream_symbols ds
                    JOIN symbols s ON ds.symbol_id = s.id
                    WHERE s.name IN ({})
                )",
                placeholders.join(", ")
            ));
        }

        if let Some(from) = &self.date_from {
            params.push(Box::new(from.clone()));
            clauses.push(format!("d.dream_date >= ?{}", params.len()));
        }

        if let Some(to) = &self.date_to {
            params.push(Box::new(to.clone()));
            clauses.push(format!("d.dream_date <= ?{}", params.len()));
        }

        if let Some(lucid) = self.is_lucid {
            params.push(Box::new(lucid));
            clauses.push(format!("d.is_lucid = ?{}", params.len()));
        }

        if let Some(min) = self.mood_min {
            params.push(Box::new(min));
            clauses.push(format!("d.mood_score >= ?{}", params.len()));
        }

        if let Some(max) = self.mood_max {
            params.push(Box::new(max));
            clauses.push(format!("d.mood_score <= ?{}", params.len()));
        }

        (clauses, params)
    }
}

impl Database {
    /// Run a filtered, paginated search. Returns the page (symbols
    /// attached) and the total match count over the same filter set, so
    /// callers can compute has-more without a second round trip.
    pub fn search_dreams(&self, filter: &DreamFilter) -> Result<(Vec<DreamRow>, i64)> {
        self.with_conn(|conn| {
            let (clauses, mut params) = filter.build_where();
            let where_sql = clauses.join(" AND ");

            let count_sql = format!("SELECT COUNT(*) FROM dreams d WHERE {}", where_sql);
            let count_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
            let total: i64 =
                conn.query_row(&count_sql, count_refs.as_slice(), |row| row.get(0))?;

            params.push(Box::new(filter.limit));
            let limit_idx = params.len();
            params.push(Box::new(filter.offset));
            let offset_idx = params.len();

            let page_sql = format!(
                "SELECT {DREAM_COLS} FROM dreams d
                 WHERE {where_sql}
                 ORDER BY d.dream_date DESC, d.created_at DESC
                 LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
            );

            let mut stmt = conn.prepare(&page_sql)?;
            let param_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
            let mut rows = stmt
                .query_map(param_refs.as_slice(), dream_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            attach_symbols(conn, &mut rows)?;
            Ok((rows, total))
        })
    }
}
