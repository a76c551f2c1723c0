//! View pipeline builder
//!
//! List endpoints are backed by declarative query pipelines: a scope filter,
//! join stages attaching related entities, a fixed projection allow-list, a
//! whitelisted sort, and the pagination window. Repositories describe the
//! pipeline; this module renders and executes it.
//!
//! Join stages come in two flavours. An optional join (`LEFT JOIN`) only
//! attaches data and never changes the row count, so it is excluded from the
//! count query. A required join (`INNER JOIN`) drops rows whose join produced
//! no match (e.g. liked-videos listing) and therefore participates in the
//! count as well.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pagination::{Page, PageParams};

/// Sort direction for a recognized sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Parse a `sortType` query value; anything but "asc" sorts descending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

/// An externally recognized sort key and the column it maps to
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub name: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone)]
enum Condition {
    IdEq(&'static str, Uuid),
    FlagEq(&'static str, bool),
    /// Case-insensitive substring match, OR'ed over the columns and
    /// AND'ed with the rest of the scope
    Search {
        columns: &'static [&'static str],
        pattern: String,
    },
}

#[derive(Debug, Clone)]
struct JoinStage {
    clause: &'static str,
    required: bool,
}

/// A declarative list query: filter -> join -> project -> sort
#[derive(Debug, Clone)]
pub struct ListPipeline {
    from: &'static str,
    projection: String,
    joins: Vec<JoinStage>,
    conditions: Vec<Condition>,
    order_column: String,
    order_direction: SortDirection,
}

impl ListPipeline {
    pub fn new(from: &'static str, projection: impl Into<String>) -> Self {
        Self {
            from,
            projection: projection.into(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_column: "created_at".to_string(),
            order_direction: SortDirection::Descending,
        }
    }

    /// Attach related data; never drops rows
    pub fn join(mut self, clause: &'static str) -> Self {
        self.joins.push(JoinStage {
            clause,
            required: false,
        });
        self
    }

    /// Join that must match; rows without a match are dropped before counting
    pub fn join_required(mut self, clause: &'static str) -> Self {
        self.joins.push(JoinStage {
            clause,
            required: true,
        });
        self
    }

    pub fn filter_id(mut self, column: &'static str, id: Uuid) -> Self {
        self.conditions.push(Condition::IdEq(column, id));
        self
    }

    pub fn filter_flag(mut self, column: &'static str, value: bool) -> Self {
        self.conditions.push(Condition::FlagEq(column, value));
        self
    }

    /// Free-text query over a fixed set of text columns; empty terms are ignored
    pub fn search(mut self, term: &str, columns: &'static [&'static str]) -> Self {
        let term = term.trim();
        if !term.is_empty() && !columns.is_empty() {
            self.conditions.push(Condition::Search {
                columns,
                pattern: format!("%{}%", escape_like(term)),
            });
        }
        self
    }

    pub fn order(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_column = column.to_string();
        self.order_direction = direction;
        self
    }

    /// Apply a caller-requested sort if the key is recognized; otherwise
    /// fall back to descending creation time
    pub fn order_requested(
        self,
        sort_by: Option<&str>,
        sort_type: Option<&str>,
        keys: &[SortKey],
        default_column: &str,
    ) -> Self {
        match sort_by.and_then(|name| keys.iter().find(|k| k.name == name)) {
            Some(key) => self.order(key.column, SortDirection::parse(sort_type)),
            None => self.order(default_column, SortDirection::Descending),
        }
    }

    fn push_joins(&self, qb: &mut QueryBuilder<'static, Postgres>, include_optional: bool) {
        for join in &self.joins {
            if join.required {
                qb.push(" INNER JOIN ").push(join.clause);
            } else if include_optional {
                qb.push(" LEFT JOIN ").push(join.clause);
            }
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        if self.conditions.is_empty() {
            return;
        }

        qb.push(" WHERE ");
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            match condition {
                Condition::IdEq(column, id) => {
                    qb.push(*column).push(" = ").push_bind(*id);
                }
                Condition::FlagEq(column, value) => {
                    qb.push(*column).push(" = ").push_bind(*value);
                }
                Condition::Search { columns, pattern } => {
                    qb.push("(");
                    for (j, column) in columns.iter().enumerate() {
                        if j > 0 {
                            qb.push(" OR ");
                        }
                        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
                    }
                    qb.push(")");
                }
            }
        }
    }

    fn count_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(self.from);
        self.push_joins(&mut qb, false);
        self.push_where(&mut qb);
        qb
    }

    fn items_builder(&self, params: PageParams) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.projection.clone())
            .push(" FROM ")
            .push(self.from);
        self.push_joins(&mut qb, true);
        self.push_where(&mut qb);
        qb.push(" ORDER BY ")
            .push(self.order_column.clone())
            .push(" ")
            .push(self.order_direction.as_sql());
        qb.push(" LIMIT ")
            .push_bind(params.limit as i64)
            .push(" OFFSET ")
            .push_bind(params.offset());
        qb
    }

    /// Execute the pipeline: count the pre-pagination scope, fetch the
    /// requested window, and wrap both in the page envelope
    pub async fn fetch_page<T>(
        &self,
        pool: &PgPool,
        params: PageParams,
    ) -> Result<Page<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total_items: i64 = self
            .count_builder()
            .build_query_scalar()
            .fetch_one(pool)
            .await?;

        let items = self
            .items_builder(params)
            .build_query_as::<T>()
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, params, total_items))
    }
}

/// Escape LIKE metacharacters so a search term is matched literally
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_id() -> Uuid {
        "550e8400-e29b-41d4-a716-446655440000".parse().unwrap()
    }

    #[test]
    fn test_scope_filter_renders_into_both_queries() {
        let pipeline = ListPipeline::new("videos v", "v.id")
            .filter_flag("v.is_published", true)
            .filter_id("v.owner_id", video_id());

        let count = pipeline.count_builder();
        assert!(count.sql().starts_with("SELECT COUNT(*) FROM videos v"));
        assert!(count.sql().contains("v.is_published = $1"));
        assert!(count.sql().contains("AND v.owner_id = $2"));

        let items = pipeline.items_builder(PageParams::default());
        assert!(items.sql().contains("v.is_published = $1"));
        assert!(items.sql().contains("v.owner_id = $2"));
    }

    #[test]
    fn test_search_group_is_ored_inside_and_anded_with_scope() {
        let pipeline = ListPipeline::new("videos v", "v.id")
            .filter_flag("v.is_published", true)
            .search("cat", &["v.title", "v.description"]);

        let sql = pipeline.items_builder(PageParams::default());
        assert!(
            sql.sql()
                .contains("AND (v.title ILIKE $2 OR v.description ILIKE $3)")
        );
    }

    #[test]
    fn test_empty_search_term_is_ignored() {
        let pipeline = ListPipeline::new("videos v", "v.id").search("   ", &["v.title"]);
        assert!(!pipeline.items_builder(PageParams::default()).sql().contains("ILIKE"));
    }

    #[test]
    fn test_optional_join_attaches_but_does_not_count() {
        let pipeline = ListPipeline::new("videos v", "v.id, owner.username")
            .join("users owner ON owner.id = v.owner_id");

        assert!(!pipeline.count_builder().sql().contains("JOIN"));
        assert!(
            pipeline
                .items_builder(PageParams::default())
                .sql()
                .contains("LEFT JOIN users owner ON owner.id = v.owner_id")
        );
    }

    #[test]
    fn test_required_join_participates_in_count() {
        let pipeline = ListPipeline::new("likes l", "v.id")
            .join_required("videos v ON v.id = l.video_id");

        assert!(
            pipeline
                .count_builder()
                .sql()
                .contains("INNER JOIN videos v ON v.id = l.video_id")
        );
    }

    #[test]
    fn test_unrecognized_sort_key_falls_back_to_created_at_desc() {
        const KEYS: &[SortKey] = &[
            SortKey { name: "views", column: "v.views" },
            SortKey { name: "duration", column: "v.duration" },
        ];

        let pipeline = ListPipeline::new("videos v", "v.id").order_requested(
            Some("password_hash"),
            Some("asc"),
            KEYS,
            "v.created_at",
        );
        assert!(
            pipeline
                .items_builder(PageParams::default())
                .sql()
                .contains("ORDER BY v.created_at DESC")
        );

        let pipeline = ListPipeline::new("videos v", "v.id").order_requested(
            Some("views"),
            Some("asc"),
            KEYS,
            "v.created_at",
        );
        assert!(
            pipeline
                .items_builder(PageParams::default())
                .sql()
                .contains("ORDER BY v.views ASC")
        );
    }

    #[test]
    fn test_window_is_bound_not_inlined() {
        let pipeline = ListPipeline::new("videos v", "v.id");
        let sql = pipeline.items_builder(PageParams { page: 3, limit: 20 });
        assert!(sql.sql().ends_with("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_sort_direction_parsing() {
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Ascending);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Ascending);
        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Descending);
        assert_eq!(SortDirection::parse(Some("upwards")), SortDirection::Descending);
        assert_eq!(SortDirection::parse(None), SortDirection::Descending);
    }

    #[test]
    fn test_like_escaping() {
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }
}
