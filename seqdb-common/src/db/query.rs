//! Read-only query surface of the store
//!
//! Exact-id lookup, positive/negated keyword filters, free-text search over
//! name and contributors, and paginated listing ordered by id. Raw request
//! parameters are resolved into an [`EntryQuery`] once, at the boundary.

use crate::codec::{text_like_pattern, KeywordEncoding, KeywordSet, MaskFilter};
use crate::db::init::ENTRIES_TABLE;
use crate::db::models::SequenceEntry;
use crate::keywords::Keyword;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

/// Rows per listing page
pub const PAGE_SIZE: i64 = 100;

static A_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^a([0-9]+)$").expect("valid regex"));

/// Required and excluded keywords, parsed from `"k1,-k2,..."`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFilter {
    pub required: KeywordSet,
    pub excluded: KeywordSet,
}

impl KeywordFilter {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.excluded.is_empty()
    }

    pub fn mask_filter(&self) -> MaskFilter {
        MaskFilter::new(&self.required, &self.excluded)
    }

    /// Cycle one keyword: absent → required → excluded → absent
    pub fn toggle(&self, keyword: Keyword) -> KeywordFilter {
        let mut next = self.clone();
        if self.required.contains(keyword) {
            next.required = self.required.iter().filter(|k| *k != keyword).collect();
            next.excluded.insert(keyword);
        } else if self.excluded.contains(keyword) {
            next.excluded = self.excluded.iter().filter(|k| *k != keyword).collect();
        } else {
            next.required.insert(keyword);
        }
        next
    }
}

/// Toggle one keyword in a raw filter string, returning the canonical filter text
pub fn toggle_keyword(active: &str, keyword: Keyword) -> Result<String> {
    let filter: KeywordFilter = active.parse()?;
    Ok(filter.toggle(keyword).to_string())
}

impl FromStr for KeywordFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut filter = KeywordFilter::default();
        for token in s.split(',') {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                continue;
            }
            match token.strip_prefix('-') {
                Some(name) => filter.excluded.insert(name.parse()?),
                None => filter.required.insert(token.parse()?),
            };
        }
        Ok(filter)
    }
}

impl fmt::Display for KeywordFilter {
    /// Canonical filter text: tokens sorted as strings, comma-joined
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<String> = self
            .required
            .iter()
            .map(|k| k.as_str().to_string())
            .chain(self.excluded.iter().map(|k| format!("-{}", k)))
            .collect();
        tokens.sort();
        f.write_str(&tokens.join(","))
    }
}

/// Free-text search over name and contributors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    /// Lowercased, trimmed text
    pub text: String,
    /// Exact id when the text is an `A` number such as `a45`
    pub id: Option<i64>,
}

impl SearchTerm {
    /// `None` for blank input
    pub fn parse(raw: &str) -> Option<SearchTerm> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let id = A_NUMBER_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok());
        Some(SearchTerm { text, id })
    }

    fn like_pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.text.len() + 2);
        escaped.push('%');
        for c in self.text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }
}

/// A resolved listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub filter: KeywordFilter,
    pub search: Option<SearchTerm>,
    /// Requested page (1-indexed, clamped when executed)
    pub page: i64,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            filter: KeywordFilter::default(),
            search: None,
            page: 1,
        }
    }
}

impl EntryQuery {
    /// Resolve optional raw request parameters
    ///
    /// Absent and blank values fall back to "no filter", "no search", page 1.
    /// Unknown keywords and non-numeric pages are rejected.
    pub fn from_params(
        keywords: Option<&str>,
        search: Option<&str>,
        page: Option<&str>,
    ) -> Result<Self> {
        let filter = match keywords {
            Some(raw) => raw.parse()?,
            None => KeywordFilter::default(),
        };
        let search = search.and_then(SearchTerm::parse);
        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::InvalidInput(format!("Invalid page: {}", raw)))?
                .max(1),
            None => 1,
        };
        Ok(Self {
            filter,
            search,
            page,
        })
    }

    /// Page served when `total` rows match: the requested page clamped to `1..=last`
    pub fn effective_page(&self, total: i64) -> i64 {
        self.page.clamp(1, page_count(total).max(1))
    }

    /// WHERE clause (possibly empty) and its bind values
    fn where_clause(&self, encoding: KeywordEncoding) -> (String, Vec<Bind>) {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        match encoding {
            KeywordEncoding::Bitmask => {
                for (condition, values) in self.filter.mask_filter().sql_conditions() {
                    conditions.push(condition.to_string());
                    binds.extend(values.into_iter().map(Bind::Int));
                }
            }
            KeywordEncoding::Text => {
                for k in self.filter.required.iter() {
                    conditions.push("keywords LIKE ?".to_string());
                    binds.push(Bind::Text(text_like_pattern(k)));
                }
                for k in self.filter.excluded.iter() {
                    conditions.push("keywords NOT LIKE ?".to_string());
                    binds.push(Bind::Text(text_like_pattern(k)));
                }
            }
        }

        if let Some(term) = &self.search {
            let pattern = term.like_pattern();
            let text_match =
                "LOWER(name) LIKE ? ESCAPE '\\' OR LOWER(contributors) LIKE ? ESCAPE '\\'";
            match term.id {
                Some(id) => {
                    conditions.push(format!("(id = ? OR {})", text_match));
                    binds.push(Bind::Int(id));
                }
                None => conditions.push(format!("({})", text_match)),
            }
            binds.push(Bind::Text(pattern.clone()));
            binds.push(Bind::Text(pattern));
        }

        if conditions.is_empty() {
            (String::new(), binds)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), binds)
        }
    }
}

#[derive(Debug, Clone)]
enum Bind {
    Int(i64),
    Text(String),
}

fn page_count(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct EntryPage {
    /// Number of entries matching the query
    pub total: i64,
    /// Page served (1-indexed)
    pub page: i64,
    /// Zero when nothing matches
    pub total_pages: i64,
    pub entries: Vec<SequenceEntry>,
}

impl EntryPage {
    /// Lowest id on this page
    pub fn first_id(&self) -> Option<i64> {
        self.entries.first().map(|e| e.id)
    }

    /// Highest id on this page
    pub fn last_id(&self) -> Option<i64> {
        self.entries.last().map(|e| e.id)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Exact-id lookup
pub async fn find_entry(
    pool: &SqlitePool,
    encoding: KeywordEncoding,
    id: i64,
) -> Result<Option<SequenceEntry>> {
    let sql = format!(
        "SELECT id, name, keywords, contributors, derived_formula FROM {} WHERE id = ?",
        ENTRIES_TABLE
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.map(|r| SequenceEntry::from_row(&r, encoding)).transpose()
}

/// Total number of rows in the store
pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", ENTRIES_TABLE);
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// Filtered, searched, paginated listing ordered by id
pub async fn search_entries(
    pool: &SqlitePool,
    encoding: KeywordEncoding,
    query: &EntryQuery,
) -> Result<EntryPage> {
    let (where_clause, binds) = query.where_clause(encoding);

    let count_sql = format!("SELECT COUNT(*) FROM {} {}", ENTRIES_TABLE, where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = match bind {
            Bind::Int(v) => count_query.bind(*v),
            Bind::Text(v) => count_query.bind(v.clone()),
        };
    }
    let total = count_query.fetch_one(pool).await?;

    let page = query.effective_page(total);

    let list_sql = format!(
        "SELECT id, name, keywords, contributors, derived_formula FROM {} {} ORDER BY id LIMIT ? OFFSET ?",
        ENTRIES_TABLE, where_clause
    );
    let mut list_query = sqlx::query(&list_sql);
    for bind in &binds {
        list_query = match bind {
            Bind::Int(v) => list_query.bind(*v),
            Bind::Text(v) => list_query.bind(v.clone()),
        };
    }
    let rows = list_query
        .bind(PAGE_SIZE)
        .bind((page - 1) * PAGE_SIZE)
        .fetch_all(pool)
        .await?;

    let entries = rows
        .iter()
        .map(|r| SequenceEntry::from_row(r, encoding))
        .collect::<Result<Vec<_>>>()?;

    Ok(EntryPage {
        total,
        page,
        total_pages: page_count(total),
        entries,
    })
}
