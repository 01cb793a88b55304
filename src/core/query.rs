//! List view logic: search, status filter, sort and pagination
//!
//! Registries fetch the whole collection and narrow it in memory, the same
//! way a management table does over a live query.
//!
//! ```text
//! GET /clients?search=silva&status=active&sort=name:desc&page=2&page_size=10
//! ```

use crate::core::entity::{Record, Status};
use crate::core::error::{BackofficeError, ValidationError};
use crate::core::field::{FieldValue, fold};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Query string of a registry list or export
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListQuery {
    /// Free-text search over the record's search fields
    pub search: Option<String>,

    /// Exact status filter
    pub status: Option<Status>,

    /// `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Page number (starts at 1)
    pub page: Option<usize>,

    /// Items per page
    pub page_size: Option<usize>,

    /// Comma-separated ids restricting the result (export of a selection)
    pub ids: Option<String>,
}

impl ListQuery {
    pub fn sort_spec(&self) -> Result<Option<SortSpec>, BackofficeError> {
        self.sort.as_deref().map(SortSpec::parse).transpose()
    }

    pub fn id_selection(&self) -> Result<Option<Vec<Uuid>>, BackofficeError> {
        let Some(ids) = self.ids.as_deref() else {
            return Ok(None);
        };
        ids.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s).map_err(|_| {
                    BackofficeError::Validation(ValidationError::InvalidUuid {
                        value: s.to_string(),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A parsed sort expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(expr: &str) -> Result<Self, BackofficeError> {
        let invalid = |message: &str| {
            BackofficeError::Validation(ValidationError::InvalidQuery {
                parameter: "sort".to_string(),
                message: message.to_string(),
            })
        };

        let (field, direction) = match expr.split_once(':') {
            Some((field, "asc")) => (field, SortDirection::Asc),
            Some((field, "desc")) => (field, SortDirection::Desc),
            Some(_) => return Err(invalid("direction must be 'asc' or 'desc'")),
            None => (expr, SortDirection::Asc),
        };

        if field.trim().is_empty() {
            return Err(invalid("missing field name"));
        }

        Ok(Self {
            field: field.trim().to_string(),
            direction,
        })
    }
}

/// Tri-state column header sort
///
/// Clicking the same column cycles ascending → descending → unsorted;
/// clicking another column starts over at ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    current: Option<SortSpec>,
}

impl SortState {
    pub fn current(&self) -> Option<&SortSpec> {
        self.current.as_ref()
    }

    pub fn toggle(&mut self, column: &str) {
        self.current = match self.current.take() {
            Some(spec) if spec.field == column => match spec.direction {
                SortDirection::Asc => Some(SortSpec {
                    field: spec.field,
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec {
                field: column.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }

    /// The `sort` query parameter for the current state
    pub fn to_query(&self) -> Option<String> {
        self.current.as_ref().map(|spec| match spec.direction {
            SortDirection::Asc => format!("{}:asc", spec.field),
            SortDirection::Desc => format!("{}:desc", spec.field),
        })
    }
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1, clamped to the last page)
    pub page: usize,
    pub page_size: usize,
    /// Total number of items after search and filters
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Compute pagination for a requested page
    ///
    /// A page past the end is clamped to the last page; an empty result is
    /// page 1 of 0.
    pub fn new(requested_page: usize, page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        let page = requested_page.clamp(1, total_pages.max(1));

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset of the first item of the page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// Apply search, status filter, id selection and sort
pub fn filter_and_sort<T: Record>(
    mut records: Vec<T>,
    query: &ListQuery,
) -> Result<Vec<T>, BackofficeError> {
    if let Some(ids) = query.id_selection()? {
        records.retain(|r| ids.contains(&r.id()));
    }

    if let Some(status) = query.status {
        records.retain(|r| r.status() == status);
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let folded = fold(term);
        // "529.982" should find the stored document "52998224725"
        let digit_term = is_masked_number(term)
            .then(|| term.chars().filter(char::is_ascii_digit).collect::<String>());

        records.retain(|r| {
            T::search_fields().iter().any(|field| {
                r.field_value(field).is_some_and(|value| {
                    value.contains(&folded)
                        || digit_term.as_deref().is_some_and(|d| value.contains(d))
                })
            })
        });
    }

    if let Some(spec) = query.sort_spec()? {
        // Stable sort; unknown fields compare equal and keep store order
        // Missing values go last in both directions
        records.sort_by(|a, b| {
            let present = |r: &T| {
                r.field_value(&spec.field)
                    .filter(|v| !matches!(v, FieldValue::Null))
            };
            match (present(a), present(b)) {
                (Some(x), Some(y)) => match spec.direction {
                    SortDirection::Asc => x.compare(&y),
                    SortDirection::Desc => y.compare(&x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    } else {
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
    }

    Ok(records)
}

/// Digits with only mask punctuation around them, such as "529.982" or "(11) 98765"
fn is_masked_number(term: &str) -> bool {
    term.chars().any(|c| c.is_ascii_digit())
        && term
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | '(' | ')' | ' '))
}

/// Slice one page out of an already filtered list
pub fn paginate<T>(
    records: Vec<T>,
    page: usize,
    page_size: usize,
) -> PaginatedResponse<T> {
    let pagination = PaginationMeta::new(page, page_size, records.len());
    let data = records
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.page_size)
        .collect();

    PaginatedResponse { data, pagination }
}
