use serde::Serialize;
use thiserror::Error;

/// Rejected filter construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("filter field name must not be empty")]
    EmptyField,
    #[error("filter value for `{0}` must not be empty")]
    EmptyValue(String),
    #[error("range bound for `{0}` must be a finite number")]
    NonFiniteBound(String),
    #[error("range for `{field}` is inverted ({min} > {max})")]
    InvertedRange { field: String, min: f64, max: f64 },
    #[error("range for `{0}` needs at least one bound")]
    UnboundedRange(String),
}

/// A single typed record filter, validated when built
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals { field: String, value: String },
    /// Case-insensitive substring match, evaluated by the gateway
    Contains { field: String, value: String },
    /// Inclusive bounds; a missing side is open
    Range {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl Filter {
    pub fn equals(field: &str, value: impl ToString) -> Result<Self, QueryError> {
        let field = checked_field(field)?;
        let value = value.to_string();
        if value.is_empty() {
            return Err(QueryError::EmptyValue(field));
        }
        Ok(Self::Equals { field, value })
    }

    pub fn contains(field: &str, value: &str) -> Result<Self, QueryError> {
        let field = checked_field(field)?;
        if value.trim().is_empty() {
            return Err(QueryError::EmptyValue(field));
        }
        Ok(Self::Contains {
            field,
            value: value.to_string(),
        })
    }

    pub fn range(field: &str, min: Option<f64>, max: Option<f64>) -> Result<Self, QueryError> {
        let field = checked_field(field)?;
        if min.is_none() && max.is_none() {
            return Err(QueryError::UnboundedRange(field));
        }
        if min.into_iter().chain(max).any(|b| !b.is_finite()) {
            return Err(QueryError::NonFiniteBound(field));
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(QueryError::InvertedRange { field, min, max });
            }
        }
        Ok(Self::Range { field, min, max })
    }

    pub fn at_least(field: &str, min: f64) -> Result<Self, QueryError> {
        Self::range(field, Some(min), None)
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::Contains { field, .. } | Self::Range { field, .. } => {
                field
            }
        }
    }

    /// Lower the filter into gateway conditions. A two-sided range becomes
    /// two conditions on the same field.
    fn conditions(&self) -> Vec<Condition> {
        match self {
            Self::Equals { field, value } => {
                vec![Condition::new(field, Operator::EqualTo, value.clone())]
            }
            Self::Contains { field, value } => {
                vec![Condition::new(field, Operator::Contains, value.clone())]
            }
            Self::Range { field, min, max } => {
                let mut out = Vec::with_capacity(2);
                if let Some(min) = min {
                    out.push(Condition::new(field, Operator::GreaterThanOrEqualTo, min.to_string()));
                }
                if let Some(max) = max {
                    out.push(Condition::new(field, Operator::LessThanOrEqualTo, max.to_string()));
                }
                out
            }
        }
    }
}

fn checked_field(field: &str) -> Result<String, QueryError> {
    if field.trim().is_empty() {
        return Err(QueryError::EmptyField);
    }
    Ok(field.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    EqualTo,
    Contains,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    field: String,
    operator: Operator,
    values: Vec<String>,
}

impl Condition {
    fn new(field: &str, operator: Operator, value: String) -> Self {
        Self {
            field: field.to_string(),
            operator,
            values: vec![value],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

/// Record query: projection, AND-ed filters, one OR group, ordering, paging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fields: Vec<String>,
    filters: Vec<Filter>,
    any_of: Vec<Filter>,
    order_by: Vec<OrderBy>,
    paging: Option<Paging>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Match records satisfying at least one of `filters`
    pub fn any_of(mut self, filters: Vec<Filter>) -> Self {
        self.any_of = filters;
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.paging = Some(Paging { limit, offset });
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn any_of_filters(&self) -> &[Filter] {
        &self.any_of
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    /// Wire shape expected by the record gateway's fetch endpoint
    pub fn to_params(&self) -> FetchParams {
        let where_clauses = self
            .filters
            .iter()
            .flat_map(Filter::conditions)
            .map(|c| WhereClause {
                field_name: c.field,
                operator: c.operator,
                values: c.values,
            })
            .collect();

        let where_groups = if self.any_of.is_empty() {
            Vec::new()
        } else {
            let conditions = self
                .any_of
                .iter()
                .flat_map(Filter::conditions)
                .map(|c| GroupCondition {
                    field_name: c.field,
                    operator: c.operator,
                    values: c.values,
                })
                .collect();
            vec![WhereGroup {
                operator: "OR",
                sub_groups: vec![SubGroup {
                    conditions,
                    operator: "OR",
                }],
            }]
        };

        FetchParams {
            fields: field_specs(&self.fields),
            where_clauses,
            where_groups,
            order_by: self
                .order_by
                .iter()
                .map(|o| OrderClause {
                    field_name: o.field.clone(),
                    sorttype: o.direction,
                })
                .collect(),
            paging_info: self.paging,
        }
    }
}

pub fn field_specs<S: AsRef<str>>(fields: &[S]) -> Vec<FieldSpec> {
    fields
        .iter()
        .map(|f| FieldSpec {
            field: FieldName {
                name: f.as_ref().to_string(),
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchParams {
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<WhereClause>,
    #[serde(rename = "whereGroups", skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderClause>,
    #[serde(rename = "pagingInfo", skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<Paging>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhereClause {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCondition {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereGroup {
    pub operator: &'static str,
    pub sub_groups: Vec<SubGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubGroup {
    pub conditions: Vec<GroupCondition>,
    pub operator: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderClause {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub sorttype: SortDirection,
}
