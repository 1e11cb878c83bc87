//! Boolean filter for video queries.
//!
//! A [`Query`] is made of `and`, `or` and `not` clauses, each holding leaf
//! [`Condition`]s. Records match when every `and` condition holds, at least
//! one `or` condition holds (if any are given) and no `not` condition holds.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Field equals the single given value
    Eq,
    /// Field equals any of the given values
    In,
    /// Field is greater than the value
    Gt,
    /// Field is greater than or equal to the value
    Gte,
    /// Field is less than the value
    Lt,
    /// Field is less than or equal to the value
    Lte,
}

impl Operation {
    /// Returns `true` if the operation compares against exactly one value.
    pub fn is_single_valued(&self) -> bool {
        !matches!(self, Operation::In)
    }
}

/// Field a [`Condition`] can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryField {
    /// Posting date, `YYYYMMDD`
    CreateDate,
    /// Author's username
    Username,
    /// Two-letter country code of the author's registration
    RegionCode,
    /// Video ID
    VideoId,
    /// Hashtag name without the leading `#`
    HashtagName,
    /// Keyword in the video description
    Keyword,
    /// Music ID
    MusicId,
    /// Effect ID
    EffectId,
    /// Length bucket: `SHORT`, `MID`, `LONG` or `EXTRA_LONG`
    VideoLength,
}

/// A leaf predicate: `field_name <operation> field_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Comparison to apply
    pub operation: Operation,
    /// Field to compare
    pub field_name: QueryField,
    /// Values to compare against
    pub field_values: Vec<String>,
}

impl Condition {
    /// Create a condition from its parts.
    pub fn new<I, S>(operation: Operation, field_name: QueryField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation,
            field_name,
            field_values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `field == value`
    pub fn eq(field_name: QueryField, value: impl Into<String>) -> Self {
        Self::new(Operation::Eq, field_name, [value])
    }

    /// `field IN values`
    pub fn is_in<I, S>(field_name: QueryField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operation::In, field_name, values)
    }

    /// `field > value`
    pub fn gt(field_name: QueryField, value: impl Into<String>) -> Self {
        Self::new(Operation::Gt, field_name, [value])
    }

    /// `field >= value`
    pub fn gte(field_name: QueryField, value: impl Into<String>) -> Self {
        Self::new(Operation::Gte, field_name, [value])
    }

    /// `field < value`
    pub fn lt(field_name: QueryField, value: impl Into<String>) -> Self {
        Self::new(Operation::Lt, field_name, [value])
    }

    /// `field <= value`
    pub fn lte(field_name: QueryField, value: impl Into<String>) -> Self {
        Self::new(Operation::Lte, field_name, [value])
    }

    fn validate(&self) -> Result<()> {
        if self.field_values.is_empty() {
            return Err(Error::InvalidInput(format!(
                "condition on {:?} has no values",
                self.field_name
            )));
        }
        if self.field_values.iter().any(|v| v.trim().is_empty()) {
            return Err(Error::InvalidInput(format!(
                "condition on {:?} has an empty value",
                self.field_name
            )));
        }
        if self.operation.is_single_valued() && self.field_values.len() != 1 {
            return Err(Error::InvalidInput(format!(
                "{:?} on {:?} takes exactly one value, got {}",
                self.operation,
                self.field_name,
                self.field_values.len()
            )));
        }
        Ok(())
    }
}

/// A validated filter, ready to be sent with a video query.
///
/// Use [`QueryBuilder`] to construct one.
///
/// # Example
///
/// ```
/// use tiktok_research::models::{Condition, Query, QueryField};
///
/// let query = Query::builder()
///     .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
///     .and(Condition::eq(QueryField::Keyword, "animal"))
///     .build()
///     .unwrap();
///
/// assert_eq!(query.and_conditions().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QueryBuilder")]
pub struct Query {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    and: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    or: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    not: Vec<Condition>,
}

impl Query {
    /// Start building a query.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Conditions that must all hold.
    pub fn and_conditions(&self) -> &[Condition] {
        &self.and
    }

    /// Conditions of which at least one must hold.
    pub fn or_conditions(&self) -> &[Condition] {
        &self.or
    }

    /// Conditions that must not hold.
    pub fn not_conditions(&self) -> &[Condition] {
        &self.not
    }
}

/// Builder for [`Query`] with validation.
///
/// Deserializing a [`Query`] goes through this builder, so a query read
/// from JSON is validated the same way as one built in code.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct QueryBuilder {
    and: Vec<Condition>,
    or: Vec<Condition>,
    not: Vec<Condition>,
}

impl QueryBuilder {
    /// Create a new query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition that must hold.
    pub fn and(mut self, condition: Condition) -> Self {
        self.and.push(condition);
        self
    }

    /// Add a condition of which at least one must hold.
    pub fn or(mut self, condition: Condition) -> Self {
        self.or.push(condition);
        self
    }

    /// Add a condition that must not hold.
    pub fn not(mut self, condition: Condition) -> Self {
        self.not.push(condition);
        self
    }

    /// Build the query, validating every condition.
    pub fn build(self) -> Result<Query> {
        if self.and.is_empty() && self.or.is_empty() && self.not.is_empty() {
            return Err(Error::InvalidInput(
                "Query must have at least one condition".to_string(),
            ));
        }

        for condition in self.and.iter().chain(&self.or).chain(&self.not) {
            condition.validate()?;
        }

        Ok(Query {
            and: self.and,
            or: self.or,
            not: self.not,
        })
    }
}

impl TryFrom<QueryBuilder> for Query {
    type Error = Error;

    fn try_from(builder: QueryBuilder) -> Result<Self> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_serializes_to_wire_shape() {
        let query = Query::builder()
            .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
            .and(Condition::eq(QueryField::Keyword, "animal"))
            .not(Condition::eq(QueryField::VideoLength, "SHORT"))
            .build()
            .unwrap();

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "and": [
                    {"operation": "IN", "field_name": "region_code", "field_values": ["JP", "US"]},
                    {"operation": "EQ", "field_name": "keyword", "field_values": ["animal"]}
                ],
                "not": [
                    {"operation": "EQ", "field_name": "video_length", "field_values": ["SHORT"]}
                ]
            })
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = Query::builder().build().unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_condition_without_values_rejected() {
        let result = Query::builder()
            .or(Condition::is_in(QueryField::HashtagName, Vec::<String>::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_single_valued_operation_with_many_values_rejected() {
        let result = Query::builder()
            .and(Condition::new(Operation::Gte, QueryField::CreateDate, ["20240101", "20240102"]))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_value_rejected() {
        let result = Query::builder()
            .and(Condition::eq(QueryField::Username, " "))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_query_deserializes_from_json() {
        let query: Query = serde_json::from_value(serde_json::json!({
            "or": [{"operation": "GT", "field_name": "music_id", "field_values": ["10"]}]
        }))
        .unwrap();
        assert_eq!(query.or_conditions()[0].operation, Operation::Gt);
        assert!(query.and_conditions().is_empty());
    }

    #[test]
    fn test_deserialized_query_is_validated() {
        let empty = serde_json::from_value::<Query>(serde_json::json!({}));
        assert!(empty.unwrap_err().to_string().contains("at least one condition"));

        let no_values = serde_json::from_value::<Query>(serde_json::json!({
            "and": [{"operation": "EQ", "field_name": "keyword", "field_values": []}]
        }));
        assert!(no_values.is_err());

        let too_many = serde_json::from_value::<Query>(serde_json::json!({
            "and": [{"operation": "LT", "field_name": "create_date", "field_values": ["20240101", "20240102"]}]
        }));
        assert!(too_many.is_err());
    }
}
