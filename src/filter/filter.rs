use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterData, FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, SqlResult};

/// A parsed WHERE + ORDER pair, usable by every store backend
#[derive(Debug, Clone)]
pub struct Filter {
    where_condition: Condition,
    order_data: Vec<FilterOrderInfo>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            where_condition: Condition::And(vec![]),
            order_data: vec![],
        }
    }
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        filter.assign(data)?;
        Ok(filter)
    }

    /// Exact match on a single field; `value` is never read as an operator object
    pub fn by_field(field: &str, value: Value) -> Self {
        Self {
            where_condition: Condition::Field(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value,
            }),
            order_data: vec![],
        }
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        self.where_condition = FilterWhere::parse(&conditions)?;
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        FilterWhere::matches(&self.where_condition, doc)
    }

    /// Direction used to break ties on insertion order
    pub fn tie_break(&self) -> SortDirection {
        self.order_data.first().map(|o| o.sort).unwrap_or(SortDirection::Asc)
    }

    /// Compare two documents; `seq_a`/`seq_b` are their insertion positions
    pub fn compare(&self, a: (usize, &Map<String, Value>), b: (usize, &Map<String, Value>)) -> Ordering {
        let ordering = FilterOrder::compare(&self.order_data, a.1, b.1);
        if ordering != Ordering::Equal {
            return ordering;
        }
        match self.tie_break() {
            SortDirection::Asc => a.0.cmp(&b.0),
            SortDirection::Desc => b.0.cmp(&a.0),
        }
    }

    /// SELECT over a collection table (`seq`, `id`, `doc` columns)
    pub fn to_sql(&self, collection: &str, limit: Option<u32>) -> Result<SqlResult, FilterError> {
        Self::validate_collection_name(collection)?;

        let (where_clause, mut params) = FilterWhere::generate(&self.where_condition, 0);
        let (mut order_terms, order_params) = FilterOrder::generate(&self.order_data, params.len());
        params.extend(order_params);
        order_terms.push(format!("seq {}", self.tie_break().to_sql()));

        let query = [
            "SELECT doc".to_string(),
            format!("FROM \"{}\"", collection),
            format!("WHERE {}", where_clause),
            format!("ORDER BY {}", order_terms.join(", ")),
            limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn validate_collection_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidCollection(format!("Invalid collection name format: {}", name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::SqlParam;
    use serde_json::json;

    #[test]
    fn full_select_sql() {
        let filter = Filter::from_data(FilterData {
            where_clause: Some(json!({"status": "approved"})),
            order: Some(json!("createdAt desc")),
        })
        .unwrap();
        let sql = filter.to_sql("teachers", None).unwrap();
        assert_eq!(
            sql.query,
            "SELECT doc FROM \"teachers\" WHERE doc -> $1 = $2 ORDER BY doc -> $3 DESC NULLS LAST, seq DESC"
        );
        assert_eq!(sql.params[2], SqlParam::Text("createdAt".to_string()));
    }

    #[test]
    fn unfiltered_select_uses_insertion_order() {
        let sql = Filter::new().to_sql("users", Some(1)).unwrap();
        assert_eq!(sql.query, "SELECT doc FROM \"users\" WHERE TRUE ORDER BY seq ASC LIMIT 1");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn rejects_bad_collection_names() {
        assert!(Filter::validate_collection_name("examHeroHighlights").is_ok());
        assert!(Filter::validate_collection_name("").is_err());
        assert!(Filter::validate_collection_name("1users").is_err());
        assert!(Filter::validate_collection_name("users\"; DROP").is_err());
    }

    #[test]
    fn by_field_matches_exactly() {
        let filter = Filter::by_field("email", json!("a@b.c"));
        assert!(filter.matches(json!({"email": "a@b.c"}).as_object().unwrap()));
        assert!(!filter.matches(json!({"email": "A@b.c"}).as_object().unwrap()));

        let sneaky = Filter::by_field("email", json!({"$ne": null}));
        assert!(!sneaky.matches(json!({"email": "a@b.c"}).as_object().unwrap()));
    }
}
