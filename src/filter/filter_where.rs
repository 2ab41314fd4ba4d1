use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{Condition, FilterOp, FilterWhereInfo, SqlParam};

/// Compiles WHERE trees against the `doc` JSONB column of a collection table
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Parse a Mongo-style JSON clause into a condition tree
    pub fn parse(where_data: &Value) -> Result<Condition, FilterError> {
        match where_data {
            Value::Null => Ok(Condition::And(vec![])),
            Value::Object(obj) => {
                let mut conditions = Vec::new();
                for (key, value) in obj {
                    if key.starts_with('$') {
                        conditions.push(Self::parse_logical_operator(key, value)?);
                    } else {
                        conditions.extend(Self::parse_field_condition(key, value)?);
                    }
                }
                if conditions.len() == 1 {
                    Ok(conditions.remove(0))
                } else {
                    Ok(Condition::And(conditions))
                }
            }
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<Condition, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let parts = arr.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" { Condition::And(parts) } else { Condition::Or(parts) })
            }
            "$not" => {
                if !value.is_object() {
                    return Err(FilterError::InvalidOperatorData("$not requires object".to_string()));
                }
                Ok(Condition::Not(Box::new(Self::parse(value)?)))
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<Condition>, FilterError> {
        let operators = match value {
            Value::Object(obj) if Self::is_operator_object(obj)? => obj,
            // Implicit equality: { field: value }
            _ => {
                return Ok(vec![Condition::Field(FilterWhereInfo {
                    column: field.to_string(),
                    operator: FilterOp::Eq,
                    data: value.clone(),
                })])
            }
        };

        let mut conditions = Vec::with_capacity(operators.len());
        for (op_key, op_val) in operators {
            let operator =
                FilterOp::from_key(op_key).ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
            Self::validate_operator_data(operator, op_val)?;
            conditions.push(Condition::Field(FilterWhereInfo {
                column: field.to_string(),
                operator,
                data: op_val.clone(),
            }));
        }
        Ok(conditions)
    }

    fn is_operator_object(obj: &Map<String, Value>) -> Result<bool, FilterError> {
        let operator_keys = obj.keys().filter(|k| k.starts_with('$')).count();
        if operator_keys == 0 {
            return Ok(false);
        }
        if operator_keys != obj.len() {
            return Err(FilterError::InvalidOperatorData(
                "cannot mix operators and plain fields".to_string(),
            ));
        }
        Ok(true)
    }

    fn validate_operator_data(operator: FilterOp, data: &Value) -> Result<(), FilterError> {
        let ok = match operator {
            FilterOp::In => data.is_array(),
            FilterOp::IContains => data.is_string(),
            FilterOp::Exists => data.is_boolean(),
            FilterOp::Eq | FilterOp::Ne => true,
        };
        if ok {
            Ok(())
        } else {
            Err(FilterError::InvalidOperatorData(format!(
                "unexpected data for {:?}: {}",
                operator, data
            )))
        }
    }

    /// Compile a condition to SQL, numbering parameters after `starting_param_index`
    pub fn generate(condition: &Condition, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build_sql(condition);
        (sql, filter_where.param_values)
    }

    fn build_sql(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Field(info) => self.build_sql_condition(info),
            Condition::And(parts) => self.join(parts, " AND ", "TRUE"),
            Condition::Or(parts) => self.join(parts, " OR ", "FALSE"),
            Condition::Not(inner) => format!("NOT ({})", self.build_sql(inner)),
        }
    }

    fn join(&mut self, parts: &[Condition], joiner: &str, empty: &str) -> String {
        if parts.is_empty() {
            return empty.to_string();
        }
        parts
            .iter()
            .map(|c| format!("({})", self.build_sql(c)))
            .collect::<Vec<_>>()
            .join(joiner)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let field = self.param(SqlParam::Text(condition.column.clone()));
        match condition.operator {
            FilterOp::Eq if condition.data.is_null() => {
                format!("(doc -> {f} IS NULL OR doc -> {f} = 'null'::jsonb)", f = field)
            }
            FilterOp::Eq => {
                let value = self.param(SqlParam::Json(condition.data.clone()));
                format!("doc -> {} = {}", field, value)
            }
            FilterOp::Ne if condition.data.is_null() => {
                format!("(doc -> {f} IS NOT NULL AND doc -> {f} <> 'null'::jsonb)", f = field)
            }
            FilterOp::Ne => {
                let value = self.param(SqlParam::Json(condition.data.clone()));
                format!("doc -> {} IS DISTINCT FROM {}", field, value)
            }
            FilterOp::In => {
                let values = condition.data.as_array().cloned().unwrap_or_default();
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let includes_null = values.iter().any(Value::is_null);
                let params: Vec<String> = values
                    .into_iter()
                    .filter(|v| !v.is_null())
                    .map(|v| self.param(SqlParam::Json(v)))
                    .collect();
                let mut parts = Vec::new();
                if !params.is_empty() {
                    parts.push(format!("doc -> {} IN ({})", field, params.join(", ")));
                }
                if includes_null {
                    parts.push(format!("doc -> {f} IS NULL OR doc -> {f} = 'null'::jsonb", f = field));
                }
                format!("({})", parts.join(" OR "))
            }
            FilterOp::IContains => {
                let needle = condition.data.as_str().unwrap_or_default();
                let pattern = self.param(SqlParam::Text(format!("%{}%", escape_like(needle))));
                format!(
                    "(jsonb_typeof(doc -> {f}) = 'string' AND doc ->> {f} ILIKE {p})",
                    f = field,
                    p = pattern
                )
            }
            FilterOp::Exists => {
                if condition.data.as_bool().unwrap_or(true) {
                    format!("jsonb_exists(doc, {})", field)
                } else {
                    format!("NOT jsonb_exists(doc, {})", field)
                }
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Evaluate a condition against an in-memory document
    pub fn matches(condition: &Condition, doc: &Map<String, Value>) -> bool {
        match condition {
            Condition::Field(info) => Self::matches_field(info, doc),
            Condition::And(parts) => parts.iter().all(|c| Self::matches(c, doc)),
            Condition::Or(parts) => parts.iter().any(|c| Self::matches(c, doc)),
            Condition::Not(inner) => !Self::matches(inner, doc),
        }
    }

    fn matches_field(info: &FilterWhereInfo, doc: &Map<String, Value>) -> bool {
        let actual = doc.get(&info.column);
        match info.operator {
            FilterOp::Eq => equals(actual, &info.data),
            FilterOp::Ne => !equals(actual, &info.data),
            FilterOp::In => info
                .data
                .as_array()
                .map(|values| values.iter().any(|v| equals(actual, v)))
                .unwrap_or(false),
            FilterOp::IContains => match (actual.and_then(Value::as_str), info.data.as_str()) {
                (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            FilterOp::Exists => actual.is_some() == info.data.as_bool().unwrap_or(true),
        }
    }
}

// Equality against null also matches a missing field
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) => value == expected,
    }
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
