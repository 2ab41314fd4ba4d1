use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection, SqlParam};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::Null => Ok(vec![]),
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["createdAt desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => return Err(FilterError::InvalidOrder(format!("expected string, got {}", other))),
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "createdAt": "desc", "name": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let dir = v.as_str().unwrap_or("asc");
                    out.push(FilterOrderInfo { column: k.clone(), sort: Self::parse_direction(dir)? });
                }
                Ok(out)
            }
            other => Err(FilterError::InvalidOrder(format!("unsupported order spec: {}", other))),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let sort = Self::parse_direction(it.next().unwrap_or("asc"))?;
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        match dir.to_ascii_lowercase().as_str() {
            "asc" | "1" => Ok(SortDirection::Asc),
            "desc" | "-1" => Ok(SortDirection::Desc),
            other => Err(FilterError::InvalidOrder(format!("unknown direction: {}", other))),
        }
    }

    /// ORDER BY terms for the `doc` column; missing fields sort last in both directions
    pub fn generate(infos: &[FilterOrderInfo], starting_param_index: usize) -> (Vec<String>, Vec<SqlParam>) {
        let mut params = Vec::with_capacity(infos.len());
        let terms = infos
            .iter()
            .enumerate()
            .map(|(i, info)| {
                params.push(SqlParam::Text(info.column.clone()));
                format!("doc -> ${} {} NULLS LAST", starting_param_index + i + 1, info.sort.to_sql())
            })
            .collect();
        (terms, params)
    }

    /// In-memory counterpart of `generate`
    pub fn compare(infos: &[FilterOrderInfo], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        for info in infos {
            let ordering = match (a.get(&info.column), b.get(&info.column)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let natural = compare_json(x, y);
                    match info.sort {
                        SortDirection::Asc => natural,
                        SortDirection::Desc => natural.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

// Same type ranking as PostgreSQL jsonb: null < string < number < boolean < array < object
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_spec_shapes() {
        let expected = vec![FilterOrderInfo { column: "createdAt".to_string(), sort: SortDirection::Desc }];
        assert_eq!(FilterOrder::validate_and_parse(&json!("createdAt desc")).unwrap(), expected);
        assert_eq!(FilterOrder::validate_and_parse(&json!(["createdAt DESC"])).unwrap(), expected);
        assert_eq!(FilterOrder::validate_and_parse(&json!({"createdAt": "desc"})).unwrap(), expected);
        assert!(FilterOrder::validate_and_parse(&json!("createdAt sideways")).is_err());
    }

    #[test]
    fn generates_terms() {
        let infos = FilterOrder::validate_and_parse(&json!("createdAt desc, name")).unwrap();
        let (terms, params) = FilterOrder::generate(&infos, 2);
        assert_eq!(terms, vec!["doc -> $3 DESC NULLS LAST", "doc -> $4 ASC NULLS LAST"]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn compare_puts_missing_last() {
        let infos = FilterOrder::validate_and_parse(&json!("createdAt desc")).unwrap();
        let newer = json!({"createdAt": "2026-10-18T10:00:00.000Z"});
        let older = json!({"createdAt": "2026-10-17T10:00:00.000Z"});
        let missing = json!({});
        let (newer, older, missing) = (
            newer.as_object().unwrap(),
            older.as_object().unwrap(),
            missing.as_object().unwrap(),
        );
        assert_eq!(FilterOrder::compare(&infos, newer, older), Ordering::Less);
        assert_eq!(FilterOrder::compare(&infos, missing, older), Ordering::Greater);
        assert_eq!(FilterOrder::compare(&infos, older, missing), Ordering::Less);
    }
}
