//! Validation of positional source rows into [`Initiative`] records.
//!
//! The source database publishes every initiative as a JSON array whose
//! positions have a fixed meaning. A batch is validated as a whole: the first
//! row that violates a field constraint aborts it, partial results are never
//! returned.

use crate::error::{Error, Result};
use crate::types::Initiative;
use serde_json::Value;
use std::collections::HashSet;

/// Column positions within a source row
pub mod column {
    pub const ID: usize = 1;
    pub const REGION: usize = 2;
    pub const NAME: usize = 3;
    pub const TYPE: usize = 4;
    pub const RESULT: usize = 5;
    pub const YEAR: usize = 6;
    pub const PROVINCE: usize = 8;
    pub const TOPIC: usize = 9;
    pub const STATUS: usize = 10;
}

/// Earliest accepted year
pub const MIN_YEAR: i32 = 1900;

/// Validate all rows, preserving order. Ids must be unique across the batch.
pub fn validate_rows(rows: &[Value]) -> Result<Vec<Initiative>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut initiatives = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let initiative = validate_row(index, row)?;
        if !seen.insert(initiative.id) {
            return Err(Error::DuplicateId {
                row: index,
                id: initiative.id,
            });
        }
        initiatives.push(initiative);
    }

    Ok(initiatives)
}

/// Validate a single row. `index` is only used for error reporting.
pub fn validate_row(index: usize, row: &Value) -> Result<Initiative> {
    let fields = row.as_array().ok_or_else(|| Error::InvalidRecord {
        row: index,
        field: "row",
        reason: format!("expected an array, got {}", type_name(row)),
    })?;
    let row = Row { index, fields };

    Ok(Initiative {
        id: row.integer(column::ID, "id")?,
        region: row.string(column::REGION, "region")?,
        name: row.optional_string(column::NAME, "name")?,
        topic: row.integer(column::TOPIC, "topic")?,
        kind: row.string(column::TYPE, "type")?,
        year: row.year(column::YEAR)?,
        result: row.string(column::RESULT, "result")?,
        status: row.optional_string(column::STATUS, "status")?,
        province: row.optional_string(column::PROVINCE, "province")?,
    })
}

struct Row<'a> {
    index: usize,
    fields: &'a [Value],
}

impl Row<'_> {
    fn get(&self, position: usize) -> &Value {
        self.fields.get(position).unwrap_or(&Value::Null)
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> Error {
        Error::InvalidRecord {
            row: self.index,
            field,
            reason: reason.into(),
        }
    }

    fn integer(&self, position: usize, field: &'static str) -> Result<i64> {
        let value = self.get(position);
        as_integer(value)
            .ok_or_else(|| self.invalid(field, format!("expected an integer, got {}", value)))
    }

    fn string(&self, position: usize, field: &'static str) -> Result<String> {
        match self.get(position) {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.invalid(field, format!("expected a string, got {}", type_name(other)))),
        }
    }

    fn optional_string(&self, position: usize, field: &'static str) -> Result<Option<String>> {
        match self.get(position) {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(self.invalid(
                field,
                format!("expected a string or null, got {}", type_name(other)),
            )),
        }
    }

    /// Years arrive either as numbers or as numeric strings.
    fn year(&self, position: usize) -> Result<i32> {
        let value = self.get(position);
        let year = match value {
            Value::Null => return Err(self.invalid("year", "missing")),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            Value::Number(_) => as_integer(value).and_then(|y| i32::try_from(y).ok()),
            _ => None,
        }
        .ok_or_else(|| Error::InvalidYear {
            row: self.index,
            value: value.to_string(),
        })?;

        if year < MIN_YEAR {
            return Err(self.invalid("year", format!("{} is before {}", year, MIN_YEAR)));
        }
        Ok(year)
    }
}

/// Integral JSON numbers, including floats without a fractional part
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, name: Value, result: &str, year: Value, status: Value) -> Value {
        json!([
            "2023-04-01",
            id,
            "Bayern",
            name,
            "Bürgerbegehren",
            result,
            year,
            null,
            "Oberbayern",
            3,
            status
        ])
    }

    #[test]
    fn test_validate_row_maps_columns() {
        let raw = row(
            7,
            json!("Für den Erhalt des Parks"),
            "BE im Sinne des Begehrens",
            json!(2019),
            json!("Erledigt"),
        );
        let initiative = validate_row(0, &raw).unwrap();
        assert_eq!(initiative.id, 7);
        assert_eq!(initiative.region, "Bayern");
        assert_eq!(initiative.name.as_deref(), Some("Für den Erhalt des Parks"));
        assert_eq!(initiative.kind, "Bürgerbegehren");
        assert_eq!(initiative.result, "BE im Sinne des Begehrens");
        assert_eq!(initiative.year, 2019);
        assert_eq!(initiative.province.as_deref(), Some("Oberbayern"));
        assert_eq!(initiative.topic, 3);
        assert_eq!(initiative.status.as_deref(), Some("Erledigt"));
    }

    #[test]
    fn test_missing_name_and_status() {
        let raw = row(1, Value::Null, "Unzulässig", json!(2001), Value::Null);
        let initiative = validate_row(0, &raw).unwrap();
        assert!(initiative.name.is_none());
        assert_eq!(initiative.display_name(), crate::types::NO_NAME);
        assert!(initiative.status.is_none());
    }

    #[test]
    fn test_short_row_treats_trailing_columns_as_null() {
        let raw = json!([null, 4, "Hessen", "Neubau Schule", "Ratsbegehren", "Unzulässig", 1999, null, null, 2]);
        let initiative = validate_row(0, &raw).unwrap();
        assert!(initiative.status.is_none());
    }

    #[test]
    fn test_year_coercion() {
        let ok = row(1, json!("x"), "Unzulässig", json!("1900"), Value::Null);
        assert_eq!(validate_row(0, &ok).unwrap().year, 1900);

        let float = row(1, json!("x"), "Unzulässig", json!(1987.0), Value::Null);
        assert_eq!(validate_row(0, &float).unwrap().year, 1987);

        let text = row(1, json!("x"), "Unzulässig", json!("abc"), Value::Null);
        assert!(matches!(validate_row(0, &text), Err(Error::InvalidYear { .. })));

        let early = row(1, json!("x"), "Unzulässig", json!(1899), Value::Null);
        assert!(matches!(
            validate_row(0, &early),
            Err(Error::InvalidRecord { field: "year", .. })
        ));
    }

    #[test]
    fn test_batch_fails_on_first_invalid_row() {
        let rows = vec![
            row(1, json!("a"), "Unzulässig", json!(2001), Value::Null),
            row(2, json!("b"), "Unzulässig", json!("abc"), Value::Null),
            row(3, json!("c"), "Unzulässig", json!(1800), Value::Null),
        ];
        let err = validate_rows(&rows).unwrap_err();
        assert!(matches!(err, Error::InvalidYear { row: 1, .. }));
        assert!(err.is_record_error());
    }

    #[test]
    fn test_non_numeric_id_and_topic() {
        let mut raw = row(1, json!("a"), "Unzulässig", json!(2001), Value::Null);
        raw[1] = json!("1");
        assert!(matches!(
            validate_row(0, &raw),
            Err(Error::InvalidRecord { field: "id", .. })
        ));

        let mut raw = row(1, json!("a"), "Unzulässig", json!(2001), Value::Null);
        raw[9] = Value::Null;
        assert!(matches!(
            validate_row(0, &raw),
            Err(Error::InvalidRecord { field: "topic", .. })
        ));
    }

    #[test]
    fn test_missing_required_string() {
        let mut raw = row(1, json!("a"), "Unzulässig", json!(2001), Value::Null);
        raw[2] = Value::Null;
        assert!(matches!(
            validate_row(0, &raw),
            Err(Error::InvalidRecord { field: "region", .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let rows = vec![
            row(5, json!("a"), "Unzulässig", json!(2001), Value::Null),
            row(5, json!("b"), "Unzulässig", json!(2002), Value::Null),
        ];
        assert!(matches!(
            validate_rows(&rows),
            Err(Error::DuplicateId { row: 1, id: 5 })
        ));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let rows = vec![
            row(1, json!("a"), "Unzulässig", json!("2001"), Value::Null),
            row(2, Value::Null, "BE im Sinne des Begehrens", json!(2002), json!("ok")),
        ];
        assert_eq!(validate_rows(&rows).unwrap(), validate_rows(&rows).unwrap());
    }

    #[test]
    fn test_row_must_be_array() {
        assert!(matches!(
            validate_row(0, &json!({"id": 1})),
            Err(Error::InvalidRecord { field: "row", .. })
        ));
    }
}
