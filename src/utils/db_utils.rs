use crate::error::ApiError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value decoded from a JSON patch body.
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Null,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a dynamic UPDATE from a JSON object, patching only the supplied
/// fields. Column names are checked against `allowed` so a payload can never
/// reach past the intended table surface.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: &str,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::Validation("Payload must be a JSON object".to_string()))?;

    if obj.is_empty() {
        return Err(ApiError::Validation(
            "No fields provided for update".to_string(),
        ));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::Validation(format!("Unknown field: {key}")));
        }
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
                    values.push(SqlValue::Time(t));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(ApiError::Validation(
                    "Unsupported JSON value type".to_string(),
                ));
            }
        }
    }

    values.push(SqlValue::String(id_value.to_string()));

    Ok(SqlUpdate { sql, values })
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GEOFENCE_COLUMNS: &[&str] = &["name", "radius", "active"];

    #[test]
    fn builds_set_clause_for_supplied_fields_only() {
        let payload = json!({ "name": "HQ", "radius": 150.0 });
        let update =
            build_update_sql("geofences", &payload, GEOFENCE_COLUMNS, "id", "abc").unwrap();
        assert!(update.sql.starts_with("UPDATE geofences SET "));
        assert!(update.sql.contains("name = ?"));
        assert!(update.sql.contains("radius = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        // two fields plus the id bind
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn rejects_unknown_columns() {
        let payload = json!({ "role_id": 1 });
        let err =
            build_update_sql("geofences", &payload, GEOFENCE_COLUMNS, "id", "abc").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = json!({});
        assert!(build_update_sql("geofences", &payload, GEOFENCE_COLUMNS, "id", "abc").is_err());
    }

    #[test]
    fn parses_dates_and_times_from_strings() {
        let payload = json!({ "name": "09:15:00" });
        let update =
            build_update_sql("geofences", &payload, GEOFENCE_COLUMNS, "id", "abc").unwrap();
        assert!(matches!(update.values[0], SqlValue::Time(_)));
    }
}
