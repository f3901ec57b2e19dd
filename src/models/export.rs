use serde::Serialize;
use serde_json::Value;

#[derive(Debug)]
pub enum ExportError {
    Empty,
    Csv(csv::Error),
    Encode(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Empty => write!(f, "No data available to download"),
            ExportError::Csv(e) => write!(f, "CSV error: {e}"),
            ExportError::Encode(e) => write!(f, "Export encoding error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

/// Render rows as CSV. The header is the field list of the first row, in
/// order; later rows leave missing fields empty and drop extra ones.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let objects = rows
        .iter()
        .map(|r| match serde_json::to_value(r) {
            Ok(Value::Object(obj)) => Ok(obj),
            Ok(_) => Err(ExportError::Encode("row is not an object".to_string())),
            Err(e) => Err(ExportError::Encode(e.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = objects.first() else {
        return Err(ExportError::Empty);
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for obj in &objects {
        let row: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(cell).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))
}

fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_follows_first_row() {
        let rows = vec![
            json!({ "name": "Ada", "service": "Sunday" }),
            json!({ "service": "Friday", "name": "Bola", "extra": 1 }),
        ];
        let csv = to_csv(&rows).unwrap();
        assert_eq!(csv, "name,service\nAda,Sunday\nBola,Friday\n");
    }

    #[test]
    fn quotes_commas_and_quotes() {
        let rows = vec![json!({ "name": "Obi, Ada", "note": "said \"hi\"", "n": null })];
        let csv = to_csv(&rows).unwrap();
        assert_eq!(csv, "name,note,n\n\"Obi, Ada\",\"said \"\"hi\"\"\",\n");
    }

    #[test]
    fn empty_rows_are_an_error() {
        let rows: Vec<Value> = Vec::new();
        assert!(matches!(to_csv(&rows), Err(ExportError::Empty)));
    }

    #[test]
    fn non_object_rows_are_rejected() {
        assert!(matches!(to_csv(&[1, 2]), Err(ExportError::Encode(_))));
    }
}
