use crate::error::ParseError;

/// Field delimiter of the input format
pub const FIELD_DELIMITER: char = ',';

/// One parsed input line: a group label followed by its numeric readings
/// Never mutated after creation
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub label: String,
    pub readings: Vec<f64>,
}

/// Stage-1 aggregation key: (group label, dimension index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompoundKey {
    pub label: String,
    pub dimension: usize,
}

/// Parses one line of input into a record
///
/// The first field is the group label, every remaining field must convert
/// to a numeric reading. Any failure rejects the whole line - a record is
/// never partially accepted.
///
/// `expected_dims` enforces a fixed vector length when set; when `None`,
/// any non-zero number of readings is accepted.
pub fn parse_record(line: &str, expected_dims: Option<usize>) -> Result<RawRecord, ParseError> {
    let mut fields = line.trim().split(FIELD_DELIMITER);

    let label = match fields.next() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => return Err(ParseError::TooFewFields),
    };

    let mut readings = Vec::new();
    for (position, field) in fields.enumerate() {
        let value = field
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::BadReading {
                position,
                value: field.to_string(),
            })?;
        readings.push(value);
    }

    if readings.is_empty() {
        return Err(ParseError::TooFewFields);
    }

    if let Some(expected) = expected_dims {
        if readings.len() != expected {
            return Err(ParseError::WrongFieldCount {
                expected,
                found: readings.len(),
            });
        }
    }

    Ok(RawRecord { label, readings })
}
