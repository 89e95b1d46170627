use std::{fs::File, io::Read, path::Path};

use encoding::{
    DecoderTrap, Encoding,
    all::{ISO_8859_1, UTF_8},
};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProcedureError, ProcedureResult};

/// A row type backed by one of the exported CSV tables.
pub trait TableRecord: DeserializeOwned {
    const TABLE: &'static str;
    const REQUIRED_COLUMNS: &'static [&'static str];
}

pub fn load_table<T: TableRecord, R: Read>(reader: &mut R) -> ProcedureResult<Vec<T>> {
    let text = read_with_encodings(reader)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let missing = T::REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect_vec();
    if !missing.is_empty() {
        return Err(ProcedureError::MissingColumns {
            table: T::TABLE.to_string(),
            missing,
        });
    }

    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()?;
    debug!(table = T::TABLE, rows = rows.len(), "Loaded table");
    Ok(rows)
}

pub fn load_table_file<T: TableRecord, P: AsRef<Path>>(path: P) -> ProcedureResult<Vec<T>> {
    let mut file = File::open(path.as_ref())?;
    load_table(&mut file)
}

pub(crate) fn read_with_encodings<R: Read>(reader: &mut R) -> ProcedureResult<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let utf8_decoded = UTF_8.decode(&buffer, DecoderTrap::Strict);

    match utf8_decoded {
        Ok(text) => Ok(text),
        Err(e) => ISO_8859_1
            .decode(&buffer, DecoderTrap::Strict)
            .map_err(|_| ProcedureError::EncodingError(e.to_string())),
    }
}
