use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// Reads the JSON document at `path` into `T`.
///
/// A missing or unreadable file becomes `Error::IoError`; malformed JSON, or JSON that does
/// not fit `T`, becomes `Error::DeserializationError`.
pub fn parse_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let parsed = serde_json::from_reader(BufReader::new(file))?;

    log::debug!("Parsed '{}' as {}.", path.display(), std::any::type_name::<T>());
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Endpoint {
        name: String,
        speed: u64,
    }

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Temp file can be created");
        file.write_all(contents.as_bytes()).expect("Temp file can be written");
        file
    }

    #[test]
    fn test_parses_into_the_requested_type() {
        let file = write_json(r#"{ "name": "FC", "speed": 100000000 }"#);
        let endpoint: Endpoint = parse_json_file(file.path()).unwrap();

        assert_eq!(endpoint, Endpoint { name: "FC".to_string(), speed: 100_000_000 });
    }

    #[test]
    fn test_shape_mismatch_is_a_deserialization_error() {
        let file = write_json(r#"{ "name": "FC", "speed": "fast" }"#);
        assert!(matches!(parse_json_file::<Endpoint>(file.path()), Err(Error::DeserializationError(_))));
    }
}
