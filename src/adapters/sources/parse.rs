//! Parsers for upstream files
//!
//! CSV datasets become [`Table`]s with missing cells as `None`. Organisation
//! units are read from a plain JSON array, an `{"organisationUnits": [...]}`
//! export, or a GeoJSON `FeatureCollection` whose feature properties carry
//! `code`, `name`, `shortName`, `parent` and optionally `id`.

use crate::domain::{DictionaryEntry, OrgUnitSource, Result, SeedError, Table, UserRecord};
use csv::{ReaderBuilder, Trim};
use serde_json::Value;

/// Parses a CSV file into a wide table
///
/// Cells equal to one of `na_values` after trimming are missing. Rows shorter
/// than the header are padded with missing cells.
pub fn parse_table(bytes: &[u8], na_values: &[String]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|cell| {
                if na_values.iter().any(|na| na == cell) {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

/// Parses the data dictionary
///
/// Rows without a code are skipped. A missing definition falls back to the
/// code.
pub fn parse_dictionary(
    bytes: &[u8],
    code_column: &str,
    definition_column: &str,
    dataset_column: Option<&str>,
) -> Result<Vec<DictionaryEntry>> {
    let table = parse_table(bytes, &[String::new()])?;
    let code_idx = table.column_index(code_column)?;
    let definition_idx = table.column_index(definition_column)?;
    let dataset_idx = dataset_column
        .map(|c| table.column_index(c))
        .transpose()?;

    let entries = table
        .rows()
        .iter()
        .filter_map(|row| {
            let code = row[code_idx].clone()?;
            Some(DictionaryEntry {
                definition: row[definition_idx].clone().unwrap_or_else(|| code.clone()),
                dataset: dataset_idx.and_then(|i| row[i].clone()),
                code,
            })
        })
        .collect();

    Ok(entries)
}

/// Parses the user roster CSV
pub fn parse_users(bytes: &[u8]) -> Result<Vec<UserRecord>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);
    let users = reader
        .deserialize::<UserRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Parses organisation units and fills default names
pub fn parse_org_units(bytes: &[u8]) -> Result<Vec<OrgUnitSource>> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| SeedError::Source(format!("organisation units are not JSON: {e}")))?;

    let objects: Vec<Value> = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(Value::Array(features)) = map.remove("features") {
                features.into_iter().map(feature_to_object).collect()
            } else if let Some(Value::Array(units)) = map.remove("organisationUnits") {
                units
            } else {
                return Err(SeedError::Source(
                    "organisation units must be an array, an organisationUnits export or a GeoJSON FeatureCollection"
                        .to_string(),
                ));
            }
        }
        _ => {
            return Err(SeedError::Source(
                "organisation units must be a JSON array or object".to_string(),
            ))
        }
    };

    objects
        .into_iter()
        .enumerate()
        .map(|(idx, object)| {
            let mut unit: OrgUnitSource = serde_json::from_value(object).map_err(|e| {
                SeedError::Source(format!("organisation unit {idx}: {e}"))
            })?;
            unit.fill_defaults();
            Ok(unit)
        })
        .collect()
}

/// Flattens a GeoJSON feature into its properties plus `geometry`
fn feature_to_object(feature: Value) -> Value {
    let mut feature = match feature {
        Value::Object(map) => map,
        other => return other,
    };

    let mut object = match feature.remove("properties") {
        Some(Value::Object(properties)) => properties,
        _ => serde_json::Map::new(),
    };

    if let Some(geometry) = feature.remove("geometry") {
        if !geometry.is_null() {
            object.insert("geometry".to_string(), geometry);
        }
    }
    if !object.contains_key("id") {
        if let Some(Value::String(id)) = feature.remove("id") {
            object.insert("id".to_string(), Value::String(id));
        }
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn na() -> Vec<String> {
        vec!["NA".to_string(), String::new()]
    }

    #[test]
    fn test_parse_table_na_markers() {
        let csv = b"country,iso3,year,e_inc_num\nSierra Leone,SLE,2015,NA\nGhana,GHA,2015, 44000 \n";
        let table = parse_table(csv, &na()).unwrap();

        assert_eq!(table.columns(), &["country", "iso3", "year", "e_inc_num"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][3], None);
        assert_eq!(table.rows()[1][3], Some("44000".to_string()));
    }

    #[test]
    fn test_parse_table_short_rows_padded() {
        let table = parse_table(b"a,b,c\n1,2\n", &na()).unwrap();
        assert_eq!(
            table.rows()[0],
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );
    }

    #[test]
    fn test_parse_table_quoted_cells() {
        let csv = b"iso3,name\nCIV,\"Cote d'Ivoire, Republic of\"\n";
        let table = parse_table(csv, &na()).unwrap();
        assert_eq!(
            table.rows()[0][1].as_deref(),
            Some("Cote d'Ivoire, Republic of")
        );
    }

    #[test]
    fn test_parse_dictionary() {
        let csv = b"variable_name,dataset,definition\n\
e_inc_num,Estimates,Estimated number of incident cases (all forms)\n\
,Estimates,orphan row\n\
c_newinc,Notifications,\n";
        let entries = parse_dictionary(csv, "variable_name", "definition", Some("dataset")).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "e_inc_num");
        assert_eq!(entries[0].dataset.as_deref(), Some("Estimates"));
        assert_eq!(entries[1].definition, "c_newinc");
    }

    #[test]
    fn test_parse_dictionary_unknown_column() {
        let err = parse_dictionary(b"code,definition\n", "variable_name", "definition", None)
            .unwrap_err();
        assert!(err.to_string().contains("variable_name"));
    }

    #[test]
    fn test_parse_users() {
        let csv = b"firstName,surname,username,email,orgUnit\nAda,Lovelace,alovelace,ada@example.org,SLE\nAlan,Turing,aturing,,\n";
        let users = parse_users(csv).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].org_unit.as_deref(), Some("SLE"));
        assert_eq!(users[1].username, "aturing");
    }

    #[test_case(r#"[{"code":"WLD","name":"World"},{"code":"SLE","parent":"WLD"}]"# ; "plain array")]
    #[test_case(r#"{"organisationUnits":[{"code":"WLD","name":"World"},{"code":"SLE","parent":"WLD"}]}"# ; "metadata export")]
    #[test_case(r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"code":"WLD","name":"World"},"geometry":null},
        {"type":"Feature","properties":{"code":"SLE","parent":"WLD"},"geometry":{"type":"Point","coordinates":[-11.8,8.5]}}
    ]}"# ; "geojson")]
    fn test_parse_org_units_shapes(doc: &str) {
        let units = parse_org_units(doc.as_bytes()).unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].code, "WLD");
        assert_eq!(units[0].short_name, "World");
        assert_eq!(units[1].name, "SLE");
        assert_eq!(units[1].parent.as_deref(), Some("WLD"));
    }

    #[test]
    fn test_geojson_geometry_and_id_kept() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"ImspTQPwCqd","properties":{"code":"SLE"},"geometry":{"type":"Point","coordinates":[0,0]}}
        ]}"#;
        let units = parse_org_units(doc.as_bytes()).unwrap();
        assert_eq!(units[0].id.as_deref(), Some("ImspTQPwCqd"));
        assert_eq!(units[0].geometry.as_ref().unwrap()["type"], "Point");
    }

    #[test_case("42" ; "scalar")]
    #[test_case(r#"{"units":[]}"# ; "unknown object")]
    #[test_case("not json" ; "garbage")]
    fn test_parse_org_units_rejects(doc: &str) {
        assert!(matches!(
            parse_org_units(doc.as_bytes()),
            Err(SeedError::Source(_))
        ));
    }

    #[test]
    fn test_org_unit_without_code_rejected() {
        assert!(parse_org_units(br#"[{"name":"World"}]"#).is_err());
    }
}
