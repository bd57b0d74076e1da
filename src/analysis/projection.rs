use crate::domain::model::RawTable;
use crate::utils::error::{EdaError, Result};

pub const ID_YEAR_FILE: &str = "filter_round_1.csv";
pub const GEO_MASS_FILE: &str = "geo_id_mass.csv";

/// Keep the `id` and `year` columns (either may be absent, not both).
pub fn project_id_year(table: &RawTable) -> Result<RawTable> {
    let keep: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let lower = h.trim().to_lowercase();
            lower == "id" || lower == "year"
        })
        .map(|(i, _)| i)
        .collect();

    if keep.is_empty() {
        return Err(EdaError::missing_columns(&["id", "year"], &table.headers));
    }

    let kept: Vec<&str> = keep.iter().map(|&i| table.headers[i].as_str()).collect();
    tracing::info!("Keeping columns: {:?}", kept);
    Ok(table.project(&keep, None))
}

/// `id`, the first `mass*` column and the first `*geolocation*` column,
/// renamed to `id,mass,GeoLocation`.
pub fn project_geo_mass(table: &RawTable) -> Result<RawTable> {
    let id = table.column_index("id");
    let mass = table.find_column(|h| h.starts_with("mass"));
    let geo = table.find_column(|h| h.contains("geolocation"));

    match (id, mass, geo) {
        (Some(id), Some(mass), Some(geo)) => {
            Ok(table.project(&[id, mass, geo], Some(&["id", "mass", "GeoLocation"])))
        }
        _ => {
            let missing: Vec<&str> = [("id", id), ("mass", mass), ("GeoLocation", geo)]
                .iter()
                .filter(|(_, col)| col.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(EdaError::missing_columns(&missing, &table.headers))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RawTable {
        RawTable::new(
            vec![
                "name".into(),
                "id".into(),
                "mass (g)".into(),
                "year".into(),
                "GeoLocation".into(),
            ],
            vec![vec![
                "Aachen".into(),
                "1".into(),
                "21".into(),
                "1880".into(),
                "(50.775, 6.08333)".into(),
            ]],
        )
    }

    #[test]
    fn test_project_id_year() {
        let projected = project_id_year(&catalog()).unwrap();
        assert_eq!(projected.headers, vec!["id", "year"]);
        assert_eq!(projected.rows[0], vec!["1", "1880"]);
    }

    #[test]
    fn test_project_id_year_requires_one_column() {
        let table = RawTable::new(vec!["name".into()], vec![]);
        assert!(project_id_year(&table).is_err());
    }

    #[test]
    fn test_project_geo_mass_renames_columns() {
        let projected = project_geo_mass(&catalog()).unwrap();
        assert_eq!(projected.headers, vec!["id", "mass", "GeoLocation"]);
        assert_eq!(projected.rows[0], vec!["1", "21", "(50.775, 6.08333)"]);
    }

    #[test]
    fn test_project_geo_mass_reports_every_missing_column() {
        let table = RawTable::new(vec!["id".into(), "name".into()], vec![]);
        match project_geo_mass(&table).unwrap_err() {
            EdaError::MissingColumnError { columns, .. } => {
                assert_eq!(columns, vec!["mass", "GeoLocation"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
