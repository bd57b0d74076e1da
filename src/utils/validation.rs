use crate::utils::error::{EdaError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> EdaError {
    EdaError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_number_range(
    field_name: &str,
    value: usize,
    min_value: usize,
    max_value: usize,
) -> Result<()> {
    validate_positive_number(field_name, value, min_value)?;
    if value > max_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at most {}", max_value),
        ));
    }
    Ok(())
}

pub fn validate_positive_float(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field_name, value, "Value must be a positive number"));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim())) {
        return Ok(());
    }
    Err(invalid(
        field_name,
        value,
        format!("Valid values: {}", allowed.join(", ")),
    ))
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EdaError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_year_window(min_year: Option<i32>, max_year: Option<i32>) -> Result<()> {
    if let (Some(min), Some(max)) = (min_year, max_year) {
        if min > max {
            return Err(invalid(
                "filter.min_year",
                min,
                format!("min_year must not exceed max_year ({})", max),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://data.nasa.gov/rows.csv").is_ok());
        assert!(validate_url("source.endpoint", "http://localhost:8080/x.csv").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "not a url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com/data.csv").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("load.output_path", "./Docs_").is_ok());
        assert!(validate_path("load.output_path", "   ").is_err());
        assert!(validate_path("load.output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_positive_number("analysis.kde_grid_size", 512, 3).is_ok());
        assert!(validate_positive_number("analysis.kde_grid_size", 2, 3).is_err());
        assert!(validate_number_range("analysis.histogram_bins", 10_000, 1, 10_000).is_ok());
        assert!(validate_number_range("analysis.histogram_bins", 0, 1, 10_000).is_err());
        assert!(validate_number_range("analysis.histogram_bins", usize::MAX, 1, 10_000).is_err());
        assert!(validate_positive_float("analysis.iqr_multiplier", 1.5).is_ok());
        assert!(validate_positive_float("analysis.iqr_multiplier", 0.0).is_err());
        assert!(validate_positive_float("analysis.iqr_multiplier", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        let allowed = ["file", "http"];
        assert!(validate_one_of("source.type", "HTTP", &allowed).is_ok());
        assert!(validate_one_of("source.type", "s3", &allowed).is_err());
    }

    #[test]
    fn test_validate_year_window() {
        assert!(validate_year_window(Some(1800), Some(2013)).is_ok());
        assert!(validate_year_window(None, Some(2013)).is_ok());
        assert!(validate_year_window(Some(2014), Some(2013)).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("data.csv".to_string());
        let missing: Option<String> = None;
        assert_eq!(
            validate_required_field("source.path", &present).unwrap(),
            "data.csv"
        );
        assert!(matches!(
            validate_required_field("source.path", &missing),
            Err(EdaError::MissingConfigError { .. })
        ));
    }
}
