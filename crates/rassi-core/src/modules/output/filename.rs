use crate::domain::{RassiError, RassiResult};
use std::path::Path;

/// Decodes the internuclear distance from a `<prefix>.<int>.<frac>.<suffix>`
/// file name, e.g. `O2.0.9000.rassi.output` encodes `0.9000`.
pub fn distance_from_path(path: &Path) -> RassiResult<f64> {
    let base_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            RassiError::format(
                "INPUT.FILENAME_DISTANCE",
                format!("output path '{}' has no decodable file name", path.display()),
            )
        })?;
    distance_from_name(base_name)
}

pub fn distance_from_name(name: &str) -> RassiResult<f64> {
    let fields: Vec<&str> = name.split('.').collect();
    if fields.len() < 3 {
        return Err(RassiError::format(
            "INPUT.FILENAME_DISTANCE",
            format!("file name '{}' needs at least three dot-separated fields", name),
        ));
    }

    let whole = digit_field(name, fields[1])?;
    let fractional = digit_field(name, fields[2])?;
    format!("{whole}.{fractional}").parse::<f64>().map_err(|source| {
        RassiError::internal(
            "SYS.FILENAME_DISTANCE",
            format!("distance fields of '{}' failed float conversion: {}", name, source),
        )
    })
}

fn digit_field<'a>(name: &str, field: &'a str) -> RassiResult<&'a str> {
    if field.is_empty() || !field.chars().all(|character| character.is_ascii_digit()) {
        return Err(RassiError::format(
            "INPUT.FILENAME_DISTANCE",
            format!("file name '{}' has non-numeric distance field '{}'", name, field),
        ));
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::{distance_from_name, distance_from_path};
    use crate::domain::RassiErrorCategory;
    use std::path::Path;

    #[test]
    fn reference_file_name_decodes_to_expected_distance() {
        let distance =
            distance_from_name("O2.0.9000.rassi.output").expect("distance should decode");
        assert!((distance - 0.9).abs() < 1.0e-12);
    }

    #[test]
    fn decode_works_through_a_full_path() {
        let distance = distance_from_path(Path::new("dane/O2.1.4500.rassi.output"))
            .expect("distance should decode");
        assert!((distance - 1.45).abs() < 1.0e-12);
    }

    #[test]
    fn two_field_names_fail_with_format_error() {
        let error = distance_from_name("O2.output").expect_err("decode should fail");
        assert_eq!(error.category(), RassiErrorCategory::FormatError);
        assert_eq!(error.code(), "INPUT.FILENAME_DISTANCE");
    }

    #[test]
    fn non_numeric_distance_fields_fail_with_format_error() {
        let error =
            distance_from_name("O2.abc.9000.rassi.output").expect_err("decode should fail");
        assert_eq!(error.category(), RassiErrorCategory::FormatError);

        let error =
            distance_from_name("O2.0.90x0.rassi.output").expect_err("decode should fail");
        assert_eq!(error.category(), RassiErrorCategory::FormatError);
    }

    #[test]
    fn empty_distance_field_fails_with_format_error() {
        let error = distance_from_name("O2..9000.rassi.output").expect_err("decode should fail");
        assert_eq!(error.category(), RassiErrorCategory::FormatError);
    }
}
