use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use tasador::workflows::valuation::{Location, PredictionResult, ValidationIssue};

pub(crate) fn render_estimate(
    result: &PredictionResult,
    requested_at: Option<DateTime<Utc>>,
) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Estimated price: {} {}",
        result.currency,
        format_amount(result.estimated_price)
    )
    .expect("write price");
    if let Some(label) = &result.property_label {
        writeln!(out, "Property: {label}").expect("write label");
    }
    if let Some(at) = requested_at {
        writeln!(out, "Requested at: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
            .expect("write timestamp");
    }
    out
}

pub(crate) fn render_issues(issues: &[ValidationIssue]) -> String {
    let mut out = String::from("input problems:\n");
    for issue in issues {
        writeln!(out, "  - {issue}").expect("write issue");
    }
    out
}

pub(crate) fn render_locations() -> String {
    Location::ordered()
        .into_iter()
        .map(|location| format!("{}\n", location.label()))
        .collect()
}

/// Group thousands with commas and keep at most two decimals, dropping
/// trailing zeros: `150000.5` -> `150,000.5`.
pub(crate) fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    if value < 0.0 && cents > 0 {
        grouped.push('-');
    }
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction > 0 {
        let decimals = format!("{fraction:02}");
        grouped.push('.');
        grouped.push_str(decimals.trim_end_matches('0'));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn amounts_group_thousands() {
        assert_eq!(format_amount(150000.0), "150,000");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1234567.89), "1,234,567.89");
        assert_eq!(format_amount(150000.5), "150,000.5");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(-2500.0), "-2,500");
    }

    #[test]
    fn estimate_lists_label_and_timestamp() {
        let result = PredictionResult {
            estimated_price: 150000.0,
            property_label: Some("Depto 2 amb".to_string()),
            currency: "USD".to_string(),
        };
        let at = Utc
            .with_ymd_and_hms(2026, 10, 16, 9, 30, 0)
            .single()
            .expect("valid timestamp");

        assert_eq!(
            render_estimate(&result, Some(at)),
            "Estimated price: USD 150,000\nProperty: Depto 2 amb\nRequested at: 2026-10-16 09:30:00 UTC\n"
        );
    }

    #[test]
    fn issues_are_listed_under_a_heading() {
        use tasador::workflows::valuation::FormField;

        let issues = [
            ValidationIssue::Unparsed {
                field: FormField::Bathrooms,
                raw: "abc".to_string(),
            },
            ValidationIssue::CoveredExceedsTotal {
                covered: 120.0,
                total: 90.0,
            },
        ];

        assert_eq!(
            render_issues(&issues),
            "input problems:\n  - bathrooms: 'abc' is not a number\n  - surface_covered (120) exceeds surface_total (90)\n"
        );
    }

    #[test]
    fn locations_are_listed_one_per_line() {
        let listing = render_locations();
        assert_eq!(listing.lines().count(), 7);
        assert!(listing.lines().any(|line| line == "Córdoba"));
    }
}
