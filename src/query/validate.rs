//! Request Validation
//!
//! Structural checks run before any InfluxQL is built. A batch is valid iff
//! every element is valid; the first failure is reported with its index.

use crate::query::error::{InvalidReason, ValidationError};
use crate::query::model::{Column, Filter, GroupType, MeasurementColumnPair, Operator, RequestElement, TimeSpec};
use regex::Regex;
use std::sync::OnceLock;

/// `[+-*/]` followed by an ASCII number, `.` as the only decimal separator
fn math_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+\-*/][0-9]+(\.[0-9]+)?$").expect("valid math pattern"))
}

/// InfluxQL duration literal, e.g. `15m`
fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+(ns|u|µ|ms|s|m|h|d|w)$").expect("valid duration pattern"))
}

/// Check a math suffix like `*1000` or `-0.5`
pub fn math_valid(math: &str) -> bool {
    math_pattern().is_match(math)
}

/// Check a duration like `7d` or `500ms`
pub fn duration_valid(duration: &str) -> bool {
    duration_pattern().is_match(duration)
}

/// Validate every element of a batch
pub fn validate_elements(elements: &[RequestElement]) -> Result<(), ValidationError> {
    for (index, element) in elements.iter().enumerate() {
        element
            .validate()
            .map_err(|reason| ValidationError { index, reason })?;
    }
    Ok(())
}

/// Validate a batch of latest-value pairs
pub fn validate_pairs(pairs: &[MeasurementColumnPair]) -> Result<(), ValidationError> {
    for (index, pair) in pairs.iter().enumerate() {
        if let Some(math) = &pair.math {
            if !math_valid(math) {
                return Err(ValidationError {
                    index,
                    reason: InvalidReason::InvalidMath(math.clone()),
                });
            }
        }
    }
    Ok(())
}

impl RequestElement {
    /// Check this element for structural well-formedness
    pub fn validate(&self) -> Result<(), InvalidReason> {
        if self.measurement.is_empty() {
            return Err(InvalidReason::EmptyMeasurement);
        }
        if let Some(time) = &self.time {
            time.validate()?;
        }
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err(InvalidReason::LimitTooSmall);
            }
            if self.group_time.is_some() {
                return Err(InvalidReason::LimitWithGroupTime);
            }
        }
        if self.columns.is_empty() {
            return Err(InvalidReason::NoColumns);
        }
        for column in &self.columns {
            column.validate(self.time.is_some())?;
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        if let Some(interval) = &self.group_time {
            if !duration_valid(interval) {
                return Err(InvalidReason::InvalidGroupTime(interval.clone()));
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl TimeSpec {
    pub fn validate(&self) -> Result<(), InvalidReason> {
        match self {
            TimeSpec::Last(duration) => {
                if !duration_valid(duration) {
                    return Err(InvalidReason::InvalidDuration(duration.clone()));
                }
            }
            TimeSpec::Range { start, end } => {
                for bound in [start, end] {
                    if chrono::DateTime::parse_from_rfc3339(bound).is_err() {
                        return Err(InvalidReason::InvalidTimestamp(bound.clone()));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Column {
    /// `has_time` tells whether the owning element has a time window
    pub fn validate(&self, has_time: bool) -> Result<(), InvalidReason> {
        if self.name.is_empty() {
            return Err(InvalidReason::EmptyColumnName);
        }
        if let Some(group_type) = &self.group_type {
            if !has_time {
                return Err(InvalidReason::GroupTypeWithoutTime(self.name.clone()));
            }
            if GroupType::parse(group_type).is_none() {
                return Err(InvalidReason::UnknownGroupType(group_type.clone()));
            }
        }
        if let Some(math) = &self.math {
            if !math_valid(math) {
                return Err(InvalidReason::InvalidMath(math.clone()));
            }
        }
        Ok(())
    }
}

impl Filter {
    pub fn validate(&self) -> Result<(), InvalidReason> {
        if let Some(math) = &self.math {
            if !math_valid(math) {
                return Err(InvalidReason::InvalidMath(math.clone()));
            }
        }
        if Operator::parse(&self.operator).is_none() {
            return Err(InvalidReason::UnknownOperator(self.operator.clone()));
        }
        if self.column.is_empty() {
            return Err(InvalidReason::EmptyFilterColumn);
        }
        if self.value.is_null() {
            return Err(InvalidReason::MissingFilterValue(self.column.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::Column;
    use crate::value::Scalar;

    fn last_hour(measurement: &str) -> RequestElement {
        RequestElement::new(measurement, &["c1"]).time(TimeSpec::Last("1h".to_string()))
    }

    #[test]
    fn test_minimal_element_is_valid() {
        assert!(RequestElement::new("m1", &["c1"]).is_valid());
    }

    #[test]
    fn test_empty_measurement() {
        assert_eq!(
            RequestElement::new("", &["c1"]).validate(),
            Err(InvalidReason::EmptyMeasurement)
        );
    }

    #[test]
    fn test_empty_columns() {
        assert_eq!(
            RequestElement::new("m1", &[]).validate(),
            Err(InvalidReason::NoColumns)
        );
        assert_eq!(
            RequestElement::new("m1", &[""]).validate(),
            Err(InvalidReason::EmptyColumnName)
        );
    }

    #[test]
    fn test_limit_rules() {
        assert!(RequestElement::new("m1", &["c1"]).limit(1).is_valid());
        assert_eq!(
            RequestElement::new("m1", &["c1"]).limit(0).validate(),
            Err(InvalidReason::LimitTooSmall)
        );
        assert_eq!(
            RequestElement::new("m1", &["c1"]).limit(-3).validate(),
            Err(InvalidReason::LimitTooSmall)
        );
        assert_eq!(
            last_hour("m1").limit(5).group_time("1m").validate(),
            Err(InvalidReason::LimitWithGroupTime)
        );
    }

    #[test]
    fn test_time_window() {
        assert!(last_hour("m1").is_valid());
        assert!(RequestElement::new("m1", &["c1"])
            .time(TimeSpec::Last("250µ".to_string()))
            .is_valid());
        assert_eq!(
            RequestElement::new("m1", &["c1"])
                .time(TimeSpec::Last("1 hour".to_string()))
                .validate(),
            Err(InvalidReason::InvalidDuration("1 hour".to_string()))
        );

        let range = TimeSpec::Range {
            start: "2020-01-01T00:00:00Z".to_string(),
            end: "2020-01-02T00:00:00.5+01:00".to_string(),
        };
        assert!(RequestElement::new("m1", &["c1"]).time(range).is_valid());

        let broken = TimeSpec::Range {
            start: "2020-01-01".to_string(),
            end: "2020-01-02T00:00:00Z".to_string(),
        };
        assert_eq!(
            RequestElement::new("m1", &["c1"]).time(broken).validate(),
            Err(InvalidReason::InvalidTimestamp("2020-01-01".to_string()))
        );
    }

    #[test]
    fn test_group_type_requires_time() {
        let mut element = RequestElement::new("m1", &[]).group_time("1h");
        element.columns.push(Column::new("c1").with_group_type("mean"));
        assert_eq!(
            element.validate(),
            Err(InvalidReason::GroupTypeWithoutTime("c1".to_string()))
        );

        let element = element.time(TimeSpec::Last("1d".to_string()));
        assert!(element.is_valid());
    }

    #[test]
    fn test_group_types() {
        for group_type in ["mean", "median", "difference-first", "difference-sum"] {
            let mut element = last_hour("m1");
            element.columns = vec![Column::new("c1").with_group_type(group_type)];
            assert!(element.is_valid(), "{} should be accepted", group_type);
        }

        let mut element = last_hour("m1");
        element.columns = vec![Column::new("c1").with_group_type("avg")];
        assert_eq!(
            element.validate(),
            Err(InvalidReason::UnknownGroupType("avg".to_string()))
        );
    }

    #[test]
    fn test_math() {
        for math in ["+5", "-0.5", "*1000", "/3"] {
            assert!(math_valid(math), "{} should be accepted", math);
        }
        // A comma would split the select term in two
        for math in ["", "5", "+", "+5)", "*2; DROP", "+1,5", "%2", "*٢", "+1.٥"] {
            assert!(!math_valid(math), "{} should be rejected", math);
        }

        let mut element = RequestElement::new("m1", &[]);
        element.columns.push(Column::new("c1").with_math("^2"));
        assert_eq!(
            element.validate(),
            Err(InvalidReason::InvalidMath("^2".to_string()))
        );
    }

    #[test]
    fn test_group_time() {
        assert!(last_hour("m1").group_time("15m").is_valid());
        assert_eq!(
            last_hour("m1").group_time("15 minutes").validate(),
            Err(InvalidReason::InvalidGroupTime("15 minutes".to_string()))
        );
        assert_eq!(
            last_hour("m1").group_time("١m").validate(),
            Err(InvalidReason::InvalidGroupTime("١m".to_string()))
        );
        assert!(!duration_valid("٣h"));

        let element = RequestElement::new("m1", &["c1"]).time(TimeSpec::Last("٣h".to_string()));
        assert_eq!(
            element.validate(),
            Err(InvalidReason::InvalidDuration("٣h".to_string()))
        );
    }

    #[test]
    fn test_filters() {
        let valid = RequestElement::new("m1", &["c1"])
            .filter(Filter::new("c2", Operator::Gte, 3).with_math("*2"));
        assert!(valid.is_valid());

        let mut unknown = Filter::new("c2", Operator::Eq, "x");
        unknown.operator = "LIKE".to_string();
        assert_eq!(
            RequestElement::new("m1", &["c1"]).filter(unknown).validate(),
            Err(InvalidReason::UnknownOperator("LIKE".to_string()))
        );

        let null_value = Filter::new("c2", Operator::Eq, Scalar::Null);
        assert_eq!(
            RequestElement::new("m1", &["c1"]).filter(null_value).validate(),
            Err(InvalidReason::MissingFilterValue("c2".to_string()))
        );

        let no_column = Filter::new("", Operator::Eq, 1);
        assert_eq!(
            RequestElement::new("m1", &["c1"]).filter(no_column).validate(),
            Err(InvalidReason::EmptyFilterColumn)
        );
    }

    #[test]
    fn test_batch_reports_index() {
        let batch = vec![
            RequestElement::new("m1", &["c1"]),
            RequestElement::new("m2", &["c1"]).limit(0),
        ];
        assert_eq!(
            validate_elements(&batch),
            Err(ValidationError {
                index: 1,
                reason: InvalidReason::LimitTooSmall
            })
        );
        assert!(validate_elements(&batch[..1]).is_ok());
        assert!(validate_elements(&[]).is_ok());
    }

    #[test]
    fn test_validate_pairs() {
        let pairs = vec![
            MeasurementColumnPair::new("m1", "c1").with_math("+5"),
            MeasurementColumnPair::new("m1", "c1").with_math("+x"),
        ];
        assert_eq!(
            validate_pairs(&pairs),
            Err(ValidationError {
                index: 1,
                reason: InvalidReason::InvalidMath("+x".to_string())
            })
        );
    }
}
