//! Time-axis tick marks and position mapping.

use crate::model::TimelineConfig;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInterval {
    Years(i32),
    Months,
}

pub fn interval_for(zoom: f64) -> TickInterval {
    if zoom < 1.5 {
        TickInterval::Years(20)
    } else if zoom < 2.0 {
        TickInterval::Years(10)
    } else if zoom < 3.0 {
        TickInterval::Years(5)
    } else if zoom < 4.0 {
        TickInterval::Years(1)
    } else {
        TickInterval::Months
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    /// Column within the full content width.
    pub offset: f64,
    pub label: String,
    /// Year boundary.
    pub major: bool,
}

/// Column of an event position (0–100) within `content_width`.
pub fn column_for_position(position: f64, content_width: f64) -> f64 {
    position * content_width / 100.0
}

pub fn tick_marks(timeline: &TimelineConfig, zoom: f64, content_width: f64) -> Vec<TickMark> {
    let span = timeline.span() as f64;
    let column = |years: f64| years * content_width / span;
    let start = timeline.start_year;
    let end = timeline.start_year + timeline.span();
    let mut marks = Vec::new();
    match interval_for(zoom) {
        TickInterval::Years(step) => {
            let mut year = start;
            while year <= end {
                marks.push(TickMark {
                    offset: column((year - start) as f64),
                    label: year.to_string(),
                    major: true,
                });
                year += step;
            }
        }
        TickInterval::Months => {
            for year in start..=end {
                let months = if year == end { 1 } else { 12 };
                for (m, name) in MONTHS.iter().enumerate().take(months) {
                    let major = m == 0;
                    marks.push(TickMark {
                        offset: column((year - start) as f64 + m as f64 / 12.0),
                        label: if major {
                            year.to_string()
                        } else {
                            (*name).to_string()
                        },
                        major,
                    });
                }
            }
        }
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_thresholds() {
        assert_eq!(interval_for(1.0), TickInterval::Years(20));
        assert_eq!(interval_for(1.4), TickInterval::Years(20));
        assert_eq!(interval_for(1.6), TickInterval::Years(10));
        assert_eq!(interval_for(2.0), TickInterval::Years(5));
        assert_eq!(interval_for(3.2), TickInterval::Years(1));
        assert_eq!(interval_for(4.0), TickInterval::Months);
    }

    #[test]
    fn twenty_year_ticks_span_the_century() {
        let marks = tick_marks(&TimelineConfig::default(), 1.0, 100.0);
        let labels: Vec<&str> = marks.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["2002", "2022", "2042", "2062", "2082", "2102"]);
        assert_eq!(marks[1].offset, 20.0);
        assert_eq!(marks.last().unwrap().offset, 100.0);
    }

    #[test]
    fn monthly_ticks_label_january_with_the_year() {
        let marks = tick_marks(&TimelineConfig::default(), 4.0, 1_200.0);
        assert_eq!(marks.len(), 100 * 12 + 1);
        assert_eq!(marks[0].label, "2002");
        assert!(marks[0].major);
        assert_eq!(marks[1].label, "Feb");
        assert!((marks[1].offset - 1.0).abs() < 1e-9);
        assert_eq!(marks[12].label, "2003");
        assert_eq!(marks.last().unwrap().label, "2102");
    }

    #[test]
    fn positions_map_linearly() {
        assert!((column_for_position(20.92, 1_000.0) - 209.2).abs() < 1e-9);
        assert_eq!(column_for_position(0.0, 0.0), 0.0);
    }
}
