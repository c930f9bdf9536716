use chrono::NaiveDate;

use crate::models::Weekday;

/// Returns true when the doctor holds consultations on the weekday `date`
/// falls on. An empty availability set never matches.
pub fn is_available_on(availability: &[Weekday], date: NaiveDate) -> bool {
    availability.contains(&Weekday::from_date(date))
}
