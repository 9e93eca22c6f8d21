//! Release years offered to the user.

use chrono::{Datelike, Local};

/// First year offered by default.
pub const DEFAULT_START_YEAR: i32 = 2016;

/// Years from `current` down to `start`, newest first.
pub fn release_years(start: i32, current: i32) -> Vec<i32> {
    (start..=current).rev().collect()
}

/// [`release_years`] ending at the local calendar year.
pub fn release_years_until_now(start: i32) -> Vec<i32> {
    release_years(start, Local::now().year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_year_comes_first() {
        assert_eq!(release_years(2016, 2019), vec![2019, 2018, 2017, 2016]);
    }

    #[test]
    fn single_and_empty_ranges() {
        assert_eq!(release_years(2020, 2020), vec![2020]);
        assert!(release_years(2021, 2020).is_empty());
    }

    #[test]
    fn until_now_includes_start_year() {
        let years = release_years_until_now(DEFAULT_START_YEAR);
        assert_eq!(years.last(), Some(&DEFAULT_START_YEAR));
        assert_eq!(years.first(), Some(&Local::now().year()));
    }
}
