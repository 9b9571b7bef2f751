use crate::domain::models::{parse_leading_int, weekday_name, Routine, Subroutine};
use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;

pub const NO_DAYS_SELECTED: &str = "No days selected";

/// Sums every subroutine's duration text into one display string.
///
/// Durations are read as alternating `(amount, unit)` tokens; a unit counts
/// when it contains "hour", "minute" or "second". Tokens without a leading
/// number, trailing amounts with no unit, and empty durations are skipped —
/// aggregation never fails on sloppy text.
pub fn total_duration(subroutines: &[Subroutine]) -> String {
    let mut total_seconds: u64 = 0;

    for subroutine in subroutines {
        if subroutine.duration.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = subroutine.duration.split_whitespace().collect();
        let mut index = 0;
        while index < tokens.len() {
            if let (Some(amount), Some(unit)) =
                (parse_leading_int(tokens[index]), tokens.get(index + 1))
            {
                if unit.contains("hour") {
                    total_seconds += amount * 60 * 60;
                } else if unit.contains("minute") {
                    total_seconds += amount * 60;
                } else if unit.contains("second") {
                    total_seconds += amount;
                }
            }
            index += 2;
        }
    }

    format_duration(total_seconds)
}

fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut formatted = Vec::new();
    if hours > 0 {
        formatted.push(format!("{hours} hour{}", if hours > 1 { "s" } else { "" }));
    }
    if minutes > 0 {
        formatted.push(format!(
            "{minutes} minute{}",
            if minutes > 1 { "s" } else { "" }
        ));
    }
    if seconds > 0 {
        formatted.push(format!(
            "{seconds} second{}",
            if seconds > 1 { "s" } else { "" }
        ));
    }
    formatted.join(" ")
}

pub fn subroutine_count(subroutines: Option<&[Subroutine]>) -> usize {
    subroutines.map_or(0, <[Subroutine]>::len)
}

/// Display text for a routine's next scheduled occurrence relative to `now`.
///
/// Today wins outright when selected; otherwise the first selected day
/// strictly after today in ISO weekday order (Monday=1..Sunday=7), wrapping
/// across the week boundary.
pub fn next_occurrence(routine: &Routine, now: DateTime<Tz>) -> String {
    if routine.selected_days.none_selected() {
        return NO_DAYS_SELECTED.to_string();
    }

    let today = now.weekday();
    if routine.selected_days.contains(today) {
        return format!("Today, {}", routine.selected_time);
    }

    let mut candidate = today.succ();
    for _ in 0..7 {
        if routine.selected_days.contains(candidate) {
            return format!("{}, {}", weekday_name(candidate), routine.selected_time);
        }
        candidate = candidate.succ();
    }
    NO_DAYS_SELECTED.to_string()
}

/// Day-rollover reset: once `now` is past the end of the day the completion
/// flags belong to, every subroutine reverts to incomplete and the flags are
/// re-stamped with today's date. Pure and idempotent; persisting the reset
/// copy is the caller's job.
pub fn reset_routine_status(routine: &Routine, now: DateTime<Tz>) -> Routine {
    let Ok(status_date) = NaiveDate::parse_from_str(&routine.status_date, "%Y-%m-%d") else {
        return routine.clone();
    };

    let today = now.date_naive();
    if today <= status_date {
        return routine.clone();
    }

    let mut reset = routine.clone();
    for subroutine in &mut reset.subroutines {
        subroutine.completed = false;
    }
    reset.status_date = today.format("%Y-%m-%d").to_string();
    reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SelectedDays;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn subroutine(duration: &str) -> Subroutine {
        Subroutine {
            id: format!("sub-{duration}"),
            name: "step".to_string(),
            duration: duration.to_string(),
            completed: false,
        }
    }

    fn sample_routine(selected_days: SelectedDays) -> Routine {
        Routine {
            id: "rtn-1".to_string(),
            name: "Morning".to_string(),
            subroutines: vec![subroutine("5 minutes"), subroutine("10 minutes")],
            selected_time: "07:30".to_string(),
            selected_days,
            total_duration: "15 minutes".to_string(),
            notifications_enabled: false,
            status_date: "2026-02-16".to_string(),
        }
    }

    // 2026-02-16 is a Monday.
    fn fixed_now(hour: u32) -> DateTime<Tz> {
        chrono_tz::UTC
            .with_ymd_and_hms(2026, 2, 16, hour, 0, 0)
            .single()
            .expect("valid fixed time")
    }

    #[test]
    fn total_duration_of_empty_list_is_empty() {
        assert_eq!(total_duration(&[]), "");
    }

    #[test]
    fn total_duration_carries_minutes_into_hours() {
        assert_eq!(total_duration(&[subroutine("90 minutes")]), "1 hour 30 minutes");
    }

    #[test]
    fn total_duration_reads_composite_durations() {
        let steps = [subroutine("1 hours 30 minutes 15 seconds"), subroutine("45 seconds")];
        assert_eq!(total_duration(&steps), "1 hour 31 minutes");
    }

    #[test]
    fn total_duration_pluralizes_components() {
        assert_eq!(total_duration(&[subroutine("2 hours"), subroutine("1 minutes")]), "2 hours 1 minute");
    }

    #[test]
    fn total_duration_skips_unreadable_tokens() {
        let steps = [
            subroutine("abc minutes"),
            subroutine(""),
            subroutine("5"),
            subroutine("5 bananas"),
            subroutine("10 minutes"),
        ];
        assert_eq!(total_duration(&steps), "10 minutes");
    }

    #[test]
    fn subroutine_count_tolerates_missing_input() {
        assert_eq!(subroutine_count(None), 0);
        assert_eq!(subroutine_count(Some(&[])), 0);
        assert_eq!(
            subroutine_count(Some(&[subroutine("5 minutes"), subroutine("10 minutes")])),
            2
        );
    }

    #[test]
    fn next_occurrence_with_no_days_selected() {
        let routine = sample_routine(SelectedDays::default());
        assert_eq!(next_occurrence(&routine, fixed_now(12)), NO_DAYS_SELECTED);
    }

    #[test]
    fn next_occurrence_prefers_today() {
        let routine = sample_routine(SelectedDays {
            monday: true,
            friday: true,
            ..SelectedDays::default()
        });
        assert_eq!(next_occurrence(&routine, fixed_now(12)), "Today, 07:30");
    }

    #[test]
    fn next_occurrence_picks_earliest_following_day() {
        let routine = sample_routine(SelectedDays {
            tuesday: true,
            friday: true,
            ..SelectedDays::default()
        });
        assert_eq!(next_occurrence(&routine, fixed_now(12)), "Tuesday, 07:30");
    }

    #[test]
    fn next_occurrence_wraps_across_the_week() {
        let routine = sample_routine(SelectedDays {
            sunday: true,
            ..SelectedDays::default()
        });
        assert_eq!(next_occurrence(&routine, fixed_now(12)), "Sunday, 07:30");
    }

    #[test]
    fn reset_keeps_routine_unchanged_within_the_day() {
        let mut routine = sample_routine(SelectedDays::default());
        routine.subroutines[0].completed = true;

        let same_day = reset_routine_status(&routine, fixed_now(23));
        assert_eq!(same_day, routine);
    }

    #[test]
    fn reset_clears_completion_after_the_day_ends() {
        let mut routine = sample_routine(SelectedDays::default());
        routine.subroutines[0].completed = true;
        routine.subroutines[1].completed = true;

        let next_day = chrono_tz::UTC
            .with_ymd_and_hms(2026, 2, 17, 0, 30, 0)
            .single()
            .expect("valid fixed time");
        let reset = reset_routine_status(&routine, next_day);

        assert!(reset.subroutines.iter().all(|step| !step.completed));
        assert_eq!(reset.status_date, "2026-02-17");

        // Idempotent: a second evaluation the same day changes nothing.
        assert_eq!(reset_routine_status(&reset, next_day), reset);
    }

    #[test]
    fn reset_leaves_unparseable_status_date_alone() {
        let mut routine = sample_routine(SelectedDays::default());
        routine.status_date = "someday".to_string();
        routine.subroutines[0].completed = true;

        assert_eq!(reset_routine_status(&routine, fixed_now(12)), routine);
    }

    proptest! {
        #[test]
        fn total_duration_is_order_independent(minutes in proptest::collection::vec(0u64..600, 0..8)) {
            let steps: Vec<Subroutine> = minutes
                .iter()
                .map(|amount| subroutine(&format!("{amount} minutes")))
                .collect();
            let mut reordered = steps.clone();
            reordered.reverse();

            prop_assert_eq!(total_duration(&steps), total_duration(&reordered));
        }
    }
}
