//! # Streak Calculator
//!
//! Computes attendance streaks: for each youth, how many of the most recent
//! eligible services they attended in a row, counting back from the newest.
//!
//! The calculator is pure. Callers fetch the eligible services (newest first,
//! capped, future services excluded) and every attendance pair between the
//! requested youth and those services in one batch, then hand both in.

use std::collections::{HashMap, HashSet};

/// How many past services are inspected when computing streaks
pub const DEFAULT_MAX_SERVICES_FOR_STREAK: usize = 200;

/// Compute the streak of every youth in `youth_ids`.
///
/// `recent_service_ids` must be ordered newest first. A youth's streak is the
/// length of the leading run of services they have a mark for; the first miss
/// ends it. Every requested id is present in the result, and nothing else is.
pub fn compute_streaks(
    recent_service_ids: &[i64],
    attendance: &HashSet<(String, i64)>,
    youth_ids: &[String],
) -> HashMap<String, u32> {
    let mut attended: HashMap<&str, HashSet<i64>> = HashMap::new();
    for (cedula, service_id) in attendance {
        attended.entry(cedula.as_str()).or_default().insert(*service_id);
    }

    youth_ids
        .iter()
        .map(|cedula| {
            let streak = match attended.get(cedula.as_str()) {
                Some(services) => recent_service_ids
                    .iter()
                    .take_while(|id| services.contains(id))
                    .count() as u32,
                None => 0,
            };
            (cedula.clone(), streak)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(pairs: &[(&str, i64)]) -> HashSet<(String, i64)> {
        pairs.iter().map(|(c, s)| (c.to_string(), *s)).collect()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_streak_stops_at_first_miss() {
        // Newest first: S5, S4, S3, S2, S1; attended S5, S4 and S2
        let services = [5, 4, 3, 2, 1];
        let attendance = marks(&[("A", 5), ("A", 4), ("A", 2)]);

        let streaks = compute_streaks(&services, &attendance, &ids(&["A"]));
        assert_eq!(streaks.get("A"), Some(&2));
    }

    #[test]
    fn test_missing_newest_service_yields_zero() {
        let services = [5, 4, 3];
        let attendance = marks(&[("A", 4), ("A", 3)]);

        let streaks = compute_streaks(&services, &attendance, &ids(&["A"]));
        assert_eq!(streaks.get("A"), Some(&0));
    }

    #[test]
    fn test_full_attendance_equals_service_count() {
        let services = [9, 7, 3];
        let attendance = marks(&[("A", 9), ("A", 7), ("A", 3), ("A", 1)]);

        let streaks = compute_streaks(&services, &attendance, &ids(&["A"]));
        assert_eq!(streaks.get("A"), Some(&3));
    }

    #[test]
    fn test_youth_without_marks_get_zero() {
        let services = [2, 1];
        let attendance = marks(&[("A", 2)]);

        let streaks = compute_streaks(&services, &attendance, &ids(&["A", "B"]));
        assert_eq!(streaks.get("A"), Some(&1));
        assert_eq!(streaks.get("B"), Some(&0));
    }

    #[test]
    fn test_no_services_means_all_zero() {
        let attendance = marks(&[("A", 1)]);

        let streaks = compute_streaks(&[], &attendance, &ids(&["A", "B"]));
        assert_eq!(streaks.len(), 2);
        assert!(streaks.values().all(|s| *s == 0));
    }

    #[test]
    fn test_output_keys_match_requested_ids() {
        let attendance = marks(&[("A", 1), ("Z", 1)]);

        let streaks = compute_streaks(&[1], &attendance, &ids(&["A"]));
        assert_eq!(streaks.len(), 1);
        assert!(!streaks.contains_key("Z"));

        assert!(compute_streaks(&[1], &attendance, &[]).is_empty());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let services = [5, 4, 3, 2, 1];
        let attendance = marks(&[("A", 5), ("A", 4), ("B", 4), ("C", 5), ("C", 4), ("C", 3)]);
        let youth = ids(&["A", "B", "C"]);

        let first = compute_streaks(&services, &attendance, &youth);
        let second = compute_streaks(&services, &attendance, &youth);
        assert_eq!(first, second);
        assert_eq!(first.get("C"), Some(&3));
    }
}
