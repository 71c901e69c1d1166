use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{ActivityStatus, Commitment, CommitmentRef, ConflictPair};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;
use crate::repository::user::UserRepository;

/// Find every pair of overlapping commitments.
///
/// Commitments are swept in `(start_time, id)` order while an active set holds every interval
/// that is still open, so nested and multi-way overlaps are all reported. Touching intervals
/// (`a.end_time == b.start_time`) do not conflict. Empty or inverted intervals are ignored.
pub fn find_conflicts(commitments: &[Commitment]) -> Vec<ConflictPair> {
    let mut sorted: Vec<&Commitment> = commitments
        .iter()
        .filter(|c| {
            let valid = c.end_time > c.start_time;
            if !valid {
                tracing::debug!(id = %c.id, "Skipping commitment with empty time window");
            }
            valid
        })
        .collect();
    sorted.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

    let mut active: Vec<&Commitment> = Vec::new();
    let mut conflicts = Vec::new();

    for current in sorted {
        active.retain(|open| open.end_time > current.start_time);

        for open in &active {
            conflicts.push(ConflictPair {
                first: CommitmentRef::from(*open),
                second: CommitmentRef::from(current),
                overlap_start: current.start_time,
                overlap_end: open.end_time.min(current.end_time),
            });
        }

        active.push(current);
    }

    conflicts
}

/// Conflicts across a volunteer's live registrations, optional candidate activity, and
/// caller-supplied fixed events such as classes.
pub fn volunteer_conflicts(
    store: &Store,
    volunteer_id: Uuid,
    external_events: &[Commitment],
    candidate_activity_id: Option<Uuid>,
) -> Result<Vec<ConflictPair>> {
    UserRepository::new(store).find_volunteer(volunteer_id)?;
    let activities = ActivityRepository::new(store);

    let mut seen = BTreeSet::new();
    let mut commitments: Vec<Commitment> = activities
        .list_for_volunteer(volunteer_id)
        .iter()
        .filter(|a| matches!(a.status, ActivityStatus::Approved | ActivityStatus::Pending))
        .inspect(|a| {
            seen.insert(a.activity_id);
        })
        .map(Commitment::from)
        .collect();

    if let Some(candidate_id) = candidate_activity_id
        && !seen.contains(&candidate_id)
    {
        let candidate = activities.find_by_id(candidate_id)?;
        commitments.push(Commitment::from(&candidate));
    }

    // An external event carrying an activity's id is that activity, not a second commitment.
    let mut ids: BTreeSet<String> = commitments.iter().map(|c| c.id.clone()).collect();
    for event in external_events {
        if ids.insert(event.id.clone()) {
            commitments.push(event.clone());
        } else {
            tracing::debug!(id = %event.id, "Skipping duplicate commitment");
        }
    }

    Ok(find_conflicts(&commitments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::models::Role;
    use crate::test_support::{add_user, approved_activity, base_time, insert};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn slot(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Commitment {
        Commitment {
            id: id.to_string(),
            title: format!("slot {id}"),
            start_time: start,
            end_time: end,
        }
    }

    fn ids(pair: &ConflictPair) -> (String, String) {
        (pair.first.id.clone(), pair.second.id.clone())
    }

    #[test]
    fn test_chain_of_three() {
        let conflicts = find_conflicts(&[
            slot("1", at(9, 0), at(10, 0)),
            slot("2", at(9, 30), at(11, 0)),
            slot("3", at(10, 30), at(12, 0)),
        ]);

        assert_eq!(conflicts.len(), 2);
        assert_eq!(ids(&conflicts[0]), ("1".to_string(), "2".to_string()));
        assert_eq!(conflicts[0].overlap_start, at(9, 30));
        assert_eq!(conflicts[0].overlap_end, at(10, 0));
        assert_eq!(ids(&conflicts[1]), ("2".to_string(), "3".to_string()));
        assert_eq!(conflicts[1].overlap_start, at(10, 30));
        assert_eq!(conflicts[1].overlap_end, at(11, 0));
        assert!(!conflicts.iter().any(|c| c.involves("1") && c.involves("3")));
    }

    #[test]
    fn test_adjacent_slots_do_not_conflict() {
        let conflicts = find_conflicts(&[
            slot("a", at(9, 0), at(10, 0)),
            slot("b", at(10, 0), at(11, 0)),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_long_interval_overlaps_everything_inside_it() {
        let conflicts = find_conflicts(&[
            slot("day", at(8, 0), at(18, 0)),
            slot("m", at(9, 0), at(10, 0)),
            slot("n", at(13, 0), at(14, 0)),
        ]);

        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.first.id == "day"));
        assert_eq!(conflicts[1].overlap_start, at(13, 0));
        assert_eq!(conflicts[1].overlap_end, at(14, 0));
    }

    #[test]
    fn test_three_way_overlap_reports_every_pair() {
        let conflicts = find_conflicts(&[
            slot("c", at(9, 30), at(10, 30)),
            slot("a", at(9, 0), at(11, 0)),
            slot("b", at(9, 15), at(10, 0)),
        ]);

        assert_eq!(conflicts.len(), 3);
        assert!(conflicts.iter().any(|c| c.involves("a") && c.involves("b")));
        assert!(conflicts.iter().any(|c| c.involves("a") && c.involves("c")));
        assert!(conflicts.iter().any(|c| c.involves("b") && c.involves("c")));
    }

    #[test]
    fn test_identical_start_breaks_ties_by_id() {
        let conflicts = find_conflicts(&[
            slot("z", at(9, 0), at(10, 0)),
            slot("y", at(9, 0), at(9, 30)),
        ]);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(ids(&conflicts[0]), ("y".to_string(), "z".to_string()));
        assert_eq!(conflicts[0].overlap_end, at(9, 30));
    }

    #[test]
    fn test_empty_windows_are_ignored() {
        let conflicts = find_conflicts(&[
            slot("a", at(9, 0), at(11, 0)),
            slot("point", at(10, 0), at(10, 0)),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let input = [
            slot("1", at(9, 0), at(10, 0)),
            slot("2", at(9, 30), at(11, 0)),
        ];
        assert_eq!(find_conflicts(&input), find_conflicts(&input));
    }

    #[test]
    fn test_volunteer_conflicts_include_candidate_and_classes() {
        let store = Store::new();
        let volunteer = add_user(&store, Role::Volunteer, 50);

        let mut registered = approved_activity(base_time(), 5);
        registered.participants.insert(volunteer.user_id);
        let registered = insert(&store, registered);

        let mut candidate = approved_activity(base_time(), 5);
        candidate.start_time = registered.start_time + Duration::hours(1);
        candidate.end_time = candidate.start_time + Duration::hours(2);
        let candidate = insert(&store, candidate);

        let class = Commitment {
            id: "course-algebra".to_string(),
            title: "Algebra".to_string(),
            start_time: registered.start_time - Duration::minutes(30),
            end_time: registered.start_time + Duration::minutes(30),
        };

        let conflicts = volunteer_conflicts(
            &store,
            volunteer.user_id,
            &[class],
            Some(candidate.activity_id),
        )
        .unwrap();

        let registered_id = registered.activity_id.to_string();
        let candidate_id = candidate.activity_id.to_string();
        assert_eq!(conflicts.len(), 2);
        assert!(
            conflicts
                .iter()
                .any(|c| c.involves("course-algebra") && c.involves(&registered_id))
        );
        assert!(
            conflicts
                .iter()
                .any(|c| c.involves(&registered_id) && c.involves(&candidate_id))
        );
    }

    #[test]
    fn test_external_copy_of_registered_activity_is_not_a_conflict() {
        let store = Store::new();
        let volunteer = add_user(&store, Role::Volunteer, 80);
        let mut registered = approved_activity(base_time(), 5);
        registered.participants.insert(volunteer.user_id);
        let registered = insert(&store, registered);

        let copy = Commitment {
            id: registered.activity_id.to_string(),
            title: "Same activity from the calendar feed".to_string(),
            start_time: registered.start_time,
            end_time: registered.end_time,
        };

        let conflicts =
            volunteer_conflicts(&store, volunteer.user_id, &[copy.clone(), copy], None).unwrap();
        assert!(conflicts.is_empty());
    }
}
