//! Round-robin group schedules (circle method).
//!
//! Passes run in a fixed order over the base rotation output:
//! 1. rotate: `n - 1` base matchdays, position 0 fixed;
//! 2. flip: every even base matchday swaps home and away;
//! 3. mirror (home-and-away only): matchday `k + (n - 1)` is the exact
//!    reverse of matchday `k`.
//!
//! `n - 1` is always odd, so a flip applied after mirroring would land on the
//! opposite leg parity and undo the reversal; flipping before mirroring keeps
//! the two legs of every pairing reversed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::{CompetitionSchedule, GroupSchedule, Match};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum CompType {
    /// Group stage followed by knockouts.
    GROUPKO,
    /// Group stage played home and away.
    GROUPHA,
    GROUP,
}

impl CompType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "GROUPKO" => Some(Self::GROUPKO),
            "GROUPHA" => Some(Self::GROUPHA),
            "GROUP" => Some(Self::GROUP),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GROUPKO => "GROUPKO",
            Self::GROUPHA => "GROUPHA",
            Self::GROUP => "GROUP",
        }
    }
}

pub fn supports_group_schedule(comp_type: &str) -> bool {
    CompType::parse(comp_type).is_some()
}

pub fn requires_home_and_away(comp_type: &str) -> bool {
    comp_type == CompType::GROUPHA.as_str()
}

/// Builds one group's matchdays. Fewer than two teams gives an empty schedule.
/// Teams are paired by position, so duplicate names are scheduled as given.
pub fn schedule_group(teams: &[String], home_and_away: bool) -> GroupSchedule {
    let mut schedule = GroupSchedule::new();
    if teams.len() < 2 {
        return schedule;
    }

    // None is the bye placeholder for odd-sized groups.
    let mut lineup: Vec<Option<&str>> = teams.iter().map(|t| Some(t.as_str())).collect();
    if lineup.len() % 2 == 1 {
        lineup.push(None);
    }
    let n = lineup.len();
    let base_rounds = (n - 1) as u32;

    for matchday in 1..=base_rounds {
        let fixtures = (0..n / 2)
            .filter_map(|i| match (lineup[i], lineup[n - 1 - i]) {
                (Some(home), Some(away)) => Some(Match::new(home, away)),
                _ => None,
            })
            .collect();
        schedule.insert(matchday, fixtures);
        rotate(&mut lineup);
    }

    flip_even_matchdays(&mut schedule);
    if home_and_away {
        mirror_second_leg(&mut schedule, base_rounds);
    }
    schedule
}

pub fn schedule_competition(
    groups: &BTreeMap<String, Vec<String>>,
    use_home_away: bool,
) -> CompetitionSchedule {
    groups
        .iter()
        .map(|(name, teams)| (name.clone(), schedule_group(teams, use_home_away)))
        .collect()
}

/// All fixtures on `matchday`, tagged with their group, in group order.
pub fn matches_for_matchday(schedule: &CompetitionSchedule, matchday: u32) -> Vec<(String, Match)> {
    schedule
        .iter()
        .filter_map(|(group, days)| days.get(&matchday).map(|fixtures| (group, fixtures)))
        .flat_map(|(group, fixtures)| fixtures.iter().map(move |m| (group.clone(), m.clone())))
        .collect()
}

pub fn total_matchdays(schedule: &CompetitionSchedule) -> u32 {
    schedule
        .values()
        .filter_map(|days| days.keys().next_back().copied())
        .max()
        .unwrap_or(0)
}

// Last element moves to position 1; position 0 stays fixed.
fn rotate<T>(lineup: &mut Vec<T>) {
    if lineup.len() < 3 {
        return;
    }
    if let Some(last) = lineup.pop() {
        lineup.insert(1, last);
    }
}

fn flip_even_matchdays(schedule: &mut GroupSchedule) {
    for (matchday, fixtures) in schedule.iter_mut() {
        if matchday % 2 == 0 {
            for fixture in fixtures.iter_mut() {
                *fixture = fixture.reversed();
            }
        }
    }
}

fn mirror_second_leg(schedule: &mut GroupSchedule, base_rounds: u32) {
    let second_leg: Vec<(u32, Vec<Match>)> = schedule
        .iter()
        .map(|(matchday, fixtures)| {
            (
                matchday + base_rounds,
                fixtures.iter().map(Match::reversed).collect(),
            )
        })
        .collect();
    schedule.extend(second_leg);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rotate_keeps_first_position() {
        let mut lineup = vec![1, 2, 3, 4];
        rotate(&mut lineup);
        assert_eq!(lineup, [1, 4, 2, 3]);
        rotate(&mut lineup);
        assert_eq!(lineup, [1, 3, 4, 2]);
    }

    #[test]
    fn four_team_single_round_regression() {
        let schedule = schedule_group(&names(&["A", "B", "C", "D"]), false);
        let expected = [
            (1, vec![Match::new("A", "D"), Match::new("B", "C")]),
            (2, vec![Match::new("C", "A"), Match::new("B", "D")]),
            (3, vec![Match::new("A", "B"), Match::new("C", "D")]),
        ];
        assert_eq!(schedule.len(), 3);
        for (matchday, fixtures) in expected {
            assert_eq!(schedule[&matchday], fixtures, "matchday {matchday}");
        }
    }

    #[test]
    fn four_team_double_round_mirrors_final_first_leg() {
        let schedule = schedule_group(&names(&["A", "B", "C", "D"]), true);
        assert_eq!(schedule.len(), 6);
        assert_eq!(schedule[&4], vec![Match::new("D", "A"), Match::new("C", "B")]);
        assert_eq!(schedule[&5], vec![Match::new("A", "C"), Match::new("D", "B")]);
        assert_eq!(schedule[&6], vec![Match::new("B", "A"), Match::new("D", "C")]);
    }

    #[test]
    fn comp_type_gating() {
        assert!(supports_group_schedule("GROUPKO"));
        assert!(supports_group_schedule("GROUP"));
        assert!(!supports_group_schedule("KO"));
        assert!(!supports_group_schedule("groupko"));
        assert!(requires_home_and_away("GROUPHA"));
        assert!(!requires_home_and_away("GROUPKO"));
    }
}
