//! Group draw engine.
//!
//! Two formats share the same pipeline: hosts are pre-placed from a fixed
//! letter table, then pots are dealt strictly in order. The standard format
//! deals every pot at random. The championship format deals Pot 1 at random
//! and solves every later pot with a bounded randomized backtracking search
//! under the confederation rules in [`can_place`].
//!
//! The search does not enumerate permutations of a pot. It tries at most
//! `min(20, 3 * pot size)` shuffled orderings per pot and, for each ordering,
//! runs a per-team backtracking placement. That bound keeps the draw well
//! under a second for real tournament sizes at the cost of occasionally
//! reporting a feasible draw as failed.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::nations::NationRegistry;
use crate::pots;
use crate::state::{Confederation, DrawFormat, Group, Pot, Team};

pub const MAX_HOSTS: usize = 6;
pub const MAX_GROUPS: usize = 26;
pub const UEFA_PER_GROUP: usize = 2;

const MAX_ORDERINGS_PER_POT: usize = 20;
const ORDERINGS_PER_TEAM: usize = 3;

// (nominal, fallback) group letter for the n-th host. The fallback is used
// when the nominal group does not exist for the current group count.
const HOST_GROUP_TABLE: [(&str, &str); MAX_HOSTS] = [
    ("A", "A"),
    ("B", "A"),
    ("D", "C"),
    ("F", "C"),
    ("I", "C"),
    ("J", "E"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub orderings_tried: usize,
    pub pots_backtracked: usize,
}

#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub success: bool,
    pub groups: Vec<Group>,
    pub stats: DrawStats,
}

impl DrawOutcome {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn placed_count(&self) -> usize {
        self.groups.iter().map(|g| g.teams().count()).sum()
    }

    /// Group name to placed team names, empty slots dropped.
    pub fn team_names(&self) -> BTreeMap<String, Vec<String>> {
        self.groups
            .iter()
            .map(|g| (g.name.clone(), g.team_names()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub group: String,
    pub position: usize,
    pub team: Team,
}

/// Everything a draw needs: the seeded pots, group count and format.
#[derive(Debug, Clone)]
pub struct DrawSetup {
    pub format: DrawFormat,
    pub number_of_groups: usize,
    pub pots: Vec<Pot>,
}

impl DrawSetup {
    pub fn new<T, H>(
        registry: &NationRegistry,
        team_names: &[T],
        host_names: &[H],
        number_of_groups: usize,
        format: DrawFormat,
    ) -> Result<Self>
    where
        T: AsRef<str>,
        H: AsRef<str>,
    {
        if number_of_groups == 0 {
            return Err(anyhow!("a draw needs at least one group"));
        }
        if number_of_groups > MAX_GROUPS {
            return Err(anyhow!(
                "at most {MAX_GROUPS} groups are supported, got {number_of_groups}"
            ));
        }

        let mut teams = registry.teams_for(team_names.iter().map(|n| n.as_ref()))?;
        {
            let mut seen = HashSet::new();
            for team in &teams {
                if !seen.insert(team.name.as_str()) {
                    return Err(anyhow!("{} is listed more than once", team.name));
                }
            }
        }

        for (idx, host) in host_names.iter().enumerate() {
            let host = host.as_ref();
            let Some(team) = teams.iter_mut().find(|t| t.name == host) else {
                return Err(anyhow!("host {host} is not in the team list"));
            };
            // Hosts past the table are drawn from their pot like any other team.
            team.is_host = idx < MAX_HOSTS;
        }

        let sorted = pots::sort_by_rank_tier(&teams, format);
        let pots = pots::allocate_pots(&sorted, number_of_groups);
        Ok(Self {
            format,
            number_of_groups,
            pots,
        })
    }

    pub fn team_count(&self) -> usize {
        self.pots.iter().map(Pot::len).sum()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Team> {
        self.pots.iter().flat_map(|p| p.teams.iter()).filter(|t| t.is_host)
    }

    pub fn empty_groups(&self) -> Vec<Group> {
        pots::empty_groups(self.number_of_groups, self.pots.len())
    }

    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> DrawOutcome {
        match self.format {
            DrawFormat::Standard => perform_standard_draw(&self.pots, self.empty_groups(), rng),
            DrawFormat::Championship => {
                perform_championship_draw(&self.pots, self.empty_groups(), rng)
            }
        }
    }
}

/// Nominal group letters for `host_count` hosts, after fallback. Hosts past
/// the sixth get no letter.
pub fn host_group_letters(host_count: usize, groups: &[Group]) -> Vec<String> {
    let exists = |letter: &str| groups.iter().any(|g| g.name == letter);
    HOST_GROUP_TABLE
        .iter()
        .take(host_count)
        .map(|&(nominal, fallback)| {
            if exists(nominal) {
                nominal.to_string()
            } else {
                fallback.to_string()
            }
        })
        .collect()
}

/// Places every host in its table group at the position of the pot it was
/// seeded into. A host whose table group is taken at that position goes to
/// the first group still open there.
pub fn place_hosts(pots: &[Pot], groups: &mut [Group]) {
    let hosts: Vec<(usize, &Team)> = pots
        .iter()
        .enumerate()
        .flat_map(|(pos, pot)| pot.teams.iter().filter(|t| t.is_host).map(move |t| (pos, t)))
        .collect();
    let letters = host_group_letters(hosts.len(), groups);

    for ((pos, team), letter) in hosts.into_iter().zip(letters) {
        let target = groups
            .iter()
            .position(|g| g.name == letter && g.is_open_at(pos))
            .or_else(|| groups.iter().position(|g| g.is_open_at(pos)));
        if let Some(idx) = target {
            groups[idx].place(pos, team.clone());
        }
    }
}

/// Hosts first, then each pot shuffled and dealt to the groups still open at
/// that pot's position. A short pot prefers groups without a host seeded in
/// that same pot, or spreads evenly over all open groups when there are too
/// few of those.
pub fn perform_standard_draw<R: Rng + ?Sized>(
    pots: &[Pot],
    empty_groups: Vec<Group>,
    rng: &mut R,
) -> DrawOutcome {
    let mut groups = empty_groups;
    place_hosts(pots, &mut groups);

    for (pos, pot) in pots.iter().enumerate() {
        let mut teams = unplaced_teams(pot, &groups);
        if teams.is_empty() {
            continue;
        }
        teams.shuffle(rng);

        let open = open_groups(&groups, pos);
        let targets = if teams.len() < groups.len() {
            let host_groups = pot_host_groups(pot, &groups);
            short_pot_targets(&open, &host_groups, teams.len(), rng)
        } else {
            open
        };

        for (team, g) in teams.into_iter().zip(targets) {
            groups[g].place(pos, team);
        }
    }

    DrawOutcome {
        success: true,
        groups,
        stats: DrawStats::default(),
    }
}

/// Hosts, then Pot 1 dealt freely, then every later pot solved by bounded
/// backtracking. If the search fails the result keeps only hosts and Pot 1.
pub fn perform_championship_draw<R: Rng + ?Sized>(
    pots: &[Pot],
    empty_groups: Vec<Group>,
    rng: &mut R,
) -> DrawOutcome {
    let mut groups = empty_groups;
    place_hosts(pots, &mut groups);

    if let Some(first) = pots.first() {
        let mut teams = unplaced_teams(first, &groups);
        teams.shuffle(rng);
        let open = open_groups(&groups, 0);
        for (team, g) in teams.into_iter().zip(open) {
            groups[g].place(0, team);
        }
    }

    let partial = groups.clone();
    let remaining: Vec<(usize, Vec<Team>)> = pots
        .iter()
        .enumerate()
        .skip(1)
        .map(|(pos, pot)| (pos, unplaced_teams(pot, &groups)))
        .collect();

    let mut stats = DrawStats::default();
    if assign_remaining_pots(&remaining, 0, &mut groups, rng, &mut stats) {
        DrawOutcome {
            success: true,
            groups,
            stats,
        }
    } else {
        DrawOutcome {
            success: false,
            groups: partial,
            stats,
        }
    }
}

fn assign_remaining_pots<R: Rng + ?Sized>(
    pots: &[(usize, Vec<Team>)],
    index: usize,
    groups: &mut [Group],
    rng: &mut R,
    stats: &mut DrawStats,
) -> bool {
    let Some((pos, teams)) = pots.get(index) else {
        return true;
    };
    if teams.is_empty() {
        return assign_remaining_pots(pots, index + 1, groups, rng, stats);
    }

    let attempts = (teams.len() * ORDERINGS_PER_TEAM).min(MAX_ORDERINGS_PER_POT);
    let mut ordering = teams.clone();
    for _ in 0..attempts {
        ordering.shuffle(rng);
        stats.orderings_tried += 1;

        let mut placed = Vec::with_capacity(ordering.len());
        if !place_pot(&ordering, *pos, groups, &mut placed) {
            continue;
        }
        if assign_remaining_pots(pots, index + 1, groups, rng, stats) {
            return true;
        }
        for g in placed {
            groups[g].clear(*pos);
        }
        stats.pots_backtracked += 1;
    }
    false
}

// Depth-first: each team tries the open groups in order, undoing on a dead end.
fn place_pot(teams: &[Team], position: usize, groups: &mut [Group], placed: &mut Vec<usize>) -> bool {
    let Some((team, rest)) = teams.split_first() else {
        return true;
    };
    for g in 0..groups.len() {
        if !groups[g].is_open_at(position) || !can_place(team, &groups[g]) {
            continue;
        }
        groups[g].place(position, team.clone());
        placed.push(g);
        if has_complete_matching(rest, position, groups) && place_pot(rest, position, groups, placed)
        {
            return true;
        }
        placed.pop();
        groups[g].clear(position);
    }
    false
}

/// Confederation rule: a non-UEFA team never shares a group with its own
/// confederation; UEFA teams may share, up to two per group.
pub fn can_place(team: &Team, group: &Group) -> bool {
    let mut uefa = 0usize;
    for other in group.teams() {
        if other.confed == Confederation::UEFA {
            uefa += 1;
        }
        if team.confed != Confederation::UEFA && other.confed == team.confed {
            return false;
        }
    }
    team.confed != Confederation::UEFA || uefa < UEFA_PER_GROUP
}

// Teams of one pot never share a group, so each remaining team's options
// depend only on what is already placed. A perfect matching between the
// remaining teams and their allowed open groups is then exactly "this branch
// can still finish"; it prunes dead branches without changing which placement
// the depth-first search returns first.
fn has_complete_matching(teams: &[Team], position: usize, groups: &[Group]) -> bool {
    let candidates: Vec<Vec<usize>> = teams
        .iter()
        .map(|team| {
            (0..groups.len())
                .filter(|&g| groups[g].is_open_at(position) && can_place(team, &groups[g]))
                .collect()
        })
        .collect();
    if candidates.iter().any(Vec::is_empty) {
        return false;
    }

    let mut owner: Vec<Option<usize>> = vec![None; groups.len()];
    for team in 0..teams.len() {
        let mut seen = vec![false; groups.len()];
        if !augment(team, &candidates, &mut owner, &mut seen) {
            return false;
        }
    }
    true
}

fn augment(
    team: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for &g in &candidates[team] {
        if seen[g] {
            continue;
        }
        seen[g] = true;
        let free = match owner[g] {
            None => true,
            Some(other) => augment(other, candidates, owner, seen),
        };
        if free {
            owner[g] = Some(team);
            return true;
        }
    }
    false
}

// Groups holding a host that was seeded in `pot`.
fn pot_host_groups(pot: &Pot, groups: &[Group]) -> HashSet<usize> {
    pot.teams
        .iter()
        .filter(|t| t.is_host)
        .filter_map(|host| groups.iter().position(|g| g.contains(&host.name)))
        .collect()
}

fn short_pot_targets<R: Rng + ?Sized>(
    open: &[usize],
    host_groups: &HashSet<usize>,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut preferred: Vec<usize> = open
        .iter()
        .copied()
        .filter(|g| !host_groups.contains(g))
        .collect();
    if preferred.len() >= count {
        preferred.shuffle(rng);
        preferred
    } else {
        spread(open, count)
    }
}

fn unplaced_teams(pot: &Pot, groups: &[Group]) -> Vec<Team> {
    pot.teams
        .iter()
        .filter(|t| !groups.iter().any(|g| g.contains(&t.name)))
        .cloned()
        .collect()
}

fn open_groups(groups: &[Group], position: usize) -> Vec<usize> {
    (0..groups.len())
        .filter(|&g| groups[g].is_open_at(position))
        .collect()
}

// `count` indices spaced evenly across `open`.
fn spread(open: &[usize], count: usize) -> Vec<usize> {
    if count == 0 || open.is_empty() {
        return Vec::new();
    }
    let count = count.min(open.len());
    (0..count).map(|i| open[i * open.len() / count]).collect()
}

/// Every filled slot, ordered by pot position; ties keep group order.
pub fn reveal_order(groups: &[Group]) -> Vec<Placement> {
    let mut out: Vec<Placement> = groups
        .iter()
        .flat_map(|g| {
            g.slots.iter().enumerate().filter_map(move |(position, slot)| {
                slot.as_ref().map(|team| Placement {
                    group: g.name.clone(),
                    position,
                    team: team.clone(),
                })
            })
        })
        .collect();
    out.sort_by_key(|p| p.position);
    out
}

/// Human-readable list of broken confederation rules and duplicate teams.
pub fn constraint_violations(groups: &[Group]) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for group in groups {
        let mut per_confed: HashMap<Confederation, usize> = HashMap::new();
        for team in group.teams() {
            *per_confed.entry(team.confed).or_insert(0) += 1;
            if let Some(first) = seen.insert(team.name.as_str(), group.name.as_str()) {
                out.push(format!(
                    "{} drawn into both group {first} and group {}",
                    team.name, group.name
                ));
            }
        }
        let mut confeds: Vec<_> = per_confed.into_iter().collect();
        confeds.sort_by_key(|(confed, _)| crate::state::confed_label(*confed));
        for (confed, count) in confeds {
            let limit = if confed == Confederation::UEFA {
                UEFA_PER_GROUP
            } else {
                1
            };
            if count > limit {
                out.push(format!(
                    "group {} has {count} {} teams",
                    group.name,
                    crate::state::confed_label(confed)
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn team(name: &str, confed: Confederation) -> Team {
        Team {
            name: name.to_string(),
            confed,
            ranking_pts: 1500.0,
            flag_code: String::new(),
            is_host: false,
            is_playoff_slot: false,
        }
    }

    #[test]
    fn host_letters_follow_table() {
        let groups = pots::empty_groups(12, 4);
        assert_eq!(host_group_letters(1, &groups), ["A"]);
        assert_eq!(host_group_letters(3, &groups), ["A", "B", "D"]);
        assert_eq!(
            host_group_letters(6, &groups),
            ["A", "B", "D", "F", "I", "J"]
        );
        assert_eq!(host_group_letters(9, &groups).len(), MAX_HOSTS);
    }

    #[test]
    fn host_letters_fall_back_for_small_draws() {
        let groups = pots::empty_groups(4, 8);
        assert_eq!(host_group_letters(4, &groups), ["A", "B", "D", "C"]);

        let groups = pots::empty_groups(8, 4);
        assert_eq!(
            host_group_letters(6, &groups),
            ["A", "B", "D", "F", "C", "E"]
        );
    }

    #[test]
    fn non_uefa_confederations_are_exclusive() {
        let mut group = Group::new("A", 4);
        group.place(0, team("Brazil", Confederation::CONMEBOL));
        assert!(!can_place(&team("Uruguay", Confederation::CONMEBOL), &group));
        assert!(can_place(&team("Japan", Confederation::AFC), &group));
        assert!(can_place(&team("Spain", Confederation::UEFA), &group));
    }

    #[test]
    fn uefa_is_capped_at_two() {
        let mut group = Group::new("A", 4);
        group.place(0, team("Spain", Confederation::UEFA));
        assert!(can_place(&team("Austria", Confederation::UEFA), &group));
        group.place(1, team("Austria", Confederation::UEFA));
        assert!(!can_place(&team("Norway", Confederation::UEFA), &group));
        assert!(can_place(&team("Ghana", Confederation::CAF), &group));
    }

    #[test]
    fn matching_detects_pigeonhole() {
        let mut groups = pots::empty_groups(3, 2);
        groups[0].place(0, team("Brazil", Confederation::CONMEBOL));
        groups[1].place(0, team("Argentina", Confederation::CONMEBOL));
        groups[2].place(0, team("Spain", Confederation::UEFA));
        let pot = [
            team("Uruguay", Confederation::CONMEBOL),
            team("Colombia", Confederation::CONMEBOL),
        ];
        assert!(!has_complete_matching(&pot, 1, &groups));
        assert!(has_complete_matching(&pot[..1], 1, &groups));
    }

    #[test]
    fn spread_is_even_and_distinct() {
        assert_eq!(spread(&[0, 1, 2, 3, 4, 5], 3), [0, 2, 4]);
        assert_eq!(spread(&[1, 3], 5), [1, 3]);
        assert!(spread(&[], 2).is_empty());
    }

    #[test]
    fn short_pot_skips_same_pot_host_groups() {
        let mut rng = StdRng::seed_from_u64(4);
        let host_groups: HashSet<usize> = [1].into_iter().collect();
        for _ in 0..20 {
            let mut targets = short_pot_targets(&[0, 1, 2, 3], &host_groups, 2, &mut rng);
            assert!(!targets.contains(&1));
            targets.sort_unstable();
            assert_eq!(targets, [0, 2, 3]);
        }
    }

    #[test]
    fn short_pot_spreads_when_too_few_groups_are_preferred() {
        let mut rng = StdRng::seed_from_u64(4);
        let host_groups: HashSet<usize> = [0, 1, 2, 3].into_iter().collect();
        let targets = short_pot_targets(&[0, 1, 2, 3, 4, 5], &host_groups, 3, &mut rng);
        assert_eq!(targets, [0, 2, 4]);
    }

    #[test]
    fn infeasible_pot_returns_partial_result() {
        let pots = vec![
            Pot {
                name: "Pot 1".to_string(),
                teams: vec![
                    team("Brazil", Confederation::CONMEBOL),
                    team("Argentina", Confederation::CONMEBOL),
                ],
            },
            Pot {
                name: "Pot 2".to_string(),
                teams: vec![
                    team("Uruguay", Confederation::CONMEBOL),
                    team("Japan", Confederation::AFC),
                ],
            },
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = perform_championship_draw(&pots, pots::empty_groups(2, 2), &mut rng);
        assert!(!outcome.success);
        assert_eq!(outcome.placed_count(), 2);
        assert!(outcome.groups.iter().all(|g| g.slots[1].is_none()));
        assert_eq!(outcome.stats.orderings_tried, 6);
    }
}
