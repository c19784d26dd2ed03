use crate::state::{DrawFormat, Group, Pot, Team};

/// Orders a draw pool into seeding tiers: hosts, regular teams, then play-off
/// slots. The play-off tier only exists for the championship format; elsewhere
/// those slots seed by ranking like everyone else. Each tier is sorted by
/// descending ranking points, stable for ties.
pub fn sort_by_rank_tier(teams: &[Team], format: DrawFormat) -> Vec<Team> {
    let mut hosts = Vec::new();
    let mut regular = Vec::new();
    let mut playoff = Vec::new();

    for team in teams {
        if team.is_host {
            hosts.push(team.clone());
        } else if format == DrawFormat::Championship && team.is_playoff_slot {
            playoff.push(team.clone());
        } else {
            regular.push(team.clone());
        }
    }

    for tier in [&mut hosts, &mut regular, &mut playoff] {
        tier.sort_by(|a, b| b.ranking_pts.total_cmp(&a.ranking_pts));
    }

    let mut out = hosts;
    out.extend(regular);
    out.extend(playoff);
    out
}

/// Chunks a tier-sorted list into pots of `number_of_groups` teams; the last
/// pot keeps the remainder.
pub fn allocate_pots(sorted: &[Team], number_of_groups: usize) -> Vec<Pot> {
    if number_of_groups == 0 {
        return Vec::new();
    }
    sorted
        .chunks(number_of_groups)
        .enumerate()
        .map(|(idx, chunk)| Pot {
            name: format!("Pot {}", idx + 1),
            teams: chunk.to_vec(),
        })
        .collect()
}

pub fn empty_groups(number_of_groups: usize, pot_count: usize) -> Vec<Group> {
    (0..number_of_groups)
        .map(|idx| Group::new(group_letter(idx), pot_count))
        .collect()
}

pub fn group_letter(index: usize) -> String {
    char::from(b'A' + (index % 26) as u8).to_string()
}
