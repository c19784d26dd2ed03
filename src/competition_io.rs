use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schedule::CompType;
use crate::state::Group;

/// A validated competition import: pre-drawn groups ready for scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionImport {
    pub comp_name: String,
    pub num_teams: u32,
    pub num_through: u32,
    pub comp_type: CompType,
    pub groups: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawExport {
    pub comp_name: String,
    pub num_teams: usize,
    pub num_through: u32,
    pub comp_type: CompType,
    pub groups: BTreeMap<String, Vec<String>>,
}

impl DrawExport {
    pub fn from_groups(comp_name: &str, num_through: u32, groups: &[Group]) -> Self {
        let groups: BTreeMap<String, Vec<String>> = groups
            .iter()
            .map(|g| (g.name.clone(), g.team_names()))
            .collect();
        let num_teams = groups.values().map(Vec::len).sum();
        Self {
            comp_name: comp_name.to_string(),
            num_teams,
            num_through,
            comp_type: CompType::GROUPKO,
            groups,
        }
    }
}

pub fn load_competition(path: &Path) -> Result<CompetitionImport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    parse_competition_json(&raw)
}

pub fn parse_competition_json(raw: &str) -> Result<CompetitionImport> {
    let v: Value = serde_json::from_str(raw.trim()).context("invalid competition json")?;
    if !v.is_object() {
        return Err(anyhow!("competition file must be a json object"));
    }

    let comp_name = v
        .get("compName")
        .ok_or_else(|| missing("compName"))?
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("field 'compName' must be a non-empty string"))?;
    let num_teams = count_field(&v, "numTeams")?;
    let num_through = count_field(&v, "numThrough")?;

    let comp_type_raw = v
        .get("compType")
        .ok_or_else(|| missing("compType"))?
        .as_str()
        .ok_or_else(|| anyhow!("field 'compType' must be a string"))?;
    let comp_type = CompType::parse(comp_type_raw)
        .ok_or_else(|| anyhow!("unsupported competition type '{comp_type_raw}'"))?;

    let groups_raw = v
        .get("groups")
        .ok_or_else(|| missing("groups"))?
        .as_object()
        .ok_or_else(|| anyhow!("field 'groups' must be an object"))?;
    let mut groups = BTreeMap::new();
    for (name, teams) in groups_raw {
        let arr = teams
            .as_array()
            .ok_or_else(|| anyhow!("group '{name}' must be an array of team names"))?;
        let mut out = Vec::with_capacity(arr.len());
        for team in arr {
            let team = team
                .as_str()
                .ok_or_else(|| anyhow!("group '{name}' contains a non-string team"))?;
            out.push(team.to_string());
        }
        groups.insert(name.clone(), out);
    }

    Ok(CompetitionImport {
        comp_name,
        num_teams,
        num_through,
        comp_type,
        groups,
    })
}

fn missing(field: &str) -> anyhow::Error {
    anyhow!("missing required field '{field}'")
}

// Numbers may arrive as json numbers or numeric strings.
fn count_field(v: &Value, field: &str) -> Result<u32> {
    let raw = v.get(field).ok_or_else(|| missing(field))?;
    let parsed = match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| anyhow!("field '{field}' must be a non-negative whole number"))
}

/// `{YYYYMMDDHHMMSS}-{competition}.json`; path separators in the name are replaced.
pub fn export_file_name(comp_name: &str, at: NaiveDateTime) -> String {
    let safe: String = comp_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}-{}.json", at.format("%Y%m%d%H%M%S"), safe)
}

pub fn write_draw_export(dir: &Path, export: &DrawExport, at: NaiveDateTime) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(export_file_name(&export.comp_name, at));
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(export).context("serialize draw export")?;
    fs::write(&tmp, json).context("write draw export")?;
    fs::rename(&tmp, &path).context("swap draw export")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn export_name_uses_compact_timestamp() {
        let at = NaiveDate::from_ymd_opt(2026, 6, 11)
            .and_then(|d| d.and_hms_opt(19, 5, 3))
            .expect("valid timestamp");
        assert_eq!(
            export_file_name("World Cup 2026", at),
            "20260611190503-World Cup 2026.json"
        );
        assert_eq!(export_file_name("A/B", at), "20260611190503-A_B.json");
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let raw = r#"{"compName":"Cup","numTeams":"4","numThrough":2,"compType":"GROUP","groups":{"A":["W","X","Y","Z"]}}"#;
        let import = parse_competition_json(raw).expect("valid import");
        assert_eq!(import.num_teams, 4);
        assert_eq!(import.comp_type, CompType::GROUP);
    }
}
