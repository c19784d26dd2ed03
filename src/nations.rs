use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::state::{Confederation, Team};

const BUILTIN_NATIONS: &str = include_str!("../data/nations.json");

// Play-off winners are not known at draw time; their slots are named after the path.
const PLAYOFF_SLOT_PREFIXES: &[&str] = &["UEFA Path ", "IC Path "];

static BUILTIN: OnceCell<NationRegistry> = OnceCell::new();

/// On-disk shape of one registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationRecord {
    #[serde(rename = "rankingPts")]
    pub ranking_pts: f64,
    #[serde(rename = "confederationID")]
    pub confederation_id: String,
    #[serde(rename = "flagCode")]
    pub flag_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NationInfo {
    pub name: String,
    pub confed: Confederation,
    pub ranking_pts: f64,
    pub flag_code: String,
}

/// Read-only name -> ranking/confederation/flag lookup handed to pot allocation.
#[derive(Debug, Clone, Default)]
pub struct NationRegistry {
    nations: HashMap<String, NationInfo>,
}

impl NationRegistry {
    pub fn builtin() -> Result<&'static NationRegistry> {
        BUILTIN.get_or_try_init(|| {
            Self::from_json(BUILTIN_NATIONS).context("built-in nation registry is invalid")
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading nation registry {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let records: HashMap<String, NationRecord> =
            serde_json::from_str(raw).context("invalid nation registry json")?;
        let mut nations = HashMap::with_capacity(records.len());
        for (name, record) in records {
            let confed = Confederation::from_id(&record.confederation_id).ok_or_else(|| {
                anyhow!(
                    "{name}: unknown confederation '{}'",
                    record.confederation_id
                )
            })?;
            if !record.ranking_pts.is_finite() {
                return Err(anyhow!("{name}: ranking points must be finite"));
            }
            nations.insert(
                name.clone(),
                NationInfo {
                    name,
                    confed,
                    ranking_pts: record.ranking_pts,
                    flag_code: record.flag_code,
                },
            );
        }
        Ok(Self { nations })
    }

    pub fn get(&self, name: &str) -> Option<&NationInfo> {
        self.nations.get(name)
    }

    pub fn len(&self) -> usize {
        self.nations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nations.is_empty()
    }

    /// Fresh per-draw team value; host flag starts cleared.
    pub fn team(&self, name: &str) -> Option<Team> {
        self.get(name).map(|nation| Team {
            name: nation.name.clone(),
            confed: nation.confed,
            ranking_pts: nation.ranking_pts,
            flag_code: nation.flag_code.clone(),
            is_host: false,
            is_playoff_slot: is_playoff_slot(&nation.name),
        })
    }

    pub fn teams_for<I, S>(&self, names: I) -> Result<Vec<Team>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut teams = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.team(name) {
                Some(team) => teams.push(team),
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(anyhow!("unknown nations: {}", missing.join(", ")));
        }
        Ok(teams)
    }
}

pub fn is_playoff_slot(name: &str) -> bool {
    PLAYOFF_SLOT_PREFIXES.iter().any(|p| name.starts_with(p))
}
