use anyhow::Result;

use crate::draw::DrawSetup;
use crate::nations::NationRegistry;
use crate::state::DrawFormat;

#[derive(Debug, Clone, Copy)]
pub struct CompetitionPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub format: DrawFormat,
    pub number_of_groups: usize,
    pub num_through: u32,
    pub hosts: &'static [&'static str],
    pub teams: &'static [&'static str],
}

impl CompetitionPreset {
    pub fn setup(&self, registry: &NationRegistry) -> Result<DrawSetup> {
        DrawSetup::new(
            registry,
            self.teams,
            self.hosts,
            self.number_of_groups,
            self.format,
        )
    }
}

const WC2026_TEAMS: &[&str] = &[
    "Canada",
    "Mexico",
    "United States",
    "Australia",
    "IR Iran",
    "Japan",
    "Jordan",
    "Korea Republic",
    "Qatar",
    "Saudi Arabia",
    "Uzbekistan",
    "Algeria",
    "Cabo Verde",
    "Cote d'Ivoire",
    "Egypt",
    "Ghana",
    "Morocco",
    "Senegal",
    "South Africa",
    "Tunisia",
    "Curacao",
    "Haiti",
    "Panama",
    "Argentina",
    "Brazil",
    "Colombia",
    "Ecuador",
    "Paraguay",
    "Uruguay",
    "New Zealand",
    "Austria",
    "Belgium",
    "Croatia",
    "England",
    "France",
    "Germany",
    "Netherlands",
    "Norway",
    "Portugal",
    "Scotland",
    "Spain",
    "Switzerland",
    "UEFA Path A",
    "UEFA Path B",
    "UEFA Path C",
    "UEFA Path D",
    "IC Path 1",
    "IC Path 2",
];

const WC2030_TEAMS: &[&str] = &[
    "Spain",
    "Portugal",
    "Morocco",
    "Argentina",
    "Uruguay",
    "Paraguay",
    "Canada",
    "Mexico",
    "United States",
    "Australia",
    "IR Iran",
    "Japan",
    "Jordan",
    "Korea Republic",
    "Qatar",
    "Saudi Arabia",
    "Uzbekistan",
    "Algeria",
    "Cabo Verde",
    "Cote d'Ivoire",
    "Egypt",
    "Ghana",
    "Senegal",
    "South Africa",
    "Tunisia",
    "Curacao",
    "Haiti",
    "Panama",
    "Brazil",
    "Colombia",
    "Ecuador",
    "New Zealand",
    "Austria",
    "Belgium",
    "Croatia",
    "England",
    "France",
    "Germany",
    "Netherlands",
    "Norway",
    "Scotland",
    "Switzerland",
    "Italy",
    "Denmark",
    "Turkiye",
    "Ukraine",
    "Poland",
    "Wales",
];

const EURO_TEAMS: &[&str] = &[
    "Germany",
    "Spain",
    "France",
    "England",
    "Portugal",
    "Netherlands",
    "Belgium",
    "Croatia",
    "Italy",
    "Switzerland",
    "Denmark",
    "Austria",
    "Turkiye",
    "Ukraine",
    "Norway",
    "Poland",
    "Hungary",
    "Wales",
    "Scotland",
    "Greece",
    "Serbia",
    "Czechia",
    "Slovakia",
    "Romania",
];

pub const PRESETS: &[CompetitionPreset] = &[
    CompetitionPreset {
        id: "wc2026",
        name: "World Cup 2026",
        format: DrawFormat::Championship,
        number_of_groups: 12,
        num_through: 32,
        hosts: &["Canada", "Mexico", "United States"],
        teams: WC2026_TEAMS,
    },
    CompetitionPreset {
        id: "wc2030",
        name: "World Cup 2030",
        format: DrawFormat::Championship,
        number_of_groups: 12,
        num_through: 32,
        hosts: &[
            "Spain",
            "Portugal",
            "Morocco",
            "Argentina",
            "Uruguay",
            "Paraguay",
        ],
        teams: WC2030_TEAMS,
    },
    CompetitionPreset {
        id: "euro",
        name: "European Championship",
        format: DrawFormat::Standard,
        number_of_groups: 6,
        num_through: 16,
        hosts: &["Germany"],
        teams: EURO_TEAMS,
    },
];

pub fn find_preset(id: &str) -> Option<&'static CompetitionPreset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Preset after `id` in [`PRESETS`], wrapping around.
pub fn next_preset(id: &str) -> &'static CompetitionPreset {
    let idx = PRESETS.iter().position(|p| p.id == id).map_or(0, |i| i + 1);
    &PRESETS[idx % PRESETS.len()]
}
