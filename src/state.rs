use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::competition_io::{self, CompetitionImport, DrawExport};
use crate::draw::{self, DrawOutcome, DrawSetup, Placement};
use crate::nations::NationRegistry;
use crate::presets::CompetitionPreset;
use crate::schedule::{self, CompType};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Confederation {
    AFC,
    CAF,
    CONCACAF,
    CONMEBOL,
    UEFA,
    OFC,
    // Inter-confederation play-off slot; behaves like any non-UEFA tag in the draw.
    Intercontinental,
}

impl Confederation {
    pub fn from_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AFC" => Some(Self::AFC),
            "CAF" => Some(Self::CAF),
            "CONCACAF" => Some(Self::CONCACAF),
            "CONMEBOL" => Some(Self::CONMEBOL),
            "UEFA" => Some(Self::UEFA),
            "OFC" => Some(Self::OFC),
            "ICP" | "INTERCONTINENTAL" => Some(Self::Intercontinental),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub confed: Confederation,
    pub ranking_pts: f64,
    pub flag_code: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_playoff_slot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pot {
    pub name: String,
    pub teams: Vec<Team>,
}

impl Pot {
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// A group's slots are indexed by pot position: slot 0 holds the Pot 1 team,
/// slot 1 the Pot 2 team, and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub slots: Vec<Option<Team>>,
}

impl Group {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            slots: vec![None; capacity],
        }
    }

    pub fn is_open_at(&self, position: usize) -> bool {
        matches!(self.slots.get(position), Some(None))
    }

    pub fn place(&mut self, position: usize, team: Team) {
        if let Some(slot) = self.slots.get_mut(position) {
            *slot = Some(team);
        }
    }

    pub fn clear(&mut self, position: usize) {
        if let Some(slot) = self.slots.get_mut(position) {
            *slot = None;
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.slots.iter().flatten()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams().any(|t| t.name == name)
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams().map(|t| t.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub home: String,
    pub away: String,
}

impl Match {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            home: self.away.clone(),
            away: self.home.clone(),
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }
}

/// Matchday (1-indexed) to that matchday's fixtures.
pub type GroupSchedule = BTreeMap<u32, Vec<Match>>;
/// Group name to that group's schedule.
pub type CompetitionSchedule = BTreeMap<String, GroupSchedule>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawFormat {
    /// Hosts pre-placed, every other pot dealt at random.
    Standard,
    /// World Cup style: confederation exclusivity and a UEFA cap, solved by backtracking.
    Championship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Groups,
    Schedule,
}

/// Display copy of a group; imported competitions carry names only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardGroup {
    pub name: String,
    pub slots: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub registry: NationRegistry,
    pub settings: Settings,
    pub comp_name: String,
    pub comp_type: CompType,
    pub num_through: u32,
    pub setup: Option<DrawSetup>,
    pub outcome: Option<DrawOutcome>,
    pub board: Vec<BoardGroup>,
    pub playback: VecDeque<Placement>,
    pub last_reveal: Option<Instant>,
    pub final_groups: BTreeMap<String, Vec<String>>,
    pub schedule: CompetitionSchedule,
    pub home_away: bool,
    pub matchday: u32,
    pub last_export: Option<PathBuf>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(registry: NationRegistry, settings: Settings) -> Self {
        let home_away = settings.force_home_away;
        Self {
            screen: Screen::Groups,
            registry,
            settings,
            comp_name: String::new(),
            comp_type: CompType::GROUPKO,
            num_through: 0,
            setup: None,
            outcome: None,
            board: Vec::new(),
            playback: VecDeque::new(),
            last_reveal: None,
            final_groups: BTreeMap::new(),
            schedule: CompetitionSchedule::new(),
            home_away,
            matchday: 0,
            last_export: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn load_preset(&mut self, preset: &CompetitionPreset) -> Result<()> {
        let setup = match preset.setup(&self.registry) {
            Ok(setup) => setup,
            Err(err) => {
                self.push_log(format!("[WARN] Preset {} rejected: {err:#}", preset.id));
                return Err(err);
            }
        };
        self.comp_name = preset.name.to_string();
        self.comp_type = CompType::GROUPKO;
        self.num_through = preset.num_through;
        self.board = empty_board(&setup.empty_groups());
        self.push_log(format!(
            "[INFO] Loaded {}: {} teams, {} pots, {} groups",
            preset.name,
            setup.team_count(),
            setup.pots.len(),
            setup.number_of_groups
        ));
        self.setup = Some(setup);
        self.reset_results();
        Ok(())
    }

    /// Replaces the current competition with pre-drawn groups from an import file.
    pub fn apply_import(&mut self, import: CompetitionImport) {
        self.board = import
            .groups
            .iter()
            .map(|(name, teams)| BoardGroup {
                name: name.clone(),
                slots: teams.iter().cloned().map(Some).collect(),
            })
            .collect();
        self.comp_name = import.comp_name;
        self.comp_type = import.comp_type;
        self.num_through = import.num_through;
        self.setup = None;
        self.reset_results();
        self.home_away = schedule::requires_home_and_away(self.comp_type.as_str())
            || self.settings.force_home_away;
        self.final_groups = import.groups;
        self.rebuild_schedule();
        self.push_log(format!(
            "[INFO] Imported {} ({} groups, {} teams, {})",
            self.comp_name,
            self.final_groups.len(),
            import.num_teams,
            self.comp_type.as_str()
        ));
    }

    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        match competition_io::load_competition(path) {
            Ok(import) => {
                self.apply_import(import);
                Ok(())
            }
            Err(err) => {
                self.push_log(format!("[WARN] Import failed: {err:#}"));
                Err(err)
            }
        }
    }

    pub fn is_revealing(&self) -> bool {
        !self.playback.is_empty()
    }

    /// Runs the draw synchronously, then queues every placement for playback.
    pub fn start_draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let Some(setup) = self.setup.as_ref() else {
            self.push_log("[INFO] Imported competitions are already drawn");
            return Err(anyhow!("no draw setup loaded"));
        };
        let outcome = setup.run(rng);
        let board = empty_board(&setup.empty_groups());
        let format = setup.format;

        self.reset_results();
        self.board = board;
        self.playback = draw::reveal_order(&outcome.groups).into();
        if outcome.success {
            self.push_log(format!(
                "[INFO] {format:?} draw complete: {} teams placed ({} orderings tried, {} pot backtracks)",
                outcome.placed_count(),
                outcome.stats.orderings_tried,
                outcome.stats.pots_backtracked
            ));
        } else {
            self.push_log(format!(
                "[WARN] {format:?} draw found no valid placement after {} orderings; showing hosts and Pot 1 only",
                outcome.stats.orderings_tried
            ));
        }
        self.outcome = Some(outcome);
        if self.settings.reveal_delay.is_zero() {
            self.skip_playback();
        }
        Ok(())
    }

    /// Reveals at most one queued placement once the configured delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.playback.is_empty() {
            return;
        }
        let due = self
            .last_reveal
            .map(|t| now.saturating_duration_since(t) >= self.settings.reveal_delay)
            .unwrap_or(true);
        if !due {
            return;
        }
        if let Some(placement) = self.playback.pop_front() {
            self.reveal(&placement);
        }
        self.last_reveal = Some(now);
        if self.playback.is_empty() {
            self.finish_draw();
        }
    }

    pub fn skip_playback(&mut self) {
        while let Some(placement) = self.playback.pop_front() {
            self.reveal(&placement);
        }
        self.finish_draw();
    }

    fn reveal(&mut self, placement: &Placement) {
        if let Some(group) = self.board.iter_mut().find(|g| g.name == placement.group)
            && let Some(slot) = group.slots.get_mut(placement.position)
        {
            *slot = Some(placement.team.name.clone());
        }
    }

    fn finish_draw(&mut self) {
        let Some(outcome) = self.outcome.as_ref() else {
            return;
        };
        self.final_groups = outcome.team_names();
        self.last_reveal = None;
        self.rebuild_schedule();
    }

    pub fn reset_draw(&mut self) {
        let Some(setup) = self.setup.as_ref() else {
            return;
        };
        self.board = empty_board(&setup.empty_groups());
        self.reset_results();
        self.push_log("[INFO] Draw reset");
    }

    fn reset_results(&mut self) {
        self.outcome = None;
        self.playback.clear();
        self.last_reveal = None;
        self.final_groups.clear();
        self.schedule.clear();
        self.matchday = 0;
        self.last_export = None;
    }

    pub fn rebuild_schedule(&mut self) {
        self.schedule = schedule::schedule_competition(&self.final_groups, self.home_away);
        let total = schedule::total_matchdays(&self.schedule);
        self.matchday = if total == 0 {
            0
        } else {
            self.matchday.clamp(1, total)
        };
    }

    pub fn toggle_home_away(&mut self) {
        self.home_away = !self.home_away;
        self.rebuild_schedule();
        let label = if self.home_away { "home and away" } else { "single round" };
        self.push_log(format!("[INFO] Schedule mode: {label}"));
    }

    pub fn total_matchdays(&self) -> u32 {
        schedule::total_matchdays(&self.schedule)
    }

    pub fn next_matchday(&mut self) {
        let total = self.total_matchdays();
        if total > 0 {
            self.matchday = (self.matchday + 1).min(total);
        }
    }

    pub fn prev_matchday(&mut self) {
        if self.matchday > 1 {
            self.matchday -= 1;
        }
    }

    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Groups => Screen::Schedule,
            Screen::Schedule => Screen::Groups,
        };
    }

    pub fn export_draw(&mut self, at: NaiveDateTime) -> Result<PathBuf> {
        if self.outcome.is_none() || self.is_revealing() {
            self.push_log("[INFO] Nothing drawn to export yet");
            return Err(anyhow!("no completed draw"));
        }
        let Some(outcome) = self.outcome.as_ref() else {
            return Err(anyhow!("no completed draw"));
        };
        let export = DrawExport::from_groups(&self.comp_name, self.num_through, &outcome.groups);
        let dir = self.settings.export_dir.clone();
        match competition_io::write_draw_export(&dir, &export, at)
            .with_context(|| format!("export to {}", dir.display()))
        {
            Ok(path) => {
                self.push_log(format!("[INFO] Exported draw to {}", path.display()));
                self.last_export = Some(path.clone());
                Ok(path)
            }
            Err(err) => {
                self.push_log(format!("[WARN] Export failed: {err:#}"));
                Err(err)
            }
        }
    }
}

fn empty_board(groups: &[Group]) -> Vec<BoardGroup> {
    groups
        .iter()
        .map(|g| BoardGroup {
            name: g.name.clone(),
            slots: vec![None; g.slots.len()],
        })
        .collect()
}

pub fn confed_label(confed: Confederation) -> &'static str {
    match confed {
        Confederation::AFC => "AFC",
        Confederation::CAF => "CAF",
        Confederation::CONCACAF => "CONCACAF",
        Confederation::CONMEBOL => "CONMEBOL",
        Confederation::UEFA => "UEFA",
        Confederation::OFC => "OFC",
        Confederation::Intercontinental => "ICP",
    }
}

pub fn format_label(format: DrawFormat) -> &'static str {
    match format {
        DrawFormat::Standard => "Standard",
        DrawFormat::Championship => "Championship",
    }
}
