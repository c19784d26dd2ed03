use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

use wc26_draw::competition_io::parse_competition_json;
use wc26_draw::presets::{self, find_preset};
use wc26_draw::settings::Settings;
use wc26_draw::state::{AppState, Screen};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn app_with(settings: Settings) -> AppState {
    let registry = settings.load_registry().expect("registry");
    AppState::new(registry, settings)
}

fn instant_app() -> AppState {
    app_with(Settings {
        reveal_delay: Duration::ZERO,
        export_dir: std::env::temp_dir().join(format!("wc26_draw_state_{}", std::process::id())),
        ..Settings::default()
    })
}

#[test]
fn euro_draw_builds_schedule() {
    let mut app = instant_app();
    app.load_preset(find_preset("euro").expect("euro")).expect("loads");
    assert_eq!(app.board.len(), 6);
    assert!(app.board.iter().all(|g| g.slots.iter().all(Option::is_none)));

    app.start_draw(&mut StdRng::seed_from_u64(5)).expect("draw runs");
    assert!(!app.is_revealing());
    assert!(app.outcome.as_ref().is_some_and(|o| o.success));
    assert_eq!(app.final_groups.len(), 6);
    assert!(app.board.iter().all(|g| g.slots.iter().all(Option::is_some)));
    assert_eq!(app.total_matchdays(), 3);
    assert_eq!(app.matchday, 1);

    app.toggle_home_away();
    assert_eq!(app.total_matchdays(), 6);
    app.next_matchday();
    app.next_matchday();
    assert_eq!(app.matchday, 3);
    app.toggle_home_away();
    assert_eq!(app.matchday, 3);
    app.next_matchday();
    assert_eq!(app.matchday, 3);
    app.prev_matchday();
    assert_eq!(app.matchday, 2);
}

#[test]
fn reveal_is_paced_by_delay() {
    let mut app = app_with(Settings {
        reveal_delay: Duration::from_millis(100),
        ..Settings::default()
    });
    app.load_preset(find_preset("euro").expect("euro")).expect("loads");
    app.start_draw(&mut StdRng::seed_from_u64(9)).expect("draw runs");
    assert!(app.is_revealing());
    assert_eq!(app.playback.len(), 24);

    let filled = |app: &AppState| {
        app.board
            .iter()
            .map(|g| g.slots.iter().filter(|s| s.is_some()).count())
            .sum::<usize>()
    };
    let start = Instant::now();
    app.tick(start);
    assert_eq!(filled(&app), 1);
    app.tick(start + Duration::from_millis(50));
    assert_eq!(filled(&app), 1);
    app.tick(start + Duration::from_millis(100));
    assert_eq!(filled(&app), 2);
    assert!(app.final_groups.is_empty());

    app.skip_playback();
    assert!(!app.is_revealing());
    assert_eq!(filled(&app), 24);
    assert_eq!(app.final_groups.len(), 6);
}

#[test]
fn reset_clears_results_but_keeps_setup() {
    let mut app = instant_app();
    app.load_preset(find_preset("euro").expect("euro")).expect("loads");
    app.start_draw(&mut StdRng::seed_from_u64(1)).expect("draw runs");
    app.reset_draw();
    assert!(app.outcome.is_none());
    assert!(app.schedule.is_empty());
    assert_eq!(app.matchday, 0);
    assert!(app.setup.is_some());
    assert!(app.board.iter().all(|g| g.slots.iter().all(Option::is_none)));
}

#[test]
fn import_switches_to_home_and_away() {
    let mut app = instant_app();
    app.import_file(&fixture_path("groupha_competition.json")).expect("imports");
    assert!(app.home_away);
    assert!(app.setup.is_none());
    assert_eq!(app.comp_name, "Nordic Cup");
    assert_eq!(app.total_matchdays(), 6);
    assert!(app.start_draw(&mut StdRng::seed_from_u64(1)).is_err());

    app.import_file(&fixture_path("odd_group_competition.json")).expect("imports");
    assert!(!app.home_away);
    assert_eq!(app.total_matchdays(), 5);
}

#[test]
fn failed_import_keeps_previous_competition() {
    let mut app = instant_app();
    app.load_preset(find_preset("wc2026").expect("wc2026")).expect("loads");
    assert!(app.import_file(&fixture_path("bad_comp_type.json")).is_err());
    assert_eq!(app.comp_name, "World Cup 2026");
    assert!(app.setup.is_some());
    assert!(app.logs.iter().any(|l| l.starts_with("[WARN] Import failed")));
}

#[test]
fn export_requires_finished_draw() {
    let mut app = instant_app();
    app.load_preset(find_preset("euro").expect("euro")).expect("loads");
    let at = NaiveDate::from_ymd_opt(2026, 6, 1)
        .and_then(|d| d.and_hms_opt(8, 30, 0))
        .expect("valid timestamp");
    assert!(app.export_draw(at).is_err());

    app.start_draw(&mut StdRng::seed_from_u64(2)).expect("draw runs");
    let path = app.export_draw(at).expect("exported");
    let raw = std::fs::read_to_string(&path).expect("readable");
    let import = parse_competition_json(&raw).expect("importable");
    assert_eq!(import.num_teams, 24);
    assert_eq!(import.num_through, 16);
    assert_eq!(import.groups, app.final_groups);
    let _ = std::fs::remove_file(path);
}

#[test]
fn screen_and_preset_cycle() {
    let mut app = instant_app();
    assert_eq!(app.screen, Screen::Groups);
    app.toggle_screen();
    assert_eq!(app.screen, Screen::Schedule);
    app.toggle_screen();
    assert_eq!(app.screen, Screen::Groups);

    assert_eq!(presets::next_preset("wc2026").id, "wc2030");
    assert_eq!(presets::next_preset("euro").id, "wc2026");
    assert_eq!(presets::next_preset("unknown").id, "wc2026");
}

#[test]
fn every_preset_loads() {
    let mut app = instant_app();
    for preset in presets::PRESETS {
        app.load_preset(preset).expect("preset loads");
        assert_eq!(app.board.len(), preset.number_of_groups);
    }
}

#[test]
fn logs_are_bounded() {
    let mut app = instant_app();
    for i in 0..250 {
        app.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(app.logs.len(), 200);
    assert_eq!(app.logs.front().map(String::as_str), Some("[INFO] line 50"));
}
