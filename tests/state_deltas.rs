use toplines_terminal::config::Config;
use toplines_terminal::filters::FilterPrefs;
use toplines_terminal::provider::handle_command;
use toplines_terminal::records::PlayerReport;
use toplines_terminal::source::{Gender, StaticSource};
use toplines_terminal::state::{AppState, Delta, ProviderCommand, Screen, apply_delta};

const REPORT: &str = r#"{"meta":{"v":1},"players":[
    {"player_id":1,"name":"One","recruit_rank":4,"team_conf":"ACC"},
    {"player_id":2,"name":"Two","team_conf":"SEC"}
]}"#;

fn app() -> AppState {
    let mut state = AppState::new(&Config::default(), FilterPrefs::default());
    state.report_date = "2025-12-20".to_string();
    state.schedule_date = "2025-12-20".to_string();
    state
}

#[test]
fn screens_route_by_path() {
    assert_eq!(Screen::from_path("/"), Some(Screen::Daily));
    assert_eq!(Screen::from_path("/schedule/"), Some(Screen::Schedule));
    assert_eq!(Screen::from_path("/rankings"), Some(Screen::Rankings));
    assert_eq!(Screen::from_path("/voting"), Some(Screen::Voting));
    assert_eq!(Screen::from_path("/glossary"), Some(Screen::Glossary));
    assert_eq!(Screen::from_path("/nope"), None);
}

#[test]
fn daily_screen_requests_report_and_conferences() {
    let mut state = app();
    let cmds = state.load_commands(false);
    assert_eq!(cmds.len(), 2);
    assert!(matches!(
        &cmds[0],
        ProviderCommand::LoadDaily { date, days: 3, gender: Gender::Men, .. } if date == "2025-12-20"
    ));
    assert!(matches!(cmds[1], ProviderCommand::LoadConferences { .. }));
    assert!(state.daily.loading);
    assert!(state.conferences.loading);
}

#[test]
fn provider_results_flow_into_state() {
    let source = StaticSource::new().with_json("men/daily/2025-12-20_3d.json", REPORT);
    let mut state = app();
    for cmd in state.load_commands(false) {
        let delta = handle_command(&source, "http://localhost:8000", cmd);
        apply_delta(&mut state, delta);
    }

    assert!(!state.daily.loading);
    assert_eq!(state.daily.data.players.len(), 2);
    assert!(!state.conferences.loading);
    assert_eq!(state.conferences.error.as_deref(), Some("HTTP 404"));
    assert!(
        state
            .logs
            .iter()
            .any(|l| l.starts_with("[WARN] Error loading conferences"))
    );
    assert_eq!(state.visible_players().len(), 2);
}

#[test]
fn stale_completion_is_dropped() {
    let mut state = app();
    let first = state.daily.begin();
    let second = state.daily.begin();

    apply_delta(
        &mut state,
        Delta::DailyLoaded {
            ticket: second,
            result: Ok(PlayerReport::default()),
        },
    );
    assert!(!state.daily.loading);

    apply_delta(
        &mut state,
        Delta::DailyLoaded {
            ticket: first,
            result: Err("HTTP 500".to_string()),
        },
    );
    assert!(state.daily.error.is_none());
    assert!(state.logs.iter().any(|l| l.contains("Dropped stale daily report")));
    assert!(!state.logs.iter().any(|l| l.contains("HTTP 500")));
}

#[test]
fn schedule_warnings_are_logged() {
    let schedule = r#"{"games":[{"game_id":9,"featured_players":[{"player_id":1}]}]}"#;
    let source = StaticSource::new()
        .with_json("men/schedule/2025-12-20.json", schedule)
        .with_json("men/rankings/2025-12-20.json", REPORT);
    let mut state = app();
    state.set_screen(Screen::Schedule);
    for cmd in state.load_commands(false) {
        let delta = handle_command(&source, "http://localhost:8000", cmd);
        apply_delta(&mut state, delta);
    }

    assert_eq!(state.schedule.data.games.len(), 1);
    assert!(state.logs.iter().any(|l| l.contains("Toplines unavailable")));

    let merged = state.selected_game_players();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].player.name.as_deref(), Some("One"));
    assert_eq!(merged[0].display_rank, Some(1));
    assert!(state.selected_game_toplines().is_empty());
}

#[test]
fn shifting_dates_follows_the_screen() {
    let mut state = app();
    assert!(state.shift_date(1));
    assert_eq!(state.report_date, "2025-12-21");
    assert_eq!(state.schedule_date, "2025-12-20");

    state.set_screen(Screen::Schedule);
    assert!(state.shift_date(-20));
    assert_eq!(state.schedule_date, "2025-11-30");

    state.set_screen(Screen::Glossary);
    assert!(!state.shift_date(1));
}

#[test]
fn voting_pairs_rotate_after_a_recorded_vote() {
    let mut state = app();
    let ticket = state.rankings.begin();
    let report = toplines_terminal::report_fetch::parse_player_report_json(REPORT).unwrap();
    apply_delta(
        &mut state,
        Delta::RankingsLoaded {
            ticket,
            result: Ok(report),
        },
    );

    let (a, b) = state.voting_pair().expect("two ranked players");
    assert_eq!((a.player_id, b.player_id), (Some(1), Some(2)));

    let cmd = state.vote_for(false).expect("vote command");
    match cmd {
        ProviderCommand::SubmitVote { vote } => {
            assert_eq!(vote.winner_id, 2);
            assert_eq!(vote.gender, "men");
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert!(state.voting.submitting);
    assert!(state.vote_for(true).is_none());

    apply_delta(
        &mut state,
        Delta::VoteSubmitted(Err("HTTP 429: Too many votes".to_string())),
    );
    assert!(!state.voting.submitting);
    assert_eq!(state.voting.round, 0);
    assert!(
        state
            .voting
            .last_result
            .as_deref()
            .is_some_and(|r| r.contains("429"))
    );
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = app();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
}

#[test]
fn switching_gender_discards_other_partition() {
    let mut state = app();
    let ProviderCommand::LoadRankings { ticket, .. } = state.begin_rankings() else {
        panic!("expected a rankings load");
    };
    let report: PlayerReport = serde_json::from_str(REPORT).unwrap();
    apply_delta(
        &mut state,
        Delta::RankingsLoaded {
            ticket,
            result: Ok(report.clone()),
        },
    );
    assert_eq!(state.rankings.data.players.len(), 2);

    let pending = state.begin_rankings();
    state.toggle_gender();
    assert_eq!(state.gender, Gender::Women);
    assert!(state.rankings.data.players.is_empty());
    assert!(!state.rankings.loading);
    assert!(state.voting_pair().is_none());

    // A men's response arriving after the switch is ignored.
    let ProviderCommand::LoadRankings { ticket, .. } = pending else {
        panic!("expected a rankings load");
    };
    apply_delta(
        &mut state,
        Delta::RankingsLoaded {
            ticket,
            result: Ok(report),
        },
    );
    assert!(state.rankings.data.players.is_empty());

    state.set_screen(Screen::Schedule);
    let cmds = state.load_commands(false);
    assert!(cmds.iter().any(|c| matches!(
        c,
        ProviderCommand::LoadRankings { gender: Gender::Women, .. }
    )));
    assert!(cmds.iter().any(|c| matches!(
        c,
        ProviderCommand::LoadSchedule { gender: Gender::Women, .. }
    )));
}

#[test]
fn voting_screen_checks_api_once() {
    let mut state = app();
    state.set_screen(Screen::Voting);
    let cmds = state.load_commands(false);
    assert!(cmds.iter().any(|c| matches!(c, ProviderCommand::CheckVotingApi)));
    // Still waiting on the first answer.
    assert!(
        !state
            .load_commands(false)
            .iter()
            .any(|c| matches!(c, ProviderCommand::CheckVotingApi))
    );

    apply_delta(
        &mut state,
        Delta::VotingApiChecked(Err("HTTP 503: db offline".to_string())),
    );
    assert!(!state.voting.checking_api);
    assert!(state.logs.iter().any(|l| l.contains("Voting API unavailable")));
    assert!(
        !state
            .load_commands(false)
            .iter()
            .any(|c| matches!(c, ProviderCommand::CheckVotingApi))
    );

    let ticket = state.rankings.begin();
    let report = toplines_terminal::report_fetch::parse_player_report_json(REPORT).unwrap();
    apply_delta(&mut state, Delta::RankingsLoaded { ticket, result: Ok(report) });
    assert!(state.vote_for(true).is_none());
    assert!(!state.voting.submitting);
    assert!(
        state
            .voting
            .last_result
            .as_deref()
            .is_some_and(|r| r.contains("db offline"))
    );

    assert!(
        state
            .load_commands(true)
            .iter()
            .any(|c| matches!(c, ProviderCommand::CheckVotingApi))
    );
    apply_delta(&mut state, Delta::VotingApiChecked(Ok(())));
    assert!(state.vote_for(true).is_some());
}
