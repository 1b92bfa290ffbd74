use std::collections::VecDeque;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};

use crate::config::Config;
use crate::featured::{self, RankLookup, SeasonLookup};
use crate::filters::FilterPrefs;
use crate::load_state::{ConferenceData, LoadTicket, PlayerData, ScheduleData};
use crate::records::{Game, MergedPlayer, Player, PlayerReport, ScheduleSnapshot, ToplinePlayer};
use crate::source::Gender;
use crate::views;
use crate::voting::{Vote, VoteReceipt};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Daily,
    Schedule,
    Rankings,
    Voting,
    Glossary,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Daily,
        Screen::Schedule,
        Screen::Rankings,
        Screen::Voting,
        Screen::Glossary,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Screen::Daily => "/",
            Screen::Schedule => "/schedule",
            Screen::Rankings => "/rankings",
            Screen::Voting => "/voting",
            Screen::Glossary => "/glossary",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Screen::ALL.into_iter().find(|s| s.path() == normalized)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VotingState {
    pub round: usize,
    pub submitting: bool,
    pub last_result: Option<String>,
    /// `None` until the voting API has answered a health check.
    pub api_status: Option<Result<(), String>>,
    pub checking_api: bool,
}

pub struct AppState {
    pub screen: Screen,
    pub gender: Gender,
    pub days: u32,
    pub report_date: String,
    pub schedule_date: String,
    pub daily: PlayerData,
    pub rankings: PlayerData,
    pub schedule: ScheduleData,
    pub conferences: ConferenceData,
    pub prefs: FilterPrefs,
    pub selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub voting: VotingState,
}

impl AppState {
    pub fn new(config: &Config, prefs: FilterPrefs) -> Self {
        let today = today();
        let schedule_date = prefs
            .schedule_date
            .clone()
            .filter(|d| parse_date(d).is_some())
            .unwrap_or_else(|| today.clone());
        Self {
            screen: Screen::Daily,
            gender: config.gender,
            days: config.days,
            report_date: today,
            schedule_date,
            daily: PlayerData::new(),
            rankings: PlayerData::new(),
            schedule: ScheduleData::new(),
            conferences: ConferenceData::new(),
            prefs,
            selected: 0,
            logs: VecDeque::new(),
            help_overlay: false,
            voting: VotingState::default(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.selected = 0;
        }
    }

    /// Starts the loads the current screen needs and returns the commands
    /// to hand to the provider. `force` reloads data already present.
    pub fn load_commands(&mut self, force: bool) -> Vec<ProviderCommand> {
        let mut cmds = Vec::new();
        match self.screen {
            Screen::Daily => {
                cmds.push(self.begin_daily());
                if force || self.conferences.data.is_empty() {
                    cmds.push(self.begin_conferences());
                }
            }
            Screen::Schedule => {
                if let Some(cmd) = self.begin_schedule() {
                    cmds.push(cmd);
                }
                if force || self.rankings.data.players.is_empty() {
                    cmds.push(self.begin_rankings());
                }
            }
            Screen::Rankings => {
                cmds.push(self.begin_rankings());
                if force || self.conferences.data.is_empty() {
                    cmds.push(self.begin_conferences());
                }
            }
            Screen::Voting => {
                if force || self.rankings.data.players.is_empty() {
                    cmds.push(self.begin_rankings());
                }
                if !self.voting.checking_api && (force || self.voting.api_status.is_none()) {
                    self.voting.checking_api = true;
                    cmds.push(ProviderCommand::CheckVotingApi);
                }
            }
            Screen::Glossary => {}
        }
        cmds
    }

    pub fn begin_daily(&mut self) -> ProviderCommand {
        ProviderCommand::LoadDaily {
            ticket: self.daily.begin(),
            date: self.report_date.clone(),
            days: self.days,
            gender: self.gender,
        }
    }

    pub fn begin_rankings(&mut self) -> ProviderCommand {
        ProviderCommand::LoadRankings {
            ticket: self.rankings.begin(),
            date: self.report_date.clone(),
            gender: self.gender,
        }
    }

    pub fn begin_schedule(&mut self) -> Option<ProviderCommand> {
        if self.schedule_date.trim().is_empty() {
            return None;
        }
        Some(ProviderCommand::LoadSchedule {
            ticket: self.schedule.begin(),
            date: self.schedule_date.clone(),
            gender: self.gender,
        })
    }

    pub fn begin_conferences(&mut self) -> ProviderCommand {
        ProviderCommand::LoadConferences {
            ticket: self.conferences.begin(),
            gender: self.gender,
        }
    }

    pub fn toggle_gender(&mut self) {
        self.gender = self.gender.toggle();
        // Every category is partitioned by gender.
        self.daily.reset();
        self.rankings.reset();
        self.schedule.reset();
        self.conferences.reset();
        self.voting.round = 0;
        self.selected = 0;
    }

    /// Moves the date the current screen is keyed on. Returns `false` when
    /// the screen has no date.
    pub fn shift_date(&mut self, days: i64) -> bool {
        let target = match self.screen {
            Screen::Schedule => &mut self.schedule_date,
            Screen::Daily | Screen::Rankings => &mut self.report_date,
            Screen::Voting | Screen::Glossary => return false,
        };
        let Some(date) = parse_date(target) else {
            return false;
        };
        *target = (date + ChronoDuration::days(days)).format(DATE_FORMAT).to_string();
        self.selected = 0;
        true
    }

    pub fn visible_players(&self) -> Vec<&Player> {
        match self.screen {
            Screen::Daily => views::filter_players(&self.daily.data.players, &self.prefs),
            Screen::Rankings => views::filter_players(&self.rankings.data.players, &self.prefs),
            _ => Vec::new(),
        }
    }

    pub fn visible_games(&self) -> Vec<&Game> {
        views::filter_games(&self.schedule.data.games, &self.prefs)
    }

    pub fn visible_len(&self) -> usize {
        match self.screen {
            Screen::Daily | Screen::Rankings => self.visible_players().len(),
            Screen::Schedule => self.visible_games().len(),
            Screen::Voting | Screen::Glossary => 0,
        }
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.visible_games().get(self.selected).copied()
    }

    /// Featured players of the selected game enriched with season rows and
    /// rankings positions.
    pub fn selected_game_players(&self) -> Vec<MergedPlayer> {
        let season: SeasonLookup = views::season_lookup(&self.rankings.data.players);
        let ranks: RankLookup = views::rank_lookup(&self.rankings.data.players);
        featured::merge_featured_players(self.selected_game(), Some(&season), Some(&ranks))
    }

    pub fn selected_game_toplines(&self) -> &[ToplinePlayer] {
        self.selected_game()
            .and_then(|g| g.game_id)
            .and_then(|id| self.schedule.data.toplines.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The two rankings entries currently up for a vote.
    pub fn voting_pair(&self) -> Option<(&Player, &Player)> {
        let ranked: Vec<&Player> = self
            .rankings
            .data
            .players
            .iter()
            .filter(|p| p.player_id.is_some_and(|id| id != 0))
            .collect();
        if ranked.len() < 2 {
            return None;
        }
        let a = (self.voting.round * 2) % ranked.len();
        let mut b = (a + 1) % ranked.len();
        if ranked[a].player_id == ranked[b].player_id {
            b = (b + 1) % ranked.len();
        }
        Some((ranked[a], ranked[b]))
    }

    /// Builds a vote for the current pair; `pick_first` chooses the winner.
    pub fn vote_for(&mut self, pick_first: bool) -> Option<ProviderCommand> {
        if self.voting.submitting {
            return None;
        }
        if let Some(Err(err)) = &self.voting.api_status {
            self.voting.last_result = Some(format!("Voting unavailable: {err}"));
            return None;
        }
        let (a, b) = self.voting_pair()?;
        let a_id = a.player_id?;
        let b_id = b.player_id?;
        let winner = if pick_first { a_id } else { b_id };
        self.voting.submitting = true;
        Some(ProviderCommand::SubmitVote {
            vote: Vote::new(a_id, b_id, winner),
        })
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadDaily {
        ticket: LoadTicket,
        date: String,
        days: u32,
        gender: Gender,
    },
    LoadRankings {
        ticket: LoadTicket,
        date: String,
        gender: Gender,
    },
    LoadSchedule {
        ticket: LoadTicket,
        date: String,
        gender: Gender,
    },
    LoadConferences {
        ticket: LoadTicket,
        gender: Gender,
    },
    SubmitVote {
        vote: Vote,
    },
    CheckVotingApi,
}

#[derive(Debug, Clone)]
pub enum Delta {
    DailyLoaded {
        ticket: LoadTicket,
        result: Result<PlayerReport, String>,
    },
    RankingsLoaded {
        ticket: LoadTicket,
        result: Result<PlayerReport, String>,
    },
    ScheduleLoaded {
        ticket: LoadTicket,
        result: Result<ScheduleSnapshot, String>,
    },
    ConferencesLoaded {
        ticket: LoadTicket,
        result: Result<Vec<String>, String>,
    },
    VoteSubmitted(Result<VoteReceipt, String>),
    VotingApiChecked(Result<(), String>),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DailyLoaded { ticket, result } => {
            if !state.daily.is_current(ticket) {
                state.push_log(format!(
                    "[INFO] Dropped stale daily report (request {})",
                    ticket.generation()
                ));
            } else {
                if let Err(err) = &result {
                    state.push_log(format!("[WARN] Error loading daily report: {err}"));
                }
                state.daily.finish(ticket, result);
            }
        }
        Delta::RankingsLoaded { ticket, result } => {
            if !state.rankings.is_current(ticket) {
                state.push_log(format!(
                    "[INFO] Dropped stale season rankings (request {})",
                    ticket.generation()
                ));
            } else {
                if let Err(err) = &result {
                    state.push_log(format!("[WARN] Error loading season rankings: {err}"));
                }
                state.rankings.finish(ticket, result);
            }
        }
        Delta::ScheduleLoaded { ticket, result } => {
            if !state.schedule.is_current(ticket) {
                state.push_log(format!(
                    "[INFO] Dropped stale schedule (request {})",
                    ticket.generation()
                ));
            } else {
                match &result {
                    Ok(snapshot) => {
                        for warning in &snapshot.warnings {
                            state.push_log(format!("[WARN] {warning}"));
                        }
                    }
                    Err(err) => state.push_log(format!("[WARN] Error loading schedule: {err}")),
                }
                state.schedule.finish(ticket, result);
            }
        }
        Delta::ConferencesLoaded { ticket, result } => {
            if !state.conferences.is_current(ticket) {
                state.push_log(format!(
                    "[INFO] Dropped stale conferences (request {})",
                    ticket.generation()
                ));
            } else {
                if let Err(err) = &result {
                    state.push_log(format!("[WARN] Error loading conferences: {err}"));
                }
                state.conferences.finish(ticket, result);
            }
        }
        Delta::VoteSubmitted(result) => {
            state.voting.submitting = false;
            match result {
                Ok(receipt) => {
                    state.voting.round = state.voting.round.wrapping_add(1);
                    state.voting.last_result = Some(format!("Vote recorded ({})", receipt.id));
                    state.push_log(format!("[INFO] Vote recorded: {}", receipt.id));
                }
                Err(err) => {
                    state.voting.last_result = Some(format!("Vote failed: {err}"));
                    state.push_log(format!("[WARN] Vote failed: {err}"));
                }
            }
        }
        Delta::VotingApiChecked(result) => {
            state.voting.checking_api = false;
            match &result {
                Ok(()) => state.push_log("[INFO] Voting API healthy"),
                Err(err) => state.push_log(format!("[WARN] Voting API unavailable: {err}")),
            }
            state.voting.api_status = Some(result);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
    state.clamp_selection();
}

pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Daily => "DAILY REPORTS",
        Screen::Schedule => "SCHEDULE",
        Screen::Rankings => "SEASON RANKINGS",
        Screen::Voting => "PROSPECT VOTING",
        Screen::Glossary => "GLOSSARY",
    }
}
