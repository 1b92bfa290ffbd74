use std::fmt::Display;

use crate::records::{PlayerReport, ScheduleSnapshot};
use crate::report_fetch;
use crate::schedule_fetch;
use crate::source::{DataSource, Gender};

/// Identifies one load request. Only the most recent ticket issued by a
/// given `LoadState` may write to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Result of the latest load for one data category plus its request status.
#[derive(Debug, Clone, Default)]
pub struct LoadState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl<T: Default> LoadState<T> {
    pub fn new() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        self.error = None;
        LoadTicket(self.generation)
    }

    /// Drops the data and invalidates every ticket issued so far.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.data = T::default();
        self.loading = false;
        self.error = None;
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Applies a completed load. Returns `false` (and changes nothing) when
    /// a newer request has been issued since `ticket`.
    pub fn finish<E: Display>(&mut self, ticket: LoadTicket, result: Result<T, E>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match result {
            Ok(data) => {
                self.data = data;
                self.error = None;
            }
            Err(err) => {
                self.data = T::default();
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
        true
    }
}

pub type PlayerData = LoadState<PlayerReport>;
pub type ScheduleData = LoadState<ScheduleSnapshot>;
pub type ConferenceData = LoadState<Vec<String>>;

// anyhow's alternate form keeps the context chain in one line.
fn flatten(err: anyhow::Error) -> String {
    format!("{err:#}")
}

impl PlayerData {
    pub fn load_daily_report(
        &mut self,
        source: &dyn DataSource,
        date: &str,
        days: u32,
        gender: Gender,
    ) -> bool {
        let ticket = self.begin();
        let result = report_fetch::fetch_daily_report(source, date, days, gender).map_err(flatten);
        self.finish(ticket, result)
    }

    pub fn load_season_rankings(&mut self, source: &dyn DataSource, date: &str, gender: Gender) -> bool {
        let ticket = self.begin();
        let result = report_fetch::fetch_season_rankings(source, date, gender).map_err(flatten);
        self.finish(ticket, result)
    }
}

impl ScheduleData {
    /// An empty date is ignored.
    pub fn load_schedule(&mut self, source: &dyn DataSource, date: &str, gender: Gender) -> bool {
        if date.trim().is_empty() {
            return false;
        }
        let ticket = self.begin();
        let result = schedule_fetch::fetch_schedule(source, date, gender).map_err(flatten);
        self.finish(ticket, result)
    }
}

impl ConferenceData {
    pub fn load_conferences(&mut self, source: &dyn DataSource, gender: Gender) -> bool {
        let ticket = self.begin();
        let result = report_fetch::fetch_conferences(source, gender).map_err(flatten);
        self.finish(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_is_discarded() {
        let mut state: LoadState<Vec<u32>> = LoadState::new();
        let first = state.begin();
        let second = state.begin();
        assert!(!state.finish::<String>(first, Ok(vec![1])));
        assert!(state.loading);
        assert!(state.data.is_empty());
        assert!(state.finish::<String>(second, Ok(vec![2])));
        assert!(!state.loading);
        assert_eq!(state.data, vec![2]);
    }

    #[test]
    fn error_clears_previous_data() {
        let mut state: LoadState<Vec<u32>> = LoadState::new();
        let t = state.begin();
        state.finish::<String>(t, Ok(vec![1, 2]));
        let t = state.begin();
        assert!(state.error.is_none());
        state.finish(t, Err("HTTP 500"));
        assert!(state.data.is_empty());
        assert_eq!(state.error.as_deref(), Some("HTTP 500"));
        assert!(!state.loading);
    }
}
