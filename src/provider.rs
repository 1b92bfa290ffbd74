use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::report_fetch;
use crate::schedule_fetch;
use crate::source::DataSource;
use crate::state::{Delta, ProviderCommand};
use crate::voting;

/// Runs loads off the UI thread. Each command is answered with one `Delta`
/// carrying the ticket it was issued with; the thread ends when either
/// channel closes.
pub fn spawn_provider(
    source: Arc<dyn DataSource>,
    api_base: String,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Reading snapshots from {}",
            source.describe()
        )));
        for cmd in cmd_rx {
            let delta = handle_command(source.as_ref(), &api_base, cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
    })
}

pub fn handle_command(source: &dyn DataSource, api_base: &str, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::LoadDaily {
            ticket,
            date,
            days,
            gender,
        } => Delta::DailyLoaded {
            ticket,
            result: report_fetch::fetch_daily_report(source, &date, days, gender)
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::LoadRankings {
            ticket,
            date,
            gender,
        } => Delta::RankingsLoaded {
            ticket,
            result: report_fetch::fetch_season_rankings(source, &date, gender)
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::LoadSchedule {
            ticket,
            date,
            gender,
        } => Delta::ScheduleLoaded {
            ticket,
            result: schedule_fetch::fetch_schedule(source, &date, gender)
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::LoadConferences { ticket, gender } => Delta::ConferencesLoaded {
            ticket,
            result: report_fetch::fetch_conferences(source, gender)
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::SubmitVote { vote } => Delta::VoteSubmitted(
            voting::submit_vote(api_base, &vote).map_err(|err| format!("{err:#}")),
        ),
        ProviderCommand::CheckVotingApi => Delta::VotingApiChecked(
            voting::check_health(api_base).map_err(|err| format!("{err:#}")),
        ),
    }
}
