use anyhow::{Result, anyhow};

use toplines_terminal::config::Config;
use toplines_terminal::http_client::init_http_client;
use toplines_terminal::load_state::{ConferenceData, PlayerData, ScheduleData};
use toplines_terminal::records::Player;
use toplines_terminal::source::{Gender, source_for_root};
use toplines_terminal::state::{parse_date, today};

const USAGE: &str = "usage: snapshot <daily|rankings|schedule|conferences> [--date YYYY-MM-DD] [--days N] [--gender men|women] [--root PATH_OR_URL]";

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(kind) = args.first().cloned() else {
        return Err(anyhow!(USAGE));
    };

    let config = Config::from_env();
    init_http_client(config.http_timeout_secs)?;
    let date = arg_value(&args, "--date").unwrap_or_else(today);
    if parse_date(&date).is_none() {
        return Err(anyhow!("invalid --date {date:?}, expected YYYY-MM-DD"));
    }
    let days = match arg_value(&args, "--days") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| anyhow!("invalid --days {raw:?}"))?
            .clamp(1, 30),
        None => config.days,
    };
    let gender = match arg_value(&args, "--gender") {
        Some(raw) => Gender::parse(&raw).ok_or_else(|| anyhow!("invalid --gender {raw:?}"))?,
        None => config.gender,
    };
    let root = arg_value(&args, "--root").unwrap_or_else(|| config.data_base.clone());
    let source = source_for_root(&root);

    println!("Source: {}", source.describe());
    match kind.as_str() {
        "daily" => {
            let mut data = PlayerData::new();
            data.load_daily_report(source.as_ref(), &date, days, gender);
            println!("Daily report {date} ({days}d, {gender})");
            print_players(&data)
        }
        "rankings" => {
            let mut data = PlayerData::new();
            data.load_season_rankings(source.as_ref(), &date, gender);
            println!("Season rankings {date} ({gender})");
            print_players(&data)
        }
        "schedule" => {
            let mut data = ScheduleData::new();
            data.load_schedule(source.as_ref(), &date, gender);
            println!("Schedule {date} ({gender})");
            if let Some(err) = data.error.as_deref() {
                return Err(anyhow!("load failed: {err}"));
            }
            let snap = &data.data;
            let featured = snap
                .games
                .iter()
                .filter(|g| !g.featured_players.is_empty())
                .count();
            println!("Games: {} ({featured} with featured players)", snap.games.len());
            println!("Games with toplines: {}", snap.toplines.len());
            for (game_id, rows) in snap.toplines.iter().take(8) {
                println!(" - game {game_id}: {} toplines", rows.len());
            }
            for warning in &snap.warnings {
                eprintln!("[WARN] {warning}");
            }
            Ok(())
        }
        "conferences" => {
            let mut data = ConferenceData::new();
            data.load_conferences(source.as_ref(), gender);
            if let Some(err) = data.error.as_deref() {
                return Err(anyhow!("load failed: {err}"));
            }
            println!("Conferences ({gender}): {}", data.data.len());
            for conf in &data.data {
                println!(" - {conf}");
            }
            Ok(())
        }
        other => Err(anyhow!("unknown snapshot kind {other:?}\n{USAGE}")),
    }
}

fn print_players(data: &PlayerData) -> Result<()> {
    if let Some(err) = data.error.as_deref() {
        return Err(anyhow!("load failed: {err}"));
    }
    if let Some(meta) = data.data.meta.as_ref() {
        println!("Meta: {meta}");
    }
    println!("Players: {}", data.data.players.len());
    for p in data.data.players.iter().take(10) {
        println!(" - {}", describe(p));
    }
    Ok(())
}

fn describe(p: &Player) -> String {
    format!(
        "{} | {} | {} | {} | rsci {}",
        p.display_name(),
        p.team.as_deref().unwrap_or("-"),
        p.conference.as_deref().unwrap_or("-"),
        p.class_label(),
        p.rsci_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
    )
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
