use chrono::NaiveDate;
use clap::Subcommand;
use zoneclock_core::stats::day_bounds;
use zoneclock_core::{Config, Storage};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats (UTC)
    Today,
    /// One entry per day for the last 7 days, oldest first
    Week,
    /// One aggregate over an inclusive range of days
    Range {
        /// First day (YYYY-MM-DD)
        from: NaiveDate,
        /// Last day (YYYY-MM-DD)
        to: NaiveDate,
    },
    /// Focus minutes over the last 30 days versus the 30 before
    Trend,
    /// Most productive starting hours
    Peak {
        #[arg(long, default_value = "3")]
        top: usize,
    },
    /// Focus minutes per weekday, Monday first
    Weekly,
}

pub fn run(action: StatsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store(config)?;

    match action {
        StatsAction::Today => {
            let stats = store.statistics_for_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Week => {
            let stats = store.statistics_for_last_7_days()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Range { from, to } => {
            if to < from {
                return Err(format!("range end {to} is before start {from}").into());
            }
            let (start, _) = day_bounds(from);
            let (_, end) = day_bounds(to);
            let stats = store.statistics_for_range(start, end)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Trend => {
            let trend = store.trend_30_days()?;
            println!("{}", serde_json::to_string_pretty(&trend)?);
        }
        StatsAction::Peak { top } => {
            let peaks = store.peak_focus_hours(top)?;
            println!("{}", serde_json::to_string_pretty(&peaks)?);
        }
        StatsAction::Weekly => {
            let week = store.weekly_pattern()?;
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
    }
    Ok(())
}
