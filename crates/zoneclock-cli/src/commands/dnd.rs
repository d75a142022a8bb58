use clap::Subcommand;
use zoneclock_core::Config;

#[derive(Subcommand)]
pub enum DndAction {
    /// Suppress notifications
    On,
    /// Allow notifications again
    Off,
    /// Print whether do-not-disturb is on
    Status,
}

pub fn run(action: DndAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session(config)?;

    match action {
        DndAction::On => session.toggle_do_not_disturb(true),
        DndAction::Off => session.toggle_do_not_disturb(false),
        DndAction::Status => {}
    }
    let state = if session.is_do_not_disturb() { "on" } else { "off" };
    println!("do not disturb: {state}");
    Ok(())
}
