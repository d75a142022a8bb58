use zoneclock_core::{AppState, Config};

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session(config)?;

    if session.state() != AppState::Uninitialized {
        println!("already onboarded");
        return Ok(());
    }
    session.complete_onboarding()?;
    println!("onboarding complete");
    Ok(())
}
