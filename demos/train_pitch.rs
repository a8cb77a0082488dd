use std::{
    error::Error,
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use kickoff::{
    gym::{Move, Pitch},
    QTableAgent, QTableAgentConfig,
};
use log::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const NUM_EPISODES: u32 = 50;

fn main() -> Result<(), Box<dyn Error>> {
    let out = Path::new("demos/out");
    let table_path = out.join("q_values.msgpack");
    fs::create_dir_all(out)?;

    // stats.log accumulates across runs
    let stats = OpenOptions::new()
        .create(true)
        .append(true)
        .open(out.join("stats.log"))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(stats)))
        .init();

    let config = QTableAgentConfig {
        max_steps: 5_000,
        ..Default::default()
    };
    let mut agent = QTableAgent::<Move, 6>::new(config, Pitch::actions())?;
    let mut env = Pitch::new();

    match agent.load(&table_path) {
        Ok(()) => info!("resuming from {}", table_path.display()),
        Err(kickoff::Error::NotFound { .. }) => info!("starting with an empty table"),
        Err(e) => return Err(e.into()),
    }

    let mut wtr = csv::Writer::from_path(out.join("episodes.csv"))?;
    wtr.write_record(["episode", "steps", "reward", "states"])?;

    for i in 0..NUM_EPISODES {
        let summary = agent.go(&mut env)?;
        wtr.write_record(&[
            i.to_string(),
            summary.steps.to_string(),
            summary.reward.to_string(),
            agent.table().len().to_string(),
        ])?;
        if summary.done {
            info!("episode {i}: scored after {} steps", summary.steps);
        }
    }

    wtr.flush()?;
    agent.save(&table_path)?;

    Ok(())
}
