//! Planar Sim
//!
//! Runs one character through the demo course with a scripted input track
//! and logs what happens. Useful for tuning a motion configuration without
//! a game around it.
//!
//! Run with: cargo run -p planar_sim -- [config.json] [--seconds 8] [--snapshot out.bin]

mod course;
mod host;
mod options;

use course::{scripted_input, Course};
use host::SimHost;
use options::SimOptions;
use parking_lot::Mutex;
use planar_motion::prelude::*;
use std::sync::Arc;

#[derive(Debug, Default)]
struct EventTally {
    jumps: usize,
    landings: usize,
    plane_changes: usize,
    detaches: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = SimOptions::load()?;
    let config = match &options.config_path {
        Some(path) => {
            log::info!("Loading motion config from {}", path.display());
            MotionConfig::load(path)?
        }
        None => MotionConfig::default(),
    };

    let mut host = SimHost::new(&config, Course::demo()?)?;

    let tally = Arc::new(Mutex::new(EventTally::default()));
    let sink = Arc::clone(&tally);
    host.controller.subscribe(move |event: &MotionEvent| {
        log::info!("{:?}", event);
        let mut tally = sink.lock();
        match event {
            MotionEvent::Jumped { .. } => tally.jumps += 1,
            MotionEvent::Landed { .. } => tally.landings += 1,
            MotionEvent::PlaneChanged { .. } => tally.plane_changes += 1,
            MotionEvent::ForcedDetach { .. } => tally.detaches += 1,
            MotionEvent::LeftGround { .. } => {}
        }
    });

    let ticks = (options.seconds / host.dt()).round() as u64;
    log::info!("Simulating {} ticks at {:.4}s", ticks, host.dt());

    for tick in 0..ticks {
        host.step(scripted_input(tick, host.dt()));

        if tick % 60 == 0 {
            let state = host.controller.state();
            log::info!(
                "t={:5.2} pos=({:6.2}, {:5.2}, {:5.2}) speed={:5.2} grounded={}",
                tick as f32 * host.dt(),
                host.motor.position.x,
                host.motor.position.y,
                host.motor.position.z,
                state.speed(),
                state.grounded
            );
        }
    }

    log::info!("Finished: {:?}", *tally.lock());

    if let Some(path) = &options.snapshot_path {
        let bytes = host.controller.snapshot().to_bytes()?;
        std::fs::write(path, &bytes)?;
        log::info!("Wrote {} byte snapshot to {}", bytes.len(), path.display());
    }

    Ok(())
}
