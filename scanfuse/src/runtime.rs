//! Wiring of a complete mapping run

use crate::render::ConsoleRenderer;
use scanfuse_core::error::{ScanfuseError, ScanfuseResult};
use scanfuse_core::Scheduler;
use scanfuse_library::config::FusionConfig;
use scanfuse_library::nodes::{
    FixSource, FusionNode, PositionFixNode, ReplayFixSource, ScanNode, SimulatedFixSource,
    SimulatedScanSource,
};
use std::time::Duration;

/// Fix source described by the configuration
pub fn fix_source(config: &FusionConfig) -> ScanfuseResult<Box<dyn FixSource>> {
    if let Some(path) = &config.sources.fix_replay {
        return Ok(Box::new(ReplayFixSource::from_file(path)?));
    }

    let sim = &config.sources.simulation;
    let mut source = SimulatedFixSource::new(sim.robot_pose, sim.fix_jitter, sim.seed);
    if let Some(every) = sim.jump_every {
        source = source.with_jumps(every, sim.jump_distance);
    }
    Ok(Box::new(source))
}

/// Scheduler with the fix, scan, fusion and renderer nodes
///
/// Priorities put producers before the fusion node so a scan and the fixes
/// of the same pass are joined in that pass.
pub fn build_scheduler(config: &FusionConfig) -> ScanfuseResult<Scheduler> {
    config.validate()?;
    let sources = &config.sources;
    let sim = &sources.simulation;

    // Consumers open their topics first so the configured depths apply
    let fusion = FusionNode::from_config(config)?;
    let renderer = ConsoleRenderer::new_with_topic(&config.topics.frame)?;

    let fixes = PositionFixNode::new_with_source(&config.topics.fix, fix_source(config)?)?;

    let room = SimulatedScanSource::new(sim.robot_pose, sim.room_width, sim.room_height)
        .with_beams(sim.beam_count, sim.max_range);
    let mut scans =
        ScanNode::new_with_source(&config.topics.scan, sources.scan_queue_depth, Box::new(room))?;
    scans.set_min_interval(Duration::from_millis(sources.scan_min_interval_ms));

    let mut scheduler = Scheduler::new()
        .with_name("scanfuse")
        .with_tick_rate(config.scheduler.tick_rate_hz)?;
    scheduler
        .add(Box::new(fixes), 0, Some(true))
        .add(Box::new(scans), 1, Some(true))
        .add(Box::new(fusion), 10, Some(true))
        .add(Box::new(renderer), 20, Some(true));
    scheduler.set_node_rate("PositionFixNode", config.fix_rate_hz());

    Ok(scheduler)
}

/// Run length from a number of seconds
///
/// Rejects values that are not positive or do not fit a `Duration`.
pub fn run_duration(seconds: f64) -> ScanfuseResult<Duration> {
    if seconds.is_nan() || seconds <= 0.0 {
        return Err(ScanfuseError::InvalidInput(format!(
            "duration must be positive, got {}",
            seconds
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        ScanfuseError::InvalidInput(format!("duration {} out of range: {}", seconds, e))
    })
}
