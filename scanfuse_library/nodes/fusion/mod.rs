use crate::algorithms::fusion::{FusionPipeline, PipelineStats};
use crate::config::FusionConfig;
use crate::{LaserScan, MapFrame, PositionFix, StabilityVerdict};
use scanfuse_core::core::{LogSummary, TopicMetadata};
use scanfuse_core::error::ScanfuseResult;

// Type alias for cleaner signatures
type Result<T> = ScanfuseResult<T>;
use scanfuse_core::{Hub, Node, NodeInfo, NodeInfoExt};

/// Fusion Node - stability-gated occupancy mapping
///
/// Subscribes to position fixes and laser scans and runs them through a
/// [`FusionPipeline`]. Each tick first drains every pending fix in arrival
/// order, publishing one [`StabilityVerdict`] per fix, and then joins the
/// pending scan with the newest verdict, publishing one [`MapFrame`].
pub struct FusionNode {
    fix_subscriber: Hub<PositionFix>,
    scan_subscriber: Hub<LaserScan>,
    verdict_publisher: Hub<StabilityVerdict>,
    frame_publisher: Hub<MapFrame>,

    pipeline: FusionPipeline,

    // State
    last_stable: Option<bool>,
    frames_published: u64,
}

impl FusionNode {
    /// Create a fusion node with default topics and parameters
    pub fn new() -> Result<Self> {
        Self::from_config(&FusionConfig::default())
    }

    /// Create a fusion node from a run configuration
    pub fn from_config(config: &FusionConfig) -> Result<Self> {
        let topics = &config.topics;
        Ok(Self {
            fix_subscriber: Hub::new_with_capacity(&topics.fix, config.sources.fix_queue_depth)?,
            scan_subscriber: Hub::new_with_capacity(
                &topics.scan,
                config.sources.scan_queue_depth,
            )?,
            verdict_publisher: Hub::new(&topics.stability)?,
            frame_publisher: Hub::new(&topics.frame)?,
            pipeline: config.build_pipeline(),
            last_stable: None,
            frames_published: 0,
        })
    }

    pub fn pipeline(&self) -> &FusionPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> &PipelineStats {
        self.pipeline.stats()
    }

    /// Get number of map frames published
    pub fn get_frames_published(&self) -> u64 {
        self.frames_published
    }

    fn process_fixes(&mut self, mut ctx: Option<&mut NodeInfo>) {
        for fix in self.fix_subscriber.drain(ctx.as_deref_mut()) {
            let report = self.pipeline.on_fix(&fix);

            if self.last_stable != Some(report.stable) {
                let message = if report.stable {
                    format!(
                        "Localization stable at {}",
                        self.pipeline.current_pose().log_summary()
                    )
                } else if report.filled {
                    format!(
                        "Localization unstable (err x={:.3} y={:.3}), grid updates paused",
                        report.error_x, report.error_y
                    )
                } else {
                    "Waiting for the stability window to fill".to_string()
                };
                ctx.log_info(&message);
                self.last_stable = Some(report.stable);
            }

            self.verdict_publisher
                .send(StabilityVerdict::new(report), ctx.as_deref_mut());
        }
    }

    fn process_scans(&mut self, mut ctx: Option<&mut NodeInfo>) {
        for scan in self.scan_subscriber.drain(ctx.as_deref_mut()) {
            match self.pipeline.on_scan(&scan) {
                Some(outcome) => {
                    let frame = self.pipeline.frame(outcome);
                    self.frames_published += 1;
                    self.frame_publisher.send(frame, ctx.as_deref_mut());
                }
                None => ctx.log_debug("Scan arrived before the first position fix, not joined"),
            }
        }
    }
}

impl Node for FusionNode {
    fn name(&self) -> &'static str {
        "FusionNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        let (width, height) = self.pipeline.grid().dimensions();
        ctx.log_info(&format!(
            "Fusion node initialized ({}x{} grid at {} per cell, window of {})",
            width,
            height,
            self.pipeline.grid().resolution(),
            self.pipeline.window().window_size()
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        // Fixes first so the scan joins with the newest verdict
        self.process_fixes(ctx.as_deref_mut());
        self.process_scans(ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        ctx.log_info(&format!(
            "Fusion node shutdown: {}",
            self.pipeline.stats().log_summary()
        ));
        Ok(())
    }

    fn get_publishers(&self) -> Vec<TopicMetadata> {
        vec![
            TopicMetadata::of::<StabilityVerdict>(self.verdict_publisher.get_topic_name()),
            TopicMetadata::of::<MapFrame>(self.frame_publisher.get_topic_name()),
        ]
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        vec![
            TopicMetadata::of::<PositionFix>(self.fix_subscriber.get_topic_name()),
            TopicMetadata::of::<LaserScan>(self.scan_subscriber.get_topic_name()),
        ]
    }
}
