use crate::core::{Node, NodeInfo, NodeMetrics, NodeState};
use crate::error::{ScanfuseError, ScanfuseResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

/// Default global loop rate when none is configured (~60 passes/s)
pub const DEFAULT_TICK_RATE_HZ: f64 = 60.0;

static CTRLC_INSTALL: Once = Once::new();
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Node registration info with lifecycle tracking and per-node rate control
struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
    rate_hz: Option<f64>,       // None = tick on every scheduler pass
    last_tick: Option<Instant>, // Last tick time for rate limiting
}

impl RegisteredNode {
    fn due(&self, now: Instant) -> bool {
        match (self.rate_hz, self.last_tick) {
            (Some(rate_hz), Some(last_tick)) => {
                (now - last_tick).as_secs_f64() >= 1.0 / rate_hz
            }
            _ => true,
        }
    }
}

/// Central orchestrator: holds nodes, drives the tick loop.
///
/// Execution is single-threaded and cooperative. Each pass ticks every due
/// node in priority order (lower value first), and a tick runs to completion
/// before the next node starts. A panicking node is recorded as a failed tick
/// and the loop carries on.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    scheduler_name: String,
    tick_rate_hz: f64,
    passes: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            scheduler_name: "DefaultScheduler".to_string(),
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            passes: 0,
        }
    }

    /// Set scheduler name (for logging)
    pub fn with_name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Set the global loop rate in Hz
    pub fn with_tick_rate(mut self, rate_hz: f64) -> ScanfuseResult<Self> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(ScanfuseError::config(format!(
                "tick rate must be positive, got {}",
                rate_hz
            )));
        }
        self.tick_rate_hz = rate_hz;
        Ok(self)
    }

    /// Add a node with given priority (lower number = ticks earlier)
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add(Box::new(fix_node), 0, Some(true));
    /// scheduler.add(Box::new(fusion_node), 10, None);
    /// ```
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context = NodeInfo::new(node_name.clone(), logging_enabled);

        self.nodes.push(RegisteredNode {
            node,
            priority,
            initialized: false,
            context,
            rate_hz: None,
            last_tick: None,
        });
        // Stable sort keeps insertion order among equal priorities
        self.nodes.sort_by_key(|r| r.priority);

        tracing::info!(
            scheduler = %self.scheduler_name,
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );
        self
    }

    /// Set per-node rate control (chainable)
    ///
    /// A rate-limited node ticks at most `rate_hz` times per second; other
    /// nodes tick on every scheduler pass.
    pub fn set_node_rate(&mut self, name: &str, rate_hz: f64) -> &mut Self {
        match self.nodes.iter_mut().find(|r| r.node.name() == name) {
            Some(registered) if rate_hz.is_finite() && rate_hz > 0.0 => {
                registered.rate_hz = Some(rate_hz);
                tracing::info!("Set node '{}' rate to {:.1} Hz", name, rate_hz);
            }
            Some(_) => tracing::warn!("Ignoring invalid rate {} for node '{}'", rate_hz, name),
            None => tracing::warn!("Node '{}' not found for rate configuration", name),
        }
        self
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !CTRLC_RECEIVED.load(Ordering::SeqCst)
    }

    /// Shared stop flag; storing `false` ends the run after the current pass
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Main loop with signal handling; returns once stopped
    pub fn run(&mut self) -> ScanfuseResult<()> {
        self.run_loop(None)
    }

    /// Run all nodes for a specified duration, then shutdown gracefully
    pub fn run_for(&mut self, duration: Duration) -> ScanfuseResult<()> {
        self.run_loop(Some(duration))
    }

    /// Initialize pending nodes and execute exactly one pass
    pub fn tick_once(&mut self) {
        self.init_nodes();
        self.execute_pass();
    }

    fn run_loop(&mut self, duration: Option<Duration>) -> ScanfuseResult<()> {
        // Current-thread runtime: all nodes stay on this thread
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| ScanfuseError::Internal(format!("Failed to create runtime: {}", e)))?;

        Self::install_signal_handler();
        self.running.store(true, Ordering::SeqCst);

        rt.block_on(async {
            let start_time = Instant::now();
            let period = Duration::from_secs_f64(1.0 / self.tick_rate_hz);

            self.init_nodes();

            while self.is_running() {
                if let Some(max_duration) = duration {
                    if start_time.elapsed() >= max_duration {
                        tracing::info!("Scheduler reached time limit of {:?}", max_duration);
                        break;
                    }
                }

                self.execute_pass();
                tokio::time::sleep(period).await;
            }
        });

        self.shutdown_nodes();
        tracing::info!(
            scheduler = %self.scheduler_name,
            passes = self.passes,
            "Scheduler shutdown complete"
        );
        Ok(())
    }

    fn install_signal_handler() {
        CTRLC_INSTALL.call_once(|| {
            if let Err(e) = ctrlc::set_handler(|| {
                tracing::warn!("Ctrl+C received, shutting down scheduler");
                CTRLC_RECEIVED.store(true, Ordering::SeqCst);
            }) {
                tracing::warn!("Failed to set signal handler: {}", e);
            }
        });
    }

    fn init_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| !r.initialized) {
            let node_name = registered.node.name();
            let ctx = &mut registered.context;
            if matches!(ctx.state(), NodeState::Error(_)) {
                continue;
            }

            let result = ctx
                .initialize()
                .and_then(|_| registered.node.init(ctx));
            match result {
                Ok(()) => {
                    registered.initialized = true;
                    for topic in registered.node.get_subscribers() {
                        ctx.log_debug(&format!(
                            "subscribes '{}' ({})",
                            topic.topic_name, topic.type_name
                        ));
                    }
                    for topic in registered.node.get_publishers() {
                        ctx.log_debug(&format!(
                            "publishes '{}' ({})",
                            topic.topic_name, topic.type_name
                        ));
                    }
                    tracing::info!("Initialized node '{}'", node_name);
                }
                Err(e) => {
                    tracing::error!("Failed to initialize node '{}': {}", node_name, e);
                    ctx.transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn execute_pass(&mut self) {
        let now = Instant::now();
        for idx in 0..self.nodes.len() {
            let due = {
                let registered = &self.nodes[idx];
                registered.initialized && registered.due(now)
            };
            if due {
                self.execute_single_node(idx, now);
            }
        }
        self.passes += 1;
    }

    fn execute_single_node(&mut self, idx: usize, now: Instant) {
        let registered = &mut self.nodes[idx];
        if registered.rate_hz.is_some() {
            registered.last_tick = Some(now);
        }

        registered.context.start_tick();
        let tick_result = {
            let node = &mut registered.node;
            let context = &mut registered.context;
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                node.tick(Some(context));
            }))
        };

        match tick_result {
            Ok(()) => registered.context.record_tick(),
            Err(panic_err) => {
                let error_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Node panicked: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Node panicked: {}", s)
                } else {
                    "Node panicked with unknown error".to_string()
                };

                registered.context.record_tick_failure(error_msg.clone());
                registered.node.on_error(&error_msg, &mut registered.context);
            }
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| r.initialized) {
            let node_name = registered.node.name();
            match registered.node.shutdown(&mut registered.context) {
                Ok(()) => tracing::info!("Shutdown node '{}' successfully", node_name),
                Err(e) => tracing::error!("Error shutting down node '{}': {}", node_name, e),
            }
            let _ = registered.context.shutdown();
            registered.initialized = false;
        }
    }

    /// Names of all registered nodes, in execution order
    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    /// Tick metrics of a node
    pub fn get_node_metrics(&self, name: &str) -> Option<NodeMetrics> {
        self.nodes
            .iter()
            .find(|r| r.node.name() == name)
            .map(|r| r.context.metrics().clone())
    }

    /// Lifecycle state of a node
    pub fn get_node_state(&self, name: &str) -> Option<NodeState> {
        self.nodes
            .iter()
            .find(|r| r.node.name() == name)
            .map(|r| r.context.state().clone())
    }

    /// Number of completed scheduler passes
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
