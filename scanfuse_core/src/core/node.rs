use crate::error::{ScanfuseError, ScanfuseResult};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::Level;

/// Trait for providing lightweight logging summaries of message types
///
/// Large messages (grids, point lists) should only summarize their metadata
/// so that logging never clones the payload.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Configuration parameters for node behavior
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub enable_logging: bool,
    /// Most verbose level this node emits when logging is enabled
    pub log_level: Level,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            enable_logging: true,
            log_level: Level::INFO,
        }
    }
}

/// Runtime context for a scanfuse node
///
/// Owned by the scheduler, lent to the node on every tick. Tracks lifecycle
/// state and tick metrics, and routes node logging into `tracing` with the
/// node name attached.
pub struct NodeInfo {
    name: String,

    state: NodeState,
    previous_state: NodeState,

    config: NodeConfig,
    metrics: NodeMetrics,

    last_tick_time: Option<Instant>,
    tick_start_time: Option<Instant>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,
}

impl NodeInfo {
    pub fn new(node_name: String, logging_enabled: bool) -> Self {
        let config = NodeConfig {
            enable_logging: logging_enabled,
            ..Default::default()
        };
        Self::new_with_config(node_name, config)
    }

    pub fn new_with_config(node_name: String, config: NodeConfig) -> Self {
        Self {
            name: node_name,
            state: NodeState::Uninitialized,
            previous_state: NodeState::Uninitialized,
            config,
            metrics: NodeMetrics::default(),
            last_tick_time: None,
            tick_start_time: None,
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
        }
    }

    // State Management Methods
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn previous_state(&self) -> &NodeState {
        &self.previous_state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            self.previous_state = self.state.clone();
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    // Lifecycle Methods
    pub fn initialize(&mut self) -> ScanfuseResult<()> {
        match self.state {
            NodeState::Uninitialized | NodeState::Stopped => {
                self.set_state(NodeState::Initializing);
                self.set_state(NodeState::Running);
                Ok(())
            }
            ref other => Err(ScanfuseError::node(
                self.name.clone(),
                format!("cannot initialize from state {}", other),
            )),
        }
    }

    pub fn shutdown(&mut self) -> ScanfuseResult<()> {
        self.set_state(NodeState::Stopping);
        self.set_state(NodeState::Stopped);
        Ok(())
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.successful_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;

            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            // Running average over successful ticks
            let total_duration =
                self.metrics.avg_tick_duration_ms * (self.metrics.successful_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total_duration + duration_ms) / self.metrics.successful_ticks as f64;

            self.last_tick_time = Some(Instant::now());
        }
    }

    pub fn record_tick_failure(&mut self, error_msg: String) {
        self.metrics.total_ticks += 1;
        self.metrics.failed_ticks += 1;

        if let Some(start_time) = self.tick_start_time.take() {
            self.metrics.last_tick_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        }

        self.log_error(&error_msg);
    }

    fn enabled(&self, level: Level) -> bool {
        self.config.enable_logging && level <= self.config.log_level
    }

    // Pub/sub logging
    pub fn log_pub<T: LogSummary>(&mut self, topic: &str, data: &T) {
        let summary = data.log_summary();
        self.log_pub_summary(topic, &summary);
    }

    pub fn log_sub<T: LogSummary>(&mut self, topic: &str, data: &T) {
        let summary = data.log_summary();
        self.log_sub_summary(topic, &summary);
    }

    /// Record a publish with a pre-computed summary
    ///
    /// Used by `Hub::send`, which no longer owns the message once it is queued.
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(node = %self.name, topic, "--PUB--> {}", summary);
        }
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    /// Record a receive with a pre-computed summary
    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(node = %self.name, topic, "<--SUB-- {}", summary);
        }
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
    }

    pub fn log_info(&self, message: &str) {
        if self.enabled(Level::INFO) {
            tracing::info!(node = %self.name, "{}", message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.enabled(Level::WARN) {
            tracing::warn!(node = %self.name, "{}", message);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        if self.enabled(Level::ERROR) {
            tracing::error!(node = %self.name, "{}", message);
        }
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&mut self, message: &str) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(node = %self.name, "{}", message);
        }
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
    pub fn last_tick_time(&self) -> Option<Instant> {
        self.last_tick_time
    }
}

/// Topic metadata for introspection
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMetadata {
    pub topic_name: String,
    pub type_name: String,
}

impl TopicMetadata {
    pub fn of<T>(topic_name: &str) -> Self {
        Self {
            topic_name: topic_name.to_string(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}

/// Trait for scanfuse nodes with full lifecycle support
pub trait Node: Send {
    /// Get the node's name (must be unique within a scheduler)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once at startup)
    fn init(&mut self, ctx: &mut NodeInfo) -> ScanfuseResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step (called repeatedly, must not block)
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> ScanfuseResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }

    /// Topics this node publishes
    fn get_publishers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    /// Topics this node subscribes to
    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    /// Handle a failed tick (optional override)
    fn on_error(&mut self, error: &str, ctx: &mut NodeInfo) {
        ctx.log_error(&format!("Node error: {}", error));
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for u64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for usize {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}
