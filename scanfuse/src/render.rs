//! Console renderer for map frames
//!
//! Draws the occupancy grid as text. The robot marker and the latest scan
//! points are overlaid on the evidence, nothing is interpolated.

use colored::Colorize;
use scanfuse_core::core::{LogSummary, TopicMetadata};
use scanfuse_core::error::ScanfuseResult;
use scanfuse_core::{Hub, Node, NodeInfo, NodeInfoExt};
use scanfuse_library::{MapFrame, OccupancyGrid, Pose2D, Vector2};

/// Evidence ramp from empty to saturated
const RAMP: [char; 5] = [' ', '.', ':', '+', '#'];
const ROBOT: char = 'R';
const POINT: char = '*';

fn ramp(value: u32, max: u32) -> char {
    if value == 0 || max == 0 {
        return RAMP[0];
    }
    let steps = (RAMP.len() - 2) as u64;
    let level = (value as u64 * steps / max as u64).min(steps) as usize;
    RAMP[level + 1]
}

/// Render a grid as text rows, top row first
///
/// Scan points are only drawn on cells without evidence; the robot marker
/// is drawn last.
pub fn render_ascii(grid: &OccupancyGrid, pose: Option<Pose2D>, points: &[Vector2]) -> Vec<String> {
    let (width, height) = grid.dimensions();
    let mut canvas: Vec<Vec<char>> = (0..height)
        .map(|cy| {
            grid.row(cy)
                .unwrap_or(&[])
                .iter()
                .map(|&value| ramp(value, grid.max_confidence()))
                .collect()
        })
        .collect();

    let mut plot = |point: Vector2, mark: char, overwrite: bool| {
        if !point.is_finite() {
            return;
        }
        let (cx, cy) = grid.world_to_cell(point);
        if grid.contains(cx, cy) {
            let cell = &mut canvas[cy as usize][cx as usize];
            if overwrite || *cell == RAMP[0] {
                *cell = mark;
            }
        }
    };

    for &point in points {
        plot(point, POINT, false);
    }
    if let Some(pose) = pose {
        plot(pose.position, ROBOT, true);
    }

    let border = format!("+{}+", "-".repeat(width));
    let mut lines = Vec::with_capacity(height + 2);
    lines.push(border.clone());
    lines.extend(canvas.into_iter().map(|row| format!("|{}|", row.into_iter().collect::<String>())));
    lines.push(border);
    lines
}

fn colorize(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '#' => c.to_string().red().bold().to_string(),
            '+' | ':' => c.to_string().yellow().to_string(),
            ROBOT => c.to_string().green().bold().to_string(),
            POINT => c.to_string().cyan().to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Console Renderer Node
///
/// Subscribes to map frames, logs a summary of each and prints the last
/// frame as a text map on shutdown.
pub struct ConsoleRenderer {
    subscriber: Hub<MapFrame>,

    // State
    latest: Option<MapFrame>,
    frames_seen: u64,
}

impl ConsoleRenderer {
    /// Create a renderer on the default topic "map/frame"
    pub fn new() -> ScanfuseResult<Self> {
        Self::new_with_topic("map/frame")
    }

    pub fn new_with_topic(topic: &str) -> ScanfuseResult<Self> {
        Ok(Self {
            subscriber: Hub::new(topic)?,
            latest: None,
            frames_seen: 0,
        })
    }

    pub fn latest_frame(&self) -> Option<&MapFrame> {
        self.latest.as_ref()
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Text rendering of the latest frame
    pub fn render_latest(&self) -> Option<Vec<String>> {
        self.latest
            .as_ref()
            .map(|frame| render_ascii(&frame.grid, Some(frame.pose), &frame.points))
    }
}

impl Node for ConsoleRenderer {
    fn name(&self) -> &'static str {
        "ConsoleRenderer"
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        for frame in self.subscriber.drain(ctx.as_deref_mut()) {
            self.frames_seen += 1;
            ctx.log_info(&format!(
                "{} pose {} evidence {}",
                frame.log_summary(),
                frame.pose.log_summary(),
                frame.grid.total_evidence()
            ));
            self.latest = Some(frame);
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> ScanfuseResult<()> {
        match self.render_latest() {
            Some(lines) => {
                println!();
                println!("{}", "Occupancy grid".bold());
                for line in lines {
                    println!("{}", colorize(&line));
                }
            }
            None => ctx.log_warning("No map frame received"),
        }
        ctx.log_info(&format!("Renderer shutdown after {} frames", self.frames_seen));
        Ok(())
    }

    fn get_subscribers(&self) -> Vec<TopicMetadata> {
        vec![TopicMetadata::of::<MapFrame>(self.subscriber.get_topic_name())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_levels() {
        assert_eq!(ramp(0, 100), ' ');
        assert_eq!(ramp(1, 100), '.');
        assert_eq!(ramp(40, 100), ':');
        assert_eq!(ramp(70, 100), '+');
        assert_eq!(ramp(100, 100), '#');
    }

    #[test]
    fn test_render_ascii_layout() {
        let mut grid = OccupancyGrid::new(4, 3, 1.0);
        for _ in 0..100 {
            grid.increment(0, 0);
        }

        let lines = render_ascii(&grid, None, &[]);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "+----+");
        assert_eq!(lines[1], "|#   |");
        assert_eq!(lines[4], "+----+");
    }

    #[test]
    fn test_render_overlays() {
        let mut grid = OccupancyGrid::new(4, 4, 1.0);
        // Offsets are (2, 2): world (0.5, 0.5) is cell (2, 1)
        grid.increment(2, 1);

        let points = [Vector2::new(0.5, 0.5), Vector2::new(-1.5, -1.5), Vector2::new(9.0, 9.0)];
        let pose = Pose2D::from_xy(1.5, -0.5, 0.0);
        let lines = render_ascii(&grid, Some(pose), &points);

        // Evidence wins over a scan point, off-grid points vanish
        assert_eq!(lines[2], "|  . |");
        assert_eq!(lines[3], "|   R|");
        assert_eq!(lines[4], "|*   |");
    }

    #[test]
    fn test_renderer_keeps_latest_frame() {
        let topic = "test_render/frames";
        let publisher: Hub<MapFrame> = Hub::new(topic).unwrap();
        let mut renderer = ConsoleRenderer::new_with_topic(topic).unwrap();
        assert!(renderer.render_latest().is_none());

        for increments in [1, 2] {
            publisher.send(
                MapFrame {
                    pose: Pose2D::default(),
                    points: Vec::new(),
                    grid: OccupancyGrid::default(),
                    stable: true,
                    increments,
                    timestamp: 0,
                },
                None,
            );
        }
        renderer.tick(None);

        assert_eq!(renderer.frames_seen(), 2);
        assert_eq!(renderer.latest_frame().unwrap().increments, 2);
        assert_eq!(renderer.render_latest().unwrap().len(), 22);
    }
}
