use std::fmt::Write;

use crate::simulation::statistics::TickStatistics;
use crate::world::World;

const LABEL_WIDTH: usize = 5;
const CELL_WIDTH: usize = 6;

/// Draw the grid with `y` increasing upwards, one `|`-separated column per
/// cell, and an x-axis row underneath.
pub fn render_grid(world: &World) -> String {
    let mut out = String::new();
    for y in (0..world.height()).rev() {
        write!(out, "{:<LABEL_WIDTH$}", y).ok();
        for x in 0..world.width() {
            write!(out, "|{:<CELL_WIDTH$}", world.symbols_at(x, y)).ok();
        }
        out.push('\n');
    }
    write!(out, "{:<LABEL_WIDTH$}", "").ok();
    for x in 0..world.width() {
        write!(out, "|{:<CELL_WIDTH$}", x).ok();
    }
    out.push_str("x\n");
    out
}

pub fn summary_line(stats: &TickStatistics) -> String {
    format!(
        "quiet {} | jailed {} | active {} | arrests {}",
        stats.counts.quiet, stats.counts.jailed, stats.counts.active, stats.arrests
    )
}

/// A full console frame: header, grid and counts.
pub fn render_frame(world: &World, stats: &TickStatistics) -> String {
    format!(
        "Frame #{}\n{}{}\n",
        stats.tick,
        render_grid(world),
        summary_line(stats)
    )
}
