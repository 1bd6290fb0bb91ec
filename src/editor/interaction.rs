//! Block dragging, connection drawing and hit-testing in world coordinates.

use crate::pipeline::block::{BlockInstance, Position};
use crate::pipeline::id::BlockId;
use crate::pipeline::port::PortKind;
use crate::pipeline::store::CanvasBounds;
use egui::{Pos2, Rect, Vec2};

/// World-space pick radius of a port.
pub const PORT_RADIUS: f32 = 7.0;

/// In-progress drag of a block body.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDrag {
    pub block: BlockId,
    /// Pointer position relative to the block's top-left.
    grab_offset: Vec2,
}

impl BlockDrag {
    pub fn begin(block: BlockId, pointer_world: Pos2, block_pos: Position) -> Self {
        Self {
            block,
            grab_offset: pointer_world - block_pos.to_pos2(),
        }
    }

    /// New top-left for the pointer position, kept inside the canvas.
    pub fn update(&self, pointer_world: Pos2, bounds: &CanvasBounds) -> Position {
        bounds.clamp(Position::from(pointer_world - self.grab_offset))
    }
}

/// A port under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortHit {
    pub block: BlockId,
    pub kind: PortKind,
}

/// A connection being drawn from one port.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDraft {
    pub from: PortHit,
    /// Floating endpoint in world coordinates.
    pub pointer: Pos2,
}

impl ConnectionDraft {
    pub fn begin(block: BlockId, kind: PortKind, pointer: Pos2) -> Self {
        Self {
            from: PortHit { block, kind },
            pointer,
        }
    }

    pub fn update(&mut self, pointer: Pos2) {
        self.pointer = pointer;
    }

    /// Release over `target`. Returns the normalized `(from, to)` pair, or
    /// `None` when the draw is cancelled (empty canvas, same block, or two
    /// ports of the same kind).
    pub fn finish(self, target: Option<PortHit>) -> Option<(BlockId, BlockId)> {
        let target = target?;
        if target.block == self.from.block || target.kind == self.from.kind {
            tracing::trace!("Connection draft cancelled at {:?}", target);
            return None;
        }
        match self.from.kind {
            PortKind::Output => Some((self.from.block, target.block)),
            PortKind::Input => Some((target.block, self.from.block)),
        }
    }
}

pub fn block_rect(pos: Position, size: Vec2) -> Rect {
    Rect::from_min_size(pos.to_pos2(), size)
}

/// Centre of a port: inputs on the left edge, outputs on the right.
pub fn port_position(pos: Position, kind: PortKind, size: Vec2) -> Pos2 {
    let y = pos.y + size.y * 0.5;
    match kind {
        PortKind::Input => Pos2::new(pos.x, y),
        PortKind::Output => Pos2::new(pos.x + size.x, y),
    }
}

/// Top-most port within `radius` of `world`. Sources have no input port.
pub fn hit_port(blocks: &[BlockInstance], world: Pos2, size: Vec2, radius: f32) -> Option<PortHit> {
    let hit = blocks.iter().rev().find_map(|block| {
        [PortKind::Output, PortKind::Input]
            .into_iter()
            .filter(|kind| kind.exists_on(block.is_source()))
            .find(|kind| port_position(block.position, *kind, size).distance(world) <= radius)
            .map(|kind| PortHit {
                block: block.id.clone(),
                kind,
            })
    });
    tracing::trace!("hit_port at ({:.1}, {:.1}): {:?}", world.x, world.y, hit);
    hit
}

/// Top-most block whose body contains `world`. Later blocks are drawn on top.
pub fn block_at(blocks: &[BlockInstance], world: Pos2, size: Vec2) -> Option<&BlockId> {
    blocks
        .iter()
        .rev()
        .find(|b| block_rect(b.position, size).contains(world))
        .map(|b| &b.id)
}

/// Control points of the connection curve between two ports.
pub fn connection_curve(from: Pos2, to: Pos2) -> [Pos2; 4] {
    let bend = ((to.x - from.x).abs() * 0.5).max(40.0);
    [from, Pos2::new(from.x + bend, from.y), Pos2::new(to.x - bend, to.y), to]
}

/// Points along a cubic bezier curve.
pub fn bezier_points(p: [Pos2; 4], segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            let (uu, tt) = (u * u, t * t);
            let w = [uu * u, 3.0 * uu * t, 3.0 * u * tt, tt * t];
            Pos2::new(
                w[0] * p[0].x + w[1] * p[1].x + w[2] * p[2].x + w[3] * p[3].x,
                w[0] * p[0].y + w[1] * p[1].y + w[2] * p[2].y + w[3] * p[3].y,
            )
        })
        .collect()
}
