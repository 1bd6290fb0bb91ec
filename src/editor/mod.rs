//! Canvas interaction: coordinate math, dragging and connection drawing.
//!
//! Nothing in here paints; the frontend feeds pointer positions in and
//! applies the results to the `GraphStore`.

pub mod interaction;
pub mod viewport;

pub use interaction::{block_at, hit_port, port_position, BlockDrag, ConnectionDraft, PortHit};
pub use viewport::Viewport;
