//! Map objects: notes, bombs, walls, arcs and chains, and the windowed
//! lifecycle that gives them pooled visuals while they are on screen.

pub mod geometry;
pub mod kinds;
pub mod lifecycle;
pub mod loader;
pub mod window;

pub use kinds::{Arc, Bomb, Chain, Note, ObjectTime, Wall};
pub use lifecycle::{ObjectManager, ObjectState, Placement, Spawnable, VisualHost};
pub use loader::{load_objects, MapObjects};
pub use window::{JumpSettings, SpawnContext};
