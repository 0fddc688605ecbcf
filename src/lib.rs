//! Mapview: timed lighting, ring motion and map-object lifecycles for
//! rhythm-game beatmap previews.

pub mod beatmap;
pub mod color;
pub mod config;
pub mod easing;
pub mod lighting;
pub mod objects;
pub mod preview;
pub mod rings;
pub mod timeline;
pub mod timing;

pub use preview::{ObjectHost, PreviewSink, Previewer};
