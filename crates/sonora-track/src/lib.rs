//! sonora-track: the immutable `Track` façade over `sonora-dsp` and
//! `sonora-codec` — construction, measurement, chained transforms, export.

pub mod defaults;
mod track;

pub use track::{Pcm, Track};
