//! Texture-synthesis operators over heightmaps (spec C17): image quilting
//! (Efros-Freeman patch stitching with a min-cost cut seam) and
//! non-parametric per-pixel sampling.

pub mod quilting;
pub mod sampling;

pub use quilting::{quilting, quilting_blend, quilting_expand, quilting_shuffle, QuiltingParams};
pub use sampling::{non_parametric_sample, NonParametricParams};
