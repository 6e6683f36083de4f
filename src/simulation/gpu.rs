//! GPU simulations
//!
//! Simulations that own a render pipeline and draw into an offscreen target of
//! their own, rather than uploading a CPU pixel buffer. The pipeline itself lives
//! in [`crate::gfx::line_renderer`]; the simulation only feeds it uniforms.

pub mod pendulum;
