//! Bitmap rendering of a descent run.
//!
//! - `landscape`: error surface + visited paths (`*_descent_path.png`)
//! - `steps`: log-error per step (`*_error_decrease.png`)
//! - `animation`: two-panel GIF replay
//!
//! Draw calls take an explicit `RenderContext`.

pub mod animation;
pub mod context;
pub mod landscape;
pub mod palette;
pub mod steps;

pub use animation::{FramePlan, render_animation};
pub use context::RenderContext;
pub use landscape::render_descent_path;
pub use steps::{StepSeries, render_error_decrease, step_series};
