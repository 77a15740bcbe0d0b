#![deny(unsafe_code)]
//! Core of the magfield 2D magnetostatics visualizer.
//!
//! Provides the dipole and wire field laws (`Dipole`, `Wire`, `FieldSource`),
//! superposition (`Superposition`, `VectorField`), direction-normalized RK4
//! streamline tracing (`Tracer`, `rk4_step`), jittered seeding, the
//! progressive batch scheduler, and the `Session` that owns it all.
//!
//! The core never draws. Hosts read field vectors, streamlines and arrow
//! samples from it and render them however they like.

pub mod config;
pub mod error;
pub mod grid;
pub mod params;
pub mod prng;
pub mod scene;
pub mod scheduler;
pub mod seeding;
pub mod session;
pub mod source;
pub mod streamline;
pub mod superposition;
pub mod viewport;

pub use config::{DisplayConfig, FieldConstants, SessionConfig, StreamSettings, StrengthPresets};
pub use error::FieldError;
pub use grid::ArrowSample;
pub use prng::{JitterRng, Xorshift64};
pub use scene::Scene;
pub use scheduler::{ProgressiveScheduler, Tick};
pub use session::{Hit, RenderPass, Session};
pub use source::{Dipole, FieldSource, Polarity, Source, Wire};
pub use streamline::{rk4_step, Direction, StreamPoint, Streamline, Tracer};
pub use superposition::{superpose, Superposition, VectorField};
pub use viewport::Viewport;
