//! Simulation session: the single owner of sources, settings and render state.
//!
//! The host (a canvas UI, the CLI) holds a [`Session`], mutates sources
//! through it, and asks it to [`render`](Session::render) and
//! [`tick`](Session::tick). Field queries borrow the live source collections
//! every time, so a dipole dragged between two frames is seen by the very
//! next query.

use crate::config::{SessionConfig, StreamSettings};
use crate::error::FieldError;
use crate::grid::{sample_vector_grid, ArrowSample};
use crate::prng::{JitterRng, Xorshift64};
use crate::scene::Scene;
use crate::scheduler::{needs_progressive, ProgressiveScheduler, Tick, INTERACTIVE_DENSITY};
use crate::seeding::generate_seeds;
use crate::source::{Dipole, Polarity, Wire};
use crate::streamline::{Streamline, Tracer};
use crate::superposition::Superposition;
use crate::viewport::Viewport;
use glam::DVec2;
use log::debug;

/// Fraction of the canvas kept clear on each side when placing a new source
/// at a random position.
const SPAWN_MARGIN: f64 = 0.2;

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Rotation handle of the dipole at this index.
    DipoleHandle(usize),
    /// Body of the dipole at this index.
    Dipole(usize),
    /// Wire at this index.
    Wire(usize),
}

/// Result of an explicit render request.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPass {
    /// Every streamline, traced synchronously.
    Complete(Vec<Streamline>),
    /// Seeds were queued; drive [`Session::tick`] until it reports finished.
    Progressive { seeds: usize, batches: usize },
}

/// Sources, settings, jitter PRNG and progressive render state for one canvas.
#[derive(Debug, Clone)]
pub struct Session {
    viewport: Viewport,
    config: SessionConfig,
    seed: u64,
    rng: Xorshift64,
    dipoles: Vec<Dipole>,
    wires: Vec<Wire>,
    scheduler: ProgressiveScheduler,
    interacting: bool,
}

impl Session {
    /// Empty session. Fails if the viewport or config is invalid.
    pub fn new(viewport: Viewport, config: SessionConfig, seed: u64) -> Result<Self, FieldError> {
        viewport.validate()?;
        config.validate()?;
        Ok(Self {
            viewport,
            config,
            seed,
            rng: Xorshift64::new(seed),
            dipoles: Vec::new(),
            wires: Vec::new(),
            scheduler: ProgressiveScheduler::default(),
            interacting: false,
        })
    }

    /// The initial-load session: one dipole at the canvas centre.
    pub fn with_default_dipole(
        viewport: Viewport,
        config: SessionConfig,
        seed: u64,
    ) -> Result<Self, FieldError> {
        let mut session = Self::new(viewport, config, seed)?;
        let centre = viewport.center();
        session.add_dipole_at(centre.x, centre.y);
        Ok(session)
    }

    /// Restores a session from a scene file.
    ///
    /// Source strengths are reset to the scene's presets: every dipole takes
    /// the preset moment and every wire the preset current magnitude with its
    /// own sign.
    pub fn from_scene(scene: &Scene) -> Result<Self, FieldError> {
        scene.validate()?;
        let mut session = Self::new(scene.viewport()?, scene.config, scene.seed)?;
        session.dipoles = scene.dipoles.clone();
        session.wires = scene.wires.clone();
        let presets = session.config.presets;
        session.set_dipole_moment(presets.dipole_moment)?;
        session.set_wire_current(presets.wire_current)?;
        Ok(session)
    }

    /// Snapshot of the current sources and settings.
    ///
    /// The scene records the construction seed, not the current PRNG state.
    pub fn to_scene(&self) -> Scene {
        Scene {
            width: self.viewport.width,
            height: self.viewport.height,
            seed: self.seed,
            config: self.config,
            dipoles: self.dipoles.clone(),
            wires: self.wires.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current canvas extent.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Active configuration, presets included.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Dipoles in insertion order; indices match [`Hit`] and the edit methods.
    pub fn dipoles(&self) -> &[Dipole] {
        &self.dipoles
    }

    /// Wires in insertion order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// True while the host reports an ongoing drag or rotation.
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Progressive render state, for progress display.
    pub fn scheduler(&self) -> &ProgressiveScheduler {
        &self.scheduler
    }

    /// Borrowed view of the live sources for field queries.
    pub fn field(&self) -> Superposition<'_> {
        Superposition::new(&self.dipoles, &self.wires, self.config.constants)
    }

    /// Tracer built from the current step size, length and canvas.
    pub fn tracer(&self) -> Tracer {
        Tracer::new(
            self.config.stream.step_size,
            self.config.stream.stream_length,
            self.viewport,
        )
    }

    // -----------------------------------------------------------------------
    // Source edits
    // -----------------------------------------------------------------------

    fn spawn_point(&mut self) -> DVec2 {
        let (w, h) = (self.viewport.width, self.viewport.height);
        DVec2::new(
            self.rng.next_range(w * SPAWN_MARGIN, w * (1.0 - SPAWN_MARGIN)),
            self.rng.next_range(h * SPAWN_MARGIN, h * (1.0 - SPAWN_MARGIN)),
        )
    }

    /// Adds a dipole at a random interior position. Returns its index.
    pub fn add_dipole(&mut self) -> usize {
        let p = self.spawn_point();
        self.add_dipole_at(p.x, p.y)
    }

    /// Adds a dipole with angle 0 and the preset moment. Returns its index.
    pub fn add_dipole_at(&mut self, x: f64, y: f64) -> usize {
        self.dipoles.push(Dipole::new(
            x,
            y,
            0.0,
            self.config.presets.dipole_moment,
            self.config.display.dipole_radius,
        ));
        debug!("added dipole {} at ({x:.1}, {y:.1})", self.dipoles.len() - 1);
        self.dipoles.len() - 1
    }

    /// Adds a wire at a random interior position. Returns its index.
    pub fn add_wire(&mut self, polarity: Polarity) -> usize {
        let p = self.spawn_point();
        self.add_wire_at(p.x, p.y, polarity)
    }

    /// Adds a wire carrying the preset current with the given sign.
    pub fn add_wire_at(&mut self, x: f64, y: f64, polarity: Polarity) -> usize {
        self.wires.push(Wire::new(
            x,
            y,
            polarity.sign() * self.config.presets.wire_current.abs(),
            self.config.display.wire_radius,
        ));
        debug!(
            "added {polarity:?} wire {} at ({x:.1}, {y:.1})",
            self.wires.len() - 1
        );
        self.wires.len() - 1
    }

    fn dipole_mut(&mut self, index: usize) -> Result<&mut Dipole, FieldError> {
        let len = self.dipoles.len();
        self.dipoles
            .get_mut(index)
            .ok_or(FieldError::SourceOutOfRange {
                kind: "dipole",
                index,
                len,
            })
    }

    fn wire_mut(&mut self, index: usize) -> Result<&mut Wire, FieldError> {
        let len = self.wires.len();
        self.wires.get_mut(index).ok_or(FieldError::SourceOutOfRange {
            kind: "wire",
            index,
            len,
        })
    }

    pub fn move_dipole(&mut self, index: usize, x: f64, y: f64) -> Result<(), FieldError> {
        let d = self.dipole_mut(index)?;
        d.x = x;
        d.y = y;
        Ok(())
    }

    pub fn move_wire(&mut self, index: usize, x: f64, y: f64) -> Result<(), FieldError> {
        let w = self.wire_mut(index)?;
        w.x = x;
        w.y = y;
        Ok(())
    }

    pub fn set_dipole_angle(&mut self, index: usize, angle: f64) -> Result<(), FieldError> {
        self.dipole_mut(index)?.angle = angle;
        Ok(())
    }

    /// Points dipole `index` at (x, y), as when dragging its rotation handle.
    pub fn rotate_dipole_towards(&mut self, index: usize, x: f64, y: f64) -> Result<(), FieldError> {
        let d = self.dipole_mut(index)?;
        d.angle = (y - d.y).atan2(x - d.x);
        Ok(())
    }

    /// Sets the moment preset and applies it to every dipole.
    pub fn set_dipole_moment(&mut self, moment: f64) -> Result<(), FieldError> {
        if !moment.is_finite() {
            return Err(FieldError::setting("dipole_moment", "must be finite"));
        }
        self.config.presets.dipole_moment = moment;
        self.dipoles.iter_mut().for_each(|d| d.moment = moment);
        debug!("dipole moment set to {moment}");
        Ok(())
    }

    /// Sets the current preset and applies its magnitude to every wire,
    /// keeping each wire's sign.
    pub fn set_wire_current(&mut self, current: f64) -> Result<(), FieldError> {
        if !current.is_finite() {
            return Err(FieldError::setting("wire_current", "must be finite"));
        }
        let magnitude = current.abs();
        self.config.presets.wire_current = magnitude;
        self.wires
            .iter_mut()
            .for_each(|w| w.current = magnitude.copysign(w.current));
        debug!("wire current set to {magnitude}");
        Ok(())
    }

    /// Removes every source and drops any queued streamline work.
    pub fn clear(&mut self) {
        self.dipoles.clear();
        self.wires.clear();
        self.scheduler.cancel();
        debug!("cleared all sources");
    }

    /// First source under (x, y): rotation handles, then dipole bodies, then wires.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Hit> {
        let p = DVec2::new(x, y);
        self.dipoles
            .iter()
            .position(|d| d.handle_contains(p))
            .map(Hit::DipoleHandle)
            .or_else(|| self.dipoles.iter().position(|d| d.contains(p)).map(Hit::Dipole))
            .or_else(|| self.wires.iter().position(|w| w.contains(p)).map(Hit::Wire))
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Replaces the configuration. Preset changes are applied to existing sources.
    pub fn set_config(&mut self, config: SessionConfig) -> Result<(), FieldError> {
        config.validate()?;
        let presets_changed = config.presets != self.config.presets;
        self.config = config;
        if presets_changed {
            self.set_dipole_moment(config.presets.dipole_moment)?;
            self.set_wire_current(config.presets.wire_current)?;
        }
        Ok(())
    }

    pub fn set_stream_settings(&mut self, stream: StreamSettings) -> Result<(), FieldError> {
        let mut config = self.config;
        config.stream = stream;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Changes the canvas size and drops any queued streamline work.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), FieldError> {
        self.viewport = Viewport::new(width, height)?;
        self.scheduler.cancel();
        Ok(())
    }

    /// Set while the user drags or rotates a source.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
    }

    // -----------------------------------------------------------------------
    // Field queries and rendering
    // -----------------------------------------------------------------------

    pub fn total_field(&self, x: f64, y: f64) -> DVec2 {
        self.field().total_field(x, y)
    }

    pub fn trace(&self, x: f64, y: f64) -> Streamline {
        self.tracer().trace(&self.field(), DVec2::new(x, y))
    }

    /// Arrow samples at the configured grid spacing, or nothing if vectors are hidden.
    pub fn vector_grid(&self) -> Vec<ArrowSample> {
        if !self.config.stream.show_vectors {
            return Vec::new();
        }
        sample_vector_grid(
            &self.field(),
            &self.viewport,
            self.config.stream.grid_spacing,
            &self.config.display,
        )
    }

    /// Coarse synchronous streamlines for use while the user is interacting.
    pub fn interactive_streamlines(&mut self) -> Vec<Streamline> {
        let seeds = generate_seeds(INTERACTIVE_DENSITY, &self.viewport, &mut self.rng);
        let field = Superposition::new(&self.dipoles, &self.wires, self.config.constants);
        self.tracer().trace_all(&field, &seeds)
    }

    /// Full render request.
    ///
    /// During interaction this is the coarse synchronous pass and leaves any
    /// in-flight progressive work paused. Otherwise it reseeds at the
    /// configured density and either traces synchronously or restarts the
    /// progressive queue from batch 0.
    pub fn render(&mut self) -> RenderPass {
        if !self.config.stream.show_streamlines {
            self.scheduler.cancel();
            return RenderPass::Complete(Vec::new());
        }
        if self.interacting {
            return RenderPass::Complete(self.interactive_streamlines());
        }
        let seeds = generate_seeds(self.config.stream.stream_density, &self.viewport, &mut self.rng);
        if needs_progressive(seeds.len()) {
            self.scheduler.start(&seeds);
            return RenderPass::Progressive {
                seeds: seeds.len(),
                batches: self.scheduler.total_batches(),
            };
        }
        self.scheduler.cancel();
        let field = Superposition::new(&self.dipoles, &self.wires, self.config.constants);
        RenderPass::Complete(self.tracer().trace_all(&field, &seeds))
    }

    /// One progressive unit; call once per animation frame.
    pub fn tick(&mut self) -> Tick {
        let tracer = self.tracer();
        let field = Superposition::new(&self.dipoles, &self.wires, self.config.constants);
        self.scheduler
            .advance_one_unit(&field, &tracer, self.interacting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Viewport {
        Viewport::new(800.0, 600.0).unwrap()
    }

    fn session() -> Session {
        Session::with_default_dipole(canvas(), SessionConfig::default(), 42).unwrap()
    }

    fn drain(session: &mut Session) -> Vec<Streamline> {
        let mut lines = Vec::new();
        loop {
            match session.tick() {
                Tick::Traced {
                    streamlines,
                    finished,
                    ..
                } => {
                    lines.extend(streamlines);
                    if finished {
                        return lines;
                    }
                }
                other => panic!("unexpected tick {other:?}"),
            }
        }
    }

    #[test]
    fn default_session_has_centred_dipole() {
        let s = session();
        assert_eq!(s.dipoles().len(), 1);
        assert_eq!(s.dipoles()[0].position(), DVec2::new(400.0, 300.0));
        assert_eq!(s.dipoles()[0].angle, 0.0);
    }

    #[test]
    fn end_to_end_field_matches_closed_form() {
        let s = session();
        let b = s.total_field(420.0, 300.0);
        let r2: f64 = 20.0 * 20.0 + 5.0 * 5.0;
        let r = r2.sqrt();
        let expected = (1.0 / (r2 * r)) * (3.0 * 100.0 * (20.0 / r) * (20.0 / r) - 100.0);
        assert!((b.x - expected).abs() < 1e-12, "bx = {}, expected {expected}", b.x);
        assert!(b.y.abs() < 1e-15);
    }

    #[test]
    fn new_sources_use_presets_and_stay_inside_spawn_area() {
        let mut s = session();
        let i = s.add_dipole();
        let j = s.add_wire(Polarity::Negative);
        let d = s.dipoles()[i];
        let w = s.wires()[j];
        assert_eq!(d.moment, 100.0);
        assert_eq!(w.current, -50.0);
        for p in [d.position(), w.position()] {
            assert!((160.0..=640.0).contains(&p.x) && (120.0..=480.0).contains(&p.y));
        }
    }

    #[test]
    fn strength_changes_are_retroactive_and_keep_wire_signs() {
        let mut s = session();
        s.add_dipole_at(100.0, 100.0);
        s.add_wire_at(200.0, 200.0, Polarity::Positive);
        s.add_wire_at(300.0, 200.0, Polarity::Negative);

        s.set_dipole_moment(250.0).unwrap();
        s.set_wire_current(-80.0).unwrap();

        assert!(s.dipoles().iter().all(|d| d.moment == 250.0));
        assert_eq!(s.wires()[0].current, 80.0);
        assert_eq!(s.wires()[1].current, -80.0);

        // New sources pick up the new presets.
        let k = s.add_wire_at(0.0, 0.0, Polarity::Negative);
        assert_eq!(s.wires()[k].current, -80.0);
        assert!(s.set_dipole_moment(f64::NAN).is_err());
    }

    #[test]
    fn edits_are_seen_by_the_next_query() {
        let mut s = session();
        let before = s.total_field(500.0, 300.0);
        s.move_dipole(0, 600.0, 300.0).unwrap();
        let after = s.total_field(500.0, 300.0);
        assert_ne!(before, after);
        s.rotate_dipole_towards(0, 600.0, 400.0).unwrap();
        assert!((s.dipoles()[0].angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_edits_are_errors() {
        let mut s = session();
        assert!(matches!(
            s.move_wire(0, 1.0, 1.0),
            Err(FieldError::SourceOutOfRange { kind: "wire", .. })
        ));
        assert!(s.set_dipole_angle(3, 0.0).is_err());
    }

    #[test]
    fn hit_test_prefers_handles_then_dipoles_then_wires() {
        let mut s = session();
        s.add_wire_at(400.0, 300.0, Polarity::Positive);
        // Dipole body and wire overlap at the centre.
        assert_eq!(s.hit_test(400.0, 300.0), Some(Hit::Dipole(0)));
        // Handle at (430, 300)
        assert_eq!(s.hit_test(431.0, 300.0), Some(Hit::DipoleHandle(0)));
        // Outside the dipole body but within the wire's grab radius.
        assert_eq!(s.hit_test(400.0, 325.0), Some(Hit::Wire(0)));
        assert_eq!(s.hit_test(10.0, 10.0), None);
    }

    #[test]
    fn clear_removes_sources_and_cancels_progress() {
        let mut s = session();
        s.render();
        assert!(s.scheduler().is_active());
        s.clear();
        assert!(s.dipoles().is_empty() && s.wires().is_empty());
        assert!(!s.scheduler().is_active());
        assert_eq!(s.total_field(10.0, 10.0), DVec2::ZERO);
    }

    #[test]
    fn low_density_renders_synchronously() {
        let mut s = session();
        let mut stream = s.config().stream;
        stream.stream_density = 10;
        s.set_stream_settings(stream).unwrap();
        match s.render() {
            RenderPass::Complete(lines) => {
                assert!(!lines.is_empty() && lines.len() <= 100);
                assert!(lines.iter().all(Streamline::is_drawable));
            }
            other => panic!("expected synchronous pass, got {other:?}"),
        }
        assert!(!s.scheduler().is_active());
    }

    #[test]
    fn default_density_renders_progressively_in_batches_of_ten() {
        let mut s = session();
        assert_eq!(
            s.render(),
            RenderPass::Progressive {
                seeds: 225,
                batches: 23
            }
        );
        let lines = drain(&mut s);
        assert!(!lines.is_empty() && lines.len() <= 225);
        assert_eq!(s.tick(), Tick::Idle);
    }

    #[test]
    fn interaction_pauses_progress_and_uses_coarse_pass() {
        let mut s = session();
        s.render();
        s.tick();
        s.set_interacting(true);
        assert!(matches!(s.tick(), Tick::Paused { .. }));
        match s.render() {
            RenderPass::Complete(lines) => assert!(lines.len() <= 64),
            other => panic!("expected coarse pass, got {other:?}"),
        }
        assert_eq!(s.scheduler().completed_batches(), 1);
        s.set_interacting(false);
        assert!(matches!(s.tick(), Tick::Traced { .. }));
        assert_eq!(s.scheduler().completed_batches(), 2);
    }

    #[test]
    fn explicit_render_restarts_from_batch_zero() {
        let mut s = session();
        s.render();
        s.tick();
        s.tick();
        s.render();
        assert_eq!(s.scheduler().completed_batches(), 0);
        assert_eq!(s.scheduler().total_batches(), 23);
    }

    #[test]
    fn hidden_streamlines_render_nothing() {
        let mut s = session();
        let mut stream = s.config().stream;
        stream.show_streamlines = false;
        stream.show_vectors = false;
        s.set_stream_settings(stream).unwrap();
        assert_eq!(s.render(), RenderPass::Complete(Vec::new()));
        assert!(s.vector_grid().is_empty());
    }

    #[test]
    fn same_seed_sessions_render_identically() {
        let mut a = session();
        let mut b = session();
        a.render();
        b.render();
        assert_eq!(drain(&mut a), drain(&mut b));
    }

    #[test]
    fn scene_round_trip_preserves_sources_and_config() {
        let mut s = session();
        s.add_wire_at(120.0, 80.0, Polarity::Negative);
        s.set_wire_current(70.0).unwrap();
        let scene = s.to_scene();
        let restored = Session::from_scene(&scene).unwrap();
        assert_eq!(restored.dipoles(), s.dipoles());
        assert_eq!(restored.wires(), s.wires());
        assert_eq!(restored.config(), s.config());
    }

    #[test]
    fn unbounded_stream_length_traces_without_panicking() {
        let config = SessionConfig::from_json(&serde_json::json!({"stream_length": u64::MAX})).unwrap();
        let s = Session::new(canvas(), config, 1).unwrap();
        assert_eq!(s.trace(10.0, 10.0).len(), 1);
    }

    #[test]
    fn nan_seed_traces_an_empty_line() {
        let s = session();
        assert!(s.trace(f64::NAN, 5.0).is_empty());
        assert!(s.trace(5.0, f64::NAN).is_empty());
    }

    #[test]
    fn loading_a_scene_resets_strengths_to_presets() {
        let mut scene = Scene::with_default_dipole(800.0, 600.0, 3);
        scene.dipoles.push(Dipole::new(100.0, 100.0, 0.0, 999.0, 15.0));
        scene.wires.push(Wire::new(200.0, 200.0, 10.0, 10.0));
        scene.wires.push(Wire::new(300.0, 200.0, -75.0, 10.0));

        let s = Session::from_scene(&scene).unwrap();
        assert!(s.dipoles().iter().all(|d| d.moment == 100.0));
        assert_eq!(s.wires()[0].current, 50.0);
        assert_eq!(s.wires()[1].current, -50.0);
    }

    #[test]
    fn set_config_validates_and_applies_presets() {
        let mut s = session();
        let mut bad = *s.config();
        bad.stream.stream_length = 0;
        assert!(s.set_config(bad).is_err());

        let mut good = *s.config();
        good.presets.dipole_moment = 40.0;
        s.set_config(good).unwrap();
        assert_eq!(s.dipoles()[0].moment, 40.0);
    }

    #[test]
    fn resize_validates_and_cancels() {
        let mut s = session();
        s.render();
        assert!(s.resize(0.0, 100.0).is_err());
        s.resize(1024.0, 768.0).unwrap();
        assert!(!s.scheduler().is_active());
        assert_eq!(s.viewport().width, 1024.0);
    }

    #[test]
    fn vector_grid_uses_configured_spacing() {
        let s = session();
        assert_eq!(s.vector_grid().len(), 20 * 15);
    }
}
