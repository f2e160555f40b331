//! Simulation world
//!
//! `PhysWorld` owns every box (in a generational arena, addressed by
//! [`BoxHandle`]), the fixed-step [`Engine`] and the [`ForceSet`]. It is the
//! only place with shared access to the boxes: the tick loop, collision
//! queries and input-driven commands all go through it.
//!
//! Structural changes requested while the caller cannot guarantee it is
//! outside the tick loop go through [`PhysWorld::defer`]; queued commands are
//! applied at the start of the next update.

use generational_arena::{Arena, Index};

use super::engine::{Engine, TimeSource};
use super::entity::{BoxKind, PhysBox, Pose};
use super::forces::ForceSet;
use super::params::Parameters;
use super::states::{NVec3, PhysState};
use crate::error::ConfigError;

/// Side-spin impulse applied to launched boxes
const LAUNCH_SPIN: f64 = 0.125;

/// Stable handle to a box, never aliases a box added after removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxHandle(Index);

/// Structural or global change applied between tick loops
#[derive(Debug, Clone)]
pub enum WorldCommand {
    Spawn { state: PhysState, kind: BoxKind },
    Launch { position: NVec3, launch: NVec3, forward: NVec3 },
    Remove(BoxHandle),
    ClearSpawned,
    ResetAll,
    TogglePause,
}

/// Receives every overlapping pair found by [`PhysWorld::report_collisions`]
/// Detection only: the world never resolves contacts itself
pub trait CollisionObserver {
    fn on_overlap(&mut self, a: BoxHandle, b: BoxHandle);
}

impl<F: FnMut(BoxHandle, BoxHandle)> CollisionObserver for F {
    fn on_overlap(&mut self, a: BoxHandle, b: BoxHandle) {
        (self)(a, b)
    }
}

pub struct PhysWorld {
    boxes: Arena<PhysBox>,
    engine: Engine,
    forces: ForceSet,
    interpolate_orientation: bool,
    paused: bool,
    pending: Vec<WorldCommand>,
}

impl PhysWorld {
    /// Fails when `params` would stall the fixed-step loop
    pub fn new(params: &Parameters, forces: ForceSet) -> Result<Self, ConfigError> {
        Ok(Self {
            boxes: Arena::new(),
            engine: Engine::new(params)?,
            forces,
            interpolate_orientation: params.interpolate_orientation,
            paused: false,
            pending: Vec::new(),
        })
    }

    // =========================================================================================
    // Registry
    // =========================================================================================

    pub fn spawn(&mut self, state: PhysState, kind: BoxKind) -> BoxHandle {
        let handle = BoxHandle(self.boxes.insert(PhysBox::new(state, kind)));
        log::debug!("spawned {kind:?} box {handle:?} at {:?}", state.position);
        handle
    }

    pub fn remove(&mut self, handle: BoxHandle) -> Option<PhysBox> {
        self.boxes.remove(handle.0)
    }

    pub fn get(&self, handle: BoxHandle) -> Option<&PhysBox> {
        self.boxes.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: BoxHandle) -> Option<&mut PhysBox> {
        self.boxes.get_mut(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoxHandle, &PhysBox)> {
        self.boxes.iter().map(|(index, b)| (BoxHandle(index), b))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// First box of the given kind, in insertion order
    pub fn first_of_kind(&self, kind: BoxKind) -> Option<BoxHandle> {
        self.iter().find(|(_, b)| b.kind() == kind).map(|(h, _)| h)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn alpha(&self) -> f64 {
        self.engine.alpha()
    }

    pub fn sim_time(&self) -> f64 {
        self.engine.sim_time()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // =========================================================================================
    // Stepping
    // =========================================================================================

    /// Poll `clock` once, apply queued commands, then run the fixed ticks
    pub fn update(&mut self, clock: &mut impl TimeSource) -> usize {
        self.flush_commands();

        let Self { boxes, engine, forces, .. } = self;
        let forces = &*forces;
        engine.update(clock, |t, dt| step_live(boxes, t, dt, forces))
    }

    /// Same as [`PhysWorld::update`] with an explicit frame delta
    pub fn advance(&mut self, frame_delta: f64) -> usize {
        self.flush_commands();

        let Self { boxes, engine, forces, .. } = self;
        let forces = &*forces;
        engine.advance(frame_delta, |t, dt| step_live(boxes, t, dt, forces))
    }

    // =========================================================================================
    // Commands
    // =========================================================================================

    pub fn defer(&mut self, command: WorldCommand) {
        self.pending.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Apply every queued command in order
    pub fn flush_commands(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let n = pending.len();
        for command in pending {
            self.apply(command);
        }
        n
    }

    pub fn apply(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::Spawn { state, kind } => {
                self.spawn(state, kind);
            }
            WorldCommand::Launch { position, launch, forward } => {
                self.spawn_launched(position, launch, forward);
            }
            WorldCommand::Remove(handle) => {
                self.remove(handle);
            }
            WorldCommand::ClearSpawned => self.clear_spawned(),
            WorldCommand::ResetAll => self.reset_all(),
            WorldCommand::TogglePause => self.toggle_pause(),
        }
    }

    /// Freeze (or revive) every box except the ground
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        for (_, b) in self.boxes.iter_mut() {
            if b.kind() != BoxKind::Ground {
                b.set_live(!self.paused);
            }
        }
        log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Put every box back to its baseline state
    pub fn reset_all(&mut self) {
        for (_, b) in self.boxes.iter_mut() {
            b.reset();
        }
        log::info!("reset {} boxes", self.boxes.len());
    }

    /// Remove every box created at runtime
    pub fn clear_spawned(&mut self) {
        let before = self.boxes.len();
        self.boxes.retain(|_, b| b.kind() != BoxKind::Spawned);
        log::info!("cleared {} spawned boxes", before - self.boxes.len());
    }

    /// Spawn a small box and throw it
    /// `launch` is applied at the center, a pair of opposite `forward`
    /// impulses at offset points gives it spin. The result becomes the box's
    /// reset baseline.
    pub fn spawn_launched(&mut self, position: NVec3, launch: NVec3, forward: NVec3) -> BoxHandle {
        let state = PhysState::new(1.0)
            .with_position(position)
            .with_scale(NVec3::repeat(0.5));
        let paused = self.paused;
        let handle = self.spawn(state, BoxKind::Spawned);

        if let Some(b) = self.get_mut(handle) {
            let scale = b.curr_state().scale();
            let offset = NVec3::new(LAUNCH_SPIN, 0.0, 1.0).component_mul(&scale);

            b.apply_force(launch, position);
            b.apply_force(forward * LAUNCH_SPIN, position - offset);
            b.apply_force(forward * -LAUNCH_SPIN, position + offset);
            b.set_live(!paused);
            b.refresh_init();
        }
        handle
    }

    // =========================================================================================
    // Queries
    // =========================================================================================

    /// Every other box whose bounds overlap the bounds of `handle`
    pub fn collisions(&self, handle: BoxHandle) -> Vec<BoxHandle> {
        let Some(target) = self.get(handle) else {
            return Vec::new();
        };
        self.iter()
            .filter(|(other, b)| *other != handle && target.bounds().intersects(b.bounds()))
            .map(|(other, _)| other)
            .collect()
    }

    /// Hand every overlapping unordered pair to `observer`, returns the count
    pub fn report_collisions(&self, observer: &mut impl CollisionObserver) -> usize {
        let all: Vec<(BoxHandle, &PhysBox)> = self.iter().collect();
        let mut count = 0;
        for (i, (a, box_a)) in all.iter().enumerate() {
            for (b, box_b) in &all[i + 1..] {
                if box_a.bounds().intersects(box_b.bounds()) {
                    observer.on_overlap(*a, *b);
                    count += 1;
                }
            }
        }
        count
    }

    /// State to render this frame, blended with the engine's alpha
    pub fn interpolated_state(&self, handle: BoxHandle) -> Option<PhysState> {
        let alpha = self.alpha();
        self.get(handle)
            .map(|b| b.interpolated_state(alpha, self.interpolate_orientation))
    }

    pub fn pose(&self, handle: BoxHandle) -> Option<Pose> {
        let alpha = self.alpha();
        self.get(handle).map(|b| b.pose(alpha, self.interpolate_orientation))
    }
}

/// One fixed tick over every live box, frozen ones are left untouched
fn step_live(boxes: &mut Arena<PhysBox>, t: f64, dt: f64, forces: &ForceSet) {
    for (_, b) in boxes.iter_mut() {
        if b.is_live() {
            b.step(t, dt, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysWorld {
        PhysWorld::new(&Parameters::default(), ForceSet::new()).unwrap()
    }

    #[test]
    fn removed_handle_does_not_resolve() {
        let mut w = world();
        let a = w.spawn(PhysState::default(), BoxKind::Spawned);
        w.remove(a);
        let b = w.spawn(PhysState::default(), BoxKind::Spawned);
        assert!(w.get(a).is_none());
        assert!(w.get(b).is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn launched_box_spins_and_keeps_impulse() {
        let mut w = world();
        let h = w.spawn_launched(NVec3::new(0.0, 2.0, 0.0), NVec3::new(0.0, 0.0, -3.0), NVec3::new(0.0, 0.0, -1.0));
        let b = w.get(h).unwrap();
        assert_eq!(b.kind(), BoxKind::Spawned);
        assert!((b.curr_state().linear_momentum() - NVec3::new(0.0, 0.0, -3.0)).norm() < 1e-12);
        assert!(b.curr_state().angular_momentum().norm() > 0.0);
        assert_eq!(b.init_state().linear_momentum(), b.curr_state().linear_momentum());
        assert!(b.is_live());
    }

    #[test]
    fn launched_box_respects_pause() {
        let mut w = world();
        w.toggle_pause();
        let h = w.spawn_launched(NVec3::zeros(), NVec3::x(), NVec3::z());
        assert!(!w.get(h).unwrap().is_live());
    }

    #[test]
    fn zero_tick_world_is_rejected() {
        let params = Parameters {
            fixed_dt: 0.0,
            ..Parameters::default()
        };
        assert!(PhysWorld::new(&params, ForceSet::new()).is_err());
    }

    #[test]
    fn update_goes_through_clock() {
        use crate::simulation::engine::ManualClock;

        let mut w = PhysWorld::new(
            &Parameters {
                clamp_mode: crate::configuration::config::ClampMode::Ceiling,
                ..Parameters::default()
            },
            ForceSet::new(),
        )
        .unwrap();
        w.defer(WorldCommand::Spawn {
            state: PhysState::default(),
            kind: BoxKind::Spawned,
        });

        let mut clock = ManualClock::new();
        clock.push(0.04);
        assert_eq!(w.update(&mut clock), 2);
        assert_eq!(w.len(), 1);
        assert_eq!(w.engine().total_ticks(), 2);
    }

    #[test]
    fn pairs_reported_once() {
        let mut w = world();
        w.spawn(PhysState::default(), BoxKind::Scenario);
        w.spawn(PhysState::default().with_position(NVec3::new(1.0, 0.0, 0.0)), BoxKind::Scenario);
        w.spawn(PhysState::default().with_position(NVec3::new(10.0, 0.0, 0.0)), BoxKind::Scenario);

        let mut pairs = Vec::new();
        let n = w.report_collisions(&mut |a: BoxHandle, b: BoxHandle| pairs.push((a, b)));
        assert_eq!(n, 1);
        assert_eq!(pairs.len(), 1);
    }
}
