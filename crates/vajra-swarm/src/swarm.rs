//! The per-tick orchestrator.
//!
//! A [`Swarm`] owns every voxel in an arena indexed by [`VoxelId`] and
//! visits them once per tick in its fixed traversal order. A voxel updated
//! later in a tick sees every lock made earlier in the same tick.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};
use vajra_lattice::{hex_vertices, FaceIndex, HexCoord};

use crate::config::SwarmConfig;
use crate::error::{Error, Result};
use crate::events::{FaceView, LockCause, SwarmEvent, SwarmSnapshot, VoxelView};
use crate::face::{FacePose, FaceRef, Handshake};
use crate::invariants::{self, InvariantViolation};
use crate::spatial::{build_index, SpatialIndex};
use crate::voxel::{LatticeSite, Voxel, VoxelId};

/// External trigger applied during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stimulus {
    pub active: bool,
    pub point: DVec2,
}

impl Stimulus {
    pub const fn inactive() -> Self {
        Self {
            active: false,
            point: DVec2::ZERO,
        }
    }

    pub const fn at(point: DVec2) -> Self {
        Self { active: true, point }
    }
}

/// What changed during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    /// Voxels locked by the stimulus this tick
    pub stimulus_locks: usize,
    /// Voxels locked by a handshake this tick
    pub docking_locks: usize,
    /// Locked voxels after the tick
    pub locked: usize,
    /// Fluid voxels after the tick
    pub fluid: usize,
}

/// A population of voxels assembling through face handshakes.
#[derive(Debug)]
pub struct Swarm {
    config: SwarmConfig,
    voxels: Vec<Voxel>,
    /// Traversal sequence
    order: Vec<VoxelId>,
    /// Position of each voxel (by index) in `order`
    rank: Vec<usize>,
    index: Box<dyn SpatialIndex>,
    rng: StdRng,
    tick: u64,
    events: Vec<SwarmEvent>,
}

impl Swarm {
    /// Spawn `config.num_agents` fluid voxels at random positions with unit
    /// speed in a random heading.
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let voxels = spawn(&config, &mut rng);
        Ok(Self::assemble(config, voxels, rng))
    }

    /// Build a swarm from a hand-placed population.
    ///
    /// Ids must run `0..n` in order. `config.num_agents` is replaced by the
    /// population size.
    pub fn from_voxels(mut config: SwarmConfig, voxels: Vec<Voxel>) -> Result<Self> {
        if voxels.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        if let Some((index, voxel)) = voxels
            .iter()
            .enumerate()
            .find(|(index, voxel)| voxel.id().index() != *index)
        {
            return Err(Error::NonContiguousIds {
                index,
                found: voxel.id(),
            });
        }

        config.num_agents = voxels.len();
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, voxels, rng))
    }

    fn assemble(config: SwarmConfig, voxels: Vec<Voxel>, rng: StdRng) -> Self {
        let order = config.traversal.sequence(voxels.len());
        let rank = ranks(&order);
        let index = build_index(config.spatial, config.grid_cell_size());
        Self {
            config,
            voxels,
            order,
            rank,
            index,
            rng,
            tick: 0,
            events: Vec::new(),
        }
    }

    /// Respawn the whole population, continuing the swarm's random stream.
    pub fn reset(&mut self) {
        self.voxels = spawn(&self.config, &mut self.rng);
        self.tick = 0;
        self.events.clear();
        info!(agents = self.voxels.len(), "swarm reset");
    }

    /// Settings this swarm was built with.
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// All voxels, indexed by id.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Look up one voxel by id.
    pub fn voxel(&self, id: VoxelId) -> Result<&Voxel> {
        self.voxels.get(id.index()).ok_or(Error::UnknownVoxel(id))
    }

    /// Number of completed ticks since construction or reset.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The order voxels are visited in each tick.
    pub fn traversal(&self) -> &[VoxelId] {
        &self.order
    }

    /// Events recorded since construction, reset or the last drain.
    pub fn events(&self) -> &[SwarmEvent] {
        &self.events
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<SwarmEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of locked voxels.
    pub fn locked_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_locked()).count()
    }

    /// Number of voxels still flocking.
    pub fn fluid_count(&self) -> usize {
        self.voxels.len() - self.locked_count()
    }

    /// Number of independent locked clusters (one per stimulus or anchor lock).
    pub fn cluster_count(&self) -> usize {
        self.voxels
            .iter()
            .filter(|v| v.lattice().is_some_and(|site| site.cluster == v.id()))
            .count()
    }

    /// Largest ring any locked voxel occupies around its cluster anchor.
    pub fn lattice_radius(&self) -> u64 {
        self.voxels
            .iter()
            .filter_map(Voxel::lattice)
            .map(|site| site.coord.ring())
            .max()
            .unwrap_or(0)
    }

    /// World position of one face center.
    pub fn face_position(&self, face: FaceRef) -> Result<DVec2> {
        let voxel = self.voxel(face.voxel)?;
        Ok(voxel
            .face(face.face)
            .world_position(voxel.position(), voxel.orientation(), self.config.inner_radius()))
    }

    /// Lock one voxel as the seed of a new cluster.
    ///
    /// Same effect as a stimulus lock: a voxel already touching a free face
    /// of a locked voxel docks onto it instead. Locking an already locked
    /// voxel is a no-op.
    pub fn anchor(&mut self, id: VoxelId) -> Result<()> {
        if self.voxel(id)?.is_locked() {
            return Ok(());
        }
        self.reindex();
        if self.dock(id).is_none() {
            self.lock_in_place(id, LockCause::Anchor);
        }
        Ok(())
    }

    /// Verify the structural invariants of the current state.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        invariants::check(&self.voxels, &self.config)
    }

    /// Advance the whole population one step.
    pub fn tick(&mut self, stimulus: Stimulus) -> TickSummary {
        self.tick += 1;
        self.reindex();

        let mut summary = TickSummary {
            tick: self.tick,
            ..Default::default()
        };

        for slot in 0..self.order.len() {
            let id = self.order[slot];
            match self.update_voxel(id, stimulus) {
                Some(LockCause::Stimulus) => summary.stimulus_locks += 1,
                Some(LockCause::Docked { .. }) => summary.docking_locks += 1,
                Some(LockCause::Anchor) | None => {}
            }
        }

        summary.locked = self.locked_count();
        summary.fluid = self.voxels.len() - summary.locked;

        trace!(
            tick = summary.tick,
            stimulus_locks = summary.stimulus_locks,
            docking_locks = summary.docking_locks,
            locked = summary.locked,
            fluid = summary.fluid,
            "tick complete"
        );
        summary
    }

    /// Build a read-only projection for rendering or export.
    pub fn snapshot(&self) -> SwarmSnapshot {
        let inner = self.config.inner_radius();
        let voxels: Vec<VoxelView> = self
            .voxels
            .iter()
            .map(|v| VoxelView {
                id: v.id(),
                position: v.position(),
                orientation: v.orientation(),
                state: v.state(),
                lattice: v.lattice(),
                vertices: hex_vertices(v.position(), self.config.voxel_radius, v.orientation()),
                faces: FaceIndex::ALL.map(|index| {
                    let face = v.face(index);
                    FaceView {
                        index,
                        world_position: face.world_position(v.position(), v.orientation(), inner),
                        locked: face.is_locked(),
                    }
                }),
            })
            .collect();

        let locked_count = self.locked_count();
        SwarmSnapshot {
            tick: self.tick,
            locked_count,
            fluid_count: voxels.len() - locked_count,
            cluster_count: self.cluster_count(),
            lattice_radius: self.lattice_radius(),
            voxels,
        }
    }

    /// Run one voxel's update. Returns the cause if it locked.
    fn update_voxel(&mut self, id: VoxelId, stimulus: Stimulus) -> Option<LockCause> {
        let i = id.index();
        if self.voxels[i].is_locked() {
            self.voxels[i].settle();
            return None;
        }

        let me = &self.voxels[i];
        let neighbors = self.within(me.position(), self.config.perception_radius, id);
        let force = me.flocking_force(neighbors.iter().map(|&n| &self.voxels[n]), &self.config);

        let from = me.position();
        let voxel = &mut self.voxels[i];
        voxel.apply_force(force);
        voxel.integrate(&self.config);
        let to = voxel.position();
        self.index.relocate(i, from, to);

        let stimulated = stimulus.active && to.distance(stimulus.point) < self.config.stimulus_radius;

        // A stimulated voxel touching a free locked face joins that cluster
        // instead of founding its own.
        if let Some(partner) = self.dock(id) {
            return Some(LockCause::Docked { partner });
        }
        if stimulated {
            self.lock_in_place(id, LockCause::Stimulus);
            return Some(LockCause::Stimulus);
        }
        None
    }

    /// Scan faces in index order for a handshake with a locked voxel.
    ///
    /// On success the voxel snaps one lattice spacing out from the partner's
    /// face and both faces latch. Returns the partner voxel.
    fn dock(&mut self, id: VoxelId) -> Option<VoxelId> {
        let i = id.index();
        let inner = self.config.inner_radius();
        let handshake = Handshake::from_config(&self.config);

        let nearby = self.within(self.voxels[i].position(), self.config.docking_radius, id);
        let candidates: Vec<FacePose> = nearby
            .iter()
            .flat_map(|&n| self.voxels[n].poses(inner))
            .collect();

        for index in FaceIndex::ALL {
            let voxel = &self.voxels[i];
            let pose = voxel.pose(index, inner);
            let Some(partner) = handshake.scan(voxel.face(index), &pose, candidates.iter().copied()) else {
                continue;
            };

            let anchor = &self.voxels[partner.voxel.index()];
            if !anchor.is_locked() {
                continue;
            }
            // Locked voxels always carry a site.
            let Some(base) = anchor.lattice() else {
                continue;
            };

            let target = anchor.position()
                + anchor.face(partner.face).look_direction(anchor.orientation()) * self.config.lattice_spacing();
            let site = LatticeSite {
                cluster: base.cluster,
                coord: base.coord.neighbor(partner.face),
            };

            let from = voxel.position();
            let voxel = &mut self.voxels[i];
            voxel.snap_to(target);
            voxel.lock(site, self.tick);
            self.index.relocate(i, from, target);

            let mine = FaceRef { voxel: id, face: index };
            self.lock_faces(mine, partner);

            debug!(
                voxel = %id,
                face = %mine,
                partner = %partner,
                cluster = %site.cluster,
                coord = %site.coord,
                tick = self.tick,
                "voxel docked"
            );
            self.events.push(SwarmEvent::VoxelLocked {
                voxel: id,
                cause: LockCause::Docked { partner: partner.voxel },
                position: target,
                tick: self.tick,
            });
            self.events.push(SwarmEvent::FacesDocked {
                a: mine,
                b: partner,
                tick: self.tick,
            });
            return Some(partner.voxel);
        }
        None
    }

    /// Latch two faces onto each other. The only place faces lock.
    fn lock_faces(&mut self, a: FaceRef, b: FaceRef) {
        self.voxels[a.voxel.index()].face_mut(a.face).latch(b);
        self.voxels[b.voxel.index()].face_mut(b.face).latch(a);
    }

    fn lock_in_place(&mut self, id: VoxelId, cause: LockCause) {
        let voxel = &mut self.voxels[id.index()];
        voxel.lock(
            LatticeSite {
                cluster: id,
                coord: HexCoord::ORIGIN,
            },
            self.tick,
        );
        let position = voxel.position();

        debug!(voxel = %id, ?cause, x = position.x, y = position.y, tick = self.tick, "voxel locked");
        self.events.push(SwarmEvent::VoxelLocked {
            voxel: id,
            cause,
            position,
            tick: self.tick,
        });
    }

    fn reindex(&mut self) {
        let positions: Vec<DVec2> = self.voxels.iter().map(Voxel::position).collect();
        self.index.rebuild(&positions);
    }

    /// Indices of voxels strictly within `radius` of `center`, excluding
    /// `exclude`, in traversal order.
    fn within(&self, center: DVec2, radius: f64, exclude: VoxelId) -> Vec<usize> {
        let mut found = Vec::new();
        self.index.candidates(center, radius, &mut found);
        found.retain(|&n| n != exclude.index() && self.voxels[n].position().distance(center) < radius);
        found.sort_unstable_by_key(|&n| self.rank[n]);
        found.dedup();
        found
    }
}

fn spawn(config: &SwarmConfig, rng: &mut StdRng) -> Vec<Voxel> {
    let margin = config.spawn_margin;
    (0..config.num_agents)
        .map(|i| {
            let x = rng.gen_range(margin..=config.bounds.width - margin);
            let y = rng.gen_range(margin..=config.bounds.height - margin);
            let heading = rng.gen_range(0.0..TAU);
            Voxel::new(VoxelId::from_index(i), DVec2::new(x, y)).with_velocity(DVec2::from_angle(heading))
        })
        .collect()
}

fn ranks(order: &[VoxelId]) -> Vec<usize> {
    let mut rank = vec![0; order.len()];
    for (slot, id) in order.iter().enumerate() {
        rank[id.index()] = slot;
    }
    rank
}
