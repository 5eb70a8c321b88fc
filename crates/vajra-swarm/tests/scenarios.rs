//! Hand-placed scenarios exercising the lock protocol end to end.

use std::f64::consts::PI;

use glam::DVec2;
use vajra_swarm::{
    DockingTieBreak, Error, FaceIndex, FaceRef, HexCoord, LatticeSite, LockCause, Stimulus, Swarm, SwarmConfig,
    SwarmEvent, TraversalOrder, Voxel, VoxelId, VoxelState,
};

const A: DVec2 = DVec2::new(200.0, 200.0);

/// No flocking forces, so hand-placed voxels at rest stay put.
fn quiet() -> SwarmConfig {
    SwarmConfig {
        force_separation: 0.0,
        force_cohesion: 0.0,
        ..Default::default()
    }
}

fn face(voxel: u32, k: usize) -> FaceRef {
    FaceRef {
        voxel: VoxelId(voxel),
        face: FaceIndex::ALL[k],
    }
}

/// The lattice point in front of face 0 (30°) of a voxel at `center`.
fn in_front_of_face_zero(center: DVec2, config: &SwarmConfig) -> DVec2 {
    center + FaceIndex::ALL[0].direction(0.0) * config.lattice_spacing()
}

fn pair(config: &SwarmConfig, b: Voxel) -> Swarm {
    let mut swarm = Swarm::from_voxels(config.clone(), vec![Voxel::new(VoxelId(0), A), b]).unwrap();
    swarm.anchor(VoxelId(0)).unwrap();
    swarm
}

#[test]
fn direct_stimulus_locks_without_moving() {
    let voxels = vec![Voxel::new(VoxelId(0), DVec2::new(100.0, 100.0))];
    let mut swarm = Swarm::from_voxels(SwarmConfig::default(), voxels).unwrap();

    swarm.tick(Stimulus::at(DVec2::new(100.0, 100.0)));

    let v = swarm.voxel(VoxelId(0)).unwrap();
    assert_eq!(v.state(), VoxelState::Locked);
    assert_eq!(v.position(), DVec2::new(100.0, 100.0));
    assert_eq!(v.velocity(), DVec2::ZERO);
    assert_eq!(
        swarm.events(),
        &[SwarmEvent::VoxelLocked {
            voxel: VoxelId(0),
            cause: LockCause::Stimulus,
            position: DVec2::new(100.0, 100.0),
            tick: 1,
        }]
    );
}

#[test]
fn inactive_stimulus_is_ignored() {
    let voxels = vec![Voxel::new(VoxelId(0), DVec2::new(100.0, 100.0))];
    let mut swarm = Swarm::from_voxels(SwarmConfig::default(), voxels).unwrap();

    let stimulus = Stimulus {
        active: false,
        point: DVec2::new(100.0, 100.0),
    };
    swarm.tick(stimulus);
    assert_eq!(swarm.locked_count(), 0);
}

#[test]
fn single_handshake_snaps_exactly() {
    for config in [quiet(), SwarmConfig::default()] {
        let target = in_front_of_face_zero(A, &config);
        let mut swarm = pair(&config, Voxel::new(VoxelId(1), target));

        let summary = swarm.tick(Stimulus::inactive());
        assert_eq!(summary.docking_locks, 1);

        let b = swarm.voxel(VoxelId(1)).unwrap();
        assert!(b.is_locked());
        assert!(b.position().distance(target) < 1e-9, "B at {}", b.position());
        assert!((b.position().distance(A) - config.lattice_spacing()).abs() < 1e-9);
        assert_eq!(b.velocity(), DVec2::ZERO);

        // B's 210° face sits on A's 30° face, and each points at the other.
        let a = swarm.voxel(VoxelId(0)).unwrap();
        assert_eq!(a.face(FaceIndex::ALL[0]).partner(), Some(face(1, 3)));
        assert_eq!(b.face(FaceIndex::ALL[3]).partner(), Some(face(0, 0)));
        assert!(a.face(FaceIndex::ALL[0]).is_locked());
        assert!(b.face(FaceIndex::ALL[3]).is_locked());

        assert_eq!(
            b.lattice(),
            Some(LatticeSite {
                cluster: VoxelId(0),
                coord: HexCoord::new(1, 0),
            })
        );
        assert_eq!(swarm.cluster_count(), 1);
        assert_eq!(swarm.check_invariants(), Ok(()));
    }
}

#[test]
fn handshake_records_events() {
    let config = quiet();
    let mut swarm = pair(&config, Voxel::new(VoxelId(1), in_front_of_face_zero(A, &config)));
    swarm.drain_events();

    swarm.tick(Stimulus::inactive());
    let events = swarm.drain_events();

    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        SwarmEvent::VoxelLocked {
            voxel: VoxelId(1),
            cause: LockCause::Docked { partner: VoxelId(0) },
            tick: 1,
            ..
        }
    ));
    assert_eq!(
        events[1],
        SwarmEvent::FacesDocked {
            a: face(1, 3),
            b: face(0, 0),
            tick: 1,
        }
    );
}

#[test]
fn misaligned_faces_stay_fluid() {
    // Turning B by 15° keeps its 225° face within range of A's 30° face,
    // but the looks are 165° apart: dot ≈ -0.966, not below -0.99.
    let config = SwarmConfig {
        alignment_tolerance: 0.99,
        ..quiet()
    };
    let b = Voxel::new(VoxelId(1), in_front_of_face_zero(A, &config)).with_orientation(PI / 12.0);
    let mut swarm = pair(&config, b);

    let distance = swarm.face_position(face(1, 3)).unwrap().distance(swarm.face_position(face(0, 0)).unwrap());
    assert!(distance < config.face_range, "faces {distance} apart");

    for _ in 0..5 {
        swarm.tick(Stimulus::inactive());
    }
    assert_eq!(swarm.voxel(VoxelId(1)).unwrap().state(), VoxelState::Fluid);
    assert_eq!(swarm.locked_count(), 1);
}

#[test]
fn looser_tolerance_accepts_the_same_skew() {
    let config = quiet();
    let target = in_front_of_face_zero(A, &config);
    let b = Voxel::new(VoxelId(1), target).with_orientation(PI / 12.0);
    let mut swarm = pair(&config, b);

    swarm.tick(Stimulus::inactive());

    let b = swarm.voxel(VoxelId(1)).unwrap();
    assert!(b.is_locked());
    // Snap follows the partner's face, not B's own.
    assert!(b.position().distance(target) < 1e-9);
    assert_eq!(swarm.check_invariants(), Ok(()));
}

#[test]
fn positions_wrap_at_every_edge() {
    let config = quiet();
    let (w, h) = (config.bounds.width, config.bounds.height);
    let voxels = vec![
        Voxel::new(VoxelId(0), DVec2::new(w - 0.5, 400.0)).with_velocity(DVec2::new(1.0, 0.0)),
        Voxel::new(VoxelId(1), DVec2::new(0.5, 300.0)).with_velocity(DVec2::new(-1.0, 0.0)),
        Voxel::new(VoxelId(2), DVec2::new(500.0, h - 0.5)).with_velocity(DVec2::new(0.0, 1.0)),
        Voxel::new(VoxelId(3), DVec2::new(600.0, 0.5)).with_velocity(DVec2::new(0.0, -1.0)),
    ];
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();

    swarm.tick(Stimulus::inactive());

    let positions: Vec<DVec2> = swarm.voxels().iter().map(Voxel::position).collect();
    assert_eq!(
        positions,
        vec![
            DVec2::new(0.0, 400.0),
            DVec2::new(w, 300.0),
            DVec2::new(500.0, 0.0),
            DVec2::new(600.0, h),
        ]
    );
}

#[test]
fn stimulated_voxel_still_docks_onto_a_touching_face() {
    let config = quiet();
    let target = in_front_of_face_zero(A, &config);
    // Two units off the lattice point, well inside the face range.
    let mut swarm = pair(&config, Voxel::new(VoxelId(1), target + DVec2::new(0.0, 2.0)));
    swarm.drain_events();

    let summary = swarm.tick(Stimulus::at(target));
    assert_eq!(summary.stimulus_locks, 0);
    assert_eq!(summary.docking_locks, 1);

    let b = swarm.voxel(VoxelId(1)).unwrap();
    assert!(b.is_locked());
    assert!(b.position().distance(target) < 1e-9, "B at {}", b.position());
    assert_eq!(b.face(FaceIndex::ALL[3]).partner(), Some(face(0, 0)));
    assert_eq!(
        b.lattice(),
        Some(LatticeSite {
            cluster: VoxelId(0),
            coord: HexCoord::new(1, 0),
        })
    );
    assert_eq!(swarm.cluster_count(), 1);
    assert!(matches!(
        swarm.events()[0],
        SwarmEvent::VoxelLocked {
            voxel: VoxelId(1),
            cause: LockCause::Docked { partner: VoxelId(0) },
            ..
        }
    ));
    assert_eq!(swarm.check_invariants(), Ok(()));
}

#[test]
fn stimulus_away_from_locked_faces_seeds_a_cluster() {
    let config = quiet();
    let far = A + DVec2::new(300.0, 0.0);
    let mut swarm = pair(&config, Voxel::new(VoxelId(1), far));

    let summary = swarm.tick(Stimulus::at(far));
    assert_eq!(summary.stimulus_locks, 1);
    assert_eq!(summary.docking_locks, 0);

    let b = swarm.voxel(VoxelId(1)).unwrap();
    assert_eq!(b.position(), far);
    assert_eq!(b.faces().iter().filter(|f| f.is_locked()).count(), 0);
    assert_eq!(
        b.lattice(),
        Some(LatticeSite {
            cluster: VoxelId(1),
            coord: HexCoord::ORIGIN,
        })
    );
    assert_eq!(swarm.cluster_count(), 2);
}

#[test]
fn anchoring_next_to_a_locked_face_docks() {
    let config = quiet();
    let target = in_front_of_face_zero(A, &config);
    // Within docking radius of B but no face pair in range.
    let beside = target + DVec2::new(0.0, 40.0);
    let voxels = vec![
        Voxel::new(VoxelId(0), A),
        Voxel::new(VoxelId(1), target),
        Voxel::new(VoxelId(2), beside),
    ];
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();

    swarm.anchor(VoxelId(0)).unwrap();
    swarm.anchor(VoxelId(1)).unwrap();
    swarm.anchor(VoxelId(2)).unwrap();

    let b = swarm.voxel(VoxelId(1)).unwrap();
    assert_eq!(b.face(FaceIndex::ALL[3]).partner(), Some(face(0, 0)));
    assert_eq!(b.lattice().map(|s| s.cluster), Some(VoxelId(0)));

    // Nothing in reach: a fresh cluster where it stands.
    let c = swarm.voxel(VoxelId(2)).unwrap();
    assert_eq!(c.position(), beside);
    assert_eq!(c.lattice().map(|s| s.cluster), Some(VoxelId(2)));

    assert_eq!(swarm.cluster_count(), 2);
    assert_eq!(swarm.check_invariants(), Ok(()));
}

/// A anchored at id 0; B (id 1) exactly on A's face-0 lattice point and
/// C (id 2) one unit to the side of it. Both reach the same free face.
fn contested_face(traversal: TraversalOrder) -> Swarm {
    let config = SwarmConfig {
        traversal,
        ..quiet()
    };
    let target = in_front_of_face_zero(A, &config);
    let side = DVec2::from_angle(2.0 * PI / 3.0);
    let voxels = vec![
        Voxel::new(VoxelId(0), A),
        Voxel::new(VoxelId(1), target),
        Voxel::new(VoxelId(2), target + side),
    ];
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();
    swarm.anchor(VoxelId(0)).unwrap();
    swarm
}

#[test]
fn only_one_voxel_latches_a_contested_face() {
    for (traversal, winner, loser) in [
        (TraversalOrder::Ascending, 1, 2),
        (TraversalOrder::Descending, 2, 1),
    ] {
        let mut swarm = contested_face(traversal);
        for _ in 0..3 {
            swarm.tick(Stimulus::inactive());
        }

        let a = swarm.voxel(VoxelId(0)).unwrap();
        assert_eq!(a.face(FaceIndex::ALL[0]).partner(), Some(face(winner, 3)), "{traversal:?}");
        assert_eq!(a.faces().iter().filter(|f| f.is_locked()).count(), 1);
        assert!(swarm.voxel(VoxelId(winner)).unwrap().is_locked());
        assert_eq!(swarm.voxel(VoxelId(loser)).unwrap().state(), VoxelState::Fluid);
        assert_eq!(swarm.locked_count(), 2);
        assert_eq!(swarm.check_invariants(), Ok(()));
    }
}

/// Anchor at id 0 and `len` fluid voxels lined up in front of face 0.
fn chain(traversal: TraversalOrder, len: u32) -> Swarm {
    let config = SwarmConfig {
        traversal,
        ..quiet()
    };
    let step = FaceIndex::ALL[0].direction(0.0) * config.lattice_spacing();
    let voxels = (0..=len)
        .map(|k| Voxel::new(VoxelId(k), A + step * f64::from(k)))
        .collect();
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();
    swarm.anchor(VoxelId(0)).unwrap();
    swarm
}

#[test]
fn ascending_chain_locks_in_one_tick() {
    let mut swarm = chain(TraversalOrder::Ascending, 4);
    let summary = swarm.tick(Stimulus::inactive());

    assert_eq!(summary.docking_locks, 4);
    assert_eq!(swarm.fluid_count(), 0);
    for k in 1..=4u32 {
        let v = swarm.voxel(VoxelId(k)).unwrap();
        assert_eq!(v.locked_tick(), Some(1));
        assert_eq!(v.lattice().map(|s| s.coord), Some(HexCoord::new(i64::from(k), 0)));
    }
    assert_eq!(swarm.check_invariants(), Ok(()));
}

#[test]
fn descending_chain_locks_one_per_tick() {
    let mut swarm = chain(TraversalOrder::Descending, 4);
    for tick in 1..=4 {
        let summary = swarm.tick(Stimulus::inactive());
        assert_eq!(summary.docking_locks, 1, "tick {tick}");
        assert_eq!(summary.locked, 1 + tick);
        assert_eq!(swarm.voxel(VoxelId(tick as u32)).unwrap().locked_tick(), Some(tick as u64));
    }
    assert_eq!(swarm.fluid_count(), 0);
}

#[test]
fn traversal_order_keeps_the_fixed_point() {
    let mut fast = chain(TraversalOrder::Ascending, 5);
    let mut slow = chain(TraversalOrder::Descending, 5);
    let mut shuffled = chain(TraversalOrder::Shuffled { seed: 11 }, 5);
    for _ in 0..6 {
        fast.tick(Stimulus::inactive());
        slow.tick(Stimulus::inactive());
        shuffled.tick(Stimulus::inactive());
    }

    for other in [&slow, &shuffled] {
        for (a, b) in fast.voxels().iter().zip(other.voxels()) {
            assert_eq!(a.state(), b.state());
            assert_eq!(a.lattice(), b.lattice());
            assert!(a.position().distance(b.position()) < 1e-9);
        }
    }
}

/// B (id 0) can dock its face 3 onto two locked voxels: one exact, one
/// 3 units off.
fn contested(tie_break: DockingTieBreak, exact: u32, off: u32) -> Swarm {
    let config = SwarmConfig { tie_break, ..quiet() };
    let b = DVec2::new(400.0, 400.0);
    let exact_pos = b - FaceIndex::ALL[0].direction(0.0) * config.lattice_spacing();

    let mut voxels = vec![Voxel::new(VoxelId(0), b)];
    for id in 1..=2 {
        let position = if id == exact { exact_pos } else { exact_pos + DVec2::new(0.0, 3.0) };
        voxels.push(Voxel::new(VoxelId(id), position));
    }
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();
    swarm.anchor(VoxelId(exact)).unwrap();
    swarm.anchor(VoxelId(off)).unwrap();
    swarm
}

fn partner_of_b(mut swarm: Swarm) -> Option<VoxelId> {
    swarm.tick(Stimulus::inactive());
    assert_eq!(swarm.check_invariants(), Ok(()));
    swarm
        .voxel(VoxelId(0))
        .unwrap()
        .face(FaceIndex::ALL[3])
        .partner()
        .map(|p| p.voxel)
}

#[test]
fn tie_break_decides_between_valid_partners() {
    // Off-center voxel visited first.
    assert_eq!(partner_of_b(contested(DockingTieBreak::FirstFound, 2, 1)), Some(VoxelId(1)));
    assert_eq!(partner_of_b(contested(DockingTieBreak::Nearest, 2, 1)), Some(VoxelId(2)));
    assert_eq!(partner_of_b(contested(DockingTieBreak::LowestId, 2, 1)), Some(VoxelId(1)));

    // Exact voxel visited first.
    assert_eq!(partner_of_b(contested(DockingTieBreak::FirstFound, 1, 2)), Some(VoxelId(1)));
    assert_eq!(partner_of_b(contested(DockingTieBreak::Nearest, 1, 2)), Some(VoxelId(1)));
}

#[test]
fn fluid_partner_does_not_lock() {
    let config = quiet();
    let voxels = vec![
        Voxel::new(VoxelId(0), A),
        Voxel::new(VoxelId(1), in_front_of_face_zero(A, &config)),
    ];
    let mut swarm = Swarm::from_voxels(config, voxels).unwrap();
    for _ in 0..3 {
        swarm.tick(Stimulus::inactive());
    }
    assert_eq!(swarm.locked_count(), 0);
}

#[test]
fn lookups_reject_unknown_ids() {
    let mut swarm = Swarm::from_voxels(quiet(), vec![Voxel::new(VoxelId(0), A)]).unwrap();
    assert_eq!(swarm.voxel(VoxelId(1)).unwrap_err(), Error::UnknownVoxel(VoxelId(1)));
    assert_eq!(swarm.face_position(face(4, 0)), Err(Error::UnknownVoxel(VoxelId(4))));
    assert_eq!(swarm.anchor(VoxelId(9)), Err(Error::UnknownVoxel(VoxelId(9))));
}

#[test]
fn hand_built_population_is_validated() {
    let bad = SwarmConfig {
        friction: 0.0,
        ..quiet()
    };
    let err = Swarm::from_voxels(bad, vec![Voxel::new(VoxelId(0), A)]).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { field: "friction", .. }));
}
