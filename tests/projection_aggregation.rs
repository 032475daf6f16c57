// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Merge-by-minimum behavior of the projection accumulator

use discretesurf::{ProjectionAccumulator, ProjectionCandidates};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const POINTS: usize = 6;

fn arb_batch() -> impl Strategy<Value = ProjectionCandidates> {
    let entry = (0.0..100.0f64, prop::array::uniform3(-10.0..10.0f64), prop::array::uniform3(-1.0..1.0f64));
    prop::collection::vec(entry, POINTS).prop_map(|entries| ProjectionCandidates {
        distances2: entries.iter().map(|e| e.0).collect(),
        points: entries.iter().map(|e| Point3::from(e.1)).collect(),
        auxiliary: entries.iter().map(|e| Vector3::from(e.2)).collect(),
    })
}

fn run(batches: &[ProjectionCandidates]) -> ProjectionAccumulator {
    let query = vec![Point3::origin(); POINTS];
    let mut acc = ProjectionAccumulator::new(POINTS);
    for batch in batches {
        acc.accumulate(&query, batch).unwrap();
    }
    acc
}

proptest! {
    #[test]
    fn final_state_is_minimum_offered(batches in prop::collection::vec(arb_batch(), 1..8)) {
        let acc = run(&batches);

        for i in 0..POINTS {
            // Earliest batch wins among equal minima
            let winner = batches
                .iter()
                .fold(None::<&ProjectionCandidates>, |best, b| match best {
                    Some(best) if best.distances2[i] <= b.distances2[i] => Some(best),
                    _ => Some(b),
                })
                .unwrap();

            prop_assert_eq!(acc.distances2()[i], winner.distances2[i]);
            prop_assert_eq!(acc.points()[i], winner.points[i]);
            prop_assert_eq!(acc.auxiliary()[i], winner.auxiliary[i]);
        }
    }

    #[test]
    fn batch_order_does_not_matter(batches in prop::collection::vec(arb_batch(), 1..8), seed in any::<u64>()) {
        let mut shuffled = batches.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        let a = run(&batches);
        let b = run(&shuffled);

        prop_assert_eq!(a.distances2(), b.distances2());
        for i in 0..POINTS {
            // Ties keep whichever batch came first
            let unique = batches.iter().filter(|c| c.distances2[i] == a.distances2()[i]).count() == 1;
            if unique {
                prop_assert_eq!(a.points()[i], b.points()[i]);
                prop_assert_eq!(a.auxiliary()[i], b.auxiliary()[i]);
            }
        }
    }
}

#[test]
fn unprojectable_points_keep_sentinel() {
    let query = vec![Point3::new(1.0, 2.0, 3.0); 2];
    let mut acc = ProjectionAccumulator::new(2);

    let far = ProjectionCandidates {
        distances2: vec![2e10, f64::INFINITY],
        points: vec![Point3::new(9.0, 9.0, 9.0); 2],
        auxiliary: vec![Vector3::x(); 2],
    };
    assert_eq!(acc.accumulate(&query, &far).unwrap(), 0);

    for i in 0..2 {
        assert!(!acc.is_projected(i));
        assert_eq!(acc.best(i), Some((1e10, Point3::origin(), Vector3::zeros())));
    }
}

#[test]
fn accumulate_is_idempotent() {
    let query = vec![Point3::origin(); 3];
    let batch = ProjectionCandidates {
        distances2: vec![1.0, 2.0, 3.0],
        points: vec![Point3::new(1.0, 0.0, 0.0); 3],
        auxiliary: vec![Vector3::z(); 3],
    };

    let mut acc = ProjectionAccumulator::new(3);
    assert_eq!(acc.accumulate(&query, &batch).unwrap(), 3);
    let snapshot = acc.clone();
    assert_eq!(acc.accumulate(&query, &batch).unwrap(), 0);
    assert_eq!(acc, snapshot);
}
