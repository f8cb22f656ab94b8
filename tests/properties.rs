//! End-to-end properties of packing runs and combination selection.

use load_it_now::combination::{
    Budget, CombinationCandidate, CombinationConfig, FillMode, optimize_combination,
    optimize_combination_with_config,
};
use load_it_now::geometry::{first_overlap, within_bounds};
use load_it_now::model::{Container, ContainerShape, Dimension, Item};
use load_it_now::optimizer::{PackingConfig, Termination, pack, pack_with_config};
use load_it_now::spatial::PlacementStrategy;
use load_it_now::types::{Positioned, Vec3};
use load_it_now::utilization::{utilization, utilization_percent};

const STRATEGIES: [PlacementStrategy; 2] =
    [PlacementStrategy::Guillotine, PlacementStrategy::ExtremePoint];

const SCENARIOS: [((f64, f64, f64), (f64, f64, f64)); 6] = [
    ((50.0, 30.0, 40.0), (10.0, 10.0, 5.0)),
    ((120.0, 80.0, 100.0), (30.0, 20.0, 15.0)),
    ((97.0, 61.0, 43.0), (12.0, 7.0, 9.0)),
    ((40.0, 40.0, 40.0), (25.0, 10.0, 10.0)),
    ((33.5, 21.25, 17.75), (8.5, 4.25, 3.5)),
    ((10.0, 10.0, 12.0), (11.0, 1.0, 1.0)),
];

fn container(dims: (f64, f64, f64)) -> Container {
    Container::rectangular(dims).unwrap()
}

fn item(dims: (f64, f64, f64)) -> Item {
    Item::new(7, Dimension::from_tuple(dims).unwrap())
}

fn config(strategy: PlacementStrategy) -> PackingConfig {
    PackingConfig::builder().strategy(strategy).build()
}

#[test]
fn item_larger_than_container_by_volume_yields_nothing() {
    let cases = [
        ((10.0, 10.0, 10.0), (20.0, 20.0, 20.0)),
        ((10.0, 10.0, 10.0), (5.0, 5.0, 41.0)),
        ((100.0, 1.0, 1.0), (11.0, 11.0, 1.0)),
    ];
    for (c, i) in cases {
        for strategy in STRATEGIES {
            let result = pack_with_config(&container(c), &item(i), config(strategy)).unwrap();
            assert!(result.is_empty(), "{:?} in {:?} with {}", i, c, strategy);
        }
        assert!(pack(c, "cm", i, "cm").unwrap().is_empty());
    }
}

#[test]
fn placements_stay_inside_the_container() {
    for (c, i) in SCENARIOS {
        let bounds = Vec3::from_tuple(c);
        for strategy in STRATEGIES {
            let result = pack_with_config(&container(c), &item(i), config(strategy)).unwrap();
            for placed in &result.placements {
                let dims = Vec3::from_tuple(placed.dims());
                assert!(
                    within_bounds(placed.position(), dims, bounds, 1e-6),
                    "{} placed {:?} at {:?} outside {:?}",
                    strategy,
                    placed.dims(),
                    placed.position,
                    c
                );
            }
        }
    }
}

#[test]
fn guillotine_placements_never_overlap() {
    for (c, i) in SCENARIOS {
        let result =
            pack_with_config(&container(c), &item(i), config(PlacementStrategy::Guillotine))
                .unwrap();
        assert_eq!(first_overlap(&result.placements), None, "{:?} in {:?}", i, c);
    }
}

#[test]
fn extreme_point_placements_never_overlap_on_lattice() {
    let cases = [
        ((30.0, 30.0, 30.0), (10.0, 10.0, 10.0)),
        ((40.0, 20.0, 20.0), (10.0, 10.0, 10.0)),
        ((60.0, 60.0, 30.0), (20.0, 20.0, 10.0)),
    ];
    for (c, i) in cases {
        let result =
            pack_with_config(&container(c), &item(i), config(PlacementStrategy::ExtremePoint))
                .unwrap();
        assert_eq!(first_overlap(&result.placements), None, "{:?} in {:?}", i, c);
        assert!(!result.is_empty());
    }
}

#[test]
fn placement_count_respects_theoretical_maximum() {
    for (c, i) in SCENARIOS {
        let container_volume = c.0 * c.1 * c.2;
        let item_volume = i.0 * i.1 * i.2;
        let bound = (container_volume / item_volume + 1e-9).floor() as usize;
        for strategy in STRATEGIES {
            let result = pack_with_config(&container(c), &item(i), config(strategy)).unwrap();
            assert_eq!(result.theoretical_max, bound);
            assert!(result.placed_count() <= bound);
            assert!(result.iterations <= bound * PackingConfig::DEFAULT_ITERATION_BUDGET_FACTOR);
        }
    }
}

#[test]
fn utilization_matches_placed_volume() {
    for (c, i) in SCENARIOS {
        let placed = pack(c, "cm", i, "cm").unwrap();
        let reported = utilization(c, "cm", i, "cm", &placed);
        assert!((0.0..=100.0).contains(&reported));

        let expected = 100.0 * placed.len() as f64 * (i.0 * i.1 * i.2) / (c.0 * c.1 * c.2);
        assert!((reported - expected).abs() <= 0.005 + 1e-9, "{} vs {}", reported, expected);
    }
}

#[test]
fn packing_is_deterministic() {
    for (c, i) in SCENARIOS {
        for strategy in STRATEGIES {
            let first = pack_with_config(&container(c), &item(i), config(strategy)).unwrap();
            let second = pack_with_config(&container(c), &item(i), config(strategy)).unwrap();
            assert_eq!(first.placements, second.placements);
            assert_eq!(first.termination, second.termination);
        }
        assert_eq!(pack(c, "cm", i, "cm").unwrap(), pack(c, "cm", i, "cm").unwrap());
    }
}

#[test]
fn reference_carton_scenario() {
    let placed = pack((50.0, 30.0, 40.0), "cm", (10.0, 10.0, 5.0), "cm").unwrap();
    assert!(!placed.is_empty());
    assert!(placed.len() <= 120);
    assert_eq!(placed[0].position, (0.0, 0.0, 0.0));
    assert!(placed.iter().enumerate().all(|(idx, p)| p.sequence == idx));
}

#[test]
fn long_item_needs_a_long_axis() {
    assert!(
        pack((10.0, 10.0, 10.0), "cm", (11.0, 1.0, 1.0), "cm")
            .unwrap()
            .is_empty()
    );

    let tall = pack((10.0, 10.0, 11.0), "cm", (11.0, 1.0, 1.0), "cm").unwrap();
    assert!(!tall.is_empty());
    assert!(tall.iter().all(|p| p.rotated() && p.dims().2 == 11.0));
}

#[test]
fn invalid_geometry_is_rejected_before_packing() {
    assert!(pack((0.0, 10.0, 10.0), "cm", (1.0, 1.0, 1.0), "cm").is_err());
    assert!(pack((10.0, 10.0, 10.0), "cm", (1.0, f64::NAN, 1.0), "cm").is_err());
    assert!("10x10".parse::<Dimension>().is_err());
}

#[test]
fn mixed_units_match_centimeters() {
    let inches = pack((20.0, 10.0, 10.0), "in", (5.0, 5.0, 5.0), "in").unwrap();
    let centimeters = pack((50.8, 25.4, 25.4), "cm", (12.7, 12.7, 12.7), "cm").unwrap();
    assert_eq!(inches.len(), centimeters.len());
    assert_eq!(inches.len(), 16);

    let unknown = pack((50.0, 30.0, 40.0), "cubits", (10.0, 10.0, 5.0), "cm").unwrap();
    let known = pack((50.0, 30.0, 40.0), "cm", (10.0, 10.0, 5.0), "cm").unwrap();
    assert_eq!(unknown, known);
}

#[test]
fn cylinder_packs_into_inscribed_prism() {
    let drum = Container::new(ContainerShape::Cylindrical {
        radius: 20.0,
        height: 30.0,
    })
    .unwrap();
    let carton = item((10.0, 10.0, 10.0));
    let result = pack_with_config(&drum, &carton, PackingConfig::default()).unwrap();

    let prism = drum.loading_box();
    assert!(result.placements.iter().all(|p| {
        within_bounds(p.position(), Vec3::from_tuple(p.dims()), prism, 1e-6)
    }));
    // Side of the prism is about 28.28, so 2 x 2 x 3 cubes fit.
    assert_eq!(result.placed_count(), 12);
    assert_eq!(
        result.utilization,
        utilization_percent(drum.total_volume(), 1000.0, 12)
    );
    assert!(result.utilization < 40.0);
}

#[test]
fn exact_multiples_fill_completely() {
    for strategy in STRATEGIES {
        let result = pack_with_config(
            &container((40.0, 20.0, 20.0)),
            &item((10.0, 10.0, 10.0)),
            config(strategy),
        )
        .unwrap();
        assert_eq!(result.placed_count(), 32);
        assert_eq!(result.termination, Termination::TheoreticalMaximum);
        assert_eq!(result.utilization, 100.0);
    }
}

#[test]
fn combination_stays_within_budget() {
    let candidate_sets = [
        vec![("A", 5.0, 2.0), ("B", 3.0, 1.0)],
        vec![("steel", 8.0, 1.0), ("foam", 0.1, 6.0), ("wood", 0.7, 1.5)],
        vec![("x", 1.25, 0.75), ("y", 2.5, 3.5), ("z", 0.5, 0.25), ("w", 9.0, 9.0)],
    ];
    let budgets = [(10.0, 20.0), (100.0, 35.0), (57.5, 250.0)];

    for set in &candidate_sets {
        for (max_volume, max_weight) in budgets {
            let candidates: Vec<_> = set
                .iter()
                .map(|(name, w, v)| CombinationCandidate::new(*name, *w, *v).unwrap())
                .collect();
            let budget = Budget::new(max_volume, max_weight).unwrap();
            for mode in [FillMode::RoundRobin, FillMode::Saturate] {
                let config = CombinationConfig::builder().fill_mode(mode).build();
                let result =
                    optimize_combination_with_config(candidates.clone(), budget, config).unwrap();
                if result.seed_exceeds_budget {
                    continue;
                }
                assert!(result.total_volume <= max_volume, "{:?}", result);
                assert!(result.total_weight <= max_weight, "{:?}", result);
            }
        }
    }
}

#[test]
fn combination_prefers_denser_candidate() {
    let candidates = vec![
        CombinationCandidate::new("A", 5.0, 2.0).unwrap(),
        CombinationCandidate::new("B", 3.0, 1.0).unwrap(),
    ];
    let result = optimize_combination(candidates, Budget::new(10.0, 20.0).unwrap()).unwrap();

    assert_eq!(result.candidates[0].name, "B");
    assert!(result.quantity_of("B") >= result.quantity_of("A"));
    assert!(result.quantity_of("A") >= Some(1));
    assert!(result.total_volume <= 10.0);
    assert!(result.total_weight <= 20.0);
}
