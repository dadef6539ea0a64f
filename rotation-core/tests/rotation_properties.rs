use std::collections::BTreeSet;

use rotation_core::{
    AptitudeCategory, AptitudeGrades, CharacterProfile, Distance, GenerationReport, Grade, Half,
    PatternResult, PlannerConfig, RaceCatalog, RaceId, RaceRecord, RaceSnapshot, Scenario,
    StageEligibility, Surface, TemplateBook, WeightedScorer, default_book, generate,
};

fn race(id: RaceId, name: &str, surface: Surface, month: u8, half: Half) -> RaceRecord {
    RaceRecord {
        id,
        name: name.to_string(),
        surface,
        distance: Distance::Medium,
        grade: 1,
        eligibility: StageEligibility {
            classic: true,
            senior: true,
            ..StageEligibility::default()
        },
        month,
        half,
        bc_final: false,
        larc_exclusive: false,
    }
}

fn bc_final(id: RaceId, name: &str, surface: Surface) -> RaceRecord {
    RaceRecord {
        eligibility: StageEligibility {
            senior: true,
            ..StageEligibility::default()
        },
        bc_final: true,
        ..race(id, name, surface, 11, Half::Front)
    }
}

fn profile(aptitudes: AptitudeGrades) -> CharacterProfile {
    CharacterProfile {
        id: 5,
        name: "Property".to_string(),
        aptitudes,
    }
}

fn run(snapshot: &RaceSnapshot, templates: &TemplateBook) -> GenerationReport {
    generate(
        snapshot,
        templates,
        &PlannerConfig::default(),
        &WeightedScorer::default(),
    )
}

fn race_ids(pattern: &PatternResult) -> Vec<RaceId> {
    pattern.races().map(|r| r.id).collect()
}

#[test]
fn zero_outstanding_races_yield_no_patterns() {
    let catalog = RaceCatalog::new(vec![
        bc_final(1, "BC Turf", Surface::Turf),
        race(2, "Osaka Hai", Surface::Turf, 3, Half::Back),
    ]);
    let snapshot = RaceSnapshot {
        profile: profile(AptitudeGrades::uniform(Grade::A)),
        completed: catalog.iter().map(|r| r.id).collect(),
        catalog,
    };
    let report = run(&snapshot, default_book());
    assert!(report.patterns.is_empty());
    assert!(report.unplaced.is_empty());
    assert_eq!(report.completed, vec![1, 2]);
}

#[test]
fn one_final_without_exclusive_races_gives_one_primary_pattern() {
    let snapshot = RaceSnapshot {
        profile: profile(AptitudeGrades::uniform(Grade::A)),
        catalog: RaceCatalog::new(vec![
            bc_final(1, "BC Turf", Surface::Turf),
            race(2, "Osaka Hai", Surface::Turf, 3, Half::Back),
            race(3, "Tenno Sho (Autumn)", Surface::Turf, 10, Half::Back),
        ]),
        completed: BTreeSet::new(),
    };
    let report = run(&snapshot, &TemplateBook::default());
    assert_eq!(report.patterns.len(), 1);
    let pattern = &report.patterns[0];
    assert_eq!(pattern.scenario, Scenario::Bc);
    assert_eq!(pattern.final_race.as_ref().map(|r| r.id), Some(1));
    assert!(
        pattern.strategy.is_none(),
        "naturally runnable final needs no investment"
    );
    assert_eq!(pattern.total_races, 3);
    assert!(report.unplaced.is_empty());
}

#[test]
fn exclusive_races_give_one_secondary_pattern_with_fixed_mandatory_slots() {
    let mut prix_niel = race(4, "Prix Niel", Surface::Turf, 9, Half::Front);
    prix_niel.eligibility = StageEligibility {
        classic: true,
        ..StageEligibility::default()
    };
    prix_niel.larc_exclusive = true;
    let mut arc = race(5, "Prix de l'Arc de Triomphe", Surface::Turf, 10, Half::Front);
    arc.larc_exclusive = true;

    let snapshot = RaceSnapshot {
        profile: profile(AptitudeGrades::uniform(Grade::B)),
        catalog: RaceCatalog::new(vec![
            bc_final(1, "BC Turf", Surface::Turf),
            race(2, "Osaka Hai", Surface::Turf, 3, Half::Back),
            prix_niel,
            arc,
        ]),
        completed: BTreeSet::new(),
    };
    let report = run(&snapshot, default_book());

    let secondary: Vec<&PatternResult> = report
        .patterns
        .iter()
        .filter(|p| p.scenario == Scenario::Larc)
        .collect();
    assert_eq!(secondary.len(), 1);
    let larc = secondary[0];
    assert!(larc.strategy.is_none());
    assert!(
        larc.classic
            .iter()
            .any(|r| r.id == 4 && r.month == 9 && r.half == Half::Front)
    );
    assert!(
        larc.senior
            .iter()
            .any(|r| r.id == 5 && r.month == 10 && r.half == Half::Front)
    );
    assert_eq!(
        larc.composition.scenario_bonus,
        vec![AptitudeCategory::Turf, AptitudeCategory::Medium]
    );
    for pattern in report.patterns.iter().filter(|p| p.scenario == Scenario::Bc) {
        assert!(!race_ids(pattern).contains(&4));
        assert!(!race_ids(pattern).contains(&5));
    }
}

#[test]
fn races_beyond_the_enhancement_budget_are_never_assigned() {
    let aptitudes = AptitudeGrades::uniform(Grade::A).with(AptitudeCategory::Dirt, Grade::E);
    let snapshot = RaceSnapshot {
        profile: profile(aptitudes),
        catalog: RaceCatalog::new(vec![
            bc_final(1, "BC Turf", Surface::Turf),
            race(2, "Kawasaki Kinen", Surface::Dirt, 1, Half::Back),
            race(3, "Osaka Hai", Surface::Turf, 3, Half::Back),
            race(4, "Tokyo Daishoten", Surface::Dirt, 12, Half::Back),
        ]),
        completed: BTreeSet::new(),
    };
    let report = run(&snapshot, &TemplateBook::default());
    for pattern in &report.patterns {
        let ids = race_ids(pattern);
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&4));
        assert!(pattern.aptitude.grade(AptitudeCategory::Dirt) < Grade::A);
    }
    assert_eq!(report.unplaced, vec![2, 4]);
}

#[test]
fn finals_needing_investment_come_first() {
    let aptitudes = AptitudeGrades::uniform(Grade::A).with(AptitudeCategory::Dirt, Grade::B);
    let snapshot = RaceSnapshot {
        profile: profile(aptitudes),
        catalog: RaceCatalog::new(vec![
            bc_final(1, "BC Turf", Surface::Turf),
            bc_final(2, "BC Classic", Surface::Dirt),
        ]),
        completed: BTreeSet::new(),
    };
    let report = run(&snapshot, &TemplateBook::default());
    let finals: Vec<Option<RaceId>> = report
        .patterns
        .iter()
        .map(|p| p.final_race.as_ref().map(|r| r.id))
        .collect();
    assert_eq!(finals, vec![Some(2), Some(1)]);
    let strategy = report.patterns[0].strategy.expect("dirt final needs investment");
    assert_eq!(strategy.get(AptitudeCategory::Dirt), 1);
    assert_eq!(report.patterns[0].composition.total_stars, 3);
    assert!(report.patterns[1].strategy.is_none());
}

#[test]
fn contended_slot_spreads_across_grids() {
    let snapshot = RaceSnapshot {
        profile: profile(AptitudeGrades::uniform(Grade::A)),
        catalog: RaceCatalog::new(vec![
            bc_final(1, "BC Turf", Surface::Turf),
            race(2, "Takarazuka Kinen", Surface::Turf, 6, Half::Back),
            race(3, "Takarazuka Twin", Surface::Turf, 6, Half::Back),
            race(4, "Takarazuka Triplet", Surface::Turf, 6, Half::Back),
        ]),
        completed: BTreeSet::new(),
    };
    let report = run(&snapshot, &TemplateBook::default());
    assert!(report.unplaced.is_empty(), "overflow absorbs the contention");

    let mut seen = BTreeSet::new();
    for pattern in &report.patterns {
        for id in race_ids(pattern).into_iter().filter(|id| *id != 1) {
            assert!(seen.insert(id), "race {id} placed twice");
        }
    }
    assert_eq!(seen, BTreeSet::from([2, 3, 4]));
}
