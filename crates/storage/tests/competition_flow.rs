use rust_decimal::Decimal;
use storage::error::EngineError;
use storage::models::{
    BoatClass, Competitor, DisciplineKey, DrawSettings, EventStatus, RegistrationStatus, RoleTag,
    Round, Sex,
};
use storage::services::draw_planner::{self, DrawThresholds, Finish, HeatResult};
use storage::services::registration_state;
use storage::services::results_aggregator::{MedalTable, MedalTally, PlacedResult};
use storage::services::roster::{Candidate, Roster};
use uuid::Uuid;

const EVENT: Uuid = Uuid::from_u128(0xE1);

fn registration(n: u128) -> Uuid {
    Uuid::from_u128(0x1000 + n)
}

fn seconds(tenths: i64) -> Option<Decimal> {
    Some(Decimal::new(tenths, 1))
}

/// Runs the heats of a round with a fixed finishing order: lane 1 wins,
/// and every lane is a second slower than the one before it.
fn race(heats: &[draw_planner::PlannedHeat], base_tenths: i64) -> Vec<HeatResult> {
    heats
        .iter()
        .map(|heat| HeatResult {
            heat_number: heat.heat_number,
            finishes: heat
                .lanes
                .iter()
                .map(|lane| Finish {
                    competitor: lane.competitor,
                    place: lane.lane,
                    finish_time: seconds(
                        base_tenths + heat.heat_number as i64 + lane.lane as i64 * 10,
                    ),
                })
                .collect(),
        })
        .collect()
}

fn placed(discipline: &DisciplineKey, round: Round, results: &[HeatResult]) -> Vec<PlacedResult> {
    results
        .iter()
        .flat_map(|heat| heat.finishes.iter())
        .map(|finish| PlacedResult {
            discipline: discipline.clone(),
            round,
            competitor: finish.competitor,
            place: finish.place,
        })
        .collect()
}

#[test]
fn test_single_seat_discipline_from_sign_up_to_medals() {
    let k1 = BoatClass::parse("K-1").unwrap();
    let discipline = DisciplineKey::new("K-1", Sex::Male, 500, "Senior");
    let settings = DrawSettings {
        lane_capacity: 9,
        advance_per_heat: 3,
        advance_by_time: 2,
    };

    // twelve entrants confirm while registration is open and go straight to Registered
    let mut pool = Vec::new();
    for n in 0..12 {
        let id = registration(n);
        let confirmed = registration_state::confirm(
            id,
            RegistrationStatus::Queued,
            EVENT,
            EventStatus::RegistrationOpen,
        )
        .unwrap();
        let ready = registration_state::register_individual(id, confirmed, &k1).unwrap();
        assert_eq!(ready, RegistrationStatus::Registered);
        pool.push(Competitor::Individual(id));
    }

    // a late confirmation after the window closes is refused
    let late = registration_state::confirm(
        registration(99),
        RegistrationStatus::Queued,
        EVENT,
        EventStatus::RegistrationClosed,
    );
    assert_eq!(late, Err(EngineError::RegistrationClosed { event_id: EVENT }));

    let semis = draw_planner::plan_draw(&discipline, &pool, &settings, DrawThresholds::default())
        .unwrap();
    assert_eq!(semis.rounds, vec![Round::Semifinal, Round::Final]);
    assert_eq!(semis.heats.len(), 2);
    assert!(semis.heats.iter().all(|h| h.len() == 6));

    let semi_results = race(&semis.heats, 1000);
    let final_plan =
        draw_planner::plan_next_round(&discipline, Round::Semifinal, &semi_results, &settings)
            .unwrap();
    assert_eq!(final_plan.rounds, vec![Round::Final]);
    assert_eq!(final_plan.heats.len(), 1);
    // three per heat plus the two fastest of the rest
    assert_eq!(final_plan.heats[0].len(), 8);

    let final_results = race(&final_plan.heats, 990);
    let mut all_placements = placed(&discipline, Round::Semifinal, &semi_results);
    all_placements.extend(placed(&discipline, Round::Final, &final_results));

    let table = MedalTable::aggregate(&all_placements);
    assert_eq!(
        table.tally(&discipline),
        MedalTally {
            gold: 1,
            silver: 1,
            bronze: 1,
            total: 8
        }
    );

    // nothing comes after the final
    let after_final =
        draw_planner::plan_next_round(&discipline, Round::Final, &final_results, &settings);
    assert!(matches!(after_final, Err(EngineError::Validation(_))));
}

#[test]
fn test_dragon_crews_form_and_race_a_straight_final() {
    let dragon = BoatClass::parse("D-10").unwrap();
    let discipline = DisciplineKey::new("D-10", Sex::Mixed, 200, "Senior");
    let settings = DrawSettings::default();

    let mut crews = Vec::new();
    for team in 0..3u128 {
        let team_id = Uuid::from_u128(0x7000 + team);
        let mut roster = Roster::new(team_id, dragon.clone()).unwrap();

        let mut roles = vec![RoleTag::Captain, RoleTag::Coxswain, RoleTag::Drummer];
        roles.extend(std::iter::repeat_n(RoleTag::Member, 9));
        roles.extend([RoleTag::Reserve, RoleTag::Reserve]);

        for (seat, role) in roles.into_iter().enumerate() {
            let n = team * 100 + seat as u128;
            roster
                .add_member(
                    Candidate {
                        registration_id: registration(n),
                        entrant_id: n as i32,
                        status: RegistrationStatus::Confirmed,
                    },
                    role,
                )
                .unwrap();
        }

        assert_eq!(roster.len(), 14);
        assert!(roster.is_fully_formed());
        assert!(
            roster
                .members()
                .iter()
                .all(|m| m.status == RegistrationStatus::Registered)
        );

        let overflow = roster.add_member(
            Candidate {
                registration_id: registration(team * 100 + 50),
                entrant_id: (team * 100 + 50) as i32,
                status: RegistrationStatus::Confirmed,
            },
            RoleTag::Member,
        );
        assert!(matches!(overflow, Err(EngineError::CapacityExceeded { .. })));

        crews.push(Competitor::Crew(team_id));
    }

    let plan = draw_planner::plan_draw(&discipline, &crews, &settings, DrawThresholds::default())
        .unwrap();
    assert_eq!(plan.rounds, vec![Round::Final]);
    assert_eq!(plan.heats.len(), 1);
    assert_eq!(plan.heats[0].len(), 3);
}
