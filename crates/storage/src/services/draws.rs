use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{EngineError, Result, StorageError};
use crate::models::{Competitor, DisciplineKey, Round};
use crate::repository::event::EventRepository;
use crate::repository::heat::{HeatRepository, HeatWithLanes};
use crate::repository::placement::PlacementRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::team::TeamRepository;
use crate::services::draw_planner::{self, DrawPlan, DrawThresholds, Finish, HeatResult};
use crate::services::roster_rules::RosterRules;

/// A persisted round of heats and the rounds that remain after it.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub discipline: DisciplineKey,
    pub rounds: Vec<Round>,
    pub heats: Vec<HeatWithLanes>,
}

pub struct Draws<'a> {
    pool: &'a PgPool,
}

impl<'a> Draws<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Draws the opening round from the discipline's ready pool.
    ///
    /// Planning works on a snapshot and takes no locks; a draw committed
    /// concurrently for the same discipline surfaces as `DrawExists`.
    pub async fn run_draw(&self, event_id: Uuid, discipline: &DisciplineKey) -> Result<DrawOutcome> {
        let mut tx = self.pool.begin().await?;

        let event = EventRepository::find_in(&mut tx, event_id).await?;
        if !event.program.contains(discipline) {
            return Err(EngineError::Validation(format!(
                "{discipline} is not part of the program of {}",
                event.name
            ))
            .into());
        }

        let existing = HeatRepository::list_for_discipline(&mut tx, event_id, discipline).await?;
        if let Some(round) = HeatRepository::latest_round(&existing) {
            return Err(EngineError::DrawExists {
                discipline: discipline.clone(),
                round,
            }
            .into());
        }

        let class = RosterRules::from_program(&event.program)?
            .class(&discipline.boat_class)?
            .clone();
        let pool: Vec<Competitor> = if class.is_crewed() {
            TeamRepository::list_ready(&mut tx, event_id, discipline)
                .await?
                .into_iter()
                .map(|team| Competitor::Crew(team.team_id))
                .collect()
        } else {
            RegistrationRepository::list_registered_individuals(&mut tx, event_id, discipline)
                .await?
                .into_iter()
                .map(|registration| Competitor::Individual(registration.registration_id))
                .collect()
        };

        let plan = draw_planner::plan_draw(discipline, &pool, &event.draw_settings(), DrawThresholds::default())
            .inspect_err(|e| tracing::warn!(%event_id, %discipline, "Draw rejected: {e}"))?;

        let heats = persist(&mut tx, event_id, &plan).await?;
        tx.commit().await.map_err(|e| draw_conflict(e.into(), &plan))?;

        tracing::info!(
            %event_id,
            %discipline,
            entrants = pool.len(),
            heats = heats.len(),
            rounds = ?plan.rounds,
            "Draw committed"
        );
        Ok(DrawOutcome {
            discipline: plan.discipline,
            rounds: plan.rounds,
            heats,
        })
    }

    /// Seeds the round after the latest one from its recorded placements.
    pub async fn run_next_round(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<DrawOutcome> {
        let mut tx = self.pool.begin().await?;

        let event = EventRepository::find_in(&mut tx, event_id).await?;
        let heats = HeatRepository::list_for_discipline(&mut tx, event_id, discipline).await?;
        let previous = HeatRepository::latest_round(&heats).ok_or_else(|| {
            EngineError::Validation(format!("{discipline} has not been drawn yet"))
        })?;

        let round_heats: Vec<_> = heats.iter().filter(|h| h.round == previous).collect();
        let heat_ids: Vec<Uuid> = round_heats.iter().map(|h| h.heat_id).collect();
        let placements = PlacementRepository::list_for_heats(&mut tx, &heat_ids).await?;

        let mut results = Vec::with_capacity(round_heats.len());
        for heat in &round_heats {
            let finishes: Vec<Finish> = placements
                .iter()
                .filter(|p| p.heat_id == heat.heat_id)
                .filter_map(|p| {
                    p.competitor().map(|competitor| Finish {
                        competitor,
                        place: p.place.max(0) as u32,
                        finish_time: p.finish_time,
                    })
                })
                .collect();
            if finishes.is_empty() {
                return Err(EngineError::Validation(format!(
                    "{previous} heat {} of {discipline} has no results yet",
                    heat.heat_number
                ))
                .into());
            }
            results.push(HeatResult {
                heat_number: heat.heat_number.max(0) as u32,
                finishes,
            });
        }

        let plan =
            draw_planner::plan_next_round(discipline, previous, &results, &event.draw_settings())
                .inspect_err(|e| tracing::warn!(%event_id, %discipline, "Next round rejected: {e}"))?;

        let heats = persist(&mut tx, event_id, &plan).await?;
        tx.commit().await.map_err(|e| draw_conflict(e.into(), &plan))?;

        tracing::info!(
            %event_id,
            %discipline,
            from = %previous,
            heats = heats.len(),
            "Next round committed"
        );
        Ok(DrawOutcome {
            discipline: plan.discipline,
            rounds: plan.rounds,
            heats,
        })
    }

    pub async fn heats(&self, event_id: Uuid, discipline: &DisciplineKey) -> Result<Vec<HeatWithLanes>> {
        HeatRepository::new(self.pool)
            .list_with_lanes(event_id, discipline)
            .await
    }
}

async fn persist(
    conn: &mut sqlx::PgConnection,
    event_id: Uuid,
    plan: &DrawPlan,
) -> Result<Vec<HeatWithLanes>> {
    HeatRepository::insert_plan(conn, event_id, plan)
        .await
        .map_err(|e| draw_conflict(e, plan))
}

fn draw_conflict(err: StorageError, plan: &DrawPlan) -> StorageError {
    match plan.round() {
        Some(round) if err.is_unique_violation() => EngineError::DrawExists {
            discipline: plan.discipline.clone(),
            round,
        }
        .into(),
        _ => err,
    }
}
