pub mod draw_planner;
pub mod draws;
pub mod registration_state;
pub mod registrations;
pub mod results;
pub mod results_aggregator;
pub mod roster;
pub mod roster_builder;
pub mod roster_rules;
