pub mod draws;
pub mod entrants;
pub mod events;
pub mod registrations;
pub mod results;
pub mod teams;
