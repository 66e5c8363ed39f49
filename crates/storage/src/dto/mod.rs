pub mod common;
pub mod draw;
pub mod entrant;
pub mod event;
pub mod registration;
pub mod results;
pub mod team;
