pub mod entrant;
pub mod event;
pub mod heat;
pub mod placement;
pub mod registration;
pub mod team;
