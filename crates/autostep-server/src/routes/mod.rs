pub mod events;
pub mod human;
pub mod parameters;
pub mod queue;
