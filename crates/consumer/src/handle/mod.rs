pub mod ack;
pub mod queue;
pub mod vsc;
