pub mod block;
pub mod matured;
pub mod packet;
pub mod slash;
