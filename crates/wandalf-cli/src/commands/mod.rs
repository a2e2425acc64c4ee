pub mod preview;
pub mod session;
pub mod turn;
