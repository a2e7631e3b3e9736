pub mod check;
pub mod classify;
pub mod enhance;
pub mod interfaces;
