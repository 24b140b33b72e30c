//! Route handlers

pub mod faults;
pub mod readings;
pub mod rules;
