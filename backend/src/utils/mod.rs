//! Small reusable helpers that do not belong to a specific domain module.

pub mod generate_random_string;
