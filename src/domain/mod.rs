//! Pure domain models (Group, Expense, repartitions).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod expense;
pub mod group;
pub mod repartition;

pub use common::*;
pub use expense::*;
pub use group::*;
pub use repartition::*;
