//! Parameterized SQL assembly from entity descriptors.

pub mod builder;

pub use builder::{delete, insert, select_by_id, select_list, update, QueryBuf};
