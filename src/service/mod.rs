//! Generic CRUD execution.

pub mod crud;

pub use crud::CrudService;
