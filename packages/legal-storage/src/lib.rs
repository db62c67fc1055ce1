pub mod activities;
pub mod cases;
pub mod clients;
pub mod db;
pub mod directories;
pub mod documents;
pub mod ids;
pub mod models;
pub mod research;
pub mod schema;
pub mod settings;
pub mod users;

mod error;

pub use error::{Error, Result};
