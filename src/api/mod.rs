//! API handlers for Biblion REST endpoints

pub mod books;
pub mod fines;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
