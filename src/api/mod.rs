//! API response types shared by all routes

pub mod response;

#[allow(unused_imports)]
pub use response::{Created, DataResponse, MessageResponse, NoContent};
