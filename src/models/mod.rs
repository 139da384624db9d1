//! Content documents for the portfolio site.
//!
//! Field names match the JSON the admin editor reads and writes (camelCase).

mod contact;
mod document;
mod home_posters;
mod photo;
mod project;
mod upcoming;

pub use contact::*;
pub use document::*;
pub use home_posters::*;
pub use photo::*;
pub use project::*;
pub use upcoming::*;
