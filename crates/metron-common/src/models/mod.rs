//! Catalog domain models shared across all Metron services.
//!
//! These are the "truth" types: what the database stores and the API serializes.
//! Rows use `BIGSERIAL` ids; every catalog row carries the same audit fields
//! (`created_on`, `modified`, `created_by`, `edited_by`).

pub mod arc;
pub mod character;
pub mod collection;
pub mod common;
pub mod creator;
pub mod credit;
pub mod genre;
pub mod imprint;
pub mod issue;
pub mod publisher;
pub mod reading_list;
pub mod series;
pub mod team;
pub mod universe;
pub mod user;
pub mod variant;

/// Re-export all model types for convenience.
pub use arc::*;
pub use character::*;
pub use collection::*;
pub use common::*;
pub use creator::*;
pub use credit::*;
pub use genre::*;
pub use imprint::*;
pub use issue::*;
pub use publisher::*;
pub use reading_list::*;
pub use series::*;
pub use team::*;
pub use universe::*;
pub use user::*;
pub use variant::*;
