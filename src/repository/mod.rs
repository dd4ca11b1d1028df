//! Per-entity data access.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so services can
//! run the same query on the pool or inside an open transaction.

pub mod categories;
pub mod customers;
pub mod media;
pub mod orders;
pub mod products;
pub mod variants;
