pub mod catalog_service;
pub mod customer_service;
pub mod integrity_service;
pub mod inventory_service;
pub mod order_service;
