pub mod audit_logs;
pub mod categories;
pub mod customers;
pub mod media;
pub mod order_lines;
pub mod orders;
pub mod products;
pub mod variants;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use media::Entity as Media;
pub use order_lines::Entity as OrderLines;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use variants::Entity as Variants;
