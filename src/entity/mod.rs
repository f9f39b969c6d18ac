pub mod audit_logs;
pub mod banners;
pub mod categories;
pub mod json;
pub mod orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use banners::Entity as Banners;
pub use categories::Entity as Categories;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
