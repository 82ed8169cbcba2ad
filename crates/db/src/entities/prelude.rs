//! Entity re-exports.

pub use super::files::Entity as Files;
pub use super::folders::Entity as Folders;
pub use super::sign_requests::Entity as SignRequests;
pub use super::users::Entity as Users;
