//! Repository abstractions for data access.
//!
//! Repositories wrap one tenant's connection (and blob store where content is
//! involved), hiding the `SeaORM` details from the request handlers.

pub mod file;
pub mod folder;
pub mod sign_request;
pub mod user;

pub use file::{CopyFileInput, DEFAULT_FILE_NAME, FileError, FileRepository, UploadFileInput};
pub use folder::{
    CreateFolderInput, DeletedSubtree, FolderError, FolderItems, FolderRepository,
    UpdateFolderInput,
};
pub use sign_request::{CreateSignRequestInput, SignRequestRepository};
pub use user::{CreateUserInput, SERVICE_USER_LOGIN, SERVICE_USER_NAME, UserRepository};
