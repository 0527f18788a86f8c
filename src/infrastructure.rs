// Infrastructure layer modules
pub mod account_client_provider;
mod aws_error;
pub mod config;
pub mod iam_ops;
pub mod logging;
pub mod organizations_ops;
pub mod region_catalog_ops;
pub mod resource_explorer_ops;

// Re-exports
pub use account_client_provider::{
    AccountClientProvider, AccountClients, AwsAccountClientProvider, ROLE_SESSION_NAME,
};
pub use config::{SetupConfig, SetupConfigError};
pub use iam_ops::{AwsIamOps, IamOps, RoleTag};
pub use logging::init_logging;
pub use organizations_ops::{AccountPage, AccountRecord, AwsOrganizationsOps, OrganizationsOps};
pub use region_catalog_ops::{AwsRegionCatalogOps, RegionCatalogOps};
pub use resource_explorer_ops::{AwsResourceExplorerOps, ResourceExplorerOps};
