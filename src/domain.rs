// Domain layer modules
pub mod account;
pub mod index;
pub mod policy;
pub mod region;
pub mod remote_error;
pub mod run_summary;

// Re-exports
pub use account::{Account, AccountStatus};
pub use index::{
    view_arn_has_name, IndexState, IndexStatus, IndexSummary, IndexType, DEFAULT_VIEW_FILTER,
    DEFAULT_VIEW_NAME,
};
pub use policy::{federated_trust_policy, PolicyTemplate, ACCOUNT_ID_PLACEHOLDER};
pub use region::{RegionInfo, RegionOptStatus, RegionSet, AGGREGATOR_HOME_REGION};
pub use remote_error::{classify_error, RemoteError, RemoteErrorKind};
pub use run_summary::{
    AccountFailure, AccountOutcome, DefaultViewInfo, DefaultViewStatus, RunSummary,
    TeardownSummary,
};
