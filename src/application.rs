// アプリケーション層モジュール
pub mod access_provisioner;
pub mod account_discoverer;
pub mod index_reconciler;
pub mod orchestrator;
pub mod region_resolver;
pub mod teardown_reconciler;

// 再エクスポート
pub use access_provisioner::{AccessProvisionError, AccessProvisioner};
pub use account_discoverer::{AccountDiscoverer, AccountDiscoveryError};
pub use index_reconciler::{IndexReconcileError, IndexTopologyReconciler, ReconcileOptions};
pub use orchestrator::{
    AccountError, Action, DestroyBody, DestroyResponse, DiscoverResponse, InvocationRequest,
    InvocationResponse, Orchestrator, OrchestratorError, SetupResponse,
};
pub use region_resolver::RegionResolver;
pub use teardown_reconciler::TeardownReconciler;
