//! Services layer for gate-service.
//!
//! Credential storage, session state, the authorization gate itself, and
//! the executors it dispatches to.

pub mod credentials;
pub mod error;
pub mod gate;
pub mod kv;
pub mod members;
pub mod metrics;
pub mod notify;
pub mod policy;
pub mod seed;
pub mod sessions;

pub use credentials::{CredentialStore, CredentialValidator, SeedCredential};
pub use error::ServiceError;
pub use gate::{AuthorizationGate, GateRegistry, GateState, SubmitOutcome};
pub use kv::{InMemoryStore, KeyValueStore, PreferencesService};
pub use members::{ActionExecutor, MemberDirectory};
pub use notify::{NotificationSink, TracingSink};
pub use policy::{PinPolicy, PolicyError};
pub use sessions::SessionService;
