//! IBM Quantum backend adapter for qpass.
//!
//! Talks to the IBM Quantum REST API directly with `reqwest`. Two auth flows
//! are supported:
//!
//! | Credentials | Endpoint | Auth |
//! |-------------|----------|------|
//! | API key (optional service CRN) | `quantum.cloud.ibm.com/api` | IAM token exchange |
//! | Token, direct-token mode | `api.quantum-computing.ibm.com` | Bearer token |
//!
//! Without a service CRN the first Quantum service instance found through
//! IBM Cloud resource search is used.
//!
//! Jobs go through the Sampler V2 primitive, whose results carry one sample
//! per shot. [`IbmBackend`] decodes those into ordered per-shot memory.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qpass_adapter_ibm::{IbmBackend, IbmClient, IbmCredentials};
//! use qpass_hal::Backend;
//!
//! let credentials = IbmCredentials::new(api_key);
//! let client = Arc::new(IbmClient::from_credentials(&credentials).await?);
//! let backend = IbmBackend::least_busy(client).await?;
//!
//! let job_id = backend.submit(&isa_circuit, 128).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

pub mod api;
mod backend;
mod error;

pub use api::{
    BackendInfo, BackendStatus, DEFAULT_ENDPOINT, IAM_TOKEN_URL, IbmClient, IbmCredentials,
    LEGACY_ENDPOINT, RESOURCE_SEARCH_URL, select_least_busy,
};
pub use backend::{DEFAULT_POLL_INTERVAL, IbmBackend};
pub use error::{IbmError, IbmResult};
