//! Everything on the request side: resource capabilities, URL composition,
//! transport and the authenticated client.

pub mod client;
pub mod filters;
pub mod format;
pub mod http_client;
pub mod keys;
pub mod queries;
pub mod resources;
pub mod router;
pub mod transport;

pub use client::FantasyClient;
pub use filters::{FilterSet, serialize_filters};
pub use format::{ApiResponse, ResponseFormat};
pub use keys::{GameKey, Sport, join_keys};
pub use queries::{FreeAgentQuery, PlayersAddress, PlayersQuery, TeamsAddress, TeamsQuery};
pub use resources::{ResourceKind, ResourceSpec};
pub use router::{DEFAULT_SUBRESOURCE, ResourceRouter};
pub use transport::{ReqwestTransport, Transport};
