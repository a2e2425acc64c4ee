//! Network adapters for the Wandalf collaborator services.

pub mod http_collaborator;

pub use http_collaborator::HttpCollaboratorClient;
