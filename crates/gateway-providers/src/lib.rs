//! # Gateway Providers
//!
//! Provider adapters for the AI gateway.
//!
//! An adapter is a static description of one provider's HTTP API: endpoint
//! template, header templates, where the credential goes, how the request
//! body is shaped and where the generated text lives in the response.
//! Built-in adapters:
//! - OpenAI (chat completions, JSON response format)
//! - Gemini (Google AI Studio `generateContent`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod transport;

// Re-export main types
pub use adapter::{CredentialPlacement, ProviderAdapter, CREDENTIAL_PLACEHOLDER, MODEL_PLACEHOLDER};
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use registry::{AdapterRegistry, AdapterRegistryBuilder};
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
