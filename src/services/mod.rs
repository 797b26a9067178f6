// src/services/mod.rs
//
// Clients for the external identity services this API brokers between

pub mod firebase;
pub mod kakao;

// Re-export commonly used types for convenience
pub use firebase::FirebaseIdentityPlatform;
pub use kakao::KakaoClient;
