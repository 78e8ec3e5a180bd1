//! Card metadata API client.
//!
//! ## Key Types
//!
//! - `CardMetadataSource`: lookup seam (name, id, image URL)
//! - `ScryfallClient`: rate-limited blocking HTTP implementation
//! - `ScryfallCard`: API card payload with image-size fallback

pub mod card;
pub mod client;
pub mod rate_limit;

pub use card::{CardFace, ImageSize, ScryfallCard};
pub use client::{complete_missing_names, CardMetadataSource, ScryfallClient};
pub use rate_limit::RateLimiter;
