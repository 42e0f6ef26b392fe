pub mod error;
pub mod keys;
pub mod models;
pub mod params;
pub mod text;
pub mod traits;

pub use error::*;
pub use keys::*;
pub use models::*;
pub use params::*;
pub use text::*;
pub use traits::*;
