pub mod entities;
pub mod fallback;
pub mod image_normalizer;
pub mod normalizer;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use ports::*;
pub use value_objects::*;
