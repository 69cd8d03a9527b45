pub mod collection;
pub mod errors;
pub mod html;
pub mod models;
pub mod session;

pub use collection::memory::MemoryCollection;
pub use collection::Collection;
pub use errors::*;
pub use html::*;
pub use models::*;
pub use session::*;
