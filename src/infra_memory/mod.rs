mod clock;
mod session_store_memory;

pub use clock::*;
pub use session_store_memory::*;
