mod keyspace;
mod session;

pub use keyspace::*;
pub use session::*;
