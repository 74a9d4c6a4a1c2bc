mod resolver;

pub use resolver::{Connection, ConnectionResolver};
