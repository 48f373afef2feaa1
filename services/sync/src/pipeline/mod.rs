pub mod cursor;
pub mod paginator;
pub mod runner;
pub mod workers;

#[cfg(test)]
mod testing;

pub use runner::SyncRunner;
