pub mod attendance;
pub mod clock;
pub mod error;
pub mod reserve;
pub mod sensor;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod testutil;
