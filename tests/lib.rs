// Shared fixtures for the integration tests.
pub mod theory;

pub mod monotone;

pub mod diagram;

pub mod attach;
pub mod homotopy;

pub mod projection;
pub mod serial;
