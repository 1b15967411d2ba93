// Platform-specific code module

pub mod ports;

// Re-exports for clean imports
pub use ports::is_port_listening;
