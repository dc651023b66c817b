pub mod devices;

pub use devices::DevicesScreen;
