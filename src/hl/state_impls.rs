/// Indicates that the `AD9833` instance is not initialized yet
#[derive(Debug)]
pub struct Uninitialized;

/// Indicates that the `AD9833` instance is ready to be used
#[derive(Debug)]
pub struct Ready;
