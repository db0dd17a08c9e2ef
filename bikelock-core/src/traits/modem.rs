//! Cellular modem trait

/// Trait for the cellular modem's HTTP primitives
///
/// Each method maps to one modem command. The communication client calls
/// them in the order they are declared here; a method should return once
/// the modem has acknowledged the command or its own timeout has elapsed.
pub trait Modem {
    /// Error type for modem commands
    type Error;

    /// Configure the GPRS bearer profile (attach to the carrier)
    fn attach_bearer(&mut self) -> Result<(), Self::Error>;

    /// Open the GPRS bearer
    fn open_bearer(&mut self) -> Result<(), Self::Error>;

    /// Initialize the HTTP service
    fn http_init(&mut self) -> Result<(), Self::Error>;

    /// Bind the HTTP service to the bearer context
    fn http_bind_bearer(&mut self) -> Result<(), Self::Error>;

    /// Set the request URL
    fn http_set_url(&mut self, url: &str) -> Result<(), Self::Error>;

    /// Execute the GET request
    fn http_action(&mut self) -> Result<(), Self::Error>;

    /// Read the reply body into `buf`
    ///
    /// Returns the number of bytes written; 0 means the reply was empty.
    fn http_read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Terminate the HTTP service
    fn http_terminate(&mut self) -> Result<(), Self::Error>;

    /// Close the GPRS bearer
    fn close_bearer(&mut self) -> Result<(), Self::Error>;
}
