//! Ordered transport steps

/// One step of a request, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportStep {
    /// Configure the bearer profile
    AttachBearer,
    /// Open the bearer
    OpenBearer,
    /// Start the HTTP service
    InitHttp,
    /// Bind HTTP to the bearer context
    BindBearer,
    /// Set the request URL
    SetUrl,
    /// Execute the GET
    Action,
    /// Read the reply
    Read,
}

impl TransportStep {
    /// All steps in execution order
    pub const ALL: [TransportStep; 7] = [
        TransportStep::AttachBearer,
        TransportStep::OpenBearer,
        TransportStep::InitHttp,
        TransportStep::BindBearer,
        TransportStep::SetUrl,
        TransportStep::Action,
        TransportStep::Read,
    ];

    /// Short name for logs and diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            TransportStep::AttachBearer => "attach-bearer",
            TransportStep::OpenBearer => "open-bearer",
            TransportStep::InitHttp => "http-init",
            TransportStep::BindBearer => "bind-bearer",
            TransportStep::SetUrl => "set-url",
            TransportStep::Action => "http-action",
            TransportStep::Read => "http-read",
        }
    }
}
