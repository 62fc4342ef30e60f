mod classify;
mod command;
mod context;
mod http;
mod info;
mod options;
mod session;

pub use classify::*;
pub use command::*;
pub use context::*;
pub use http::*;
pub use info::*;
pub use options::*;
pub use session::*;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("client is nil")]
    NilClient,

    #[error("malformed request target {target:?}")]
    MalformedTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to encode request body")]
    EncodingFailure(#[source] serde_json::Error),

    #[error("transport failure")]
    Transport(#[source] reqwest::Error),

    #[error(transparent)]
    Cancelled(#[from] ContextError),

    /// The response classifier rejected a delivered response.
    #[error("camera returned {}: {error}", .response.status)]
    Protocol {
        response: Box<ResponseMeta>,
        error: ProtocolError,
    },

    #[error("{command} needs a session id under API level 1, start a session first")]
    MissingSession { command: &'static str },

    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Operations a connected camera supports.
#[async_trait::async_trait]
pub trait CameraControl: private::Sealed {
    async fn info(&self, ctx: &CallContext) -> Result<Info, crate::Error>;

    async fn device_state(&self, ctx: &CallContext) -> Result<DeviceState, crate::Error>;

    /// Runs any named command through `osc/commands/execute`.
    async fn execute(&self, ctx: &CallContext, command: &CommandRequest) -> Result<CommandResponse, crate::Error>;

    /// Polls a command that answered `inProgress`.
    async fn command_status(&self, ctx: &CallContext, id: &str) -> Result<CommandResponse, crate::Error>;

    /// Runs `camera.startSession` and records the issued session id.
    async fn start_session(&mut self, ctx: &CallContext) -> Result<CommandResponse, crate::Error>;

    /// Runs `camera.setOptions`, attaching the session id under API level 1.
    async fn set_options(&mut self, ctx: &CallContext, options: Options) -> Result<CommandResponse, crate::Error>;
}

mod private {
    pub trait Sealed {}

    impl Sealed for crate::HttpCamera {}
}
