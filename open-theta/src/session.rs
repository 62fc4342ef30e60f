use tracing::{info, warn};

use crate::{CallContext, CameraControl, Error, HttpCamera, Options};

/// Protocol generation negotiated with the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ApiLevel {
    /// OSC v1 (THETA API v2.0), session based. Cameras boot into this level.
    #[default]
    V1,
    /// OSC v2 (THETA API v2.1), sessionless.
    V2,
}

impl ApiLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            ApiLevel::V1 => 1,
            ApiLevel::V2 => 2,
        }
    }
}

impl TryFrom<u8> for ApiLevel {
    type Error = u8;

    fn try_from(level: u8) -> Result<Self, u8> {
        match level {
            1 => Ok(ApiLevel::V1),
            2 => Ok(ApiLevel::V2),
            other => Err(other),
        }
    }
}

/// Where a client stands in the session handshake driven by [`begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolState {
    #[default]
    Uninitialized,
    SessionStarted,
    OptionsNegotiated,
    Failed,
}

/// Per-connection protocol state. Readable by anyone, written only by the
/// command operations of this crate.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    api_level: ApiLevel,
    session_id: Option<String>,
    protocol: ProtocolState,
}

impl ClientState {
    pub fn api_level(&self) -> ApiLevel {
        self.api_level
    }

    /// The legacy session id. Always `None` once the camera speaks level 2.
    pub fn session_id(&self) -> Option<&str> {
        match self.api_level {
            ApiLevel::V1 => self.session_id.as_deref(),
            ApiLevel::V2 => None,
        }
    }

    pub fn protocol_state(&self) -> ProtocolState {
        self.protocol
    }

    pub(crate) fn record_session(&mut self, session_id: String) {
        if self.api_level == ApiLevel::V1 {
            self.session_id = Some(session_id);
        }
    }

    pub(crate) fn elevate(&mut self, level: ApiLevel) {
        self.api_level = level;
        if level != ApiLevel::V1 {
            self.session_id = None;
        }
    }

    pub(crate) fn transition(&mut self, next: ProtocolState) {
        self.protocol = next;
    }
}

/// Starts a session and asks the camera to switch to API level 2.
///
/// Cameras reached over wireless LAN start at level 1, so the legacy session
/// is always opened first. Success means both exchanges were delivered and
/// accepted by the response classifier; an `error` object in the
/// `camera.setOptions` response is logged but does not fail the call.
pub async fn begin(ctx: &CallContext, camera: Option<&mut HttpCamera>) -> Result<(), Error> {
    let camera = camera.ok_or(Error::NilClient)?;

    match negotiate(ctx, camera).await {
        Ok(()) => {
            camera.state.transition(ProtocolState::OptionsNegotiated);
            Ok(())
        }
        Err(err) => {
            camera.state.transition(ProtocolState::Failed);
            Err(err)
        }
    }
}

async fn negotiate(ctx: &CallContext, camera: &mut HttpCamera) -> Result<(), Error> {
    let session = camera.start_session(ctx).await?;
    if let Some(session_id) = session.session_id() {
        info!(session_id, "session started");
    }

    let response = camera
        .set_options(ctx, Options::client_version(ApiLevel::V2.as_u8()))
        .await?;

    info!(state = ?response.state, api_level = camera.state().api_level().as_u8(), "options set");
    if let Some(error) = &response.error {
        warn!(code = %error.code, message = %error.message, "camera rejected clientVersion");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state() {
        let state = ClientState::default();
        assert_eq!(state.api_level(), ApiLevel::V1);
        assert_eq!(state.session_id(), None);
        assert_eq!(state.protocol_state(), ProtocolState::Uninitialized);
    }

    #[test]
    fn session_id_is_hidden_under_level_two() {
        let mut state = ClientState::default();
        state.record_session("SID001".into());
        assert_eq!(state.session_id(), Some("SID001"));

        state.elevate(ApiLevel::V2);
        assert_eq!(state.session_id(), None);

        state.record_session("SID002".into());
        assert_eq!(state.session_id(), None);
    }

    #[test]
    fn api_level_numbers() {
        assert_eq!(ApiLevel::try_from(2), Ok(ApiLevel::V2));
        assert_eq!(ApiLevel::try_from(3), Err(3));
        assert_eq!(ApiLevel::V1.as_u8(), 1);
    }

    #[tokio::test]
    async fn begin_without_camera() {
        let err = begin(&CallContext::background(), None).await.unwrap_err();
        assert!(matches!(err, Error::NilClient));
    }
}
