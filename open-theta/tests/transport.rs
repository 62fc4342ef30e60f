use std::time::Duration;

use mockito::ServerGuard;
use open_theta::{
    CallContext, CameraControl, ContextError, Error, HttpCamera, Info, ProtocolError, Sink,
};
use reqwest::Method;
use url::Url;

fn camera_for(server: &ServerGuard) -> HttpCamera {
    HttpCamera::new_custom_address(Url::parse(&server.url()).unwrap())
}

fn unreachable_camera() -> HttpCamera {
    // Nothing listens on the TCP port multiplexer.
    HttpCamera::new_custom_address(Url::parse("http://127.0.0.1:1").unwrap())
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    let err = unreachable_camera()
        .info(&CallContext::background())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn cancelled_context_wins_over_transport_failure() {
    let ctx = CallContext::background();
    ctx.cancel();

    let err = unreachable_camera().info(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(ContextError::Canceled)), "got {err:?}");
}

#[tokio::test]
async fn cancelled_context_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/osc/info").expect(0).create_async().await;

    let ctx = CallContext::background();
    ctx.cancel();
    let err = camera_for(&server).info(&ctx).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, Error::Cancelled(ContextError::Canceled)));
}

#[tokio::test]
async fn expired_deadline_is_reported() {
    let ctx = CallContext::background().with_timeout(Duration::ZERO);

    let err = unreachable_camera().info(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(ContextError::DeadlineExceeded)), "got {err:?}");
}

#[tokio::test]
async fn info_is_decoded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/osc/info")
        .match_header("accept", "application/json")
        .match_header("content-type", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"manufacturer":"RICOH","model":"RICOH THETA V","endpoints":{"httpPort":80,"apiLevel":[1,2]}}"#)
        .create_async()
        .await;

    let info = camera_for(&server).info(&CallContext::background()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(info.manufacturer.as_deref(), Some("RICOH"));
    assert_eq!(info.api_levels(), &[1, 2]);
}

#[tokio::test]
async fn device_state_is_decoded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/osc/state")
        .with_status(200)
        .with_body(r#"{"fingerprint":"FIG_0001","state":{"batteryLevel":0.67,"_captureStatus":"idle"}}"#)
        .create_async()
        .await;

    let state = camera_for(&server)
        .device_state(&CallContext::background())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(state.fingerprint.as_deref(), Some("FIG_0001"));
    assert_eq!(state.state.unwrap()["_captureStatus"], "idle");
}

#[tokio::test]
async fn empty_body_leaves_target_untouched() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/osc/info")
        .with_status(200)
        .create_async()
        .await;

    let camera = camera_for(&server);
    let mut info = Info {
        model: Some("unchanged".into()),
        ..Default::default()
    };

    let request = camera.new_request::<()>(Method::GET, "osc/info", None).unwrap();
    let meta = camera
        .dispatch(&CallContext::background(), request, Sink::decode(&mut info))
        .await
        .unwrap();

    assert_eq!(meta.status.as_u16(), 200);
    assert_eq!(info.model.as_deref(), Some("unchanged"));
}

#[tokio::test]
async fn garbage_body_is_a_decode_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/osc/info")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = camera_for(&server)
        .info(&CallContext::background())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn raw_copy_keeps_bytes_verbatim() {
    let body: &[u8] = b"\xff\xd8\xff\xe0 not really a jpeg";
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/files/100RICOH/R0010015.JPG")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let camera = camera_for(&server);
    let request = camera
        .new_request::<()>(Method::GET, "files/100RICOH/R0010015.JPG", None)
        .unwrap();

    let mut copied = Vec::new();
    camera
        .dispatch(&CallContext::background(), request, Sink::RawCopy(&mut copied))
        .await
        .unwrap();

    assert_eq!(copied, body);
}

#[tokio::test]
async fn classifier_error_keeps_response_metadata() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/osc/info")
        .with_status(200)
        .with_header("x-camera-fault", "overheated")
        .with_body("{}")
        .create_async()
        .await;

    let camera = camera_for(&server).with_classifier(|response: &reqwest::Response| {
        let fault = response.headers().get("x-camera-fault")?;
        Some(ProtocolError {
            code: "cameraFault".into(),
            message: fault.to_str().unwrap_or_default().into(),
        })
    });

    let err = camera.info(&CallContext::background()).await.unwrap_err();
    match err {
        Error::Protocol { response, error } => {
            assert_eq!(response.headers["x-camera-fault"], "overheated");
            assert_eq!(error.message, "overheated");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn default_classifier_accepts_error_statuses() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/osc/commands/execute")
        .with_status(400)
        .with_body(r#"{"name":"camera.foo","state":"error","error":{"code":"unknownCommand","message":"camera.foo"}}"#)
        .create_async()
        .await;

    let response = camera_for(&server)
        .execute(
            &CallContext::background(),
            &open_theta::CommandRequest::new("camera.foo"),
        )
        .await
        .unwrap();

    assert_eq!(response.error.unwrap().code, "unknownCommand");
}
