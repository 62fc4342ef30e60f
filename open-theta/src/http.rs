use std::future::Future;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::command::{StatusRequest, SET_OPTIONS, START_SESSION};
use crate::{
    AcceptAll, ApiLevel, CallContext, CameraControl, ClientState, CommandRequest, CommandResponse,
    CommandState, DeviceState, Error, Info, Options, Parameters, ProtocolState, ResponseClassifier,
};

const INFO_PATH: &str = "osc/info";
const STATE_PATH: &str = "osc/state";
const COMMANDS_EXECUTE_PATH: &str = "osc/commands/execute";
const COMMANDS_STATUS_PATH: &str = "osc/commands/status";

const JSON_UTF8: &str = "application/json;charset=utf-8";

/// Where [`HttpCamera::dispatch`] puts a response body.
pub enum Sink<'a> {
    /// Drop the body unread.
    Discard,
    /// Decode the body as JSON. Build with [`Sink::decode`].
    Decode(Box<dyn FnOnce(&[u8]) -> serde_json::Result<()> + Send + 'a>),
    /// Copy the body verbatim.
    RawCopy(&'a mut (dyn AsyncWrite + Unpin + Send)),
}

impl<'a> Sink<'a> {
    /// Decodes into `target`. An empty body leaves `target` as it was.
    pub fn decode<T>(target: &'a mut T) -> Self
    where
        T: DeserializeOwned + Send,
    {
        Sink::Decode(Box::new(move |body| {
            *target = serde_json::from_slice(body)?;
            Ok(())
        }))
    }
}

/// Status line and headers of a response whose body has been consumed.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
}

impl ResponseMeta {
    fn of(response: &reqwest::Response) -> Self {
        ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        }
    }
}

pub struct HttpCamera {
    client: reqwest::Client,
    base: Url,
    classifier: Arc<dyn ResponseClassifier>,
    pub(crate) state: ClientState,
}

impl HttpCamera {
    pub fn new_wifi() -> Self {
        // THETA in access point mode always answers on this address.
        let base = Url::parse("http://192.168.1.1").expect("static URL is known to be good");
        Self::new_custom_address(base)
    }

    pub fn new_custom_address(base: Url) -> Self {
        HttpCamera {
            client: reqwest::Client::new(),
            base,
            classifier: Arc::new(AcceptAll),
            state: ClientState::default(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_classifier(mut self, classifier: impl ResponseClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Builds a request for `path`, resolved relative to the base endpoint.
    ///
    /// Paths are given without a leading slash. A supplied body is sent as
    /// compact JSON.
    pub fn new_request<T>(&self, method: Method, path: &str, body: Option<&T>) -> Result<Request, Error>
    where
        T: Serialize + ?Sized,
    {
        let url = self.base.join(path).map_err(|source| Error::MalformedTarget {
            target: path.to_owned(),
            source,
        })?;

        let mut request = Request::new(method, url);
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(Error::EncodingFailure)?;
            trace!(body = %String::from_utf8_lossy(&encoded), "request body");
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
            *request.body_mut() = Some(encoded.into());
        }
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(request)
    }

    /// Sends `request` and routes the body into `sink`.
    ///
    /// The context error is reported instead of a transport error whenever
    /// the context is done by the time the transport gives up.
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        request: Request,
        sink: Sink<'_>,
    ) -> Result<ResponseMeta, Error> {
        debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let mut response = bounded(ctx, self.client.execute(request)).await?;
        let meta = ResponseMeta::of(&response);
        debug!(status = %meta.status, url = %meta.url, "response received");

        if let Some(error) = self.classifier.classify(&response) {
            return Err(Error::Protocol {
                response: Box::new(meta),
                error,
            });
        }

        match sink {
            Sink::Discard => {}
            Sink::RawCopy(writer) => {
                while let Some(chunk) = bounded(ctx, response.chunk()).await? {
                    writer.write_all(&chunk).await?;
                }
                writer.flush().await?;
            }
            Sink::Decode(decode) => {
                let body = bounded(ctx, response.bytes()).await?;
                trace!(body = %String::from_utf8_lossy(&body), "response body");
                if !body.iter().all(u8::is_ascii_whitespace) {
                    decode(&body).map_err(Error::Decode)?;
                }
            }
        }

        Ok(meta)
    }

    async fn fetch<B, T>(&self, ctx: &CallContext, method: Method, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default + Send,
    {
        let (decoded, _) = self.fetch_with_meta(ctx, method, path, body).await?;
        Ok(decoded)
    }

    async fn fetch_with_meta<B, T>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(T, ResponseMeta), Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default + Send,
    {
        let request = self.new_request(method, path, body)?;
        let mut decoded = T::default();
        let meta = self.dispatch(ctx, request, Sink::decode(&mut decoded)).await?;
        Ok((decoded, meta))
    }

    async fn execute_with_meta(
        &self,
        ctx: &CallContext,
        command: &CommandRequest,
    ) -> Result<(CommandResponse, ResponseMeta), Error> {
        let (response, meta): (CommandResponse, _) = self
            .fetch_with_meta(ctx, Method::POST, COMMANDS_EXECUTE_PATH, Some(command))
            .await?;
        debug!(name = ?response.name, state = ?response.state, status = %meta.status, "command executed");
        Ok((response, meta))
    }
}

/// Runs a transport future under `ctx`.
async fn bounded<F, T>(ctx: &CallContext, fut: F) -> Result<T, Error>
where
    F: Future<Output = reqwest::Result<T>>,
{
    let outcome = tokio::select! {
        biased;
        err = ctx.done() => return Err(Error::Cancelled(err)),
        outcome = fut => outcome,
    };

    outcome.map_err(|source| match ctx.err() {
        Some(err) => Error::Cancelled(err),
        None => Error::Transport(source),
    })
}

#[async_trait::async_trait]
impl CameraControl for HttpCamera {
    async fn info(&self, ctx: &CallContext) -> Result<Info, Error> {
        self.fetch::<(), _>(ctx, Method::GET, INFO_PATH, None).await
    }

    async fn device_state(&self, ctx: &CallContext) -> Result<DeviceState, Error> {
        self.fetch::<(), _>(ctx, Method::GET, STATE_PATH, None).await
    }

    async fn execute(&self, ctx: &CallContext, command: &CommandRequest) -> Result<CommandResponse, Error> {
        let (response, _) = self.execute_with_meta(ctx, command).await?;
        Ok(response)
    }

    async fn command_status(&self, ctx: &CallContext, id: &str) -> Result<CommandResponse, Error> {
        self.fetch(ctx, Method::POST, COMMANDS_STATUS_PATH, Some(&StatusRequest { id }))
            .await
    }

    async fn start_session(&mut self, ctx: &CallContext) -> Result<CommandResponse, Error> {
        let response = self.execute(ctx, &CommandRequest::new(START_SESSION)).await?;

        if let Some(session_id) = response.session_id() {
            self.state.record_session(session_id.to_owned());
        }
        self.state.transition(ProtocolState::SessionStarted);

        Ok(response)
    }

    async fn set_options(&mut self, ctx: &CallContext, options: Options) -> Result<CommandResponse, Error> {
        let session_id = match self.state.api_level() {
            ApiLevel::V1 => Some(
                self.state
                    .session_id()
                    .ok_or(Error::MissingSession { command: SET_OPTIONS })?
                    .to_owned(),
            ),
            ApiLevel::V2 => None,
        };

        let requested = options.client_version.and_then(|v| ApiLevel::try_from(v).ok());
        let command = CommandRequest::new(SET_OPTIONS).with_parameters(Parameters {
            options: Some(options),
            session_id,
        });

        let (response, meta) = self.execute_with_meta(ctx, &command).await?;

        // Only a 2xx "done" answer without an error object confirms the switch.
        let confirmed = meta.status.is_success()
            && response.state == Some(CommandState::Done)
            && response.error.is_none();
        if let (Some(level), true) = (requested, confirmed) {
            self.state.elevate(level);
        }

        Ok(response)
    }
}
