//! Camera capture inside the desktop webview, driven through `document::eval`.

mod scripts;

use async_trait::async_trait;
use dioxus::document::eval;
use gesture_core::{CaptureConstraints, CaptureError, HostEnvironment, StreamInfo};
use serde::Deserialize;
use services::{CaptureHost, CaptureStream, RenderSurface};
use tracing::{debug, warn};

pub use scripts::{OVERLAY_ID, VIDEO_ID};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenReply {
    ok: bool,
    tracks: usize,
    width: u32,
    height: u32,
    name: String,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReadyReply {
    ok: bool,
    message: String,
}

/// `getUserMedia` in the page hosting the practice view.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebviewCaptureHost;

#[async_trait(?Send)]
impl CaptureHost for WebviewCaptureHost {
    async fn environment(&self) -> HostEnvironment {
        match eval(scripts::environment_script()).join::<HostEnvironment>().await {
            Ok(environment) => environment,
            Err(err) => {
                warn!(error = ?err, "camera environment probe failed");
                HostEnvironment {
                    capture_supported: false,
                    secure_context: false,
                    hostname: String::new(),
                }
            }
        }
    }

    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let reply = eval(&scripts::open_script(constraints))
            .join::<OpenReply>()
            .await
            .map_err(|err| CaptureError::Unknown(format!("{err:?}")))?;
        if !reply.ok {
            return Err(CaptureError::from_dom_error(&reply.name, &reply.message));
        }
        debug!(tracks = reply.tracks, "webview stream opened");
        Ok(Box::new(WebviewStream {
            info: StreamInfo {
                width: reply.width,
                height: reply.height,
                track_count: reply.tracks,
            },
            live: true,
        }))
    }
}

struct WebviewStream {
    info: StreamInfo,
    live: bool,
}

impl CaptureStream for WebviewStream {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            let _ = eval(scripts::stop_tracks_script());
        }
    }
}

/// The `<video>` element (and its overlay canvas) on the practice page.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebviewSurface;

#[async_trait(?Send)]
impl RenderSurface for WebviewSurface {
    fn bind(&mut self, stream: &dyn CaptureStream) {
        let info = stream.info();
        let _ = eval(&scripts::bind_script(info.width, info.height));
    }

    async fn wait_ready(&mut self) -> Result<(), CaptureError> {
        let reply = eval(&scripts::wait_ready_script())
            .join::<ReadyReply>()
            .await
            .map_err(|err| CaptureError::Unknown(format!("{err:?}")))?;
        if reply.ok {
            Ok(())
        } else {
            Err(CaptureError::Unknown(reply.message))
        }
    }

    fn unbind(&mut self) {
        let _ = eval(&scripts::unbind_script());
    }
}
