//! Desktop gesture practice app.
//!
//! # Usage
//!
//! ```bash
//! # Built-in starter gestures, real camera
//! app
//!
//! # Custom catalog, open straight into one gesture, no camera hardware
//! app --catalog gestures.json --gesture thank-you --simulated-camera
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use gesture_core::model::{
    DEFAULT_READY_TIMEOUT_MS, DEFAULT_TICK_INTERVAL_MS, GestureId, PracticeSettings,
    PracticeSettingsDraft,
};
use services::{CompletionRecorder, PracticeService, completion_channel};
use storage::{Storage, parse_catalog_json};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

/// Practice sign-language gestures with your camera
#[derive(Parser, Debug)]
#[command(name = "gesture-practice")]
#[command(version)]
struct Args {
    /// JSON file with the gesture catalog (defaults to the built-in starter set)
    #[arg(long, env = "GESTURE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Open this gesture's practice page on launch
    #[arg(long)]
    gesture: Option<GestureId>,

    /// Use an in-process camera instead of the webview's
    #[arg(long)]
    simulated_camera: bool,

    /// Milliseconds between detection ticks
    #[arg(long, env = "GESTURE_TICK_MS", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Milliseconds to wait for the camera's ready signal
    #[arg(
        long,
        env = "GESTURE_READY_TIMEOUT_MS",
        default_value_t = DEFAULT_READY_TIMEOUT_MS
    )]
    ready_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn settings(&self) -> Result<PracticeSettings, Box<dyn std::error::Error>> {
        let draft = PracticeSettingsDraft {
            tick_interval_ms: self.tick_ms,
            ready_timeout_ms: self.ready_timeout_ms,
            ..PracticeSettingsDraft::default()
        };
        Ok(draft.validate()?)
    }
}

struct DesktopApp {
    practice: Arc<PracticeService>,
    initial_gesture: Option<GestureId>,
    simulated_camera: bool,
}

impl UiApp for DesktopApp {
    fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    fn initial_gesture(&self) -> Option<GestureId> {
        self.initial_gesture.clone()
    }

    fn simulated_camera(&self) -> bool {
        self.simulated_camera
    }
}

fn load_storage(catalog: Option<&Path>) -> Result<Storage, Box<dyn std::error::Error>> {
    let Some(path) = catalog else {
        return Ok(Storage::in_memory());
    };
    let raw = std::fs::read_to_string(path)?;
    let gestures = parse_catalog_json(&raw)?;
    tracing::info!(path = %path.display(), gestures = gestures.len(), "catalog loaded");
    Ok(Storage::from_catalog(gestures))
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.settings()?;
    let storage = load_storage(args.catalog.as_deref())?;

    let (completions, events) = completion_channel();
    tokio::spawn(CompletionRecorder::new(Arc::clone(&storage.completions)).run(events));

    let practice = PracticeService::new(Arc::clone(&storage.gestures), settings)
        .with_completions(completions);
    if let Some(id) = &args.gesture {
        // Fail at startup rather than on a blank page.
        practice.gesture(id).await?;
    }

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        practice: Arc::new(practice),
        initial_gesture: args.gesture,
        simulated_camera: args.simulated_camera,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Gesture Practice")
            .with_always_on_top(false),
    );

    tracing::info!(simulated_camera = args.simulated_camera, "launching desktop window");
    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    if let Err(err) = run(args).await {
        // At this layer (binary glue), printing once is fine.
        tracing::error!("{err}");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
