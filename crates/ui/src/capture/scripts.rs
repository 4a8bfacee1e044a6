use gesture_core::CaptureConstraints;

pub const VIDEO_ID: &str = "practice-video";
pub const OVERLAY_ID: &str = "practice-overlay";

pub(super) fn environment_script() -> &'static str {
    r#"return {
        capture_supported: !!(navigator.mediaDevices && navigator.mediaDevices.getUserMedia),
        secure_context: window.isSecureContext === true || location.protocol === "https:",
        hostname: location.hostname || ""
    };"#
}

pub(super) fn open_script(constraints: &CaptureConstraints) -> String {
    let width = constraints.ideal_width;
    let height = constraints.ideal_height;
    let facing = constraints.facing.as_constraint();
    format!(
        r#"const state = window.__gesturePractice || (window.__gesturePractice = {{ stream: null }});
        try {{
            const stream = await navigator.mediaDevices.getUserMedia({{
                video: {{
                    width: {{ ideal: {width} }},
                    height: {{ ideal: {height} }},
                    facingMode: {facing:?}
                }},
                audio: false
            }});
            if (state.stream) {{
                state.stream.getTracks().forEach((track) => track.stop());
            }}
            state.stream = stream;
            const track = stream.getVideoTracks()[0];
            const settings = track && track.getSettings ? track.getSettings() : {{}};
            return {{
                ok: true,
                tracks: stream.getTracks().length,
                width: settings.width || {width},
                height: settings.height || {height}
            }};
        }} catch (error) {{
            return {{
                ok: false,
                name: (error && error.name) || "",
                message: (error && error.message) || String(error)
            }};
        }}"#
    )
}

pub(super) fn bind_script(width: u32, height: u32) -> String {
    format!(
        r#"const state = window.__gesturePractice || {{}};
        const video = document.getElementById({VIDEO_ID:?});
        const overlay = document.getElementById({OVERLAY_ID:?});
        if (video && state.stream) {{
            video.srcObject = state.stream;
            video.play().catch(() => {{}});
        }}
        if (overlay) {{
            overlay.width = {width};
            overlay.height = {height};
        }}"#
    )
}

pub(super) fn wait_ready_script() -> String {
    format!(
        r#"const video = document.getElementById({VIDEO_ID:?});
        if (!video) {{
            return {{ ok: false, message: "video element missing" }};
        }}
        if (video.readyState >= 1) {{
            return {{ ok: true }};
        }}
        return await new Promise((resolve) => {{
            video.addEventListener("loadedmetadata", () => resolve({{ ok: true }}), {{ once: true }});
            video.addEventListener("error", () => resolve({{
                ok: false,
                message: (video.error && video.error.message) || "video error"
            }}), {{ once: true }});
        }});"#
    )
}

pub(super) fn unbind_script() -> String {
    format!(
        r#"const video = document.getElementById({VIDEO_ID:?});
        if (video) {{
            video.pause();
            video.srcObject = null;
        }}"#
    )
}

pub(super) fn stop_tracks_script() -> &'static str {
    r#"const state = window.__gesturePractice;
    if (state && state.stream) {
        state.stream.getTracks().forEach((track) => track.stop());
        state.stream = null;
    }"#
}
