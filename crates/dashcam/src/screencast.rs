//! Page recording via the CDP screencast.
//!
//! Chromium pushes JPEG frames only when the page repaints. The recorder keeps
//! the latest frame and writes it to a temporary directory at a fixed rate,
//! so the frame count tracks wall-clock time. On finish the frames are
//! encoded to WEBM (VP9) by `ffmpeg`, which must be on `PATH`.

use std::path::Path;

use crate::config::VideoSettings;
use crate::result::{DashcamError, DashcamResult};

/// `printf`-style pattern of frame files, as ffmpeg reads them
pub const FRAME_PATTERN: &str = "frame_%06d.jpg";

/// JPEG quality requested from the screencast
pub const SCREENCAST_QUALITY: i64 = 80;

/// File name of the frame at `index`
#[must_use]
pub fn frame_file_name(index: u64) -> String {
    format!("frame_{index:06}.jpg")
}

/// Build the ffmpeg arguments encoding a frame directory to WEBM.
#[must_use]
pub fn build_ffmpeg_args(
    frames_dir: &Path,
    settings: &VideoSettings,
    output: &Path,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-framerate".to_string(),
        settings.fps.to_string(),
        "-i".to_string(),
        frames_dir.join(FRAME_PATTERN).to_string_lossy().to_string(),
        "-vf".to_string(),
        format!(
            "scale={}:{}:force_original_aspect_ratio=decrease,pad={}:{}:(ow-iw)/2:(oh-ih)/2",
            settings.size.width, settings.size.height, settings.size.width, settings.size.height
        ),
        "-c:v".to_string(),
        "libvpx-vp9".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-b:v".to_string(),
        "0".to_string(),
        "-crf".to_string(),
        "32".to_string(),
        "-deadline".to_string(),
        "realtime".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Encode the frames in `frames_dir` to `output`.
///
/// # Errors
///
/// Returns `DashcamError::VideoRecording` if ffmpeg is missing or fails.
pub async fn encode_webm(
    frames_dir: &Path,
    settings: &VideoSettings,
    output: &Path,
) -> DashcamResult<()> {
    let args = build_ffmpeg_args(frames_dir, settings, output);
    let result = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await
        .map_err(|e| DashcamError::video(format!("Failed to execute ffmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(DashcamError::video(format!(
            "ffmpeg exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(feature = "browser")]
pub use recorder::ScreencastRecorder;

#[cfg(feature = "browser")]
mod recorder {
    use super::{encode_webm, frame_file_name, SCREENCAST_QUALITY};
    use crate::config::VideoSettings;
    use crate::result::{DashcamError, DashcamResult};
    use base64::Engine;
    use chromiumoxide::cdp::browser_protocol::page::{
        EventScreencastFrame, ScreencastFrameAckParams, StartScreencastFormat,
        StartScreencastParams, StopScreencastParams,
    };
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;
    use tracing::{debug, info};

    /// Records one page from launch until [`ScreencastRecorder::finish`]
    pub struct ScreencastRecorder {
        page: Page,
        settings: VideoSettings,
        frames: tempfile::TempDir,
        stop: Option<oneshot::Sender<()>>,
        collector: JoinHandle<()>,
        ticker: JoinHandle<DashcamResult<u64>>,
    }

    impl std::fmt::Debug for ScreencastRecorder {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ScreencastRecorder")
                .field("settings", &self.settings)
                .field("frames", &self.frames.path())
                .finish_non_exhaustive()
        }
    }

    impl ScreencastRecorder {
        /// Start the screencast and the frame-rate ticker
        pub async fn start(page: Page, settings: VideoSettings) -> DashcamResult<Self> {
            std::fs::create_dir_all(&settings.dir)?;
            let frames = tempfile::Builder::new()
                .prefix("dashcam-frames-")
                .tempdir()?;

            let mut events = page
                .event_listener::<EventScreencastFrame>()
                .await
                .map_err(|e| DashcamError::video(e.to_string()))?;

            let params = StartScreencastParams::builder()
                .format(StartScreencastFormat::Jpeg)
                .quality(SCREENCAST_QUALITY)
                .max_width(i64::from(settings.size.width))
                .max_height(i64::from(settings.size.height))
                .every_nth_frame(1)
                .build();
            page.execute(params)
                .await
                .map_err(|e| DashcamError::video(e.to_string()))?;

            let latest: Arc<Mutex<Option<Vec<u8>>>> = Arc::new(Mutex::new(None));

            let collector = {
                let page = page.clone();
                let latest = Arc::clone(&latest);
                tokio::spawn(async move {
                    while let Some(frame) = events.next().await {
                        match base64::engine::general_purpose::STANDARD.decode(&frame.data) {
                            Ok(bytes) => {
                                if let Ok(mut slot) = latest.lock() {
                                    *slot = Some(bytes);
                                }
                            }
                            Err(e) => debug!(error = %e, "undecodable screencast frame"),
                        }
                        let ack = ScreencastFrameAckParams::new(frame.session_id);
                        if let Err(e) = page.execute(ack).await {
                            debug!(error = %e, "screencast ack failed");
                            break;
                        }
                    }
                })
            };

            let (stop_tx, mut stop_rx) = oneshot::channel();
            let dir = frames.path().to_path_buf();
            let period = Duration::from_secs_f64(1.0 / f64::from(settings.fps.max(1)));
            let ticker = tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                let mut written = 0u64;
                loop {
                    tokio::select! {
                        _ = &mut stop_rx => break,
                        _ = interval.tick() => {
                            let frame = latest.lock().ok().and_then(|slot| slot.clone());
                            if let Some(bytes) = frame {
                                tokio::fs::write(dir.join(frame_file_name(written)), bytes).await?;
                                written += 1;
                            }
                        }
                    }
                }
                Ok::<_, DashcamError>(written)
            });

            debug!(fps = settings.fps, dir = %frames.path().display(), "screencast started");
            Ok(Self {
                page,
                settings,
                frames,
                stop: Some(stop_tx),
                collector,
                ticker,
            })
        }

        /// Stop recording and encode; returns the path of the new video
        pub async fn finish(mut self) -> DashcamResult<PathBuf> {
            if let Err(e) = self.page.execute(StopScreencastParams::default()).await {
                debug!(error = %e, "stop screencast failed");
            }
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            self.collector.abort();
            let written = (&mut self.ticker)
                .await
                .map_err(|e| DashcamError::video(e.to_string()))??;
            if written == 0 {
                return Err(DashcamError::video("no frames captured"));
            }

            let output = self
                .settings
                .dir
                .join(format!("{}.webm", uuid::Uuid::new_v4().simple()));
            encode_webm(self.frames.path(), &self.settings, &output).await?;
            info!(frames = written, path = %output.display(), "recording encoded");
            Ok(output)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Viewport;
    use std::path::PathBuf;

    #[test]
    fn test_frame_file_name_matches_pattern() {
        assert_eq!(frame_file_name(0), "frame_000000.jpg");
        assert_eq!(frame_file_name(1234), "frame_001234.jpg");
    }

    #[test]
    fn test_build_ffmpeg_args() {
        let settings = VideoSettings::new("videos", Viewport::HD).with_fps(25);
        let args = build_ffmpeg_args(
            Path::new("/tmp/frames"),
            &settings,
            Path::new("/out/a.webm"),
        );
        assert_eq!(args[0], "-y");
        assert_eq!(args[3], "-framerate");
        assert_eq!(args[4], "25");
        assert_eq!(args[5], "-i");
        assert_eq!(args[6], "/tmp/frames/frame_%06d.jpg");
        assert!(args[8].starts_with("scale=1280:720"));
        assert!(args.contains(&"libvpx-vp9".to_string()));
        assert_eq!(args.last().unwrap(), "/out/a.webm");
    }

    #[test]
    fn test_build_ffmpeg_args_custom_size() {
        let settings = VideoSettings::new("videos", Viewport::new(640, 360)).with_fps(10);
        let args = build_ffmpeg_args(Path::new("f"), &settings, &PathBuf::from("o.webm"));
        assert_eq!(args[4], "10");
        assert!(args[8].contains("pad=640:360"));
    }

    #[tokio::test]
    async fn test_encode_missing_frames_fails() {
        let settings = VideoSettings::new("videos", Viewport::HD);
        let out = tempfile::tempdir().unwrap();
        let result = encode_webm(
            Path::new("/nonexistent/frames"),
            &settings,
            &out.path().join("x.webm"),
        )
        .await;
        assert!(matches!(result, Err(DashcamError::VideoRecording { .. })));
    }
}
