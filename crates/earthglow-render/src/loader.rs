//! Background image decoding.
//!
//! The main thread queues image paths with [`TextureLoader::request`]; worker
//! threads decode them with `image` and hand RGBA8 pixels back over a
//! channel. [`TextureLoader::drain_results`] is polled once per frame and the
//! GPU upload happens on the main thread. Frames keep rendering while images
//! are in flight. Images larger than the device's 2D texture limit are
//! scaled down on the worker so they still fit.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use image::imageops::FilterType;

use crate::texture::TextureError;

/// Decoded RGBA8 pixels, rows top to bottom.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

struct LoadRequest {
    name: String,
    path: PathBuf,
}

/// Outcome of one request. `name` is the caller's key, usually the asset
/// file name.
pub struct TextureLoadResult {
    pub name: String,
    pub path: PathBuf,
    pub image: Result<DecodedImage, TextureError>,
}

pub struct TextureLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_sender: crossbeam_channel::Sender<TextureLoadResult>,
    result_receiver: crossbeam_channel::Receiver<TextureLoadResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    max_dimension: u32,
}

impl TextureLoader {
    /// Spawn `worker_count` decoding threads (at least one). Decoded images
    /// are downscaled so neither side exceeds `max_dimension`.
    pub fn new(worker_count: usize, max_dimension: u32) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for index in 0..worker_count.max(1) {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("texture-decode-{index}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let image = decode_image(&request.path, max_dimension);
                        let _ = tx.send(TextureLoadResult {
                            name: request.name,
                            path: request.path,
                            image,
                        });
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::warn!("Failed to spawn texture decode worker: {e}"),
            }
        }

        Self {
            request_sender: Some(request_tx),
            result_sender: result_tx,
            result_receiver: result_rx,
            worker_handles: handles,
            in_flight,
            max_dimension,
        }
    }

    /// Queue `path` for decoding under `name`.
    ///
    /// Without any worker (spawn failure, or after shutdown) the image is
    /// decoded right here so the result still arrives through the channel.
    pub fn request(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let request = LoadRequest {
            name: name.into(),
            path: path.into(),
        };
        log::debug!("Queued texture '{}' from {}", request.name, request.path.display());
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let request = match &self.request_sender {
            Some(sender) if !self.worker_handles.is_empty() => match sender.send(request) {
                Ok(()) => return,
                Err(crossbeam_channel::SendError(request)) => request,
            },
            _ => request,
        };
        let image = decode_image(&request.path, self.max_dimension);
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.result_sender.send(TextureLoadResult {
            name: request.name,
            path: request.path,
            image,
        });
    }

    /// Collect every finished decode without blocking.
    pub fn drain_results(&self) -> Vec<TextureLoadResult> {
        let results: Vec<TextureLoadResult> = self.result_receiver.try_iter().collect();
        self.in_flight.fetch_sub(results.len(), Ordering::Relaxed);
        results
    }

    /// Block up to `timeout` for the next finished decode.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<TextureLoadResult> {
        let result = self.result_receiver.recv_timeout(timeout).ok()?;
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        Some(result)
    }

    /// Requests not yet collected by the main thread.
    pub fn pending(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Stop accepting work and join the workers.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn decode_image(path: &Path, max_dimension: u32) -> Result<DecodedImage, TextureError> {
    let mut image = image::open(path)?;
    if image.width() > max_dimension || image.height() > max_dimension {
        log::warn!(
            "{} is {}x{}, downscaling to fit {max_dimension}",
            path.display(),
            image.width(),
            image.height()
        );
        image = image.resize(max_dimension, max_dimension, FilterType::Triangle);
    }
    let image = image.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}
