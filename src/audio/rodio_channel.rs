//! rodio-backed audio channel.
//!
//! rodio's `OutputStream` is not `Send`, so a dedicated thread owns the
//! stream and the sink; the handle only forwards commands to it.

use super::{AudioChannel, AudioError, ChannelEvent, LoadEpoch, PlayRejection, PlayRequestId};
use crate::cache::audio_cache_path;
use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RodioChannelOptions {
    pub cache_dir: PathBuf,
    pub progress_interval: Duration,
    pub http_timeout: Duration,
}

enum WorkerCommand {
    SetSource(String),
    Play { request: PlayRequestId, epoch: u64 },
    Pause,
    SetRate(f32),
    Seek(f64),
    Stop,
    Shutdown,
}

pub struct RodioChannel {
    commands: mpsc::Sender<WorkerCommand>,
    source: Option<String>,
    epoch: LoadEpoch,
    worker: Option<JoinHandle<()>>,
}

impl RodioChannel {
    /// Start the audio thread. `emit` runs on that thread for every event.
    pub fn spawn<F>(options: RodioChannelOptions, emit: F) -> Result<Self>
    where
        F: Fn(ChannelEvent) + Send + 'static,
    {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.http_timeout)
            .build()
            .context("Building audio HTTP client")?;
        let epoch = LoadEpoch::new();
        let worker_epoch = epoch.clone();
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), AudioError>>(1);

        let worker = thread::Builder::new()
            .name("audio-channel".to_string())
            .spawn(move || {
                let (stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(err) => {
                        let _ = ready_tx.send(Err(AudioError::Output(err.to_string())));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                let mut worker = AudioWorker {
                    _stream: stream,
                    handle,
                    sink: None,
                    source_url: None,
                    http,
                    cache_dir: options.cache_dir,
                    progress_interval: options.progress_interval,
                    epoch: worker_epoch,
                    emit,
                    load_error: None,
                    rate: 1.0,
                    clock: PlaybackClock::default(),
                    duration: None,
                    ended_reported: false,
                    last_progress_at: None,
                };
                worker.run(rx);
            })
            .context("Spawning audio thread")?;

        ready_rx
            .recv()
            .context("Audio thread exited during startup")??;
        info!("Audio channel ready");

        Ok(Self {
            commands: tx,
            source: None,
            epoch,
            worker: Some(worker),
        })
    }

    fn send(&self, command: WorkerCommand) {
        if self.commands.send(command).is_err() {
            warn!("Audio thread is gone; dropping command");
        }
    }
}

impl AudioChannel for RodioChannel {
    fn set_source(&mut self, url: &str) {
        self.epoch.advance();
        self.source = Some(url.to_string());
        self.send(WorkerCommand::SetSource(url.to_string()));
    }

    fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self, request: PlayRequestId) {
        let epoch = self.epoch.snapshot();
        self.send(WorkerCommand::Play { request, epoch });
    }

    fn pause(&mut self) {
        self.epoch.advance();
        self.send(WorkerCommand::Pause);
    }

    fn set_rate(&mut self, multiplier: f32) {
        self.send(WorkerCommand::SetRate(multiplier));
    }

    fn seek(&mut self, seconds: f64) {
        self.send(WorkerCommand::Seek(seconds));
    }

    fn stop(&mut self) {
        self.epoch.advance();
        self.send(WorkerCommand::Stop);
    }
}

impl Drop for RodioChannel {
    fn drop(&mut self) {
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
    }
}

struct AudioWorker<F> {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    source_url: Option<String>,
    http: reqwest::blocking::Client,
    cache_dir: PathBuf,
    progress_interval: Duration,
    epoch: LoadEpoch,
    emit: F,
    load_error: Option<String>,
    rate: f32,
    clock: PlaybackClock,
    duration: Option<Duration>,
    ended_reported: bool,
    last_progress_at: Option<Instant>,
}

impl<F> AudioWorker<F>
where
    F: Fn(ChannelEvent),
{
    fn run(&mut self, rx: mpsc::Receiver<WorkerCommand>) {
        loop {
            match rx.recv_timeout(self.progress_interval) {
                Ok(WorkerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => {}
            }
            self.tick(Instant::now());
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        debug!("Audio thread stopped");
    }

    fn handle(&mut self, command: WorkerCommand) {
        let now = Instant::now();
        match command {
            WorkerCommand::SetSource(url) => self.load_source(url),
            WorkerCommand::Play { request, epoch } => self.play(request, epoch, now),
            WorkerCommand::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
                self.clock.pause(now);
            }
            WorkerCommand::SetRate(rate) => {
                self.rate = rate;
                if let Some(sink) = &self.sink {
                    sink.set_speed(rate);
                }
                self.clock.set_rate(rate, now);
            }
            WorkerCommand::Seek(seconds) => self.seek(seconds, now),
            WorkerCommand::Stop => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                    if let Err(err) = sink.try_seek(Duration::ZERO) {
                        debug!("Rewind on stop failed: {err}");
                    }
                }
                self.clock.pause(now);
                self.clock.reset_to(Duration::ZERO, now);
            }
            WorkerCommand::Shutdown => {}
        }
    }

    fn load_source(&mut self, url: String) {
        self.sink = None;
        self.duration = None;
        self.load_error = None;
        self.ended_reported = false;
        self.clock = PlaybackClock::with_rate(self.rate);
        match self.open_sink(&url) {
            Ok((sink, duration)) => {
                debug!(%url, ?duration, "Loaded verse audio");
                self.sink = Some(sink);
                self.duration = duration;
                if let Some(duration) = duration {
                    (self.emit)(ChannelEvent::MetadataReady {
                        duration: duration.as_secs_f64(),
                    });
                }
            }
            Err(err) => {
                warn!(%url, "Failed to load verse audio: {err}");
                self.load_error = Some(err.to_string());
            }
        }
        self.source_url = Some(url);
    }

    fn open_sink(&self, url: &str) -> Result<(Sink, Option<Duration>), AudioError> {
        let bytes = self.fetch_cached(url)?;
        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|err| AudioError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let duration = decoder.total_duration();
        let sink =
            Sink::try_new(&self.handle).map_err(|err| AudioError::Output(err.to_string()))?;
        sink.pause();
        sink.set_speed(self.rate);
        sink.append(decoder);
        Ok((sink, duration))
    }

    fn fetch_cached(&self, url: &str) -> Result<Vec<u8>, AudioError> {
        let path = audio_cache_path(&self.cache_dir, url);
        if let Ok(bytes) = fs::read(&path) {
            debug!(path = %path.display(), "Audio cache hit");
            return Ok(bytes);
        }

        let fetch_error = |reason: String| AudioError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|err| fetch_error(err.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("status {}", response.status())));
        }
        let bytes = response
            .bytes()
            .map_err(|err| fetch_error(err.to_string()))?
            .to_vec();

        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("Failed to create audio cache dir: {err}");
            }
        }
        if let Err(err) = fs::write(&path, &bytes) {
            warn!(path = %path.display(), "Failed to cache verse audio: {err}");
        }
        Ok(bytes)
    }

    fn play(&mut self, request: PlayRequestId, epoch: u64, now: Instant) {
        if !self.epoch.is_current(epoch) {
            debug!(request, "Play request superseded before output started");
            (self.emit)(ChannelEvent::PlayResolved {
                request,
                outcome: Err(PlayRejection::Superseded),
            });
            return;
        }

        // Playing again after the source ran out restarts it from the top.
        let finished = self.sink.as_ref().map(Sink::empty).unwrap_or(false);
        if finished {
            if let Some(url) = self.source_url.clone() {
                self.load_source(url);
            }
        }

        let outcome = match &self.sink {
            Some(sink) => {
                sink.play();
                self.clock.start(now);
                self.ended_reported = false;
                Ok(())
            }
            None => Err(PlayRejection::Failed(
                self.load_error
                    .clone()
                    .unwrap_or_else(|| "no source loaded".to_string()),
            )),
        };
        (self.emit)(ChannelEvent::PlayResolved { request, outcome });
    }

    fn seek(&mut self, seconds: f64, now: Instant) {
        let target = Duration::from_secs_f64(seconds.max(0.0));
        let target = match self.duration {
            Some(duration) => target.min(duration),
            None => target,
        };
        if let Some(sink) = &self.sink {
            match sink.try_seek(target) {
                Ok(()) => self.clock.reset_to(target, now),
                Err(err) => warn!(seconds, "Seek failed: {err}"),
            }
        }
        self.emit_progress(now);
    }

    fn tick(&mut self, now: Instant) {
        if !self.clock.is_running() {
            return;
        }
        let drained = self.sink.as_ref().map(Sink::empty).unwrap_or(true);
        if drained {
            if !self.ended_reported {
                self.ended_reported = true;
                self.clock.pause(now);
                (self.emit)(ChannelEvent::Ended);
            }
            return;
        }
        let due = self
            .last_progress_at
            .map(|at| now.saturating_duration_since(at) >= self.progress_interval)
            .unwrap_or(true);
        if due {
            self.emit_progress(now);
        }
    }

    fn emit_progress(&mut self, now: Instant) {
        self.last_progress_at = Some(now);
        let mut position = self.clock.position(now);
        if let Some(duration) = self.duration {
            position = position.min(duration);
        }
        (self.emit)(ChannelEvent::Progress {
            position: position.as_secs_f64(),
        });
    }
}

/// Media position derived from wall-clock time scaled by playback rate.
#[derive(Debug, Clone, Copy)]
struct PlaybackClock {
    base: Duration,
    started_at: Option<Instant>,
    rate: f32,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::with_rate(1.0)
    }
}

impl PlaybackClock {
    fn with_rate(rate: f32) -> Self {
        Self {
            base: Duration::ZERO,
            started_at: None,
            rate,
        }
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn position(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => {
                self.base + now.saturating_duration_since(started).mul_f32(self.rate.max(0.0))
            }
            None => self.base,
        }
    }

    fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    fn pause(&mut self, now: Instant) {
        self.base = self.position(now);
        self.started_at = None;
    }

    fn set_rate(&mut self, rate: f32, now: Instant) {
        let running = self.is_running();
        self.pause(now);
        self.rate = rate;
        if running {
            self.start(now);
        }
    }

    fn reset_to(&mut self, position: Duration, now: Instant) {
        self.base = position;
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PlaybackClock;
    use std::time::{Duration, Instant};

    #[test]
    fn clock_scales_elapsed_time_by_rate() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::with_rate(2.0);
        clock.start(t0);
        assert_eq!(clock.position(t0 + Duration::from_secs(3)), Duration::from_secs(6));
    }

    #[test]
    fn rate_change_keeps_accumulated_position() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::with_rate(1.0);
        clock.start(t0);
        clock.set_rate(1.5, t0 + Duration::from_secs(4));
        let position = clock.position(t0 + Duration::from_secs(6));
        assert_eq!(position, Duration::from_secs(7));
    }

    #[test]
    fn paused_clock_holds_position() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();
        clock.start(t0);
        clock.pause(t0 + Duration::from_secs(2));
        assert!(!clock.is_running());
        assert_eq!(clock.position(t0 + Duration::from_secs(10)), Duration::from_secs(2));
    }

    #[test]
    fn seek_rebases_running_clock() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();
        clock.start(t0);
        clock.reset_to(Duration::from_secs(30), t0 + Duration::from_secs(5));
        assert_eq!(
            clock.position(t0 + Duration::from_secs(6)),
            Duration::from_secs(31)
        );
    }
}
