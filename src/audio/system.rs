//! Microphone capture through cpal.
//!
//! The platform audio thread only appends mono samples to a shared ring.
//! Spectra are computed on the caller's thread when a snapshot is asked
//! for, so the audio callback never does more than a short copy.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::analyzer::SpectrumAnalyzer;
use super::source::{AudioBackend, FrequencySnapshot, FrequencySource};
use crate::error::CaptureError;
use crate::params::AnalyzerConfig;

/// Fixed-capacity buffer holding the most recent mono samples
#[derive(Debug)]
pub struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once full
    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Copy contents (oldest first) into `out`, replacing what it held
    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.samples.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Information about an available audio input device
#[derive(Debug)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub supported_sample_rates: Vec<u32>,
    pub max_channels: u16,
}

impl InputDeviceInfo {
    /// Summarize a device's supported configs. A device that reported none
    /// is still listed, with no rates and zero channels.
    fn from_ranges(
        name: String,
        is_default: bool,
        ranges: &[cpal::SupportedStreamConfigRange],
    ) -> Self {
        let mut supported_sample_rates: Vec<u32> =
            ranges.iter().map(|r| r.max_sample_rate().0).collect();
        supported_sample_rates.sort_unstable();
        supported_sample_rates.dedup();
        let max_channels = ranges.iter().map(|r| r.channels()).max().unwrap_or(0);

        Self {
            name,
            is_default,
            supported_sample_rates,
            max_channels,
        }
    }
}

/// Opens the default (or a named) input device
#[derive(Debug, Default, Clone)]
pub struct MicrophoneBackend {
    device_name: Option<String>,
}

impl MicrophoneBackend {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    /// List all available audio input devices
    pub fn list_devices() -> Result<Vec<InputDeviceInfo>, CaptureError> {
        let host = cpal::default_host();
        let default_name = host
            .default_input_device()
            .and_then(|d| d.name().ok());

        let mut infos = Vec::new();
        for device in host.input_devices()? {
            let name = device
                .name()
                .unwrap_or_else(|_| "Unknown Device".to_string());
            let is_default = default_name.as_deref() == Some(name.as_str());

            let ranges: Vec<cpal::SupportedStreamConfigRange> = match device.supported_input_configs() {
                Ok(ranges) => ranges.collect(),
                Err(e) => {
                    warn!("Could not query configs for '{}': {}", name, e);
                    Vec::new()
                }
            };

            infos.push(InputDeviceInfo::from_ranges(name, is_default, &ranges));
        }

        Ok(infos)
    }

    fn find_device(&self) -> Result<Device, CaptureError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host.default_input_device().ok_or_else(|| {
                CaptureError::DeviceUnavailable("no default input device found".to_string())
            }),
            Some(wanted) => host
                .input_devices()?
                .find(|d| d.name().map(|n| &n == wanted).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::DeviceUnavailable(format!("no input device named '{}'", wanted))
                }),
        }
    }
}

impl AudioBackend for MicrophoneBackend {
    fn open(&mut self, config: &AnalyzerConfig) -> Result<Box<dyn FrequencySource>, CaptureError> {
        config.validate().map_err(CaptureError::UnsupportedConfig)?;

        let device = self.find_device()?;
        let (stream_config, sample_format) = select_config(&device, config)?;

        info!(
            "Audio: {} @ {}Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format
        );

        let ring = Arc::new(Mutex::new(SampleRing::new(config.fft_size)));
        let fault = Arc::new(Mutex::new(None));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &ring, &fault)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &ring, &fault)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &ring, &fault)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &ring, &fault)?,
            other => {
                return Err(CaptureError::UnsupportedConfig(format!(
                    "sample format {:?}",
                    other
                )))
            }
        };

        stream.play()?;

        Ok(Box::new(MicrophoneStream {
            stream,
            ring,
            fault,
            analyzer: SpectrumAnalyzer::new(config.clone()),
            window: Vec::with_capacity(config.fft_size),
        }))
    }
}

/// Pick a stream config at the analysis sample rate, preferring mono f32.
/// Falls back to the device default when the rate is not offered at all.
fn select_config(
    device: &Device,
    config: &AnalyzerConfig,
) -> Result<(StreamConfig, SampleFormat), CaptureError> {
    let target = config.sample_rate_hz;
    let ranges: Vec<_> = device.supported_input_configs()?.collect();

    let best = ranges
        .into_iter()
        .filter(|r| r.min_sample_rate().0 <= target && r.max_sample_rate().0 >= target)
        .min_by_key(|r| {
            (
                r.channels() != config.channels,
                r.sample_format() != SampleFormat::F32,
                r.channels(),
            )
        });

    if let Some(range) = best {
        let supported = range.with_sample_rate(cpal::SampleRate(target));
        debug!("Selected input config: {:?}", supported);
        return Ok((supported.config(), supported.sample_format()));
    }

    let fallback = device.default_input_config()?;
    warn!(
        "Input device does not offer {}Hz; capturing at {}Hz while bin frequencies still assume {}Hz",
        target,
        fallback.sample_rate().0,
        target
    );
    Ok((fallback.config(), fallback.sample_format()))
}

fn build_stream<T>(
    device: &Device,
    stream_config: &StreamConfig,
    ring: &Arc<Mutex<SampleRing>>,
    fault: &Arc<Mutex<Option<CaptureError>>>,
) -> Result<cpal::Stream, CaptureError>
where
    T: cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let channels = usize::from(stream_config.channels.max(1));
    let ring = Arc::clone(ring);
    let fault = Arc::clone(fault);

    let stream = device.build_input_stream(
        stream_config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut ring = lock(&ring);
            // Downmix interleaved frames to mono
            for frame in data.chunks(channels) {
                let sum: f32 = frame
                    .iter()
                    .map(|&s| <f32 as cpal::Sample>::from_sample(s))
                    .sum();
                ring.push(sum / frame.len() as f32);
            }
        },
        move |err| {
            warn!("Audio stream error: {}", err);
            *lock(&fault) = Some(CaptureError::from(err));
        },
        None,
    )?;

    Ok(stream)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running microphone stream with its analyzer
pub struct MicrophoneStream {
    /// Input stream (kept alive until closed)
    stream: cpal::Stream,
    ring: Arc<Mutex<SampleRing>>,
    fault: Arc<Mutex<Option<CaptureError>>>,
    analyzer: SpectrumAnalyzer,
    window: Vec<f32>,
}

impl FrequencySource for MicrophoneStream {
    fn snapshot(&mut self) -> FrequencySnapshot {
        lock(&self.ring).copy_into(&mut self.window);
        self.analyzer.analyze(&self.window)
    }

    fn fault(&self) -> Option<CaptureError> {
        lock(&self.fault).clone()
    }

    fn close(self: Box<Self>) {
        if let Err(e) = self.stream.pause() {
            debug!("Pausing input stream before release failed: {}", e);
        }
        drop(self);
        info!("Microphone released");
    }
}
