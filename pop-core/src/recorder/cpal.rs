use crate::analyzer;
use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::thread;

#[derive(Debug, Default)]
pub struct CPalBuilder {
    pub rate: Option<usize>,
    pub buffer_size: Option<usize>,
}

impl CPalBuilder {
    pub fn new() -> CPalBuilder {
        Default::default()
    }

    pub fn rate(&mut self, rate: usize) -> &mut CPalBuilder {
        self.rate = Some(rate);
        self
    }

    pub fn buffer_size(&mut self, buffer_size: usize) -> &mut CPalBuilder {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub fn create(&mut self) -> CPalRecorder {
        let rate = self
            .rate
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.rate", 44100));
        let buffer_size = self
            .buffer_size
            .unwrap_or_else(|| crate::CONFIG.get_or("audio.buffer", 8192));

        CPalRecorder::new(rate, buffer_size)
    }

    pub fn build(&mut self) -> Box<dyn super::Recorder> {
        Box::new(self.create())
    }
}

/// Recorder for the default input device of the default cpal host
///
/// All channels are averaged down to mono.  If the device can't be opened the error is logged
/// and the buffer stays silent.
#[derive(Debug)]
pub struct CPalRecorder {
    buffer: analyzer::SampleBuffer,
}

impl CPalRecorder {
    fn new(rate: usize, buffer_size: usize) -> CPalRecorder {
        let buf = analyzer::SampleBuffer::new(buffer_size, rate);

        {
            let buf = buf.clone();

            thread::Builder::new()
                .name("cpal-recorder".into())
                .spawn(move || match open_stream(&buf) {
                    // The stream stops as soon as it is dropped
                    Ok(_stream) => loop {
                        thread::park();
                    },
                    Err(err) => log::error!("Could not init microphone: {:#}", err),
                })
                .expect("Failed to spawn recorder thread");
        }

        CPalRecorder { buffer: buf }
    }
}

impl super::Recorder for CPalRecorder {
    fn sample_buffer<'a>(&'a self) -> &'a analyzer::SampleBuffer {
        &self.buffer
    }
}

fn open_stream(buf: &analyzer::SampleBuffer) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("No input device available")?;

    let rate = cpal::SampleRate(buf.rate() as u32);
    let supported = device
        .supported_input_configs()
        .context("Can't query input configs")?
        .find(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
        .with_context(|| format!("Input device does not support {} Hz", rate.0))?
        .with_sample_rate(rate);

    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    log::debug!("CPal:");
    log::debug!("    Device      = {}", device.name().unwrap_or_default());
    log::debug!("    Sample Rate = {:6}", config.sample_rate.0);
    log::debug!("    Channels    = {:6}", config.channels);
    log::debug!("    Format      = {:?}", sample_format);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, buf.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, buf.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, buf.clone())?,
        other => anyhow::bail!("Unsupported sample format {:?}", other),
    };

    stream.play().context("Failed to start input stream")?;

    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buf: analyzer::SampleBuffer,
) -> anyhow::Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    use cpal::Sample;

    let channels = config.channels as usize;
    let mut scratch: Vec<analyzer::Sample> = Vec::new();

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|s| s.to_sample::<f32>()));

                buf.push_interleaved(&scratch, channels);
                log::trace!("Pushed {} samples", scratch.len() / channels.max(1));
            },
            |err| log::error!("Stream error: {}", err),
            None,
        )
        .context("Failed to build input stream")?;

    Ok(stream)
}
