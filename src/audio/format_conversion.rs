// Format conversion - Mono click mix to the device's interleaved sample format
//
// The mix is computed in f32; cpal's FromSample handles f32, i16 and u16 outputs.

use cpal::{FromSample, Sample};

/// Copy one mono sample into every channel of an interleaved frame
#[inline]
pub fn write_mono_to_interleaved_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    let converted = T::from_sample(sample);
    for channel_sample in frame.iter_mut() {
        *channel_sample = converted;
    }
}

/// Fill a whole interleaved buffer with the device's silence value
#[inline]
pub fn write_silence<T: Sample>(buffer: &mut [T]) {
    for sample in buffer.iter_mut() {
        *sample = T::EQUILIBRIUM;
    }
}
