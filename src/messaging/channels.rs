// Lock-free communication channels

use crate::audio::trigger::ToneEvent;
use crate::messaging::event::MetronomeEvent;
use ringbuf::{HeapRb, traits::Split};

/// Scheduler → audio callback
pub type ToneProducer = ringbuf::HeapProd<ToneEvent>;
pub type ToneConsumer = ringbuf::HeapCons<ToneEvent>;

pub fn create_tone_channel(capacity: usize) -> (ToneProducer, ToneConsumer) {
    let rb = HeapRb::<ToneEvent>::new(capacity);
    rb.split()
}

/// Metronome core → UI
pub type EventProducer = ringbuf::HeapProd<MetronomeEvent>;
pub type EventConsumer = ringbuf::HeapCons<MetronomeEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<MetronomeEvent>::new(capacity);
    rb.split()
}
