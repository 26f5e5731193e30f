/// Drives the voice core from raw MIDI bytes without an audio device.
/// Shows decoding, sustain deferral, live pitch bend, and voice cleanup.
use rtrb::RingBuffer;
use keybed::{
    engine::BlockEngine,
    io::midi::decode,
    synth::{voice_bus, SynthMessage, VoiceManager},
    SynthConfig,
};

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn main() -> keybed::Result<()> {
    println!("=== Offline Render Demo ===\n");

    let sample_rate = 48_000.0;
    let block_size = 256;
    let config = SynthConfig::default();

    // Message queue: producer side is "the MIDI port", consumer is the manager
    let (mut tx, mut rx) = RingBuffer::<SynthMessage>::new(64);
    let mut manager = VoiceManager::new(BlockEngine::new(sample_rate, &config), &config)?;
    let mut bus = voice_bus::<BlockEngine>();
    let mut buffer = vec![0.0; block_size];
    println!("Rendering {block_size}-sample blocks at {} Hz\n", manager.engine().sample_rate());

    let mut play = |bytes: [u8; 3], label: &str| {
        println!("  {label:<28} {bytes:02X?}");
        if let Some(event) = decode(&bytes) {
            tx.push(event).expect("demo queue holds every event");
        }
    };

    println!("Sustain down, then C major chord:");
    play([0xB0, 0x40, 127], "Sustain on");
    play([0x90, 60, 100], "Note On: C4 (60)");
    play([0x90, 64, 100], "Note On: E4 (64)");
    play([0x90, 67, 100], "Note On: G4 (67)");
    play([0x80, 60, 0], "Note Off: C4 (deferred)");
    play([0x90, 64, 0], "Note On vel 0: E4 (deferred)");

    bus.drain(&mut manager, &mut rx);
    manager.engine_mut().render(&mut buffer);
    manager.collect_ended();
    println!("\n  Active voices: {}", manager.active_count());
    println!("  Sustained notes: {:?}", manager.sustained_notes().iter().collect::<Vec<_>>());
    println!("  Peak amplitude: {:.3}", peak(&buffer));

    println!("\nBend while the chord rings:");
    println!("  UI pitch bend (full up)");
    bus.publish(&mut manager, SynthMessage::PitchWheel { value: 1.0 });
    println!("  Detune now: {:.1} cents on every voice", manager.controls().detune());

    println!("\nSustain up:");
    play([0xB0, 0x40, 0], "Sustain off");
    bus.drain(&mut manager, &mut rx);
    println!("  Active voices: {}", manager.active_count());

    println!("\nRendering 20 blocks to let released voices fade...");
    for _ in 0..20 {
        manager.engine_mut().render(&mut buffer);
        manager.collect_ended();
    }
    println!("  Engine voices still live: {}", manager.engine().live_voices());

    println!("\nIgnored traffic:");
    play([0xF8, 0, 0], "Timing clock");
    play([0xC0, 5, 0], "Program change");
    println!("  Queued events: {}", bus.drain(&mut manager, &mut rx));

    println!("\n=== Voice Lifecycle ===");
    println!("• Decode: 3 bytes → semantic event, or dropped");
    println!("• Sustain: releases deferred while the pedal is down");
    println!("• Pitch bend: applied live to every sounding voice");
    println!("• Cleanup: engine reports ended voices, manager matches them by handle");
    Ok(())
}
