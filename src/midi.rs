//! MIDI output for chordpad
//!
//! A worker thread owns the midir connection. The shell sends it owned note
//! lists; it holds each chord for a fixed time and then releases it, or
//! releases it early when the next chord arrives.

use anyhow::{anyhow, Result};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const CLIENT_NAME: &str = "chordpad";

/// Note On: 0x90 + channel, note, velocity
pub fn note_on_message(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

/// Note Off: 0x80 + channel, note, velocity 0
pub fn note_off_message(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

/// All Notes Off: CC 123 on the channel
pub fn all_notes_off_message(channel: u8) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), 123, 0]
}

/// Commands that can be sent to the MIDI output thread
#[derive(Debug, Clone)]
pub enum MidiCommand {
    Connect { port_name: String },
    /// Sound `notes` together for `hold`, releasing whatever is sounding first
    PlayChord {
        channel: u8,
        notes: Vec<u8>,
        velocity: u8,
        hold: Duration,
    },
    /// Release the sounding chord now
    Release,
    AllNotesOff { channel: u8 },
    Disconnect,
    Shutdown,
}

/// Owns the connection and the currently sounding chord
struct MidiOutputInternal {
    connection: Option<MidiOutputConnection>,
    command_rx: Receiver<MidiCommand>,
    sounding: Vec<(u8, u8)>,
    release_at: Option<Instant>,
}

impl MidiOutputInternal {
    fn new(command_rx: Receiver<MidiCommand>) -> Self {
        Self {
            connection: None,
            command_rx,
            sounding: Vec::new(),
            release_at: None,
        }
    }

    fn connect(&mut self, port_name: &str) -> Result<()> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let port = find_port(&midi_out, port_name)?;
        let connection = midi_out
            .connect(&port, "chordpad-out")
            .map_err(|e| anyhow!("Failed to open MIDI port '{}': {}", port_name, e))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn send(&mut self, message: &[u8]) {
        if let Some(conn) = &mut self.connection {
            if let Err(e) = conn.send(message) {
                tracing::warn!(error = %e, "MIDI send failed");
            }
        }
    }

    fn release(&mut self) {
        for (channel, note) in std::mem::take(&mut self.sounding) {
            self.send(&note_off_message(channel, note));
        }
        self.release_at = None;
    }

    fn next_command(&self) -> Result<MidiCommand, RecvTimeoutError> {
        match self.release_at {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                self.command_rx.recv_timeout(wait)
            }
            None => self
                .command_rx
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        }
    }

    fn run(&mut self) {
        loop {
            let cmd = match self.next_command() {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => {
                    self.release();
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            match cmd {
                MidiCommand::Connect { port_name } => {
                    self.release();
                    if let Err(e) = self.connect(&port_name) {
                        tracing::warn!(port = %port_name, error = %e, "MIDI connect failed");
                    }
                }
                MidiCommand::PlayChord {
                    channel,
                    notes,
                    velocity,
                    hold,
                } => {
                    self.release();
                    for note in notes {
                        self.send(&note_on_message(channel, note, velocity));
                        self.sounding.push((channel, note));
                    }
                    self.release_at = Some(Instant::now() + hold);
                }
                MidiCommand::Release => self.release(),
                MidiCommand::AllNotesOff { channel } => {
                    self.sounding.retain(|(ch, _)| *ch != channel);
                    self.send(&all_notes_off_message(channel));
                }
                MidiCommand::Disconnect => {
                    self.release();
                    self.connection = None;
                }
                MidiCommand::Shutdown => {
                    self.release();
                    for ch in 0..16u8 {
                        self.send(&all_notes_off_message(ch));
                    }
                    break;
                }
            }
        }
    }
}

fn find_port(midi_out: &MidiOutput, port_name: &str) -> Result<midir::MidiOutputPort> {
    midi_out
        .ports()
        .into_iter()
        .find(|p| {
            midi_out
                .port_name(p)
                .map(|name| name.contains(port_name))
                .unwrap_or(false)
        })
        .ok_or_else(|| anyhow!("MIDI port '{}' not found", port_name))
}

/// Thread-safe handle to the MIDI output thread
pub struct MidiOutputHandle {
    command_tx: Sender<MidiCommand>,
    _thread: JoinHandle<()>,
    channel: AtomicU8,
    velocity: AtomicU8,
    port_name: RwLock<Option<String>>,
}

impl MidiOutputHandle {
    /// Spawn the output thread. Nothing is connected yet.
    pub fn new(midi_channel: u8, velocity: u8) -> Result<Self> {
        let (tx, rx) = channel();

        let thread = thread::Builder::new()
            .name("chordpad-midi".into())
            .spawn(move || {
                let mut internal = MidiOutputInternal::new(rx);
                internal.run();
            })?;

        Ok(Self {
            command_tx: tx,
            _thread: thread,
            channel: AtomicU8::new(midi_channel & 0x0F),
            velocity: AtomicU8::new(velocity & 0x7F),
            port_name: RwLock::new(None),
        })
    }

    /// List available MIDI output ports.
    /// Creating the client can fail transiently on macOS, so retry a few times.
    pub fn list_ports() -> Result<Vec<String>> {
        let mut last_err = None;
        for attempt in 0..3 {
            if attempt > 0 {
                thread::sleep(Duration::from_millis(100));
            }
            match MidiOutput::new(CLIENT_NAME) {
                Ok(midi_out) => {
                    return Ok(midi_out
                        .ports()
                        .iter()
                        .filter_map(|p| midi_out.port_name(p).ok())
                        .collect());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(anyhow!(
            "MIDI initialization failed after 3 attempts: {:?}",
            last_err
        ))
    }

    /// Connect to the first port whose name contains `port_name`
    pub fn connect(&self, port_name: &str) -> Result<String> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let port = find_port(&midi_out, port_name)?;
        let actual_name = midi_out.port_name(&port)?;

        self.send(MidiCommand::Connect {
            port_name: port_name.to_string(),
        })?;
        *self.port_name.write().unwrap_or_else(PoisonError::into_inner) = Some(actual_name.clone());
        tracing::info!(port = %actual_name, "MIDI connected");
        Ok(actual_name)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.send(MidiCommand::Disconnect)?;
        *self.port_name.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected_port().is_some()
    }

    pub fn connected_port(&self) -> Option<String> {
        self.port_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Output channel, 0-15
    pub fn channel(&self) -> u8 {
        self.channel.load(Ordering::Relaxed)
    }

    pub fn set_channel(&self, channel: u8) {
        self.channel.store(channel & 0x0F, Ordering::Relaxed);
    }

    pub fn velocity(&self) -> u8 {
        self.velocity.load(Ordering::Relaxed)
    }

    pub fn set_velocity(&self, velocity: u8) {
        self.velocity.store(velocity & 0x7F, Ordering::Relaxed);
    }

    /// Sound a chord for `hold`. Does nothing when no port is connected.
    pub fn play_chord(&self, notes: Vec<u8>, hold: Duration) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }
        self.send(MidiCommand::PlayChord {
            channel: self.channel(),
            notes,
            velocity: self.velocity(),
            hold,
        })
    }

    pub fn release(&self) -> Result<()> {
        self.send(MidiCommand::Release)
    }

    /// All Notes Off on every channel
    pub fn panic_all(&self) -> Result<()> {
        self.send(MidiCommand::Release)?;
        for ch in 0..16u8 {
            self.send(MidiCommand::AllNotesOff { channel: ch })?;
        }
        Ok(())
    }

    fn send(&self, cmd: MidiCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| anyhow!("MIDI thread is gone: {}", e))
    }
}

impl Drop for MidiOutputHandle {
    fn drop(&mut self) {
        let _ = self.command_tx.send(MidiCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_messages() {
        assert_eq!(note_on_message(0, 60, 64), [0x90, 60, 64]);
        assert_eq!(note_on_message(9, 38, 100), [0x99, 38, 100]);
        assert_eq!(note_off_message(0, 60), [0x80, 60, 0]);
        assert_eq!(all_notes_off_message(15), [0xBF, 123, 0]);
    }

    #[test]
    fn test_messages_mask_out_of_range_values() {
        assert_eq!(note_on_message(16, 200, 255), [0x90, 72, 127]);
    }

    #[test]
    fn test_channel_and_velocity_settings() {
        let handle = MidiOutputHandle::new(3, 80).unwrap();
        assert_eq!(handle.channel(), 3);
        assert_eq!(handle.velocity(), 80);

        handle.set_channel(9);
        handle.set_velocity(127);
        assert_eq!(handle.channel(), 9);
        assert_eq!(handle.velocity(), 127);
    }

    #[test]
    fn test_new_handle_masks_channel_and_velocity() {
        let handle = MidiOutputHandle::new(0x1A, 200).unwrap();
        assert_eq!(handle.channel(), 10);
        assert_eq!(handle.velocity(), 72);
        assert!(handle.connected_port().is_none());
    }

    #[test]
    fn test_unconnected_handle_accepts_chords() {
        let handle = MidiOutputHandle::new(0, 64).unwrap();
        assert!(!handle.is_connected());
        assert!(handle
            .play_chord(vec![60, 64, 67], Duration::from_millis(10))
            .is_ok());
        assert!(handle.panic_all().is_ok());
        assert!(handle.disconnect().is_ok());
    }
}
