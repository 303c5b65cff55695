//! MIDI REPL commands

use crate::commands::{CommandContext, CommandResult};
use crate::midi::MidiOutputHandle;
use colored::*;
use std::sync::Arc;

fn handle(ctx: &CommandContext) -> Result<&Arc<MidiOutputHandle>, CommandResult> {
    ctx.midi
        .as_ref()
        .ok_or_else(|| CommandResult::Error("MIDI output not initialized".to_string()))
}

/// Handle `midi devices` command - list available MIDI output ports
pub fn cmd_midi_devices(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    match MidiOutputHandle::list_ports() {
        Ok(ports) if ports.is_empty() => CommandResult::Message(
            "No MIDI output ports found. Make sure a MIDI device or virtual port is connected."
                .yellow()
                .to_string(),
        ),
        Ok(ports) => {
            let mut output = format!("{}\n", "🎹 Available MIDI Output Ports:".bold());
            for (i, port) in ports.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, port.cyan()));
            }
            output.push_str(&format!(
                "\n{} {}",
                "Use".dimmed(),
                "midi connect <port name>".green()
            ));
            CommandResult::Message(output)
        }
        Err(e) => CommandResult::Error(format!("Failed to list MIDI ports: {}", e)),
    }
}

/// Handle `midi connect <port>` command - connect to a MIDI output port
pub fn cmd_midi_connect(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error(
            "Usage: midi connect <port name>\nUse 'midi devices' to see available ports"
                .to_string(),
        );
    }
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.connect(args) {
        Ok(name) => {
            let message = format!("Connected to MIDI port {}", name);
            ctx.session.log_mut().message(message);
            CommandResult::Message(format!("🎹 Connected to MIDI port: {}", name.green()))
        }
        Err(e) => CommandResult::Error(format!("Failed to connect to '{}': {}", args, e)),
    }
}

/// Handle `midi disconnect` command
pub fn cmd_midi_disconnect(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.disconnect() {
        Ok(()) => CommandResult::Message("🎹 Disconnected from MIDI".to_string()),
        Err(e) => CommandResult::Error(format!("Failed to disconnect: {}", e)),
    }
}

/// Handle `midi channel [1-16]` command
pub fn cmd_midi_channel(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };
    if args.is_empty() {
        return CommandResult::Message(format!("🎹 MIDI channel: {}", handle.channel() + 1));
    }
    match args.parse::<u8>() {
        Ok(ch) if (1..=16).contains(&ch) => {
            handle.set_channel(ch - 1);
            CommandResult::Message(format!("🎹 MIDI channel set to {}", ch).green().to_string())
        }
        _ => CommandResult::Error("Channel must be 1-16".to_string()),
    }
}

/// Handle `midi velocity [0-127]` command
pub fn cmd_midi_velocity(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };
    if args.is_empty() {
        return CommandResult::Message(format!("🎹 MIDI velocity: {}", handle.velocity()));
    }
    match args.parse::<u8>() {
        Ok(v) if v <= 127 => {
            handle.set_velocity(v);
            CommandResult::Message(format!("🎹 MIDI velocity set to {}", v).green().to_string())
        }
        _ => CommandResult::Error("Velocity must be 0-127".to_string()),
    }
}

/// Handle `midi status` command - show MIDI connection status
pub fn cmd_midi_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };

    let mut output = format!("{}\n", "🎹 MIDI Status:".bold());
    match handle.connected_port() {
        Some(name) => {
            output.push_str(&format!("  Status: {}\n", "Connected".green().bold()));
            output.push_str(&format!("  Port: {}\n", name.cyan()));
        }
        None => output.push_str(&format!("  Status: {}\n", "Not connected".yellow())),
    }
    output.push_str(&format!("  Channel: {}\n", handle.channel() + 1));
    output.push_str(&format!("  Velocity: {}\n", handle.velocity()));
    output.push_str(&format!(
        "  Chord length: {} ms",
        ctx.session.config().chord_duration_ms
    ));
    CommandResult::Message(output)
}

/// Handle `midi panic` command - send All Notes Off to all channels
pub fn cmd_midi_panic(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let handle = match handle(ctx) {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.panic_all() {
        Ok(()) => CommandResult::Message(
            "🎹 MIDI Panic: All Notes Off sent to all channels"
                .yellow()
                .to_string(),
        ),
        Err(e) => CommandResult::Error(format!("Failed to send MIDI panic: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordpad_core::{ProgressionDatabase, Session};

    fn context_with_midi() -> CommandContext {
        let handle = Arc::new(MidiOutputHandle::new(0, 64).unwrap());
        CommandContext::new_with_midi(Session::default(), ProgressionDatabase::empty(), handle)
    }

    #[test]
    fn test_without_midi() {
        let mut ctx = CommandContext::new(Session::default(), ProgressionDatabase::empty());
        assert!(matches!(
            cmd_midi_status("", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_channel_is_one_based() {
        let mut ctx = context_with_midi();
        assert!(matches!(
            cmd_midi_channel("10", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.midi.as_ref().unwrap().channel(), 9);
        assert!(matches!(
            cmd_midi_channel("0", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(matches!(
            cmd_midi_channel("17", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_velocity_range() {
        let mut ctx = context_with_midi();
        assert!(matches!(
            cmd_midi_velocity("100", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.midi.as_ref().unwrap().velocity(), 100);
        assert!(matches!(
            cmd_midi_velocity("128", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_status_when_disconnected() {
        let mut ctx = context_with_midi();
        match cmd_midi_status("", &mut ctx) {
            CommandResult::Message(msg) => assert!(msg.contains("Not connected")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
