// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! midir-backed MIDI output.
//!
//! Port enumeration, selection by configured name or interactive prompt,
//! and the `MidiSink` implementation over an open connection.

use std::io::{stdin, stdout, Write};

use anyhow::{anyhow, Context, Result};
use midir::{MidiOutput, MidiOutputConnection};

use super::MidiSink;

const CLIENT_NAME: &str = "mtclink";

/// MIDI output over a midir connection.
pub struct MidirSink {
    conn: MidiOutputConnection,
}

impl MidirSink {
    /// Connect to the output port at `index` in the system port list.
    pub fn connect(index: usize) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME).context("Failed to create MIDI client")?;
        let ports = midi_out.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| anyhow!("MIDI output port {} not found ({} available)", index, ports.len()))?;
        let conn = midi_out
            .connect(port, CLIENT_NAME)
            .map_err(|e| anyhow!("Failed to connect to MIDI output port: {}", e))?;
        Ok(Self { conn })
    }

    /// Connect to the first port whose name contains `name`
    /// (case-insensitive).
    pub fn connect_by_name(name: &str) -> Result<Self> {
        let ports = list_ports()?;
        let index = ports
            .iter()
            .position(|(_, n)| n.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| anyhow!("No MIDI output port matching '{}' found", name))?;
        Self::connect(ports[index].0)
    }

    /// Pick a port: the configured name when given, the only port when
    /// there is exactly one, otherwise an interactive prompt.
    pub fn connect_with_selection(configured: Option<&str>) -> Result<Self> {
        if let Some(name) = configured {
            return Self::connect_by_name(name);
        }

        let ports = list_ports()?;
        match ports.len() {
            0 => Err(anyhow!("No MIDI output ports found")),
            1 => {
                println!("Choosing the only available output port: {}", ports[0].1);
                Self::connect(ports[0].0)
            }
            _ => {
                println!("\nAvailable output ports:");
                for (i, name) in &ports {
                    println!("  {}: {}", i, name);
                }
                print!("Please select output port: ");
                stdout().flush()?;
                let mut input = String::new();
                stdin().read_line(&mut input)?;
                let index: usize = input
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid output port: {}", input.trim()))?;
                if index >= ports.len() {
                    return Err(anyhow!("Invalid output port selected: {}", index));
                }
                Self::connect(index)
            }
        }
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.conn
            .send(message)
            .map_err(|e| anyhow!("Failed to send MIDI message: {}", e))
    }
}

/// List all available MIDI output ports as (index, name) pairs.
pub fn list_ports() -> Result<Vec<(usize, String)>> {
    let midi_out = MidiOutput::new(CLIENT_NAME).context("Failed to create MIDI client")?;
    let result = midi_out
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect();
    Ok(result)
}

/// Print all available MIDI output ports to stdout.
pub fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No MIDI output ports found.");
    } else {
        println!("Available MIDI output ports:");
        for (i, name) in ports {
            println!("  {}: {}", i, name);
        }
    }
    Ok(())
}
