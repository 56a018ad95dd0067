//! Live trigger/energy monitor.
//!
//! Listens on a UDP port for the two OSC addresses the FreqZone sketch
//! emits and renders each message as one human-readable line. This is a
//! stateless adapter for watching a performance live; the analyses never
//! consume this stream, only the CSV logs written to disk.

pub mod osc;

pub use osc::{parse_message, OscArg, OscError, OscMessage};

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Address of trigger announcements.
pub const TRIGGER_ADDR: &str = "/bandTrigger";

/// Address of continuous band-energy updates.
pub const ENERGY_ADDR: &str = "/bandEnergy";

/// A trigger announcement: a band fired.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTrigger {
    pub band: u32,
    pub f_lo: f64,
    pub f_hi: f64,
    pub energy: f64,
    pub threshold: f64,
    pub hysteresis: f64,
    pub cooldown_ms: f64,
}

/// A continuous energy reading for one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandEnergy {
    pub band: u32,
    pub f_lo: f64,
    pub f_hi: f64,
    pub energy_norm: f64,
}

/// One decoded monitor message.
#[derive(Debug, Clone, PartialEq)]
pub enum BandMessage {
    Trigger(BandTrigger),
    Energy(BandEnergy),
}

impl BandMessage {
    /// Decode a monitor message from an OSC message, if it is one of the two
    /// known addresses with the expected argument count.
    pub fn from_osc(msg: &OscMessage) -> Option<BandMessage> {
        match msg.addr.as_str() {
            TRIGGER_ADDR if msg.args.len() >= 7 => Some(BandMessage::Trigger(BandTrigger {
                band: msg.args[0].as_u32()?,
                f_lo: msg.args[1].as_f64()?,
                f_hi: msg.args[2].as_f64()?,
                energy: msg.args[3].as_f64()?,
                threshold: msg.args[4].as_f64()?,
                hysteresis: msg.args[5].as_f64()?,
                cooldown_ms: msg.args[6].as_f64()?,
            })),
            ENERGY_ADDR if msg.args.len() >= 4 => Some(BandMessage::Energy(BandEnergy {
                band: msg.args[0].as_u32()?,
                f_lo: msg.args[1].as_f64()?,
                f_hi: msg.args[2].as_f64()?,
                energy_norm: msg.args[3].as_f64()?,
            })),
            _ => None,
        }
    }
}

impl fmt::Display for BandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandMessage::Trigger(t) => write!(
                f,
                "{TRIGGER_ADDR} idx={} {:.0}-{:.0}Hz  E={:.2}  T={:.2}  H={:.2}  C={:.0}ms",
                t.band, t.f_lo, t.f_hi, t.energy, t.threshold, t.hysteresis, t.cooldown_ms
            ),
            BandMessage::Energy(e) => {
                // Clamp so a bad packet cannot print an arbitrarily long bar.
                let ticks = ((e.energy_norm * 20.0) as i64).clamp(0, 20) as usize;
                write!(
                    f,
                    "{ENERGY_ADDR} idx={} {:.0}-{:.0}Hz  Enorm={:.2} {}",
                    e.band,
                    e.f_lo,
                    e.f_hi,
                    e.energy_norm,
                    "\u{2588}".repeat(ticks)
                )
            }
        }
    }
}

/// Errors from running the monitor.
#[derive(Debug)]
pub enum MonitorError {
    Bind(String),
    AlreadyRunning,
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Bind(e) => write!(f, "could not bind UDP socket: {e}"),
            MonitorError::AlreadyRunning => write!(f, "Monitor is already running"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// Background UDP listener delivering decoded messages over a channel.
///
/// Malformed or unknown packets are dropped quietly, same as bad log rows.
pub struct Monitor {
    socket: Option<UdpSocket>,
    sender: Sender<BandMessage>,
    receiver: Receiver<BandMessage>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Bind the listening socket. Port 0 picks an ephemeral port.
    pub fn bind(port: u16) -> Result<Self, MonitorError> {
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|e| MonitorError::Bind(e.to_string()))?;
        socket
            .set_read_timeout(Some(Duration::from_millis(200)))
            .map_err(|e| MonitorError::Bind(e.to_string()))?;

        let (sender, receiver) = bounded(1024);
        Ok(Self {
            socket: Some(socket),
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    /// The port the socket actually bound to.
    pub fn local_port(&self) -> Option<u16> {
        self.socket
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .map(|addr| addr.port())
    }

    /// Start the listener thread.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        let socket = self.socket.take().ok_or(MonitorError::AlreadyRunning)?;
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let sender = self.sender.clone();
        self.handle = Some(std::thread::spawn(move || {
            let mut buf = [0u8; 1536];
            while running.load(Ordering::SeqCst) {
                match socket.recv_from(&mut buf) {
                    Ok((len, _src)) => {
                        if let Ok(msg) = parse_message(&buf[..len]) {
                            if let Some(band_msg) = BandMessage::from_osc(&msg) {
                                // A full channel means nobody is draining;
                                // dropping is fine for a live view.
                                let _ = sender.try_send(band_msg);
                            }
                        }
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(_) => break,
                }
            }
        }));

        Ok(())
    }

    /// Stop the listener thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Get the receiver for decoded messages.
    pub fn receiver(&self) -> &Receiver<BandMessage> {
        &self.receiver
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_padded(buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn energy_packet(band: i32, f_lo: f32, f_hi: f32, energy_norm: f32) -> Vec<u8> {
        let mut buf = Vec::new();
        push_padded(&mut buf, ENERGY_ADDR);
        push_padded(&mut buf, ",ifff");
        buf.extend_from_slice(&band.to_be_bytes());
        buf.extend_from_slice(&f_lo.to_be_bytes());
        buf.extend_from_slice(&f_hi.to_be_bytes());
        buf.extend_from_slice(&energy_norm.to_be_bytes());
        buf
    }

    fn trigger_packet() -> Vec<u8> {
        let mut buf = Vec::new();
        push_padded(&mut buf, TRIGGER_ADDR);
        push_padded(&mut buf, ",fffffff");
        for value in [2.0f32, 100.0, 200.0, 0.8, 0.4, 0.05, 500.0] {
            buf.extend_from_slice(&value.to_be_bytes());
        }
        buf
    }

    #[test]
    fn test_trigger_message_decodes_from_floats() {
        let msg = parse_message(&trigger_packet()).unwrap();
        match BandMessage::from_osc(&msg) {
            Some(BandMessage::Trigger(t)) => {
                assert_eq!(t.band, 2);
                assert_eq!(t.cooldown_ms, 500.0);
            }
            other => panic!("expected trigger, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_address_is_ignored() {
        let mut buf = Vec::new();
        push_padded(&mut buf, "/somethingElse");
        push_padded(&mut buf, ",i");
        buf.extend_from_slice(&1i32.to_be_bytes());

        let msg = parse_message(&buf).unwrap();
        assert!(BandMessage::from_osc(&msg).is_none());
    }

    #[test]
    fn test_display_matches_monitor_lines() {
        let energy = BandMessage::Energy(BandEnergy {
            band: 1,
            f_lo: 100.0,
            f_hi: 200.0,
            energy_norm: 0.25,
        });
        assert_eq!(
            energy.to_string(),
            "/bandEnergy idx=1 100-200Hz  Enorm=0.25 \u{2588}\u{2588}\u{2588}\u{2588}\u{2588}"
        );

        let trigger = BandMessage::Trigger(BandTrigger {
            band: 2,
            f_lo: 100.0,
            f_hi: 200.0,
            energy: 0.8,
            threshold: 0.4,
            hysteresis: 0.05,
            cooldown_ms: 500.0,
        });
        assert_eq!(
            trigger.to_string(),
            "/bandTrigger idx=2 100-200Hz  E=0.80  T=0.40  H=0.05  C=500ms"
        );
    }

    #[test]
    fn test_energy_bar_is_clamped() {
        let hot = BandMessage::Energy(BandEnergy {
            band: 0,
            f_lo: 0.0,
            f_hi: 1.0,
            energy_norm: 99.0,
        });
        assert!(hot.to_string().ends_with(&"\u{2588}".repeat(20)));
    }

    #[test]
    fn test_monitor_delivers_decoded_packets() {
        let mut monitor = Monitor::bind(0).expect("bind");
        let port = monitor.local_port().expect("port");
        monitor.start().expect("start");

        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
        sender
            .send_to(&energy_packet(1, 100.0, 200.0, 0.5), ("127.0.0.1", port))
            .expect("send");

        let msg = monitor
            .receiver()
            .recv_timeout(Duration::from_secs(2))
            .expect("message");
        match msg {
            BandMessage::Energy(e) => {
                assert_eq!(e.band, 1);
                assert_eq!(e.energy_norm, 0.5);
            }
            other => panic!("expected energy, got {other:?}"),
        }

        monitor.stop();
    }
}
