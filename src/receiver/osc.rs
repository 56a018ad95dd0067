//! Minimal OSC 1.0 message decoding.
//!
//! The FreqZone sketch emits plain OSC messages over UDP. Only what those
//! messages use is supported: a padded address, a `,`-prefixed type tag
//! string, and big-endian `i32`/`f32`/string arguments. Bundles are not.

/// One decoded OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
}

impl OscArg {
    /// Numeric value of an `i` or `f` argument. Senders are inconsistent
    /// about tagging integers, so both are accepted wherever a number is
    /// expected.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OscArg::Int(v) => Some(f64::from(*v)),
            OscArg::Float(v) => Some(f64::from(*v)),
            OscArg::Str(_) => None,
        }
    }

    /// Non-negative integer value of an `i` or `f` argument.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            OscArg::Int(v) => u32::try_from(*v).ok(),
            OscArg::Float(v) if *v >= 0.0 => Some(*v as u32),
            _ => None,
        }
    }
}

/// One decoded OSC message.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub addr: String,
    pub args: Vec<OscArg>,
}

/// Errors from decoding a packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscError {
    /// Packet ended before a complete element
    Truncated,
    /// Address does not start with `/` (e.g. a bundle)
    BadAddress,
    /// Type tag string does not start with `,`
    BadTypeTags,
    /// String argument is not valid UTF-8 or is unterminated
    BadString,
    /// Type tag this decoder does not handle
    UnsupportedTag(char),
}

impl std::fmt::Display for OscError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OscError::Truncated => write!(f, "packet truncated"),
            OscError::BadAddress => write!(f, "address must start with '/'"),
            OscError::BadTypeTags => write!(f, "type tag string must start with ','"),
            OscError::BadString => write!(f, "malformed string argument"),
            OscError::UnsupportedTag(tag) => write!(f, "unsupported type tag '{tag}'"),
        }
    }
}

impl std::error::Error for OscError {}

/// Decode one OSC message from a UDP datagram.
pub fn parse_message(packet: &[u8]) -> Result<OscMessage, OscError> {
    let (addr, rest) = take_padded_str(packet)?;
    if !addr.starts_with('/') {
        return Err(OscError::BadAddress);
    }

    // A message with no type tag string carries no arguments.
    if rest.is_empty() {
        return Ok(OscMessage {
            addr: addr.to_string(),
            args: Vec::new(),
        });
    }

    let (tags, mut rest) = take_padded_str(rest)?;
    let tags = tags.strip_prefix(',').ok_or(OscError::BadTypeTags)?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => {
                let (value, remaining) = take_i32(rest)?;
                rest = remaining;
                OscArg::Int(value)
            }
            'f' => {
                let (value, remaining) = take_f32(rest)?;
                rest = remaining;
                OscArg::Float(value)
            }
            's' => {
                let (value, remaining) = take_padded_str(rest)?;
                rest = remaining;
                OscArg::Str(value.to_string())
            }
            other => return Err(OscError::UnsupportedTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage {
        addr: addr.to_string(),
        args,
    })
}

/// Read a NUL-terminated string padded to a 4-byte boundary.
fn take_padded_str(buf: &[u8]) -> Result<(&str, &[u8]), OscError> {
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(OscError::BadString)?;
    let s = std::str::from_utf8(&buf[..nul]).map_err(|_| OscError::BadString)?;

    // Consume the terminator and padding up to the next 4-byte boundary.
    let padded = (nul / 4 + 1) * 4;
    if padded > buf.len() {
        return Err(OscError::Truncated);
    }
    Ok((s, &buf[padded..]))
}

fn take_i32(buf: &[u8]) -> Result<(i32, &[u8]), OscError> {
    let bytes: [u8; 4] = buf
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(OscError::Truncated)?;
    Ok((i32::from_be_bytes(bytes), &buf[4..]))
}

fn take_f32(buf: &[u8]) -> Result<(f32, &[u8]), OscError> {
    let bytes: [u8; 4] = buf
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(OscError::Truncated)?;
    Ok((f32::from_be_bytes(bytes), &buf[4..]))
}
