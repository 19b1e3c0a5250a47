#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_escape_world::{decode_snapshot, encode_snapshot, SessionSnapshot, SnapshotError};

const TRANSFER_DOMAIN: &str = "maze-escape";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded session payload.
pub(crate) const TRANSFER_HEADER: &str = "maze-escape:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a session snapshot into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(snapshot: &SessionSnapshot) -> Result<String, SnapshotError> {
    let bytes = encode_snapshot(snapshot)?;
    let encoded = STANDARD_NO_PAD.encode(bytes);
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        snapshot.grid().width(),
        snapshot.grid().height()
    ))
}

/// Decodes a session snapshot from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<SessionSnapshot, SessionTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SessionTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SessionTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(SessionTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(SessionTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(SessionTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(SessionTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SessionTransferError::InvalidEncoding)?;
    let snapshot = decode_snapshot(&bytes).map_err(SessionTransferError::InvalidSnapshot)?;

    let actual = (snapshot.grid().width(), snapshot.grid().height());
    if actual != (width, height) {
        return Err(SessionTransferError::DimensionMismatch {
            declared: (width, height),
            actual,
        });
    }

    Ok(snapshot)
}

/// Errors that can occur while decoding session transfer strings.
#[derive(Debug)]
pub(crate) enum SessionTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the transfer string.
    MissingPrefix,
    /// The transfer string did not contain a version segment.
    MissingVersion,
    /// The transfer string did not include grid dimensions.
    MissingDimensions,
    /// The transfer string did not include the payload segment.
    MissingPayload,
    /// The transfer string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The transfer string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the transfer string.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded bytes were not a valid session snapshot.
    InvalidSnapshot(SnapshotError),
    /// The declared dimensions disagree with the grid stored in the payload.
    DimensionMismatch {
        /// Dimensions written in the transfer header.
        declared: (u32, u32),
        /// Dimensions of the decoded grid.
        actual: (u32, u32),
    },
}

impl fmt::Display for SessionTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "session payload was empty"),
            Self::MissingPrefix => write!(f, "session string is missing the prefix"),
            Self::MissingVersion => write!(f, "session string is missing the version"),
            Self::MissingDimensions => write!(f, "session string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "session string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "session prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "session version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode session payload: {error}")
            }
            Self::InvalidSnapshot(error) => {
                write!(f, "could not restore session payload: {error}")
            }
            Self::DimensionMismatch { declared, actual } => write!(
                f,
                "session declares a {}x{} grid but contains {}x{}",
                declared.0, declared.1, actual.0, actual.1
            ),
        }
    }
}

impl Error for SessionTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidSnapshot(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SessionTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| SessionTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| SessionTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| SessionTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(SessionTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((width, height))
}
