//! Формат рядків спільного каналу розсилки.
//!
//! Кожне повідомлення — плаский ASCII-рядок, поля розділені комами:
//!
//! ```text
//! BALIZA,<name>,<x>,<y>
//! DESTINO,<agent>,CLUSTER<id>,<x>,<y>
//! ```
//!
//! Поля не екрануються, тож імена не можуть містити ком. Розбір суворий:
//! тег і кількість полів мають збігатися точно.

use std::fmt;

use crate::core::{
    BeaconRecord, DestinationAssignment, Position, WireError, MAX_BEACON_NAME_LEN,
};

pub const BEACON_TAG: &str = "BALIZA";
pub const DESTINATION_TAG: &str = "DESTINO";

const LABEL_PREFIX: &str = "CLUSTER";

/// Розібране повідомлення каналу.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Звіт маяка про власну позицію.
    Beacon(BeaconRecord),
    /// Ціль, адресована одному агенту.
    Destination(DestinationAssignment),
}

impl Message {
    /// Розбирає один рядок. Усе, що не збігається точно, відкидається.
    pub fn decode(line: &str) -> Result<Message, WireError> {
        let line = line
            .strip_suffix('\0')
            .unwrap_or(line)
            .trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(WireError::Empty);
        }

        let fields: Vec<&str> = line.split(',').collect();
        match fields[0] {
            BEACON_TAG => {
                expect_fields(BEACON_TAG, &fields, 4)?;
                let name = parse_beacon_name(fields[1])?;
                let x = parse_coord("x", fields[2])?;
                let y = parse_coord("y", fields[3])?;
                Ok(Message::Beacon(BeaconRecord {
                    name,
                    position: Position::new(x, y),
                }))
            }
            DESTINATION_TAG => {
                expect_fields(DESTINATION_TAG, &fields, 5)?;
                let agent_id = parse_agent_id(fields[1])?;
                let cluster_id = parse_label(fields[2])?;
                let x = parse_coord("x", fields[3])?;
                let y = parse_coord("y", fields[4])?;
                Ok(Message::Destination(DestinationAssignment {
                    agent_id,
                    cluster_id,
                    target: Position::new(x, y),
                }))
            }
            other => Err(WireError::UnknownTag(other.to_string())),
        }
    }

    /// Рядок для каналу, координати з двома знаками після коми.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Beacon(b) => write!(
                f,
                "{BEACON_TAG},{},{:.2},{:.2}",
                b.name, b.position.x, b.position.y
            ),
            Message::Destination(d) => write!(
                f,
                "{DESTINATION_TAG},{},{},{:.2},{:.2}",
                d.agent_id,
                d.label(),
                d.target.x,
                d.target.y
            ),
        }
    }
}

impl From<DestinationAssignment> for Message {
    fn from(d: DestinationAssignment) -> Self {
        Message::Destination(d)
    }
}

impl From<BeaconRecord> for Message {
    fn from(b: BeaconRecord) -> Self {
        Message::Beacon(b)
    }
}

/// Чи може ім'я агента пройти через канал без спотворення.
///
/// Довжина не обмежена, на відміну від імен маяків.
pub fn is_valid_agent_id(id: &str) -> bool {
    !id.is_empty() && id.is_ascii() && !id.contains([',', '\0', '\r', '\n'])
}

fn expect_fields(tag: &'static str, fields: &[&str], expected: usize) -> Result<(), WireError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(WireError::FieldCount {
            tag,
            expected,
            found: fields.len(),
        })
    }
}

fn parse_beacon_name(field: &str) -> Result<String, WireError> {
    if field.is_empty() || field.len() > MAX_BEACON_NAME_LEN || !field.is_ascii() {
        return Err(WireError::InvalidName(field.to_string()));
    }
    Ok(field.to_string())
}

fn parse_agent_id(field: &str) -> Result<String, WireError> {
    if !is_valid_agent_id(field) {
        return Err(WireError::InvalidName(field.to_string()));
    }
    Ok(field.to_string())
}

fn parse_coord(field: &'static str, value: &str) -> Result<f64, WireError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(WireError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_label(field: &str) -> Result<usize, WireError> {
    field
        .strip_prefix(LABEL_PREFIX)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| WireError::InvalidLabel(field.to_string()))
}
