use domain::{Message, MessageKind, Participant, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub name: String,
    /// Unix 毫秒时间戳
    #[serde(rename = "lastSeen")]
    pub last_seen: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.as_str().to_owned(),
            last_seen: unix_millis(participant.last_seen),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(with = "time::serde::rfc3339")]
    pub time: Timestamp,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            from: message.from.clone(),
            to: message.to.clone(),
            text: message.text.clone(),
            kind: message.kind,
            time: message.time,
        }
    }
}

fn unix_millis(at: Timestamp) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{NewMessage, ParticipantName, EVERYONE};
    use time::macros::datetime;

    #[test]
    fn participant_dto_uses_millis() {
        let participant = Participant::new(
            ParticipantName::parse("ana").unwrap(),
            datetime!(2024-01-01 00:00:01.250 UTC),
        );
        let dto = ParticipantDto::from(&participant);
        assert_eq!(dto.last_seen, 1_704_067_201_250);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["lastSeen"], 1_704_067_201_250_i64);
        assert_eq!(json["name"], "ana");
    }

    #[test]
    fn participant_dto_handles_latest_representable_time() {
        let participant = Participant::new(
            ParticipantName::parse("ana").unwrap(),
            datetime!(9999-12-31 23:59:59.999 UTC),
        );
        assert_eq!(ParticipantDto::from(&participant).last_seen, 253_402_300_799_999);
    }

    #[test]
    fn message_dto_serializes_wire_names() {
        let message = NewMessage::new("ana", EVERYONE, "oi", MessageKind::PrivateMessage)
            .stamp(datetime!(2024-01-01 12:00:00 UTC));
        let json = serde_json::to_value(MessageDto::from(&message)).unwrap();
        assert_eq!(json["type"], "private_message");
        assert_eq!(json["to"], "Todos");
        assert_eq!(json["time"], "2024-01-01T12:00:00Z");
    }
}
