//! Decodificação de payloads MQTT em [`AlertRecord`].
//!
//! Formato esperado no tópico:
//!
//! ```text
//! {"type": "collision", "message": "obstacle detected", ...}
//! ```
//!
//! Qualquer outra coisa (bytes fora de UTF-8, JSON inválido, JSON que não é
//! objeto) vira `{"message": <texto>}`. A decodificação nunca falha: um
//! payload malformado não pode derrubar a thread de rede.

use crate::record::AlertRecord;
use serde_json::Value;
use tracing::debug;

/// Decodifica um payload bruto. Função total e sem efeitos colaterais.
pub fn decode_payload(raw: &[u8]) -> AlertRecord {
    // UTF-8 inválido é substituído por U+FFFD: sempre há algum texto.
    let text = String::from_utf8_lossy(raw);

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => AlertRecord::from_map(map),
        Ok(other) => {
            debug!("Payload JSON não é objeto ({}), usando como mensagem", json_kind(&other));
            AlertRecord::message_only(text)
        }
        Err(e) => {
            debug!("Payload não é JSON válido: {e}");
            AlertRecord::message_only(text)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "número",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "objeto",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MESSAGE_KEY;
    use serde_json::json;

    #[test]
    fn json_object_keeps_all_fields() {
        let raw = br#"{"type":"collision","message":"obstacle detected","robot_id":4,"pose":{"x":1.5,"y":-2}}"#;
        let record = decode_payload(raw);
        let expected: Value = serde_json::from_slice(raw).unwrap();
        assert_eq!(&Value::Object(record.fields().clone()), &expected);
    }

    #[test]
    fn big_integers_keep_every_digit() {
        let raw = br#"{"type":"odom","message":"m","seq":12345678901234567890123}"#;
        let record = decode_payload(raw);
        assert_eq!(record.kind("unknown"), "odom");
        assert_eq!(
            record.get("seq").map(Value::to_string).as_deref(),
            Some("12345678901234567890123")
        );
    }

    #[test]
    fn numbers_beyond_f64_still_decode_as_object() {
        let raw = br#"{"type":"sensor","message":"m","v":1e400}"#;
        let record = decode_payload(raw);
        assert_eq!(record.display_text("unknown"), "[sensor] m");
        assert_eq!(record.get("v").map(Value::to_string).as_deref(), Some("1e400"));
    }

    #[test]
    fn plain_text_becomes_message() {
        let record = decode_payload(b"not-json");
        assert_eq!(record, AlertRecord::message_only("not-json"));
        assert_eq!(record.display_text("unknown"), "[unknown] not-json");
    }

    #[test]
    fn non_object_json_becomes_message() {
        let samples: [&[u8]; 5] = [b"42", b"[1,2,3]", b"\"texto\"", b"null", b"true"];
        for raw in samples {
            let record = decode_payload(raw);
            assert_eq!(record.fields().len(), 1);
            assert_eq!(
                record.get(MESSAGE_KEY),
                Some(&json!(String::from_utf8_lossy(raw)))
            );
        }
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let record = decode_payload(&[0x66, 0x6f, 0xff, 0xfe, 0x6f]);
        assert_eq!(record.message(), "fo\u{FFFD}\u{FFFD}o");
    }

    #[test]
    fn empty_payload_is_empty_message() {
        let record = decode_payload(b"");
        assert_eq!(record, AlertRecord::message_only(""));
    }

    #[test]
    fn never_fails_on_arbitrary_bytes() {
        let full = br#"{"type":"collision","message":"obstacle"}"#;
        for end in 0..full.len() {
            let record = decode_payload(&full[..end]);
            assert_eq!(
                record,
                AlertRecord::message_only(String::from_utf8_lossy(&full[..end]))
            );
        }

        // Sequências pseudo-aleatórias determinísticas (xorshift).
        let mut seed: u32 = 0x9E37_79B9;
        for len in 0..256 {
            let bytes: Vec<u8> = (0..len)
                .map(|_| {
                    seed ^= seed << 13;
                    seed ^= seed >> 17;
                    seed ^= seed << 5;
                    (seed & 0xFF) as u8
                })
                .collect();
            let record = decode_payload(&bytes);
            let text = String::from_utf8_lossy(&bytes);
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => assert_eq!(record.fields(), &map),
                _ => assert_eq!(record, AlertRecord::message_only(text)),
            }
        }
    }
}
