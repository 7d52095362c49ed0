//! Registro de alerta decodificado.
//!
//! Um [`AlertRecord`] é um mapa livre de chave → valor JSON. Convencionalmente
//! traz `type` e `message`, mas nenhum campo é obrigatório: a ausência é
//! resolvida na hora de exibir, nunca na construção.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chave do tipo de alerta (ex: `"collision"`).
pub const TYPE_KEY: &str = "type";
/// Chave do texto do alerta.
pub const MESSAGE_KEY: &str = "message";
/// Rótulo padrão quando o alerta não informa `type`.
pub const DEFAULT_UNKNOWN_LABEL: &str = "unknown";

/// Alerta recebido do robô.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertRecord {
    fields: Map<String, Value>,
}

impl AlertRecord {
    /// Cria um registro a partir de um objeto JSON já parseado.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Registro de uma chave só: `{"message": text}`.
    pub fn message_only(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_KEY.into(), Value::String(text.into()));
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Tipo do alerta, ou `unknown_label` se ausente/nulo.
    pub fn kind(&self, unknown_label: &str) -> String {
        self.text_field(TYPE_KEY)
            .unwrap_or_else(|| unknown_label.to_string())
    }

    /// Texto do alerta, ou string vazia se ausente/nulo.
    pub fn message(&self) -> String {
        self.text_field(MESSAGE_KEY).unwrap_or_default()
    }

    /// Texto exibido na notificação: `[<tipo>] <mensagem>`.
    pub fn display_text(&self, unknown_label: &str) -> String {
        format!("[{}] {}", self.kind(unknown_label), self.message())
    }

    // Strings aparecem sem aspas; demais valores em JSON compacto.
    fn text_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> AlertRecord {
        match value {
            Value::Object(map) => AlertRecord::from_map(map),
            _ => panic!("esperado objeto JSON"),
        }
    }

    #[test]
    fn display_with_type_and_message() {
        let r = record(json!({"type": "collision", "message": "obstacle detected"}));
        assert_eq!(r.display_text("unknown"), "[collision] obstacle detected");
    }

    #[test]
    fn missing_type_uses_label() {
        let r = record(json!({"message": "low battery"}));
        assert_eq!(r.display_text("unknown"), "[unknown] low battery");
        assert_eq!(r.display_text("desconhecido"), "[desconhecido] low battery");
    }

    #[test]
    fn missing_message_is_empty() {
        let r = record(json!({"type": "estop"}));
        assert_eq!(r.display_text("unknown"), "[estop] ");
    }

    #[test]
    fn null_type_counts_as_missing() {
        let r = record(json!({"type": null, "message": "x"}));
        assert_eq!(r.kind("unknown"), "unknown");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let r = record(json!({"type": 3, "message": {"code": 7}}));
        assert_eq!(r.display_text("unknown"), r#"[3] {"code":7}"#);
    }

    #[test]
    fn message_only_has_single_key() {
        let r = AlertRecord::message_only("not-json");
        assert_eq!(r.fields().len(), 1);
        assert_eq!(r.get(MESSAGE_KEY), Some(&json!("not-json")));
    }

    #[test]
    fn serializes_as_plain_object() {
        let r = record(json!({"type": "collision", "message": "m", "robot": 2}));
        let text = serde_json::to_string(&r).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({"type": "collision", "message": "m", "robot": 2}));
    }
}
