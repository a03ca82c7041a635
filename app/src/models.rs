use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sócio do QSA. A ReceitaWS não garante um esquema fixo, então guardamos os
/// atributos como vieram.
pub type Socio = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atividade {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// Dados cadastrais de uma empresa como a ReceitaWS devolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empresa {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cnpj: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fantasia: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub abertura: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub situacao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_situacao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub motivo_situacao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub situacao_especial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_situacao_especial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub natureza_juridica: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logradouro: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub numero: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub complemento: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bairro: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cep: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub municipio: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uf: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub telefone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capital_social: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub porte: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub efr: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub atividades: Vec<Atividade>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qsa: Vec<Socio>,
}

/// Envelope da resposta: `status` indica se `empresa` é utilizável.
#[derive(Debug, Clone, Deserialize)]
pub struct RespostaReceita {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub empresa: Empresa,
}

impl RespostaReceita {
    pub const STATUS_ERRO: &'static str = "ERROR";

    pub fn is_erro(&self) -> bool {
        self.status == Self::STATUS_ERRO
    }
}

// `null` vale o mesmo que campo ausente
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_receitaws_payload() {
        let json = r#"{
            "status": "OK",
            "cnpj": "11.222.333/0001-81",
            "nome": "ACME LTDA",
            "atividade_principal": [{"code": "62.01-5-01", "text": "Desenvolvimento de software"}],
            "atividades": [{"code": "62.01-5-01", "text": "Desenvolvimento de software"}],
            "qsa": [{"nome": "FULANO", "qual": "49-Sócio-Administrador"}],
            "billing": {"free": true, "database": true}
        }"#;
        let resposta: RespostaReceita = serde_json::from_str(json).unwrap();
        assert!(!resposta.is_erro());
        assert_eq!(resposta.empresa.nome, "ACME LTDA");
        assert_eq!(resposta.empresa.atividades.len(), 1);
        assert_eq!(resposta.empresa.qsa[0]["nome"], "FULANO");
        assert_eq!(resposta.empresa.fantasia, "");
    }

    #[test]
    fn null_fields_become_empty() {
        let json = r#"{"status": "OK", "nome": null, "qsa": null, "atividades": null}"#;
        let resposta: RespostaReceita = serde_json::from_str(json).unwrap();
        assert_eq!(resposta.empresa.nome, "");
        assert!(resposta.empresa.qsa.is_empty());
        assert!(resposta.empresa.atividades.is_empty());
    }

    #[test]
    fn error_envelope_carries_message() {
        let json = r#"{"status": "ERROR", "message": "CNPJ inválido"}"#;
        let resposta: RespostaReceita = serde_json::from_str(json).unwrap();
        assert!(resposta.is_erro());
        assert_eq!(resposta.message.as_deref(), Some("CNPJ inválido"));
    }
}
