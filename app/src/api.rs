use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use tracing::debug;

use crate::cnpj::Cnpj;
use crate::config::Settings;
use crate::models::{Empresa, RespostaReceita};
use crate::pipeline::ErrorKind;

/// Limite documentado do plano gratuito da ReceitaWS.
pub const LIMITE_PLANO_GRATUITO: &str = "3 consultas por minuto";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("erro ao fazer requisição: {0}")]
    Transport(String),

    #[error("erro na API: status {status}")]
    HttpStatus { status: u16 },

    #[error("limite de consultas atingido (HTTP 429), {}", orientacao_retry(.retry_after))]
    RateLimited { retry_after: Option<String> },

    #[error("erro ao decodificar resposta: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("erro na consulta: {message}")]
    Remote { message: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_)
            | FetchError::HttpStatus { .. }
            | FetchError::RateLimited { .. } => ErrorKind::Transport,
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::Remote { .. } => ErrorKind::RemoteError,
        }
    }
}

fn orientacao_retry(retry_after: &Option<String>) -> String {
    match retry_after {
        Some(segundos) => format!("tente novamente em {} segundo(s)", segundos),
        None => format!("aguarde antes de tentar novamente ({})", LIMITE_PLANO_GRATUITO),
    }
}

/// Consulta de dados cadastrais por CNPJ.
///
/// O pipeline só depende deste contrato, o que permite trocar o cliente HTTP
/// por um substituto nos testes.
#[async_trait]
pub trait RegistryClient {
    async fn consultar(&self, cnpj: &Cnpj) -> Result<Empresa, FetchError>;
}

pub struct ReceitaWsClient {
    http: reqwest::Client,
    settings: Settings,
}

impl ReceitaWsClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()
            .context("Falha ao criar cliente HTTP")?;

        Ok(Self {
            http,
            settings: settings.clone(),
        })
    }
}

#[async_trait]
impl RegistryClient for ReceitaWsClient {
    async fn consultar(&self, cnpj: &Cnpj) -> Result<Empresa, FetchError> {
        let url = self.settings.lookup_url(cnpj.as_str());
        debug!(%url, timeout = ?self.settings.timeout, "consultando ReceitaWS");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(descrever(&e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(descrever(&e)))?;

        debug!(status = status.as_u16(), bytes = body.len(), "resposta recebida");
        interpretar_resposta(status, retry_after.as_deref(), &body)
    }
}

fn descrever(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("tempo limite excedido ({})", e)
    } else {
        e.to_string()
    }
}

/// Converte status HTTP + corpo em dados da empresa ou no erro correspondente.
pub fn interpretar_resposta(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> Result<Empresa, FetchError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited {
            retry_after: retry_after.map(str::to_string),
        });
    }

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let resposta: RespostaReceita = serde_json::from_str(body)?;

    if resposta.is_erro() {
        return Err(FetchError::Remote {
            message: resposta
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "erro não especificado pela API".to_string()),
        });
    }

    Ok(resposta.empresa)
}
