use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://receitaws.com.br/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("consulta-cnpj/", env!("CARGO_PKG_VERSION"));

/// Configuração de uma execução. Montada pela CLI e passada explicitamente ao
/// cliente HTTP e ao exportador.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub output_dir: PathBuf,
    pub delimiter: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            output_dir: PathBuf::from("."),
            delimiter: b',',
        }
    }
}

impl Settings {
    /// URL de consulta de um CNPJ já limpo.
    pub fn lookup_url(&self, digitos: &str) -> String {
        format!("{}/cnpj/{}", self.api_url.trim_end_matches('/'), digitos)
    }
}
