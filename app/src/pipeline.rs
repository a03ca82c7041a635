//! Sequência de uma consulta: valida, busca na API, achata e grava o CSV.
//!
//! ```text
//! Start → Validated → Fetched → Flattened → Persisted
//!   └──────────┴──────────┴──────────┴────→ Failed(ErrorKind)
//! ```
//!
//! Nenhuma etapa é repetida; qualquer falha encerra a consulta. O arquivo só é
//! criado depois que todas as etapas anteriores deram certo.

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::api::{FetchError, RegistryClient};
use crate::cnpj::Cnpj;
use crate::export::{PersistError, RowSink};
use crate::row::{self, HEADER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Validated,
    Fetched,
    Flattened,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nome = match self {
            Stage::Start => "start",
            Stage::Validated => "validated",
            Stage::Fetched => "fetched",
            Stage::Flattened => "flattened",
            Stage::Persisted => "persisted",
        };
        f.write_str(nome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidIdentifier,
    Transport,
    Decode,
    RemoteError,
    PersistError,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidIdentifier => 2,
            ErrorKind::Transport => 3,
            ErrorKind::Decode => 4,
            ErrorKind::RemoteError => 5,
            ErrorKind::PersistError => 6,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nome = match self {
            ErrorKind::InvalidIdentifier => "invalid-identifier",
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::RemoteError => "remote-error",
            ErrorKind::PersistError => "persist-error",
        };
        f.write_str(nome)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("CNPJ inválido: {input}")]
    InvalidIdentifier { input: String },

    #[error("Erro ao consultar CNPJ {cnpj}: {source}")]
    Fetch {
        cnpj: String,
        #[source]
        source: FetchError,
    },

    #[error("Erro ao salvar CSV: {0}")]
    Persist(#[from] PersistError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            PipelineError::Fetch { source, .. } => source.kind(),
            PipelineError::Persist(_) => ErrorKind::PersistError,
        }
    }

    /// Última etapa concluída antes da falha.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidIdentifier { .. } => Stage::Start,
            PipelineError::Fetch { .. } => Stage::Validated,
            PipelineError::Persist(_) => Stage::Flattened,
        }
    }
}

/// Resultado de uma consulta que chegou até `Persisted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consulta {
    pub cnpj: Cnpj,
    pub razao_social: String,
    pub arquivo: PathBuf,
}

pub struct Pipeline<C, S> {
    client: C,
    sink: S,
}

impl<C: RegistryClient, S: RowSink> Pipeline<C, S> {
    pub fn new(client: C, sink: S) -> Self {
        Self { client, sink }
    }

    pub async fn run(&self, input: &str) -> Result<Consulta, PipelineError> {
        let cnpj = Cnpj::parse(input).ok_or_else(|| PipelineError::InvalidIdentifier {
            input: input.to_string(),
        })?;
        debug!(stage = %Stage::Validated, cnpj = %cnpj);

        let empresa = self
            .client
            .consultar(&cnpj)
            .await
            .map_err(|source| PipelineError::Fetch {
                cnpj: cnpj.to_string(),
                source,
            })?;
        debug!(
            stage = %Stage::Fetched,
            nome = %empresa.nome,
            atividades = empresa.atividades.len(),
            socios = empresa.qsa.len()
        );

        let linha = row::flatten(&empresa);
        debug!(stage = %Stage::Flattened, colunas = linha.fields().len());

        let arquivo = self.sink.persist(&HEADER, &linha)?;
        debug!(stage = %Stage::Persisted, arquivo = %arquivo.display());

        Ok(Consulta {
            cnpj,
            razao_social: empresa.nome,
            arquivo,
        })
    }
}
