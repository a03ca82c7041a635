use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::row::FlatRow;
use crate::utils;

pub const PREFIXO_ARQUIVO: &str = "empresas_cnpj";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("erro ao criar arquivo em {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("erro ao escrever {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Destino da linha achatada: recebe o cabeçalho e exatamente uma linha.
pub trait RowSink {
    fn persist(&self, header: &[&str], row: &FlatRow) -> Result<PathBuf, PersistError>;
}

pub struct CsvExporter {
    dir: PathBuf,
    delimiter: u8,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            dir: dir.into(),
            delimiter,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.output_dir.clone(), settings.delimiter)
    }

    fn escrever<W: io::Write>(
        &self,
        destino: W,
        header: &[&str],
        row: &FlatRow,
    ) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(destino);

        writer.write_record(header)?;
        writer.write_record(row.fields())?;
        writer.flush()?;
        Ok(())
    }

    /// Grava em `destino`, que corresponde ao arquivo `path`. Se a escrita falhar o
    /// arquivo incompleto é apagado.
    fn gravar<W: io::Write>(
        &self,
        destino: W,
        path: PathBuf,
        header: &[&str],
        row: &FlatRow,
    ) -> Result<PathBuf, PersistError> {
        if let Err(source) = self.escrever(destino, header, row) {
            if let Err(e) = fs::remove_file(&path) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "não foi possível remover arquivo parcial"
                );
            }
            return Err(PersistError::Write { path, source });
        }
        Ok(path)
    }
}

impl RowSink for CsvExporter {
    fn persist(&self, header: &[&str], row: &FlatRow) -> Result<PathBuf, PersistError> {
        let erro_criacao = |path: &Path, source| PersistError::Create {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|e| erro_criacao(&self.dir, e))?;

        let stem = utils::timestamped_stem(PREFIXO_ARQUIVO, &Local::now());
        let (file, path) = utils::create_unique_file(&self.dir, &stem, "csv")
            .map_err(|e| erro_criacao(&self.dir, e))?;
        debug!(path = %path.display(), "arquivo CSV criado");

        self.gravar(file, path, header, row)
    }
}
