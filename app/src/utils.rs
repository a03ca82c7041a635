use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// `empresas_cnpj_20240131_154500`
pub fn timestamped_stem(prefix: &str, quando: &DateTime<Local>) -> String {
    format!("{}_{}", prefix, quando.format("%Y%m%d_%H%M%S"))
}

/// Cria `dir/stem.ext` sem sobrescrever nada: se já existir, tenta `stem_1.ext`,
/// `stem_2.ext` e assim por diante.
pub fn create_unique_file(dir: &Path, stem: &str, ext: &str) -> io::Result<(File, PathBuf)> {
    let mut sufixo = 0u32;
    loop {
        let nome = if sufixo == 0 {
            format!("{}.{}", stem, ext)
        } else {
            format!("{}_{}.{}", stem, sufixo, ext)
        };
        let caminho = dir.join(nome);

        match OpenOptions::new().write(true).create_new(true).open(&caminho) {
            Ok(file) => return Ok((file, caminho)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => sufixo += 1,
            Err(e) => return Err(e),
        }
    }
}
