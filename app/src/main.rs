use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use consulta_cnpj::api::ReceitaWsClient;
use consulta_cnpj::config::{self, Settings};
use consulta_cnpj::export::CsvExporter;
use consulta_cnpj::pipeline::{Pipeline, PipelineError};
use consulta_cnpj::ui;

#[derive(Parser)]
#[command(name = "consulta-cnpj", version)]
#[command(about = "Consulta um CNPJ na ReceitaWS e salva os dados em CSV", long_about = None)]
#[command(after_help = concat!(
    "Exemplo: consulta-cnpj 11.222.333/0001-81\n\n",
    "API utilizada: ReceitaWS (https://receitaws.com.br/)\n",
    "Nota: a API gratuita tem limitações de taxa (3 consultas por minuto)"
))]
struct Cli {
    /// CNPJ a consultar, com ou sem pontuação
    cnpj: String,

    /// URL base da API
    #[arg(long, env = "CNPJ_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Tempo limite da requisição, em segundos
    #[arg(long, env = "CNPJ_TIMEOUT", default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Pasta onde o CSV será salvo (padrão: diretório atual)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Separador de campos do CSV
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Modo silencioso (menos saída)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Modo verboso (mais detalhes)
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() && !b.is_ascii_alphanumeric() && *b != b'"' => Ok(*b),
        _ => Err(format!(
            "separador deve ser um único caractere ASCII não alfanumérico: {:?}",
            s
        )),
    }
}

fn init_tracing(verbose: bool) {
    let padrao = if verbose { "consulta_cnpj=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(padrao));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let output_dir = match cli.output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Erro ao obter diretório atual")?,
    };

    let settings = Settings {
        api_url: cli.api_url,
        timeout: Duration::from_secs(cli.timeout),
        output_dir,
        delimiter: cli.delimiter,
        ..Settings::default()
    };

    ui::print_header(&format!("🔎 Consulta do CNPJ {} via ReceitaWS", cli.cnpj));
    ui::print_verbose(&format!("API: {}", settings.api_url));
    ui::print_verbose(&format!("Tempo limite: {}s", settings.timeout.as_secs()));
    ui::print_verbose(&format!("Pasta de saída: {}", settings.output_dir.display()));

    let client = ReceitaWsClient::new(&settings)?;
    let pipeline = Pipeline::new(client, CsvExporter::from_settings(&settings));

    let spinner = ui::spinner("Consultando ReceitaWS...");
    let resultado = pipeline.run(&cli.cnpj).await;
    spinner.finish_and_clear();
    let consulta = resultado?;

    ui::print_success(&format!(
        "Sucesso: {} - {}",
        consulta.cnpj.formatado(),
        consulta.razao_social
    ));
    ui::print_info(&format!("Arquivo salvo em: {}", consulta.arquivo.display()));
    let arquivo = consulta.arquivo.display().to_string();
    ui::print_quiet_result(&[consulta.razao_social.as_str(), arquivo.as_str()]);
    ui::print_info("Colunas disponíveis no CSV:");
    ui::print_list(&[
        "Dados básicos: CNPJ, Razão Social, Nome Fantasia, Data Abertura",
        "Situação: Situação Cadastral, Data Situação, Motivo",
        "Atividade: CNAE Principal, Descrição, Total de Atividades",
        "Endereço: Logradouro, Número, Bairro, CEP, Município, UF",
        "Contato: Telefone, Email",
        "Outros: Capital Social, Porte, Quantidade de Sócios, Natureza Jurídica",
    ]);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    ui::init(cli.quiet, cli.verbose);
    init_tracing(cli.verbose);

    let err = match run(cli).await {
        Ok(()) => return ExitCode::SUCCESS,
        Err(err) => err,
    };

    match err.downcast_ref::<PipelineError>() {
        Some(falha) => {
            // A mensagem já inclui a causa
            ui::print_error(&falha.to_string());
            tracing::debug!(
                kind = %falha.kind(),
                stage = %falha.stage(),
                "consulta encerrada com erro"
            );
            ExitCode::from(falha.kind().exit_code())
        }
        None => {
            ui::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
