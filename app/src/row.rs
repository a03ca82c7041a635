use crate::models::{Atividade, Empresa};

pub const NUM_COLUNAS: usize = 26;

pub const HEADER: [&str; NUM_COLUNAS] = [
    "CNPJ",
    "Razão Social",
    "Nome Fantasia",
    "Data Abertura",
    "Situação Cadastral",
    "Data Situação",
    "Motivo Situação",
    "Situação Especial",
    "Data Situação Especial",
    "CNAE Principal",
    "Descrição CNAE Principal",
    "Total Atividades",
    "Natureza Jurídica",
    "Logradouro",
    "Número",
    "Complemento",
    "Bairro",
    "CEP",
    "Município",
    "UF",
    "Telefone",
    "Email",
    "Capital Social",
    "Porte",
    "Qtd Sócios",
    "EFR",
];

/// Uma linha do CSV, na mesma ordem de [`HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow([String; NUM_COLUNAS]);

impl FlatRow {
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, coluna: usize) -> Option<&str> {
        self.0.get(coluna).map(String::as_str)
    }

    pub fn coluna(&self, nome: &str) -> Option<&str> {
        HEADER.iter().position(|h| *h == nome).and_then(|i| self.get(i))
    }
}

/// CNAE principal: a primeira atividade da lista, ou par vazio.
pub fn cnae_principal(atividades: &[Atividade]) -> (String, String) {
    atividades
        .first()
        .map(|a| (a.code.clone(), a.text.clone()))
        .unwrap_or_default()
}

/// Achata o cadastro numa linha. Valores são copiados sem nenhuma normalização.
pub fn flatten(empresa: &Empresa) -> FlatRow {
    let (cnae_code, cnae_desc) = cnae_principal(&empresa.atividades);

    FlatRow([
        empresa.cnpj.clone(),
        empresa.nome.clone(),
        empresa.fantasia.clone(),
        empresa.abertura.clone(),
        empresa.situacao.clone(),
        empresa.data_situacao.clone(),
        empresa.motivo_situacao.clone(),
        empresa.situacao_especial.clone(),
        empresa.data_situacao_especial.clone(),
        cnae_code,
        cnae_desc,
        empresa.atividades.len().to_string(),
        empresa.natureza_juridica.clone(),
        empresa.logradouro.clone(),
        empresa.numero.clone(),
        empresa.complemento.clone(),
        empresa.bairro.clone(),
        empresa.cep.clone(),
        empresa.municipio.clone(),
        empresa.uf.clone(),
        empresa.telefone.clone(),
        empresa.email.clone(),
        empresa.capital_social.clone(),
        empresa.porte.clone(),
        empresa.qsa.len().to_string(),
        empresa.efr.clone(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Socio;

    fn atividade(code: &str, text: &str) -> Atividade {
        Atividade {
            code: code.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn no_activities_gives_empty_cnae_and_zero_count() {
        let row = flatten(&Empresa::default());
        assert_eq!(row.coluna("CNAE Principal"), Some(""));
        assert_eq!(row.coluna("Descrição CNAE Principal"), Some(""));
        assert_eq!(row.coluna("Total Atividades"), Some("0"));
        assert_eq!(row.coluna("Qtd Sócios"), Some("0"));
    }

    #[test]
    fn first_activity_is_primary() {
        let empresa = Empresa {
            atividades: vec![
                atividade("62.01-5-01", "Desenvolvimento de programas"),
                atividade("62.04-0-00", "Consultoria em TI"),
                atividade("63.11-9-00", "Tratamento de dados"),
            ],
            ..Empresa::default()
        };
        let row = flatten(&empresa);
        assert_eq!(row.get(9), Some("62.01-5-01"));
        assert_eq!(row.get(10), Some("Desenvolvimento de programas"));
        assert_eq!(row.get(11), Some("3"));
    }

    #[test]
    fn partner_count_ignores_partner_shape() {
        let mut irregular = Socio::new();
        irregular.insert("qualquer".into(), serde_json::json!(42));
        let empresa = Empresa {
            qsa: vec![Socio::new(), irregular, Socio::new()],
            ..Empresa::default()
        };
        assert_eq!(flatten(&empresa).coluna("Qtd Sócios"), Some("3"));
    }

    #[test]
    fn scalar_fields_pass_through_in_header_order() {
        let empresa = Empresa {
            cnpj: "11.222.333/0001-81".into(),
            nome: "ACME LTDA".into(),
            abertura: "01/02/2003".into(),
            cep: "01.001-000".into(),
            uf: "SP".into(),
            efr: "*****".into(),
            ..Empresa::default()
        };
        let row = flatten(&empresa);
        assert_eq!(row.fields().len(), HEADER.len());
        assert_eq!(row.get(0), Some("11.222.333/0001-81"));
        assert_eq!(row.get(1), Some("ACME LTDA"));
        assert_eq!(row.coluna("Data Abertura"), Some("01/02/2003"));
        assert_eq!(row.coluna("CEP"), Some("01.001-000"));
        assert_eq!(row.coluna("UF"), Some("SP"));
        assert_eq!(row.get(25), Some("*****"));
    }
}
