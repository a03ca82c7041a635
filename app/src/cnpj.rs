use std::fmt;

pub const CNPJ_LEN: usize = 14;

/// CNPJ já limpo e com dígitos verificadores conferidos.
///
/// Só é construído via [`Cnpj::parse`], então quem recebe um `Cnpj` não precisa
/// validar de novo. Zeros à esquerda fazem parte do identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cnpj(String);

impl Cnpj {
    pub fn parse(raw: &str) -> Option<Self> {
        let limpo = limpar(raw);
        if validar(&limpo) {
            Some(Self(limpo))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn formatado(&self) -> String {
        formatar(&self.0)
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove pontuação e qualquer caractere que não seja dígito ASCII.
pub fn limpar(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Confere tamanho, sequência repetida e os dois dígitos verificadores.
///
/// Espera a entrada já limpa; qualquer coisa fora do formato falha no tamanho.
pub fn validar(limpo: &str) -> bool {
    let digitos: Vec<u32> = limpo.chars().filter_map(|c| c.to_digit(10)).collect();

    if limpo.len() != CNPJ_LEN || digitos.len() != CNPJ_LEN {
        return false;
    }

    if digitos.iter().all(|&d| d == digitos[0]) {
        return false;
    }

    digito_verificador(&digitos[..12], 5) == digitos[12]
        && digito_verificador(&digitos[..13], 6) == digitos[13]
}

/// Soma ponderada módulo 11. O peso começa em `peso_inicial`, decresce a cada
/// dígito e volta para 9 depois do 2.
fn digito_verificador(digitos: &[u32], peso_inicial: u32) -> u32 {
    let mut peso = peso_inicial;
    let mut soma = 0;

    for &d in digitos {
        soma += d * peso;
        peso = if peso == 2 { 9 } else { peso - 1 };
    }

    match soma % 11 {
        resto if resto < 2 => 0,
        resto => 11 - resto,
    }
}

/// Formata como `XX.XXX.XXX/XXXX-XX`. Entradas que não têm 14 dígitos voltam sem alteração.
pub fn formatar(cnpj: &str) -> String {
    if cnpj.len() != CNPJ_LEN || !cnpj.chars().all(|c| c.is_ascii_digit()) {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &cnpj[0..2],
        &cnpj[2..5],
        &cnpj[5..8],
        &cnpj[8..12],
        &cnpj[12..14]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limpar_keeps_only_digits() {
        assert_eq!(limpar("11.222.333/0001-81"), "11222333000181");
        assert_eq!(limpar(" a1b2c3 "), "123");
        assert_eq!(limpar("ação-٣"), "");
        assert_eq!(limpar(""), "");
    }

    #[test]
    fn limpar_output_is_digits_only() {
        for raw in ["12.345/6789-0", "xx", "0\t0\n0", "９９"] {
            assert!(limpar(raw).chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn known_valid_cnpjs() {
        assert!(validar("11222333000181"));
        assert!(validar("00000000000191"));
    }

    #[test]
    fn mutating_last_digit_invalidates() {
        for d in (0..=9).filter(|&d| d != 1) {
            let candidato = format!("1122233300018{}", d);
            assert!(!validar(&candidato), "{} não deveria validar", candidato);
        }
    }

    #[test]
    fn mutating_first_check_digit_invalidates() {
        assert!(!validar("11222333000191"));
    }

    #[test]
    fn repeated_digits_are_rejected() {
        for d in 0..=9 {
            let repetido = d.to_string().repeat(CNPJ_LEN);
            assert!(!validar(&repetido));
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(!validar(""));
        assert!(!validar("1122233300018"));
        assert!(!validar("112223330001810"));
        assert!(!validar("11.222.333/0001-81"));
    }

    #[test]
    fn validar_is_deterministic() {
        for s in ["11222333000181", "11222333000182", "abc", "00000000000000"] {
            assert_eq!(validar(s), validar(s));
        }
    }

    #[test]
    fn check_digit_weights_wrap_from_two_to_nine() {
        // 1 na posição 4 recebe peso 9 no primeiro dígito (5,4,3,2,9,...)
        let digitos = [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(digito_verificador(&digitos, 5), 11 - 9);
    }

    #[test]
    fn parse_cleans_and_validates() {
        let cnpj = Cnpj::parse("11.222.333/0001-81").expect("cnpj válido");
        assert_eq!(cnpj.as_str(), "11222333000181");
        assert_eq!(cnpj.to_string(), "11222333000181");
        assert_eq!(cnpj.formatado(), "11.222.333/0001-81");
        assert!(Cnpj::parse("00.000.000/0000-00").is_none());
    }

    #[test]
    fn formatar_renders_mask() {
        assert_eq!(formatar("11222333000181"), "11.222.333/0001-81");
        assert_eq!(formatar("123"), "123");
    }
}
