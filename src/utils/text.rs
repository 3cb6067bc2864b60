//! Text normalization helpers (Portuguese diacritics, file-name slugs).

/// Replace Portuguese accented letters with their plain ASCII counterpart.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// File-name slug for an entity name: "São Gonçalo do Amarante" -> "Sao_Goncalo_do_Amarante".
pub fn slug(name: &str) -> String {
    let plain = fold_diacritics(name);
    plain
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Ensino Médio"), "Ensino Medio");
        assert_eq!(fold_diacritics("Ceará São João"), "Ceara Sao Joao");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("São Gonçalo do Amarante"), "Sao_Goncalo_do_Amarante");
        assert_eq!(slug("Pau D'Arco"), "Pau_DArco");
        assert_eq!(slug("A/B"), "A_B");
    }
}
