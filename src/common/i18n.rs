// src/common/i18n.rs

use std::{collections::HashMap, sync::LazyLock};

use crate::middleware::i18n::Locale;

/// Idioma usado quando o navegador pede algo que não temos.
pub const FALLBACK_LANG: &str = "pt";

static SHARED: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

// Catálogo de mensagens de erro (chave estável -> texto)
const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("sector_name_required", "Nome é obrigatório."),
    ("member_required", "Selecione um membro."),
    ("self_parent", "Um setor não pode ser o seu próprio setor pai."),
    ("cyclic_parent", "Não é possível mover o setor para dentro de um dos seus sub-setores."),
    ("parent_not_found", "O setor pai informado não existe."),
    ("sector_not_found", "Setor não encontrado."),
    ("confirmation_required", "Esta ação precisa ser confirmada."),
    ("operation_pending", "Aguarde a conclusão da operação em andamento."),
    ("session_expired", "Sua sessão expirou. Faça login novamente."),
    ("upstream_failure", "Não foi possível concluir a operação."),
    ("network_failure", "Falha de comunicação com o servidor."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("login_required", "Faça login para acessar o painel."),
];

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("sector_name_required", "Name is required."),
    ("member_required", "Select a member."),
    ("self_parent", "A sector cannot be its own parent."),
    ("cyclic_parent", "A sector cannot be moved under one of its own sub-sectors."),
    ("parent_not_found", "The selected parent sector does not exist."),
    ("sector_not_found", "Sector not found."),
    ("confirmation_required", "This action must be confirmed."),
    ("operation_pending", "Wait for the pending operation to finish."),
    ("session_expired", "Your session has expired. Please sign in again."),
    ("upstream_failure", "The operation could not be completed."),
    ("network_failure", "Could not reach the server."),
    ("internal_error", "An unexpected error occurred."),
    ("login_required", "Sign in to access the dashboard."),
];

pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("pt", PT.iter().copied().collect());
        catalogs.insert("en", EN.iter().copied().collect());
        Self { catalogs }
    }

    /// Instância global, para respostas geradas fora de um handler.
    pub fn shared() -> &'static I18nStore {
        &SHARED
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    /// Traduz a chave, caindo para o português e depois para a própria chave.
    pub fn translate(&self, locale: &Locale, key: &str) -> String {
        self.catalogs
            .get(locale.0.as_str())
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.catalogs.get(FALLBACK_LANG).and_then(|c| c.get(key)))
            .map(|text| text.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate(&Locale("de".into()), "sector_name_required"),
            "Nome é obrigatório."
        );
        assert_eq!(store.translate(&Locale("en".into()), "member_required"), "Select a member.");
        assert_eq!(store.translate(&Locale::default(), "nope"), "nope");
    }

    #[test]
    fn catalogs_have_the_same_keys() {
        let pt: Vec<_> = PT.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(pt, en);
    }
}
