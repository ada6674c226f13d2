// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// Os arquivos de tradução vão embutidos no binário
const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Dicionário de mensagens por idioma ("en" -> { "auth.invalid_token" -> "..." }).
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> anyhow::Result<Self> {
        let mut translations = HashMap::new();
        for (lang, raw) in sources {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Arquivo de tradução '{}' inválido: {}", lang, e))?;
            translations.insert(lang.to_string(), messages);
        }
        Ok(Self { translations })
    }

    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_sources(EMBEDDED.iter().copied())
    }

    /// Busca a mensagem no idioma pedido, cai para o inglês e, por fim, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Igual ao `translate`, substituindo `{nome}` pelos parâmetros.
    pub fn format(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in params {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.translations
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_files_share_the_same_keys() {
        let store = I18nStore::embedded().unwrap();
        let en = &store.translations["en"];
        let pt = &store.translations["pt"];
        let mut missing: Vec<&String> = en.keys().filter(|k| !pt.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "faltando em pt.json: {:?}", missing);
    }

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::from_sources([
            ("en", r#"{"a": "Hello", "b": "Bye"}"#),
            ("pt", r#"{"a": "Olá"}"#),
        ])
        .unwrap();

        assert_eq!(store.translate("pt", "a"), "Olá");
        assert_eq!(store.translate("pt", "b"), "Bye");
        assert_eq!(store.translate("fr", "a"), "Hello");
        assert_eq!(store.translate("pt", "missing.key"), "missing.key");
    }

    #[test]
    fn format_replaces_placeholders() {
        let store = I18nStore::embedded().unwrap();
        let msg = store.format(
            "pt",
            "transition.invalid",
            &[("from", "past".into()), ("to", "upcoming".into())],
        );
        assert_eq!(msg, "Não é possível mudar o status de 'past' para 'upcoming'.");
    }

    #[test]
    fn rejects_malformed_source() {
        assert!(I18nStore::from_sources([("en", "{not json")]).is_err());
    }
}
