use super::ChatProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;
use crate::config::{Provider, ProviderConfig};
use crate::core::error::HomechatError;
use std::collections::HashMap;

type ProviderCreator =
    Box<dyn Fn(&ProviderConfig) -> Result<Box<dyn ChatProvider>, HomechatError> + Send + Sync>;

pub struct ProviderFactory {
    creators: HashMap<Provider, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            Provider::Ollama,
            Box::new(|config: &ProviderConfig| {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| Provider::Ollama.default_model().to_string());
                let provider = match &config.base_url {
                    Some(base_url) => OllamaProvider::with_endpoint(base_url.clone(), model),
                    None => OllamaProvider::new(model),
                };
                Ok(Box::new(provider) as Box<dyn ChatProvider>)
            }) as ProviderCreator,
        );

        creators.insert(
            Provider::OpenAI,
            Box::new(|config: &ProviderConfig| {
                if config.api_key.is_none() {
                    return Err(HomechatError::Config(
                        "openai requires an api_key (config file or OPENAI_API_KEY)".to_string(),
                    ));
                }
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| Provider::OpenAI.default_model().to_string());
                let provider = match &config.base_url {
                    Some(base_url) => {
                        OpenAIProvider::with_endpoint(base_url.clone(), config.api_key.clone(), model)
                    }
                    None => OpenAIProvider::new(config.api_key.clone(), model),
                };
                Ok(Box::new(provider) as Box<dyn ChatProvider>)
            }) as ProviderCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        provider: &Provider,
        config: &ProviderConfig,
    ) -> Result<Box<dyn ChatProvider>, HomechatError> {
        self.creators
            .get(provider)
            .ok_or_else(|| HomechatError::Config(format!("Provider not found: {}", provider)))
            .and_then(|creator| creator(config))
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_ollama_with_configured_model() {
        let config = ProviderConfig {
            model: Some("qwen2.5".into()),
            ..Default::default()
        };
        let provider = ProviderFactory::new().create(&Provider::Ollama, &config).unwrap();
        assert_eq!(provider.model(), "qwen2.5");
    }

    #[test]
    fn openai_without_key_is_rejected() {
        let result = ProviderFactory::new().create(&Provider::OpenAI, &ProviderConfig::default());
        assert!(matches!(result, Err(HomechatError::Config(_))));
    }
}
