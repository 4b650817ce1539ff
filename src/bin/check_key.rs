//! Checks that the configured model API key works.

use agency_strategist::config::Config;
use agency_strategist::llm::{ChatMessage, LlmClient, OpenAiClient};
use tracing_subscriber::EnvFilter;

const PROBE_MESSAGE: &str = "Hola, esta es una prueba.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "agency_strategist=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let client = OpenAiClient::new(&config.llm)?;

    let reply = check_key(&client, &config.llm.model).await?;
    println!("La clave API funciona correctamente!");
    println!("Respuesta: {}", reply);
    Ok(())
}

/// Send one short message and return the model's reply.
async fn check_key(client: &dyn LlmClient, model: &str) -> anyhow::Result<String> {
    let messages = [ChatMessage::user(PROBE_MESSAGE)];
    match client.chat_completion(model, &messages, None).await {
        Ok(response) => Ok(response.content.unwrap_or_default()),
        Err(e) => {
            println!("Error con la clave API: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_strategist::llm::{ChatResponse, LlmError, ToolSchema};
    use async_trait::async_trait;

    struct FixedReply(Result<&'static str, u16>);

    #[async_trait]
    impl LlmClient for FixedReply {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: Option<&[ToolSchema]>,
        ) -> Result<ChatResponse, LlmError> {
            assert_eq!(messages[0].content.as_deref(), Some(PROBE_MESSAGE));
            match self.0 {
                Ok(text) => Ok(ChatResponse::text(text)),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "Incorrect API key provided".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn working_key_returns_the_reply() {
        let reply = check_key(&FixedReply(Ok("Hola")), "gpt-3.5-turbo").await.unwrap();
        assert_eq!(reply, "Hola");
    }

    #[tokio::test]
    async fn rejected_key_is_returned_as_an_error() {
        let err = check_key(&FixedReply(Err(401)), "gpt-3.5-turbo")
            .await
            .unwrap_err();

        let llm_error = err.downcast_ref::<LlmError>().unwrap();
        assert!(matches!(llm_error, LlmError::Api { status: 401, .. }));
    }
}
