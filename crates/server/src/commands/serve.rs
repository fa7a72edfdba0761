//! Serve command handler.

use crate::http::{self, AppState};
use anyhow::Context;
use clap::Args;
use company_chat_answer::CompanyChat;
use company_chat_core::config::AppConfig;
use company_chat_llm::create_client;
use company_chat_prompt::{builtin_prompt, OPEN_CHAT_PROMPT_ID};
use std::sync::Arc;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        // Hosted deployments assign the port; there is no fallback
        let addr = config.bind_addr()?;

        let llm = create_client(
            &config.provider,
            config.llm_endpoint.as_deref(),
            config.api_key.as_deref(),
            config.request_timeout(),
        )?;
        let chat = CompanyChat::with_llm(config, llm.clone())?;

        let state = AppState {
            chat: Arc::new(chat),
            llm,
            open_chat: builtin_prompt(OPEN_CHAT_PROMPT_ID)?,
            model: config.model.clone(),
        };
        let app = http::router(Arc::new(state), &config.allowed_origins);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on http://{}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
