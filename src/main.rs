use anyhow::Context;
use doc_qa::domain::{ImageFormat, ImageInput};
use doc_qa::infrastructure::{AppConfig, OpenAiEmbedding, OpenAiLlm};
use doc_qa::{QuestionAnswerer, Retriever};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docqa=info,doc_qa=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(question)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: docqa <document.txt|image.png|image.jpg> <question>");
    };

    let config = AppConfig::load()?;
    let llm = Arc::new(OpenAiLlm::from_config(&config.llm)?);
    let answerer = QuestionAnswerer::new(llm, &config);

    if let Some(format) = ImageFormat::from_extension(&path) {
        let data = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
        info!(path = %path, bytes = data.len(), "asking about image");

        let answer = answerer
            .ask_about_image(&question, &ImageInput::new(data, format))
            .await?;
        println!("{answer}");
        return Ok(());
    }

    let document = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {path}"))?;

    let embedding = Arc::new(OpenAiEmbedding::from_config(&config.embedding)?);
    let mut retriever = Retriever::new(
        embedding,
        config.chunking.clone(),
        config.retrieval.backend.clone(),
    )?;
    let report = retriever.build_index(&document).await?;
    info!(path = %path, chunks = report.chunks, backend = report.backend, "document indexed");

    let answer = answerer.ask(&question, &document, Some(&retriever)).await?;
    println!("{answer}");

    retriever.reset().await;
    Ok(())
}
