use std::io::Read;
use transbot::config::AppConfig;
use transbot::language::LanguageDetector;
use transbot::llm::LLMBuilder;
use transbot::llm::openai::OpenAiChatBuilder;
use transbot::{
    GenerationSettings, Style, TracingObserver, TranslationRequest, Translator, tokens,
};

/// Reads text on stdin, detects the translation direction and prints the
/// translation(s) on stdout. Style keys may be passed as arguments; with more
/// than one, each result is printed under its style header.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;

    let styles: Vec<Style> = std::env::args()
        .skip(1)
        .map(|arg| {
            Style::from_key(&arg).unwrap_or_else(|| {
                log::warn!("Unknown style key {arg:?}, using the default style");
                Style::DEFAULT
            })
        })
        .collect();

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    if tokens::exceeds_limit(&text, config.max_input_chars) {
        anyhow::bail!("Input exceeds the {} character limit", config.max_input_chars);
    }

    let detector = LanguageDetector::new(config.detection_threshold);
    let direction = detector.direction(&text);
    eprintln!(
        "{} ({} characters, ~{} tokens)",
        direction.arrow,
        text.chars().count(),
        tokens::count_tokens(&text, &config.model)
    );

    let builder = match (&config.azure_endpoint, &config.azure_api_key) {
        (Some(endpoint), Some(api_key)) => OpenAiChatBuilder::azure(
            &config.model,
            &config.deployments(),
            endpoint,
            api_key,
            &config.azure_api_version,
        ),
        _ => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("TRANSBOT_OPENAI_API_KEY is not set"))?;
            OpenAiChatBuilder::open_ai(&config.model, api_key)
        }
    };

    let llm = match builder.and_then(|b| b.with_max_retries(config.max_retries).build()) {
        Ok(llm) => llm,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let translator =
        Translator::with_observer(llm, GenerationSettings::from_config(&config), TracingObserver);

    if styles.len() <= 1 {
        let mut request = TranslationRequest::new(text, direction);
        request.style = styles.first().copied();
        match translator.translate(&request).await {
            Ok(translation) => println!("{}", translation.text),
            Err(err) => {
                eprintln!("Translation failed: {err}");
                std::process::exit(1);
            }
        }
    } else {
        let results = translator
            .translate_multi(&text, direction, &styles, false, false)
            .await;
        for (style, outcome) in results {
            println!("=== {} ===", style.label());
            match outcome {
                Ok(styled) => println!("{}\n", styled.primary.text),
                Err(err) => println!("[failed: {err}]\n"),
            }
        }
    }

    Ok(())
}
