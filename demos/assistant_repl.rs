use dotenv::dotenv;
use gemini_assistant::render::{self, Operation};
use gemini_assistant::{DocumentHandle, GeminiAssistant, ImageHandle, DEFAULT_TARGET_LANGUAGE};
use std::error::Error;
use std::io::{self, Write};

const HELP: &str = "Commands:
  /key <api key>          configure the API key
  /gen <prompt>           generate text (temperature 0.7)
  /tr <language> <text>   translate text
  /img <path> [question]  describe an image
  /pdf <path>             load a PDF
  /ask <question>         ask about the loaded PDF
  /clear                  clear chat history
  /quit                   exit
Anything else is sent to the chat.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let mut assistant = GeminiAssistant::from_env();

    println!("🤖 Study assistant ready.");
    if !assistant.is_ready() {
        println!("{}", render::AWAITING_SETUP);
    }
    println!("{}\n", HELP);
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let output = match command {
            "/quit" | "/exit" => break,
            "/key" => render::setup_status(&assistant.configure_credential(rest).await),
            "/gen" => {
                let temperature = assistant.config().default_temperature;
                render::present(
                    Operation::TextGeneration,
                    assistant.generate_text(rest, temperature).await,
                )
            }
            "/tr" => {
                let (language, text) = rest.split_once(' ').unwrap_or((DEFAULT_TARGET_LANGUAGE, rest));
                render::present(Operation::Translation, assistant.translate(text, language).await)
            }
            "/img" => {
                let (path, question) = rest.split_once(' ').unwrap_or((rest, ""));
                let image = (!path.is_empty()).then(|| ImageHandle::path(path));
                render::present(
                    Operation::ImageAnalysis,
                    assistant.describe_image(image.as_ref(), Some(question)).await,
                )
            }
            "/pdf" => {
                let document = (!rest.is_empty()).then(|| DocumentHandle::path(rest));
                render::extraction_status(&assistant.extract_document_text(document.as_ref()).await)
            }
            "/ask" => render::present(
                Operation::DocumentQuestion,
                assistant.answer_document_question(rest).await,
            ),
            "/clear" => {
                assistant.clear_history();
                "🗑️ History cleared".to_string()
            }
            _ => match assistant.converse(line).await {
                Ok(_) => assistant
                    .history()
                    .last()
                    .map(|turn| turn.content.clone())
                    .unwrap_or_default(),
                Err(e) => render::failure(Operation::Chat, &e),
            },
        };

        println!("\n{}\n", output);
        println!("------------------------------------------------------------------");
    }

    Ok(())
}
